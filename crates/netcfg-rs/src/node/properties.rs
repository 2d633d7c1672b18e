// crates/netcfg-rs/src/node/properties.rs

use alloc::string::String;
use alloc::vec::Vec;

/// Identity of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeProperties {
    pub name: String,
    pub comment: String,
    /// Number of CAN interfaces; each protocol has one message container per interface.
    pub can_interface_count: usize,
}

impl NodeProperties {
    pub fn new(name: &str, can_interface_count: usize) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            can_interface_count,
        }
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(self.name.as_bytes());
        hasher.update(self.comment.as_bytes());
        hasher.update(&(self.can_interface_count as u32).to_le_bytes());
    }
}

/// A program running on the node and the data pools it owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Application {
    pub name: String,
    pub comment: String,
    pub process_id: u8,
    /// Indices into the node's data pools; kept in sync when pools move.
    pub(crate) data_pool_indices: Vec<usize>,
}

impl Application {
    pub fn new(name: &str, process_id: u8) -> Self {
        Self {
            name: name.into(),
            process_id,
            ..Default::default()
        }
    }

    pub fn data_pool_indices(&self) -> &[usize] {
        &self.data_pool_indices
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(self.name.as_bytes());
        hasher.update(self.comment.as_bytes());
        hasher.update(&[self.process_id]);
        for index in &self.data_pool_indices {
            hasher.update(&(*index as u32).to_le_bytes());
        }
    }
}

/// Hardware description the node runs on. Only carried for hashing and lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardwareConfig {
    pub device_name: String,
    pub channels: Vec<String>,
}

impl HardwareConfig {
    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(self.device_name.as_bytes());
        for channel in &self.channels {
            hasher.update(channel.as_bytes());
        }
    }
}
