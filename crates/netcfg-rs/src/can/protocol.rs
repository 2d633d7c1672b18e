// crates/netcfg-rs/src/can/protocol.rs

use super::container::MessageContainer;
use alloc::vec::Vec;

/// Communication protocol a [`CanProtocol`] entry configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum ProtocolType {
    /// Plain CAN layer 2 messages.
    #[default]
    Layer2 = 0,
    /// Safety protocol, exclusive variant.
    ECeS = 1,
    /// Safety protocol, open variant.
    ECoS = 2,
    CanOpen = 3,
    J1939 = 4,
}

/// Links a protocol to the communication data pool backing its signals.
///
/// Holds one [`MessageContainer`] per CAN interface of the node; the
/// container for interface `n` pairs with lists `2n` (Tx) and `2n + 1` (Rx)
/// of the data pool at `data_pool_index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanProtocol {
    pub protocol_type: ProtocolType,
    pub data_pool_index: usize,
    pub containers: Vec<MessageContainer>,
}

impl CanProtocol {
    pub fn new(protocol_type: ProtocolType, data_pool_index: usize, interface_count: usize) -> Self {
        Self {
            protocol_type,
            data_pool_index,
            containers: (0..interface_count).map(|_| MessageContainer::new()).collect(),
        }
    }

    pub fn container(&self, interface: usize) -> Option<&MessageContainer> {
        self.containers.get(interface)
    }

    pub fn container_mut(&mut self, interface: usize) -> Option<&mut MessageContainer> {
        self.containers.get_mut(interface)
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(&[self.protocol_type as u8]);
        hasher.update(&(self.data_pool_index as u32).to_le_bytes());
        for container in &self.containers {
            container.calc_hash(hasher);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_container_per_interface() {
        let mut protocol = CanProtocol::new(ProtocolType::J1939, 3, 2);
        assert_eq!(protocol.containers.len(), 2);
        assert!(protocol.container(1).is_some());
        assert!(protocol.container_mut(2).is_none());
        assert_eq!(protocol.data_pool_index, 3);
    }
}
