// crates/netcfg-rs/src/datapool/pool.rs

use super::element::AccessMode;
use super::list::DataPoolList;
use crate::types::{COM_LISTS_PER_INTERFACE, Direction, com_list_index};
use crate::NetCfgError;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// The purpose of a data pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DataPoolKind {
    /// Diagnostic values, readable at runtime.
    #[default]
    Diag = 0,
    /// Parameters persisted in non-volatile memory.
    Nvm = 1,
    /// Values exchanged in CAN messages, one (Tx, Rx) list pair per interface.
    Com = 2,
    /// Hardware configuration values.
    Halc = 3,
    /// Hardware configuration values persisted in non-volatile memory.
    HalcNvm = 4,
}

impl DataPoolKind {
    /// Whether lists of this kind occupy NVM space.
    pub fn uses_nvm(self) -> bool {
        matches!(self, DataPoolKind::Nvm | DataPoolKind::HalcNvm)
    }
}

/// A named, typed collection of [`DataPoolList`]s owned by a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPool {
    pub name: String,
    pub comment: String,
    pub kind: DataPoolKind,
    /// Safety-relevant pools default new elements to read-only access.
    pub safety: bool,
    /// Major, minor, release.
    pub version: [u8; 3],
    pub nvm_start_address: u32,
    pub nvm_size: u32,
    pub lists: Vec<DataPoolList>,
}

impl DataPool {
    pub fn new(name: &str, kind: DataPoolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Creates a communication pool with an empty (Tx, Rx) list pair per interface.
    pub fn new_com(name: &str, interface_count: usize) -> Self {
        let mut pool = Self::new(name, DataPoolKind::Com);
        for interface in 0..interface_count {
            pool.lists
                .push(DataPoolList::new(&format!("CAN{}_TX", interface + 1)));
            pool.lists
                .push(DataPoolList::new(&format!("CAN{}_RX", interface + 1)));
        }
        pool
    }

    /// Access mode given to elements created by message and signal edits.
    pub fn default_access(&self) -> AccessMode {
        if self.safety {
            AccessMode::ReadOnly
        } else {
            AccessMode::ReadWrite
        }
    }

    /// Number of interfaces a communication pool has list pairs for.
    pub fn com_interface_count(&self) -> usize {
        self.lists.len() / COM_LISTS_PER_INTERFACE
    }

    pub fn com_list(&self, interface: usize, direction: Direction) -> Option<&DataPoolList> {
        self.lists.get(com_list_index(interface, direction)?)
    }

    /// Mutable access to both lists of one interface, as `(tx, rx)`.
    pub fn com_lists_mut(
        &mut self,
        interface: usize,
    ) -> Result<(&mut DataPoolList, &mut DataPoolList), NetCfgError> {
        let (Some(tx_index), Some(rx_index)) = (
            com_list_index(interface, Direction::Tx),
            com_list_index(interface, Direction::Rx),
        ) else {
            return Err(NetCfgError::NotFound("communication list pair"));
        };
        if rx_index >= self.lists.len() {
            return Err(NetCfgError::NotFound("communication list pair"));
        }
        let (head, tail) = self.lists.split_at_mut(rx_index);
        Ok((&mut head[tx_index], &mut tail[0]))
    }

    pub fn list_index(&self, name: &str) -> Option<usize> {
        self.lists.iter().position(|l| l.name == name)
    }

    /// Inserts a list at `index` (`0..=len`).
    pub fn insert_list(&mut self, index: usize, list: DataPoolList) -> Result<(), NetCfgError> {
        if index > self.lists.len() {
            return Err(NetCfgError::Range("list index"));
        }
        self.lists.insert(index, list);
        Ok(())
    }

    pub fn delete_list(&mut self, index: usize) -> Result<DataPoolList, NetCfgError> {
        if index >= self.lists.len() {
            return Err(NetCfgError::Range("list index"));
        }
        Ok(self.lists.remove(index))
    }

    /// Moves the list at `source` so that it ends up at `target`.
    pub fn move_list(&mut self, source: usize, target: usize) -> Result<(), NetCfgError> {
        let len = self.lists.len();
        if source >= len || target >= len {
            return Err(NetCfgError::Range("list index"));
        }
        let list = self.lists.remove(source);
        self.lists.insert(target, list);
        Ok(())
    }

    pub fn num_bytes_used(&self) -> u32 {
        self.lists
            .iter()
            .map(DataPoolList::num_bytes_used)
            .fold(0, u32::saturating_add)
    }

    /// Lays the lists out back to back from the pool's start address and
    /// assigns element addresses inside each list.
    ///
    /// Returns `Range("nvm address")` once a list or element would start
    /// beyond the 32-bit address space; lists before it keep their new layout.
    pub fn recalculate_address(&mut self) -> Result<(), NetCfgError> {
        let mut next = Some(self.nvm_start_address);
        for list in &mut self.lists {
            let address = next.ok_or(NetCfgError::Range("nvm address"))?;
            list.nvm_start_address = address;
            list.recalculate_address()?;
            next = address.checked_add(list.nvm_size);
        }
        Ok(())
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(self.name.as_bytes());
        hasher.update(self.comment.as_bytes());
        hasher.update(&[self.kind as u8, self.safety as u8]);
        hasher.update(&self.version);
        hasher.update(&self.nvm_start_address.to_le_bytes());
        hasher.update(&self.nvm_size.to_le_bytes());
        for list in &self.lists {
            list.calc_hash(hasher);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapool::ListElement;
    use crate::value::ValueKind;

    #[test]
    fn test_com_pool_layout() {
        let mut pool = DataPool::new_com("Com", 2);
        assert_eq!(pool.lists.len(), 4);
        assert_eq!(pool.com_interface_count(), 2);
        assert_eq!(pool.com_list(1, Direction::Rx).unwrap().name, "CAN2_RX");
        let (tx, rx) = pool.com_lists_mut(1).unwrap();
        assert_eq!(tx.name, "CAN2_TX");
        assert_eq!(rx.name, "CAN2_RX");
        assert!(pool.com_lists_mut(2).is_err());
        assert!(pool.com_list(usize::MAX, Direction::Rx).is_none());
        assert!(pool.com_lists_mut(usize::MAX).is_err());
    }

    #[test]
    fn test_default_access_follows_safety() {
        let mut pool = DataPool::new("Params", DataPoolKind::Nvm);
        assert_eq!(pool.default_access(), AccessMode::ReadWrite);
        pool.safety = true;
        assert_eq!(pool.default_access(), AccessMode::ReadOnly);
    }

    #[test]
    fn test_recalculate_address() {
        let mut pool = DataPool::new("Params", DataPoolKind::Nvm);
        pool.nvm_start_address = 0x1000;
        let mut first = DataPoolList::new("First");
        first.nvm_size = 16;
        first
            .insert_element(0, ListElement::new("A", ValueKind::U32))
            .unwrap();
        let mut second = DataPoolList::new("Second");
        second.nvm_size = 8;
        second
            .insert_element(0, ListElement::new("B", ValueKind::U8))
            .unwrap();
        pool.insert_list(0, first).unwrap();
        pool.insert_list(1, second).unwrap();
        pool.recalculate_address().unwrap();
        assert_eq!(pool.lists[1].nvm_start_address, 0x1010);
        assert_eq!(pool.lists[1].elements[0].nvm_start_address, 0x1010);
        assert_eq!(pool.num_bytes_used(), 5);
    }

    #[test]
    fn test_recalculate_address_overflow() {
        let mut pool = DataPool::new("Params", DataPoolKind::Nvm);
        pool.nvm_start_address = 0xFFFF_FFF0;
        let mut first = DataPoolList::new("First");
        first.nvm_size = 0x20;
        pool.insert_list(0, first).unwrap();
        pool.insert_list(1, DataPoolList::new("Second")).unwrap();
        assert_eq!(pool.recalculate_address(), Err(NetCfgError::Range("nvm address")));
        assert_eq!(pool.lists[0].nvm_start_address, 0xFFFF_FFF0);
    }

    #[test]
    fn test_list_management() {
        let mut pool = DataPool::new("Diag", DataPoolKind::Diag);
        pool.insert_list(0, DataPoolList::new("A")).unwrap();
        pool.insert_list(1, DataPoolList::new("B")).unwrap();
        pool.move_list(1, 0).unwrap();
        assert_eq!(pool.list_index("B"), Some(0));
        assert!(pool.insert_list(5, DataPoolList::new("C")).is_err());
        assert_eq!(pool.delete_list(0).unwrap().name, "B");
        assert!(pool.delete_list(1).is_err());
    }
}
