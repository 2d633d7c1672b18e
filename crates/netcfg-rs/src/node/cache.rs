// crates/netcfg-rs/src/node/cache.rs

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;

/// Findings of [`Node::check_error_data_pool`](super::Node::check_error_data_pool).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataPoolCheck {
    /// Another data pool of the node has the same name (case-insensitive).
    pub name_conflict: bool,
    pub name_invalid: bool,
    /// Indices of lists with an invalid or duplicate name or with element errors.
    pub lists_invalid: Vec<usize>,
}

impl DataPoolCheck {
    pub fn is_ok(&self) -> bool {
        !self.name_conflict && !self.name_invalid && self.lists_invalid.is_empty()
    }
}

/// Cache key: data pool index plus a structural hash of the inputs the
/// check depends on.
pub type CheckKey = (usize, u32);

/// Bounded memo of data pool check results.
///
/// Entries are evicted oldest first once `capacity` is reached. The owning
/// node clears the cache on every structural edit.
#[derive(Debug, Clone, Default)]
pub struct CheckCache {
    capacity: usize,
    entries: BTreeMap<CheckKey, DataPoolCheck>,
    order: VecDeque<CheckKey>,
}

impl CheckCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn get(&self, key: CheckKey) -> Option<&DataPoolCheck> {
        self.entries.get(&key)
    }

    pub fn insert(&mut self, key: CheckKey, check: DataPoolCheck) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key, check).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_eviction() {
        let mut cache = CheckCache::new(2);
        cache.insert((0, 1), DataPoolCheck::default());
        cache.insert((0, 2), DataPoolCheck { name_invalid: true, ..Default::default() });
        cache.insert((0, 1), DataPoolCheck { name_conflict: true, ..Default::default() });
        assert_eq!(cache.len(), 2);
        assert!(cache.get((0, 1)).unwrap().name_conflict);
        cache.insert((0, 3), DataPoolCheck::default());
        assert!(cache.get((0, 1)).is_none());
        assert!(cache.get((0, 2)).is_some());
        assert!(cache.get((0, 3)).is_some());
    }

    #[test]
    fn test_equal_hash_on_other_pool_is_separate() {
        let mut cache = CheckCache::new(4);
        cache.insert((0, 0xABCD), DataPoolCheck { name_invalid: true, ..Default::default() });
        assert!(cache.get((1, 0xABCD)).is_none());
        cache.insert((1, 0xABCD), DataPoolCheck::default());
        assert!(cache.get((0, 0xABCD)).unwrap().name_invalid);
        assert!(cache.get((1, 0xABCD)).unwrap().is_ok());
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut cache = CheckCache::new(0);
        cache.insert((0, 1), DataPoolCheck::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cache = CheckCache::new(4);
        cache.insert((2, 7), DataPoolCheck::default());
        cache.clear();
        assert!(cache.get((2, 7)).is_none());
    }
}
