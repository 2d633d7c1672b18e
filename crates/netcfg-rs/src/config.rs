// crates/netcfg-rs/src/config.rs
//! Tunables for a [`Node`](crate::node::Node) that are not part of the
//! persisted configuration itself.

/// Default number of memoized data pool check results a node keeps.
pub const DEFAULT_CHECK_CACHE_CAPACITY: usize = 64;

/// Default maximum identifier length accepted by name validation.
pub const DEFAULT_MAX_NAME_LEN: usize = 31;

/// Runtime configuration of a node model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    /// Maximum number of entries in the consistency-check cache.
    /// A capacity of zero disables memoization.
    pub check_cache_capacity: usize,
    /// Longest identifier that `is_valid_identifier` accepts.
    pub max_name_len: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            check_cache_capacity: DEFAULT_CHECK_CACHE_CAPACITY,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

/// Returns `true` if `name` is a C-style identifier no longer than `max_len`.
pub fn is_valid_identifier(name: &str, max_len: usize) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= max_len && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
