// crates/netcfg-rs/src/datapool/mod.rs

mod element;
mod list;
mod pool;

pub use element::{AccessMode, ListElement};
pub use list::{DataPoolList, DataSet, ListCheck, NVM_LIST_CRC_SIZE};
pub use pool::{DataPool, DataPoolKind};
