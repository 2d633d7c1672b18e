#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' is used for dynamic allocation (value buffers, element and message lists)
extern crate alloc;

// --- Foundation Modules ---
pub mod types;
pub mod error;
pub mod config;
mod log;

// --- Value Storage ---
pub mod value;
pub mod datapool;

// --- CAN Topology ---
pub mod can;
pub mod sync;

// --- Node Abstraction ---
pub mod node;

// --- Top-level Exports ---
pub use types::{CanMessageId, Direction};
pub use error::NetCfgError;
pub use config::NodeConfig;
pub use value::{TypedValue, ValueKind};
pub use datapool::{AccessMode, DataPool, DataPoolKind, DataPoolList, ListElement};
pub use can::{CanProtocol, Message, MessageContainer, ProtocolType, Signal};
pub use sync::SyncEngine;
pub use node::{Application, DataPoolCheck, HardwareConfig, MessageIdentification, Node, NodeProperties};

#[cfg(feature = "std")]
pub use value::SharedValue;
