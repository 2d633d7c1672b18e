// crates/netcfg-rs/src/can/mod.rs

pub mod container;
pub mod message;
pub mod protocol;
pub mod signal;

pub use container::{MessageCheck, MessageContainer};
pub use message::{Message, SignalCheck, TxMethod};
pub use protocol::{CanProtocol, ProtocolType};
pub use signal::{ByteOrder, MultiplexerType, Signal};
