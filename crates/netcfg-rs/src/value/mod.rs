// crates/netcfg-rs/src/value/mod.rs
//! Runtime-typed scalar-or-array numeric storage.

mod codec;
mod compare;
mod kind;
mod scaled;
#[cfg(feature = "std")]
mod shared;
mod typed;

pub use kind::ValueKind;
#[cfg(feature = "std")]
pub use shared::SharedValue;
pub use typed::{Scalar, TypedValue};
