// crates/netcfg-rs/src/value/shared.rs

use super::TypedValue;
use alloc::sync::Arc;
use parking_lot::Mutex;

/// An explicitly synchronized handle to a [`TypedValue`].
///
/// Live-value collaborators that refresh a value from a background thread
/// hold one of these instead of reaching into the model. Each call holds the
/// lock only for the duration of the closure; batches of reads that must be
/// consistent belong inside a single `read` call.
#[derive(Debug, Clone, Default)]
pub struct SharedValue {
    inner: Arc<Mutex<TypedValue>>,
}

impl SharedValue {
    pub fn new(value: TypedValue) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Runs `f` with shared access to the value.
    pub fn read<R>(&self, f: impl FnOnce(&TypedValue) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Runs `f` with exclusive access to the value.
    pub fn write<R>(&self, f: impl FnOnce(&mut TypedValue) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Returns a copy of the current value.
    pub fn snapshot(&self) -> TypedValue {
        self.inner.lock().clone()
    }
}
