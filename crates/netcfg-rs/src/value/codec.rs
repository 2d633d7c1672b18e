// crates/netcfg-rs/src/value/codec.rs
//! Byte-exact little/big-endian blobs for [`TypedValue`].
//!
//! A blob always carries `kind.size_bytes() * element_count()` bytes; the
//! decoders never change the kind, array-ness or length of the target.

use super::TypedValue;
use crate::NetCfgError;
use alloc::vec::Vec;

impl TypedValue {
    /// Serializes all elements as a little-endian byte blob.
    pub fn to_le_blob(&self) -> Vec<u8> {
        self.raw_bytes().to_vec()
    }

    /// Serializes all elements as a big-endian byte blob.
    pub fn to_be_blob(&self) -> Vec<u8> {
        let width = self.kind().size_bytes();
        let mut blob = self.raw_bytes().to_vec();
        if width > 1 {
            for chunk in blob.chunks_exact_mut(width) {
                chunk.reverse();
            }
        }
        blob
    }

    /// Overwrites all elements from a little-endian byte blob.
    pub fn set_from_le_blob(&mut self, blob: &[u8]) -> Result<(), NetCfgError> {
        self.check_blob_len(blob)?;
        for index in 0..self.element_count() {
            let width = self.kind().size_bytes();
            self.element_bytes_mut(index)
                .copy_from_slice(&blob[index * width..(index + 1) * width]);
        }
        Ok(())
    }

    /// Overwrites all elements from a big-endian byte blob.
    pub fn set_from_be_blob(&mut self, blob: &[u8]) -> Result<(), NetCfgError> {
        self.check_blob_len(blob)?;
        let width = self.kind().size_bytes();
        for (index, source) in blob.chunks_exact(width).enumerate() {
            let target = self.element_bytes_mut(index);
            target.copy_from_slice(source);
            target.reverse();
        }
        Ok(())
    }

    fn check_blob_len(&self, blob: &[u8]) -> Result<(), NetCfgError> {
        if blob.len() == self.size_bytes() {
            Ok(())
        } else {
            Err(NetCfgError::BufferLength {
                expected: self.size_bytes(),
                actual: blob.len(),
            })
        }
    }
}
