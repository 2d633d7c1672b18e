// crates/netcfg-rs/src/value/scaled.rs
//! Physical (scaled) view of a [`TypedValue`]: `raw * factor + offset`.

use super::typed::{Scalar, with_scalar};
use super::TypedValue;
use crate::NetCfgError;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Separator between array elements in rendered text.
pub const ARRAY_SEPARATOR: &str = ";";

/// Magnitudes at or above this, or below `EXPONENT_BELOW`, print in
/// exponent form.
const EXPONENT_FROM: f64 = 1e16;
const EXPONENT_BELOW: f64 = 1e-6;

fn format_physical<T: core::fmt::Display + core::fmt::LowerExp>(value: T, magnitude: f64) -> String {
    if magnitude >= EXPONENT_FROM || (magnitude != 0.0 && magnitude < EXPONENT_BELOW) {
        format!("{:e}", value)
    } else {
        value.to_string()
    }
}

impl TypedValue {
    /// Returns one element converted to its physical value.
    pub fn scaled_f64(&self, index: usize, factor: f64, offset: f64) -> Result<f64, NetCfgError> {
        Ok(self.element_as_f64(index)? * factor + offset)
    }

    /// Writes a raw `f64` into one element, rounding and saturating for
    /// integer kinds.
    pub fn set_from_f64(&mut self, index: usize, value: f64) -> Result<(), NetCfgError> {
        self.check_index(index)?;
        let kind = self.kind();
        let bytes = self.element_bytes_mut(index);
        with_scalar!(kind, T => <T as Scalar>::from_f64(value).write_le(bytes));
        Ok(())
    }

    /// Writes a physical value into one element by inverting the scaling.
    pub fn set_from_scaled_f64(
        &mut self,
        index: usize,
        value: f64,
        factor: f64,
        offset: f64,
    ) -> Result<(), NetCfgError> {
        if factor == 0.0 {
            return Err(NetCfgError::Range("scaling factor must not be zero"));
        }
        self.set_from_f64(index, (value - offset) / factor)
    }

    /// Renders the physical value as text.
    ///
    /// Integer kinds with identity scaling print the exact integer. Otherwise
    /// the value is scaled in `f64` and printed in shortest round-trip form,
    /// narrowed to `f32` first for `F32` values. Magnitudes from `1e16` up or
    /// below `1e-6` use exponent notation. Array elements are joined with `;`.
    pub fn scaled_string(&self, factor: f64, offset: f64) -> String {
        let parts: Vec<String> = (0..self.element_count())
            .map(|i| self.element_scaled_string(i, factor, offset))
            .collect();
        parts.join(ARRAY_SEPARATOR)
    }

    fn element_scaled_string(&self, index: usize, factor: f64, offset: f64) -> String {
        let kind = self.kind();
        if !kind.is_float() && factor == 1.0 && offset == 0.0 {
            let bytes = self.element_bytes(index);
            return with_scalar!(kind, T => <T as Scalar>::read_le(bytes).to_string());
        }
        let scaled = self.element_f64_unchecked(index) * factor + offset;
        let magnitude = |v: f64| if v < 0.0 { -v } else { v };
        if kind == super::ValueKind::F32 {
            let narrowed = scaled as f32;
            format_physical(narrowed, magnitude(f64::from(narrowed)))
        } else {
            format_physical(scaled, magnitude(scaled))
        }
    }
}
