// crates/netcfg-rs/src/value/compare.rs
//! Numeric comparison of [`TypedValue`]s.
//!
//! Operands are converted element by element to `f64`, so values of
//! different kinds compare by numeric value rather than by raw bytes. Integers
//! beyond 2^53 lose precision in the conversion.

use super::typed::{Scalar, with_scalar};
use super::TypedValue;
use crate::NetCfgError;

impl TypedValue {
    /// Returns one element as `f64`, whatever the declared kind.
    pub fn element_as_f64(&self, index: usize) -> Result<f64, NetCfgError> {
        self.check_index(index)?;
        Ok(self.element_f64_unchecked(index))
    }

    /// Returns the value of a scalar as `f64`, whatever the declared kind.
    pub fn as_f64(&self) -> Result<f64, NetCfgError> {
        if self.is_array() {
            return Err(NetCfgError::TypeMismatch);
        }
        Ok(self.element_f64_unchecked(0))
    }

    pub(crate) fn element_f64_unchecked(&self, index: usize) -> f64 {
        let bytes = self.element_bytes(index);
        with_scalar!(self.kind(), T => <T as Scalar>::read_le(bytes).to_f64())
    }

    fn comparable(&self, other: &TypedValue) -> bool {
        self.is_array() == other.is_array() && self.element_count() == other.element_count()
    }

    fn all_elements(&self, other: &TypedValue, pred: impl Fn(f64, f64) -> bool) -> bool {
        self.comparable(other)
            && (0..self.element_count())
                .all(|i| pred(self.element_f64_unchecked(i), other.element_f64_unchecked(i)))
    }

    /// `true` if every element is greater than the matching element of `other`.
    /// Values of different array-ness or length are never greater.
    pub fn is_greater(&self, other: &TypedValue) -> bool {
        self.all_elements(other, |a, b| a > b)
    }

    /// `true` if every element is greater than or equal to the matching element of `other`.
    pub fn is_greater_or_equal(&self, other: &TypedValue) -> bool {
        self.all_elements(other, |a, b| a >= b)
    }

    /// `true` if every element is less than the matching element of `other`.
    pub fn is_less(&self, other: &TypedValue) -> bool {
        self.all_elements(other, |a, b| a < b)
    }

    /// `true` if every element is less than or equal to the matching element of `other`.
    pub fn is_less_or_equal(&self, other: &TypedValue) -> bool {
        self.all_elements(other, |a, b| a <= b)
    }

    /// Checks that the value lies within `[min, max]`, element-wise.
    ///
    /// `min` and `max` must have the same kind, array-ness and length as `self`.
    pub fn check_range(&self, min: &TypedValue, max: &TypedValue) -> Result<bool, NetCfgError> {
        if !self.same_shape(min) || !self.same_shape(max) {
            return Err(NetCfgError::TypeMismatch);
        }
        Ok(self.is_greater_or_equal(min) && self.is_less_or_equal(max))
    }
}

impl PartialEq for TypedValue {
    /// Numeric equality; kinds may differ, array-ness and length may not.
    fn eq(&self, other: &Self) -> bool {
        self.all_elements(other, |a, b| a == b)
    }
}
