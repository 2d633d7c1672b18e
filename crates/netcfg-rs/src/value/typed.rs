// crates/netcfg-rs/src/value/typed.rs

use super::kind::ValueKind;
use crate::NetCfgError;
use alloc::{vec, vec::Vec};

mod private {
    pub trait Sealed {}
}

/// A primitive numeric type that can be stored in a [`TypedValue`].
///
/// Implemented for the ten supported kinds only.
pub trait Scalar: Copy + private::Sealed {
    const KIND: ValueKind;
    const MIN: Self;
    const MAX: Self;

    /// Reads one element from the first `size_of::<Self>()` little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
    /// Writes one element as little-endian bytes into `out`.
    fn write_le(self, out: &mut [u8]);
    fn to_f64(self) -> f64;
    /// Converts a float, rounding half away from zero for integer kinds and
    /// saturating at the kind's limits.
    fn from_f64(value: f64) -> Self;
}

/// Rounds half away from zero without relying on `std` float intrinsics.
pub(crate) fn round_half_away(value: f64) -> f64 {
    // Above 2^52 every f64 is already integral.
    const INTEGRAL_LIMIT: f64 = 4_503_599_627_370_496.0;
    if value.is_nan() {
        return 0.0;
    }
    let magnitude = if value < 0.0 { -value } else { value };
    if magnitude >= INTEGRAL_LIMIT {
        return value;
    }
    // Below 2^52 the truncation and the fraction are both exact.
    let truncated = magnitude as u64 as f64;
    let rounded = if magnitude - truncated >= 0.5 { truncated + 1.0 } else { truncated };
    if value < 0.0 { -rounded } else { rounded }
}

macro_rules! impl_scalar {
    (@base $t:ty, $kind:ident, $from:expr) => {
        impl private::Sealed for $t {}

        impl Scalar for $t {
            const KIND: ValueKind = ValueKind::$kind;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;

            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; core::mem::size_of::<$t>()];
                buf.copy_from_slice(&bytes[..core::mem::size_of::<$t>()]);
                <$t>::from_le_bytes(buf)
            }

            fn write_le(self, out: &mut [u8]) {
                out[..core::mem::size_of::<$t>()].copy_from_slice(&self.to_le_bytes());
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                let convert = $from;
                convert(value)
            }
        }
    };
    ($t:ty, $kind:ident, int) => {
        impl_scalar!(@base $t, $kind, |v: f64| round_half_away(v) as $t);
    };
    ($t:ty, $kind:ident, float) => {
        impl_scalar!(@base $t, $kind, |v: f64| v as $t);
    };
}

impl_scalar!(u8, U8, int);
impl_scalar!(u16, U16, int);
impl_scalar!(u32, U32, int);
impl_scalar!(u64, U64, int);
impl_scalar!(i8, I8, int);
impl_scalar!(i16, I16, int);
impl_scalar!(i32, I32, int);
impl_scalar!(i64, I64, int);
impl_scalar!(f32, F32, float);
impl_scalar!(f64, F64, float);

/// Runs `$body` with `$T` aliased to the Rust type matching `$kind`.
macro_rules! with_scalar {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            $crate::value::ValueKind::U8 => {
                type $T = u8;
                $body
            }
            $crate::value::ValueKind::U16 => {
                type $T = u16;
                $body
            }
            $crate::value::ValueKind::U32 => {
                type $T = u32;
                $body
            }
            $crate::value::ValueKind::U64 => {
                type $T = u64;
                $body
            }
            $crate::value::ValueKind::I8 => {
                type $T = i8;
                $body
            }
            $crate::value::ValueKind::I16 => {
                type $T = i16;
                $body
            }
            $crate::value::ValueKind::I32 => {
                type $T = i32;
                $body
            }
            $crate::value::ValueKind::I64 => {
                type $T = i64;
                $body
            }
            $crate::value::ValueKind::F32 => {
                type $T = f32;
                $body
            }
            $crate::value::ValueKind::F64 => {
                type $T = f64;
                $body
            }
        }
    };
}
pub(crate) use with_scalar;

/// A runtime-tagged numeric value: one element of a [`ValueKind`], or an
/// array of them.
///
/// Elements are stored little-endian regardless of the host, so the raw
/// buffer is always `kind.size_bytes() * element_count()` bytes long.
#[derive(Debug, Clone)]
pub struct TypedValue {
    kind: ValueKind,
    array: bool,
    data: Vec<u8>,
}

impl Default for TypedValue {
    fn default() -> Self {
        Self::new(ValueKind::U8)
    }
}

impl TypedValue {
    /// Creates a zero-initialised scalar.
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            array: false,
            data: vec![0; kind.size_bytes()],
        }
    }

    /// Creates a zero-initialised array with `len` elements.
    pub fn new_array(kind: ValueKind, len: usize) -> Self {
        Self {
            kind,
            array: true,
            data: vec![0; kind.size_bytes() * len],
        }
    }

    /// Creates a scalar holding `value`.
    pub fn from_scalar<T: Scalar>(value: T) -> Self {
        let mut v = Self::new(T::KIND);
        value.write_le(&mut v.data);
        v
    }

    /// Creates an array holding `values`.
    pub fn from_slice<T: Scalar>(values: &[T]) -> Self {
        let mut v = Self::new_array(T::KIND, values.len());
        v.write_all(values);
        v
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    /// Number of elements; always 1 for a scalar.
    pub fn element_count(&self) -> usize {
        self.data.len() / self.kind.size_bytes()
    }

    /// Declared array length, or `None` for a scalar.
    pub fn array_len(&self) -> Option<usize> {
        self.array.then(|| self.element_count())
    }

    /// Total size of the value in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// The raw little-endian storage.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns `true` if both values share kind, array-ness and element count.
    pub fn same_shape(&self, other: &TypedValue) -> bool {
        self.kind == other.kind && self.array == other.array && self.data.len() == other.data.len()
    }

    /// Returns `true` if both values have the same shape and identical bytes.
    ///
    /// Unlike `==` this never equates different kinds and treats a NaN as
    /// equal to its own copy.
    pub fn is_identical(&self, other: &TypedValue) -> bool {
        self.same_shape(other) && self.data == other.data
    }

    /// Changes the kind. The storage is reset to zero, keeping the element count.
    pub fn set_kind(&mut self, kind: ValueKind) {
        if kind != self.kind {
            let count = self.element_count();
            self.kind = kind;
            self.data = vec![0; kind.size_bytes() * count];
        }
    }

    /// Switches between scalar and array. The storage is reset to a single
    /// zero element.
    pub fn set_array(&mut self, array: bool) {
        if array != self.array {
            self.array = array;
            self.data = vec![0; self.kind.size_bytes()];
        }
    }

    /// Resizes an array, zero-filling new elements and truncating on shrink.
    pub fn set_array_len(&mut self, len: usize) -> Result<(), NetCfgError> {
        if !self.array {
            return Err(NetCfgError::TypeMismatch);
        }
        self.data.resize(self.kind.size_bytes() * len, 0);
        Ok(())
    }

    // --- Generic Typed Accessors ---

    fn expect_shape(&self, kind: ValueKind, array: bool) -> Result<(), NetCfgError> {
        if self.kind == kind && self.array == array {
            Ok(())
        } else {
            Err(NetCfgError::TypeMismatch)
        }
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), NetCfgError> {
        let len = self.element_count();
        if index < len {
            Ok(())
        } else {
            Err(NetCfgError::Access { index, len })
        }
    }

    pub(crate) fn element_bytes(&self, index: usize) -> &[u8] {
        let width = self.kind.size_bytes();
        &self.data[index * width..(index + 1) * width]
    }

    pub(crate) fn element_bytes_mut(&mut self, index: usize) -> &mut [u8] {
        let width = self.kind.size_bytes();
        &mut self.data[index * width..(index + 1) * width]
    }

    fn write_all<T: Scalar>(&mut self, values: &[T]) {
        for (i, value) in values.iter().enumerate() {
            value.write_le(self.element_bytes_mut(i));
        }
    }

    /// Reads a scalar of type `T`.
    pub fn get<T: Scalar>(&self) -> Result<T, NetCfgError> {
        self.expect_shape(T::KIND, false)?;
        Ok(T::read_le(&self.data))
    }

    /// Writes a scalar of type `T`.
    pub fn set<T: Scalar>(&mut self, value: T) -> Result<(), NetCfgError> {
        self.expect_shape(T::KIND, false)?;
        value.write_le(&mut self.data);
        Ok(())
    }

    /// Reads every element of an array of type `T`.
    pub fn get_array<T: Scalar>(&self) -> Result<Vec<T>, NetCfgError> {
        self.expect_shape(T::KIND, true)?;
        Ok(self
            .data
            .chunks_exact(T::KIND.size_bytes())
            .map(T::read_le)
            .collect())
    }

    /// Replaces an array of type `T`, adopting the length of `values`.
    pub fn set_array_values<T: Scalar>(&mut self, values: &[T]) -> Result<(), NetCfgError> {
        self.expect_shape(T::KIND, true)?;
        self.data = vec![0; T::KIND.size_bytes() * values.len()];
        self.write_all(values);
        Ok(())
    }

    /// Reads one element of an array of type `T`.
    pub fn get_element<T: Scalar>(&self, index: usize) -> Result<T, NetCfgError> {
        self.expect_shape(T::KIND, true)?;
        self.check_index(index)?;
        Ok(T::read_le(self.element_bytes(index)))
    }

    /// Writes one element of an array of type `T`.
    pub fn set_element<T: Scalar>(&mut self, index: usize, value: T) -> Result<(), NetCfgError> {
        self.expect_shape(T::KIND, true)?;
        self.check_index(index)?;
        value.write_le(self.element_bytes_mut(index));
        Ok(())
    }

    /// Fills every element with the smallest value of the kind.
    pub fn set_to_min(&mut self) {
        with_scalar!(self.kind, T => self.fill(<T as Scalar>::MIN))
    }

    /// Fills every element with the largest value of the kind.
    pub fn set_to_max(&mut self) {
        with_scalar!(self.kind, T => self.fill(<T as Scalar>::MAX))
    }

    /// Sets one element to the smallest value of the kind.
    pub fn set_element_to_min(&mut self, index: usize) -> Result<(), NetCfgError> {
        self.check_index(index)?;
        let kind = self.kind;
        let bytes = self.element_bytes_mut(index);
        with_scalar!(kind, T => <T as Scalar>::MIN.write_le(bytes));
        Ok(())
    }

    /// Sets one element to the largest value of the kind.
    pub fn set_element_to_max(&mut self, index: usize) -> Result<(), NetCfgError> {
        self.check_index(index)?;
        let kind = self.kind;
        let bytes = self.element_bytes_mut(index);
        with_scalar!(kind, T => <T as Scalar>::MAX.write_le(bytes));
        Ok(())
    }

    fn fill<T: Scalar>(&mut self, value: T) {
        for chunk in self.data.chunks_exact_mut(T::KIND.size_bytes()) {
            value.write_le(chunk);
        }
    }

    /// Feeds kind, array flag and raw bytes into a structural hash.
    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(&[self.kind as u8, self.array as u8]);
        hasher.update(&(self.data.len() as u32).to_le_bytes());
        hasher.update(&self.data);
    }
}

// --- Named Accessors ---

macro_rules! named_accessors {
    ($($t:ty => $get:ident, $set:ident, $get_array:ident, $set_array:ident, $get_element:ident, $set_element:ident;)+) => {
        impl TypedValue {
            $(
                pub fn $get(&self) -> Result<$t, NetCfgError> {
                    self.get::<$t>()
                }

                pub fn $set(&mut self, value: $t) -> Result<(), NetCfgError> {
                    self.set::<$t>(value)
                }

                pub fn $get_array(&self) -> Result<Vec<$t>, NetCfgError> {
                    self.get_array::<$t>()
                }

                pub fn $set_array(&mut self, values: &[$t]) -> Result<(), NetCfgError> {
                    self.set_array_values::<$t>(values)
                }

                pub fn $get_element(&self, index: usize) -> Result<$t, NetCfgError> {
                    self.get_element::<$t>(index)
                }

                pub fn $set_element(&mut self, index: usize, value: $t) -> Result<(), NetCfgError> {
                    self.set_element::<$t>(index, value)
                }
            )+
        }
    };
}

named_accessors! {
    u8 => get_u8, set_u8, get_array_u8, set_array_u8, get_element_u8, set_element_u8;
    u16 => get_u16, set_u16, get_array_u16, set_array_u16, get_element_u16, set_element_u16;
    u32 => get_u32, set_u32, get_array_u32, set_array_u32, get_element_u32, set_element_u32;
    u64 => get_u64, set_u64, get_array_u64, set_array_u64, get_element_u64, set_element_u64;
    i8 => get_i8, set_i8, get_array_i8, set_array_i8, get_element_i8, set_element_i8;
    i16 => get_i16, set_i16, get_array_i16, set_array_i16, get_element_i16, set_element_i16;
    i32 => get_i32, set_i32, get_array_i32, set_array_i32, get_element_i32, set_element_i32;
    i64 => get_i64, set_i64, get_array_i64, set_array_i64, get_element_i64, set_element_i64;
    f32 => get_f32, set_f32, get_array_f32, set_array_f32, get_element_f32, set_element_f32;
    f64 => get_f64, set_f64, get_array_f64, set_array_f64, get_element_f64, set_element_f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sizes_follow_kind_and_length() {
        assert_eq!(TypedValue::new(ValueKind::U16).size_bytes(), 2);
        assert_eq!(TypedValue::new_array(ValueKind::F64, 3).size_bytes(), 24);
        assert_eq!(TypedValue::new_array(ValueKind::I8, 0).size_bytes(), 0);
        assert_eq!(TypedValue::new(ValueKind::I32).array_len(), None);
        assert_eq!(TypedValue::new_array(ValueKind::I32, 4).array_len(), Some(4));
    }

    #[test]
    fn test_type_mismatch_never_reinterprets() {
        let mut v = TypedValue::new(ValueKind::I32);
        v.set_i32(-2).unwrap();
        assert_eq!(v.get_u16(), Err(NetCfgError::TypeMismatch));
        assert_eq!(v.set_u16(7), Err(NetCfgError::TypeMismatch));
        assert_eq!(v.get_i32(), Ok(-2));
        // Scalar accessor on an array is a mismatch as well.
        let arr = TypedValue::new_array(ValueKind::I32, 2);
        assert_eq!(arr.get_i32(), Err(NetCfgError::TypeMismatch));
        assert_eq!(v.get_element_i32(0), Err(NetCfgError::TypeMismatch));
    }

    #[test]
    fn test_array_bounds() {
        let mut v = TypedValue::from_slice(&[1u16, 2, 3]);
        assert_eq!(v.get_element_u16(2), Ok(3));
        assert_eq!(
            v.get_element_u16(3),
            Err(NetCfgError::Access { index: 3, len: 3 })
        );
        assert_eq!(
            v.set_element_u16(3, 9),
            Err(NetCfgError::Access { index: 3, len: 3 })
        );
        v.set_element_u16(0, 9).unwrap();
        assert_eq!(v.get_array_u16().unwrap(), [9, 2, 3]);
    }

    #[test]
    fn test_resize_preserves_and_zero_fills() {
        let mut v = TypedValue::from_slice(&[10i64, -20]);
        v.set_array_len(4).unwrap();
        assert_eq!(v.get_array_i64().unwrap(), [10, -20, 0, 0]);
        v.set_array_len(1).unwrap();
        assert_eq!(v.get_array_i64().unwrap(), [10]);

        let mut scalar = TypedValue::new(ValueKind::U8);
        assert_eq!(scalar.set_array_len(2), Err(NetCfgError::TypeMismatch));
    }

    #[test]
    fn test_kind_and_array_changes_reset_storage() {
        let mut v = TypedValue::from_slice(&[0xFFu8, 0xFF, 0xFF]);
        v.set_kind(ValueKind::U32);
        assert_eq!(v.size_bytes(), 12);
        assert!(v.raw_bytes().iter().all(|b| *b == 0));

        v.set_array(false);
        assert_eq!(v.size_bytes(), 4);
        assert_eq!(v.get_u32(), Ok(0));
    }

    #[test]
    fn test_set_array_values_adopts_length() {
        let mut v = TypedValue::new_array(ValueKind::F32, 1);
        v.set_array_f32(&[1.5, 2.5, 3.5]).unwrap();
        assert_eq!(v.array_len(), Some(3));
        assert_eq!(v.get_element_f32(1), Ok(2.5));
    }

    #[test]
    fn test_min_max_fill() {
        let mut v = TypedValue::new_array(ValueKind::I16, 2);
        v.set_to_min();
        assert_eq!(v.get_array_i16().unwrap(), [i16::MIN, i16::MIN]);
        v.set_to_max();
        assert_eq!(v.get_array_i16().unwrap(), [i16::MAX, i16::MAX]);
    }

    #[test]
    fn test_from_f64_rounds_and_saturates() {
        assert_eq!(<u8 as Scalar>::from_f64(2.5), 3);
        assert_eq!(<u8 as Scalar>::from_f64(-4.0), 0);
        assert_eq!(<u8 as Scalar>::from_f64(300.0), 255);
        assert_eq!(<i16 as Scalar>::from_f64(-2.5), -3);
        assert_eq!(<i16 as Scalar>::from_f64(-1e9), i16::MIN);
        assert_eq!(<i32 as Scalar>::from_f64(f64::NAN), 0);
        assert_eq!(<u8 as Scalar>::from_f64(0.49999999999999994), 0);
        assert_eq!(<i8 as Scalar>::from_f64(-0.49999999999999994), 0);
        assert_eq!(<u64 as Scalar>::from_f64(4_503_599_627_370_495.5), 4_503_599_627_370_496);

        let mut value = TypedValue::new(ValueKind::U8);
        value.set_from_f64(0, 0.49999999999999994).unwrap();
        assert_eq!(value.get_u8(), Ok(0));
        assert_eq!(<f32 as Scalar>::from_f64(0.25), 0.25f32);
    }

    #[test]
    fn test_hash_distinguishes_kind() {
        let mut a = crc32fast::Hasher::new();
        TypedValue::new(ValueKind::U32).calc_hash(&mut a);
        let mut b = crc32fast::Hasher::new();
        TypedValue::new(ValueKind::I32).calc_hash(&mut b);
        assert_ne!(a.finalize(), b.finalize());
    }
}
