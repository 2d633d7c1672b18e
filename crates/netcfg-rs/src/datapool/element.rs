// crates/netcfg-rs/src/datapool/element.rs

use crate::value::{TypedValue, ValueKind};
use crate::NetCfgError;
use alloc::string::String;
use alloc::vec::Vec;

/// Defines the access rights of a list element from the device's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// read and write access
    #[default]
    ReadWrite,
    /// read only access
    ReadOnly,
}

/// One value slot inside a [`DataPoolList`](super::DataPoolList).
///
/// `value`, `min`, `max`, `nvm_value` and every data set value share the same
/// kind and array-ness; use the `set_kind`/`set_array`/`set_array_len`
/// helpers to change them together.
///
/// Equality is structural: values compare with [`TypedValue::is_identical`]
/// and the scaling by bit pattern, so lists and pools holding elements
/// compare as stored.
#[derive(Debug, Clone)]
pub struct ListElement {
    pub name: String,
    pub comment: String,
    /// Physical unit of the scaled value.
    pub unit: String,
    pub factor: f64,
    pub offset: f64,
    pub min: TypedValue,
    pub max: TypedValue,
    /// The current value.
    pub value: TypedValue,
    /// The value last written to non-volatile memory.
    pub nvm_value: TypedValue,
    /// One value per data set of the owning list.
    pub data_set_values: Vec<TypedValue>,
    pub access: AccessMode,
    /// Whether diagnostic event calls are issued for this element.
    pub diag_event_call: bool,
    pub nvm_start_address: u32,
}

impl PartialEq for ListElement {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.comment == other.comment
            && self.unit == other.unit
            && self.factor.to_bits() == other.factor.to_bits()
            && self.offset.to_bits() == other.offset.to_bits()
            && self.min.is_identical(&other.min)
            && self.max.is_identical(&other.max)
            && self.value.is_identical(&other.value)
            && self.nvm_value.is_identical(&other.nvm_value)
            && self.data_set_values.len() == other.data_set_values.len()
            && self
                .data_set_values
                .iter()
                .zip(&other.data_set_values)
                .all(|(a, b)| a.is_identical(b))
            && self.access == other.access
            && self.diag_event_call == other.diag_event_call
            && self.nvm_start_address == other.nvm_start_address
    }
}

impl Default for ListElement {
    fn default() -> Self {
        Self::new("", ValueKind::U8)
    }
}

impl ListElement {
    /// Creates a scalar element of `kind` with the kind's full range as limits.
    pub fn new(name: &str, kind: ValueKind) -> Self {
        let mut min = TypedValue::new(kind);
        min.set_to_min();
        let mut max = TypedValue::new(kind);
        max.set_to_max();
        Self {
            name: name.into(),
            comment: String::new(),
            unit: String::new(),
            factor: 1.0,
            offset: 0.0,
            min,
            max,
            value: TypedValue::new(kind),
            nvm_value: TypedValue::new(kind),
            data_set_values: Vec::new(),
            access: AccessMode::ReadWrite,
            diag_event_call: false,
            nvm_start_address: 0,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut TypedValue> {
        [&mut self.min, &mut self.max, &mut self.value, &mut self.nvm_value]
            .into_iter()
            .chain(self.data_set_values.iter_mut())
    }

    /// Changes the kind of every value; limits are reset to the kind's range.
    pub fn set_kind(&mut self, kind: ValueKind) {
        self.values_mut().for_each(|v| v.set_kind(kind));
        self.min.set_to_min();
        self.max.set_to_max();
    }

    /// Switches every value between scalar and array.
    pub fn set_array(&mut self, array: bool) {
        self.values_mut().for_each(|v| v.set_array(array));
        self.min.set_to_min();
        self.max.set_to_max();
    }

    /// Resizes every value of an array element.
    ///
    /// New limit elements take the kind's full range.
    pub fn set_array_len(&mut self, len: usize) -> Result<(), NetCfgError> {
        let old_len = self.value.element_count();
        for v in self.values_mut() {
            v.set_array_len(len)?;
        }
        for index in old_len..len {
            self.min.set_element_to_min(index)?;
            self.max.set_element_to_max(index)?;
        }
        Ok(())
    }

    /// Size of one value in bytes.
    pub fn size_bytes(&self) -> usize {
        self.value.size_bytes()
    }

    /// Returns `true` if every value has the shape of `value`.
    pub fn is_shape_consistent(&self) -> bool {
        [&self.min, &self.max, &self.nvm_value]
            .into_iter()
            .chain(self.data_set_values.iter())
            .all(|v| v.same_shape(&self.value))
    }

    /// Checks current, NVM and data set values against `[min, max]`.
    pub fn check_value_range(&self) -> Result<bool, NetCfgError> {
        for v in [&self.value, &self.nvm_value]
            .into_iter()
            .chain(self.data_set_values.iter())
        {
            if !v.check_range(&self.min, &self.max)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Renders the current physical value.
    pub fn value_as_scaled_string(&self) -> String {
        self.value.scaled_string(self.factor, self.offset)
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(self.name.as_bytes());
        hasher.update(self.comment.as_bytes());
        hasher.update(self.unit.as_bytes());
        hasher.update(&self.factor.to_le_bytes());
        hasher.update(&self.offset.to_le_bytes());
        self.min.calc_hash(hasher);
        self.max.calc_hash(hasher);
        self.value.calc_hash(hasher);
        self.nvm_value.calc_hash(hasher);
        for v in &self.data_set_values {
            v.calc_hash(hasher);
        }
        hasher.update(&[self.access as u8, self.diag_event_call as u8]);
        hasher.update(&self.nvm_start_address.to_le_bytes());
    }
}
