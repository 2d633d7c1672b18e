// crates/netcfg-rs/src/datapool/list.rs

use super::element::ListElement;
use crate::config::is_valid_identifier;
use crate::NetCfgError;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

/// Bytes reserved at the start of a list's NVM area for its CRC.
pub const NVM_LIST_CRC_SIZE: u32 = 2;

/// A named set of alternative values for every element of a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSet {
    pub name: String,
    pub comment: String,
}

/// Findings of [`DataPoolList::check_error_elements`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCheck {
    /// Indices of elements whose name is used more than once (case-insensitive).
    pub elements_conflicting: Vec<usize>,
    /// Indices of elements whose name is not a valid identifier.
    pub elements_invalid_name: Vec<usize>,
    /// Indices of elements with a value outside `[min, max]`.
    pub elements_out_of_range: Vec<usize>,
    /// The elements need more bytes than the list reserves in NVM.
    pub size_exceeded: bool,
}

impl ListCheck {
    pub fn is_ok(&self) -> bool {
        self.elements_conflicting.is_empty()
            && self.elements_invalid_name.is_empty()
            && self.elements_out_of_range.is_empty()
            && !self.size_exceeded
    }
}

/// An ordered sequence of [`ListElement`]s inside a data pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPoolList {
    pub name: String,
    pub comment: String,
    /// Whether a CRC protects the list's NVM area.
    pub nvm_crc_active: bool,
    pub nvm_crc: u32,
    pub nvm_start_address: u32,
    /// Bytes reserved for the list in NVM.
    pub nvm_size: u32,
    pub elements: Vec<ListElement>,
    pub data_sets: Vec<DataSet>,
}

impl DataPoolList {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Gives `element` exactly one value per data set of this list.
    fn fit_data_sets(&self, element: &mut ListElement) {
        let fill = element.value.clone();
        element.data_set_values.resize(self.data_sets.len(), fill);
    }

    /// Inserts one element at `index` (`0..=len`).
    pub fn insert_element(&mut self, index: usize, element: ListElement) -> Result<(), NetCfgError> {
        self.insert_elements(index, alloc::vec![element])
    }

    /// Inserts a run of elements starting at `index` (`0..=len`).
    pub fn insert_elements(
        &mut self,
        index: usize,
        mut elements: Vec<ListElement>,
    ) -> Result<(), NetCfgError> {
        if index > self.elements.len() {
            return Err(NetCfgError::Range("list element offset"));
        }
        for element in &mut elements {
            self.fit_data_sets(element);
        }
        self.elements.splice(index..index, elements);
        Ok(())
    }

    /// Replaces the element at `index`.
    pub fn set_element(&mut self, index: usize, mut element: ListElement) -> Result<(), NetCfgError> {
        if index >= self.elements.len() {
            return Err(NetCfgError::Range("list element offset"));
        }
        self.fit_data_sets(&mut element);
        self.elements[index] = element;
        Ok(())
    }

    /// Removes and returns the element at `index`.
    pub fn delete_element(&mut self, index: usize) -> Result<ListElement, NetCfgError> {
        if index >= self.elements.len() {
            return Err(NetCfgError::Range("list element offset"));
        }
        Ok(self.elements.remove(index))
    }

    /// Removes and returns a contiguous run of elements.
    pub fn delete_elements(&mut self, range: Range<usize>) -> Result<Vec<ListElement>, NetCfgError> {
        if range.start > range.end || range.end > self.elements.len() {
            return Err(NetCfgError::Range("list element offset"));
        }
        Ok(self.elements.drain(range).collect())
    }

    /// Moves the element at `source` so that it ends up at `target`.
    pub fn move_element(&mut self, source: usize, target: usize) -> Result<(), NetCfgError> {
        let len = self.elements.len();
        if source >= len || target >= len {
            return Err(NetCfgError::Range("list element offset"));
        }
        let element = self.elements.remove(source);
        self.elements.insert(target, element);
        Ok(())
    }

    /// Inserts a data set at `index`; every element gets a copy of its current value.
    pub fn insert_data_set(&mut self, index: usize, data_set: DataSet) -> Result<(), NetCfgError> {
        if index > self.data_sets.len() {
            return Err(NetCfgError::Range("data set index"));
        }
        self.data_sets.insert(index, data_set);
        for element in &mut self.elements {
            let value = element.value.clone();
            element.data_set_values.insert(index, value);
        }
        Ok(())
    }

    /// Removes a data set together with every element's value for it.
    pub fn delete_data_set(&mut self, index: usize) -> Result<DataSet, NetCfgError> {
        if index >= self.data_sets.len() {
            return Err(NetCfgError::Range("data set index"));
        }
        for element in &mut self.elements {
            if index < element.data_set_values.len() {
                element.data_set_values.remove(index);
            }
        }
        Ok(self.data_sets.remove(index))
    }

    /// Bytes the elements occupy in NVM, including the CRC if active.
    ///
    /// Saturates at `u32::MAX`, which no list size can hold.
    pub fn num_bytes_used(&self) -> u32 {
        let crc = if self.nvm_crc_active { NVM_LIST_CRC_SIZE } else { 0 };
        self.elements
            .iter()
            .map(|e| u32::try_from(e.size_bytes()).unwrap_or(u32::MAX))
            .fold(crc, u32::saturating_add)
    }

    /// Assigns consecutive NVM addresses to the elements, starting after the CRC.
    ///
    /// Fails without touching any element if an element would start beyond
    /// the 32-bit address space.
    pub fn recalculate_address(&mut self) -> Result<(), NetCfgError> {
        let mut next = Some(self.nvm_start_address);
        if self.nvm_crc_active {
            next = next.and_then(|a| a.checked_add(NVM_LIST_CRC_SIZE));
        }
        let mut addresses = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            let address = next.ok_or(NetCfgError::Range("nvm address"))?;
            addresses.push(address);
            next = u32::try_from(element.size_bytes())
                .ok()
                .and_then(|size| address.checked_add(size));
        }
        for (element, address) in self.elements.iter_mut().zip(addresses) {
            element.nvm_start_address = address;
        }
        Ok(())
    }

    /// Checks element names and values. `check_size` enables the NVM size check.
    pub fn check_error_elements(&self, max_name_len: usize, check_size: bool) -> ListCheck {
        let mut check = ListCheck::default();
        for (i, element) in self.elements.iter().enumerate() {
            let conflict = self
                .elements
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.name.eq_ignore_ascii_case(&element.name));
            if conflict {
                check.elements_conflicting.push(i);
            }
            if !is_valid_identifier(&element.name, max_name_len) {
                check.elements_invalid_name.push(i);
            }
            if !matches!(element.check_value_range(), Ok(true)) {
                check.elements_out_of_range.push(i);
            }
        }
        check.size_exceeded = check_size && self.num_bytes_used() > self.nvm_size;
        check
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(self.name.as_bytes());
        hasher.update(self.comment.as_bytes());
        hasher.update(&[self.nvm_crc_active as u8]);
        hasher.update(&self.nvm_crc.to_le_bytes());
        hasher.update(&self.nvm_start_address.to_le_bytes());
        hasher.update(&self.nvm_size.to_le_bytes());
        for data_set in &self.data_sets {
            hasher.update(data_set.name.as_bytes());
            hasher.update(data_set.comment.as_bytes());
        }
        for element in &self.elements {
            element.calc_hash(hasher);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{TypedValue, ValueKind};
    use alloc::vec;

    fn list_with(names: &[&str]) -> DataPoolList {
        let mut list = DataPoolList::new("List");
        for name in names {
            let index = list.len();
            list.insert_element(index, ListElement::new(name, ValueKind::U16))
                .unwrap();
        }
        list
    }

    #[test]
    fn test_insert_bounds() {
        let mut list = list_with(&["A"]);
        assert!(list.insert_element(1, ListElement::default()).is_ok());
        assert_eq!(
            list.insert_element(3, ListElement::default()),
            Err(NetCfgError::Range("list element offset"))
        );
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_delete_range_and_move() {
        let mut list = list_with(&["A", "B", "C", "D"]);
        let removed = list.delete_elements(1..3).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(list.elements[1].name, "D");
        list.move_element(1, 0).unwrap();
        assert_eq!(list.elements[0].name, "D");
        assert!(list.delete_elements(1..3).is_err());
        assert!(list.move_element(0, 2).is_err());
    }

    #[test]
    fn test_data_sets_follow_elements() {
        let mut list = list_with(&["A"]);
        list.insert_data_set(0, DataSet { name: "Default".into(), ..Default::default() })
            .unwrap();
        assert_eq!(list.elements[0].data_set_values.len(), 1);
        list.insert_element(1, ListElement::new("B", ValueKind::U8)).unwrap();
        assert_eq!(list.elements[1].data_set_values.len(), 1);
        list.delete_data_set(0).unwrap();
        assert!(list.elements.iter().all(|e| e.data_set_values.is_empty()));
    }

    #[test]
    fn test_equality_compares_stored_values() {
        let mut list = list_with(&["A"]);
        list.elements[0].value = TypedValue::new(ValueKind::F32);
        list.elements[0].value.set_f32(f32::NAN).unwrap();
        assert_eq!(list.clone(), list);

        let mut retyped = list_with(&["A"]);
        let mut zero_u8 = retyped.clone();
        zero_u8.elements[0].value = TypedValue::new(ValueKind::U8);
        retyped.elements[0].value = TypedValue::new(ValueKind::F32);
        assert!(zero_u8.elements[0].value == retyped.elements[0].value);
        assert_ne!(zero_u8, retyped);
    }

    #[test]
    fn test_addresses_skip_crc() {
        let mut list = list_with(&["A", "B"]);
        list.nvm_start_address = 0x100;
        list.nvm_crc_active = true;
        list.recalculate_address().unwrap();
        assert_eq!(list.elements[0].nvm_start_address, 0x102);
        assert_eq!(list.elements[1].nvm_start_address, 0x104);
        assert_eq!(list.num_bytes_used(), 6);
    }

    #[test]
    fn test_addresses_past_u32_rejected() {
        let mut list = list_with(&["A", "B"]);
        list.nvm_start_address = 0xFFFF_FFFE;
        assert_eq!(list.recalculate_address(), Err(NetCfgError::Range("nvm address")));
        assert_eq!(list.elements[0].nvm_start_address, 0);

        // The last element may end exactly at the top of the address space.
        list.nvm_start_address = 0xFFFF_FFFC;
        list.recalculate_address().unwrap();
        assert_eq!(list.elements[1].nvm_start_address, 0xFFFF_FFFE);
    }

    #[test]
    fn test_check_error_elements() {
        let mut list = list_with(&["Speed", "speed", "9lives"]);
        list.elements[2].max.set_u16(1).unwrap();
        list.elements[2].value.set_u16(2).unwrap();
        list.nvm_size = 4;
        let check = list.check_error_elements(31, true);
        assert_eq!(check.elements_conflicting, vec![0, 1]);
        assert_eq!(check.elements_invalid_name, vec![2]);
        assert_eq!(check.elements_out_of_range, vec![2]);
        assert!(check.size_exceeded);
        assert!(!check.is_ok());
        assert!(list_with(&["A", "B"]).check_error_elements(31, false).is_ok());
    }
}
