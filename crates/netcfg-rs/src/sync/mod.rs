// crates/netcfg-rs/src/sync/mod.rs
//! Paired structural edits on CAN message topology and list element storage.
//!
//! A [`SyncEngine`] borrows one [`MessageContainer`] together with the Tx and
//! Rx lists backing it. Every mutator validates its indices first, performs
//! the message edit and the matching element edit, and finishes by rebuilding
//! the signal index cache, so the three structures are consistent whenever a
//! call returns.

use crate::can::{Message, MessageContainer, Signal};
use crate::datapool::{AccessMode, DataPoolList, ListElement};
use crate::types::Direction;
use crate::NetCfgError;
use alloc::vec::Vec;
use log::{error, trace};

pub struct SyncEngine<'a> {
    container: &'a mut MessageContainer,
    tx_list: &'a mut DataPoolList,
    rx_list: &'a mut DataPoolList,
    /// Access mode given to elements created by inserts.
    default_access: AccessMode,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        container: &'a mut MessageContainer,
        tx_list: &'a mut DataPoolList,
        rx_list: &'a mut DataPoolList,
        default_access: AccessMode,
    ) -> Self {
        Self {
            container,
            tx_list,
            rx_list,
            default_access,
        }
    }

    pub fn container(&self) -> &MessageContainer {
        &*self.container
    }

    pub fn list(&self, direction: Direction) -> &DataPoolList {
        match direction {
            Direction::Tx => &*self.tx_list,
            Direction::Rx => &*self.rx_list,
        }
    }

    fn parts(&mut self, direction: Direction) -> (&mut MessageContainer, &mut DataPoolList) {
        let list = match direction {
            Direction::Tx => &mut *self.tx_list,
            Direction::Rx => &mut *self.rx_list,
        };
        (&mut *self.container, list)
    }

    fn check_element_count(message: &Message, elements: &[ListElement]) -> Result<(), NetCfgError> {
        if message.signals.len() != elements.len() {
            error!(
                "Message '{}' has {} signals but {} value elements were supplied",
                message.name,
                message.signals.len(),
                elements.len()
            );
            return Err(NetCfgError::ElementCountMismatch {
                signals: message.signals.len(),
                elements: elements.len(),
            });
        }
        Ok(())
    }

    /// Resolves the storage run of an existing message as `(start, len)`.
    fn message_span(&self, direction: Direction, index: usize) -> Result<(usize, usize), NetCfgError> {
        let Some(message) = self.container.message(direction, index) else {
            error!("{:?} message index {} out of range", direction, index);
            return Err(NetCfgError::Range("message index"));
        };
        let start = self.container.data_start_index(direction, index)?;
        let len = message.signals.len();
        if start + len > self.list(direction).len() {
            error!(
                "{:?} elements {}..{} of message '{}' exceed list length {}",
                direction,
                start,
                start + len,
                message.name,
                self.list(direction).len()
            );
            return Err(NetCfgError::Range("list element offset"));
        }
        Ok((start, len))
    }

    /// Resolves the element offset of signal `signal_index` of a message.
    ///
    /// With `inserting` the index may equal the signal count.
    fn signal_offset(
        &self,
        direction: Direction,
        message_index: usize,
        signal_index: usize,
        inserting: bool,
    ) -> Result<usize, NetCfgError> {
        let (start, len) = self.message_span(direction, message_index)?;
        let valid = if inserting { signal_index <= len } else { signal_index < len };
        if !valid {
            error!(
                "{:?} signal index {} out of range for message {} with {} signals",
                direction, signal_index, message_index, len
            );
            return Err(NetCfgError::Range("signal index"));
        }
        Ok(start + signal_index)
    }

    // --- Message Operations ---

    /// Inserts `message` at `index` (`0..=len`) together with one value
    /// element per signal.
    pub fn insert_message(
        &mut self,
        direction: Direction,
        index: usize,
        message: Message,
        mut elements: Vec<ListElement>,
    ) -> Result<(), NetCfgError> {
        Self::check_element_count(&message, &elements)?;
        let start = match self.container.data_start_index(direction, index) {
            Ok(start) => start,
            Err(e) => {
                error!("{:?} message insert index {} out of range", direction, index);
                return Err(e);
            }
        };
        if start > self.list(direction).len() {
            error!(
                "{:?} element offset {} exceeds list length {}",
                direction,
                start,
                self.list(direction).len()
            );
            return Err(NetCfgError::Range("list element offset"));
        }

        for element in &mut elements {
            element.access = self.default_access;
        }
        let (container, list) = self.parts(direction);
        list.insert_elements(start, elements)?;
        trace!(
            "Inserted {:?} message '{}' ({}) at {} with elements from {}",
            direction, message.name, message.can_id, index, start
        );
        container.messages_mut(direction).insert(index, message);
        container.recalc_data_element_indices();
        Ok(())
    }

    /// Replaces the message at `index`.
    ///
    /// If `new_direction` equals `direction` the message and its elements are
    /// replaced in place. Otherwise the message moves to the end of
    /// `new_direction`; the move is staged on copies and only committed once
    /// both halves have succeeded.
    pub fn set_message(
        &mut self,
        direction: Direction,
        index: usize,
        new_direction: Direction,
        message: Message,
        elements: Vec<ListElement>,
    ) -> Result<(), NetCfgError> {
        Self::check_element_count(&message, &elements)?;
        if new_direction != direction {
            return self.move_message(direction, index, new_direction, message, elements);
        }

        let (start, old_len) = self.message_span(direction, index)?;
        let default_access = self.default_access;
        let (container, list) = self.parts(direction);
        list.delete_elements(start..start + old_len)?;
        let elements = elements
            .into_iter()
            .map(|mut e| {
                e.access = default_access;
                e
            })
            .collect();
        list.insert_elements(start, elements)?;
        trace!(
            "Replaced {:?} message {} with '{}' ({})",
            direction, index, message.name, message.can_id
        );
        container.messages_mut(direction)[index] = message;
        container.recalc_data_element_indices();
        Ok(())
    }

    fn move_message(
        &mut self,
        direction: Direction,
        index: usize,
        new_direction: Direction,
        message: Message,
        elements: Vec<ListElement>,
    ) -> Result<(), NetCfgError> {
        let mut container = self.container.clone();
        let mut tx_list = self.tx_list.clone();
        let mut rx_list = self.rx_list.clone();
        {
            let mut staged =
                SyncEngine::new(&mut container, &mut tx_list, &mut rx_list, self.default_access);
            staged.delete_message(direction, index)?;
            let tail = staged.container.messages(new_direction).len();
            staged.insert_message(new_direction, tail, message, elements)?;
        }
        *self.container = container;
        *self.tx_list = tx_list;
        *self.rx_list = rx_list;
        trace!(
            "Moved {:?} message {} to the end of {:?}",
            direction, index, new_direction
        );
        Ok(())
    }

    /// Removes the message at `index` and the elements backing its signals.
    pub fn delete_message(
        &mut self,
        direction: Direction,
        index: usize,
    ) -> Result<(Message, Vec<ListElement>), NetCfgError> {
        let (start, len) = self.message_span(direction, index)?;
        let (container, list) = self.parts(direction);
        let elements = if len > 0 {
            list.delete_elements(start..start + len)?
        } else {
            Vec::new()
        };
        let message = container.messages_mut(direction).remove(index);
        container.recalc_data_element_indices();
        trace!(
            "Deleted {:?} message {} '{}' and {} elements",
            direction, index, message.name, elements.len()
        );
        Ok((message, elements))
    }

    // --- Signal Operations ---

    /// Inserts a signal and its value element at `signal_index` (`0..=len`).
    pub fn insert_signal(
        &mut self,
        direction: Direction,
        message_index: usize,
        signal_index: usize,
        signal: Signal,
        mut element: ListElement,
    ) -> Result<(), NetCfgError> {
        let offset = self.signal_offset(direction, message_index, signal_index, true)?;
        element.access = self.default_access;
        let (container, list) = self.parts(direction);
        list.insert_element(offset, element)?;
        container.messages_mut(direction)[message_index]
            .signals
            .insert(signal_index, signal);
        container.recalc_data_element_indices();
        trace!(
            "Inserted {:?} signal {} into message {} at element {}",
            direction, signal_index, message_index, offset
        );
        Ok(())
    }

    /// Replaces a signal and its value element.
    pub fn set_signal(
        &mut self,
        direction: Direction,
        message_index: usize,
        signal_index: usize,
        signal: Signal,
        element: ListElement,
    ) -> Result<(), NetCfgError> {
        let offset = self.signal_offset(direction, message_index, signal_index, false)?;
        let (container, list) = self.parts(direction);
        list.set_element(offset, element)?;
        container.messages_mut(direction)[message_index].signals[signal_index] = signal;
        container.recalc_data_element_indices();
        trace!(
            "Replaced {:?} signal {} of message {} at element {}",
            direction, signal_index, message_index, offset
        );
        Ok(())
    }

    /// Changes only the bit position of a signal; storage is untouched.
    pub fn set_signal_position(
        &mut self,
        direction: Direction,
        message_index: usize,
        signal_index: usize,
        position: &Signal,
    ) -> Result<(), NetCfgError> {
        self.signal_offset(direction, message_index, signal_index, false)?;
        let container = &mut *self.container;
        container.messages_mut(direction)[message_index].signals[signal_index].set_position(position);
        container.recalc_data_element_indices();
        Ok(())
    }

    /// Changes only the multiplex value of a signal.
    pub fn set_signal_mux_value(
        &mut self,
        direction: Direction,
        message_index: usize,
        signal_index: usize,
        multiplex_value: u16,
    ) -> Result<(), NetCfgError> {
        self.signal_offset(direction, message_index, signal_index, false)?;
        self.container.messages_mut(direction)[message_index].signals[signal_index].multiplex_value =
            multiplex_value;
        Ok(())
    }

    /// Removes a signal and its value element.
    pub fn delete_signal(
        &mut self,
        direction: Direction,
        message_index: usize,
        signal_index: usize,
    ) -> Result<(Signal, ListElement), NetCfgError> {
        let offset = self.signal_offset(direction, message_index, signal_index, false)?;
        let (container, list) = self.parts(direction);
        let element = list.delete_element(offset)?;
        let signal = container.messages_mut(direction)[message_index]
            .signals
            .remove(signal_index);
        container.recalc_data_element_indices();
        trace!(
            "Deleted {:?} signal {} of message {} at element {}",
            direction, signal_index, message_index, offset
        );
        Ok((signal, element))
    }

    // --- Consistency ---

    /// Rebuilds the signal index cache.
    pub fn recalc(&mut self) {
        self.container.recalc_data_element_indices();
    }

    /// Returns `true` if the cached indices match the topology and each list
    /// holds exactly one element per signal of its direction.
    pub fn verify(&self) -> bool {
        self.container.verify_element_indices()
            && [Direction::Tx, Direction::Rx]
                .into_iter()
                .all(|d| self.container.signal_count(d) == self.list(d).len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::can::ByteOrder;
    use crate::types::CanMessageId;
    use crate::value::ValueKind;
    use alloc::format;

    struct Fixture {
        container: MessageContainer,
        tx: DataPoolList,
        rx: DataPoolList,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                container: MessageContainer::new(),
                tx: DataPoolList::new("CAN1_TX"),
                rx: DataPoolList::new("CAN1_RX"),
            }
        }

        fn engine(&mut self) -> SyncEngine<'_> {
            SyncEngine::new(&mut self.container, &mut self.tx, &mut self.rx, AccessMode::ReadWrite)
        }
    }

    fn message(name: &str, id: u32, signals: u16) -> (Message, Vec<ListElement>) {
        let mut m = Message::new(name, CanMessageId::new(id, false), 8);
        let mut elements = Vec::new();
        for i in 0..signals {
            m.signals.push(Signal::new(i * 8, 8, ByteOrder::Intel));
            elements.push(ListElement::new(&format!("{}_Sig{}", name, i), ValueKind::U8));
        }
        (m, elements)
    }

    #[test]
    fn test_insert_message_appends_elements() {
        let mut f = Fixture::new();
        let mut engine = f.engine();
        let (m, e) = message("Msg1", 0x100, 2);
        engine.insert_message(Direction::Tx, 0, m, e).unwrap();
        let (m, e) = message("Msg0", 0x0FF, 1);
        engine.insert_message(Direction::Tx, 0, m, e).unwrap();
        assert!(engine.verify());
        assert_eq!(engine.list(Direction::Tx).elements[0].name, "Msg0_Sig0");
        assert_eq!(engine.container().messages(Direction::Tx)[1].signals[0].data_element_index(), 1);
    }

    #[test]
    fn test_insert_rejects_bad_input_without_changes() {
        let mut f = Fixture::new();
        let mut engine = f.engine();
        let (m, mut e) = message("Msg1", 0x100, 2);
        e.pop();
        assert_eq!(
            engine.insert_message(Direction::Tx, 0, m, e),
            Err(NetCfgError::ElementCountMismatch { signals: 2, elements: 1 })
        );
        let (m, e) = message("Msg1", 0x100, 2);
        assert_eq!(
            engine.insert_message(Direction::Tx, 1, m, e),
            Err(NetCfgError::Range("message index"))
        );
        assert!(engine.list(Direction::Tx).is_empty());
        assert!(engine.container().messages(Direction::Tx).is_empty());
    }

    #[test]
    fn test_safety_access_applied() {
        let mut f = Fixture::new();
        let mut engine =
            SyncEngine::new(&mut f.container, &mut f.tx, &mut f.rx, AccessMode::ReadOnly);
        let (m, e) = message("Msg1", 0x100, 2);
        engine.insert_message(Direction::Rx, 0, m, e).unwrap();
        assert!(f.rx.elements.iter().all(|e| e.access == AccessMode::ReadOnly));
    }

    #[test]
    fn test_set_message_in_place() {
        let mut f = Fixture::new();
        let mut engine = f.engine();
        for (i, (name, n)) in [("A", 1), ("B", 2), ("C", 1)].into_iter().enumerate() {
            let (m, e) = message(name, 0x100 + i as u32, n);
            engine.insert_message(Direction::Tx, i, m, e).unwrap();
        }
        let (m, e) = message("B2", 0x200, 3);
        engine.set_message(Direction::Tx, 1, Direction::Tx, m, e).unwrap();
        assert!(engine.verify());
        let names: Vec<_> = engine.list(Direction::Tx).elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["A_Sig0", "B2_Sig0", "B2_Sig1", "B2_Sig2", "C_Sig0"]);
        assert_eq!(engine.container().messages(Direction::Tx)[2].signals[0].data_element_index(), 4);
    }

    #[test]
    fn test_set_message_changes_direction() {
        let mut f = Fixture::new();
        let mut engine = f.engine();
        let (m, e) = message("A", 0x100, 2);
        engine.insert_message(Direction::Tx, 0, m, e).unwrap();
        let (m, e) = message("B", 0x101, 1);
        engine.insert_message(Direction::Tx, 1, m, e).unwrap();
        let (m, e) = message("R", 0x300, 1);
        engine.insert_message(Direction::Rx, 0, m, e).unwrap();

        let (m, e) = message("A", 0x100, 2);
        engine.set_message(Direction::Tx, 0, Direction::Rx, m, e).unwrap();
        assert!(engine.verify());
        let container = engine.container();
        assert_eq!(container.messages(Direction::Tx).len(), 1);
        assert_eq!(container.messages(Direction::Rx)[1].name, "A");
        assert_eq!(container.messages(Direction::Rx)[1].signals[1].data_element_index(), 2);
        assert_eq!(engine.list(Direction::Rx).elements[1].name, "A_Sig0");
    }

    #[test]
    fn test_failed_direction_change_leaves_no_partial_state() {
        let mut f = Fixture::new();
        {
            let mut engine = f.engine();
            let (m, e) = message("A", 0x100, 1);
            engine.insert_message(Direction::Tx, 0, m, e).unwrap();
            let (m, e) = message("R", 0x300, 2);
            engine.insert_message(Direction::Rx, 0, m, e).unwrap();
        }
        // Corrupt the Rx storage so that inserting at its tail must fail.
        f.rx.delete_element(1).unwrap();
        let before_tx = f.tx.clone();
        let before_container = f.container.clone();

        let mut engine = f.engine();
        let (m, e) = message("A", 0x100, 1);
        assert_eq!(
            engine.set_message(Direction::Tx, 0, Direction::Rx, m, e),
            Err(NetCfgError::Range("list element offset"))
        );
        assert_eq!(f.container, before_container);
        assert_eq!(f.tx, before_tx);
    }

    #[test]
    fn test_delete_message_shifts_indices() {
        let mut f = Fixture::new();
        let mut engine = f.engine();
        let (m, e) = message("Msg1", 0x100, 2);
        engine.insert_message(Direction::Tx, 0, m, e).unwrap();
        let (m, e) = message("Msg2", 0x101, 1);
        engine.insert_message(Direction::Tx, 1, m, e).unwrap();
        assert_eq!(engine.container().messages(Direction::Tx)[1].signals[0].data_element_index(), 2);

        let (deleted, elements) = engine.delete_message(Direction::Tx, 0).unwrap();
        assert_eq!(deleted.name, "Msg1");
        assert_eq!(elements.len(), 2);
        assert_eq!(engine.container().messages(Direction::Tx)[0].signals[0].data_element_index(), 0);
        assert!(engine.verify());
        assert!(engine.delete_message(Direction::Tx, 1).is_err());
    }

    #[test]
    fn test_signal_edits_pair_with_elements() {
        let mut f = Fixture::new();
        let mut engine = f.engine();
        let (m, e) = message("A", 0x100, 1);
        engine.insert_message(Direction::Tx, 0, m, e).unwrap();
        let (m, e) = message("B", 0x101, 1);
        engine.insert_message(Direction::Tx, 1, m, e).unwrap();

        engine
            .insert_signal(
                Direction::Tx,
                0,
                1,
                Signal::new(8, 8, ByteOrder::Intel),
                ListElement::new("A_New", ValueKind::U8),
            )
            .unwrap();
        assert!(engine.verify());
        assert_eq!(engine.list(Direction::Tx).elements[1].name, "A_New");
        assert_eq!(engine.container().messages(Direction::Tx)[1].signals[0].data_element_index(), 2);

        engine
            .set_signal(
                Direction::Tx,
                0,
                1,
                Signal::new(16, 4, ByteOrder::Intel),
                ListElement::new("A_Set", ValueKind::U16),
            )
            .unwrap();
        assert_eq!(engine.list(Direction::Tx).elements[1].name, "A_Set");

        let (signal, element) = engine.delete_signal(Direction::Tx, 0, 1).unwrap();
        assert_eq!(signal.start_bit, 16);
        assert_eq!(element.name, "A_Set");
        assert!(engine.verify());
        assert!(engine.delete_signal(Direction::Tx, 0, 1).is_err());
        assert!(engine
            .insert_signal(Direction::Tx, 0, 3, Signal::default(), ListElement::default())
            .is_err());
    }

    #[test]
    fn test_position_and_mux_edits_leave_storage_alone() {
        let mut f = Fixture::new();
        {
            let mut engine = f.engine();
            let (m, e) = message("A", 0x100, 2);
            engine.insert_message(Direction::Tx, 0, m, e).unwrap();
        }
        let storage = f.tx.clone();
        let mut engine = f.engine();
        engine
            .set_signal_position(Direction::Tx, 0, 1, &Signal::new(32, 16, ByteOrder::Motorola))
            .unwrap();
        engine.set_signal_mux_value(Direction::Tx, 0, 1, 7).unwrap();
        assert!(engine.set_signal_mux_value(Direction::Tx, 0, 2, 7).is_err());
        assert!(engine.verify());
        let signal = &f.container.messages(Direction::Tx)[0].signals[1];
        assert_eq!((signal.start_bit, signal.bit_length, signal.multiplex_value), (32, 16, 7));
        assert_eq!(f.tx, storage);
    }

    #[test]
    fn test_recalc_is_idempotent() {
        let mut f = Fixture::new();
        let mut engine = f.engine();
        let (m, e) = message("A", 0x100, 3);
        engine.insert_message(Direction::Tx, 0, m, e).unwrap();
        let (m, e) = message("B", 0x101, 2);
        engine.insert_message(Direction::Tx, 1, m, e).unwrap();
        let before = engine.container().clone();
        engine.recalc();
        engine.recalc();
        assert_eq!(engine.container(), &before);
    }

    #[test]
    fn test_empty_message_occupies_no_elements() {
        let mut f = Fixture::new();
        let mut engine = f.engine();
        let (m, e) = message("Empty", 0x100, 0);
        engine.insert_message(Direction::Tx, 0, m, e).unwrap();
        let (m, e) = message("B", 0x101, 1);
        engine.insert_message(Direction::Tx, 1, m, e).unwrap();
        let (_, elements) = engine.delete_message(Direction::Tx, 0).unwrap();
        assert!(elements.is_empty());
        assert!(engine.verify());
        assert_eq!(engine.list(Direction::Tx).len(), 1);
    }
}
