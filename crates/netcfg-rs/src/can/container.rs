// crates/netcfg-rs/src/can/container.rs

use super::message::Message;
use crate::config::is_valid_identifier;
use crate::types::{CAN_MAX_DLC, CanMessageId, Direction};
use crate::NetCfgError;
use alloc::vec::Vec;

/// Findings of [`MessageContainer::check_message_local_errors`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCheck {
    pub name_invalid: bool,
    /// The id does not fit its frame format.
    pub id_invalid: bool,
    /// DLC exceeds 8 bytes.
    pub dlc_invalid: bool,
    /// At least one signal fails its layout check.
    pub signals_invalid: bool,
    pub no_signals: bool,
}

impl MessageCheck {
    pub fn is_ok(&self) -> bool {
        !(self.name_invalid
            || self.id_invalid
            || self.dlc_invalid
            || self.signals_invalid
            || self.no_signals)
    }
}

/// The Tx and Rx messages of one protocol on one interface.
///
/// Signals of each direction are backed by one list element each, laid out
/// in message order: message `m`'s first signal lives at the sum of the
/// signal counts of all messages before `m`. The message sequences are only
/// mutable from inside the crate so that the cached signal indices cannot go
/// stale behind the container's back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageContainer {
    /// Whether the protocol is active on this interface.
    pub used: bool,
    pub(crate) tx_messages: Vec<Message>,
    pub(crate) rx_messages: Vec<Message>,
}

impl MessageContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a container from already ordered message sequences and indexes
    /// its signals.
    pub fn from_messages(tx_messages: Vec<Message>, rx_messages: Vec<Message>) -> Self {
        let mut container = Self {
            used: true,
            tx_messages,
            rx_messages,
        };
        container.recalc_data_element_indices();
        container
    }

    pub fn messages(&self, direction: Direction) -> &[Message] {
        match direction {
            Direction::Tx => &self.tx_messages,
            Direction::Rx => &self.rx_messages,
        }
    }

    pub(crate) fn messages_mut(&mut self, direction: Direction) -> &mut Vec<Message> {
        match direction {
            Direction::Tx => &mut self.tx_messages,
            Direction::Rx => &mut self.rx_messages,
        }
    }

    pub fn message(&self, direction: Direction, index: usize) -> Option<&Message> {
        self.messages(direction).get(index)
    }

    /// Total number of signals, and therefore backing elements, in one direction.
    pub fn signal_count(&self, direction: Direction) -> usize {
        self.messages(direction).iter().map(|m| m.signals.len()).sum()
    }

    /// Offset of the first element backing message `message_index`.
    ///
    /// `message_index == len` is accepted and yields the end of the storage.
    pub fn data_start_index(
        &self,
        direction: Direction,
        message_index: usize,
    ) -> Result<usize, NetCfgError> {
        let messages = self.messages(direction);
        if message_index > messages.len() {
            return Err(NetCfgError::Range("message index"));
        }
        Ok(messages[..message_index].iter().map(|m| m.signals.len()).sum())
    }

    /// Assigns every signal of both directions its absolute element index.
    ///
    /// This is the only place `Signal::data_element_index` is written.
    pub fn recalc_data_element_indices(&mut self) {
        for messages in [&mut self.tx_messages, &mut self.rx_messages] {
            let mut index = 0;
            for signal in messages.iter_mut().flat_map(|m| m.signals.iter_mut()) {
                signal.data_element_index = index;
                index += 1;
            }
        }
    }

    /// Element index of a signal, derived from the topology rather than the cache.
    pub fn computed_data_element_index(
        &self,
        direction: Direction,
        message_index: usize,
        signal_index: usize,
    ) -> Option<usize> {
        let message = self.message(direction, message_index)?;
        if signal_index >= message.signals.len() {
            return None;
        }
        let start = self.data_start_index(direction, message_index).ok()?;
        Some(start + signal_index)
    }

    /// Returns `true` if every cached signal index matches the topology.
    pub fn verify_element_indices(&self) -> bool {
        [Direction::Tx, Direction::Rx].into_iter().all(|direction| {
            self.messages(direction)
                .iter()
                .flat_map(|m| m.signals.iter())
                .enumerate()
                .all(|(expected, signal)| signal.data_element_index == expected)
        })
    }

    /// Returns `true` if a message of `direction` other than `exclude` uses `id`.
    pub fn contains_message_id(
        &self,
        direction: Direction,
        id: CanMessageId,
        exclude: Option<usize>,
    ) -> bool {
        self.messages(direction)
            .iter()
            .enumerate()
            .any(|(i, m)| Some(i) != exclude && m.can_id == id)
    }

    /// Returns `true` if a message of `direction` other than `exclude` is
    /// called `name`, compared case-insensitively.
    pub fn contains_message_name(
        &self,
        direction: Direction,
        name: &str,
        exclude: Option<usize>,
    ) -> bool {
        self.messages(direction)
            .iter()
            .enumerate()
            .any(|(i, m)| Some(i) != exclude && m.name.eq_ignore_ascii_case(name))
    }

    /// Checks one message on its own, without looking at other messages.
    pub fn check_message_local_errors(
        &self,
        direction: Direction,
        index: usize,
        max_name_len: usize,
    ) -> Result<MessageCheck, NetCfgError> {
        let message = self
            .message(direction, index)
            .ok_or(NetCfgError::Range("message index"))?;
        Ok(MessageCheck {
            name_invalid: !is_valid_identifier(&message.name, max_name_len),
            id_invalid: !message.can_id.is_valid(),
            dlc_invalid: message.dlc > CAN_MAX_DLC,
            signals_invalid: !message.signals_ok(),
            no_signals: message.signals.is_empty(),
        })
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(&[self.used as u8]);
        for messages in [&self.tx_messages, &self.rx_messages] {
            hasher.update(&(messages.len() as u32).to_le_bytes());
            for message in messages {
                message.calc_hash(hasher);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::can::{ByteOrder, Signal};
    use alloc::vec;

    fn message(name: &str, id: u32, signals: u16) -> Message {
        let mut m = Message::new(name, CanMessageId::new(id, false), 8);
        for i in 0..signals {
            m.signals.push(Signal::new(i * 8, 8, ByteOrder::Intel));
        }
        m
    }

    #[test]
    fn test_indices_follow_topology() {
        let container = MessageContainer::from_messages(
            vec![message("A", 0x100, 2), message("B", 0x101, 1)],
            vec![message("C", 0x200, 3)],
        );
        assert!(container.verify_element_indices());
        assert_eq!(container.tx_messages[1].signals[0].data_element_index(), 2);
        assert_eq!(container.rx_messages[0].signals[2].data_element_index(), 2);
        assert_eq!(container.computed_data_element_index(Direction::Tx, 1, 0), Some(2));
        assert_eq!(container.computed_data_element_index(Direction::Tx, 1, 1), None);
        assert_eq!(container.signal_count(Direction::Tx), 3);
    }

    #[test]
    fn test_stale_cache_is_detected() {
        let mut container =
            MessageContainer::from_messages(vec![message("A", 0x100, 2), message("B", 0x101, 1)], vec![]);
        container.tx_messages.remove(0);
        assert!(!container.verify_element_indices());
        container.recalc_data_element_indices();
        assert!(container.verify_element_indices());
        assert_eq!(container.tx_messages[0].signals[0].data_element_index(), 0);
    }

    #[test]
    fn test_data_start_index_accepts_end() {
        let container = MessageContainer::from_messages(vec![message("A", 0x100, 2)], vec![]);
        assert_eq!(container.data_start_index(Direction::Tx, 1), Ok(2));
        assert_eq!(
            container.data_start_index(Direction::Tx, 2),
            Err(NetCfgError::Range("message index"))
        );
        assert_eq!(container.data_start_index(Direction::Rx, 0), Ok(0));
    }

    #[test]
    fn test_id_and_name_lookup() {
        let container = MessageContainer::from_messages(vec![message("Msg1", 0x100, 1)], vec![]);
        assert!(container.contains_message_id(Direction::Tx, CanMessageId::new(0x100, false), None));
        assert!(!container.contains_message_id(Direction::Tx, CanMessageId::new(0x100, true), None));
        assert!(!container.contains_message_id(Direction::Tx, CanMessageId::new(0x100, false), Some(0)));
        assert!(!container.contains_message_id(Direction::Rx, CanMessageId::new(0x100, false), None));
        assert!(container.contains_message_name(Direction::Tx, "MSG1", None));
    }

    #[test]
    fn test_local_errors() {
        let mut bad = message("1bad", 0x800, 0);
        bad.dlc = 9;
        let container = MessageContainer::from_messages(vec![message("Ok", 0x100, 1), bad], vec![]);
        assert!(container.check_message_local_errors(Direction::Tx, 0, 31).unwrap().is_ok());
        let check = container.check_message_local_errors(Direction::Tx, 1, 31).unwrap();
        assert_eq!(
            check,
            MessageCheck {
                name_invalid: true,
                id_invalid: true,
                dlc_invalid: true,
                signals_invalid: false,
                no_signals: true,
            }
        );
        assert!(container.check_message_local_errors(Direction::Tx, 2, 31).is_err());
    }
}
