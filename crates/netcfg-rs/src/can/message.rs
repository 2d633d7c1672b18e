// crates/netcfg-rs/src/can/message.rs

use super::signal::{MultiplexerType, Signal};
use crate::types::{CAN_MAX_DLC, CanMessageId};
use alloc::string::String;
use alloc::vec::Vec;

/// When a transmit message is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxMethod {
    /// Sent every `cycle_time_ms`.
    #[default]
    Cyclic,
    /// Sent on value change, at most every `delay_time_ms` and at least every `cycle_time_ms`.
    OnChange,
    /// Sent when the application requests it.
    OnEvent,
}

/// Findings of [`Message::check_signal_errors`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCheck {
    /// Length is zero or exceeds 64 bits.
    pub length_invalid: bool,
    /// At least one bit lies beyond the message's DLC.
    pub outside_dlc: bool,
    /// Shares payload bits with another signal that can be present at the same time.
    pub overlap: bool,
}

impl SignalCheck {
    pub fn is_ok(&self) -> bool {
        !self.length_invalid && !self.outside_dlc && !self.overlap
    }
}

/// A CAN message definition with its ordered signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub comment: String,
    pub can_id: CanMessageId,
    /// Data length code in bytes.
    pub dlc: u16,
    pub tx_method: TxMethod,
    pub cycle_time_ms: u32,
    pub delay_time_ms: u16,
    /// Receive timeout; zero disables supervision.
    pub timeout_ms: u32,
    pub signals: Vec<Signal>,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            name: String::new(),
            comment: String::new(),
            can_id: CanMessageId::default(),
            dlc: CAN_MAX_DLC,
            tx_method: TxMethod::Cyclic,
            cycle_time_ms: 100,
            delay_time_ms: 0,
            timeout_ms: 0,
            signals: Vec::new(),
        }
    }
}

impl Message {
    pub fn new(name: &str, can_id: CanMessageId, dlc: u16) -> Self {
        Self {
            name: name.into(),
            can_id,
            dlc,
            ..Default::default()
        }
    }

    /// Builder-style helper appending a signal.
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn is_multiplexed(&self) -> bool {
        self.multiplexer_index().is_some()
    }

    /// Index of the multiplexer signal, if the message has one.
    pub fn multiplexer_index(&self) -> Option<usize> {
        self.signals
            .iter()
            .position(|s| s.multiplexer_type == MultiplexerType::Multiplexer)
    }

    /// Two signals can be present in the same frame unless both are
    /// multiplexed under different multiplexer values.
    fn can_coexist(a: &Signal, b: &Signal) -> bool {
        !(a.multiplexer_type == MultiplexerType::Multiplexed
            && b.multiplexer_type == MultiplexerType::Multiplexed
            && a.multiplex_value != b.multiplex_value)
    }

    /// Checks one signal's layout against the DLC and the other signals.
    ///
    /// Returns `None` if `index` does not address a signal.
    pub fn check_signal_errors(&self, index: usize) -> Option<SignalCheck> {
        let signal = self.signals.get(index)?;
        let mut check = SignalCheck::default();
        let Some(mask) = signal.occupied_bits() else {
            check.length_invalid = signal.bit_length == 0 || signal.bit_length > 64;
            check.outside_dlc = !check.length_invalid;
            return Some(check);
        };
        check.outside_dlc = !signal.fits_dlc(self.dlc);
        check.overlap = self.signals.iter().enumerate().any(|(j, other)| {
            j != index
                && Self::can_coexist(signal, other)
                && other.occupied_bits().is_some_and(|m| m & mask != 0)
        });
        Some(check)
    }

    /// Returns `true` if every signal passes [`Message::check_signal_errors`].
    pub fn signals_ok(&self) -> bool {
        (0..self.signals.len())
            .all(|i| self.check_signal_errors(i).is_some_and(|c| c.is_ok()))
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(self.name.as_bytes());
        hasher.update(self.comment.as_bytes());
        hasher.update(&self.can_id.id.to_le_bytes());
        hasher.update(&[self.can_id.extended as u8, self.tx_method as u8]);
        hasher.update(&self.dlc.to_le_bytes());
        hasher.update(&self.cycle_time_ms.to_le_bytes());
        hasher.update(&self.delay_time_ms.to_le_bytes());
        hasher.update(&self.timeout_ms.to_le_bytes());
        for signal in &self.signals {
            signal.calc_hash(hasher);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::can::ByteOrder;

    fn msg() -> Message {
        Message::new("Msg1", CanMessageId::new(0x100, false), 2)
    }

    #[test]
    fn test_clean_layout() {
        let m = msg()
            .with_signal(Signal::new(0, 8, ByteOrder::Intel))
            .with_signal(Signal::new(8, 8, ByteOrder::Intel));
        assert!(m.signals_ok());
        assert!(m.check_signal_errors(2).is_none());
    }

    #[test]
    fn test_overlap_and_dlc() {
        let m = msg()
            .with_signal(Signal::new(0, 12, ByteOrder::Intel))
            .with_signal(Signal::new(8, 16, ByteOrder::Intel));
        let first = m.check_signal_errors(0).unwrap();
        assert!(first.overlap);
        assert!(!first.outside_dlc);
        let second = m.check_signal_errors(1).unwrap();
        assert!(second.overlap && second.outside_dlc);
    }

    #[test]
    fn test_invalid_length_and_payload() {
        let m = msg()
            .with_signal(Signal::new(0, 0, ByteOrder::Intel))
            .with_signal(Signal::new(60, 8, ByteOrder::Intel));
        assert_eq!(
            m.check_signal_errors(0),
            Some(SignalCheck { length_invalid: true, outside_dlc: false, overlap: false })
        );
        assert_eq!(
            m.check_signal_errors(1),
            Some(SignalCheck { length_invalid: false, outside_dlc: true, overlap: false })
        );
    }

    #[test]
    fn test_multiplexed_signals_share_bits() {
        let mut mux = Signal::new(0, 4, ByteOrder::Intel);
        mux.multiplexer_type = MultiplexerType::Multiplexer;
        let mut a = Signal::new(8, 8, ByteOrder::Intel);
        a.multiplexer_type = MultiplexerType::Multiplexed;
        a.multiplex_value = 1;
        let mut b = a.clone();
        b.multiplex_value = 2;
        let m = msg().with_signal(mux).with_signal(a).with_signal(b.clone());
        assert!(m.is_multiplexed());
        assert_eq!(m.multiplexer_index(), Some(0));
        assert!(m.signals_ok());

        // Same multiplex value collides again.
        let mut clash = m.clone();
        clash.signals[2].multiplex_value = 1;
        assert!(clash.check_signal_errors(2).unwrap().overlap);
    }
}
