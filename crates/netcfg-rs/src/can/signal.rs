// crates/netcfg-rs/src/can/signal.rs

use crate::types::CAN_MAX_SIGNAL_BITS;

/// Bit numbering convention of a signal inside the message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Little-endian; the start bit is the LSB and bits grow upwards.
    #[default]
    Intel,
    /// Big-endian; the start bit is the LSB and bits continue in the
    /// preceding byte once a byte's MSB is reached.
    Motorola,
}

/// Role of a signal in a multiplexed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiplexerType {
    #[default]
    None,
    /// The signal selecting which multiplexed signals are present.
    Multiplexer,
    /// A signal present only when the multiplexer has `multiplex_value`.
    Multiplexed,
}

/// Bit-layout metadata for one value carried in a CAN message.
///
/// The value itself lives in a list element; `data_element_index` locates it.
/// That index is derived from the message topology and only the owning
/// [`MessageContainer`](super::MessageContainer) rebuilds it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signal {
    pub byte_order: ByteOrder,
    pub start_bit: u16,
    pub bit_length: u16,
    pub multiplexer_type: MultiplexerType,
    pub multiplex_value: u16,
    pub(crate) data_element_index: usize,
}

impl Signal {
    pub fn new(start_bit: u16, bit_length: u16, byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            start_bit,
            bit_length,
            ..Default::default()
        }
    }

    /// Absolute index of the backing element in the direction's list.
    pub fn data_element_index(&self) -> usize {
        self.data_element_index
    }

    /// Copies start bit, length and byte order from `other`.
    pub fn set_position(&mut self, other: &Signal) {
        self.byte_order = other.byte_order;
        self.start_bit = other.start_bit;
        self.bit_length = other.bit_length;
    }

    /// Payload bits occupied by the signal, as a mask over bits 0..64.
    ///
    /// Returns `None` if the length is invalid or any bit falls outside
    /// an 8-byte payload.
    pub fn occupied_bits(&self) -> Option<u64> {
        if self.bit_length == 0 || self.bit_length > CAN_MAX_SIGNAL_BITS {
            return None;
        }
        let mut mask = 0u64;
        let mut pos = self.start_bit as i32;
        for _ in 0..self.bit_length {
            if !(0..64).contains(&pos) {
                return None;
            }
            mask |= 1u64 << pos;
            pos = match self.byte_order {
                ByteOrder::Intel => pos + 1,
                ByteOrder::Motorola if pos % 8 == 7 => pos - 15,
                ByteOrder::Motorola => pos + 1,
            };
        }
        Some(mask)
    }

    /// Returns `true` if payload bit `bit` belongs to this signal.
    pub fn is_bit_inside(&self, bit: u16) -> bool {
        bit < 64 && self.occupied_bits().is_some_and(|m| m & (1u64 << bit) != 0)
    }

    /// Returns `true` if every bit of the signal fits into `dlc` payload bytes.
    pub fn fits_dlc(&self, dlc: u16) -> bool {
        match self.occupied_bits() {
            Some(mask) if dlc >= 8 => mask != 0,
            Some(mask) => mask >> (dlc as u32 * 8) == 0,
            None => false,
        }
    }

    pub fn calc_hash(&self, hasher: &mut crc32fast::Hasher) {
        hasher.update(&[self.byte_order as u8, self.multiplexer_type as u8]);
        hasher.update(&self.start_bit.to_le_bytes());
        hasher.update(&self.bit_length.to_le_bytes());
        hasher.update(&self.multiplex_value.to_le_bytes());
    }
}
