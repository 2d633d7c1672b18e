use core::fmt;

// --- CAN Limits (ISO 11898-1) ---

/// Highest identifier of a standard (11-bit) CAN frame.
pub const CAN_STD_ID_MAX: u32 = 0x7FF;

/// Highest identifier of an extended (29-bit) CAN frame.
pub const CAN_EXT_ID_MAX: u32 = 0x1FFF_FFFF;

/// Maximum data length code of a classic CAN frame.
pub const CAN_MAX_DLC: u16 = 8;

/// Maximum number of bits a single signal may occupy.
pub const CAN_MAX_SIGNAL_BITS: u16 = 64;

/// Number of lists a communication data pool holds per interface (Tx, Rx).
pub const COM_LISTS_PER_INTERFACE: usize = 2;

/// Transfer direction of a CAN message as seen from the owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Tx,
    Rx,
}

impl Direction {
    /// Offset of this direction's list inside an interface's (Tx, Rx) list pair.
    pub fn list_offset(self) -> usize {
        match self {
            Direction::Tx => 0,
            Direction::Rx => 1,
        }
    }

    pub fn is_tx(self) -> bool {
        self == Direction::Tx
    }
}

/// Index of the communication list backing `direction` on `interface`, or
/// `None` if it is not representable.
pub fn com_list_index(interface: usize, direction: Direction) -> Option<usize> {
    interface
        .checked_mul(COM_LISTS_PER_INTERFACE)?
        .checked_add(direction.list_offset())
}

/// A CAN identifier together with its frame format.
///
/// Two identifiers collide only if both the numeric id and the extended flag
/// are equal. Ordering is by numeric id first; for equal ids a standard frame
/// sorts before an extended one, and an extended frame is never less than
/// anything with the same numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CanMessageId {
    pub id: u32,
    pub extended: bool,
}

impl CanMessageId {
    pub fn new(id: u32, extended: bool) -> Self {
        Self { id, extended }
    }

    /// Returns `true` if the numeric id fits the frame format.
    pub fn is_valid(&self) -> bool {
        if self.extended {
            self.id <= CAN_EXT_ID_MAX
        } else {
            self.id <= CAN_STD_ID_MAX
        }
    }
}

impl fmt::Display for CanMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extended {
            write!(f, "{:#010X}x", self.id)
        } else {
            write!(f, "{:#05X}", self.id)
        }
    }
}
