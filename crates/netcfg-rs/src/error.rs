// crates/netcfg-rs/src/error.rs

use core::fmt;

/// Defines a portable, descriptive Error type for the configuration model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetCfgError {
    /// An index or offset is outside the valid bounds of the addressed container.
    Range(&'static str),
    /// A typed accessor was used against a value of a different kind or array-ness.
    TypeMismatch,
    /// An array element index is not below the declared array length.
    Access { index: usize, len: usize },
    /// A blob handed to the endian codec does not have exactly the expected size.
    BufferLength { expected: usize, actual: usize },
    /// The value elements supplied with a message do not pair one-to-one with its signals.
    ElementCountMismatch { signals: usize, elements: usize },
    /// A referenced protocol, data pool or list does not exist.
    NotFound(&'static str),
}

impl fmt::Display for NetCfgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(what) => write!(f, "Index out of range: {}", what),
            Self::TypeMismatch => write!(f, "Value kind or array-ness does not match the accessor"),
            Self::Access { index, len } => {
                write!(f, "Array index {} out of bounds for length {}", index, len)
            }
            Self::BufferLength { expected, actual } => {
                write!(f, "Blob has {} bytes, expected exactly {}", actual, expected)
            }
            Self::ElementCountMismatch { signals, elements } => write!(
                f,
                "Message has {} signals but {} value elements were supplied",
                signals, elements
            ),
            Self::NotFound(what) => write!(f, "Not found: {}", what),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NetCfgError {}
