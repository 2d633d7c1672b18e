use alloc::string::String;
use alloc::format;

/// Trait for structs that provide metadata for logging
pub trait LogMetadata {
    fn meta(&self) -> String;
}

/// Locates a communication edit inside a node for log records.
pub struct ComContext<'a> {
    pub node: &'a str,
    pub protocol: crate::can::ProtocolType,
    pub interface: usize,
    pub direction: crate::types::Direction,
}

impl LogMetadata for ComContext<'_> {
    fn meta(&self) -> String {
        format!(
            "node={}, protocol={:?}, interface={}, direction={:?}",
            self.node, self.protocol, self.interface, self.direction
        )
    }
}

// =============================================
// Logging Macros (namespaced under crate::log)
// =============================================

// ===== nc_debug! =====
macro_rules! nc_debug {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::debug!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== nc_error! =====
macro_rules! nc_error {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::error!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== nc_trace! =====
macro_rules! nc_trace {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::trace!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// Re-export macros for use in other files
pub(crate) use nc_debug;
pub(crate) use nc_error;
pub(crate) use nc_trace;
