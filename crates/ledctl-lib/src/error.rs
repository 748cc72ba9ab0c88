//! Unified error type for the ledctl-lib crate.
//!
//! [`LedctlError`] wraps the bus-level [`BusError`] and the domain errors of
//! discovery, configuration and colour parsing. `From` impls allow `?` to
//! propagate across module boundaries.

use std::fmt;

use crate::bus::BusError;

/// Unified error type for ledctl-lib operations.
#[derive(Debug)]
pub enum LedctlError {
    /// Adapter communication error (open, ioctl).
    Bus(BusError),
    /// Adapter directory could not be listed.
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Colour parsing error.
    Color(String),
    /// No device node matched the adapter pattern.
    NoAdapters { pattern: String },
    /// No adapter acknowledged the probe address.
    NoResponder { address: u8 },
}

impl fmt::Display for LedctlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedctlError::Bus(e) => write!(f, "{e}"),
            LedctlError::Io(e) => write!(f, "I/O error: {e}"),
            LedctlError::Config(e) => write!(f, "Config error: {e}"),
            LedctlError::Color(e) => write!(f, "{e}"),
            LedctlError::NoAdapters { pattern } => {
                write!(f, "No I2C adapters found at {pattern}")
            }
            LedctlError::NoResponder { address } => write!(
                f,
                "No adapter with a responding device at 0x{address:02x} was found."
            ),
        }
    }
}

impl std::error::Error for LedctlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedctlError::Bus(e) => Some(e),
            LedctlError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BusError> for LedctlError {
    fn from(e: BusError) -> Self {
        LedctlError::Bus(e)
    }
}

impl From<std::io::Error> for LedctlError {
    fn from(e: std::io::Error) -> Self {
        LedctlError::Io(e)
    }
}

/// Crate-level Result alias using [`LedctlError`].
pub type Result<T> = std::result::Result<T, LedctlError>;
