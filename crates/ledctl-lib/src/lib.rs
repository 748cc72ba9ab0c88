//! ledctl: direct colour control for I2C-attached RGB LED controller banks.

pub mod apply;
pub mod bus;
pub mod config;
pub mod discovery;
pub mod error;
pub mod led;
pub mod probe;
pub mod protocol;

pub use error::LedctlError;
