//! Error types for the TV-com protocol.

use thiserror::Error;

/// Errors raised while building keycode tables and device instances.
///
/// These are load-time failures: an invalid table aborts startup instead of
/// surfacing later during command handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The same keycode appears twice in one table.
    #[error("device {device}: keycode {keycode:?} defined twice")]
    DuplicateKeycode { device: String, keycode: String },

    /// The same command name appears twice in one table.
    #[error("device {device}: command name {name:?} defined twice")]
    DuplicateName { device: String, name: String },

    /// A slider table has no `status` entry to resolve relative commands.
    #[error("device {device}: slider table is missing a status entry")]
    MissingStatusEntry { device: String },

    /// A slider table defines an all-digit command name, which would be
    /// indistinguishable from an absolute level.
    #[error("device {device}: name {name:?} on a slider collides with numeric levels")]
    NumericCommandName { device: String, name: String },

    /// Two device instances share the same long name.
    #[error("device {long_name:?} defined twice in the inventory")]
    DuplicateDevice { long_name: String },
}

/// Errors produced while parsing commands and decoding reply frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The requested code is not valid for this device.
    #[error("invalid command {code:?} for device {device}")]
    InvalidCommand { device: String, code: String },

    /// The reply ended before the fixed frame length was reached.
    #[error("short frame: expected {expected} bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },

    /// The device answered with a non-OK status token.
    #[error("device rejected command: status {status:?}")]
    DeviceNack { status: String },
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
