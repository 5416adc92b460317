//! The caller-facing failure taxonomy.
//!
//! Lower layers report [`ProtocolError`] and [`LinkError`]; both fold into
//! [`CommandError`] at the session boundary so callers match on one closed
//! set. Connect and raw I/O failures surface as [`CommandError::NoResponse`]
//! (the peer is unreachable or broken either way); the underlying cause is
//! logged where it happens.

use std::time::Duration;

use thiserror::Error;
use tvcom_link::LinkError;
use tvcom_protocol::{ConfigError, ProtocolError};

/// Everything [`CommandSession::execute`](crate::CommandSession::execute)
/// can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The request string is not a valid command for the device. Raised
    /// before any transport interaction.
    #[error("invalid command {code:?} for {device}")]
    InvalidCommand { device: String, code: String },

    /// The device produced no byte within the response window.
    #[error("device silent for {}ms", after.as_millis())]
    Timeout { after: Duration },

    /// The device could not be reached, or closed the connection before a
    /// full reply.
    #[error("no response from device")]
    NoResponse,

    /// Fewer reply bytes than a full frame.
    #[error("short reply: expected {expected} bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },

    /// The device answered with a non-OK status.
    #[error("device rejected the command: status {status:?}")]
    DeviceNack { status: String },

    /// A well-formed OK reply whose value cannot serve the request: a
    /// relative adjustment needs a level and the device reported something
    /// else.
    #[error("unexpected reply value {value:?}")]
    UnexpectedReply { value: String },

    /// Invalid device or table definitions.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Session-level result alias.
pub type SessionResult<T> = Result<T, CommandError>;

impl From<ProtocolError> for CommandError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidCommand { device, code } => {
                CommandError::InvalidCommand { device, code }
            }
            ProtocolError::ShortFrame { expected, actual } => {
                CommandError::ShortFrame { expected, actual }
            }
            ProtocolError::DeviceNack { status } => CommandError::DeviceNack { status },
        }
    }
}

impl From<LinkError> for CommandError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Timeout { after } => CommandError::Timeout { after },
            LinkError::NoResponse => CommandError::NoResponse,
            LinkError::ShortResponse { expected, actual } => {
                CommandError::ShortFrame { expected, actual }
            }
            LinkError::Connect { .. } | LinkError::Io(_) => CommandError::NoResponse,
        }
    }
}
