//! Error types for the link layer.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::transport::PeerAddress;

/// Errors surfaced by transports and the link manager.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Opening the transport failed.
    #[error("failed to connect to {peer}: {source}")]
    Connect {
        peer: PeerAddress,
        #[source]
        source: io::Error,
    },

    /// The response deadline elapsed with no bytes at all.
    #[error("no data within {}ms", after.as_millis())]
    Timeout { after: Duration },

    /// The peer closed the stream before a full reply arrived.
    #[error("peer closed the stream before a full reply arrived")]
    NoResponse,

    /// The response deadline elapsed mid-frame.
    #[error("short response: expected {expected} bytes, got {actual}")]
    ShortResponse { expected: usize, actual: usize },

    /// The transport failed mid-exchange.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for link operations.
pub type LinkResult<T> = Result<T, LinkError>;
