//! Transport ownership for the TV control link.
//!
//! One device speaks one half-duplex control connection at a time, so the
//! link layer is built around a single owned transport slot:
//!
//! ```text
//!   CommandSession -> LinkManager::session() -> LinkSession (slot locked)
//!                                                    |
//!                                                    v  reuse or redial
//!                                                ActiveLink
//!                                                    |
//!                                                    v  Box<dyn Transport>
//!                                    SerialTransport | TcpTransport
//! ```
//!
//! The slot is established lazily, reused while the peer address stays the
//! same, closed and re-dialed when it changes, and discarded after any
//! transport failure. Reads are deadline-driven and exact-length: a reply
//! either arrives whole within the response window or is classified as
//! [`LinkError::Timeout`], [`LinkError::NoResponse`], or
//! [`LinkError::ShortResponse`].
//!
//! The [`mock`] module provides a scripted transport and a shared event
//! journal for tests that need to observe dialing, frame ordering, and
//! close timing without hardware.

mod error;
mod manager;
pub mod mock;
mod transport;

pub use error::{LinkError, LinkResult};
pub use manager::{LinkConfig, LinkManager, LinkSession, DEFAULT_TIMEOUT};
pub use transport::{
    Dialer, PeerAddress, SerialTransport, StandardDialer, TcpTransport, Transport, DEFAULT_BAUD,
};
