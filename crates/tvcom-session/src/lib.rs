//! Command orchestration for the TV control link.
//!
//! One request travels the whole pipeline here:
//!
//! 1. classify the code against the device's keycode table (no I/O yet);
//! 2. for relative adjustments, query current state and resolve the target
//!    level;
//! 3. encode the frame, exchange it over the owned link, decode the reply;
//! 4. map failures into the closed [`CommandError`] set.
//!
//! The link manager is injected, and its mutex is held for the whole
//! command, so two callers sharing one manager can never interleave their
//! frames on the wire.

mod error;
mod session;

pub use error::{CommandError, SessionResult};
pub use session::{CommandResult, CommandSession, StatusReading};
