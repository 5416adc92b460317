//! TV-com serial command protocol
//!
//! This crate provides the protocol vocabulary for driving legacy A/V
//! devices over a serial line or socket bridge: keycode tables, device
//! instances, command classification, and the fixed-format frame codec.
//! It performs no I/O; transports and orchestration live in `tvcom-link`
//! and `tvcom-session`.
//!
//! # Protocol Overview
//!
//! Every logical command is one write-then-read exchange:
//!
//! - **Request** (host → device): ASCII `"<name> 00 <keycode>\r"`, where
//!   `name` is the device's wire token (e.g. `kf` for volume) and `keycode`
//!   is a 2-character code from the device's table or, for sliders, a
//!   level 0-100 encoded as 2 hex characters.
//! - **Reply** (device → host): exactly 10 bytes, with a status token
//!   (`OK`/`NG`) at offsets 5-6 and a value token at offsets 7-8.
//!
//! # Command Types
//!
//! Raw request strings classify into a closed set before any I/O:
//!
//! - **Named**: a key of the device's table (`on`, `hdmi1`, ...)
//! - **StatusQuery**: the literal `status`, decoded through the table
//! - **Absolute**: a 1-3 digit level on a slider (`25`)
//! - **Relative**: a signed delta on a slider (`+5`, `-15`), resolved by
//!   querying current state first
//!
//! # Example
//!
//! ```rust,ignore
//! use tvcom_protocol::{encode_command, decode_reply, DeviceCommand, DeviceInventory};
//!
//! let inventory = DeviceInventory::standard()?;
//! let volume = inventory.get("volume").unwrap();
//!
//! // Classify a request, then build its frame
//! let command = DeviceCommand::parse(volume, "25")?;
//! let frame = encode_command(volume.name(), "19");
//!
//! // Parse a reply
//! let reply = decode_reply(b"f 01 OK19x")?;
//! assert_eq!(reply.value, "19");
//! ```

mod command;
mod device;
mod error;
mod frame;
mod keycode;

pub use command::*;
pub use device::*;
pub use error::*;
pub use frame::*;
pub use keycode::*;
