//! Command execution against one owned link.
//!
//! A [`CommandSession`] drives the full pipeline for one request: classify
//! the code, resolve relative adjustments through a status query, encode,
//! exchange, decode. The link mutex is taken once per command and held
//! across every exchange the command needs, so concurrent callers cannot
//! interleave frames on the wire.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use tvcom_link::{LinkManager, LinkSession, PeerAddress};
use tvcom_protocol::{
    decode_reply, encode_command, DeviceCommand, DeviceInstance, Reply, MAX_LEVEL, REPLY_LEN,
    STATUS_COMMAND,
};

use crate::error::{CommandError, SessionResult};

/// Decoded meaning of a status reply's value token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusReading {
    /// A slider level.
    Level(u8),
    /// A named code from the device's table.
    Named(String),
    /// A token the table does not map, passed through verbatim.
    Raw(String),
}

/// The outcome of one accepted command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    /// Verbatim status token from the final reply.
    pub raw_status: String,
    /// Verbatim value token from the final reply.
    pub raw_value: String,
    /// Decoded meaning of the value; present for status queries.
    pub reading: Option<StatusReading>,
}

impl CommandResult {
    fn from_reply(reply: Reply) -> Self {
        CommandResult {
            raw_status: reply.status,
            raw_value: reply.value,
            reading: None,
        }
    }
}

/// Executes commands through a shared [`LinkManager`].
///
/// The manager is injected, so several sessions (or several clones of one
/// `Arc`) can share a single transport slot and serialize on it.
pub struct CommandSession {
    link: Arc<LinkManager>,
}

impl CommandSession {
    pub fn new(link: Arc<LinkManager>) -> Self {
        CommandSession { link }
    }

    /// The shared link manager.
    pub fn link(&self) -> &Arc<LinkManager> {
        &self.link
    }

    /// Run one command for `device` against the peer at `peer`.
    ///
    /// Invalid codes are rejected before any transport interaction. A
    /// relative adjustment performs a status exchange, resolves the target
    /// level, then performs the write, both under the same link lock.
    pub fn execute(
        &self,
        device: &DeviceInstance,
        peer: &PeerAddress,
        code: &str,
    ) -> SessionResult<CommandResult> {
        let outcome = self.run(device, peer, code);
        if let Err(err) = &outcome {
            warn!(
                device = device.long_name(),
                code,
                error = %err,
                "command failed"
            );
        }
        outcome
    }

    fn run(
        &self,
        device: &DeviceInstance,
        peer: &PeerAddress,
        code: &str,
    ) -> SessionResult<CommandResult> {
        let command = DeviceCommand::parse(device, code)?;

        let mut link = self.link.session();
        match command {
            DeviceCommand::Named { name, keycode } => {
                debug!(device = device.long_name(), name, "named command");
                let reply = exchange(&mut link, device, peer, &keycode)?;
                Ok(CommandResult::from_reply(reply))
            }
            DeviceCommand::StatusQuery { keycode } => {
                debug!(device = device.long_name(), "status query");
                let reply = exchange(&mut link, device, peer, &keycode)?;
                let reading = decode_reading(device, &reply.value);
                Ok(CommandResult {
                    raw_status: reply.status,
                    raw_value: reply.value,
                    reading: Some(reading),
                })
            }
            DeviceCommand::Absolute { level } => {
                debug!(device = device.long_name(), level, "absolute level");
                let keycode = device.table().level_keycode(level);
                let reply = exchange(&mut link, device, peer, &keycode)?;
                Ok(CommandResult::from_reply(reply))
            }
            DeviceCommand::Relative { delta } => {
                let current = query_level(&mut link, device, peer)?;
                let resolved = resolve_level(current, delta);
                debug!(
                    device = device.long_name(),
                    current, delta, resolved, "relative adjustment"
                );
                let keycode = device.table().level_keycode(resolved);
                let reply = exchange(&mut link, device, peer, &keycode)?;
                Ok(CommandResult::from_reply(reply))
            }
        }
    }
}

/// One encode-exchange-decode cycle on the held link.
fn exchange(
    link: &mut LinkSession<'_>,
    device: &DeviceInstance,
    peer: &PeerAddress,
    keycode: &str,
) -> SessionResult<Reply> {
    let frame = encode_command(device.name(), keycode);
    let bytes = link.exchange(peer, &frame, REPLY_LEN)?;
    Ok(decode_reply(&bytes)?)
}

/// Query current device state and interpret the value as a level.
fn query_level(
    link: &mut LinkSession<'_>,
    device: &DeviceInstance,
    peer: &PeerAddress,
) -> SessionResult<u8> {
    let table = device.table();
    let status_keycode = match table.status_keycode() {
        Some(keycode) => keycode.to_string(),
        // Slider tables always carry a status entry; enforced at build.
        None => {
            return Err(CommandError::InvalidCommand {
                device: device.long_name().to_string(),
                code: STATUS_COMMAND.to_string(),
            })
        }
    };

    let reply = exchange(link, device, peer, &status_keycode)?;
    match table.level_from(&reply.value) {
        Some(level) => Ok(level),
        None => Err(CommandError::UnexpectedReply { value: reply.value }),
    }
}

/// Apply a signed delta to the current level, clamped to the wire range.
fn resolve_level(current: u8, delta: i16) -> u8 {
    (current as i16 + delta).clamp(0, MAX_LEVEL as i16) as u8
}

/// Interpret a status reply's value token for `device`.
fn decode_reading(device: &DeviceInstance, value: &str) -> StatusReading {
    let table = device.table();
    if let Some(level) = table.level_from(value) {
        return StatusReading::Level(level);
    }
    match table.description_for(value) {
        Some(name) => StatusReading::Named(name.to_string()),
        None => StatusReading::Raw(value.to_string()),
    }
}
