//! Frame encoding/decoding for the TV-com wire format.
//!
//! Requests are short ASCII frames terminated with a carriage return: the
//! device's wire token, the set address, and a keycode, space-separated.
//!
//! ```text
//! +------+-----+------+-----+---------+------+
//! | name | ' ' | "00" | ' ' | keycode | '\r' |
//! +------+-----+------+-----+---------+------+
//! ```
//!
//! Replies are exactly [`REPLY_LEN`] bytes. Only two fields matter: the
//! status token at offsets 5-6 (`"OK"` or `"NG"`) and the value token at
//! offsets 7-8. The leading bytes echo the command and set address and are
//! not inspected.
//!
//! ```text
//! offset:   0     1    2    3    4    5    6    7    8    9
//!         +----+-----+----+----+-----+---------+---------+----+
//!         | a  | ' ' | 0  | 1  | ' ' | status  |  value  | x  |
//!         +----+-----+----+----+-----+---------+---------+----+
//! ```

use bytes::{BufMut, BytesMut};

use crate::error::{ProtocolError, ProtocolResult};

/// Set address token placed in every request.
pub const SET_ADDRESS: &str = "00";

/// Fixed reply frame length.
pub const REPLY_LEN: usize = 10;

/// Status token for an accepted command.
pub const STATUS_OK: &str = "OK";

/// Status token for a rejected command.
pub const STATUS_NACK: &str = "NG";

/// Byte offset of the status token within a reply.
const STATUS_OFFSET: usize = 5;

/// Byte offset of the value token within a reply.
const VALUE_OFFSET: usize = 7;

/// Length of the status and value tokens.
const TOKEN_LEN: usize = 2;

/// A successfully decoded reply frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Verbatim status token (`"OK"` once decode succeeds).
    pub status: String,
    /// Verbatim 2-character value token. Mapping it through the device's
    /// keycode table is the caller's job.
    pub value: String,
}

/// Encode one command frame.
pub fn encode_command(name: &str, keycode: &str) -> Vec<u8> {
    let mut frame = BytesMut::with_capacity(name.len() + keycode.len() + 5);
    frame.put_slice(name.as_bytes());
    frame.put_u8(b' ');
    frame.put_slice(SET_ADDRESS.as_bytes());
    frame.put_u8(b' ');
    frame.put_slice(keycode.as_bytes());
    frame.put_u8(b'\r');
    frame.to_vec()
}

/// Decode a reply frame.
///
/// Fails with [`ProtocolError::ShortFrame`] when fewer than [`REPLY_LEN`]
/// bytes arrived before the stream closed or timed out, and with
/// [`ProtocolError::DeviceNack`] when the status token is not `"OK"`.
pub fn decode_reply(bytes: &[u8]) -> ProtocolResult<Reply> {
    if bytes.len() < REPLY_LEN {
        log::trace!("reply too short: {} of {} bytes", bytes.len(), REPLY_LEN);
        return Err(ProtocolError::ShortFrame {
            expected: REPLY_LEN,
            actual: bytes.len(),
        });
    }

    let status = token_at(bytes, STATUS_OFFSET);
    let value = token_at(bytes, VALUE_OFFSET);

    if status != STATUS_OK {
        log::debug!("device nack: status {:?} value {:?}", status, value);
        return Err(ProtocolError::DeviceNack { status });
    }

    Ok(Reply { status, value })
}

fn token_at(bytes: &[u8], offset: usize) -> String {
    String::from_utf8_lossy(&bytes[offset..offset + TOKEN_LEN]).into_owned()
}
