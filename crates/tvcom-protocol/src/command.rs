//! Command classification.
//!
//! A raw request string is validated against a device and sorted into a
//! closed set of variants before any I/O happens. Dispatch downstream is an
//! exhaustive `match`, so a new variant cannot be added without every caller
//! taking a position on it.

use crate::device::DeviceInstance;
use crate::error::{ProtocolError, ProtocolResult};
use crate::keycode::{MAX_LEVEL, STATUS_COMMAND};

/// One validated command for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// A named code from the device's table, e.g. `on` for `power`.
    Named { name: String, keycode: String },
    /// A query for current device state; the reply value is decoded through
    /// the table.
    StatusQuery { keycode: String },
    /// An absolute level write on a slider, already clamped to 0-100.
    Absolute { level: u8 },
    /// A signed adjustment on a slider, resolved against queried state.
    Relative { delta: i16 },
}

impl DeviceCommand {
    /// Validate `code` against `device` and classify it.
    ///
    /// Non-sliders accept table keys only. Sliders additionally accept the
    /// literal `status`, unsigned 1-3 digit levels, and `+`/`-` prefixed
    /// deltas. Table lookups win over numeric interpretation; table
    /// construction guarantees the two can never collide on a slider.
    ///
    /// Anything else is a [`ProtocolError::InvalidCommand`], rejected here
    /// before a connection is ever opened.
    pub fn parse(device: &DeviceInstance, code: &str) -> ProtocolResult<Self> {
        let table = device.table();

        if let Some(keycode) = table.keycode_for(code) {
            if code == STATUS_COMMAND {
                return Ok(DeviceCommand::StatusQuery {
                    keycode: keycode.to_string(),
                });
            }
            return Ok(DeviceCommand::Named {
                name: code.to_string(),
                keycode: keycode.to_string(),
            });
        }

        if table.is_slider() {
            if let Some(command) = parse_numeric(code) {
                return Ok(command);
            }
        }

        Err(ProtocolError::InvalidCommand {
            device: device.long_name().to_string(),
            code: code.to_string(),
        })
    }
}

/// Parse `code` as a slider literal: 1-3 digits, optionally signed.
fn parse_numeric(code: &str) -> Option<DeviceCommand> {
    let (sign, digits) = match code.as_bytes().first()? {
        b'+' => (Some(1i16), &code[1..]),
        b'-' => (Some(-1i16), &code[1..]),
        _ => (None, code),
    };

    if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match sign {
        Some(sign) => {
            // 1-3 digits always fit in i16.
            let magnitude: i16 = digits.parse().ok()?;
            Some(DeviceCommand::Relative {
                delta: sign * magnitude,
            })
        }
        None => {
            let level: u16 = digits.parse().ok()?;
            Some(DeviceCommand::Absolute {
                level: level.min(MAX_LEVEL as u16) as u8,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceInventory;

    fn device(long_name: &str) -> DeviceInstance {
        DeviceInventory::standard()
            .unwrap()
            .get(long_name)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_named_code_on_discrete_device() {
        let command = DeviceCommand::parse(&device("power"), "on").unwrap();
        assert_eq!(
            command,
            DeviceCommand::Named {
                name: "on".to_string(),
                keycode: "01".to_string()
            }
        );
    }

    #[test]
    fn test_status_is_its_own_variant() {
        let command = DeviceCommand::parse(&device("power"), "status").unwrap();
        assert_eq!(
            command,
            DeviceCommand::StatusQuery {
                keycode: "ff".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_code_rejected() {
        let result = DeviceCommand::parse(&device("power"), "abc");
        assert!(matches!(result, Err(ProtocolError::InvalidCommand { .. })));
    }

    #[test]
    fn test_numeric_rejected_on_discrete_device() {
        let result = DeviceCommand::parse(&device("power"), "42");
        assert!(matches!(result, Err(ProtocolError::InvalidCommand { .. })));
    }

    #[test]
    fn test_slider_absolute() {
        let command = DeviceCommand::parse(&device("volume"), "25").unwrap();
        assert_eq!(command, DeviceCommand::Absolute { level: 25 });
    }

    #[test]
    fn test_slider_absolute_clamps_above_range() {
        let command = DeviceCommand::parse(&device("volume"), "999").unwrap();
        assert_eq!(command, DeviceCommand::Absolute { level: 100 });
    }

    #[test]
    fn test_slider_relative_signs() {
        assert_eq!(
            DeviceCommand::parse(&device("volume"), "+5").unwrap(),
            DeviceCommand::Relative { delta: 5 }
        );
        assert_eq!(
            DeviceCommand::parse(&device("volume"), "-15").unwrap(),
            DeviceCommand::Relative { delta: -15 }
        );
        assert_eq!(
            DeviceCommand::parse(&device("volume"), "+0").unwrap(),
            DeviceCommand::Relative { delta: 0 }
        );
    }

    #[test]
    fn test_slider_status_query() {
        let command = DeviceCommand::parse(&device("volume"), "status").unwrap();
        assert_eq!(
            command,
            DeviceCommand::StatusQuery {
                keycode: "ff".to_string()
            }
        );
    }

    #[test]
    fn test_slider_malformed_literals_rejected() {
        for code in ["", "+", "-", "1234", "+1234", "12a", "--3", "+ 5", "abc"] {
            let result = DeviceCommand::parse(&device("volume"), code);
            assert!(
                matches!(result, Err(ProtocolError::InvalidCommand { .. })),
                "{code:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_table_key_wins_over_numeric_on_discrete_device() {
        // A discrete table may carry numeric-looking names; they resolve as
        // plain table keys because no numeric interpretation exists there.
        let custom = DeviceInstance::build("zz", "preset", [("2a", "42")], false).unwrap();
        let command = DeviceCommand::parse(&custom, "42").unwrap();
        assert_eq!(
            command,
            DeviceCommand::Named {
                name: "42".to_string(),
                keycode: "2a".to_string()
            }
        );
    }
}
