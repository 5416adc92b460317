//! Keycode tables: the bidirectional mapping between human command names and
//! 2-character wire keycodes.
//!
//! Every device carries one table. Discrete devices (power, input, ...) map a
//! handful of named codes; slider devices (volume, contrast, ...) mostly rely
//! on numeric levels and keep only a `status` entry in the table. Levels are
//! carried on the wire as 2-character lowercase hex, so `40` becomes `"28"`.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// The reserved command name that queries current device state.
pub const STATUS_COMMAND: &str = "status";

/// Highest level a slider accepts. Writes above this clamp down to it.
pub const MAX_LEVEL: u8 = 100;

/// A validated, immutable keycode table for one device.
///
/// Both directions are available: `keycode_for` resolves a command name into
/// its wire keycode, `description_for` maps a reply value token back into a
/// name. Construction enforces that the two maps are exact inverses, so the
/// table can be shared freely between threads once built.
#[derive(Debug, Clone)]
pub struct KeycodeTable {
    /// keycode -> command name
    names: BTreeMap<String, String>,
    /// command name -> keycode
    keycodes: BTreeMap<String, String>,
    slider: bool,
}

impl KeycodeTable {
    /// Build a table from `(keycode, name)` entries, validating as we go.
    ///
    /// `device` only labels errors. Rejected definitions:
    /// - duplicate keycodes or duplicate names (the maps must stay bijective)
    /// - a slider table without a `status` entry (relative commands resolve
    ///   through it)
    /// - an all-digit name on a slider (it could never be told apart from an
    ///   absolute level, so the ambiguity is ruled out here instead of at
    ///   parse time)
    pub fn build<I, K, N>(device: &str, entries: I, slider: bool) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<String>,
    {
        let mut names = BTreeMap::new();
        let mut keycodes = BTreeMap::new();

        for (keycode, name) in entries {
            let keycode = keycode.into();
            let name = name.into();

            if slider && !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ConfigError::NumericCommandName {
                    device: device.to_string(),
                    name,
                });
            }
            if names.contains_key(&keycode) {
                return Err(ConfigError::DuplicateKeycode {
                    device: device.to_string(),
                    keycode,
                });
            }
            if keycodes.contains_key(&name) {
                return Err(ConfigError::DuplicateName {
                    device: device.to_string(),
                    name,
                });
            }

            names.insert(keycode.clone(), name.clone());
            keycodes.insert(name, keycode);
        }

        if slider && !keycodes.contains_key(STATUS_COMMAND) {
            return Err(ConfigError::MissingStatusEntry {
                device: device.to_string(),
            });
        }

        Ok(KeycodeTable {
            names,
            keycodes,
            slider,
        })
    }

    /// Whether this table belongs to a continuous 0-100 control.
    pub fn is_slider(&self) -> bool {
        self.slider
    }

    /// Resolve a command name into its wire keycode.
    pub fn keycode_for(&self, name: &str) -> Option<&str> {
        self.keycodes.get(name).map(String::as_str)
    }

    /// Map a reply value token back into a command name.
    pub fn description_for(&self, keycode: &str) -> Option<&str> {
        self.names.get(keycode).map(String::as_str)
    }

    /// The keycode of the `status` entry, if the table has one.
    pub fn status_keycode(&self) -> Option<&str> {
        self.keycode_for(STATUS_COMMAND)
    }

    /// Encode a slider level as its 2-character hex keycode, clamping to
    /// [`MAX_LEVEL`].
    pub fn level_keycode(&self, level: u8) -> String {
        hex::encode([level.min(MAX_LEVEL)])
    }

    /// Interpret a reply value token as a slider level.
    ///
    /// Returns `None` on non-slider tables and for tokens that are not a
    /// single hex byte.
    pub fn level_from(&self, keycode: &str) -> Option<u8> {
        if !self.slider {
            return None;
        }
        match hex::decode(keycode).ok()?.as_slice() {
            [level] => Some(*level),
            _ => None,
        }
    }

    /// Iterate the named entries as `(keycode, name)`, ordered by keycode.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, n)| (k.as_str(), n.as_str()))
    }

    /// Iterate the command names this table accepts, ordered by keycode.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }
}
