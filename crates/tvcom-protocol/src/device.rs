//! Device instances and the built-in inventory.
//!
//! A [`DeviceInstance`] binds a wire token (the short address the device
//! answers to, e.g. `kf`) to a human-facing long name (`volume`) and a
//! [`KeycodeTable`]. The built-in inventory covers the standard LG-style
//! RS-232C family; extra instances can be supplied from configuration as
//! [`DeviceSpec`] values and pass the same validation.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::keycode::KeycodeTable;

/// One addressable control on the bus.
#[derive(Debug, Clone)]
pub struct DeviceInstance {
    /// Short wire token sent at the start of every frame.
    name: String,
    /// Human-readable identifier used for routing and display.
    long_name: String,
    table: KeycodeTable,
}

impl DeviceInstance {
    /// Build an instance, validating its table.
    pub fn build<I, K, N>(
        name: &str,
        long_name: &str,
        entries: I,
        slider: bool,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<String>,
    {
        let table = KeycodeTable::build(long_name, entries, slider)?;
        Ok(DeviceInstance {
            name: name.to_string(),
            long_name: long_name.to_string(),
            table,
        })
    }

    /// The wire token, e.g. `kf`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable identifier, e.g. `volume`.
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    /// The keycode table for this device.
    pub fn table(&self) -> &KeycodeTable {
        &self.table
    }

    /// Whether this device is a continuous 0-100 control.
    pub fn is_slider(&self) -> bool {
        self.table.is_slider()
    }
}

/// A device definition as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceSpec {
    /// Wire token, e.g. `pj`.
    pub name: String,
    /// Human-readable identifier, e.g. `projector`.
    pub long_name: String,
    /// Whether the device takes continuous 0-100 levels.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slider: bool,
    /// Named codes as keycode -> command name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub codes: BTreeMap<String, String>,
}

impl DeviceSpec {
    /// Validate the spec into a usable instance.
    pub fn build(&self) -> Result<DeviceInstance, ConfigError> {
        DeviceInstance::build(
            &self.name,
            &self.long_name,
            self.codes.iter().map(|(k, n)| (k.clone(), n.clone())),
            self.slider,
        )
    }
}

/// The set of device instances a process serves, keyed by long name.
#[derive(Debug, Clone, Default)]
pub struct DeviceInventory {
    devices: Vec<DeviceInstance>,
}

impl DeviceInventory {
    /// An empty inventory.
    pub fn empty() -> Self {
        DeviceInventory::default()
    }

    /// The built-in LG-style RS-232C device family.
    pub fn standard() -> Result<Self, ConfigError> {
        let mut inventory = DeviceInventory::empty();

        inventory.insert(DeviceInstance::build(
            "ka",
            "power",
            [("00", "off"), ("01", "on"), ("ff", "status")],
            false,
        )?)?;
        inventory.insert(DeviceInstance::build(
            "kc",
            "aspect",
            [
                ("01", "4:3"),
                ("02", "16:9"),
                ("04", "zoom"),
                ("06", "original"),
                ("09", "just-scan"),
                ("ff", "status"),
            ],
            false,
        )?)?;
        inventory.insert(DeviceInstance::build(
            "kd",
            "screen-mute",
            [("00", "off"), ("01", "on"), ("ff", "status")],
            false,
        )?)?;
        inventory.insert(DeviceInstance::build(
            "ke",
            "volume-mute",
            [("00", "mute"), ("01", "unmute"), ("ff", "status")],
            false,
        )?)?;

        // The continuous picture and sound controls all share the same shape:
        // levels on the wire, a lone status entry in the table.
        for (name, long_name) in [
            ("kf", "volume"),
            ("kg", "contrast"),
            ("kh", "brightness"),
            ("ki", "colour"),
            ("kj", "tint"),
            ("kk", "sharpness"),
            ("mg", "backlight"),
        ] {
            inventory.insert(DeviceInstance::build(
                name,
                long_name,
                [("ff", "status")],
                true,
            )?)?;
        }

        inventory.insert(DeviceInstance::build(
            "kl",
            "osd",
            [("00", "off"), ("01", "on"), ("ff", "status")],
            false,
        )?)?;
        inventory.insert(DeviceInstance::build(
            "km",
            "remote-lock",
            [("00", "off"), ("01", "on"), ("ff", "status")],
            false,
        )?)?;
        inventory.insert(DeviceInstance::build(
            "xb",
            "input",
            [
                ("00", "dtv"),
                ("10", "analogue"),
                ("20", "av"),
                ("40", "component"),
                ("60", "rgb"),
                ("90", "hdmi1"),
                ("91", "hdmi2"),
                ("92", "hdmi3"),
                ("93", "hdmi4"),
                ("ff", "status"),
            ],
            false,
        )?)?;
        inventory.insert(DeviceInstance::build(
            "jq",
            "energy-saving",
            [
                ("00", "off"),
                ("01", "minimum"),
                ("02", "medium"),
                ("03", "maximum"),
                ("04", "auto"),
                ("05", "screen-off"),
                ("ff", "status"),
            ],
            false,
        )?)?;

        Ok(inventory)
    }

    /// Add an instance, rejecting long-name collisions.
    pub fn insert(&mut self, device: DeviceInstance) -> Result<(), ConfigError> {
        if self.get(device.long_name()).is_some() {
            return Err(ConfigError::DuplicateDevice {
                long_name: device.long_name().to_string(),
            });
        }
        self.devices.push(device);
        Ok(())
    }

    /// Look up an instance by long name.
    pub fn get(&self, long_name: &str) -> Option<&DeviceInstance> {
        self.devices.iter().find(|d| d.long_name() == long_name)
    }

    /// Iterate instances in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceInstance> {
        self.devices.iter()
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the inventory has no instances.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_inventory_builds() {
        let inventory = DeviceInventory::standard().unwrap();
        assert_eq!(inventory.len(), 15);
    }

    #[test]
    fn test_standard_inventory_has_expected_sliders() {
        let inventory = DeviceInventory::standard().unwrap();
        let sliders: Vec<&str> = inventory
            .iter()
            .filter(|d| d.is_slider())
            .map(|d| d.long_name())
            .collect();
        assert_eq!(
            sliders,
            [
                "volume",
                "contrast",
                "brightness",
                "colour",
                "tint",
                "sharpness",
                "backlight"
            ]
        );
    }

    #[test]
    fn test_lookup_by_long_name() {
        let inventory = DeviceInventory::standard().unwrap();
        let volume = inventory.get("volume").unwrap();
        assert_eq!(volume.name(), "kf");
        assert!(volume.is_slider());
        assert!(inventory.get("toaster").is_none());
    }

    #[test]
    fn test_wire_tokens_are_unique() {
        let inventory = DeviceInventory::standard().unwrap();
        let mut names: Vec<&str> = inventory.iter().map(|d| d.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), inventory.len());
    }

    #[test]
    fn test_duplicate_long_name_rejected() {
        let mut inventory = DeviceInventory::standard().unwrap();
        let dup = DeviceInstance::build("zz", "power", [("ff", "status")], false).unwrap();
        assert!(matches!(
            inventory.insert(dup),
            Err(ConfigError::DuplicateDevice { .. })
        ));
    }

    #[test]
    fn test_device_spec_builds() {
        let spec = DeviceSpec {
            name: "pj".to_string(),
            long_name: "projector".to_string(),
            slider: false,
            codes: BTreeMap::from([
                ("00".to_string(), "off".to_string()),
                ("01".to_string(), "on".to_string()),
                ("ff".to_string(), "status".to_string()),
            ]),
        };
        let device = spec.build().unwrap();
        assert_eq!(device.long_name(), "projector");
        assert_eq!(device.table().keycode_for("on"), Some("01"));
    }
}
