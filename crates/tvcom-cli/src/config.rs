//! YAML configuration: peer address, link timeouts, extra device instances.
//!
//! Every field is optional; the defaults match a TV on the first USB serial
//! adapter. Configured devices extend the built-in inventory and go through
//! the same construction-time validation.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use tvcom_link::{LinkConfig, PeerAddress, DEFAULT_BAUD, DEFAULT_TIMEOUT};
use tvcom_protocol::{ConfigError, DeviceInventory, DeviceSpec};

use crate::CliError;

/// Serial device assumed when no peer is configured.
pub const DEFAULT_SERIAL_PATH: &str = "/dev/ttyUSB0";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the device listens.
    #[serde(default = "default_peer")]
    pub peer: PeerAddress,
    #[serde(default)]
    pub link: LinkSettings,
    /// Extra device instances beyond the built-in family.
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            peer: default_peer(),
            link: LinkSettings::default(),
            devices: Vec::new(),
        }
    }
}

impl Config {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&text)?;
        debug!(path = %path.display(), peer = %config.peer, "configuration loaded");
        Ok(config)
    }

    /// The built-in devices plus configured extras, validated together.
    pub fn inventory(&self) -> Result<DeviceInventory, ConfigError> {
        let mut inventory = DeviceInventory::standard()?;
        for spec in &self.devices {
            inventory.insert(spec.build()?)?;
        }
        Ok(inventory)
    }
}

fn default_peer() -> PeerAddress {
    PeerAddress::serial(DEFAULT_SERIAL_PATH, DEFAULT_BAUD)
}

/// Link timeouts in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSettings {
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub response_timeout_ms: u64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        LinkSettings {
            connect_timeout_ms: default_timeout_ms(),
            response_timeout_ms: default_timeout_ms(),
        }
    }
}

impl LinkSettings {
    pub fn to_link_config(self) -> LinkConfig {
        LinkConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            response_timeout: Duration::from_millis(self.response_timeout_ms),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.peer, PeerAddress::serial("/dev/ttyUSB0", 9600));
        assert_eq!(config.link.connect_timeout_ms, 5000);
        assert_eq!(config.link.response_timeout_ms, 5000);
    }

    #[test]
    fn test_serial_peer_with_default_baud() {
        let config: Config =
            serde_yaml::from_str("peer:\n  serial:\n    path: /dev/ttyS1\n").unwrap();
        assert_eq!(config.peer, PeerAddress::serial("/dev/ttyS1", 9600));
    }

    #[test]
    fn test_tcp_peer_and_timeouts() {
        let text = "\
peer:
  tcp:
    host: 192.168.4.21
    port: 9761
link:
  connect_timeout_ms: 1000
  response_timeout_ms: 250
";
        let config: Config = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.peer, PeerAddress::tcp("192.168.4.21", 9761));
        let link = config.link.to_link_config();
        assert_eq!(link.connect_timeout, Duration::from_secs(1));
        assert_eq!(link.response_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_extra_devices_extend_the_inventory() {
        let text = "\
devices:
  - long_name: projector
    name: pj
    codes: { \"00\": \"off\", \"01\": \"on\", \"ff\": \"status\" }
";
        let config: Config = serde_yaml::from_str(text).unwrap();
        let inventory = config.inventory().unwrap();
        let projector = inventory.get("projector").unwrap();
        assert_eq!(projector.name(), "pj");
        assert!(!projector.is_slider());
    }

    #[test]
    fn test_conflicting_device_definition_rejected() {
        let text = "\
devices:
  - long_name: power
    name: zz
    codes: { \"ff\": \"status\" }
";
        let config: Config = serde_yaml::from_str(text).unwrap();
        assert!(matches!(
            config.inventory(),
            Err(ConfigError::DuplicateDevice { .. })
        ));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_yaml::from_str::<Config>("serial_port: /dev/ttyS0\n").is_err());
    }
}
