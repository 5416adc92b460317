//! Rendering of results and listings, human-readable or JSON.

use tvcom_protocol::{DeviceInstance, DeviceInventory, DeviceSpec};
use tvcom_session::{CommandResult, StatusReading};

/// Render one command result.
///
/// Human form prints the decoded reading for status queries and a bare `OK`
/// for writes; JSON form serializes the whole result.
pub fn render_result(result: &CommandResult, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(result);
    }
    Ok(match &result.reading {
        Some(StatusReading::Level(level)) => level.to_string(),
        Some(StatusReading::Named(name)) => name.clone(),
        Some(StatusReading::Raw(value)) => value.clone(),
        None => "OK".to_string(),
    })
}

/// Render the device listing.
pub fn render_devices(inventory: &DeviceInventory, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(&listing(inventory));
    }
    let lines: Vec<String> = inventory
        .iter()
        .map(|device| {
            let kind = if device.is_slider() { "slider" } else { "" };
            format!("{:<14} {:<4} {}", device.long_name(), device.name(), kind)
                .trim_end()
                .to_string()
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Render the codes one device accepts.
pub fn render_codes(device: &DeviceInstance, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(&spec_of(device));
    }
    let mut lines: Vec<String> = device
        .table()
        .entries()
        .map(|(keycode, name)| format!("{keycode:<8}{name}"))
        .collect();
    if device.is_slider() {
        lines.push(format!("{:<8}absolute level", "0-100"));
        lines.push(format!("{:<8}relative adjustment", "+N/-N"));
    }
    Ok(lines.join("\n"))
}

fn listing(inventory: &DeviceInventory) -> Vec<DeviceSpec> {
    inventory.iter().map(spec_of).collect()
}

/// Project a built instance back into its definition form.
fn spec_of(device: &DeviceInstance) -> DeviceSpec {
    DeviceSpec {
        name: device.name().to_string(),
        long_name: device.long_name().to_string(),
        slider: device.is_slider(),
        codes: device
            .table()
            .entries()
            .map(|(keycode, name)| (keycode.to_string(), name.to_string()))
            .collect(),
    }
}
