//! Fleet configuration.
//!
//! The configuration file is JSON with PascalCase keys. Devices are
//! keyed by their decimal RS-485 address written as a string ("3"), even
//! on point-to-point networks where the address only identifies the
//! device to this software.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use marquee_protocol::{HardwareModel, DEFAULT_GLOBAL_ADDRESS, MAX_DEVICE_ADDRESS};

use crate::error::FleetError;
use crate::network::NetworkKind;

/// One signage network: a serial port shared by one or more devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkConfig {
    /// Link type on this port.
    pub connection_type: NetworkKind,
    /// Serial port device path.
    pub device: String,
    /// Port speed in baud.
    pub baud_rate: u32,
    /// Free-form note about the network.
    #[serde(default)]
    pub description: String,
}

/// One configured signage device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceConfig {
    /// Hardware model, including the historical config-file aliases.
    pub device_type: HardwareModel,
    /// Id of the network the device is attached to.
    #[serde(rename = "NetworkID")]
    pub network_id: String,
    /// Free-form note about the device.
    #[serde(default)]
    pub description: String,
    /// Device serial number, if recorded.
    #[serde(default)]
    pub serial: String,
    /// The discrete LEDs physically installed, in order. Defaults to
    /// the model's standard complement.
    #[serde(default)]
    pub lights_installed: Option<String>,
}

impl DeviceConfig {
    /// The installed-LED string, applying the model default when the
    /// config doesn't say.
    pub fn lights_installed(&self) -> &str {
        self.lights_installed
            .as_deref()
            .unwrap_or_else(|| self.device_type.default_lights())
    }
}

fn default_global_address() -> u8 {
    DEFAULT_GLOBAL_ADDRESS
}

/// The whole fleet: networks, devices, and the shared global address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FleetConfig {
    /// The broadcast address every device listens to.
    #[serde(default = "default_global_address")]
    pub global_address: u8,
    /// Networks by id.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Devices keyed by stringified decimal address.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceConfig>,
}

impl FleetConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<FleetConfig, FleetError> {
        let config: FleetConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &std::path::Path) -> Result<FleetConfig, FleetError> {
        FleetConfig::from_json(&std::fs::read_to_string(path)?)
    }

    /// Check the cross-references the deserializer can't: address keys
    /// are in-band and distinct from the global address, and every
    /// device's network exists.
    pub fn validate(&self) -> Result<(), FleetError> {
        if self.global_address > MAX_DEVICE_ADDRESS {
            return Err(FleetError::GlobalAddressOutOfRange(self.global_address));
        }
        for (key, device) in &self.devices {
            let address = parse_address_key(key)?;
            if address == self.global_address {
                return Err(FleetError::GlobalAddressConflict(address));
            }
            if !self.networks.contains_key(&device.network_id) {
                return Err(FleetError::UnknownNetwork {
                    device: address,
                    network: device.network_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// The device map with numeric addresses.
    pub fn device_map(&self) -> Result<BTreeMap<u8, &DeviceConfig>, FleetError> {
        self.devices
            .iter()
            .map(|(key, dev)| Ok((parse_address_key(key)?, dev)))
            .collect()
    }
}

fn parse_address_key(key: &str) -> Result<u8, FleetError> {
    let address: u8 = key
        .parse()
        .map_err(|_| FleetError::BadAddressKey(key.to_string()))?;
    if address > MAX_DEVICE_ADDRESS {
        return Err(FleetError::AddressOutOfRange(address));
    }
    Ok(address)
}
