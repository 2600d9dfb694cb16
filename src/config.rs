//! Persisted device settings.
//!
//! One flat record, written by the provisioning portal and read once at
//! boot. Stored as a JSON blob in NVS; the `zip` field name is part of the
//! stored format and must not change.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The provisioning record. Immutable for the lifetime of one application
/// run; replacing it requires going back through the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// WiFi network name.
    pub ssid: String,
    /// WiFi password; empty means an open network.
    pub password: String,
    /// US ZIP code used to geocode the weather location.
    #[serde(rename = "zip")]
    pub zip_code: String,
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

impl Settings {
    /// Range-check every field. Called before persisting a portal
    /// submission so a malformed form can never brick the boot path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() || self.ssid.len() > 32 || !is_printable_ascii(&self.ssid) {
            return Err(ConfigError::Invalid("ssid must be 1-32 printable ASCII bytes"));
        }
        if !self.password.is_empty() && (self.password.len() < 8 || self.password.len() > 64) {
            return Err(ConfigError::Invalid(
                "password must be empty or 8-64 bytes",
            ));
        }
        if self.zip_code.len() != 5 || !self.zip_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::Invalid("zip must be exactly 5 digits"));
        }
        Ok(())
    }

    /// Decode a stored settings blob.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        serde_json::from_slice(bytes).map_err(|_| ConfigError::Decode)
    }

    /// Encode for storage.
    pub fn to_json(&self) -> Result<Vec<u8>, ConfigError> {
        serde_json::to_vec(self).map_err(|_| ConfigError::Io)
    }
}
