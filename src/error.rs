//! Unified error types for the PicoWeather firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! boot sequence and main loop error handling uniform. All variants are
//! `Copy` so they can be passed around and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Persisted settings are absent, undecodable, or invalid.
    Config(ConfigError),
    /// WiFi credentials or association failed.
    Wifi(WifiError),
    /// A network fetch (weather, geocoding, SNTP) failed.
    Fetch(FetchError),
    /// Peripheral or service initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Wifi(e) => write!(f, "wifi: {e}"),
            Self::Fetch(e) => write!(f, "fetch: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading, decoding, or persisting the settings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No settings record in storage (first boot or after reset).
    Missing,
    /// Stored record exists but failed JSON decoding.
    Decode,
    /// A settings field failed validation; the message names the field.
    Invalid(&'static str),
    /// Underlying storage read/write failed.
    Io,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "settings not found"),
            Self::Decode => write!(f, "settings record undecodable"),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
            Self::Io => write!(f, "storage I/O error"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// WiFi errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    /// SSID must be 1-32 printable ASCII bytes.
    InvalidSsid,
    /// Password must be empty (open network) or 8-64 bytes.
    InvalidPassword,
    /// Association with the access point failed.
    AssociationFailed,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::AssociationFailed => write!(f, "association failed"),
        }
    }
}

impl From<WifiError> for Error {
    fn from(e: WifiError) -> Self {
        Self::Wifi(e)
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Failures from the network-facing data paths. One variant per failure
/// class the mode controller distinguishes; everything else collapses into
/// `Network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure: DNS, TCP, TLS, or non-200 status.
    Network,
    /// Response arrived but did not match the expected JSON shape.
    Decode,
    /// The station directory for the resolved grid point was empty.
    NoStationsFound,
    /// The request (or SNTP sync) exceeded its deadline.
    Timeout,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network request failed"),
            Self::Decode => write!(f, "response decode failed"),
            Self::NoStationsFound => write!(f, "no observation stations for grid point"),
            Self::Timeout => write!(f, "request timed out"),
        }
    }
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
