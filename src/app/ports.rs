//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ mode controller / runtime (domain)
//! ```
//!
//! Driven adapters (HTTP client, NVS store, WiFi, display, portals)
//! implement these traits. The domain consumes them via generics, so the
//! mode controller and application runtime never touch ESP-IDF directly
//! and run unchanged in host-side tests against mocks.

use crate::config::Settings;
use crate::error::{ConfigError, Error, FetchError, WifiError};
use crate::weather::classify::Icon;

// ───────────────────────────────────────────────────────────────
// Network
// ───────────────────────────────────────────────────────────────

/// Bounded-timeout HTTP GET returning the whole body as text.
///
/// The weather pipeline relies on the bound: a hung request must surface
/// as [`FetchError::Timeout`], not stall the display loop forever.
pub trait HttpPort {
    fn get(&mut self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError>;
}

/// WiFi station association. One attempt per call — the retry policy
/// belongs to the mode controller, not the adapter.
pub trait ConnectivityPort {
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), WifiError>;
    fn is_connected(&self) -> bool;
    /// Dotted-quad string once DHCP has completed.
    fn ip_address(&self) -> Option<String>;
}

/// Kick an SNTP synchronisation and wait (bounded) for completion.
pub trait TimeSyncPort {
    fn sync(&mut self) -> Result<(), FetchError>;
}

// ───────────────────────────────────────────────────────────────
// Storage
// ───────────────────────────────────────────────────────────────

/// The single persisted settings record.
///
/// `load` distinguishes "nothing stored" ([`ConfigError::Missing`]) from
/// "stored but undecodable" ([`ConfigError::Decode`]) — the boot decision
/// treats both as "go provision" but logs them differently.
pub trait SettingsStore {
    fn load(&self) -> Result<Settings, ConfigError>;
    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError>;
    fn delete(&mut self) -> Result<(), ConfigError>;
    fn exists(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// Wall-clock reads. Only the outer loop calls this; domain code takes
/// explicit epoch parameters.
pub trait ClockPort {
    /// UTC epoch seconds.
    fn now_epoch(&self) -> i64;
}

// ───────────────────────────────────────────────────────────────
// Display
// ───────────────────────────────────────────────────────────────

/// 128x64 monochrome text/icon surface. Draw calls mutate an off-screen
/// frame; `show` pushes it to the panel.
pub trait DisplayPort {
    fn clear(&mut self);
    /// Draw text at a pixel position (8x8 glyphs).
    fn text(&mut self, s: &str, x: i32, y: i32);
    /// Draw a 32x32 weather icon at a pixel position.
    fn icon(&mut self, icon: Icon, x: i32, y: i32);
    fn show(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Portals and restart
// ───────────────────────────────────────────────────────────────

/// Captive provisioning portal. Blocks until the operator submits a valid
/// settings form; the response has been flushed by the time this returns,
/// so the caller may persist and restart immediately.
pub trait ProvisioningPortal {
    fn serve_until_submission(&mut self) -> Result<Settings, Error>;
}

/// Firmware-update page. Blocks (no timeout) until the operator confirms
/// completion; the confirmation response has been flushed by the time
/// this returns, so the pending restart is just the caller's next call.
pub trait UpdatePortal {
    fn serve_until_confirmed(&mut self) -> Result<(), Error>;
}

/// Device reset. On hardware this does not return; the host simulation
/// records the request so tests can assert on it.
pub trait RestartPort {
    fn restart(&mut self);
}
