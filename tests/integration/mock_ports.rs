//! Mock port implementations for integration tests.
//!
//! Every mock records the calls it receives so tests can assert on the
//! full interaction history without touching ESP-IDF.

use picoweather::app::ports::{
    ClockPort, ConnectivityPort, DisplayPort, HttpPort, ProvisioningPortal, RestartPort,
    SettingsStore, TimeSyncPort, UpdatePortal,
};
use picoweather::config::Settings;
use picoweather::error::{ConfigError, Error, FetchError, WifiError};
use picoweather::weather::classify::Icon;

// ── HTTP ──────────────────────────────────────────────────────

/// Serves canned bodies in request order and records every URL.
pub struct ScriptedHttp {
    responses: Vec<Result<String, FetchError>>,
    pub requests: Vec<String>,
}

#[allow(dead_code)]
impl ScriptedHttp {
    pub fn new(responses: Vec<Result<&str, FetchError>>) -> Self {
        Self {
            responses: responses.into_iter().map(|r| r.map(str::to_string)).collect(),
            requests: Vec::new(),
        }
    }

    pub fn push(&mut self, response: Result<&str, FetchError>) {
        self.responses.push(response.map(str::to_string));
    }
}

impl HttpPort for ScriptedHttp {
    fn get(&mut self, url: &str, _headers: &[(&str, &str)]) -> Result<String, FetchError> {
        self.requests.push(url.to_string());
        if self.responses.is_empty() {
            return Err(FetchError::Network);
        }
        self.responses.remove(0)
    }
}

// ── Storage ───────────────────────────────────────────────────

/// In-memory settings store over a single blob slot, mirroring the NVS
/// adapter's one-record layout.
#[derive(Default)]
pub struct MemoryStore {
    pub blob: Option<Vec<u8>>,
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        match &self.blob {
            None => Err(ConfigError::Missing),
            Some(bytes) => Settings::from_json(bytes),
        }
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        self.blob = Some(settings.to_json()?);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), ConfigError> {
        self.blob = None;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.blob.is_some()
    }
}

// ── WiFi ──────────────────────────────────────────────────────

/// Fails the first `failures_before_success` association attempts.
pub struct FlakyWifi {
    pub failures_before_success: u32,
    pub attempts: u32,
}

#[allow(dead_code)]
impl FlakyWifi {
    pub fn failing(n: u32) -> Self {
        Self {
            failures_before_success: n,
            attempts: 0,
        }
    }
}

impl ConnectivityPort for FlakyWifi {
    fn connect(&mut self, _ssid: &str, _password: &str) -> Result<(), WifiError> {
        self.attempts += 1;
        if self.attempts > self.failures_before_success {
            Ok(())
        } else {
            Err(WifiError::AssociationFailed)
        }
    }

    fn is_connected(&self) -> bool {
        self.attempts > self.failures_before_success
    }

    fn ip_address(&self) -> Option<String> {
        self.is_connected().then(|| "192.168.1.50".to_string())
    }
}

// ── Time ──────────────────────────────────────────────────────

pub struct FixedClock(pub i64);

impl ClockPort for FixedClock {
    fn now_epoch(&self) -> i64 {
        self.0
    }
}

/// Counts sync calls; optionally fails them all.
#[derive(Default)]
pub struct StubSync {
    pub calls: u32,
    pub fail: bool,
}

impl TimeSyncPort for StubSync {
    fn sync(&mut self) -> Result<(), FetchError> {
        self.calls += 1;
        if self.fail {
            Err(FetchError::Timeout)
        } else {
            Ok(())
        }
    }
}

// ── Display ───────────────────────────────────────────────────

/// Records draw calls per frame.
#[derive(Default)]
pub struct FrameRecorder {
    pub texts: Vec<(String, i32, i32)>,
    pub icons: Vec<(Icon, i32, i32)>,
    pub frames_shown: u32,
}

#[allow(dead_code)]
impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All text content of the current frame, joined for substring asserts.
    pub fn frame_text(&self) -> String {
        self.texts
            .iter()
            .map(|(s, _, _)| s.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DisplayPort for FrameRecorder {
    fn clear(&mut self) {
        self.texts.clear();
        self.icons.clear();
    }

    fn text(&mut self, s: &str, x: i32, y: i32) {
        self.texts.push((s.to_string(), x, y));
    }

    fn icon(&mut self, icon: Icon, x: i32, y: i32) {
        self.icons.push((icon, x, y));
    }

    fn show(&mut self) {
        self.frames_shown += 1;
    }
}

// ── Portals and restart ───────────────────────────────────────

#[derive(Default)]
pub struct RecordingRestart {
    pub requested: bool,
}

impl RestartPort for RecordingRestart {
    fn restart(&mut self) {
        self.requested = true;
    }
}

/// Returns one scripted submission, as if the operator had just posted
/// the form.
pub struct ScriptedPortal {
    pub submission: Option<Settings>,
}

impl ProvisioningPortal for ScriptedPortal {
    fn serve_until_submission(&mut self) -> Result<Settings, Error> {
        self.submission
            .take()
            .ok_or(Error::Init("no scripted submission"))
    }
}

/// Update portal that confirms immediately.
#[derive(Default)]
pub struct InstantUpdatePortal {
    pub served: bool,
}

impl UpdatePortal for InstantUpdatePortal {
    fn serve_until_confirmed(&mut self) -> Result<(), Error> {
        self.served = true;
        Ok(())
    }
}
