//! Mode lifecycle tests: boot decision, association retry/self-heal,
//! provisioning, the long-press path into firmware-update mode.

use std::sync::Mutex;

use picoweather::app::mode::{
    self, BootDecision, WIFI_MAX_ATTEMPTS,
};
use picoweather::app::ports::SettingsStore;
use picoweather::app::runtime::{AppRuntime, TickOutcome};
use picoweather::config::Settings;
use picoweather::drivers::button::{self, Edge, LONG_PRESS_MS};
use picoweather::error::ConfigError;

use crate::mock_ports::{
    FixedClock, FlakyWifi, FrameRecorder, InstantUpdatePortal, MemoryStore, RecordingRestart,
    ScriptedHttp, ScriptedPortal, StubSync,
};

// The button detector is process-global; serialise the tests that use it.
static BUTTON: Mutex<()> = Mutex::new(());

fn settings() -> Settings {
    Settings {
        ssid: "HomeWiFi".into(),
        password: "password1".into(),
        zip_code: "30310".into(),
    }
}

// ── Boot decision ─────────────────────────────────────────────

#[test]
fn first_boot_lands_in_provisioning() {
    let store = MemoryStore::default();
    assert_eq!(
        mode::decide_boot(&store),
        BootDecision::Provisioning(ConfigError::Missing)
    );
}

#[test]
fn provisioned_device_boots_into_application() {
    let mut store = MemoryStore::default();
    store.save(&settings()).unwrap();
    assert_eq!(mode::decide_boot(&store), BootDecision::Application(settings()));
}

#[test]
fn truncated_blob_boots_into_provisioning() {
    let store = MemoryStore {
        blob: Some(b"{\"ssid\":\"Ho".to_vec()),
    };
    assert_eq!(
        mode::decide_boot(&store),
        BootDecision::Provisioning(ConfigError::Decode)
    );
}

// ── Association and self-heal ─────────────────────────────────

#[test]
fn association_recovers_within_the_attempt_budget() {
    let mut wifi = FlakyWifi::failing(WIFI_MAX_ATTEMPTS - 1);
    assert!(mode::associate(&mut wifi, &settings()).is_ok());
    assert_eq!(wifi.attempts, WIFI_MAX_ATTEMPTS);
}

#[test]
fn exhausted_association_self_heals_into_provisioning() {
    let mut wifi = FlakyWifi::failing(u32::MAX);
    let mut store = MemoryStore::default();
    store.save(&settings()).unwrap();
    let mut restart = RecordingRestart::default();

    assert!(mode::associate_or_reset(&mut wifi, &mut store, &mut restart, &settings()).is_err());

    // Credentials presumed bad: wiped, and the device restarts so the
    // next boot decision is Provisioning.
    assert!(!store.exists());
    assert!(restart.requested);
    assert_eq!(
        mode::decide_boot(&store),
        BootDecision::Provisioning(ConfigError::Missing)
    );
}

// ── Provisioning flow ─────────────────────────────────────────

#[test]
fn provisioning_persists_submission_and_restarts() {
    let mut portal = ScriptedPortal {
        submission: Some(settings()),
    };
    let mut store = MemoryStore::default();
    let mut restart = RecordingRestart::default();

    mode::run_provisioning(&mut portal, &mut store, &mut restart).unwrap();

    assert_eq!(store.load().unwrap(), settings());
    assert!(restart.requested);
}

#[test]
fn provisioning_rejects_invalid_submission_before_persisting() {
    let mut portal = ScriptedPortal {
        submission: Some(Settings {
            ssid: "Net".into(),
            password: "password1".into(),
            zip_code: "bad".into(),
        }),
    };
    let mut store = MemoryStore::default();
    let mut restart = RecordingRestart::default();

    assert!(mode::run_provisioning(&mut portal, &mut store, &mut restart).is_err());
    assert!(!store.exists());
    assert!(!restart.requested);
}

// ── Update mode ───────────────────────────────────────────────

#[test]
fn update_mode_restarts_after_confirmation() {
    let mut portal = InstantUpdatePortal::default();
    let mut restart = RecordingRestart::default();

    mode::run_update_mode(&mut portal, &mut restart).unwrap();

    assert!(portal.served);
    assert!(restart.requested);
}

// ── Long press into update mode ───────────────────────────────

fn drained_runtime() -> AppRuntime {
    // Startup with no scripted responses: sync ok, geocode fails, so the
    // runtime renders the fallback screen until a later refresh succeeds.
    let mut http = ScriptedHttp::new(vec![]);
    let mut sync = StubSync::default();
    AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(1_700_000_000))
}

#[test]
fn long_press_switches_the_running_loop_to_update_mode() {
    let _guard = BUTTON.lock().unwrap();
    while button::take_mode_switch_request() {}

    let mut runtime = drained_runtime();
    let mut display = FrameRecorder::new();
    let mut http = ScriptedHttp::new(vec![]);
    let mut sync = StubSync::default();

    // A short press leaves the loop running.
    button::on_button_edge(Edge::Press, 1000);
    button::on_button_edge(Edge::Release, 1200);
    let outcome = runtime.tick(
        1_700_000_001,
        button::take_mode_switch_request(),
        &mut display,
        &mut http,
        &mut sync,
    );
    assert_eq!(outcome, TickOutcome::Continue);
    assert_eq!(display.frames_shown, 1);

    // A hold past the threshold is consumed on the next tick, before any
    // rendering or scheduled work.
    button::on_button_edge(Edge::Press, 10_000);
    button::on_button_edge(Edge::Release, 10_000 + LONG_PRESS_MS);
    let outcome = runtime.tick(
        1_700_000_002,
        button::take_mode_switch_request(),
        &mut display,
        &mut http,
        &mut sync,
    );
    assert_eq!(outcome, TickOutcome::EnterUpdateMode);
    assert_eq!(display.frames_shown, 1);
}

#[test]
fn sub_threshold_hold_never_triggers_update_mode() {
    let _guard = BUTTON.lock().unwrap();
    while button::take_mode_switch_request() {}

    button::on_button_edge(Edge::Press, 0);
    button::on_button_edge(Edge::Release, LONG_PRESS_MS - 1);

    let mut runtime = drained_runtime();
    let mut display = FrameRecorder::new();
    let mut http = ScriptedHttp::new(vec![]);
    let mut sync = StubSync::default();

    let outcome = runtime.tick(
        1_700_000_001,
        button::take_mode_switch_request(),
        &mut display,
        &mut http,
        &mut sync,
    );
    assert_eq!(outcome, TickOutcome::Continue);
}
