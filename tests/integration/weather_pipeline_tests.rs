//! End-to-end runtime tests over the weather pipeline: startup fetch,
//! refresh cadence, degradation when the network drops, and the rendered
//! frame contents.

use picoweather::app::runtime::{AppRuntime, TickOutcome};
use picoweather::config::Settings;
use picoweather::error::FetchError;
use picoweather::schedule::{TIME_SYNC_INTERVAL_SECS, WEATHER_REFRESH_INTERVAL_SECS};
use picoweather::weather::classify::Icon;

use crate::mock_ports::{FixedClock, FrameRecorder, ScriptedHttp, StubSync};

const BOOT_EPOCH: i64 = 1_700_000_000;

const GEOCODE: &str = r#"{"places":[{"latitude":"33.7627","longitude":"-84.4224"}]}"#;
const POINTS: &str = r#"{"properties":{
    "forecast":"https://api.weather.gov/gridpoints/FFC/50,87/forecast",
    "observationStations":"https://api.weather.gov/gridpoints/FFC/50,87/stations"}}"#;
const STATIONS: &str = r#"{"features":[{"properties":{"stationIdentifier":"KATL"}}]}"#;
const STATIONS_EMPTY: &str = r#"{"features":[]}"#;
const OBSERVATION: &str = r#"{"properties":{
    "temperature":{"value":20.0},"relativeHumidity":{"value":65.4}}}"#;
const FORECAST_TSTORM: &str = r#"{"properties":{"periods":[
    {"shortForecast":"Thunderstorms and Rain"}]}}"#;
const FORECAST_CLEAR: &str = r#"{"properties":{"periods":[{"shortForecast":"Sunny"}]}}"#;

fn settings() -> Settings {
    Settings {
        ssid: "HomeWiFi".into(),
        password: "password1".into(),
        zip_code: "30310".into(),
    }
}

fn full_fetch_script() -> Vec<Result<&'static str, FetchError>> {
    vec![
        Ok(GEOCODE),
        Ok(POINTS),
        Ok(STATIONS),
        Ok(OBSERVATION),
        Ok(FORECAST_TSTORM),
    ]
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_geocodes_and_fetches_once() {
    let mut http = ScriptedHttp::new(full_fetch_script());
    let mut sync = StubSync::default();

    let runtime = AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));

    assert_eq!(sync.calls, 1);
    assert_eq!(http.requests.len(), 5);
    assert!(http.requests[0].ends_with("/us/30310"));

    let snap = runtime.snapshot().unwrap();
    assert_eq!(snap.temperature_f, Some(68));
    assert_eq!(snap.forecast, "Thunderstorms and Rain");
    assert!(runtime.coordinates().is_some());
}

#[test]
fn startup_survives_total_network_failure() {
    let mut http = ScriptedHttp::new(vec![]);
    let mut sync = StubSync { calls: 0, fail: true };

    let runtime = AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));

    assert!(runtime.snapshot().is_none());
    assert!(runtime.coordinates().is_none());
}

// ── Refresh cadence ───────────────────────────────────────────

#[test]
fn quiet_tick_between_watermarks_only_renders() {
    let mut http = ScriptedHttp::new(full_fetch_script());
    let mut sync = StubSync::default();
    let mut runtime =
        AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));
    let mut display = FrameRecorder::new();

    let requests_after_startup = http.requests.len();
    let outcome = runtime.tick(BOOT_EPOCH + 1, false, &mut display, &mut http, &mut sync);

    assert_eq!(outcome, TickOutcome::Continue);
    assert_eq!(display.frames_shown, 1);
    assert_eq!(http.requests.len(), requests_after_startup);
    assert_eq!(sync.calls, 1);
}

#[test]
fn weather_refreshes_on_its_interval_with_cached_coordinates() {
    let mut http = ScriptedHttp::new(full_fetch_script());
    let mut sync = StubSync::default();
    let mut runtime =
        AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));
    let mut display = FrameRecorder::new();

    // No geocode on refresh: the coordinates are cached, so the script
    // starts at the grid-point step.
    http.push(Ok(POINTS));
    http.push(Ok(STATIONS));
    http.push(Ok(OBSERVATION));
    http.push(Ok(FORECAST_CLEAR));

    let now = BOOT_EPOCH + WEATHER_REFRESH_INTERVAL_SECS;
    runtime.tick(now, false, &mut display, &mut http, &mut sync);

    assert_eq!(http.requests.len(), 9);
    assert!(http.requests[5].contains("/points/"));
    assert_eq!(runtime.snapshot().unwrap().forecast, "Sunny");
    assert_eq!(runtime.snapshot().unwrap().fetched_at_epoch, now);
}

#[test]
fn time_sync_fires_hourly_even_when_it_fails() {
    let mut http = ScriptedHttp::new(full_fetch_script());
    let mut sync = StubSync::default();
    let mut runtime =
        AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));
    let mut display = FrameRecorder::new();

    sync.fail = true;
    let now = BOOT_EPOCH + TIME_SYNC_INTERVAL_SECS;
    // Weather is also due at the hour mark; let it fail quietly.
    runtime.tick(now, false, &mut display, &mut http, &mut sync);
    assert_eq!(sync.calls, 2);

    // The failed run still advanced the watermark: the next tick does
    // not retry early.
    runtime.tick(now + 1, false, &mut display, &mut http, &mut sync);
    assert_eq!(sync.calls, 2);
}

// ── Degradation ───────────────────────────────────────────────

#[test]
fn empty_station_directory_drops_the_snapshot() {
    let mut http = ScriptedHttp::new(full_fetch_script());
    let mut sync = StubSync::default();
    let mut runtime =
        AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));
    let mut display = FrameRecorder::new();
    assert!(runtime.snapshot().is_some());

    http.push(Ok(POINTS));
    http.push(Ok(STATIONS_EMPTY));

    let now = BOOT_EPOCH + WEATHER_REFRESH_INTERVAL_SECS;
    runtime.tick(now, false, &mut display, &mut http, &mut sync);

    // Stale data is not kept; the display falls back.
    assert!(runtime.snapshot().is_none());
    runtime.tick(now + 1, false, &mut display, &mut http, &mut sync);
    assert!(display.frame_text().contains("unavailable"));
}

#[test]
fn geocode_retries_on_the_weather_cadence_until_it_succeeds() {
    let mut http = ScriptedHttp::new(vec![Err(FetchError::Network)]);
    let mut sync = StubSync::default();
    let mut runtime =
        AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));
    let mut display = FrameRecorder::new();
    assert!(runtime.coordinates().is_none());

    http.push(Ok(GEOCODE));
    http.push(Ok(POINTS));
    http.push(Ok(STATIONS));
    http.push(Ok(OBSERVATION));
    http.push(Ok(FORECAST_CLEAR));

    let now = BOOT_EPOCH + WEATHER_REFRESH_INTERVAL_SECS;
    runtime.tick(now, false, &mut display, &mut http, &mut sync);

    assert!(runtime.coordinates().is_some());
    assert_eq!(runtime.snapshot().unwrap().forecast, "Sunny");
}

// ── Rendered frame ────────────────────────────────────────────

#[test]
fn frame_shows_readings_icon_and_stacked_labels() {
    let mut http = ScriptedHttp::new(full_fetch_script());
    let mut sync = StubSync::default();
    let mut runtime =
        AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));
    let mut display = FrameRecorder::new();

    runtime.tick(BOOT_EPOCH, false, &mut display, &mut http, &mut sync);

    let text = display.frame_text();
    assert!(text.contains("68F"));
    assert!(text.contains("65%"));
    // "Thunderstorms and Rain" classifies to two stacked labels.
    assert!(text.contains("Tstorms"));
    assert!(text.contains("Rain"));
    let (_, _, first_y) = display.texts.iter().find(|(s, _, _)| s == "Tstorms").unwrap();
    let (_, _, second_y) = display.texts.iter().find(|(s, _, _)| s == "Rain").unwrap();
    assert!(first_y < second_y);

    assert_eq!(display.icons.len(), 1);
    let (icon, x, y) = display.icons[0];
    assert_eq!(icon, Icon::Thunderstorm);
    assert_eq!((x, y), (70, 18));
}

#[test]
fn frame_without_snapshot_shows_fallback_text() {
    let mut http = ScriptedHttp::new(vec![]);
    let mut sync = StubSync::default();
    let mut runtime =
        AppRuntime::startup(settings(), &mut http, &mut sync, &FixedClock(BOOT_EPOCH));
    let mut display = FrameRecorder::new();

    runtime.tick(BOOT_EPOCH, false, &mut display, &mut http, &mut sync);

    let text = display.frame_text();
    assert!(text.contains("Weather data"));
    assert!(text.contains("unavailable"));
    assert!(display.icons.is_empty());
    // The clock still renders: date line plus time line.
    assert!(text.contains("2023"));
}
