//! Application-mode runtime state and the per-tick pipeline.
//!
//! One `AppRuntime` value owns everything the clock/weather loop needs:
//! the settings, the cached coordinates, the current snapshot, and the
//! two scheduler watermarks. It is threaded through the loop by
//! ownership — there are no module-level globals here.
//!
//! Tick order is fixed: mode-switch check, display refresh, time-sync
//! scheduler, weather scheduler. The mode-switch check comes first so a
//! long press is answered within one loop iteration no matter what the
//! schedulers are about to do.

use log::{info, warn};

use crate::clock::LocalTime;
use crate::config::Settings;
use crate::schedule::{
    PeriodicTask, TIME_SYNC_INTERVAL_SECS, WEATHER_REFRESH_INTERVAL_SECS,
};
use crate::weather::{self, Coordinates, WeatherSnapshot, classify};

use super::ports::{ClockPort, DisplayPort, HttpPort, TimeSyncPort};

// Display geometry: 128x64 panel, 8x8 glyphs, 32x32 icons.
const DISPLAY_WIDTH: i32 = 128;
const CHAR_WIDTH: i32 = 8;
const ICON_X: i32 = 70;
const ICON_Y: i32 = 18;
const ICON_SIZE: i32 = 32;

/// What the loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stay in application mode.
    Continue,
    /// A long press was consumed; hand off to firmware-update mode.
    /// The application loop never resumes after this.
    EnterUpdateMode,
}

pub struct AppRuntime {
    settings: Settings,
    /// Geocoded once per provisioning record; retried on the weather
    /// cadence until the first success, then cached for the process.
    coordinates: Option<Coordinates>,
    snapshot: Option<WeatherSnapshot>,
    time_sync: PeriodicTask,
    weather_refresh: PeriodicTask,
}

impl AppRuntime {
    /// Boot-time startup: initial time sync, coordinate resolution, and
    /// weather fetch. Failures degrade (the display shows the fallback
    /// text) but never abort the boot; both watermarks are recorded so
    /// the schedulers wait a full interval before retrying.
    pub fn startup(
        settings: Settings,
        http: &mut impl HttpPort,
        time_sync: &mut impl TimeSyncPort,
        clock: &impl ClockPort,
    ) -> Self {
        if let Err(e) = time_sync.sync() {
            warn!("startup: initial time sync failed: {e}");
        }
        // Read the clock after the sync so the watermarks are in
        // post-step time.
        let now = clock.now_epoch();

        let mut runtime = Self {
            settings,
            coordinates: None,
            snapshot: None,
            time_sync: PeriodicTask::started_at(TIME_SYNC_INTERVAL_SECS, now),
            weather_refresh: PeriodicTask::started_at(WEATHER_REFRESH_INTERVAL_SECS, now),
        };
        runtime.refresh_weather(http, now);
        runtime
    }

    /// One loop iteration. `mode_switch_requested` is the consumed button
    /// flag — the caller reads it fresh each iteration and it is checked
    /// before anything else.
    pub fn tick(
        &mut self,
        now_epoch: i64,
        mode_switch_requested: bool,
        display: &mut impl DisplayPort,
        http: &mut impl HttpPort,
        time_sync: &mut impl TimeSyncPort,
    ) -> TickOutcome {
        if mode_switch_requested {
            info!("runtime: long press consumed, switching to update mode");
            return TickOutcome::EnterUpdateMode;
        }

        self.render(display, now_epoch);

        if self.time_sync.is_due(now_epoch) {
            match time_sync.sync() {
                Ok(()) => info!("runtime: time re-synced"),
                Err(e) => warn!("runtime: time sync failed: {e}"),
            }
            self.time_sync.record_run(now_epoch);
        }

        if self.weather_refresh.is_due(now_epoch) {
            self.refresh_weather(http, now_epoch);
            self.weather_refresh.record_run(now_epoch);
        }

        TickOutcome::Continue
    }

    /// Fetch a fresh snapshot, resolving coordinates first if that has
    /// never succeeded. Any failure drops the stale snapshot — the
    /// display must not show readings that are known to be outdated.
    fn refresh_weather(&mut self, http: &mut impl HttpPort, now_epoch: i64) {
        if self.coordinates.is_none() {
            match weather::resolve_coordinates(http, &self.settings.zip_code) {
                Ok(c) => self.coordinates = Some(c),
                Err(e) => {
                    warn!("weather: geocoding failed: {e}");
                    self.snapshot = None;
                    return;
                }
            }
        }
        let Some(coords) = self.coordinates else {
            return;
        };
        match weather::fetch(http, coords, now_epoch) {
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(e) => {
                warn!("weather: fetch failed: {e}");
                self.snapshot = None;
            }
        }
    }

    /// Draw the full frame: date and time on top, then either the weather
    /// block or the two-line fallback.
    fn render(&self, display: &mut impl DisplayPort, now_epoch: i64) {
        let local = LocalTime::from_epoch(now_epoch);
        let date = local.format_date();
        let time = local.format_time_12h();

        display.clear();
        display.text(&date, center_x(&date), 0);
        display.text(&time, center_x(&time), 10);

        match &self.snapshot {
            Some(snapshot) => {
                let temp = snapshot
                    .temperature_f
                    .map_or_else(|| "N/A".to_string(), |t| format!("{t}F"));
                let humidity = snapshot
                    .relative_humidity_pct
                    .map_or_else(|| "N/A".to_string(), |h| format!("{}%", h.round() as i64));
                display.text(&temp, 20, 30);
                display.text(&humidity, 20, 45);

                display.icon(
                    classify::icon_for(&snapshot.forecast, local.is_daytime()),
                    ICON_X,
                    ICON_Y,
                );
                let labels = classify::classify(&snapshot.forecast);
                match labels.as_slice() {
                    [one] => display.text(one, center_under_icon(one), 55),
                    [first, second] => {
                        display.text(first, center_under_icon(first), 49);
                        display.text(second, center_under_icon(second), 57);
                    }
                    _ => {}
                }
            }
            None => {
                display.text("Weather data", center_x("Weather data"), 30);
                display.text("unavailable", center_x("unavailable"), 42);
            }
        }

        display.show();
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

fn center_x(s: &str) -> i32 {
    (DISPLAY_WIDTH - s.len() as i32 * CHAR_WIDTH) / 2
}

fn center_under_icon(s: &str) -> i32 {
    ICON_X + ICON_SIZE / 2 - s.len() as i32 * CHAR_WIDTH / 2
}
