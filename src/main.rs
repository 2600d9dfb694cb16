//! PicoWeather Firmware — Main Entry Point
//!
//! Hexagonal architecture: the mode controller and application runtime
//! are pure over port traits; this binary wires the ESP-IDF adapters to
//! them and dispatches on the boot decision.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  WifiStation    EspHttpClient   SntpAdapter   NvsSettings    │
//! │  (Connectivity) (HttpPort)      (TimeSync)    (SettingsStore)│
//! │  Oled           CaptivePortal   UpdatePortal  DeviceRestart  │
//! │  (DisplayPort)  (Provisioning)  (Update)      (RestartPort)  │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │   mode controller · AppRuntime · schedulers (pure)     │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::gpio::IOPin;

use picoweather::adapters::display::Oled;
use picoweather::adapters::http::EspHttpClient;
use picoweather::adapters::portal::{CaptivePortal, UpdatePortalServer};
use picoweather::adapters::sntp::SntpAdapter;
use picoweather::adapters::storage::NvsSettingsStore;
use picoweather::adapters::system::DeviceRestart;
use picoweather::adapters::time::DeviceClock;
use picoweather::adapters::wifi::{PROVISIONING_AP_SSID, WifiStation};
use picoweather::app::mode::{self, BootDecision};
use picoweather::app::ports::{ClockPort, ConnectivityPort, DisplayPort};
use picoweather::app::runtime::{AppRuntime, TickOutcome};
use picoweather::config::Settings;
use picoweather::drivers::button;

/// Display loop cadence; the clock face shows seconds.
const TICK_MS: u64 = 1000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("PicoWeather v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripherals and adapters ───────────────────────────
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;

    let mut store = NvsSettingsStore::new()
        .map_err(|e| anyhow::anyhow!("NVS init failed: {e}"))?;
    let clock = DeviceClock::new();
    let mut display = Oled::new();
    let mut restart = DeviceRestart::new();
    let mut wifi = WifiStation::new(peripherals.modem, sysloop)
        .map_err(|e| anyhow::anyhow!("wifi init failed: {e}"))?;

    // ── 3. Button hookup + boot-time settings reset ───────────
    // Mode button: active-low, external pull-up.
    let button_irq = button::irq::ButtonIrq::attach(peripherals.pins.gpio9.downgrade())
        .map_err(|e| anyhow::anyhow!("button init failed: {e}"))?;

    // Holding the button through power-on wipes the stored settings,
    // forcing the device back into provisioning.
    if button::irq::is_pressed(button_irq.gpio_num()) {
        info!("boot: button held, waiting {}ms for settings reset", button::LONG_PRESS_MS);
        std::thread::sleep(std::time::Duration::from_millis(button::LONG_PRESS_MS as u64));
        if button::irq::is_pressed(button_irq.gpio_num()) {
            warn!("boot: settings reset requested, clearing stored record");
            if let Err(e) = picoweather::app::ports::SettingsStore::delete(&mut store) {
                warn!("boot: settings delete failed: {e}");
            }
        }
    }

    // ── 4. Mode decision and dispatch ─────────────────────────
    match mode::decide_boot(&store) {
        BootDecision::Application(settings) => {
            match run_application(settings, &mut wifi, &mut store, &mut restart, &mut display, &clock)
            {
                Ok(()) => Ok(()),
                Err(e) => {
                    // Unhandled application failure: fall back to
                    // provisioning instead of boot-looping.
                    log::error!("application mode failed: {e}");
                    run_provisioning(&mut wifi, &mut store, &mut restart, &mut display)
                }
            }
        }
        BootDecision::Provisioning(reason) => {
            info!("boot: provisioning mode ({reason})");
            run_provisioning(&mut wifi, &mut store, &mut restart, &mut display)
        }
    }
}

// ── Provisioning mode ─────────────────────────────────────────

fn run_provisioning(
    wifi: &mut WifiStation,
    store: &mut NvsSettingsStore,
    restart: &mut DeviceRestart,
    display: &mut Oled,
) -> Result<()> {
    wifi.start_access_point()
        .map_err(|e| anyhow::anyhow!("access point failed: {e}"))?;

    show_lines(
        display,
        &[
            "Setup Mode",
            "",
            "Join WiFi network",
            PROVISIONING_AP_SSID,
            "and open",
            &wifi.ap_ip_address().unwrap_or_else(|| "192.168.71.1".into()),
        ],
    );

    let mut portal = CaptivePortal::new();
    mode::run_provisioning(&mut portal, store, restart)
        .map_err(|e| anyhow::anyhow!("provisioning failed: {e}"))
}

// ── Application mode ──────────────────────────────────────────

fn run_application(
    settings: Settings,
    wifi: &mut WifiStation,
    store: &mut NvsSettingsStore,
    restart: &mut DeviceRestart,
    display: &mut Oled,
    clock: &DeviceClock,
) -> Result<()> {
    show_lines(display, &["PicoWeather", "", "Connecting..."]);

    if mode::associate_or_reset(wifi, store, restart, &settings).is_err() {
        // Settings were cleared and the restart is already in motion.
        return Ok(());
    }

    // Boot splash: version + network identity for a couple of seconds.
    let ip = wifi.ip_address().unwrap_or_else(|| "?".into());
    show_lines(
        display,
        &[
            concat!("PicoWeather v", env!("CARGO_PKG_VERSION")),
            "",
            &settings.ssid,
            &ip,
        ],
    );
    std::thread::sleep(std::time::Duration::from_millis(2000));

    let mut http = EspHttpClient::new();
    let mut sntp = SntpAdapter::new();
    let mut runtime = AppRuntime::startup(settings, &mut http, &mut sntp, clock);

    info!("entering display loop");
    loop {
        let requested = button::take_mode_switch_request();
        let outcome = runtime.tick(
            clock.now_epoch(),
            requested,
            display,
            &mut http,
            &mut sntp,
        );

        if outcome == TickOutcome::EnterUpdateMode {
            show_lines(
                display,
                &["Firmware Update", "", "Browse to", &format!("http://{ip}/swup")],
            );
            let mut portal = UpdatePortalServer::new();
            return mode::run_update_mode(&mut portal, restart)
                .map_err(|e| anyhow::anyhow!("update mode failed: {e}"));
        }

        std::thread::sleep(std::time::Duration::from_millis(TICK_MS));
    }
}

// ── Display helpers ───────────────────────────────────────────

fn show_lines(display: &mut Oled, lines: &[&str]) {
    display.clear();
    for (i, line) in lines.iter().enumerate() {
        display.text(line, center_x(line), i as i32 * 10);
    }
    display.show();
}

fn center_x(s: &str) -> i32 {
    (128 - s.len() as i32 * 8) / 2
}
