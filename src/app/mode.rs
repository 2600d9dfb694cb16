//! Device mode selection and the terminal portal modes.
//!
//! The device runs in exactly one of three modes per boot:
//!
//! - **Provisioning** — captive AP portal collecting WiFi + ZIP settings.
//! - **Application** — the clock/weather loop (see [`super::runtime`]).
//! - **FirmwareUpdate** — update page; entered only from Application via
//!   a 5 s button hold.
//!
//! Mode selection is an explicit decision value, not control flow that
//! falls out of error handling: [`decide_boot`] inspects the settings
//! store and returns the verdict, and `main` dispatches on it once.
//! Provisioning and FirmwareUpdate are terminal — both end in a restart,
//! and there is no edge between them.

use log::{info, warn};

use crate::config::Settings;
use crate::error::{ConfigError, Error, WifiError};

use super::ports::{ConnectivityPort, ProvisioningPortal, RestartPort, SettingsStore, UpdatePortal};

/// Verdict of the boot-time settings inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum BootDecision {
    /// No usable settings; the reason distinguishes first boot from a
    /// corrupt record in the logs.
    Provisioning(ConfigError),
    /// Settings loaded and validated; run the application.
    Application(Settings),
}

/// Inspect stored settings and pick the boot mode.
pub fn decide_boot(store: &impl SettingsStore) -> BootDecision {
    match store.load() {
        Ok(settings) => match settings.validate() {
            Ok(()) => BootDecision::Application(settings),
            Err(e) => {
                warn!("boot: stored settings invalid ({e}), entering provisioning");
                BootDecision::Provisioning(e)
            }
        },
        Err(e) => {
            info!("boot: no usable settings ({e}), entering provisioning");
            BootDecision::Provisioning(e)
        }
    }
}

/// Association attempts before giving up on the stored credentials.
pub const WIFI_MAX_ATTEMPTS: u32 = 3;

/// Try to associate with the configured network, up to
/// [`WIFI_MAX_ATTEMPTS`] times.
pub fn associate(
    wifi: &mut impl ConnectivityPort,
    settings: &Settings,
) -> Result<(), WifiError> {
    for attempt in 1..=WIFI_MAX_ATTEMPTS {
        info!(
            "wifi: associating with '{}' (attempt {attempt}/{WIFI_MAX_ATTEMPTS})",
            settings.ssid
        );
        match wifi.connect(&settings.ssid, &settings.password) {
            Ok(()) => {
                info!("wifi: associated (ip={:?})", wifi.ip_address());
                return Ok(());
            }
            Err(e) => warn!("wifi: attempt {attempt} failed: {e}"),
        }
    }
    Err(WifiError::AssociationFailed)
}

/// Associate, or self-heal: after exhausting the attempts the stored
/// credentials are presumed bad, so delete them and restart into
/// provisioning rather than boot-looping against a dead network.
pub fn associate_or_reset(
    wifi: &mut impl ConnectivityPort,
    store: &mut impl SettingsStore,
    restart: &mut impl RestartPort,
    settings: &Settings,
) -> Result<(), WifiError> {
    match associate(wifi, settings) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("wifi: giving up after {WIFI_MAX_ATTEMPTS} attempts, clearing settings");
            if let Err(del) = store.delete() {
                warn!("wifi: settings delete failed: {del}");
            }
            restart.restart();
            Err(e)
        }
    }
}

/// Run the provisioning mode to completion: serve the portal, persist the
/// submission, restart. The portal only returns settings that already
/// passed validation, but they are re-checked before persisting.
pub fn run_provisioning(
    portal: &mut impl ProvisioningPortal,
    store: &mut impl SettingsStore,
    restart: &mut impl RestartPort,
) -> Result<(), Error> {
    let settings = portal.serve_until_submission()?;
    settings.validate()?;
    store.save(&settings)?;
    info!("provisioning: settings saved for '{}', restarting", settings.ssid);
    restart.restart();
    Ok(())
}

/// Run the firmware-update mode to completion: block on the portal until
/// the operator confirms, then restart. The confirmation response has
/// already been flushed when the portal returns, so the restart is safe.
pub fn run_update_mode(
    portal: &mut impl UpdatePortal,
    restart: &mut impl RestartPort,
) -> Result<(), Error> {
    info!("update: serving firmware update page");
    portal.serve_until_confirmed()?;
    info!("update: confirmed, restarting");
    restart.restart();
    Ok(())
}
