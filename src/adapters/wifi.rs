//! WiFi station adapter.
//!
//! Implements [`ConnectivityPort`] — one association attempt per
//! `connect()` call; the three-attempt retry policy lives in the mode
//! controller where it can be tested.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi` over the ESP-IDF driver.
//! - **all other targets**: simulation stub for host-side tests.
//!
//! The provisioning boot path reuses this adapter in access-point mode
//! ([`WifiStation::start_access_point`], device target only).

use log::{info, warn};

use crate::app::ports::ConnectivityPort;
use crate::error::WifiError;

/// Open AP name shown to the operator during provisioning.
pub const PROVISIONING_AP_SSID: &str = "pico weather";

// ───────────────────────────────────────────────────────────────
// Credential validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(WifiError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), WifiError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiStation {
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    connected: bool,
    ip: Option<String>,
}

#[cfg(target_os = "espidf")]
impl WifiStation {
    pub fn new(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
    ) -> crate::error::Result<Self> {
        use crate::error::Error;
        use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

        let esp_wifi = EspWifi::new(modem, sysloop.clone(), None)
            .map_err(|_| Error::Init("wifi driver"))?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)
            .map_err(|_| Error::Init("wifi event wiring"))?;
        Ok(Self {
            wifi,
            connected: false,
            ip: None,
        })
    }

    /// Switch to open access-point mode for the provisioning portal.
    pub fn start_access_point(&mut self) -> crate::error::Result<()> {
        use crate::error::Error;
        use esp_idf_svc::wifi::{AccessPointConfiguration, AuthMethod, Configuration};

        let mut ap_ssid = heapless::String::<32>::new();
        ap_ssid.push_str(PROVISIONING_AP_SSID).ok();

        self.wifi
            .set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
                ssid: ap_ssid,
                auth_method: AuthMethod::None,
                ..Default::default()
            }))
            .map_err(|_| Error::Init("wifi ap configuration"))?;
        self.wifi.start().map_err(|_| Error::Init("wifi ap start"))?;
        info!("wifi: access point '{PROVISIONING_AP_SSID}' up");
        Ok(())
    }

    fn platform_connect(&mut self, ssid: &str, password: &str) -> Result<(), WifiError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let mut wifi_ssid = heapless::String::<32>::new();
        let mut wifi_pass = heapless::String::<64>::new();
        wifi_ssid.push_str(ssid).ok();
        wifi_pass.push_str(password).ok();

        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: wifi_ssid,
                password: wifi_pass,
                auth_method: auth,
                ..Default::default()
            }))
            .map_err(|_| WifiError::AssociationFailed)?;

        self.wifi.start().map_err(|_| WifiError::AssociationFailed)?;

        if let Err(e) = self.wifi.connect() {
            warn!("wifi: connect failed: {e}");
            // Full stop/start cycle resets radio state for the next attempt.
            let _ = self.wifi.disconnect();
            self.wifi.stop().ok();
            std::thread::sleep(std::time::Duration::from_millis(500));
            self.wifi.start().ok();
            return Err(WifiError::AssociationFailed);
        }

        self.wifi
            .wait_netif_up()
            .map_err(|_| WifiError::AssociationFailed)?;
        let ip_info = self
            .wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .map_err(|_| WifiError::AssociationFailed)?;
        self.ip = Some(ip_info.ip.to_string());
        Ok(())
    }

    /// IP handed out in AP mode (for the portal URL on the display).
    pub fn ap_ip_address(&self) -> Option<String> {
        self.wifi
            .wifi()
            .ap_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip.to_string())
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiStation {
    pub fn new() -> Self {
        Self {
            connected: false,
            ip: None,
        }
    }

    fn platform_connect(&mut self, ssid: &str, _password: &str) -> Result<(), WifiError> {
        info!("wifi(sim): connected to '{ssid}'");
        self.ip = Some("192.168.1.50".to_string());
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiStation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityPort for WifiStation {
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), WifiError> {
        validate_ssid(ssid)?;
        validate_password(password)?;

        info!("wifi: connecting to '{ssid}'");
        match self.platform_connect(ssid, password) {
            Ok(()) => {
                self.connected = true;
                info!("wifi: connected (ip={:?})", self.ip);
                Ok(())
            }
            Err(e) => {
                self.connected = false;
                self.ip = None;
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn ip_address(&self) -> Option<String> {
        self.ip.clone()
    }
}
