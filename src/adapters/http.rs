//! HTTPS client adapter.
//!
//! Implements [`HttpPort`] over `EspHttpConnection` with the certificate
//! bundle attached, a 15 s timeout, and a 32 KB body cap. Errors are
//! collapsed into the [`FetchError`] taxonomy the weather pipeline
//! handles; the caller never sees ESP-IDF error codes.
//!
//! There is no network on the host target — the simulation backend fails
//! every request, and host tests inject scripted mocks instead.

use crate::app::ports::HttpPort;
use crate::error::FetchError;

#[allow(dead_code)]
const TIMEOUT_MS: u64 = 15_000;
#[allow(dead_code)]
const MAX_BODY_BYTES: usize = 32 * 1024;

pub struct EspHttpClient;

impl Default for EspHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EspHttpClient {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
fn map_esp_err(e: esp_idf_svc::sys::EspError) -> FetchError {
    if e.code() == esp_idf_svc::sys::ESP_ERR_TIMEOUT {
        FetchError::Timeout
    } else {
        FetchError::Network
    }
}

impl HttpPort for EspHttpClient {
    #[cfg(target_os = "espidf")]
    fn get(&mut self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
        use embedded_svc::http::Method;
        use embedded_svc::http::client::Client;
        use embedded_svc::io::Read;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use log::info;

        let config = Configuration {
            timeout: Some(std::time::Duration::from_millis(TIMEOUT_MS)),
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };

        let connection = EspHttpConnection::new(&config).map_err(map_esp_err)?;
        let mut client = Client::wrap(connection);

        let request = client
            .request(Method::Get, url, headers)
            .map_err(|e| map_esp_err(e.0))?;
        let mut response = request.submit().map_err(|e| map_esp_err(e.0))?;

        let status = response.status();
        info!("HTTP GET {} -> {}", url.chars().take(80).collect::<String>(), status);
        if status != 200 {
            return Err(FetchError::Network);
        }

        let mut body: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = response.read(&mut buf).map_err(|e| map_esp_err(e.0))?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&buf[..n]);
            if body.len() > MAX_BODY_BYTES {
                return Err(FetchError::Decode);
            }
        }

        String::from_utf8(body).map_err(|_| FetchError::Decode)
    }

    #[cfg(not(target_os = "espidf"))]
    fn get(&mut self, url: &str, _headers: &[(&str, &str)]) -> Result<String, FetchError> {
        log::warn!("HTTP(sim): no network backend, GET {url} fails");
        Err(FetchError::Network)
    }
}
