//! HTTP portals: captive provisioning and firmware update.
//!
//! Thin collaborators at the system boundary. Each portal owns an
//! `EspHttpServer`, registers a handful of routes, and blocks the boot
//! thread on a channel until the operator finishes. The HTTP response
//! for the final action is flushed inside the handler, before the
//! channel fires — so when `serve_*` returns, the caller can restart
//! the device without cutting off the browser.
//!
//! Form parsing is target-independent and unit-tested on the host; the
//! servers themselves exist only on the device target.

use crate::app::ports::{ProvisioningPortal, UpdatePortal};
use crate::config::Settings;
use crate::error::Error;

// ───────────────────────────────────────────────────────────────
// Form decoding (host-testable)
// ───────────────────────────────────────────────────────────────

/// Decode one application/x-www-form-urlencoded value.
fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes.get(i + 1..i + 3);
                match hex.and_then(|h| u8::from_str_radix(core::str::from_utf8(h).ok()?, 16).ok())
                {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parse the provisioning form body into a settings record.
fn parse_settings_form(body: &str) -> Option<Settings> {
    let mut ssid = None;
    let mut password = None;
    let mut zip = None;
    for pair in body.split('&') {
        let (key, value) = pair.split_once('=')?;
        let value = url_decode(value);
        match key {
            "ssid" => ssid = Some(value),
            "password" => password = Some(value),
            "zip" => zip = Some(value),
            _ => {}
        }
    }
    Some(Settings {
        ssid: ssid?,
        password: password.unwrap_or_default(),
        zip_code: zip?,
    })
}

// ───────────────────────────────────────────────────────────────
// Page templates
// ───────────────────────────────────────────────────────────────

#[allow(dead_code)]
const SETUP_PAGE: &str = r#"<!DOCTYPE html><html><head><title>PicoWeather Setup</title></head>
<body><h1>PicoWeather Setup</h1>
<form method="post" action="/configure">
<label>WiFi network <input name="ssid" maxlength="32"></label><br>
<label>Password <input name="password" type="password" maxlength="64"></label><br>
<label>ZIP code <input name="zip" maxlength="5" pattern="[0-9]{5}"></label><br>
<button type="submit">Save and restart</button>
</form></body></html>"#;

#[allow(dead_code)]
const SAVED_PAGE: &str = r#"<!DOCTYPE html><html><body>
<h1>Saved</h1><p>The device is restarting and will connect to your network.</p>
</body></html>"#;

#[allow(dead_code)]
const UPDATE_PAGE: &str = r#"<!DOCTYPE html><html><head><title>PicoWeather Update</title></head>
<body><h1>Firmware Update</h1>
<p>Upload replacement files, then press Continue to restart.</p>
<form method="post" enctype="application/octet-stream">
<input type="file" id="file"><button type="button" onclick="up()">Upload</button>
</form>
<a href="/continue">Continue</a>
<script>
async function up(){
  const f = document.getElementById('file').files[0];
  if(!f) return;
  await fetch('/upload?name=' + encodeURIComponent(f.name), {method:'POST', body:f});
  alert('uploaded ' + f.name);
}
</script></body></html>"#;

#[allow(dead_code)]
const CONTINUE_PAGE: &str =
    r#"<!DOCTYPE html><html><body><h1>Restarting</h1></body></html>"#;

// ───────────────────────────────────────────────────────────────
// Captive provisioning portal
// ───────────────────────────────────────────────────────────────

pub struct CaptivePortal;

impl Default for CaptivePortal {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptivePortal {
    pub fn new() -> Self {
        Self
    }
}

impl ProvisioningPortal for CaptivePortal {
    #[cfg(target_os = "espidf")]
    fn serve_until_submission(&mut self) -> Result<Settings, Error> {
        use embedded_svc::http::Method;
        use embedded_svc::io::{Read, Write};
        use esp_idf_svc::http::server::{Configuration, EspHttpServer};
        use log::{info, warn};
        use std::sync::mpsc;

        let mut server = EspHttpServer::new(&Configuration::default())
            .map_err(|_| Error::Init("portal http server"))?;
        let (tx, rx) = mpsc::channel::<Settings>();

        server
            .fn_handler::<anyhow::Error, _>("/", Method::Get, |req| {
                let mut resp = req.into_ok_response()?;
                resp.write_all(SETUP_PAGE.as_bytes())?;
                Ok(())
            })
            .map_err(|_| Error::Init("portal route /"))?;

        // OS captive-portal probes redirect into the form.
        for probe in ["/hotspot-detect.html", "/generate_204", "/connecttest.txt"] {
            server
                .fn_handler::<anyhow::Error, _>(probe, Method::Get, |req| {
                    req.into_response(302, Some("Found"), &[("Location", "/")])?;
                    Ok(())
                })
                .map_err(|_| Error::Init("portal probe route"))?;
        }

        server
            .fn_handler::<anyhow::Error, _>("/configure", Method::Post, move |mut req| {
                let mut body = Vec::new();
                let mut buf = [0u8; 256];
                loop {
                    let n = req.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    body.extend_from_slice(&buf[..n]);
                    if body.len() > 1024 {
                        break;
                    }
                }
                let body = String::from_utf8_lossy(&body);

                match parse_settings_form(&body) {
                    Some(settings) => match settings.validate() {
                        Ok(()) => {
                            let mut resp = req.into_ok_response()?;
                            resp.write_all(SAVED_PAGE.as_bytes())?;
                            drop(resp);
                            // Response flushed; hand the record to the boot thread.
                            tx.send(settings).ok();
                        }
                        Err(e) => {
                            warn!("portal: rejected submission: {e}");
                            let mut resp = req.into_response(400, Some("Bad Request"), &[])?;
                            resp.write_all(format!("invalid settings: {e}").as_bytes())?;
                        }
                    },
                    None => {
                        let mut resp = req.into_response(400, Some("Bad Request"), &[])?;
                        resp.write_all(b"malformed form")?;
                    }
                }
                Ok(())
            })
            .map_err(|_| Error::Init("portal route /configure"))?;

        info!("portal: provisioning portal up, waiting for submission");
        let settings = rx.recv().map_err(|_| Error::Init("portal channel"))?;
        // Give the final response a moment to drain before teardown.
        std::thread::sleep(std::time::Duration::from_millis(200));
        drop(server);
        Ok(settings)
    }

    #[cfg(not(target_os = "espidf"))]
    fn serve_until_submission(&mut self) -> Result<Settings, Error> {
        Err(Error::Init("provisioning portal requires the device target"))
    }
}

// ───────────────────────────────────────────────────────────────
// Firmware-update portal
// ───────────────────────────────────────────────────────────────

pub struct UpdatePortalServer;

impl Default for UpdatePortalServer {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdatePortalServer {
    pub fn new() -> Self {
        Self
    }
}

impl UpdatePortal for UpdatePortalServer {
    #[cfg(target_os = "espidf")]
    fn serve_until_confirmed(&mut self) -> Result<(), Error> {
        use embedded_svc::http::Method;
        use embedded_svc::io::{Read, Write};
        use esp_idf_svc::http::server::{Configuration, EspHttpServer};
        use log::info;
        use std::sync::mpsc;

        let mut server = EspHttpServer::new(&Configuration::default())
            .map_err(|_| Error::Init("update http server"))?;
        let (tx, rx) = mpsc::channel::<()>();

        server
            .fn_handler::<anyhow::Error, _>("/swup", Method::Get, |req| {
                let mut resp = req.into_ok_response()?;
                resp.write_all(UPDATE_PAGE.as_bytes())?;
                Ok(())
            })
            .map_err(|_| Error::Init("update route /swup"))?;

        server
            .fn_handler::<anyhow::Error, _>("/version", Method::Get, |req| {
                let mut resp = req.into_ok_response()?;
                resp.write_all(env!("CARGO_PKG_VERSION").as_bytes())?;
                Ok(())
            })
            .map_err(|_| Error::Init("update route /version"))?;

        server
            .fn_handler::<anyhow::Error, _>("/favicon.ico", Method::Get, |req| {
                req.into_response(404, Some("Not Found"), &[])?;
                Ok(())
            })
            .map_err(|_| Error::Init("update route /favicon.ico"))?;

        server
            .fn_handler::<anyhow::Error, _>("/upload", Method::Post, |mut req| {
                let name = req
                    .uri()
                    .split_once("name=")
                    .map(|(_, n)| url_decode(n))
                    .unwrap_or_else(|| "upload.bin".to_string());
                // Basename only; no path traversal out of the data dir.
                let name = name.rsplit(['/', '\\']).next().unwrap_or("upload.bin");

                let mut body = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = req.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    body.extend_from_slice(&buf[..n]);
                }
                let path = format!("/spiffs/{name}");
                std::fs::write(&path, &body)?;
                info!("update: wrote {} ({} bytes)", path, body.len());

                let mut resp = req.into_ok_response()?;
                resp.write_all(format!("stored {name}").as_bytes())?;
                Ok(())
            })
            .map_err(|_| Error::Init("update route /upload"))?;

        server
            .fn_handler::<anyhow::Error, _>("/continue", Method::Get, move |req| {
                let mut resp = req.into_ok_response()?;
                resp.write_all(CONTINUE_PAGE.as_bytes())?;
                drop(resp);
                tx.send(()).ok();
                Ok(())
            })
            .map_err(|_| Error::Init("update route /continue"))?;

        info!("portal: update portal up, waiting for confirmation");
        rx.recv().map_err(|_| Error::Init("update channel"))?;
        std::thread::sleep(std::time::Duration::from_millis(200));
        drop(server);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn serve_until_confirmed(&mut self) -> Result<(), Error> {
        Err(Error::Init("update portal requires the device target"))
    }
}
