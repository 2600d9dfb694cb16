//! SNTP time-sync adapter.
//!
//! Implements [`TimeSyncPort`]. Each `sync()` builds a fresh `EspSntp`
//! client in immediate mode and waits (bounded) for the first completed
//! synchronisation; the client is kept alive afterwards so lwIP can keep
//! stepping the clock in the background between explicit re-syncs.

use crate::app::ports::TimeSyncPort;
use crate::error::FetchError;

#[allow(dead_code)]
const SNTP_SERVER: &str = "pool.ntp.org";
#[allow(dead_code)]
const SYNC_TIMEOUT_MS: u32 = 20_000;
#[allow(dead_code)]
const POLL_INTERVAL_MS: u32 = 250;

pub struct SntpAdapter {
    #[cfg(target_os = "espidf")]
    client: Option<esp_idf_svc::sntp::EspSntp<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sync_count: u32,
}

impl Default for SntpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SntpAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sync_count: 0,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sync_count(&self) -> u32 {
        self.sync_count
    }
}

impl TimeSyncPort for SntpAdapter {
    #[cfg(target_os = "espidf")]
    fn sync(&mut self) -> Result<(), FetchError> {
        use esp_idf_svc::sntp::{EspSntp, OperatingMode, SntpConf, SyncMode, SyncStatus};
        use log::{info, warn};

        // Drop the previous client first; lwIP only supports one.
        self.client = None;

        let conf = SntpConf {
            servers: [SNTP_SERVER, "time.nist.gov"],
            sync_mode: SyncMode::Immediate,
            operating_mode: OperatingMode::Poll,
        };
        let sntp = EspSntp::new(&conf).map_err(|_| FetchError::Network)?;

        let mut elapsed_ms = 0u32;
        while elapsed_ms < SYNC_TIMEOUT_MS {
            if sntp.get_sync_status() == SyncStatus::Completed {
                info!("SNTP: synchronised after {elapsed_ms}ms");
                self.client = Some(sntp);
                return Ok(());
            }
            std::thread::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS as u64));
            elapsed_ms += POLL_INTERVAL_MS;
        }

        warn!("SNTP: no sync within {}s", SYNC_TIMEOUT_MS / 1000);
        // Keep the client: it may still complete in the background.
        self.client = Some(sntp);
        Err(FetchError::Timeout)
    }

    #[cfg(not(target_os = "espidf"))]
    fn sync(&mut self) -> Result<(), FetchError> {
        self.sync_count += 1;
        log::info!("SNTP(sim): sync #{} ok", self.sync_count);
        Ok(())
    }
}
