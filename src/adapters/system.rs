//! Device restart adapter.
//!
//! On hardware `restart()` does not return. The host backend records the
//! request instead, which is what the mode-flow tests assert on.

use log::info;

use crate::app::ports::RestartPort;

pub struct DeviceRestart {
    #[cfg(not(target_os = "espidf"))]
    requested: bool,
}

impl Default for DeviceRestart {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRestart {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            requested: false,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn was_requested(&self) -> bool {
        self.requested
    }
}

impl RestartPort for DeviceRestart {
    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        info!("restarting device");
        unsafe { esp_idf_svc::sys::esp_restart() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        info!("restart requested (simulation)");
        self.requested = true;
    }
}
