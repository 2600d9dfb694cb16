//! Device clock adapter.
//!
//! - **`target_os = "espidf"`** — uptime wraps `esp_timer_get_time()`
//!   (microsecond, monotonic); the wall clock is newlib `gettimeofday`,
//!   stepped by SNTP.
//! - **all other targets** — `std::time` equivalents for host tests.

use crate::app::ports::ClockPort;

pub struct DeviceClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for DeviceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic). Truncated to u32 to match the
    /// button driver's timestamp cells; wraps after ~49 days.
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

impl ClockPort for DeviceClock {
    fn now_epoch(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64)
    }
}
