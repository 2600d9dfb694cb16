//! Civil-time conversion and clock-face formatting.
//!
//! The device keeps its system clock in UTC (set by SNTP) and applies a
//! fixed offset for display. All functions take explicit epoch seconds so
//! the formatting logic stays testable without a real clock.

use chrono::{DateTime, Datelike, Timelike};

/// Fixed display offset from UTC, in seconds (US Eastern, DST ignored).
pub const UTC_OFFSET_SECS: i64 = -4 * 3600;

/// Local hours considered daytime for icon selection: `[7, 19)`.
const DAY_START_HOUR: u32 = 7;
const DAY_END_HOUR: u32 = 19;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A broken-down local timestamp, derived once per display refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl LocalTime {
    /// Convert UTC epoch seconds to local civil time. An out-of-range
    /// epoch (clock never synced) falls back to the epoch origin rather
    /// than failing the render path.
    pub fn from_epoch(epoch: i64) -> Self {
        let dt = DateTime::from_timestamp(epoch + UTC_OFFSET_SECS, 0)
            .unwrap_or(DateTime::UNIX_EPOCH);
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }

    /// `"H:MM:SS AM"` — 12-hour form with no zero-padding on the hour.
    pub fn format_time_12h(&self) -> String {
        let (hour12, ampm) = match self.hour {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{}:{:02}:{:02} {}", hour12, self.minute, self.second, ampm)
    }

    /// `"Mon DD, YYYY"` with a three-letter month.
    pub fn format_date(&self) -> String {
        let month = MONTHS[(self.month as usize - 1).min(11)];
        format!("{} {:02}, {}", month, self.day, self.year)
    }

    /// Whether the local hour falls in the daytime window used for
    /// day/night icon variants.
    pub fn is_daytime(&self) -> bool {
        (DAY_START_HOUR..DAY_END_HOUR).contains(&self.hour)
    }
}
