//! Watermark schedulers for the two periodic background actions.
//!
//! Pure over explicitly passed timestamps: the main loop reads the clock
//! once per iteration and threads `now` through, so there are no hidden
//! clock reads and the logic is directly testable.
//!
//! A failed action still records its run — the next attempt waits a full
//! interval rather than retrying hot.

/// NTP re-synchronisation cadence.
pub const TIME_SYNC_INTERVAL_SECS: i64 = 3600;

/// Weather re-fetch cadence.
pub const WEATHER_REFRESH_INTERVAL_SECS: i64 = 300;

/// A fixed-interval policy paired with a last-run watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    interval_secs: i64,
    last_run_epoch: i64,
}

impl PeriodicTask {
    /// Start a task whose first run is recorded at `now` (the boot-time
    /// action has already happened when the task is constructed).
    pub const fn started_at(interval_secs: i64, now: i64) -> Self {
        Self {
            interval_secs,
            last_run_epoch: now,
        }
    }

    /// True once a full interval has elapsed since the last recorded run.
    /// Idempotent: calling this never changes state.
    pub fn is_due(&self, now: i64) -> bool {
        now - self.last_run_epoch >= self.interval_secs
    }

    /// Record a run attempt, successful or not.
    pub fn record_run(&mut self, now: i64) {
        self.last_run_epoch = now;
    }

    pub fn last_run_epoch(&self) -> i64 {
        self.last_run_epoch
    }
}
