//! Long-press detector for the mode button.
//!
//! Active-low momentary switch with external pull-up; the GPIO interrupt
//! fires on both edges. The ISR side touches exactly three atomic cells
//! and does no I/O and no allocation:
//!
//! - press-start timestamp (`AtomicU32`, sentinel = no press in progress)
//! - long-press latched (`AtomicBool`, makes the trigger idempotent per press)
//! - mode-switch requested (`AtomicBool`, consumed by the main loop)
//!
//! The main loop polls [`take_mode_switch_request`] once per tick, so the
//! worst-case response to a long press is one loop iteration.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Hold duration that triggers the switch to firmware-update mode.
pub const LONG_PRESS_MS: u32 = 5000;

const NO_PRESS: u32 = u32::MAX;

/// Millisecond timestamp of the current press, `NO_PRESS` when released.
static PRESS_START_MS: AtomicU32 = AtomicU32::new(NO_PRESS);

/// Set once per press when the threshold is crossed; cleared on the next
/// press so a single hold can never fire twice.
static LONG_PRESS_LATCHED: AtomicBool = AtomicBool::new(false);

/// Pending request for the main loop. Survives until consumed.
static MODE_SWITCH_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Physical edge seen by the ISR. The switch is active-low, so a falling
/// edge is a press and a rising edge a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

/// Edge handler — call from the GPIO ISR with a monotonic millisecond
/// timestamp. Lock-free; safe in interrupt context.
pub fn on_button_edge(edge: Edge, now_ms: u32) {
    match edge {
        Edge::Press => {
            PRESS_START_MS.store(now_ms, Ordering::Release);
            LONG_PRESS_LATCHED.store(false, Ordering::Release);
        }
        Edge::Release => {
            let start = PRESS_START_MS.load(Ordering::Acquire);
            if start == NO_PRESS {
                // Spurious release (boot with button down, contact bounce).
                return;
            }
            let held_ms = now_ms.wrapping_sub(start);
            if held_ms >= LONG_PRESS_MS && !LONG_PRESS_LATCHED.swap(true, Ordering::AcqRel) {
                MODE_SWITCH_REQUESTED.store(true, Ordering::Release);
            }
            PRESS_START_MS.store(NO_PRESS, Ordering::Release);
        }
    }
}

/// Read-and-clear the pending mode-switch request.
pub fn take_mode_switch_request() -> bool {
    MODE_SWITCH_REQUESTED.swap(false, Ordering::AcqRel)
}

/// GPIO hookup for the device target. Kept separate so the detector logic
/// above stays host-testable.
#[cfg(target_os = "espidf")]
pub mod irq {
    use esp_idf_hal::gpio::{AnyIOPin, Input, InterruptType, Pin, PinDriver, Pull};

    use crate::error::{Error, Result};

    /// Owns the pin driver; must stay alive for the ISR to remain armed.
    pub struct ButtonIrq {
        _pin: PinDriver<'static, AnyIOPin, Input>,
        gpio_num: i32,
    }

    impl ButtonIrq {
        pub fn attach(pin: AnyIOPin) -> Result<Self> {
            let gpio_num = pin.pin();
            let mut driver =
                PinDriver::input(pin).map_err(|_| Error::Init("button gpio driver"))?;
            driver
                .set_pull(Pull::Up)
                .map_err(|_| Error::Init("button pull-up"))?;
            driver
                .set_interrupt_type(InterruptType::AnyEdge)
                .map_err(|_| Error::Init("button interrupt type"))?;

            // SAFETY: the closure is ISR-safe — it reads the pin level and
            // the high-resolution timer and touches only the atomics above.
            unsafe {
                driver
                    .subscribe(move || {
                        let now_ms =
                            (esp_idf_svc::sys::esp_timer_get_time() / 1000) as u32;
                        let level = esp_idf_svc::sys::gpio_get_level(gpio_num);
                        let edge = if level == 0 {
                            super::Edge::Press
                        } else {
                            super::Edge::Release
                        };
                        super::on_button_edge(edge, now_ms);
                    })
                    .map_err(|_| Error::Init("button isr subscribe"))?;
            }
            driver
                .enable_interrupt()
                .map_err(|_| Error::Init("button interrupt enable"))?;

            Ok(Self {
                _pin: driver,
                gpio_num,
            })
        }

        /// GPIO number of the attached pin, for raw level polls.
        pub fn gpio_num(&self) -> i32 {
            self.gpio_num
        }
    }

    /// Poll the raw level directly; used for the boot-time hold check
    /// before the ISR is armed.
    pub fn is_pressed(gpio_num: i32) -> bool {
        unsafe { esp_idf_svc::sys::gpio_get_level(gpio_num) == 0 }
    }
}
