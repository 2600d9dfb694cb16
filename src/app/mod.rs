//! Domain core: mode selection and the application runtime.
//!
//! Everything in here is pure over the port traits in [`ports`] — no
//! ESP-IDF types, no clock reads, no globals — so the whole mode logic
//! runs on the host under test.

pub mod mode;
pub mod ports;
pub mod runtime;
