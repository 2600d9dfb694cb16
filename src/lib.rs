//! PicoWeather firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod schedule;
pub mod weather;

// ESP-IDF-backed outer ring; the implementations are cfg-guarded inside
// so the crate compiles for host-side tests.
pub mod adapters;
pub mod drivers;
