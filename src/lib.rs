//! Kuzzle IoT device client.
//!
//! Connects a device to a Kuzzle backend over MQTT: publishes its state,
//! receives state changes addressed to it and firmware update
//! announcements.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module; on other targets the
//! adapters fall back to host simulations.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod identity;
pub mod protocol;
