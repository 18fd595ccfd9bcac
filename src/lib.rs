//! RadioPanel core library.
//!
//! Keeps a control panel's view of the device radios (Wi-Fi, Bluetooth,
//! GPS), the last location fix and the live accelerometer reading in sync
//! with the host platform.  Platform access goes through the port traits in
//! [`app::ports`]; [`adapters::sim`] provides a simulated platform for the
//! host binary and tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
