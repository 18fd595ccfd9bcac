//! Application core: device-state synchronization with zero platform I/O.
//!
//! This module contains the observation rules for the control panel:
//! polling on resume, folding push deliveries, and applying user commands.
//! All interaction with the host platform happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without a device.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod snapshot;
pub mod subscription;
pub mod view;
