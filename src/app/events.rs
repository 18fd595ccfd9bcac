//! Inbound push events.
//!
//! Everything a platform delivery thread can report.  Adapters hand these to
//! a [`PushSender`](crate::events::PushSender); the
//! [`DeviceStateSynchronizer`](super::service::DeviceStateSynchronizer)
//! folds them into the snapshot on the owner thread.

use super::ports::Capability;
use super::snapshot::{Acceleration, GeoPoint};

/// Asynchronous notifications from the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// New accelerometer sample.
    Acceleration(Acceleration),

    /// Bluetooth adapter power state broadcast.
    BluetoothPowerChanged(bool),

    /// New position fix.
    LocationFix(GeoPoint),

    /// Outcome of the system "enable Bluetooth" prompt.
    BluetoothEnablePrompt { accepted: bool },

    /// Outcome of a permission prompt: the capabilities now granted.
    PermissionsResult(heapless::Vec<Capability, 3>),
}

impl PushEvent {
    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Acceleration(_) => "acceleration",
            Self::BluetoothPowerChanged(_) => "bluetooth_power",
            Self::LocationFix(_) => "location_fix",
            Self::BluetoothEnablePrompt { .. } => "bluetooth_prompt",
            Self::PermissionsResult(_) => "permissions",
        }
    }
}
