//! The presentation-facing device snapshot.
//!
//! `DeviceSnapshot` is the blackboard the synchronizer writes and the
//! presentation layer reads.  It is `Copy`: every update produces a new
//! value, and sinks receive a reference to the committed one.

use core::fmt;

/// Three-axis acceleration in m/s².
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Acceleration {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Acceleration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {:.2}, y: {:.2}, z: {:.2}", self.x, self.y, self.z)
    }
}

/// A position fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Most recent known state of every observed device signal.
///
/// Fields update independently; there is no ordering between them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub wifi_enabled: bool,
    /// Only meaningful while `wifi_enabled`; 0 when off or unknown.
    pub wifi_link_speed_mbps: u32,
    pub bluetooth_enabled: bool,
    pub gps_provider_enabled: bool,
    pub last_known_location: Option<GeoPoint>,
    pub last_accelerometer_sample: Acceleration,
}
