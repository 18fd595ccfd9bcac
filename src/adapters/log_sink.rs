//! Log-based snapshot sink adapter.
//!
//! Implements [`SnapshotSink`] by writing each published snapshot as one
//! structured log line.  The simulator uses it as its "screen"; a real UI
//! would implement the same trait and re-render instead.

use log::info;

use crate::app::ports::SnapshotSink;
use crate::app::snapshot::DeviceSnapshot;

/// Adapter that logs every published [`DeviceSnapshot`].
pub struct LogSnapshotSink;

impl LogSnapshotSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogSnapshotSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a snapshot as a single log line.
pub fn format_snapshot(s: &DeviceSnapshot) -> String {
    let location = match s.last_known_location {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    };
    format!(
        "SNAP | wifi={} ({} Mbps) | bt={} | gps={} | loc={} | accel=({})",
        if s.wifi_enabled { "On" } else { "Off" },
        s.wifi_link_speed_mbps,
        if s.bluetooth_enabled { "On" } else { "Off" },
        if s.gps_provider_enabled { "On" } else { "Off" },
        location,
        s.last_accelerometer_sample,
    )
}

impl SnapshotSink for LogSnapshotSink {
    fn publish(&mut self, snapshot: &DeviceSnapshot) {
        info!("{}", format_snapshot(snapshot));
    }
}
