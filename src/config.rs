//! Panel configuration parameters
//!
//! Platform-version-gated behaviour lives here rather than in the
//! synchronizer: whether Wi-Fi may be toggled directly, whether disabling
//! Bluetooth needs the bluetooth-connect grant, and the push delivery
//! parameters.  Values derive from an API level and can be overridden with
//! a JSON document.

use serde::{Deserialize, Serialize};

use crate::app::ports::{Capability, LocationRequest, SampleRate};
use crate::error::{ConfigError, Result};

/// First API level that forbids apps from toggling Wi-Fi directly.
pub const WIFI_PANEL_API_LEVEL: u32 = 29;

/// First API level that gates Bluetooth control behind bluetooth-connect.
pub const BLUETOOTH_CONNECT_API_LEVEL: u32 = 31;

/// API level assumed when nothing else is known.
pub const DEFAULT_API_LEVEL: u32 = 34;

/// Core panel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PanelConfigOverrides")]
pub struct PanelConfig {
    /// Host platform API level the gates were derived from.
    pub api_level: u32,

    // --- Command gating ---
    /// Wi-Fi may be toggled directly; otherwise requests open the Wi-Fi panel.
    pub wifi_direct_toggle: bool,
    /// Disabling Bluetooth requires the bluetooth-connect grant.
    pub bluetooth_connect_gated: bool,

    // --- Push delivery ---
    /// Subscribe to Bluetooth power-state broadcasts while active.
    pub bluetooth_state_broadcast: bool,
    /// Accelerometer delivery rate.
    pub accelerometer_rate: SampleRate,
    /// Minimum time between location fixes (milliseconds)
    pub location_min_interval_ms: u32,
    /// Minimum displacement between location fixes (metres)
    pub location_min_distance_m: f32,
}

impl PanelConfig {
    /// Derive the gates for a given platform API level.
    pub fn for_api_level(api_level: u32) -> Self {
        Self {
            api_level,
            wifi_direct_toggle: api_level < WIFI_PANEL_API_LEVEL,
            bluetooth_connect_gated: api_level >= BLUETOOTH_CONNECT_API_LEVEL,
            bluetooth_state_broadcast: true,
            accelerometer_rate: SampleRate::Normal,
            location_min_interval_ms: 5000,
            location_min_distance_m: 10.0,
        }
    }

    /// Parse a JSON override document.  Missing fields take the values
    /// derived from the document's `api_level` (or the default level).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the push subscriptions meaningless.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.location_min_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "location_min_interval_ms must be > 0",
            ));
        }
        if !self.location_min_distance_m.is_finite() || self.location_min_distance_m < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "location_min_distance_m must be finite and >= 0",
            ));
        }
        Ok(())
    }

    /// Location stream parameters handed to the location port.
    pub fn location_request(&self) -> LocationRequest {
        LocationRequest {
            min_interval_ms: self.location_min_interval_ms,
            min_distance_m: self.location_min_distance_m,
        }
    }

    /// Grants the panel asks for at startup.
    pub fn required_permissions(&self) -> heapless::Vec<Capability, 3> {
        let mut caps = heapless::Vec::new();
        // Capacity covers every capability, pushes cannot fail.
        let _ = caps.push(Capability::FineLocation);
        let _ = caps.push(Capability::BodySensors);
        if self.bluetooth_connect_gated {
            let _ = caps.push(Capability::BluetoothConnect);
        }
        caps
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::for_api_level(DEFAULT_API_LEVEL)
    }
}

/// Wire form of [`PanelConfig`].  Every field is optional; absent ones are
/// filled from [`PanelConfig::for_api_level`] so the gates match the level.
#[derive(Debug, Default, Deserialize)]
struct PanelConfigOverrides {
    api_level: Option<u32>,
    wifi_direct_toggle: Option<bool>,
    bluetooth_connect_gated: Option<bool>,
    bluetooth_state_broadcast: Option<bool>,
    accelerometer_rate: Option<SampleRate>,
    location_min_interval_ms: Option<u32>,
    location_min_distance_m: Option<f32>,
}

impl From<PanelConfigOverrides> for PanelConfig {
    fn from(o: PanelConfigOverrides) -> Self {
        let base = Self::for_api_level(o.api_level.unwrap_or(DEFAULT_API_LEVEL));
        Self {
            wifi_direct_toggle: o.wifi_direct_toggle.unwrap_or(base.wifi_direct_toggle),
            bluetooth_connect_gated: o
                .bluetooth_connect_gated
                .unwrap_or(base.bluetooth_connect_gated),
            bluetooth_state_broadcast: o
                .bluetooth_state_broadcast
                .unwrap_or(base.bluetooth_state_broadcast),
            accelerometer_rate: o.accelerometer_rate.unwrap_or(base.accelerometer_rate),
            location_min_interval_ms: o
                .location_min_interval_ms
                .unwrap_or(base.location_min_interval_ms),
            location_min_distance_m: o
                .location_min_distance_m
                .unwrap_or(base.location_min_distance_m),
            ..base
        }
    }
}
