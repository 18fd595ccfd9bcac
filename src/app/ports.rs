//! Port traits: the hexagonal boundary between the synchronizer and the host platform.
//!
//! ```text
//!   Platform adapter ──▶ Port trait ──▶ DeviceStateSynchronizer
//! ```
//!
//! Driven adapters (radio managers, sensor managers, location services,
//! settings navigation, the permission authority) implement these traits.
//! The [`DeviceStateSynchronizer`](super::service::DeviceStateSynchronizer)
//! receives them at construction through a [`Platform`] bundle and never
//! reaches for ambient global handles.
//!
//! ## Push delivery
//!
//! Subscribing ports receive a [`PushSender`] and return a
//! [`Subscription`].  The sender may be moved to any delivery thread; the
//! subscription's disposer must stop delivery and release the platform
//! listener.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::app::snapshot::DeviceSnapshot;
use crate::app::subscription::Subscription;
use crate::error::PortError;
use crate::events::PushSender;

// ───────────────────────────────────────────────────────────────
// Shared vocabulary
// ───────────────────────────────────────────────────────────────

/// Named capabilities the permission authority can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    FineLocation,
    BodySensors,
    BluetoothConnect,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FineLocation => write!(f, "fine location"),
            Self::BodySensors => write!(f, "body sensors"),
            Self::BluetoothConnect => write!(f, "bluetooth connect"),
        }
    }
}

/// Accelerometer delivery rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRate {
    Fastest,
    Game,
    Ui,
    #[default]
    Normal,
}

impl SampleRate {
    /// Nominal delay between samples in microseconds.
    pub const fn period_us(self) -> u32 {
        match self {
            Self::Fastest => 0,
            Self::Game => 20_000,
            Self::Ui => 66_667,
            Self::Normal => 200_000,
        }
    }
}

/// Location stream throttle: a fix is delivered after `min_interval_ms`
/// or `min_distance_m` of displacement, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationRequest {
    pub min_interval_ms: u32,
    pub min_distance_m: f32,
}

/// System settings surfaces the panel can hand off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSurface {
    /// The inline Wi-Fi panel (replaces direct toggling on newer platforms).
    WifiPanel,
    /// Location source settings (GPS provider on/off).
    LocationSource,
    /// Bluetooth settings.
    Bluetooth,
}

// ───────────────────────────────────────────────────────────────
// Radio port (poll reads + toggle commands + power broadcast)
// ───────────────────────────────────────────────────────────────

/// Radio and location-provider state.
///
/// Reads are instantaneous and never block.  A missing radio reads as
/// disabled.
pub trait RadioPort {
    fn is_wifi_enabled(&self) -> bool;

    /// Current link speed in Mbps, `None` when the radio cannot report one.
    fn wifi_link_speed_mbps(&self) -> Option<u32>;

    fn is_bluetooth_enabled(&self) -> bool;

    fn is_gps_provider_enabled(&self) -> bool;

    /// Toggle Wi-Fi directly.  Only called when the platform permits it.
    fn set_wifi_enabled(&mut self, enable: bool) -> Result<(), PortError>;

    /// Power down the Bluetooth adapter.
    fn disable_bluetooth(&mut self) -> Result<(), PortError>;

    /// Register for Bluetooth power-state broadcasts, delivered as
    /// [`PushEvent::BluetoothPowerChanged`](super::events::PushEvent::BluetoothPowerChanged).
    fn subscribe_bluetooth_state(&mut self, sender: PushSender) -> Result<Subscription, PortError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port
// ───────────────────────────────────────────────────────────────

/// Three-axis acceleration stream.  No sample history is kept.
pub trait AccelerometerPort {
    /// Start delivering [`PushEvent::Acceleration`](super::events::PushEvent::Acceleration)
    /// samples.  Fails with [`PortError::ProviderUnavailable`] when the
    /// device has no accelerometer.
    fn subscribe(&mut self, rate: SampleRate, sender: PushSender) -> Result<Subscription, PortError>;
}

// ───────────────────────────────────────────────────────────────
// Location port
// ───────────────────────────────────────────────────────────────

/// Position fix stream.  Requires [`Capability::FineLocation`].
pub trait LocationPort {
    fn subscribe(
        &mut self,
        request: LocationRequest,
        sender: PushSender,
    ) -> Result<Subscription, PortError>;
}

// ───────────────────────────────────────────────────────────────
// Settings / navigation port
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget hand-off to system surfaces.
pub trait SettingsPort {
    /// Bring a settings surface to the foreground.
    fn open(&mut self, surface: SettingsSurface);

    /// Show the system "enable Bluetooth" prompt.  The outcome arrives later
    /// as [`PushEvent::BluetoothEnablePrompt`](super::events::PushEvent::BluetoothEnablePrompt)
    /// through `reply`.
    fn request_bluetooth_enable(&mut self, reply: PushSender);
}

// ───────────────────────────────────────────────────────────────
// Permission port
// ───────────────────────────────────────────────────────────────

/// The platform's permission authority.
pub trait PermissionPort {
    fn is_granted(&self, capability: Capability) -> bool;

    /// Prompt the user for `capabilities`.  The result arrives as
    /// [`PushEvent::PermissionsResult`](super::events::PushEvent::PermissionsResult).
    fn request(&mut self, capabilities: &[Capability], reply: PushSender);
}

// ───────────────────────────────────────────────────────────────
// Snapshot sink (synchronizer → presentation)
// ───────────────────────────────────────────────────────────────

/// The presentation layer subscribes through this port.  It is called on
/// the owner thread, once per changed snapshot.
pub trait SnapshotSink {
    fn publish(&mut self, snapshot: &DeviceSnapshot);
}

// ───────────────────────────────────────────────────────────────
// Platform bundle
// ───────────────────────────────────────────────────────────────

/// Every capability the synchronizer consumes, injected as one value.
pub struct Platform<R, A, L, S, P> {
    pub radio: R,
    pub accelerometer: A,
    pub location: L,
    pub settings: S,
    pub permissions: P,
}
