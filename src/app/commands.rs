//! Inbound commands to the synchronizer.
//!
//! These represent actions requested by the user through the presentation
//! layer.  The [`DeviceStateSynchronizer`](super::service::DeviceStateSynchronizer)
//! interprets them according to the platform gates in
//! [`PanelConfig`](crate::config::PanelConfig).

/// Commands the presentation layer can send into the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    /// Turn Wi-Fi on or off (or open the Wi-Fi panel where toggling is forbidden).
    SetWifiEnabled(bool),

    /// Turn Bluetooth on (via the system prompt) or off (if authorised).
    SetBluetoothEnabled(bool),

    /// Hand off to the location source settings.
    OpenLocationSettings,

    /// Hand off to the Bluetooth settings.
    OpenBluetoothSettings,
}
