//! Presentation model for the control panel.
//!
//! Turns a [`DeviceSnapshot`] into the cards the screen shows: a title, a
//! value line, and at most one action button bound to a [`PanelCommand`].
//! Layout and theming are left to whatever renders these.

use super::commands::PanelCommand;
use super::snapshot::DeviceSnapshot;

/// A button on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardAction {
    pub label: &'static str,
    pub command: PanelCommand,
}

/// One row of the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelCard {
    pub title: &'static str,
    pub value: String,
    pub action: Option<CardAction>,
}

fn on_off(on: bool) -> &'static str {
    if on { "On" } else { "Off" }
}

fn toggle(on: bool, command: fn(bool) -> PanelCommand) -> CardAction {
    CardAction {
        label: if on { "Turn Off" } else { "Turn On" },
        command: command(!on),
    }
}

/// Build the panel cards, top to bottom.
pub fn panel_cards(snapshot: &DeviceSnapshot) -> [PanelCard; 4] {
    let wifi_value = if snapshot.wifi_enabled && snapshot.wifi_link_speed_mbps > 0 {
        format!("On ({} Mbps)", snapshot.wifi_link_speed_mbps)
    } else {
        on_off(snapshot.wifi_enabled).to_string()
    };

    let gps_value = match snapshot.last_known_location {
        Some(point) if snapshot.gps_provider_enabled => format!("On ({point})"),
        _ => on_off(snapshot.gps_provider_enabled).to_string(),
    };

    [
        PanelCard {
            title: "Wi-Fi",
            value: wifi_value,
            action: Some(toggle(snapshot.wifi_enabled, PanelCommand::SetWifiEnabled)),
        },
        PanelCard {
            title: "Bluetooth",
            value: on_off(snapshot.bluetooth_enabled).to_string(),
            action: Some(toggle(
                snapshot.bluetooth_enabled,
                PanelCommand::SetBluetoothEnabled,
            )),
        },
        PanelCard {
            title: "GPS",
            value: gps_value,
            action: Some(CardAction {
                label: "Settings",
                command: PanelCommand::OpenLocationSettings,
            }),
        },
        PanelCard {
            title: "Accelerometer",
            value: snapshot.last_accelerometer_sample.to_string(),
            action: None,
        },
    ]
}
