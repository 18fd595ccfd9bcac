//! Device state synchronizer, the hexagonal core.
//!
//! [`DeviceStateSynchronizer`] owns the [`DeviceSnapshot`] and keeps it
//! current through three observation strategies:
//!
//! - **poll**: instantaneous radio flags, read on activation and on every
//!   foreground resume;
//! - **push**: accelerometer samples, Bluetooth power broadcasts, location
//!   fixes and prompt results, marshalled through the [`PushQueue`];
//! - **command**: user requests, applied optimistically or conditionally
//!   depending on the platform gates in [`PanelConfig`].
//!
//! ```text
//!  RadioPort ─────────▶ ┌──────────────────────────┐ ──▶ SnapshotSink
//!  AccelerometerPort ──▶│  DeviceStateSynchronizer │
//!  LocationPort ──────▶ │  poll · push · command   │ ──▶ SettingsPort
//!  PermissionPort ────▶ └──────────────────────────┘
//! ```
//!
//! All methods run on the owner thread.  Only [`PushSender`]s leave it.

use log::{debug, info, warn};

use crate::config::PanelConfig;
use crate::events::{PushQueue, PushSender};

use super::commands::PanelCommand;
use super::events::PushEvent;
use super::ports::{
    AccelerometerPort, Capability, LocationPort, PermissionPort, Platform, RadioPort,
    SettingsPort, SettingsSurface, SnapshotSink,
};
use super::snapshot::DeviceSnapshot;
use super::subscription::Subscription;

// ───────────────────────────────────────────────────────────────
// Session
// ───────────────────────────────────────────────────────────────

/// Subscriptions held for one `activate()`/`deactivate()` pair.
///
/// Dropping the session releases every listener it holds.
#[derive(Debug, Default)]
struct Session {
    accelerometer: Option<Subscription>,
    bluetooth_state: Option<Subscription>,
    location: Option<Subscription>,
}

impl Session {
    fn live_count(&self) -> usize {
        [&self.accelerometer, &self.bluetooth_state, &self.location]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }
}

// ───────────────────────────────────────────────────────────────
// DeviceStateSynchronizer
// ───────────────────────────────────────────────────────────────

/// Keeps a presentation-facing [`DeviceSnapshot`] in sync with the platform.
pub struct DeviceStateSynchronizer<R, A, L, S, P> {
    platform: Platform<R, A, L, S, P>,
    config: PanelConfig,
    queue: PushQueue,
    session: Option<Session>,
    snapshot: DeviceSnapshot,
    sinks: Vec<Box<dyn SnapshotSink>>,
    dropped_push_events: u64,
}

impl<R, A, L, S, P> DeviceStateSynchronizer<R, A, L, S, P>
where
    R: RadioPort,
    A: AccelerometerPort,
    L: LocationPort,
    S: SettingsPort,
    P: PermissionPort,
{
    /// Construct an inactive synchronizer.  Call [`activate`](Self::activate) next.
    pub fn new(platform: Platform<R, A, L, S, P>, config: PanelConfig) -> Self {
        Self {
            platform,
            config,
            queue: PushQueue::new(),
            session: None,
            snapshot: DeviceSnapshot::default(),
            sinks: Vec::new(),
            dropped_push_events: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Acquire every push subscription and seed the snapshot with a poll.
    ///
    /// Calling this while already active does nothing.  A subscription
    /// that fails to establish is skipped; the others still come up.
    pub fn activate(&mut self) {
        if self.session.is_some() {
            debug!("activate: already active");
            return;
        }

        let sender = self.queue.open();
        let mut session = Session::default();

        match self
            .platform
            .accelerometer
            .subscribe(self.config.accelerometer_rate, sender.clone())
        {
            Ok(sub) => session.accelerometer = Some(sub),
            Err(e) => warn!("accelerometer subscription skipped: {}", e),
        }

        if self.config.bluetooth_state_broadcast {
            match self.platform.radio.subscribe_bluetooth_state(sender.clone()) {
                Ok(sub) => session.bluetooth_state = Some(sub),
                Err(e) => warn!("bluetooth broadcast subscription skipped: {}", e),
            }
        }

        session.location = self.subscribe_location(sender);

        info!(
            "Synchronizer activated with {} live subscriptions",
            session.live_count()
        );
        self.session = Some(session);

        let mut next = DeviceSnapshot::default();
        self.poll_into(&mut next);
        self.commit(next);
    }

    /// Release every subscription acquired by [`activate`](Self::activate).
    ///
    /// Safe to call when inactive or after a partial activation.  Events
    /// still in flight are discarded and sinks see the snapshot return to
    /// its defaults.
    pub fn deactivate(&mut self) {
        let discarded = self.queue.close();
        if let Some(session) = self.session.take() {
            let live = session.live_count();
            drop(session);
            info!(
                "Synchronizer deactivated: released {} subscriptions, discarded {} events",
                live, discarded
            );
        }
        self.commit(DeviceSnapshot::default());
    }

    /// Re-poll the instantaneous fields after the screen returns to the
    /// foreground.  Push-delivered fields are left alone.
    pub fn on_foreground_resumed(&mut self) {
        if !self.is_active() {
            debug!("resume ignored: inactive");
            return;
        }
        let mut next = self.snapshot;
        self.poll_into(&mut next);
        self.commit(next);
    }

    // ── Push marshalling ──────────────────────────────────────

    /// Fold queued push events into the snapshot.  Call from the owner
    /// thread whenever it is convenient (each frame, each loop turn).
    ///
    /// Returns the number of events applied.
    pub fn process_push_events(&mut self) -> usize {
        self.dropped_push_events += u64::from(self.queue.take_dropped());

        let mut events = Vec::new();
        let count = self.queue.drain(|event| events.push(event));
        for event in events {
            self.apply_push(event);
        }
        count
    }

    fn apply_push(&mut self, event: PushEvent) {
        debug!("push: {}", event.kind());
        let mut next = self.snapshot;
        match event {
            PushEvent::Acceleration(sample) => next.last_accelerometer_sample = sample,
            PushEvent::BluetoothPowerChanged(on) => next.bluetooth_enabled = on,
            PushEvent::LocationFix(point) => next.last_known_location = Some(point),
            PushEvent::BluetoothEnablePrompt { accepted } => {
                if accepted {
                    next.bluetooth_enabled = true;
                } else {
                    debug!("bluetooth enable prompt declined");
                }
            }
            PushEvent::PermissionsResult(granted) => {
                info!("Permissions granted: {:?}", granted.as_slice());
                if granted.contains(&Capability::FineLocation) {
                    self.retry_location_subscription();
                }
            }
        }
        self.commit(next);
    }

    // ── Command handling ──────────────────────────────────────

    /// Dispatch a command from the presentation layer.
    pub fn handle_command(&mut self, cmd: PanelCommand) {
        match cmd {
            PanelCommand::SetWifiEnabled(enable) => self.request_set_wifi_enabled(enable),
            PanelCommand::SetBluetoothEnabled(enable) => self.request_set_bluetooth_enabled(enable),
            PanelCommand::OpenLocationSettings => self.request_open_location_settings(),
            PanelCommand::OpenBluetoothSettings => self.request_open_bluetooth_settings(),
        }
    }

    /// Toggle Wi-Fi directly where permitted, otherwise open the Wi-Fi panel.
    pub fn request_set_wifi_enabled(&mut self, enable: bool) {
        if !self.config.wifi_direct_toggle {
            info!("Wi-Fi toggle redirected to settings panel");
            self.platform.settings.open(SettingsSurface::WifiPanel);
            return;
        }
        if !self.is_active() {
            debug!("wifi toggle ignored: inactive");
            return;
        }
        if let Err(e) = self.platform.radio.set_wifi_enabled(enable) {
            warn!("Wi-Fi toggle failed: {}", e);
            return;
        }

        let mut next = self.snapshot;
        next.wifi_enabled = enable;
        next.wifi_link_speed_mbps = if enable {
            self.platform.radio.wifi_link_speed_mbps().unwrap_or(0)
        } else {
            0
        };
        self.commit(next);
    }

    /// Enable via the system prompt (applied on confirmed success), or
    /// disable directly when authorised.  Unauthorised disables are
    /// skipped silently.
    pub fn request_set_bluetooth_enabled(&mut self, enable: bool) {
        if enable {
            let reply = self.queue.sender();
            self.platform.settings.request_bluetooth_enable(reply);
            return;
        }

        if !self.is_active() {
            debug!("bluetooth disable ignored: inactive");
            return;
        }
        if self.config.bluetooth_connect_gated
            && !self
                .platform
                .permissions
                .is_granted(Capability::BluetoothConnect)
        {
            debug!("bluetooth disable skipped: bluetooth connect not granted");
            return;
        }
        if let Err(e) = self.platform.radio.disable_bluetooth() {
            warn!("Bluetooth disable failed: {}", e);
            return;
        }

        let mut next = self.snapshot;
        next.bluetooth_enabled = false;
        self.commit(next);
    }

    pub fn request_open_location_settings(&mut self) {
        self.platform.settings.open(SettingsSurface::LocationSource);
    }

    pub fn request_open_bluetooth_settings(&mut self) {
        self.platform.settings.open(SettingsSurface::Bluetooth);
    }

    // ── Permissions ───────────────────────────────────────────

    /// Required grants that are currently missing.
    pub fn missing_permissions(&self) -> heapless::Vec<Capability, 3> {
        self.config
            .required_permissions()
            .into_iter()
            .filter(|cap| !self.platform.permissions.is_granted(*cap))
            .collect()
    }

    /// Prompt for every missing grant.  Returns `false` when nothing was
    /// missing.  The result arrives as a push event.
    pub fn request_missing_permissions(&mut self) -> bool {
        let missing = self.missing_permissions();
        if missing.is_empty() {
            return false;
        }
        info!("Requesting permissions: {:?}", missing.as_slice());
        let reply = self.queue.sender();
        self.platform.permissions.request(&missing, reply);
        true
    }

    // ── Observation ───────────────────────────────────────────

    /// Register a presentation sink.  It immediately receives the current
    /// snapshot, then one call per change.
    pub fn add_sink(&mut self, mut sink: Box<dyn SnapshotSink>) {
        sink.publish(&self.snapshot);
        self.sinks.push(sink);
    }

    /// Current snapshot (read-only).
    pub fn snapshot(&self) -> &DeviceSnapshot {
        &self.snapshot
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Number of platform listeners currently held.
    pub fn live_subscriptions(&self) -> usize {
        self.session.as_ref().map_or(0, Session::live_count)
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Push events lost to queue overflow since construction.
    pub fn dropped_push_events(&self) -> u64 {
        self.dropped_push_events
    }

    pub fn platform(&self) -> &Platform<R, A, L, S, P> {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut Platform<R, A, L, S, P> {
        &mut self.platform
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll_into(&self, next: &mut DeviceSnapshot) {
        let radio = &self.platform.radio;
        next.wifi_enabled = radio.is_wifi_enabled();
        next.wifi_link_speed_mbps = if next.wifi_enabled {
            radio.wifi_link_speed_mbps().unwrap_or(0)
        } else {
            0
        };
        next.bluetooth_enabled = radio.is_bluetooth_enabled();
        next.gps_provider_enabled = radio.is_gps_provider_enabled();
    }

    fn subscribe_location(&mut self, sender: PushSender) -> Option<Subscription> {
        if !self
            .platform
            .permissions
            .is_granted(Capability::FineLocation)
        {
            debug!("location subscription skipped: fine location not granted");
            return None;
        }
        match self
            .platform
            .location
            .subscribe(self.config.location_request(), sender)
        {
            Ok(sub) => Some(sub),
            Err(e) => {
                warn!("location subscription skipped: {}", e);
                None
            }
        }
    }

    fn retry_location_subscription(&mut self) {
        let needs_location = self
            .session
            .as_ref()
            .is_some_and(|s| s.location.is_none());
        if !needs_location {
            return;
        }
        let sender = self.queue.sender();
        let sub = self.subscribe_location(sender);
        if let Some(session) = self.session.as_mut() {
            if sub.is_some() {
                info!("Location stream established after permission grant");
            }
            session.location = sub;
        }
    }

    /// Replace the snapshot and notify sinks if anything changed.
    fn commit(&mut self, next: DeviceSnapshot) {
        if next == self.snapshot {
            return;
        }
        self.snapshot = next;
        for sink in &mut self.sinks {
            sink.publish(&self.snapshot);
        }
    }
}
