//! Simulated host platform.
//!
//! Implements every capability port without a device, for the host
//! simulator binary and for unit tests.  Push sources run on real
//! background threads so delivery crosses threads exactly as it does on a
//! phone: the accelerometer and location streams each own a worker that is
//! stopped and joined by the subscription's disposer.
//!
//! All adapters share state through `Arc<Mutex<_>>`, so a clone kept by
//! the caller can flip radios "from outside" (the user pulling down the
//! quick settings shade, say) while the synchronizer owns the original.

use std::collections::HashSet;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};

use crate::app::events::PushEvent;
use crate::app::ports::{
    AccelerometerPort, Capability, LocationPort, LocationRequest, PermissionPort, Platform,
    RadioPort, SampleRate, SettingsPort, SettingsSurface,
};
use crate::app::snapshot::{Acceleration, GeoPoint};
use crate::app::subscription::Subscription;
use crate::error::PortError;
use crate::events::PushSender;

/// Link speed reported while simulated Wi-Fi is on.
pub const SIM_LINK_SPEED_MBPS: u32 = 72;

/// Floor for worker sleep so `SampleRate::Fastest` does not spin.
const MIN_WORKER_PERIOD: Duration = Duration::from_millis(5);

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ───────────────────────────────────────────────────────────────
// Background worker
// ───────────────────────────────────────────────────────────────

/// Spawn a named thread that calls `step` every `period` until the returned
/// subscription is released.  Release wakes the worker out of its wait, so
/// the disposer returns as soon as the current step finishes.
fn spawn_worker(
    label: &'static str,
    period: Duration,
    mut step: impl FnMut(u64) + Send + 'static,
) -> Result<Subscription, PortError> {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let period = period.max(MIN_WORKER_PERIOD);

    let handle: JoinHandle<()> = thread::Builder::new()
        .name(format!("sim-{label}"))
        .spawn(move || {
            let mut n = 0u64;
            loop {
                step(n);
                n += 1;
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })
        .map_err(|_| PortError::Rejected("could not start delivery thread"))?;

    Ok(Subscription::new(label, move || {
        let _ = stop_tx.send(());
        if handle.join().is_err() {
            warn!("SIM | {} worker panicked", label);
        }
    }))
}

// ───────────────────────────────────────────────────────────────
// Radio
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SimRadioState {
    pub wifi_enabled: bool,
    pub wifi_toggle_allowed: bool,
    pub bluetooth_present: bool,
    pub bluetooth_enabled: bool,
    pub gps_enabled: bool,
}

impl Default for SimRadioState {
    fn default() -> Self {
        Self {
            wifi_enabled: false,
            wifi_toggle_allowed: true,
            bluetooth_present: true,
            bluetooth_enabled: false,
            gps_enabled: true,
        }
    }
}

/// Simulated radio manager.  Clones share state.
#[derive(Clone, Default)]
pub struct SimRadio {
    state: Arc<Mutex<SimRadioState>>,
    broadcast: Arc<Mutex<Option<PushSender>>>,
}

impl SimRadio {
    pub fn new(state: SimRadioState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            broadcast: Arc::default(),
        }
    }

    pub fn state(&self) -> SimRadioState {
        *lock(&self.state)
    }

    /// Flip Bluetooth outside the app; listeners get a power broadcast.
    pub fn set_bluetooth_power(&self, on: bool) {
        lock(&self.state).bluetooth_enabled = on;
        if let Some(sender) = lock(&self.broadcast).as_ref() {
            sender.push(PushEvent::BluetoothPowerChanged(on));
        }
    }

    /// Flip Wi-Fi outside the app.  No broadcast; only a poll sees it.
    pub fn set_wifi_power(&self, on: bool) {
        lock(&self.state).wifi_enabled = on;
    }

    /// Flip the GPS provider outside the app.  No broadcast.
    pub fn set_gps_provider(&self, on: bool) {
        lock(&self.state).gps_enabled = on;
    }
}

impl RadioPort for SimRadio {
    fn is_wifi_enabled(&self) -> bool {
        lock(&self.state).wifi_enabled
    }

    fn wifi_link_speed_mbps(&self) -> Option<u32> {
        lock(&self.state).wifi_enabled.then_some(SIM_LINK_SPEED_MBPS)
    }

    fn is_bluetooth_enabled(&self) -> bool {
        let s = lock(&self.state);
        s.bluetooth_present && s.bluetooth_enabled
    }

    fn is_gps_provider_enabled(&self) -> bool {
        lock(&self.state).gps_enabled
    }

    fn set_wifi_enabled(&mut self, enable: bool) -> Result<(), PortError> {
        let mut s = lock(&self.state);
        if !s.wifi_toggle_allowed {
            return Err(PortError::Rejected("wifi toggling not allowed"));
        }
        s.wifi_enabled = enable;
        info!("SIM | wifi -> {}", enable);
        Ok(())
    }

    fn disable_bluetooth(&mut self) -> Result<(), PortError> {
        if !lock(&self.state).bluetooth_present {
            return Err(PortError::ProviderUnavailable("bluetooth adapter"));
        }
        self.set_bluetooth_power(false);
        info!("SIM | bluetooth -> false");
        Ok(())
    }

    fn subscribe_bluetooth_state(&mut self, sender: PushSender) -> Result<Subscription, PortError> {
        if !lock(&self.state).bluetooth_present {
            return Err(PortError::ProviderUnavailable("bluetooth adapter"));
        }
        *lock(&self.broadcast) = Some(sender);
        let slot = Arc::clone(&self.broadcast);
        Ok(Subscription::new("bluetooth_state", move || {
            *lock(&slot) = None;
        }))
    }
}

// ───────────────────────────────────────────────────────────────
// Accelerometer
// ───────────────────────────────────────────────────────────────

/// Simulated accelerometer: a device lying flat with a slow wobble.
#[derive(Debug, Clone)]
pub struct SimAccelerometer {
    present: bool,
}

impl SimAccelerometer {
    pub fn new(present: bool) -> Self {
        Self { present }
    }

    /// Sample number `n` of the wobble.
    pub fn sample(n: u64) -> Acceleration {
        let t = n as f32 * 0.2;
        Acceleration::new(0.3 * t.sin(), 0.3 * t.cos(), 9.81)
    }
}

impl AccelerometerPort for SimAccelerometer {
    fn subscribe(&mut self, rate: SampleRate, sender: PushSender) -> Result<Subscription, PortError> {
        if !self.present {
            return Err(PortError::ProviderUnavailable("accelerometer"));
        }
        let period = Duration::from_micros(rate.period_us() as u64);
        spawn_worker("accelerometer", period, move |n| {
            sender.push(PushEvent::Acceleration(Self::sample(n)));
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Location
// ───────────────────────────────────────────────────────────────

/// Simulated location provider walking north-east from `origin`.
#[derive(Debug, Clone)]
pub struct SimLocation {
    origin: GeoPoint,
}

impl SimLocation {
    pub fn new(origin: GeoPoint) -> Self {
        Self { origin }
    }
}

impl LocationPort for SimLocation {
    fn subscribe(
        &mut self,
        request: LocationRequest,
        sender: PushSender,
    ) -> Result<Subscription, PortError> {
        let origin = self.origin;
        // ~11 m per step in latitude, above the displacement threshold.
        let step_deg = 0.0001;
        let period = Duration::from_millis(request.min_interval_ms as u64);
        spawn_worker("location", period, move |n| {
            let d = n as f64 * step_deg;
            sender.push(PushEvent::LocationFix(GeoPoint::new(
                origin.latitude + d,
                origin.longitude + d,
            )));
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Settings navigation
// ───────────────────────────────────────────────────────────────

/// Records every hand-off; answers the Bluetooth prompt immediately.
#[derive(Clone)]
pub struct SimSettings {
    radio: SimRadio,
    accept_bluetooth_prompt: bool,
    opened: Arc<Mutex<Vec<SettingsSurface>>>,
}

impl SimSettings {
    pub fn new(radio: SimRadio, accept_bluetooth_prompt: bool) -> Self {
        Self {
            radio,
            accept_bluetooth_prompt,
            opened: Arc::default(),
        }
    }

    pub fn opened(&self) -> Vec<SettingsSurface> {
        lock(&self.opened).clone()
    }
}

impl SettingsPort for SimSettings {
    fn open(&mut self, surface: SettingsSurface) {
        info!("SIM | open settings {:?}", surface);
        lock(&self.opened).push(surface);
    }

    fn request_bluetooth_enable(&mut self, reply: PushSender) {
        let accepted = self.accept_bluetooth_prompt && self.radio.state().bluetooth_present;
        if accepted {
            self.radio.set_bluetooth_power(true);
        }
        info!("SIM | bluetooth prompt accepted={}", accepted);
        reply.push(PushEvent::BluetoothEnablePrompt { accepted });
    }
}

// ───────────────────────────────────────────────────────────────
// Permissions
// ───────────────────────────────────────────────────────────────

/// Simulated permission authority.
#[derive(Clone, Default)]
pub struct SimPermissions {
    granted: Arc<Mutex<HashSet<Capability>>>,
    grant_on_request: bool,
}

impl SimPermissions {
    pub fn new(granted: &[Capability], grant_on_request: bool) -> Self {
        Self {
            granted: Arc::new(Mutex::new(granted.iter().copied().collect())),
            grant_on_request,
        }
    }

    pub fn revoke(&self, capability: Capability) {
        lock(&self.granted).remove(&capability);
    }
}

impl PermissionPort for SimPermissions {
    fn is_granted(&self, capability: Capability) -> bool {
        lock(&self.granted).contains(&capability)
    }

    fn request(&mut self, capabilities: &[Capability], reply: PushSender) {
        let mut granted = lock(&self.granted);
        if self.grant_on_request {
            granted.extend(capabilities.iter().copied());
        }
        let result: heapless::Vec<Capability, 3> = [
            Capability::FineLocation,
            Capability::BodySensors,
            Capability::BluetoothConnect,
        ]
        .into_iter()
        .filter(|cap| granted.contains(cap))
        .collect();
        drop(granted);
        reply.push(PushEvent::PermissionsResult(result));
    }
}

// ───────────────────────────────────────────────────────────────
// Platform builder
// ───────────────────────────────────────────────────────────────

/// The full simulated platform.
pub type SimPorts = Platform<SimRadio, SimAccelerometer, SimLocation, SimSettings, SimPermissions>;

/// Entry point for building a [`SimPorts`] bundle.
pub struct SimPlatform;

impl SimPlatform {
    pub fn builder() -> SimPlatformBuilder {
        SimPlatformBuilder::default()
    }
}

pub struct SimPlatformBuilder {
    radio: SimRadioState,
    accelerometer_present: bool,
    origin: GeoPoint,
    granted: Vec<Capability>,
    grant_on_request: bool,
    accept_bluetooth_prompt: bool,
}

impl Default for SimPlatformBuilder {
    fn default() -> Self {
        Self {
            radio: SimRadioState::default(),
            accelerometer_present: true,
            origin: GeoPoint::new(52.520_08, 13.404_95),
            granted: vec![
                Capability::FineLocation,
                Capability::BodySensors,
                Capability::BluetoothConnect,
            ],
            grant_on_request: true,
            accept_bluetooth_prompt: true,
        }
    }
}

impl SimPlatformBuilder {
    pub fn radio(mut self, radio: SimRadioState) -> Self {
        self.radio = radio;
        self
    }

    pub fn accelerometer_present(mut self, present: bool) -> Self {
        self.accelerometer_present = present;
        self
    }

    pub fn origin(mut self, origin: GeoPoint) -> Self {
        self.origin = origin;
        self
    }

    pub fn granted(mut self, granted: &[Capability]) -> Self {
        self.granted = granted.to_vec();
        self
    }

    pub fn grant_on_request(mut self, grant: bool) -> Self {
        self.grant_on_request = grant;
        self
    }

    pub fn accept_bluetooth_prompt(mut self, accept: bool) -> Self {
        self.accept_bluetooth_prompt = accept;
        self
    }

    pub fn build(self) -> SimPorts {
        let radio = SimRadio::new(self.radio);
        Platform {
            settings: SimSettings::new(radio.clone(), self.accept_bluetooth_prompt),
            radio,
            accelerometer: SimAccelerometer::new(self.accelerometer_present),
            location: SimLocation::new(self.origin),
            permissions: SimPermissions::new(&self.granted, self.grant_on_request),
        }
    }
}
