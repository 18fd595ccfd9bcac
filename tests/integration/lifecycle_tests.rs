//! Activation, teardown, poll-on-resume and push folding.
//!
//! The mocks hold on to the senders the synchronizer handed out, so each
//! test pushes events exactly as a platform delivery thread would.

use radiopanel::app::events::PushEvent;
use radiopanel::app::ports::SampleRate;
use radiopanel::app::snapshot::{Acceleration, DeviceSnapshot, GeoPoint};
use radiopanel::config::PanelConfig;
use radiopanel::events::PUSH_QUEUE_DEPTH;

use crate::mock_platform::{RecordingSink, live, make_sync, make_sync_with};

fn accel(x: f32, y: f32, z: f32) -> PushEvent {
    PushEvent::Acceleration(Acceleration::new(x, y, z))
}

// ── Activation ────────────────────────────────────────────────

#[test]
fn activate_subscribes_every_push_source_once() {
    let (mut sync, counter) = make_sync(PanelConfig::default());
    sync.activate();

    assert!(sync.is_active());
    assert_eq!(live(&counter), 3);
    assert_eq!(sync.live_subscriptions(), 3);
    assert_eq!(sync.platform().accelerometer.subscribes, 1);
    assert_eq!(sync.platform().location.subscribes, 1);
    assert_eq!(sync.platform().radio.broadcast_subscribes, 1);
}

#[test]
fn activate_twice_does_not_double_subscribe() {
    let (mut sync, counter) = make_sync(PanelConfig::default());
    sync.activate();
    sync.activate();

    assert_eq!(live(&counter), 3);
    assert_eq!(sync.platform().accelerometer.subscribes, 1);
    assert_eq!(sync.platform().location.subscribes, 1);
    assert_eq!(sync.platform().radio.broadcast_subscribes, 1);
}

#[test]
fn activate_seeds_snapshot_from_poll() {
    let (mut sync, _) = make_sync_with(PanelConfig::default(), |p| {
        p.radio.wifi = true;
        p.radio.link_speed = Some(144);
        p.radio.bluetooth = true;
        p.radio.gps = false;
    });
    sync.activate();

    let s = sync.snapshot();
    assert!(s.wifi_enabled);
    assert_eq!(s.wifi_link_speed_mbps, 144);
    assert!(s.bluetooth_enabled);
    assert!(!s.gps_provider_enabled);
    assert!(s.last_known_location.is_none());
    assert_eq!(s.last_accelerometer_sample, Acceleration::default());
}

#[test]
fn unknown_link_speed_reads_as_zero() {
    let (mut sync, _) = make_sync_with(PanelConfig::default(), |p| {
        p.radio.wifi = true;
        p.radio.link_speed = None;
    });
    sync.activate();
    assert!(sync.snapshot().wifi_enabled);
    assert_eq!(sync.snapshot().wifi_link_speed_mbps, 0);
}

#[test]
fn subscriptions_use_configured_delivery_parameters() {
    let config = PanelConfig {
        accelerometer_rate: SampleRate::Ui,
        ..PanelConfig::default()
    };
    let (mut sync, _) = make_sync(config);
    sync.activate();

    assert_eq!(sync.platform().accelerometer.last_rate, Some(SampleRate::Ui));
    let request = sync.platform().location.last_request.unwrap();
    assert_eq!(request.min_interval_ms, 5000);
    assert!((request.min_distance_m - 10.0).abs() < f32::EPSILON);
}

#[test]
fn broadcast_subscription_is_optional() {
    let config = PanelConfig {
        bluetooth_state_broadcast: false,
        ..PanelConfig::default()
    };
    let (mut sync, counter) = make_sync(config);
    sync.activate();
    assert_eq!(sync.platform().radio.broadcast_subscribes, 0);
    assert_eq!(live(&counter), 2);
}

// ── Teardown ──────────────────────────────────────────────────

#[test]
fn deactivate_releases_every_subscription() {
    let (mut sync, counter) = make_sync(PanelConfig::default());
    sync.activate();
    sync.deactivate();

    assert!(!sync.is_active());
    assert_eq!(live(&counter), 0);
    assert_eq!(sync.live_subscriptions(), 0);
}

#[test]
fn partial_setup_still_tears_down_fully() {
    let (mut sync, counter) = make_sync_with(PanelConfig::default(), |p| {
        p.accelerometer.present = false;
        p.permissions.granted.clear();
    });
    sync.activate();

    // Only the Bluetooth broadcast could be established.
    assert!(sync.is_active());
    assert_eq!(live(&counter), 1);
    assert_eq!(sync.platform().location.subscribes, 0);

    sync.deactivate();
    assert_eq!(live(&counter), 0);
}

#[test]
fn missing_bluetooth_adapter_keeps_field_at_default() {
    let (mut sync, counter) = make_sync_with(PanelConfig::default(), |p| {
        p.radio.bluetooth_present = false;
        p.radio.bluetooth = true;
    });
    sync.activate();
    assert_eq!(live(&counter), 2);
    assert!(!sync.snapshot().bluetooth_enabled);
}

#[test]
fn push_after_deactivate_does_not_mutate_snapshot() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.activate();
    let sender = sync.platform().accelerometer.sender.clone().unwrap();
    sync.deactivate();
    let before = *sync.snapshot();

    assert!(!sender.push(accel(1.0, 2.0, 3.0)));
    sync.process_push_events();

    assert_eq!(*sync.snapshot(), before);
}

#[test]
fn events_queued_before_deactivate_are_discarded() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.activate();
    let sender = sync.platform().location.sender.clone().unwrap();
    assert!(sender.push(PushEvent::LocationFix(GeoPoint::new(1.0, 2.0))));

    sync.deactivate();
    assert_eq!(sync.process_push_events(), 0);
    assert!(sync.snapshot().last_known_location.is_none());
}

#[test]
fn reactivation_ignores_senders_from_the_previous_session() {
    let (mut sync, counter) = make_sync(PanelConfig::default());
    sync.activate();
    let stale = sync.platform().accelerometer.sender.clone().unwrap();
    sync.deactivate();
    sync.activate();

    assert_eq!(live(&counter), 3);
    assert_eq!(sync.platform().accelerometer.subscribes, 2);

    assert!(!stale.push(accel(9.0, 9.0, 9.0)));
    let fresh = sync.platform().accelerometer.sender.clone().unwrap();
    assert!(fresh.push(accel(1.0, 1.0, 1.0)));
    sync.process_push_events();
    assert_eq!(
        sync.snapshot().last_accelerometer_sample,
        Acceleration::new(1.0, 1.0, 1.0)
    );
}

// ── Push folding ──────────────────────────────────────────────

#[test]
fn accelerometer_is_last_write_wins() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.activate();
    let sender = sync.platform().accelerometer.sender.clone().unwrap();

    sender.push(accel(1.0, 2.0, 3.0));
    sender.push(accel(4.0, 5.0, 6.0));
    assert_eq!(sync.process_push_events(), 2);

    assert_eq!(
        sync.snapshot().last_accelerometer_sample,
        Acceleration::new(4.0, 5.0, 6.0)
    );
}

#[test]
fn push_events_are_applied_only_when_processed() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.activate();
    let sender = sync.platform().accelerometer.sender.clone().unwrap();

    sender.push(accel(1.0, 2.0, 3.0));
    assert_eq!(sync.snapshot().last_accelerometer_sample, Acceleration::default());

    sync.process_push_events();
    assert_eq!(
        sync.snapshot().last_accelerometer_sample,
        Acceleration::new(1.0, 2.0, 3.0)
    );
}

#[test]
fn bluetooth_broadcast_and_location_fix_update_their_fields() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.activate();
    let radio = sync.platform().radio.broadcast.clone().unwrap();
    let location = sync.platform().location.sender.clone().unwrap();

    radio.push(PushEvent::BluetoothPowerChanged(true));
    location.push(PushEvent::LocationFix(GeoPoint::new(48.1, 11.5)));
    sync.process_push_events();

    assert!(sync.snapshot().bluetooth_enabled);
    assert_eq!(
        sync.snapshot().last_known_location,
        Some(GeoPoint::new(48.1, 11.5))
    );
}

#[test]
fn delivery_from_other_threads_is_marshalled() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.activate();
    let sender = sync.platform().accelerometer.sender.clone().unwrap();

    std::thread::spawn(move || {
        for i in 1..=5 {
            sender.push(accel(i as f32, 0.0, 0.0));
        }
    })
    .join()
    .unwrap();

    assert_eq!(sync.process_push_events(), 5);
    assert_eq!(sync.snapshot().last_accelerometer_sample.x, 5.0);
}

// ── Poll-on-resume ────────────────────────────────────────────

#[test]
fn resume_repolls_only_instantaneous_fields() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.activate();
    let accel_sender = sync.platform().accelerometer.sender.clone().unwrap();
    let loc_sender = sync.platform().location.sender.clone().unwrap();
    accel_sender.push(accel(1.0, 2.0, 3.0));
    loc_sender.push(PushEvent::LocationFix(GeoPoint::new(10.0, 20.0)));
    sync.process_push_events();
    let before = *sync.snapshot();

    {
        let radio = &mut sync.platform_mut().radio;
        radio.wifi = true;
        radio.bluetooth = true;
        radio.gps = false;
    }
    sync.on_foreground_resumed();

    let after = *sync.snapshot();
    assert!(after.wifi_enabled);
    assert_eq!(after.wifi_link_speed_mbps, 72);
    assert!(after.bluetooth_enabled);
    assert!(!after.gps_provider_enabled);
    assert_eq!(after.last_accelerometer_sample, before.last_accelerometer_sample);
    assert_eq!(after.last_known_location, before.last_known_location);
}

#[test]
fn resume_while_inactive_does_nothing() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.platform_mut().radio.wifi = true;
    sync.on_foreground_resumed();
    assert_eq!(*sync.snapshot(), DeviceSnapshot::default());
}

// ── Publish-on-change ─────────────────────────────────────────

#[test]
fn sinks_are_notified_only_on_change() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    let sink = RecordingSink::default();
    sync.add_sink(Box::new(sink.clone()));
    assert_eq!(sink.count(), 1, "registration publishes the current value");

    sync.activate();
    // gps is on in the mock, so the seed differs from the default.
    assert_eq!(sink.count(), 2);

    sync.on_foreground_resumed();
    assert_eq!(sink.count(), 2, "identical poll must not republish");

    let sender = sync.platform().accelerometer.sender.clone().unwrap();
    sender.push(accel(1.0, 2.0, 3.0));
    sender.push(accel(1.0, 2.0, 3.0));
    sync.process_push_events();
    assert_eq!(sink.count(), 3);
    assert_eq!(
        sink.last().unwrap().last_accelerometer_sample,
        Acceleration::new(1.0, 2.0, 3.0)
    );
}

#[test]
fn sinks_follow_teardown_and_reactivation() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    let sink = RecordingSink::default();
    sync.add_sink(Box::new(sink.clone()));

    sync.activate();
    assert!(sink.last().unwrap().gps_provider_enabled);

    sync.platform_mut().radio.gps = false;
    sync.deactivate();
    assert_eq!(sink.last(), Some(DeviceSnapshot::default()));

    // The fresh poll equals the default, so nothing new is published, and
    // the sink must already agree with the synchronizer.
    let published = sink.count();
    sync.activate();
    assert_eq!(sink.count(), published);
    assert_eq!(sink.last(), Some(*sync.snapshot()));
}

// ── Overflow ──────────────────────────────────────────────────

#[test]
fn overflowing_the_queue_drops_and_counts_excess_events() {
    let (mut sync, _) = make_sync(PanelConfig::default());
    sync.activate();
    let sender = sync.platform().accelerometer.sender.clone().unwrap();

    let accepted = (0..40)
        .filter(|i| sender.push(accel(*i as f32, 0.0, 0.0)))
        .count();
    assert_eq!(accepted, PUSH_QUEUE_DEPTH);

    assert_eq!(sync.process_push_events(), PUSH_QUEUE_DEPTH);
    assert_eq!(
        sync.snapshot().last_accelerometer_sample.x,
        (PUSH_QUEUE_DEPTH - 1) as f32
    );
    assert_eq!(sync.dropped_push_events(), 8);

    // The queue's counter was taken, so later drains do not recount.
    assert!(sender.push(accel(100.0, 0.0, 0.0)));
    assert_eq!(sync.process_push_events(), 1);
    assert_eq!(sync.dropped_push_events(), 8);
}
