//! RadioPanel host simulator entry point.
//!
//! Drives the device-state synchronizer against the simulated platform the
//! way a screen lifecycle would: activate, fold push deliveries every frame,
//! react to user commands and foreground resumes, then tear down.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                     │
//! │                                                            │
//! │  SimRadio  SimAccelerometer  SimLocation  SimSettings      │
//! │  SimPermissions              LogSnapshotSink               │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ──────────────────   │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │        DeviceStateSynchronizer (pure logic)      │      │
//! │  │        poll · push · command                     │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use radiopanel::adapters::log_sink::LogSnapshotSink;
use radiopanel::adapters::sim::{SimPlatform, SimRadioState};
use radiopanel::app::commands::PanelCommand;
use radiopanel::app::service::DeviceStateSynchronizer;
use radiopanel::app::view::panel_cards;
use radiopanel::config::{DEFAULT_API_LEVEL, PanelConfig};

/// Frame period of the simulated owner thread.
const FRAME: Duration = Duration::from_millis(100);

/// One scripted user or environment action.
#[derive(Debug, Clone, Copy)]
enum Step {
    Command(PanelCommand),
    /// Wi-Fi switched off from the quick settings shade (no broadcast).
    ExternalWifiOff,
    Resume,
}

/// Scripted session: (seconds into the run, step).
const SCRIPT: [(u64, Step); 5] = [
    (2, Step::Command(PanelCommand::SetWifiEnabled(true))),
    (4, Step::Command(PanelCommand::SetBluetoothEnabled(true))),
    (6, Step::ExternalWifiOff),
    (7, Step::Resume),
    (9, Step::Command(PanelCommand::SetBluetoothEnabled(false))),
];

#[derive(Parser, Debug)]
#[command(name = "radiopanel-sim", about = "Run the control panel against a simulated device")]
struct Args {
    /// Platform API level used to derive the command gates
    #[arg(long, default_value_t = DEFAULT_API_LEVEL)]
    api_level: u32,

    /// JSON file with configuration overrides (takes precedence over --api-level)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to run the scripted session, in seconds
    #[arg(long, default_value_t = 12)]
    seconds: u64,
}

fn load_config(args: &Args) -> Result<PanelConfig> {
    match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            PanelConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(PanelConfig::for_api_level(args.api_level)),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let platform = SimPlatform::builder()
        .radio(SimRadioState {
            wifi_toggle_allowed: config.wifi_direct_toggle,
            ..SimRadioState::default()
        })
        .granted(&[])
        .build();
    let radio = platform.radio.clone();

    let mut panel = DeviceStateSynchronizer::new(platform, config);
    info!("RadioPanel simulator starting: {:?}", panel.config());
    panel.add_sink(Box::new(LogSnapshotSink::new()));

    panel.activate();
    if panel.request_missing_permissions() {
        info!("Permission prompt shown");
    }

    let mut next_step = 0;

    let start = Instant::now();
    let end = Duration::from_secs(args.seconds);
    while start.elapsed() < end {
        panel.process_push_events();

        let now = start.elapsed().as_secs();
        while let Some(&(at, step)) = SCRIPT.get(next_step) {
            if at > now {
                break;
            }
            info!("USER | {:?}", step);
            match step {
                Step::Command(cmd) => panel.handle_command(cmd),
                Step::ExternalWifiOff => radio.set_wifi_power(false),
                Step::Resume => panel.on_foreground_resumed(),
            }
            next_step += 1;
        }

        thread::sleep(FRAME);
    }

    for card in panel_cards(panel.snapshot()) {
        let action = card.action.map_or("", |a| a.label);
        info!("CARD | {:<13} | {:<40} | {}", card.title, card.value, action);
    }

    panel.deactivate();
    info!("RadioPanel simulator finished");
    Ok(())
}
