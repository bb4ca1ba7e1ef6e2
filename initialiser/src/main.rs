use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::time::Duration;
use tokio::sync::mpsc;
use wellspring_types::ReportingMode;
use wellspring_usb::device::base::TrackpadDevice;
use wellspring_usb::device::{find_devices, from_device};
use wellspring_usb::{BringUpConfig, Trackpad};

const CONTROL_TIMEOUT: Duration = Duration::from_secs(1);

/// Finds any supported trackpads and switches their reporting mode
#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Cli {
    /// Reporting mode to leave the trackpads in (wellspring or hid)
    #[clap(long, default_value = "wellspring")]
    mode: ReportingMode,

    /// Minimum log level to print out
    #[clap(long, value_enum, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(ValueEnum, Copy, Clone, Eq, PartialEq, Debug)]
enum LevelFilter {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    CombinedLogger::init(vec![TermLogger::new(
        match args.log_level {
            LevelFilter::Off => log::LevelFilter::Off,
            LevelFilter::Error => log::LevelFilter::Error,
            LevelFilter::Warn => log::LevelFilter::Warn,
            LevelFilter::Info => log::LevelFilter::Info,
            LevelFilter::Debug => log::LevelFilter::Debug,
            LevelFilter::Trace => log::LevelFilter::Trace,
        },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("Could not configure the logger")?;

    info!("Checking for available trackpads..");
    let devices = find_devices();
    if devices.is_empty() {
        info!("No supported trackpads found");
        return Ok(());
    }

    let mut failures = 0;
    for device in devices {
        let identifier = device.identifier();
        match switch_device(device, args.mode) {
            Ok(()) => info!("[{}] Now in {} mode", identifier, args.mode),
            Err(e) => {
                error!("[{}] Unable to switch mode: {:#}", identifier, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} trackpad(s) could not be switched", failures);
    }
    Ok(())
}

fn switch_device(device: TrackpadDevice, mode: ReportingMode) -> Result<()> {
    // Nothing reads from these, the pipe is never started.
    let (report_sender, _report_receiver) = mpsc::channel(1);
    let (disconnect_sender, _disconnect_receiver) = mpsc::channel(1);

    let target = from_device(device, CONTROL_TIMEOUT, report_sender, disconnect_sender)?;

    // Nothing is restored on release, so the new mode sticks once the interface goes
    // back to the kernel.
    let mut trackpad = Trackpad::prepare_hardware(target, &BringUpConfig::handshake_only())?;
    info!("Found {}", trackpad.profile().name);

    let result = trackpad.set_wellspring_mode(mode.is_wellspring());
    drop(trackpad.release_hardware());
    result.context("Mode handshake failed")
}
