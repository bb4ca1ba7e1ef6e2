use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use tokio::signal;

use crate::cli::{Cli, LevelFilter};
use crate::primary_worker::spawn_usb_handler;
use crate::settings::SettingsHandle;
use crate::shutdown::Shutdown;

mod cli;
mod device;
mod primary_worker;
mod settings;
mod shutdown;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

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

    if is_root() {
        warn!("Wellspring Daemon is running as root, consider a udev rule instead.");
    }

    info!("Starting Wellspring Daemon v{}", VERSION);
    let settings = SettingsHandle::load(args.config).await?;
    if args.no_wellspring_mode {
        info!("Wellspring mode disabled from the command line");
        settings.disable_wellspring_mode().await;
    }

    let shutdown = Shutdown::new();

    let usb_handle = tokio::spawn(spawn_usb_handler(shutdown.clone(), settings));

    // Setup Ctrl+C Monitoring..
    tokio::spawn(await_ctrl_c(shutdown.clone()));

    shutdown.wait().await;
    info!("Shutting down daemon");

    let _ = usb_handle.await;
    Ok(())
}

async fn await_ctrl_c(shutdown: Shutdown) {
    if signal::ctrl_c().await.is_ok() {
        shutdown.trigger();
    }
}

#[cfg(target_family = "unix")]
fn is_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(target_family = "unix"))]
fn is_root() -> bool {
    // On non-unix systems, we can't root check, assume we're good!
    false
}
