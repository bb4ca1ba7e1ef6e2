// This file primarily wraps the platform backend behind the traits in base, so the lifecycle
// code doesn't need to care how it's actually talking to the trackpad.
use crate::device::base::{InputReport, TrackpadDevice};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc::Sender;

pub mod base;

// libusb is available everywhere we run, so there's only the one backend for now.
mod libusb;
pub use crate::device::libusb::device::LibUsbTrackpad;

pub fn find_devices() -> Vec<TrackpadDevice> {
    libusb::device::find_devices()
}

pub fn from_device(
    device: TrackpadDevice,
    timeout: Duration,
    report_sender: Sender<InputReport>,
    disconnect_sender: Sender<String>,
) -> Result<LibUsbTrackpad> {
    LibUsbTrackpad::from_device(device, timeout, report_sender, disconnect_sender)
}
