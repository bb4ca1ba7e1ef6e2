use crate::device::Device;
use crate::settings::SettingsHandle;
use crate::shutdown::Shutdown;
use anyhow::Result;
use log::{error, info, warn};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use wellspring_usb::device::base::{InputReport, TrackpadDevice};
use wellspring_usb::device::{find_devices, from_device, LibUsbTrackpad};

// Devices which fail to come up are left alone for this long before we try again.
const IGNORE_DURATION: Duration = Duration::from_secs(10);

pub async fn spawn_usb_handler(shutdown: Shutdown, settings: SettingsHandle) {
    let (disconnect_sender, mut disconnect_receiver) = mpsc::channel(32);
    let (report_sender, mut report_receiver) = mpsc::channel(256);

    // Create the device detection Sleep Timer..
    let detection_duration = settings.detection_interval().await;
    let detection_sleep = sleep(Duration::from_millis(0));
    tokio::pin!(detection_sleep);

    // Create the Primary Device List, and 'Ignore' list..
    let mut devices: HashMap<String, Device<LibUsbTrackpad>> = HashMap::new();
    let mut ignore_list: HashMap<(u8, u8), Instant> = HashMap::new();

    loop {
        tokio::select! {
            () = &mut detection_sleep => {
                if let Some(device) = find_new_device(&devices, &ignore_list) {
                    let bus_number = device.bus_number();
                    let address = device.address();

                    match load_device(device, report_sender.clone(), disconnect_sender.clone(), &settings).await {
                        Ok(device) => {
                            devices.insert(device.identifier().to_owned(), device);
                        }
                        Err(e) => {
                            error!(
                                "Couldn't load potential trackpad on bus {} address {}: {}",
                                bus_number, address, e
                            );
                            ignore_list.insert((bus_number, address), Instant::now() + IGNORE_DURATION);
                        }
                    };
                }
                ignore_list.retain(|_, expires| *expires > Instant::now());
                detection_sleep.as_mut().reset(tokio::time::Instant::now() + detection_duration);
            },
            Some(identifier) = disconnect_receiver.recv() => {
                if let Some(device) = devices.remove(&identifier) {
                    info!("[{}] Device Disconnected", identifier);
                    device.removed();
                }
            },
            Some(report) = report_receiver.recv() => {
                if let Some(device) = devices.get_mut(&report.identifier) {
                    device.handle_report(report);
                } else {
                    warn!("Report from unregistered device {}", report.identifier);
                }
            },
            () = shutdown.wait() => {
                info!("Shutting down device worker");
                for (_, device) in devices.drain() {
                    drop(device.shutdown());
                }
                return;
            },
        };
    }
}

fn find_new_device(
    devices: &HashMap<String, Device<LibUsbTrackpad>>,
    devices_to_ignore: &HashMap<(u8, u8), Instant>,
) -> Option<TrackpadDevice> {
    let now = Instant::now();

    find_devices().into_iter().find(|device| {
        !devices.values().any(|d| {
            d.bus_number() == device.bus_number() && d.address() == device.address()
        }) && !devices_to_ignore
            .iter()
            .any(|((bus_number, address), expires)| {
                *bus_number == device.bus_number() && *address == device.address() && *expires > now
            })
    })
}

async fn load_device(
    device: TrackpadDevice,
    report_sender: Sender<InputReport>,
    disconnect_sender: Sender<String>,
    settings: &SettingsHandle,
) -> Result<Device<LibUsbTrackpad>> {
    let timeout = settings.control_timeout().await;
    let config = settings.bring_up_config().await;

    let target = from_device(device.clone(), timeout, report_sender, disconnect_sender)?;
    Device::bring_up(target, &device, &config)
}
