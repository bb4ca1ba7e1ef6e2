use crate::catalog::is_supported;
use crate::device::base::{
    DeviceTraits, FullTrackpadTarget, InputReport, PipeInfo, PipeTarget, PowerPolicy,
    StopAction, TrackpadDevice, UsbData, UsbTarget,
};
use crate::error::PolicyError;
use crate::mode::ControlRequest;
use crate::pipe::TRACKPAD_INTERFACE;
use anyhow::{bail, Result};
use enumset::EnumSet;
use log::{debug, info, warn};
use rusb::{Device, DeviceDescriptor, DeviceHandle, Direction, GlobalContext, Language, Speed};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use wellspring_types::UsbDeviceTrait;

// How long a single interrupt read may block before the reader checks whether it's been
// asked to stop.
const REPORT_POLL: Duration = Duration::from_millis(100);

pub struct LibUsbTrackpad {
    handle: Arc<DeviceHandle<GlobalContext>>,
    device: Device<GlobalContext>,
    descriptor: DeviceDescriptor,
    language: Option<Language>,

    identifier: String,
    timeout: Duration,

    report_sender: Sender<InputReport>,
    disconnect_sender: Sender<String>,

    relaxed_pipes: HashSet<u8>,
    reader: Option<PipeReader>,
}

struct PipeReader {
    address: u8,
    stopping: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl LibUsbTrackpad {
    fn find_device(device: &TrackpadDevice) -> Result<(Device<GlobalContext>, DeviceDescriptor)> {
        if let Ok(devices) = rusb::devices() {
            for usb_device in devices.iter() {
                if usb_device.bus_number() == device.bus_number
                    && usb_device.address() == device.address
                {
                    if let Ok(descriptor) = usb_device.device_descriptor() {
                        return Ok((usb_device, descriptor));
                    }
                }
            }
        }
        bail!("Specified Device not Found!")
    }

    pub fn from_device(
        device: TrackpadDevice,
        timeout: Duration,
        report_sender: Sender<InputReport>,
        disconnect_sender: Sender<String>,
    ) -> Result<Self> {
        let identifier = device.identifier();
        let (usb_device, descriptor) = Self::find_device(&device)?;
        let handle = usb_device.open()?;

        info!("Connected to possible trackpad at {:?}", usb_device);

        // String descriptors are only used for display, a device without them is fine.
        let language = handle
            .read_languages(timeout)
            .ok()
            .and_then(|languages| languages.first().copied());

        // The kernel's usbhid will already be bound to the trackpad.
        handle.set_auto_detach_kernel_driver(true)?;
        handle.claim_interface(TRACKPAD_INTERFACE)?;

        Ok(Self {
            handle: Arc::new(handle),
            device: usb_device,
            descriptor,
            language,
            identifier,
            timeout,
            report_sender,
            disconnect_sender,
            relaxed_pipes: HashSet::new(),
            reader: None,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    fn read_string(&self, index: Option<u8>) -> String {
        let (Some(language), Some(index)) = (self.language, index) else {
            return String::new();
        };
        self.handle
            .read_string_descriptor(language, index, self.timeout)
            .unwrap_or_default()
    }

    fn stop_reader(reader: PipeReader) -> Result<(), rusb::Error> {
        reader.stopping.store(true, Ordering::Relaxed);
        if reader.thread.join().is_err() {
            warn!("Report reader for 0x{:02x} panicked", reader.address);
            return Err(rusb::Error::Other);
        }
        debug!("Report reader for 0x{:02x} stopped", reader.address);
        Ok(())
    }
}

impl UsbTarget for LibUsbTrackpad {
    fn descriptor(&self) -> Result<UsbData, rusb::Error> {
        let version = self.descriptor.device_version();

        Ok(UsbData {
            vendor_id: self.descriptor.vendor_id(),
            product_id: self.descriptor.product_id(),
            device_version: (version.0, version.1, version.2),
            device_manufacturer: self.read_string(self.descriptor.manufacturer_string_index()),
            product_name: self.read_string(self.descriptor.product_string_index()),
        })
    }

    fn configure_single_interface(
        &mut self,
        interface: u8,
    ) -> Result<Option<Vec<PipeInfo>>, rusb::Error> {
        let config = self.device.active_config_descriptor()?;
        debug!(
            "Active configuration {} has {} interfaces",
            config.number(),
            config.num_interfaces()
        );

        let Some(usb_interface) = config.interfaces().find(|i| i.number() == interface) else {
            return Ok(None);
        };
        let Some(setting) = usb_interface.descriptors().next() else {
            return Ok(None);
        };

        let pipes = setting
            .endpoint_descriptors()
            .map(|endpoint| PipeInfo {
                address: endpoint.address(),
                transfer_type: endpoint.transfer_type(),
                max_packet_size: endpoint.max_packet_size(),
                interval: endpoint.interval(),
            })
            .collect();
        Ok(Some(pipes))
    }

    fn disable_max_packet_check(&mut self, pipe: &PipeInfo) {
        self.relaxed_pipes.insert(pipe.address);
    }

    fn control_transfer(
        &mut self,
        request: &ControlRequest,
        buffer: &mut [u8],
    ) -> Result<usize, rusb::Error> {
        match request.direction {
            Direction::In => self.handle.read_control(
                request.request_type(),
                request.request,
                request.value,
                request.index,
                buffer,
                self.timeout,
            ),
            Direction::Out => self.handle.write_control(
                request.request_type(),
                request.request,
                request.value,
                request.index,
                buffer,
                self.timeout,
            ),
        }
    }

    fn device_traits(&self) -> Result<DeviceTraits, rusb::Error> {
        let mut traits = EnumSet::empty();
        if matches!(
            self.device.speed(),
            Speed::High | Speed::Super | Speed::SuperPlus
        ) {
            traits.insert(UsbDeviceTrait::AtHighSpeed);
        }

        let config = self.device.active_config_descriptor()?;
        if config.self_powered() {
            traits.insert(UsbDeviceTrait::SelfPowered);
        }
        if config.remote_wakeup() {
            traits.insert(UsbDeviceTrait::RemoteWakeCapable);
        }
        Ok(DeviceTraits::new(traits))
    }
}

impl PipeTarget for LibUsbTrackpad {
    fn start_pipe(&mut self, pipe: &PipeInfo) -> Result<(), rusb::Error> {
        if let Some(reader) = &self.reader {
            if reader.address == pipe.address {
                debug!("Report reader for 0x{:02x} already running", pipe.address);
                return Ok(());
            }
        }

        let handle = self.handle.clone();
        let stopping = Arc::new(AtomicBool::new(false));
        let reader = ReportReader {
            address: pipe.address,
            packet_size: usize::from(pipe.max_packet_size),
            relaxed: self.relaxed_pipes.contains(&pipe.address),
            identifier: self.identifier.clone(),
            report_sender: self.report_sender.clone(),
            disconnect_sender: self.disconnect_sender.clone(),
            stopping: stopping.clone(),
        };

        let thread = thread::Builder::new()
            .name(format!("trackpad-{}", self.identifier))
            .spawn(move || reader.run(&handle))
            .map_err(|e| {
                warn!("Unable to spawn report reader: {}", e);
                rusb::Error::NoMem
            })?;

        self.reader = Some(PipeReader {
            address: pipe.address,
            stopping,
            thread,
        });
        debug!("Report reader for 0x{:02x} started", pipe.address);
        Ok(())
    }

    fn stop_pipe(&mut self, pipe: &PipeInfo, action: StopAction) -> Result<(), rusb::Error> {
        debug!("Stopping report reader for 0x{:02x} ({:?})", pipe.address, action);
        match self.reader.take() {
            Some(reader) if reader.address == pipe.address => Self::stop_reader(reader),
            other => {
                self.reader = other;
                Ok(())
            }
        }
    }
}

impl PowerPolicy for LibUsbTrackpad {
    fn set_idle_policy(&mut self, timeout: Duration) -> Result<(), PolicyError> {
        let delay = timeout.as_millis().to_string();
        write_power_attribute(&self.device, "autosuspend_delay_ms", &delay)
            .map_err(PolicyError::IdleRejected)?;
        write_power_attribute(&self.device, "control", "auto").map_err(PolicyError::IdleRejected)?;
        debug!("[{}] Selective suspend after {:?}", self.identifier, timeout);
        Ok(())
    }

    fn set_wake_policy(&mut self) -> Result<(), PolicyError> {
        write_power_attribute(&self.device, "wakeup", "enabled").map_err(PolicyError::WakeRejected)?;
        debug!("[{}] Remote wakeup enabled", self.identifier);
        Ok(())
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        // Under Linux, runtime power management for usb devices is handled through sysfs.
        fn write_power_attribute(
            device: &Device<GlobalContext>,
            attribute: &str,
            value: &str,
        ) -> std::io::Result<()> {
            let ports = device.port_numbers().map_err(std::io::Error::other)?;
            let ports: Vec<String> = ports.iter().map(|port| port.to_string()).collect();
            let path = format!(
                "/sys/bus/usb/devices/{}-{}/power/{}",
                device.bus_number(),
                ports.join("."),
                attribute
            );
            debug!("Writing '{}' to {}", value, path);
            std::fs::write(path, value)
        }
    } else {
        fn write_power_attribute(
            _device: &Device<GlobalContext>,
            attribute: &str,
            value: &str,
        ) -> std::io::Result<()> {
            info!("Power attribute {} ({}) isn't managed on this platform", attribute, value);
            Ok(())
        }
    }
}

impl FullTrackpadTarget for LibUsbTrackpad {}

impl Drop for LibUsbTrackpad {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            let _ = Self::stop_reader(reader);
        }
        let _ = self.handle.release_interface(TRACKPAD_INTERFACE);
    }
}

struct ReportReader {
    address: u8,
    packet_size: usize,
    relaxed: bool,
    identifier: String,
    report_sender: Sender<InputReport>,
    disconnect_sender: Sender<String>,
    stopping: Arc<AtomicBool>,
}

impl ReportReader {
    fn run(self, handle: &DeviceHandle<GlobalContext>) {
        let mut buffer = vec![0; self.packet_size];

        while !self.stopping.load(Ordering::Relaxed) {
            let read = match handle.read_interrupt(self.address, &mut buffer, REPORT_POLL) {
                Ok(read) => read,
                Err(rusb::Error::Timeout) | Err(rusb::Error::Interrupted) => continue,
                Err(e) => {
                    warn!("[{}] Interrupt read failed: {}", self.identifier, e);
                    let _ = self.disconnect_sender.try_send(self.identifier.clone());
                    break;
                }
            };

            if read < self.packet_size && !self.relaxed {
                warn!(
                    "[{}] Dropping short report, {} of {} bytes",
                    self.identifier, read, self.packet_size
                );
                continue;
            }

            let report = InputReport {
                identifier: self.identifier.clone(),
                data: buffer.iter().take(read).copied().collect(),
            };
            match self.report_sender.try_send(report) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => debug!("[{}] Report queue full", self.identifier),
                Err(TrySendError::Closed(_)) => {
                    debug!("[{}] Report queue closed", self.identifier);
                    break;
                }
            }
        }
    }
}

pub fn find_devices() -> Vec<TrackpadDevice> {
    let mut found_devices: Vec<TrackpadDevice> = Vec::new();

    if let Ok(devices) = rusb::devices() {
        for device in devices.iter() {
            if let Ok(descriptor) = device.device_descriptor() {
                if is_supported(descriptor.vendor_id(), descriptor.product_id()) {
                    found_devices.push(TrackpadDevice {
                        bus_number: device.bus_number(),
                        address: device.address(),
                        product_id: descriptor.product_id(),
                    });
                }
            }
        }
    }

    found_devices
}
