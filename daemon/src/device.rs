use log::{debug, info, warn};
use wellspring_types::DevicePowerState;
use wellspring_usb::device::base::{FullTrackpadTarget, InputReport, TrackpadDevice};
use wellspring_usb::{BringUpConfig, Trackpad};

/// A trackpad owned by the worker. Everything that touches the hardware after bring-up
/// goes through here, so lifecycle calls for one device never overlap.
pub struct Device<T: FullTrackpadTarget> {
    trackpad: Trackpad<T>,
    identifier: String,
    bus_number: u8,
    address: u8,

    report_count: u64,
    last_report_len: usize,
}

impl<T: FullTrackpadTarget> Device<T> {
    pub fn new(trackpad: Trackpad<T>, device: &TrackpadDevice) -> Self {
        Self {
            trackpad,
            identifier: device.identifier(),
            bus_number: device.bus_number(),
            address: device.address(),
            report_count: 0,
            last_report_len: 0,
        }
    }

    /// Prepares the target and starts it streaming. A device that won't stream is handed
    /// back to the kernel the way we found it.
    pub fn bring_up(
        target: T,
        device: &TrackpadDevice,
        config: &BringUpConfig,
    ) -> anyhow::Result<Self> {
        let trackpad = Trackpad::prepare_hardware(target, config)?;

        let mut handled_device = Self::new(trackpad, device);
        if let Err(e) = handled_device.power_up() {
            warn!("[{}] Failed to start streaming, releasing", handled_device.identifier);
            drop(handled_device.trackpad.release_hardware());
            return Err(e);
        }
        Ok(handled_device)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn bus_number(&self) -> u8 {
        self.bus_number
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn report_count(&self) -> u64 {
        self.report_count
    }

    pub fn is_streaming(&self) -> bool {
        self.trackpad.is_streaming()
    }

    /// Newly attached devices come up from the unpowered state.
    pub fn power_up(&mut self) -> anyhow::Result<()> {
        self.trackpad.d0_entry(DevicePowerState::D3)?;
        info!(
            "[{}] {} is streaming reports",
            self.identifier,
            self.trackpad.profile().name
        );
        Ok(())
    }

    pub fn handle_report(&mut self, report: InputReport) {
        self.report_count += 1;
        if report.data.len() != self.last_report_len {
            debug!(
                "[{}] Report length changed from {} to {}",
                self.identifier,
                self.last_report_len,
                report.data.len()
            );
            self.last_report_len = report.data.len();
        }
    }

    /// The device has gone away underneath us, there's nothing left to restore.
    pub fn removed(mut self) {
        self.trackpad.d0_exit(DevicePowerState::D3Final);
        info!(
            "[{}] Removed after {} reports",
            self.identifier, self.report_count
        );
    }

    /// Orderly shutdown, the device is still attached so it gets put back the way we
    /// found it.
    pub fn shutdown(mut self) -> T {
        self.trackpad.d0_exit(DevicePowerState::D3Final);
        info!(
            "[{}] Shutting down after {} reports",
            self.identifier, self.report_count
        );
        self.trackpad.release_hardware()
    }
}
