// Everything the trackpad lifecycle needs from the platform is described here as a set of
// small traits. The libusb backend implements them against real hardware, the tests
// implement them against a scripted device. Nothing above this layer should need to know
// how a transfer actually reaches the wire.
use crate::error::PolicyError;
use crate::mode::ControlRequest;
use enumset::EnumSet;
use rusb::TransferType;
use std::time::Duration;
use wellspring_types::UsbDeviceTrait;

// This is a basic SuperTrait which defines all the 'Parts' of a trackpad target.
pub trait FullTrackpadTarget: UsbTarget + PipeTarget + PowerPolicy + Send {}

pub trait UsbTarget {
    fn descriptor(&self) -> Result<UsbData, rusb::Error>;

    /// Selects `interface` as the only configured interface of the active configuration
    /// and returns its configured pipes in index order. `Ok(None)` means the interface
    /// doesn't exist.
    fn configure_single_interface(
        &mut self,
        interface: u8,
    ) -> Result<Option<Vec<PipeInfo>>, rusb::Error>;

    /// Allows reads on `pipe` to return less than the endpoint's max packet size.
    fn disable_max_packet_check(&mut self, pipe: &PipeInfo);

    /// Performs a synchronous control transfer, returning the number of bytes moved.
    fn control_transfer(
        &mut self,
        request: &ControlRequest,
        buffer: &mut [u8],
    ) -> Result<usize, rusb::Error>;

    fn device_traits(&self) -> Result<DeviceTraits, rusb::Error>;
}

pub trait PipeTarget {
    fn start_pipe(&mut self, pipe: &PipeInfo) -> Result<(), rusb::Error>;
    fn stop_pipe(&mut self, pipe: &PipeInfo, action: StopAction) -> Result<(), rusb::Error>;
}

pub trait PowerPolicy {
    fn set_idle_policy(&mut self, timeout: Duration) -> Result<(), PolicyError>;
    fn set_wake_policy(&mut self) -> Result<(), PolicyError>;
}

/// How a pipe stop treats requests already sent to the device. Every stop in the
/// lifecycle cancels them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopAction {
    CancelSentIo,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PipeInfo {
    pub address: u8,
    pub transfer_type: TransferType,
    pub max_packet_size: u16,
    pub interval: u8,
}

impl PipeInfo {
    pub fn is_interrupt(&self) -> bool {
        self.transfer_type == TransferType::Interrupt
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceTraits(EnumSet<UsbDeviceTrait>);

impl DeviceTraits {
    pub fn new(traits: EnumSet<UsbDeviceTrait>) -> Self {
        Self(traits)
    }

    pub fn is_high_speed(&self) -> bool {
        self.0.contains(UsbDeviceTrait::AtHighSpeed)
    }

    pub fn is_self_powered(&self) -> bool {
        self.0.contains(UsbDeviceTrait::SelfPowered)
    }

    pub fn is_remote_wake_capable(&self) -> bool {
        self.0.contains(UsbDeviceTrait::RemoteWakeCapable)
    }

    pub fn as_set(&self) -> EnumSet<UsbDeviceTrait> {
        self.0
    }
}

/// A single interrupt report, handed to whoever consumes the stream.
#[derive(Debug, Clone)]
pub struct InputReport {
    pub identifier: String,
    pub data: Vec<u8>,
}

// We primarily need the bus number, and address for comparison..
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackpadDevice {
    pub(crate) bus_number: u8,
    pub(crate) address: u8,
    pub(crate) product_id: u16,
}

impl TrackpadDevice {
    pub fn new(bus_number: u8, address: u8, product_id: u16) -> Self {
        Self {
            bus_number,
            address,
            product_id,
        }
    }

    pub fn bus_number(&self) -> u8 {
        self.bus_number
    }
    pub fn address(&self) -> u8 {
        self.address
    }
    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    pub fn identifier(&self) -> String {
        format!("{:03}:{:03}", self.bus_number, self.address)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UsbData {
    pub(crate) vendor_id: u16,
    pub(crate) product_id: u16,
    pub(crate) device_version: (u8, u8, u8),
    pub(crate) device_manufacturer: String,
    pub(crate) product_name: String,
}

impl UsbData {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            ..Default::default()
        }
    }

    pub fn with_strings(mut self, manufacturer: &str, product: &str) -> Self {
        self.device_manufacturer = manufacturer.to_owned();
        self.product_name = product.to_owned();
        self
    }

    pub fn with_version(mut self, version: (u8, u8, u8)) -> Self {
        self.device_version = version;
        self
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }
    pub fn product_id(&self) -> u16 {
        self.product_id
    }
    pub fn device_version(&self) -> (u8, u8, u8) {
        self.device_version
    }
    pub fn device_manufacturer(&self) -> String {
        self.device_manufacturer.clone()
    }
    pub fn product_name(&self) -> String {
        self.product_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_traits_advertise_nothing() {
        let traits = DeviceTraits::default();
        assert!(!traits.is_high_speed());
        assert!(!traits.is_self_powered());
        assert!(!traits.is_remote_wake_capable());
    }

    #[test]
    fn traits_report_membership() {
        let traits = DeviceTraits::new(UsbDeviceTrait::RemoteWakeCapable | UsbDeviceTrait::AtHighSpeed);
        assert!(traits.is_high_speed());
        assert!(traits.is_remote_wake_capable());
        assert!(!traits.is_self_powered());
    }

    #[test]
    fn identifier_is_bus_and_address() {
        let device = TrackpadDevice::new(1, 14, 0x0265);
        assert_eq!(device.identifier(), "001:014");
    }
}
