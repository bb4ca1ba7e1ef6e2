#![allow(dead_code)]

use rusb::TransferType;
use std::time::Duration;
use wellspring_types::UsbDeviceTrait;
use wellspring_usb::device::base::{
    DeviceTraits, FullTrackpadTarget, PipeInfo, PipeTarget, PowerPolicy, StopAction, UsbData,
    UsbTarget,
};
use wellspring_usb::mode::ControlRequest;
use wellspring_usb::{PolicyError, APPLE_VENDOR_ID};

pub const MAGIC_TRACKPAD_2: u16 = 0x0265;
pub const MACBOOK_PRO_10_2: u16 = 0x0259;

/// A scripted device which remembers every call made against it.
#[derive(Debug, Default)]
pub struct MockTarget {
    pub descriptor: UsbData,
    pub pipes: Option<Vec<PipeInfo>>,
    pub traits: Option<DeviceTraits>,

    /// The feature block the device hands back on a mode read.
    pub feature: Vec<u8>,
    pub read_count: Option<usize>,
    pub write_count: Option<usize>,
    pub fail_read: bool,
    pub fail_write: bool,

    pub fail_start: bool,
    pub fail_stop: bool,
    pub fail_idle: bool,
    pub fail_wake: bool,

    pub relaxed: Vec<u8>,
    pub reads: Vec<ControlRequest>,
    pub writes: Vec<(ControlRequest, Vec<u8>)>,
    pub starts: Vec<u8>,
    pub stops: Vec<(u8, StopAction)>,
    pub idle_policies: Vec<Duration>,
    pub wake_policies: usize,
}

pub fn pipe(address: u8, transfer_type: TransferType) -> PipeInfo {
    PipeInfo {
        address,
        transfer_type,
        max_packet_size: 64,
        interval: 1,
    }
}

impl MockTarget {
    pub fn new(product_id: u16, feature: &[u8]) -> Self {
        Self {
            descriptor: UsbData::new(APPLE_VENDOR_ID, product_id)
                .with_strings("Apple Inc.", "Magic Trackpad 2"),
            pipes: Some(vec![
                pipe(0x02, TransferType::Bulk),
                pipe(0x81, TransferType::Interrupt),
            ]),
            traits: Some(DeviceTraits::default()),
            feature: feature.to_vec(),
            ..Default::default()
        }
    }

    pub fn magic_trackpad() -> Self {
        Self::new(MAGIC_TRACKPAD_2, &[0xd1, 0x00])
    }

    pub fn macbook() -> Self {
        Self::new(
            MACBOOK_PRO_10_2,
            &[0x08, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77],
        )
    }

    pub fn with_remote_wake(mut self) -> Self {
        self.traits = Some(DeviceTraits::new(
            UsbDeviceTrait::RemoteWakeCapable | UsbDeviceTrait::SelfPowered,
        ));
        self
    }

    pub fn with_pipes(mut self, pipes: Vec<PipeInfo>) -> Self {
        self.pipes = Some(pipes);
        self
    }
}

impl UsbTarget for MockTarget {
    fn descriptor(&self) -> Result<UsbData, rusb::Error> {
        Ok(self.descriptor.clone())
    }

    fn configure_single_interface(
        &mut self,
        _interface: u8,
    ) -> Result<Option<Vec<PipeInfo>>, rusb::Error> {
        Ok(self.pipes.clone())
    }

    fn disable_max_packet_check(&mut self, pipe: &PipeInfo) {
        self.relaxed.push(pipe.address);
    }

    fn control_transfer(
        &mut self,
        request: &ControlRequest,
        buffer: &mut [u8],
    ) -> Result<usize, rusb::Error> {
        match request.direction {
            rusb::Direction::In => {
                self.reads.push(*request);
                if self.fail_read {
                    return Err(rusb::Error::Pipe);
                }
                let count = self
                    .read_count
                    .unwrap_or(self.feature.len())
                    .min(buffer.len())
                    .min(self.feature.len());
                buffer[..count].copy_from_slice(&self.feature[..count]);
                Ok(count)
            }
            rusb::Direction::Out => {
                self.writes.push((*request, buffer.to_vec()));
                if self.fail_write {
                    return Err(rusb::Error::Io);
                }
                self.feature = buffer.to_vec();
                Ok(self.write_count.unwrap_or(buffer.len()))
            }
        }
    }

    fn device_traits(&self) -> Result<DeviceTraits, rusb::Error> {
        self.traits.ok_or(rusb::Error::NotSupported)
    }
}

impl PipeTarget for MockTarget {
    fn start_pipe(&mut self, pipe: &PipeInfo) -> Result<(), rusb::Error> {
        self.starts.push(pipe.address);
        match self.fail_start {
            true => Err(rusb::Error::Busy),
            false => Ok(()),
        }
    }

    fn stop_pipe(&mut self, pipe: &PipeInfo, action: StopAction) -> Result<(), rusb::Error> {
        self.stops.push((pipe.address, action));
        match self.fail_stop {
            true => Err(rusb::Error::NoDevice),
            false => Ok(()),
        }
    }
}

impl PowerPolicy for MockTarget {
    fn set_idle_policy(&mut self, timeout: Duration) -> Result<(), PolicyError> {
        self.idle_policies.push(timeout);
        match self.fail_idle {
            true => Err(PolicyError::IdleRejected(std::io::Error::other("idle"))),
            false => Ok(()),
        }
    }

    fn set_wake_policy(&mut self) -> Result<(), PolicyError> {
        self.wake_policies += 1;
        match self.fail_wake {
            true => Err(PolicyError::WakeRejected(std::io::Error::other("wake"))),
            false => Ok(()),
        }
    }
}

impl FullTrackpadTarget for MockTarget {}
