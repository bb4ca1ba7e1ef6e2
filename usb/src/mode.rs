//! Switching a trackpad between plain HID reports and wellspring mode.
//!
//! The switch is a read-modify-write of a class feature on the HID interface: the current
//! feature block is read, a single byte is replaced, and the block is written back. The read
//! must return exactly the profile's buffer size; the write is accepted on transfer success
//! alone, as some devices acknowledge without reporting a count.

use crate::catalog::HardwareProfile;
use crate::device::base::UsbTarget;
use crate::error::{TransferError, TransferStage};
use log::{debug, error};
use rusb::{Direction, Recipient, RequestType};

pub const WELLSPRING_MODE_READ_REQUEST: u8 = 0x01;
pub const WELLSPRING_MODE_WRITE_REQUEST: u8 = 0x09;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ControlRequest {
    pub direction: Direction,
    pub request_type: RequestType,
    pub recipient: Recipient,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: usize,
}

impl ControlRequest {
    pub fn read_mode(profile: &HardwareProfile) -> Self {
        Self {
            direction: Direction::In,
            request_type: RequestType::Class,
            recipient: Recipient::Interface,
            request: WELLSPRING_MODE_READ_REQUEST,
            value: profile.um_req_val,
            index: profile.um_req_idx,
            length: profile.um_size,
        }
    }

    pub fn write_mode(profile: &HardwareProfile) -> Self {
        Self {
            direction: Direction::Out,
            request: WELLSPRING_MODE_WRITE_REQUEST,
            ..Self::read_mode(profile)
        }
    }

    /// The bmRequestType byte for this request.
    pub fn request_type(&self) -> u8 {
        rusb::request_type(self.direction, self.request_type, self.recipient)
    }
}

/// Runs the two transfer handshake against `target`. Nothing is recorded here, callers
/// keep track of the mode once this returns `Ok`.
pub fn switch_wellspring_mode<T: UsbTarget + ?Sized>(
    target: &mut T,
    profile: &HardwareProfile,
    on: bool,
) -> Result<(), TransferError> {
    debug!("Switching {} wellspring mode: {}", profile.name, on);

    if profile.um_switch_idx >= profile.um_size {
        error!(
            "{} switch byte {} doesn't fit a {} byte buffer",
            profile.name, profile.um_switch_idx, profile.um_size
        );
        return Err(TransferError::SwitchOutOfRange {
            index: profile.um_switch_idx,
            size: profile.um_size,
        });
    }

    let mut buffer = vec![0u8; profile.um_size];

    let read = ControlRequest::read_mode(profile);
    let transferred = target
        .control_transfer(&read, &mut buffer)
        .map_err(|source| {
            error!("Wellspring mode read failed: {}", source);
            TransferError::Failed {
                stage: TransferStage::Read,
                source,
            }
        })?;

    if transferred != profile.um_size {
        error!(
            "Wellspring mode read was short, expected {} bytes, received {}",
            profile.um_size, transferred
        );
        return Err(TransferError::ShortRead {
            expected: profile.um_size,
            actual: transferred,
        });
    }
    debug!("Current mode block: {:x?}", buffer);

    // Only the switch byte changes, everything else goes back as the device sent it.
    buffer[profile.um_switch_idx] = profile.switch_value(on);

    let write = ControlRequest::write_mode(profile);
    target
        .control_transfer(&write, &mut buffer)
        .map_err(|source| {
            error!("Wellspring mode write failed: {}", source);
            TransferError::Failed {
                stage: TransferStage::Write,
                source,
            }
        })?;

    Ok(())
}
