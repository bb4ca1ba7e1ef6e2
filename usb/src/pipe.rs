use crate::device::base::{PipeInfo, UsbTarget};
use crate::error::DeviceError;
use log::{debug, error, info};

/// Only the first interface is ever configured, devices which need more than one
/// configured interface aren't supported.
pub const TRACKPAD_INTERFACE: u8 = 0;

/// Configures the trackpad interface and binds the pipe that the touch reports arrive on.
///
/// Every configured pipe up to and including the chosen one is relaxed to accept reads
/// shorter than its max packet size, trackpad reports vary in length with the number of
/// fingers down.
pub fn select_interrupt_pipe<T: UsbTarget + ?Sized>(target: &mut T) -> Result<PipeInfo, DeviceError> {
    let pipes = match target.configure_single_interface(TRACKPAD_INTERFACE)? {
        Some(pipes) => pipes,
        None => {
            error!("Unable to locate interface {}", TRACKPAD_INTERFACE);
            return Err(DeviceError::NoInterface);
        }
    };
    debug!("Interface {} has {} configured pipes", TRACKPAD_INTERFACE, pipes.len());

    for pipe in &pipes {
        target.disable_max_packet_check(pipe);

        if pipe.is_interrupt() {
            info!("Interrupt Pipe is 0x{:02x}", pipe.address);
            return Ok(*pipe);
        }
    }

    error!("Device is not configured properly, no interrupt pipe found");
    Err(DeviceError::DeviceMisconfigured)
}

/// The selection rule on its own: the first interrupt pipe in enumeration order.
pub fn first_interrupt_pipe(pipes: &[PipeInfo]) -> Option<PipeInfo> {
    pipes.iter().find(|pipe| pipe.is_interrupt()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusb::TransferType;

    fn pipe(address: u8, transfer_type: TransferType) -> PipeInfo {
        PipeInfo {
            address,
            transfer_type,
            max_packet_size: 64,
            interval: 1,
        }
    }

    #[test]
    fn picks_interrupt_among_bulk() {
        let pipes = [
            pipe(0x02, TransferType::Bulk),
            pipe(0x81, TransferType::Interrupt),
            pipe(0x83, TransferType::Bulk),
        ];
        assert_eq!(first_interrupt_pipe(&pipes).map(|p| p.address), Some(0x81));
    }

    #[test]
    fn nothing_without_interrupt() {
        let pipes = [pipe(0x02, TransferType::Bulk), pipe(0x83, TransferType::Isochronous)];
        assert_eq!(first_interrupt_pipe(&pipes), None);
        assert_eq!(first_interrupt_pipe(&[]), None);
    }
}
