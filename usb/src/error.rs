use strum::Display;

#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("Device {vendor_id:04x}:{product_id:04x} is not a supported trackpad")]
    UnsupportedDevice { vendor_id: u16, product_id: u16 },

    #[error("Interface 0 is not available on this device")]
    NoInterface,

    #[error("Device is not configured properly, no interrupt pipe found")]
    DeviceMisconfigured,

    #[error("Transfer error: {0}")]
    TransferError(#[from] TransferError),

    #[error("Power policy error: {0}")]
    PolicyError(#[from] PolicyError),

    #[error("USB error: {0}")]
    UsbError(#[from] rusb::Error),
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum TransferStage {
    Read,
    Write,
}

#[derive(thiserror::Error, Debug)]
pub enum TransferError {
    #[error("{stage} control transfer failed: {source}")]
    Failed {
        stage: TransferStage,
        #[source]
        source: rusb::Error,
    },

    #[error("Short read from device, expected {expected} bytes, received {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Switch byte {index} is outside the {size} byte mode buffer")]
    SwitchOutOfRange { index: usize, size: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    #[error("Idle policy rejected: {0}")]
    IdleRejected(#[source] std::io::Error),

    #[error("Wake policy rejected: {0}")]
    WakeRejected(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_device_message_has_ids() {
        let error = DeviceError::UnsupportedDevice {
            vendor_id: 0x05ac,
            product_id: 0x1234,
        };
        assert_eq!(
            error.to_string(),
            "Device 05ac:1234 is not a supported trackpad"
        );
    }

    #[test]
    fn transfer_errors_convert_untouched() {
        let error: DeviceError = TransferError::ShortRead {
            expected: 8,
            actual: 4,
        }
        .into();
        assert!(matches!(
            error,
            DeviceError::TransferError(TransferError::ShortRead {
                expected: 8,
                actual: 4
            })
        ));
    }

    #[test]
    fn failed_transfer_names_its_stage() {
        let error = TransferError::Failed {
            stage: TransferStage::Write,
            source: rusb::Error::Pipe,
        };
        assert!(error.to_string().starts_with("Write control transfer failed"));
    }
}
