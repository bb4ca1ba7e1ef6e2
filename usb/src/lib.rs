pub use rusb;
pub mod catalog;
pub mod error;
pub mod mode;
pub mod pipe;
pub mod power;
pub mod trackpad;

pub mod device;

pub use catalog::{resolve_profile, HardwareProfile, APPLE_VENDOR_ID};
pub use error::{DeviceError, PolicyError, TransferError};
pub use trackpad::{BringUpConfig, Trackpad};
