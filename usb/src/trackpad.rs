use crate::catalog::{resolve_profile, HardwareProfile};
use crate::device::base::{DeviceTraits, FullTrackpadTarget, PipeInfo, StopAction, UsbData};
use crate::error::DeviceError;
use crate::mode::switch_wellspring_mode;
use crate::pipe::select_interrupt_pipe;
use crate::power::apply_power_policy;
use log::{debug, error, info, warn};
use wellspring_types::StreamState;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BringUpConfig {
    /// Switch the trackpad into wellspring mode once it's been brought up.
    pub wellspring_mode: bool,

    /// Put the trackpad back into HID mode when it's released.
    pub restore_mode_on_release: bool,

    /// Set the idle and wake policy on remote wake capable trackpads. One-shot callers
    /// which never stream leave this off.
    pub power_policy: bool,
}

impl BringUpConfig {
    /// For callers that only run the mode handshake themselves: nothing is switched at
    /// bring-up, nothing restored at release, and the power policy is left to the system.
    pub const fn handshake_only() -> Self {
        Self {
            wellspring_mode: false,
            restore_mode_on_release: false,
            power_policy: false,
        }
    }
}

impl Default for BringUpConfig {
    fn default() -> Self {
        Self {
            wellspring_mode: true,
            restore_mode_on_release: true,
            power_policy: true,
        }
    }
}

/// A trackpad that has been successfully brought up. A value of this type always has a
/// profile and an interrupt pipe bound, both are fixed for its lifetime.
pub struct Trackpad<T: FullTrackpadTarget> {
    pub(crate) target: T,
    pub(crate) descriptor: UsbData,
    pub(crate) profile: &'static HardwareProfile,
    pub(crate) interrupt_pipe: PipeInfo,
    pub(crate) device_traits: DeviceTraits,
    pub(crate) config: BringUpConfig,

    pub(crate) wellspring_mode: bool,
    pub(crate) stream_state: StreamState,
}

impl<T: FullTrackpadTarget> Trackpad<T> {
    pub fn prepare_hardware(mut target: T, config: &BringUpConfig) -> Result<Self, DeviceError> {
        debug!("Preparing trackpad hardware");

        let descriptor = target.descriptor()?;
        let profile = resolve_profile(descriptor.vendor_id(), descriptor.product_id()).ok_or(
            DeviceError::UnsupportedDevice {
                vendor_id: descriptor.vendor_id(),
                product_id: descriptor.product_id(),
            },
        )?;
        info!(
            "Found {} ({:04x}:{:04x})",
            profile.name,
            descriptor.vendor_id(),
            descriptor.product_id()
        );

        let device_traits = match target.device_traits() {
            Ok(device_traits) => {
                info!("IsDeviceHighSpeed: {}", device_traits.is_high_speed());
                info!("IsDeviceSelfPowered: {}", device_traits.is_self_powered());
                info!(
                    "IsDeviceRemoteWakeable: {}",
                    device_traits.is_remote_wake_capable()
                );
                device_traits
            }
            Err(e) => {
                warn!("Unable to retrieve device traits: {}", e);
                DeviceTraits::default()
            }
        };

        let interrupt_pipe = select_interrupt_pipe(&mut target)?;

        if !config.power_policy {
            debug!("Leaving idle and wake policy untouched");
        } else if device_traits.is_remote_wake_capable() {
            apply_power_policy(&mut target)?;
        }

        let mut trackpad = Self {
            target,
            descriptor,
            profile,
            interrupt_pipe,
            device_traits,
            config: *config,
            wellspring_mode: false,
            stream_state: StreamState::Inactive,
        };

        if config.wellspring_mode {
            trackpad.set_wellspring_mode(true)?;
        }

        debug!("Trackpad hardware prepared");
        Ok(trackpad)
    }

    /// Moves the trackpad in or out of wellspring mode. The recorded mode only changes
    /// when both halves of the handshake succeed.
    pub fn set_wellspring_mode(&mut self, on: bool) -> Result<(), DeviceError> {
        switch_wellspring_mode(&mut self.target, self.profile, on)?;
        self.wellspring_mode = on;
        info!("Wellspring mode is now {}", if on { "on" } else { "off" });
        Ok(())
    }

    /// Tears the trackpad down, handing the target back to the caller.
    pub fn release_hardware(mut self) -> T {
        debug!("Releasing trackpad hardware");

        if self.stream_state == StreamState::Active {
            warn!("Trackpad released while still streaming, stopping interrupt pipe");
            if let Err(e) = self
                .target
                .stop_pipe(&self.interrupt_pipe, StopAction::CancelSentIo)
            {
                debug!("Failed to stop interrupt pipe: {}", e);
            }
        }
        self.stream_state = StreamState::Removing;

        if self.config.restore_mode_on_release && self.wellspring_mode {
            // The device may well be gone by now, so this is as far as errors go.
            if let Err(e) = self.set_wellspring_mode(false) {
                error!("Unable to restore HID mode: {}", e);
            }
        }

        self.target
    }

    pub fn profile(&self) -> &'static HardwareProfile {
        self.profile
    }

    pub fn descriptor(&self) -> &UsbData {
        &self.descriptor
    }

    pub fn interrupt_pipe(&self) -> &PipeInfo {
        &self.interrupt_pipe
    }

    pub fn device_traits(&self) -> DeviceTraits {
        self.device_traits
    }

    pub fn is_wellspring_mode_on(&self) -> bool {
        self.wellspring_mode
    }

    pub fn stream_state(&self) -> StreamState {
        self.stream_state
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}
