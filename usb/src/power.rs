use crate::device::base::{FullTrackpadTarget, PowerPolicy, StopAction};
use crate::error::DeviceError;
use crate::trackpad::Trackpad;
use log::{debug, error, info};
use std::time::Duration;
use wellspring_types::{DevicePowerState, StreamState};

/// How long the trackpad may sit untouched before it's allowed to suspend.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Enables selective suspend and wake-on-touch. Only called for devices which advertise
/// remote wake, once, while the device is being prepared.
pub(crate) fn apply_power_policy<T: PowerPolicy + ?Sized>(target: &mut T) -> Result<(), DeviceError> {
    if let Err(e) = target.set_idle_policy(IDLE_TIMEOUT) {
        error!("Setting the idle policy failed: {}", e);
        return Err(e.into());
    }

    if let Err(e) = target.set_wake_policy() {
        error!("Setting the wake policy failed: {}", e);
        return Err(e.into());
    }

    debug!("Idle ({:?}) and wake policy applied", IDLE_TIMEOUT);
    Ok(())
}

impl<T: FullTrackpadTarget> Trackpad<T> {
    /// Called when the device enters the fully powered state. Starts the interrupt pipe so
    /// reports begin to flow.
    ///
    /// A failure here generally leads to the device being removed, so the pipe is stopped
    /// again before the error is handed back.
    pub fn d0_entry(&mut self, previous: DevicePowerState) -> Result<(), DeviceError> {
        info!("--> D0 Entry, coming from {}", previous);

        if let Err(e) = self.target.start_pipe(&self.interrupt_pipe) {
            error!("Failed to start interrupt pipe: {}", e);
            if let Err(stop) = self
                .target
                .stop_pipe(&self.interrupt_pipe, StopAction::CancelSentIo)
            {
                debug!("Stopping the interrupt pipe also failed: {}", stop);
            }
            return Err(e.into());
        }

        self.stream_state = StreamState::Active;
        info!("<-- D0 Entry");
        Ok(())
    }

    /// Called when the device leaves the fully powered state. Stops the interrupt pipe and
    /// cancels whatever is still in flight, this can't fail.
    pub fn d0_exit(&mut self, target: DevicePowerState) {
        info!("--> D0 Exit, moving to {}", target);

        if let Err(e) = self
            .target
            .stop_pipe(&self.interrupt_pipe, StopAction::CancelSentIo)
        {
            debug!("Stopping interrupt pipe reported: {}", e);
        }

        self.stream_state = match target.is_final() {
            true => StreamState::Removing,
            false => StreamState::Inactive,
        };
        info!("<-- D0 Exit");
    }

    pub fn is_streaming(&self) -> bool {
        self.stream_state == StreamState::Active
    }
}
