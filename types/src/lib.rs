#[cfg(feature = "enumset")]
use enumset::EnumSetType;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString};

/// Device power states as reported by the host platform. These are labels only, the
/// lifecycle doesn't branch on them beyond telling a final power down apart.
#[derive(Copy, Clone, Debug, Display, EnumIter, EnumCount, EnumString, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DevicePowerState {
    Invalid,
    D0,
    D1,
    D2,
    D3,
    D3Final,
    PrepareForHibernation,
    Maximum,
}

impl DevicePowerState {
    pub fn is_fully_powered(&self) -> bool {
        matches!(self, DevicePowerState::D0)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, DevicePowerState::D3Final)
    }
}

/// Where the continuous interrupt stream of a trackpad currently is.
#[derive(Copy, Clone, Debug, Default, Display, EnumIter, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StreamState {
    #[default]
    Inactive,
    Active,
    Removing,
}

#[derive(Debug, Display, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "enumset", derive(EnumSetType))]
#[cfg_attr(not(feature = "enumset"), derive(Copy, Clone, PartialEq, Eq))]
pub enum UsbDeviceTrait {
    SelfPowered,
    RemoteWakeCapable,
    AtHighSpeed,
}

#[derive(Copy, Clone, Debug, Display, EnumString, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum ReportingMode {
    /// Plain HID mouse reports, the state the device powers up in.
    Hid,
    /// Extended multi-touch reports.
    Wellspring,
}

impl ReportingMode {
    pub fn is_wellspring(&self) -> bool {
        matches!(self, ReportingMode::Wellspring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn power_state_labels() {
        assert_eq!(DevicePowerState::D3Final.to_string(), "D3Final");
        assert_eq!(
            DevicePowerState::from_str("PrepareForHibernation").ok(),
            Some(DevicePowerState::PrepareForHibernation)
        );
    }

    #[test]
    fn only_d0_is_fully_powered() {
        let powered: Vec<_> = DevicePowerState::iter()
            .filter(DevicePowerState::is_fully_powered)
            .collect();
        assert_eq!(powered, vec![DevicePowerState::D0]);
    }

    #[test]
    fn reporting_mode_parses_any_case() {
        assert_eq!(ReportingMode::from_str("wellspring").ok(), Some(ReportingMode::Wellspring));
        assert_eq!(ReportingMode::from_str("HID").ok(), Some(ReportingMode::Hid));
        assert!(ReportingMode::from_str("vendor").is_err());
    }

    #[test]
    fn stream_starts_inactive() {
        assert_eq!(StreamState::default(), StreamState::Inactive);
    }
}
