//! The static table of supported trackpads, and the lookup that binds a freshly attached
//! device to one of its entries.
//!
//! Every entry carries the constants needed to flip that model between its default HID
//! mouse mode and the extended multi-touch ("wellspring") mode. Laptops ship the same
//! trackpad under three product ids depending on the keyboard layout (ANSI, ISO and JIS),
//! standalone trackpads simply repeat their id.

use log::debug;

pub const APPLE_VENDOR_ID: u16 = 0x05ac;

#[derive(Debug, PartialEq, Eq)]
pub struct HardwareProfile {
    pub name: &'static str,

    pub ansi: u16,
    pub iso: u16,
    pub jis: u16,

    /// Length of the mode control buffer
    pub um_size: usize,
    pub um_req_val: u16,
    pub um_req_idx: u16,

    /// Offset of the switch byte within the buffer
    pub um_switch_idx: usize,
    pub um_switch_on: u8,
    pub um_switch_off: u8,
}

impl HardwareProfile {
    pub fn matches(&self, product_id: u16) -> bool {
        self.ansi == product_id || self.iso == product_id || self.jis == product_id
    }

    pub fn switch_value(&self, on: bool) -> u8 {
        match on {
            true => self.um_switch_on,
            false => self.um_switch_off,
        }
    }
}

// Mode messages are shared by trackpad generation, the first three generations use an
// 8 byte feature at 0x300, later ones a 2 byte feature at 0x302.
const fn wellspring(
    name: &'static str,
    ansi: u16,
    iso: u16,
    jis: u16,
    generation: Generation,
) -> HardwareProfile {
    let (um_size, um_req_val, um_req_idx, um_switch_idx, um_switch_on, um_switch_off) =
        match generation {
            Generation::Early => (8, 0x0300, 0, 0, 0x01, 0x08),
            Generation::Type4 => (2, 0x0302, 2, 1, 0x03, 0x00),
        };

    HardwareProfile {
        name,
        ansi,
        iso,
        jis,
        um_size,
        um_req_val,
        um_req_idx,
        um_switch_idx,
        um_switch_on,
        um_switch_off,
    }
}

enum Generation {
    Early,
    Type4,
}

pub static CATALOG: &[HardwareProfile] = &[
    wellspring("MacBook Air 1,1", 0x0223, 0x0224, 0x0225, Generation::Early),
    wellspring("MacBook Pro 5,1", 0x0230, 0x0231, 0x0232, Generation::Early),
    wellspring("MacBook 5,1", 0x0236, 0x0237, 0x0238, Generation::Early),
    wellspring("MacBook Air 3,2", 0x023f, 0x0240, 0x0241, Generation::Early),
    wellspring("MacBook Air 3,1", 0x0242, 0x0243, 0x0244, Generation::Early),
    wellspring("MacBook Pro 8,1", 0x0245, 0x0246, 0x0247, Generation::Early),
    wellspring("MacBook Air 4,1", 0x0249, 0x024a, 0x024b, Generation::Early),
    wellspring("MacBook Air 4,2", 0x024c, 0x024d, 0x024e, Generation::Early),
    wellspring("MacBook Pro 8,2", 0x0252, 0x0253, 0x0254, Generation::Early),
    wellspring("MacBook Pro 10,2", 0x0259, 0x025a, 0x025b, Generation::Early),
    wellspring("MacBook Pro 10,1", 0x0262, 0x0263, 0x0264, Generation::Early),
    wellspring("MacBook Air 6,2", 0x0290, 0x0291, 0x0292, Generation::Early),
    wellspring("MacBook Pro 12,1", 0x0272, 0x0273, 0x0274, Generation::Type4),
    wellspring("Magic Trackpad 2", 0x0265, 0x0265, 0x0265, Generation::Type4),
    wellspring("Magic Trackpad 2 (USB-C)", 0x0324, 0x0324, 0x0324, Generation::Type4),
];

/// Looks up the profile for a device. Only the product id takes part in the match, the
/// vendor id is there for the log line.
pub fn resolve_profile(vendor_id: u16, product_id: u16) -> Option<&'static HardwareProfile> {
    resolve_in(CATALOG, vendor_id, product_id)
}

/// Scans `table` in order, the first entry carrying `product_id` in any layout wins.
pub fn resolve_in(
    table: &[HardwareProfile],
    vendor_id: u16,
    product_id: u16,
) -> Option<&HardwareProfile> {
    let profile = table.iter().find(|profile| profile.matches(product_id));
    match profile {
        Some(profile) => debug!(
            "Device {:04x}:{:04x} matched profile {}",
            vendor_id, product_id, profile.name
        ),
        None => debug!(
            "Device {:04x}:{:04x} has no matching profile",
            vendor_id, product_id
        ),
    }
    profile
}

/// Discovery filter: an Apple device with an entry in the catalog.
pub fn is_supported(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == APPLE_VENDOR_ID && CATALOG.iter().any(|profile| profile.matches(product_id))
}
