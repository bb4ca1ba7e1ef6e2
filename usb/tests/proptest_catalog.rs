//! Property-based tests for profile resolution and interrupt pipe selection.

use proptest::prelude::*;
use rusb::TransferType;
use wellspring_usb::catalog::{resolve_profile, CATALOG};
use wellspring_usb::device::base::PipeInfo;
use wellspring_usb::pipe::first_interrupt_pipe;
use wellspring_usb::APPLE_VENDOR_ID;

fn transfer_type() -> impl Strategy<Value = TransferType> {
    prop_oneof![
        Just(TransferType::Control),
        Just(TransferType::Isochronous),
        Just(TransferType::Bulk),
        Just(TransferType::Interrupt),
    ]
}

fn pipes() -> impl Strategy<Value = Vec<PipeInfo>> {
    prop::collection::vec(transfer_type(), 0..8).prop_map(|types| {
        types
            .into_iter()
            .enumerate()
            .map(|(index, transfer_type)| PipeInfo {
                address: 0x81 + index as u8,
                transfer_type,
                max_packet_size: 64,
                interval: 1,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Product ids outside the catalog never resolve.
    #[test]
    fn prop_unknown_products_not_found(pid: u16, vid: u16) {
        prop_assume!(!CATALOG.iter().any(|p| p.ansi == pid || p.iso == pid || p.jis == pid));
        prop_assert!(resolve_profile(vid, pid).is_none());
    }

    /// Every layout of every entry resolves back to that entry.
    #[test]
    fn prop_every_layout_resolves(idx in 0usize..CATALOG.len(), layout in 0usize..3) {
        let entry = CATALOG.get(idx).unwrap();
        let pid = match layout {
            0 => entry.ansi,
            1 => entry.iso,
            _ => entry.jis,
        };
        let resolved = resolve_profile(APPLE_VENDOR_ID, pid);
        prop_assert_eq!(resolved.map(|p| p.name), Some(entry.name));
    }

    /// Selection returns the first interrupt pipe in enumeration order, or nothing.
    #[test]
    fn prop_first_interrupt_pipe_selected(pipes in pipes()) {
        let selected = first_interrupt_pipe(&pipes);
        let position = pipes.iter().position(|p| p.transfer_type == TransferType::Interrupt);

        match position {
            Some(position) => {
                prop_assert_eq!(selected, pipes.get(position).copied());
                prop_assert!(pipes.iter().take(position).all(|p| !p.is_interrupt()));
            }
            None => prop_assert!(selected.is_none()),
        }
    }
}
