//! Keyboard input report (report ID 1).

use crate::descriptor::{Collection, Flag, Item, ReportDescriptor};
use crate::usage::{GenericDesktop, Page};
use crate::{Report, ReportId};

bitflags::bitflags! {
    /// Key modifier flags (the modifier byte of the keyboard report).
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct KeyMod: u8 {
        /// Left Ctrl
        const LCTRL = 1 << 0;
        /// Left Shift
        const LSHIFT = 1 << 1;
        /// Left Alt
        const LALT = 1 << 2;
        /// Left GUI ("Windows key" / Command)
        const LGUI = 1 << 3;
        /// Right Ctrl
        const RCTRL = 1 << 4;
        /// Right Shift
        const RSHIFT = 1 << 5;
        /// Right Alt
        const RALT = 1 << 6;
        /// Right GUI ("Windows key" / Command)
        const RGUI = 1 << 7;
    }
}

/// Encodes a keyboard input report: the modifier byte followed by a single
/// key-code array slot. A zero key code reports no key pressed.
#[inline]
#[must_use]
pub fn input(m: KeyMod, key: u8) -> Report {
    Report::exact(ReportId::Keyboard, [m.bits(), key])
}

/// Keyboard collection: 8 modifier bits plus one 0-255 key-code array slot.
/// No reserved byte: the host takes the layout from the descriptor, and the
/// 2-byte input report matches it.
#[rustfmt::skip]
#[must_use]
pub fn report_descriptor(report_id: u8) -> ReportDescriptor {
    use Item::*;
    ReportDescriptor::new([
        GUsagePage(Page::GenericDesktop),
        LUsage(GenericDesktop::Keyboard as _),
        Collection::application([
            GReportId(report_id),

            // Modifier flags
            GUsagePage(Page::Key),
            LUsageMin(0xE0), // Left Ctrl
            LUsageMax(0xE7), // Right GUI
            GLogicalMin(0),
            GLogicalMax(1),
            GReportSize(1),
            GReportCount(8),
            MInput(Flag::VAR),

            // Key-code array (one slot)
            GReportSize(8),
            GReportCount(1),
            GLogicalMin(0),
            GLogicalMax(0xFF),
            GUsagePage(Page::Key),
            LUsageMin(0),
            LUsageMax(0xFF),
            MInput(Flag::empty()),
        ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_layout() {
        let r = input(KeyMod::LSHIFT, 0x04); // Shift+A
        assert_eq!(r.id(), ReportId::Keyboard);
        assert_eq!(r.as_ref(), &[0x02, 0x04]);

        let r = input(KeyMod::empty(), 0);
        assert_eq!(r, Report::release(ReportId::Keyboard));
    }

    #[test]
    fn descriptor_bytes() {
        assert_eq!(
            report_descriptor(ReportId::Keyboard as u8).as_ref(),
            &[
                0x05, 0x01, // Usage Page (Generic Desktop)
                0x09, 0x06, // Usage (Keyboard)
                0xA1, 0x01, // Collection (Application)
                0x85, 0x01, //   Report ID (1)
                0x05, 0x07, //   Usage Page (Key Codes)
                0x19, 0xE0, //   Usage Minimum (224)
                0x29, 0xE7, //   Usage Maximum (231)
                0x15, 0x00, //   Logical Minimum (0)
                0x25, 0x01, //   Logical Maximum (1)
                0x75, 0x01, //   Report Size (1)
                0x95, 0x08, //   Report Count (8)
                0x81, 0x02, //   Input (Data, Variable, Absolute) ; Modifiers
                0x75, 0x08, //   Report Size (8)
                0x95, 0x01, //   Report Count (1)
                0x15, 0x00, //   Logical Minimum (0)
                0x26, 0xFF, 0x00, // Logical Maximum (255)
                0x05, 0x07, //   Usage Page (Key Codes)
                0x19, 0x00, //   Usage Minimum (0)
                0x29, 0xFF, //   Usage Maximum (255)
                0x81, 0x00, //   Input (Data, Array)              ; Key slot
                0xC0, // End Collection
            ]
        );
    }
}
