//! Combo HID report model for a Bluetooth remote-control peripheral.
//!
//! Three input report types — keyboard, remote/consumer control, and mouse —
//! are multiplexed by report ID over a single report descriptor. The remote
//! host parses the descriptor once at registration time, so the encoded
//! byte sequence is part of the interoperability contract: every payload
//! built here has exactly the length and field order the descriptor
//! declares. See \[HID\] and \[HUT\] for the underlying formats.
//!
//! \[HID\]: <https://www.usb.org/sites/default/files/hid1_11.pdf>
//! \[HUT\]: <https://www.usb.org/sites/default/files/hut1_12v2.pdf>

#![warn(unused_crate_dependencies)]

use std::fmt;

pub mod descriptor;
pub mod kbd;
pub mod mouse;
pub mod remote;
pub mod usage;

use descriptor::ReportDescriptor;

/// Report ID discriminating the three input report layouts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum ReportId {
    /// Modifier byte plus one key-code array slot.
    Keyboard = 1,
    /// One 10-bit consumer usage.
    Remote = 2,
    /// Button bits plus three relative axes.
    Mouse = 3,
}

impl ReportId {
    /// Returns the input payload length in bytes declared by the descriptor
    /// for this report ID.
    #[must_use]
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Keyboard | Self::Remote => 2,
            Self::Mouse => 4,
        }
    }
}

/// Error returned when a report field is outside the range declared by the
/// descriptor. Out-of-range input is rejected, never truncated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum EncodingError {
    #[error("payload length {len} invalid for {id:?} report (descriptor declares {expect})")]
    PayloadLength {
        id: ReportId,
        len: usize,
        expect: usize,
    },
    #[error("consumer usage {0:#05X} exceeds 10-bit range")]
    UsageOutOfRange(u16),
    #[error("button mask {0:#04X} uses more than 3 buttons")]
    ButtonsOutOfRange(u8),
}

/// An input report: a report ID plus the payload declared for that ID.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Report {
    id: ReportId,
    /// Payload bytes; `id.payload_len()` of them are valid.
    v: [u8; Self::MAX_PAYLOAD],
}

impl Report {
    /// Largest payload length declared by the descriptor.
    pub const MAX_PAYLOAD: usize = 4;

    /// Creates a report with the specified ID and payload. The payload
    /// length must be exactly what the descriptor declares for `id`.
    pub fn new(id: ReportId, payload: &[u8]) -> Result<Self, EncodingError> {
        let expect = id.payload_len();
        if payload.len() != expect {
            return Err(EncodingError::PayloadLength {
                id,
                len: payload.len(),
                expect,
            });
        }
        let mut this = Self::release(id);
        this.v[..expect].copy_from_slice(payload);
        Ok(this)
    }

    /// Creates the all-zero release report for `id`: the payload a host
    /// interprets as "nothing pressed".
    #[inline]
    #[must_use]
    pub const fn release(id: ReportId) -> Self {
        Self {
            id,
            v: [0; Self::MAX_PAYLOAD],
        }
    }

    /// Creates a report from a payload of the exact declared length.
    pub(crate) fn exact<const N: usize>(id: ReportId, payload: [u8; N]) -> Self {
        debug_assert_eq!(N, id.payload_len());
        let mut this = Self::release(id);
        this.v[..N].copy_from_slice(&payload);
        this
    }

    /// Returns the report ID.
    #[inline(always)]
    #[must_use]
    pub const fn id(&self) -> ReportId {
        self.id
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("id", &self.id)
            .field("payload", &self.as_ref())
            .finish()
    }
}

impl AsRef<[u8]> for Report {
    /// Returns the report payload. The ID is carried out of band by the
    /// profile's `sendReport` operation.
    #[inline]
    #[must_use]
    fn as_ref(&self) -> &[u8] {
        &self.v[..self.id.payload_len()]
    }
}

/// Returns the combined keyboard + remote-control + mouse report descriptor.
///
/// The byte sequence is fixed: any deviation changes the report layout the
/// host expects and breaks every payload this crate encodes.
#[must_use]
pub fn report_descriptor() -> ReportDescriptor {
    let mut rd = kbd::report_descriptor(ReportId::Keyboard as u8);
    rd.append(&remote::report_descriptor(ReportId::Remote as u8));
    rd.append(&mouse::report_descriptor(ReportId::Mouse as u8));
    rd
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_IDS: [ReportId; 3] = [ReportId::Keyboard, ReportId::Remote, ReportId::Mouse];

    #[test]
    fn report() {
        let r = Report::new(ReportId::Remote, &[0x41, 0x00]).unwrap();
        assert_eq!(r.id(), ReportId::Remote);
        assert_eq!(r.as_ref(), &[0x41, 0x00]);

        assert_eq!(
            Report::new(ReportId::Remote, &[0x41, 0x00, 0x00]),
            Err(EncodingError::PayloadLength {
                id: ReportId::Remote,
                len: 3,
                expect: 2,
            })
        );
        assert_eq!(
            Report::new(ReportId::Mouse, &[1]),
            Err(EncodingError::PayloadLength {
                id: ReportId::Mouse,
                len: 1,
                expect: 4,
            })
        );
    }

    /// The release payload for each report ID has the same length as the
    /// payloads produced by that ID's encoder, and is all zero.
    #[test]
    fn release_matches_encoders() {
        for id in ALL_IDS {
            let r = Report::release(id);
            assert_eq!(r.as_ref().len(), id.payload_len());
            assert!(r.as_ref().iter().all(|&b| b == 0));
        }
        assert_eq!(
            Report::release(ReportId::Keyboard).as_ref().len(),
            kbd::input(kbd::KeyMod::empty(), 0x28).as_ref().len()
        );
        assert_eq!(
            Report::release(ReportId::Remote).as_ref().len(),
            remote::input(0x041).unwrap().as_ref().len()
        );
        assert_eq!(
            Report::release(ReportId::Mouse).as_ref().len(),
            mouse::input(0, 1, 1, 0).unwrap().as_ref().len()
        );
    }

    #[test]
    fn report_id_from_raw() {
        for id in ALL_IDS {
            assert_eq!(ReportId::try_from(id as u8).unwrap(), id);
        }
        assert!(ReportId::try_from(0_u8).is_err());
        assert!(ReportId::try_from(4_u8).is_err());
    }

    /// The combined descriptor must reproduce the reference byte table that
    /// paired hosts were validated against, byte for byte.
    #[test]
    fn descriptor_reference_bytes() {
        const WANT: [u8; 121] = [
            // Keyboard
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
            0x81, 0x02, //   Input (Data, Variable, Absolute)
            0x75, 0x08, //   Report Size (8)
            0x95, 0x01, //   Report Count (1)
            0x15, 0x00, //   Logical Minimum (0)
            0x26, 0xFF, 0x00, // Logical Maximum (255)
            0x05, 0x07, //   Usage Page (Key Codes)
            0x19, 0x00, //   Usage Minimum (0)
            0x29, 0xFF, //   Usage Maximum (255)
            0x81, 0x00, //   Input (Data, Array, Absolute)
            0xC0, // End Collection
            // Remote control
            0x05, 0x0C, // Usage Page (Consumer Devices)
            0x09, 0x01, // Usage (Consumer Control)
            0xA1, 0x01, // Collection (Application)
            0x85, 0x02, //   Report ID (2)
            0x19, 0x00, //   Usage Minimum (0)
            0x2A, 0xFF, 0x03, // Usage Maximum (1023)
            0x75, 0x0A, //   Report Size (10)
            0x95, 0x01, //   Report Count (1)
            0x15, 0x00, //   Logical Minimum (0)
            0x26, 0xFF, 0x03, // Logical Maximum (1023)
            0x81, 0x00, //   Input (Data, Array, Absolute)
            0xC0, // End Collection
            // Mouse
            0x05, 0x01, // Usage Page (Generic Desktop)
            0x09, 0x02, // Usage (Mouse)
            0xA1, 0x01, // Collection (Application)
            0x85, 0x03, //   Report ID (3)
            0x09, 0x01, //   Usage (Pointer)
            0xA1, 0x00, //   Collection (Physical)
            0x05, 0x09, //     Usage Page (Buttons)
            0x19, 0x01, //     Usage Minimum (1)
            0x29, 0x03, //     Usage Maximum (3)
            0x15, 0x00, //     Logical Minimum (0)
            0x25, 0x01, //     Logical Maximum (1)
            0x75, 0x01, //     Report Size (1)
            0x95, 0x03, //     Report Count (3)
            0x81, 0x02, //     Input (Data, Variable, Absolute)
            0x75, 0x05, //     Report Size (5)
            0x95, 0x01, //     Report Count (1)
            0x81, 0x01, //     Input (Constant)
            0x05, 0x01, //     Usage Page (Generic Desktop)
            0x09, 0x30, //     Usage (X)
            0x09, 0x31, //     Usage (Y)
            0x09, 0x38, //     Usage (Wheel)
            0x15, 0x81, //     Logical Minimum (-127)
            0x25, 0x7F, //     Logical Maximum (127)
            0x75, 0x08, //     Report Size (8)
            0x95, 0x03, //     Report Count (3)
            0x81, 0x06, //     Input (Data, Variable, Relative)
            0xC0, //   End Collection
            0xC0, // End Collection
        ];
        assert_eq!(report_descriptor().as_ref(), &WANT);
    }

    /// Each report ID appears exactly once in the descriptor.
    #[test]
    fn descriptor_report_ids() {
        use descriptor::Tag;
        let ids: Vec<u32> = report_descriptor()
            .iter()
            .filter(|&(t, ..)| t == Tag::ReportId)
            .map(|(.., v)| v)
            .collect();
        assert_eq!(ids, [1, 2, 3]);
    }
}
