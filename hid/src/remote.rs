//! Remote-control (consumer control) input report (report ID 2).

use crate::descriptor::{Collection, Flag, Item, ReportDescriptor};
use crate::usage::{Page, CONSUMER_CONTROL};
use crate::{EncodingError, Report, ReportId};

/// Width of the usage field in bits.
pub const USAGE_BITS: u32 = 10;

/// Largest usage ID the report can carry.
pub const USAGE_MAX: u16 = (1 << USAGE_BITS) - 1;

/// Encodes a remote-control input report: one 10-bit consumer usage packed
/// little-endian into two bytes, upper six bits zero. A zero usage reports
/// no key pressed.
pub fn input(usage: u16) -> Result<Report, EncodingError> {
    if usage > USAGE_MAX {
        return Err(EncodingError::UsageOutOfRange(usage));
    }
    Ok(Report::exact(ReportId::Remote, usage.to_le_bytes()))
}

/// Remote-control collection: a single 10-bit usage array slot covering the
/// Consumer Page IDs 0-1023.
#[rustfmt::skip]
#[must_use]
pub fn report_descriptor(report_id: u8) -> ReportDescriptor {
    use Item::*;
    ReportDescriptor::new([
        GUsagePage(Page::Consumer),
        LUsage(CONSUMER_CONTROL),
        Collection::application([
            GReportId(report_id),
            LUsageMin(0),
            LUsageMax(u32::from(USAGE_MAX)),
            GReportSize(USAGE_BITS),
            GReportCount(1),
            GLogicalMin(0),
            GLogicalMax(i32::from(USAGE_MAX)),
            MInput(Flag::empty()),
        ]),
    ])
}
