//! Mouse input report (report ID 3).

use crate::descriptor::{Collection, Flag, Item, ReportDescriptor};
use crate::usage::{GenericDesktop, Page};
use crate::{EncodingError, Report, ReportId};

/// Largest valid button mask (three buttons).
pub const BUTTON_MAX: u8 = 0b111;

/// Encodes a mouse input report: three button bits (five pad bits), then
/// relative X, Y, and wheel deltas.
pub fn input(buttons: u8, dx: i8, dy: i8, wheel: i8) -> Result<Report, EncodingError> {
    if buttons > BUTTON_MAX {
        return Err(EncodingError::ButtonsOutOfRange(buttons));
    }
    #[allow(clippy::cast_sign_loss)]
    Ok(Report::exact(
        ReportId::Mouse,
        [buttons, dx as u8, dy as u8, wheel as u8],
    ))
}

/// Mouse collection: a physical pointer with three buttons, five bits of
/// padding, and three signed 8-bit relative axes.
#[rustfmt::skip]
#[must_use]
pub fn report_descriptor(report_id: u8) -> ReportDescriptor {
    use Item::*;
    ReportDescriptor::new([
        GUsagePage(Page::GenericDesktop),
        LUsage(GenericDesktop::Mouse as _),
        Collection::application([
            GReportId(report_id),
            LUsage(GenericDesktop::Pointer as _),
            Collection::physical([
                // Buttons
                GUsagePage(Page::Button),
                LUsageMin(1),
                LUsageMax(3),
                GLogicalMin(0),
                GLogicalMax(1),
                GReportSize(1),
                GReportCount(3),
                MInput(Flag::VAR),

                // Padding
                GReportSize(5),
                GReportCount(1),
                MInput(Flag::CONST),

                // Relative axes
                GUsagePage(Page::GenericDesktop),
                LUsage(GenericDesktop::X as _),
                LUsage(GenericDesktop::Y as _),
                LUsage(GenericDesktop::Wheel as _),
                GLogicalMin(-127),
                GLogicalMax(127),
                GReportSize(8),
                GReportCount(3),
                MInput(Flag::VAR | Flag::REL),
            ]),
        ]),
    ])
}
