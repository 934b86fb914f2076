//! HID report descriptor data types.

use std::iter::FusedIterator;

use crate::usage::Page;

/// An encoded HID report descriptor (\[HID\] Section 5.2, 6.2.2).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReportDescriptor(Vec<u8>);

impl ReportDescriptor {
    /// Creates a new report descriptor.
    #[inline]
    pub fn new(items: impl AsRef<[Item]>) -> Self {
        fn bytes(items: &[Item]) -> usize {
            items.iter().fold(0, |n, v| match *v {
                Item::MCollection(_, ref v) => n + 4 + bytes(v),
                _ => n + 3,
            })
        }
        let items = items.as_ref();
        let mut this = Self(Vec::with_capacity(bytes(items)));
        this.extend(items);
        this
    }

    /// Appends the contents of another report descriptor to this one.
    #[inline]
    pub fn append(&mut self, other: &Self) {
        self.0.extend_from_slice(&other.0);
    }

    /// Appends all `items` to the report descriptor.
    #[inline]
    pub fn extend(&mut self, items: impl AsRef<[Item]>) {
        for v in items.as_ref() {
            self.push(v);
        }
    }

    /// Returns an iterator over report descriptor items.
    #[inline(always)]
    #[must_use]
    pub fn iter(&self) -> Iter {
        Iter(&self.0)
    }

    /// Appends item `v` to the descriptor.
    fn push(&mut self, v: &Item) {
        use {Item::*, Tag::*};
        match *v {
            MInput(v) => self.u32(Input, u32::from(v.bits())),
            MCollection(typ, ref v) => {
                self.u32(Collection, typ as _);
                self.extend(v);
                self.0.push(EndCollection as _);
            }
            GUsagePage(v) => self.u32(UsagePage, v as _),
            GLogicalMin(v) => self.i32(LogicalMin, v),
            GLogicalMax(v) => self.i32(LogicalMax, v),
            GReportSize(v) => self.u32(ReportSize, v),
            // Report ID zero is reserved and is omitted from the descriptor
            GReportId(v) => {
                if v != 0 {
                    self.u32(ReportId, u32::from(v));
                }
            }
            GReportCount(v) => self.u32(ReportCount, v),
            LUsage(v) => self.u32(Usage, v),
            LUsageMin(v) => self.u32(UsageMin, v),
            LUsageMax(v) => self.u32(UsageMax, v),
        }
    }

    /// Appends a short `i32` item.
    fn i32(&mut self, t: Tag, v: i32) {
        #[allow(clippy::cast_possible_truncation)]
        let n = (usize::from(i32::from(v as i16) != v) * 2)
            + (usize::from(i32::from(v as i8) != v) + 1);
        self.put(t, v.to_le_bytes(), n);
    }

    /// Appends a short `u32` item.
    fn u32(&mut self, t: Tag, v: u32) {
        #[allow(clippy::cast_possible_truncation)]
        let n = (usize::from(u32::from(v as u16) != v) * 2)
            + (usize::from(u32::from(v as u8) != v) + 1);
        self.put(t, v.to_le_bytes(), n);
    }

    /// Appends `n` bytes of a short value. `n` must be 1, 2, or 4: hosts do
    /// not handle zero-size items consistently, so even zero values keep one
    /// data byte, which also matches the reference descriptor dumps.
    #[inline]
    fn put(&mut self, t: Tag, v: [u8; 4], n: usize) {
        #[allow(clippy::cast_possible_truncation)]
        let hdr = t as u8 | (n.trailing_zeros() as u8 + 1);
        let item = [hdr, v[0], v[1], v[2], v[3]];
        self.0.extend_from_slice(&item[..=n]);
    }
}

impl AsRef<[u8]> for ReportDescriptor {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ReportDescriptor {
    type Item = <Iter<'a> as Iterator>::Item;
    type IntoIter = Iter<'a>;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Report descriptor iterator. Yields `(tag, size, data)` values, where
/// `size` is the number of bytes used for `data`.
#[derive(Clone, Debug)]
pub struct Iter<'a>(&'a [u8]);

impl Iterator for Iter<'_> {
    type Item = (Tag, usize, u32);

    fn next(&mut self) -> Option<Self::Item> {
        use num_enum::TryFromPrimitive;
        let (&t, tail) = self.0.split_first()?;
        let n = 4 >> (3 - (t & 3));
        let t = Tag::try_from_primitive(t & !3).ok()?;
        if n > tail.len() {
            return None;
        }
        let mut v = [0_u8; 4];
        let (data, tail) = tail.split_at(n);
        v[..n].copy_from_slice(data);
        self.0 = tail;
        Some((t, n, u32::from_le_bytes(v)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.0.len()))
    }
}

impl FusedIterator for Iter<'_> {}

/// Report descriptor item (\[HID\] Section 5.2, 6.2.2).
///
/// Variants are prefixed with `M`, `G`, or `L` for Main, Global, or Local
/// type, respectively. Global items set default attributes for all
/// subsequent data fields; Local items apply only to the next Main item.
/// Only the item vocabulary used by combo input descriptors is modeled.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Item {
    /// Data from one or more controls on the device, described by the
    /// preceding Global and Local items.
    MInput(Flag),

    /// A meaningful grouping of Input items, e.g. a keyboard or mouse.
    MCollection(Collection, Vec<Item>),

    /// Current usage page for subsequent usages.
    GUsagePage(Page),

    /// Minimum value that a variable or array item will report.
    GLogicalMin(i32),

    /// Maximum value that a variable or array item will report.
    GLogicalMax(i32),

    /// Size of the report fields in bits.
    GReportSize(u32),

    /// Distinguishes the report layouts multiplexed over one descriptor.
    /// Report ID zero is reserved and will be omitted.
    GReportId(u8),

    /// Number of report fields included for this item.
    GReportCount(u32),

    /// Suggested usage for the item or collection.
    LUsage(u32),

    /// Starting usage associated with an array or bitmap.
    LUsageMin(u32),

    /// Ending usage associated with an array or bitmap.
    LUsageMax(u32),
}

/// Item tag specifying the function of the item
/// (\[HID\] Section 6.2.2.4, 6.2.2.7, 6.2.2.8).
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::TryFromPrimitive)]
#[non_exhaustive]
#[repr(u8)]
pub enum Tag {
    // Main
    Input = 0b1000_00 << 2,
    Collection = 0b1010_00 << 2,
    EndCollection = 0b1100_00 << 2,

    // Global
    UsagePage = 0b0000_01 << 2,
    LogicalMin = 0b0001_01 << 2,
    LogicalMax = 0b0010_01 << 2,
    ReportSize = 0b0111_01 << 2,
    ReportId = 0b1000_01 << 2,
    ReportCount = 0b1001_01 << 2,

    // Local
    Usage = 0b0000_10 << 2,
    UsageMin = 0b0001_10 << 2,
    UsageMax = 0b0010_10 << 2,
}

bitflags::bitflags! {
    /// Input item data flags (\[HID\] Section 6.2.2.5).
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Flag: u16 {
        /// Constant (static read-only field) rather than data.
        const CONST = 1 << 0;
        /// Variable (one field per control) rather than array.
        const VAR = 1 << 1;
        /// Relative (change since last report) rather than absolute.
        const REL = 1 << 2;
        /// Value wraps around after its extreme.
        const WRAP = 1 << 3;
        /// Data is a non-linear function of what is measured.
        const NON_LINEAR = 1 << 4;
        /// Control has no preferred state to return to.
        const NO_PREF = 1 << 5;
        /// Control has a null state in which it sends no meaningful data.
        const NULL = 1 << 6;
        /// Output/Feature value may change without host interaction.
        const VOLATILE = 1 << 7;
        /// Fixed-size stream of bytes, not a numeric quantity.
        const BYTES = 1 << 8;
    }
}

/// Collection type (\[HID\] Section 6.2.2.6).
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
#[repr(u8)]
pub enum Collection {
    /// A set of data items representing one geometric point, e.g. the
    /// pointer axes of a mouse.
    Physical = 0x00,

    /// A group of Main items familiar to applications, e.g. a keyboard.
    /// Data reports are usually associated with application collections,
    /// at least one report ID per application.
    Application = 0x01,
}

impl Collection {
    /// Defines a physical collection.
    #[inline(always)]
    #[must_use]
    pub fn physical(items: impl AsRef<[Item]>) -> Item {
        Item::MCollection(Self::Physical, items.as_ref().to_vec())
    }

    /// Defines an application collection.
    #[inline(always)]
    #[must_use]
    pub fn application(items: impl AsRef<[Item]>) -> Item {
        Item::MCollection(Self::Application, items.as_ref().to_vec())
    }
}
