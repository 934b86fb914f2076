//! Usage pages and usage IDs referenced by the combo descriptor.

/// Usage page IDs (\[HUT\] Section 3).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
#[repr(u16)]
pub enum Page {
    /// Generic Desktop Page.
    GenericDesktop = 0x01,
    /// Keyboard/Keypad Page.
    Key = 0x07,
    /// Button Page.
    Button = 0x09,
    /// Consumer Page.
    Consumer = 0x0C,
}

/// Generic Desktop usage IDs (\[HUT\] Section 4).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
#[repr(u8)]
pub enum GenericDesktop {
    Pointer = 0x01,
    Mouse = 0x02,
    Keyboard = 0x06,
    X = 0x30,
    Y = 0x31,
    Wheel = 0x38,
}

/// Consumer Control usage ID opening the remote-control collection.
pub const CONSUMER_CONTROL: u32 = 0x01;

/// Consumer Page usage IDs sent by the remote-control report
/// (\[HUT\] Section 15). All values fit the report's 10-bit usage field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::TryFromPrimitive)]
#[non_exhaustive]
#[repr(u16)]
pub enum Consumer {
    /// Power toggle.
    Power = 0x030,
    /// Menu select / D-pad center.
    MenuPick = 0x041,
    MenuUp = 0x042,
    MenuDown = 0x043,
    MenuLeft = 0x044,
    MenuRight = 0x045,
    MenuEscape = 0x046,
    PlayPause = 0x0CD,
    Mute = 0x0E2,
    VolumeUp = 0x0E9,
    VolumeDown = 0x0EA,
    /// AC Home.
    Home = 0x223,
    /// AC Back.
    Back = 0x224,
}
