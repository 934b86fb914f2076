//! Bluetooth HID Device remote-control peripheral library.
//!
//! `btremote` drives the platform's Bluetooth HID Device profile to present
//! the local host as a combo keyboard / remote-control / mouse peripheral
//! toward a paired display device. The platform stack is consumed through
//! the opaque traits in [`stack`]; the [`session`] state machine owns the
//! registration and connection lifecycle; [`remote`] translates discrete
//! key events into input reports; the report model itself lives in the
//! [`hid`] crate.

pub use btremote_hid as hid;

pub mod dev;
pub mod remote;
pub mod session;
pub mod stack;

pub use dev::{RawAddr, RemoteDevice};
pub use remote::RemoteControl;
pub use session::{Error, Event, EventSink, LinkStatus, ProfileState, Session};
pub use stack::{Adapter, ConnState, HidDeviceProxy, QosPolicy, SdpRecord};

pub(crate) type SyncMutex<T> = parking_lot::Mutex<T>;
