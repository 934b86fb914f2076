//! Platform Bluetooth HID Device profile interface.
//!
//! The platform stack is an opaque asynchronous service: requests return
//! immediately and outcomes arrive later as [`Event`]s through the
//! [`EventSink`] supplied with the request. Platforms deliver callbacks one
//! at a time per profile; the session serializes its own state on top of
//! that guarantee.
//!
//! [`Event`]: crate::session::Event

use std::fmt::Debug;
use std::sync::Arc;

use btremote_hid::ReportId;

use crate::dev::RemoteDevice;
use crate::session::EventSink;

/// Platform Bluetooth adapter granting access to the HID Device profile.
pub trait Adapter: Debug + Send + Sync {
    /// Requests the HID Device profile proxy. Returns false if the request
    /// could not be issued; otherwise the outcome is delivered to `sink` as
    /// [`Event::ProxyAcquired`], and a later service teardown as
    /// [`Event::ProxyLost`].
    ///
    /// [`Event::ProxyAcquired`]: crate::session::Event::ProxyAcquired
    /// [`Event::ProxyLost`]: crate::session::Event::ProxyLost
    fn request_proxy(&self, sink: EventSink) -> bool;

    /// Releases a proxy obtained through [`Self::request_proxy`]. Must be
    /// safe to call for a proxy the platform already tore down.
    fn close_proxy(&self, proxy: &Arc<dyn HidDeviceProxy>);
}

/// HID Device profile proxy. Exclusively owned by the session holding it;
/// all operations are asynchronous and never block.
pub trait HidDeviceProxy: Debug + Send + Sync {
    /// Registers the HID app with its service record and outgoing QoS
    /// policy. The platform confirms or rejects through
    /// [`Event::AppStatus`] on `sink`, which also receives subsequent
    /// connection-state changes. Registering twice without an intervening
    /// unregister is rejected by the platform.
    ///
    /// [`Event::AppStatus`]: crate::session::Event::AppStatus
    fn register_app(&self, sdp: &SdpRecord, qos: &QosPolicy, sink: EventSink) -> bool;

    /// Unregisters the HID app.
    fn unregister_app(&self) -> bool;

    /// Requests a connection to `dev`. Progress is reported through
    /// [`Event::ConnectionState`] events.
    ///
    /// [`Event::ConnectionState`]: crate::session::Event::ConnectionState
    fn connect(&self, dev: &RemoteDevice) -> bool;

    /// Requests disconnection from `dev`. Must be idempotent: some handsets
    /// need the request repeated, so shims may issue it twice internally.
    fn disconnect(&self, dev: &RemoteDevice) -> bool;

    /// Sends one input report frame to `dev`.
    fn send_report(&self, dev: &RemoteDevice, id: ReportId, payload: &[u8]) -> bool;
}

/// Device link state reported by the platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq, num_enum::TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum ConnState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Disconnecting = 3,
}

/// Device subclass advertising a combo keyboard/pointing device.
pub const SUBCLASS_COMBO: u8 = 0xC0;

/// Service discovery record advertised at registration time. Built once;
/// immutable for the life of the registration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SdpRecord {
    /// Service name shown by the remote host.
    pub name: String,
    /// Service description.
    pub description: String,
    /// Provider name.
    pub provider: String,
    /// Advertised device subclass.
    pub subclass: u8,
    /// Encoded HID report descriptor; the host parses it at registration.
    pub descriptor: Vec<u8>,
}

impl Default for SdpRecord {
    fn default() -> Self {
        Self {
            name: "BTRemote".into(),
            description: "BTRemote".into(),
            provider: "Demo".into(),
            subclass: SUBCLASS_COMBO,
            descriptor: btremote_hid::report_descriptor().as_ref().to_vec(),
        }
    }
}

/// Traffic class advertised in the QoS policy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(u8)]
pub enum ServiceType {
    NoTraffic = 0,
    #[default]
    BestEffort = 1,
    Guaranteed = 2,
}

/// Outgoing QoS parameters advertised with registration. Immutable; the
/// policy is never renegotiated after `registerApp`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QosPolicy {
    /// Traffic class.
    pub service_type: ServiceType,
    /// Token rate in bytes per second.
    pub token_rate: u32,
    /// Token bucket size in bytes.
    pub token_bucket_size: u32,
    /// Peak bandwidth in bytes per second; 0 leaves it unspecified.
    pub peak_bandwidth: u32,
    /// Latency bound in microseconds.
    pub latency: u32,
    /// Delay variation in microseconds; `u32::MAX` leaves it unbounded.
    pub delay_variation: u32,
}

impl Default for QosPolicy {
    fn default() -> Self {
        Self {
            service_type: ServiceType::BestEffort,
            token_rate: 800, // 9 bytes * 1_000_000 us / 11_250 us
            token_bucket_size: 9,
            peak_bandwidth: 0,
            latency: 11_250,
            delay_variation: u32::MAX,
        }
    }
}
