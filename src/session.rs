//! HID Device profile session: registration and connection lifecycle.
//!
//! A [`Session`] owns the profile proxy and is the single writer of all link
//! state. Caller operations (`link`, `send_key_down`, `release`) and
//! platform callbacks both funnel into one mutex-guarded state record, so
//! every branching decision observes a consistent snapshot. Nothing here
//! blocks: operations either act on the (asynchronous) platform APIs
//! immediately or return a synchronous failure, and nothing is queued.

use std::sync::{Arc, Weak};

use tracing::{debug, error, warn};

use btremote_hid::{Report, ReportId};

use crate::dev::RemoteDevice;
use crate::stack::{Adapter, ConnState, HidDeviceProxy, QosPolicy, SdpRecord};
use crate::SyncMutex;

/// Error type returned by the session layer. Failures are captured into
/// [`LinkStatus::last_error`] rather than thrown across the public
/// boundary; every one of them is recoverable by re-invoking
/// [`Session::link`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The platform failed to hand back a profile proxy.
    #[error("HID Device profile proxy unavailable")]
    ProxyUnavailable,
    /// `registerApp` was rejected; the session stays at
    /// [`ProfileState::ProxyConnected`] and does not retry on its own.
    #[error("HID app registration rejected")]
    RegistrationFailed,
    /// The profile service disconnected unexpectedly.
    #[error("HID profile service lost")]
    ServiceLost,
    /// The device link dropped while the app stayed registered.
    #[error("HID device link disconnected")]
    DeviceDisconnected,
    /// A report field was out of the descriptor-declared range; rejected
    /// before any transmission attempt.
    #[error(transparent)]
    Encoding(#[from] btremote_hid::EncodingError),
    /// `sendReport` failed at the platform layer.
    #[error("report transmission failed")]
    SendFailed,
}

/// Common session result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Authoritative session state. The session is the single writer; observers
/// see the derived [`LinkStatus`] projection instead.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display)]
pub enum ProfileState {
    /// No proxy held. Initial state, and the state after service loss or
    /// release.
    #[default]
    Unregistered,
    /// Proxy requested; the platform has not answered yet.
    ProxyAcquiring,
    /// Profile service bound, app not registered.
    ProxyConnected,
    /// `registerApp` issued, confirmation pending.
    AppRegistering,
    /// App registered; no device link.
    AppRegistered,
    /// Device connect issued, link not up yet.
    DeviceConnecting,
    /// Device link up; reports can be sent.
    DeviceConnected,
    /// Device link dropped while the app stayed registered. A new
    /// [`Session::link`] call reconnects without re-registering.
    DeviceDisconnected,
}

/// Observable status projection: four independent fields kept consistent
/// with [`ProfileState`] on every transition, so observers can react to
/// partial progress without decoding the state enum.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LinkStatus {
    /// The HID Device profile service is bound (a proxy is held).
    pub service_bound: bool,
    /// `registerApp` was confirmed by the platform.
    pub app_registered: bool,
    /// The device link is up.
    pub device_connected: bool,
    /// Most recent failure; cleared by the next successful transition.
    pub last_error: Option<Error>,
}

/// Platform callback event. The platform shim forwards each profile
/// callback as one event through the [`EventSink`] it was given.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Event {
    /// The platform handed back the profile proxy.
    ProxyAcquired(Arc<dyn HidDeviceProxy>),
    /// The profile service was torn down; the proxy is no longer usable.
    ProxyLost,
    /// Outcome of an app registration, or a platform-side unregister.
    AppStatus {
        /// Whether the app is now registered.
        registered: bool,
    },
    /// Device link state change.
    ConnectionState {
        /// Device the change applies to.
        dev: RemoteDevice,
        /// New link state.
        state: ConnState,
    },
}

/// Callback handle given to the platform stack; the single entry point for
/// platform events into the session state machine.
///
/// Each sink is tagged with the proxy generation current when it was
/// issued. [`Session::release`] (and service loss) advance the generation,
/// so a callback arriving late for an old proxy is discarded on delivery
/// instead of mutating state it no longer owns.
#[derive(Clone, Debug)]
pub struct EventSink {
    session: Weak<Session>,
    generation: u64,
}

impl EventSink {
    /// Delivers one platform event to the owning session. Events are
    /// processed in arrival order, one at a time.
    pub fn deliver(&self, event: Event) {
        let Some(session) = self.session.upgrade() else {
            return;
        };
        session.handle_event(self.generation, event);
    }
}

/// Link state guarded as a single critical section.
#[derive(Debug, Default)]
struct LinkState {
    state: ProfileState,
    status: LinkStatus,
    proxy: Option<Arc<dyn HidDeviceProxy>>,
    dev: Option<RemoteDevice>,
    /// Proxy epoch; sinks from earlier epochs deliver into the void.
    generation: u64,
}

impl LinkState {
    /// Returns to the initial state, keeping the generation counter.
    fn reset(&mut self, err: Option<Error>) {
        self.state = ProfileState::Unregistered;
        self.status = LinkStatus {
            last_error: err,
            ..LinkStatus::default()
        };
    }

    fn sink(&self, weak: &Weak<Session>) -> EventSink {
        EventSink {
            session: weak.clone(),
            generation: self.generation,
        }
    }
}

/// Platform call decided under the state lock, issued after it is dropped
/// so that a shim delivering events inline cannot deadlock the session.
enum Step {
    None,
    Acquire(EventSink),
    Register(Arc<dyn HidDeviceProxy>),
    Connect(Arc<dyn HidDeviceProxy>, RemoteDevice),
}

/// HID Device profile session.
#[derive(Debug)]
pub struct Session {
    adapter: Arc<dyn Adapter>,
    sdp: SdpRecord,
    qos: QosPolicy,
    state: SyncMutex<LinkState>,
    weak: Weak<Self>,
}

impl Session {
    /// Creates a session with the default SDP record and QoS policy.
    #[must_use]
    pub fn new(adapter: Arc<dyn Adapter>) -> Arc<Self> {
        Self::with_config(adapter, SdpRecord::default(), QosPolicy::default())
    }

    /// Creates a session advertising a custom SDP record and QoS policy.
    #[must_use]
    pub fn with_config(adapter: Arc<dyn Adapter>, sdp: SdpRecord, qos: QosPolicy) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            adapter,
            sdp,
            qos,
            state: SyncMutex::default(),
            weak: weak.clone(),
        })
    }

    /// Returns the current observable status projection.
    #[must_use]
    pub fn status(&self) -> LinkStatus {
        self.state.lock().status.clone()
    }

    /// Returns the authoritative session state.
    #[must_use]
    pub fn state(&self) -> ProfileState {
        self.state.lock().state
    }

    /// Returns true if the device link is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.lock().state == ProfileState::DeviceConnected
    }

    /// Binds the profile service and registers the app without a connect
    /// target; a later [`Self::link`] call supplies the device.
    pub fn prepare(&self) {
        let step = {
            let mut st = self.state.lock();
            match st.proxy.clone() {
                Some(_) if st.status.app_registered => Step::None,
                Some(proxy) => Step::Register(proxy),
                None => {
                    debug!("requesting HID Device profile proxy");
                    st.state = ProfileState::ProxyAcquiring;
                    st.status.last_error = None;
                    Step::Acquire(st.sink(&self.weak))
                }
            }
        };
        self.perform(step);
    }

    /// Starts or resumes the link to `dev`. Idempotent: depending on how far
    /// the session already got, only the missing steps are issued — a device
    /// connect when the app is registered (registering twice is rejected by
    /// the platform), an app registration when only the service is bound, or
    /// a proxy request after a cold start or service loss, with registration
    /// and connection chained from the callbacks.
    pub fn link(&self, dev: RemoteDevice) {
        let step = {
            let mut st = self.state.lock();
            st.dev = Some(dev.clone());
            match st.proxy.clone() {
                Some(proxy) if st.status.app_registered => {
                    debug!("connecting to {dev}");
                    st.state = ProfileState::DeviceConnecting;
                    st.status.last_error = None;
                    Step::Connect(proxy, dev)
                }
                Some(proxy) => Step::Register(proxy),
                None => {
                    debug!("requesting HID Device profile proxy");
                    st.state = ProfileState::ProxyAcquiring;
                    st.status.last_error = None;
                    Step::Acquire(st.sink(&self.weak))
                }
            }
        };
        self.perform(step);
    }

    /// Transmits one key-down report frame. Returns false without side
    /// effects unless the device link is up; a send while disconnected is
    /// dropped, not buffered.
    pub fn send_key_down(&self, report: &Report) -> bool {
        let (proxy, dev) = {
            let st = self.state.lock();
            if st.state != ProfileState::DeviceConnected {
                return false;
            }
            match (st.proxy.clone(), st.dev.clone()) {
                (Some(proxy), Some(dev)) => (proxy, dev),
                _ => return false,
            }
        };
        debug!(
            "sendReport id={} payload={:02X?}",
            report.id() as u8,
            report.as_ref()
        );
        let sent = proxy.send_report(&dev, report.id(), report.as_ref());
        if !sent {
            warn!("sendReport failed");
            self.state.lock().status.last_error = Some(Error::SendFailed);
        }
        sent
    }

    /// Transmits the all-zero remote-control report, releasing whatever key
    /// the host currently considers pressed.
    pub fn send_key_up(&self) -> bool {
        self.send_key_down(&Report::release(ReportId::Remote))
    }

    /// Unregisters the app, releases the proxy, and resets the session to
    /// its initial state. Safe from any state, including with a
    /// registration or connection callback in flight: advancing the
    /// generation invalidates every previously issued sink, so a late
    /// callback for the old proxy cannot resurrect the session.
    pub fn release(&self) {
        let (proxy, dev) = {
            let mut st = self.state.lock();
            st.generation += 1;
            let proxy = st.proxy.take();
            let dev = st.dev.take();
            st.reset(None);
            (proxy, dev)
        };
        let Some(proxy) = proxy else { return };
        if let Some(dev) = dev {
            let _ = proxy.disconnect(&dev);
        }
        let _ = proxy.unregister_app();
        self.adapter.close_proxy(&proxy);
        debug!("HID session released");
    }

    /// Issues `registerApp` with the service record, QoS policy, and the
    /// session callback sink.
    fn register(&self, proxy: &Arc<dyn HidDeviceProxy>) {
        let sink = {
            let mut st = self.state.lock();
            st.state = ProfileState::AppRegistering;
            st.sink(&self.weak)
        };
        debug!("registering HID app");
        if !proxy.register_app(&self.sdp, &self.qos, sink) {
            warn!("registerApp request rejected");
            let mut st = self.state.lock();
            st.state = ProfileState::ProxyConnected;
            st.status.last_error = Some(Error::RegistrationFailed);
        }
    }

    /// Issues the platform call decided under the state lock.
    fn perform(&self, step: Step) {
        match step {
            Step::None => {}
            Step::Acquire(sink) => {
                if !self.adapter.request_proxy(sink) {
                    error!("HID Device profile proxy unavailable");
                    let mut st = self.state.lock();
                    st.state = ProfileState::Unregistered;
                    st.status.last_error = Some(Error::ProxyUnavailable);
                }
            }
            Step::Register(proxy) => self.register(&proxy),
            Step::Connect(proxy, dev) => {
                if !proxy.connect(&dev) {
                    warn!("connect request rejected by {dev}");
                    let mut st = self.state.lock();
                    st.state = ProfileState::AppRegistered;
                    st.status.last_error = Some(Error::DeviceDisconnected);
                }
            }
        }
    }

    /// Applies one platform event to the state machine. Events tagged with
    /// a stale generation are discarded.
    fn handle_event(&self, generation: u64, event: Event) {
        let step = {
            let mut st = self.state.lock();
            if generation != st.generation {
                debug!("discarding stale event: {event:?}");
                return;
            }
            match event {
                Event::ProxyAcquired(proxy) => {
                    debug!("HID profile service bound");
                    st.state = ProfileState::ProxyConnected;
                    st.status.service_bound = true;
                    st.status.last_error = None;
                    st.proxy = Some(Arc::clone(&proxy));
                    Step::Register(proxy)
                }
                Event::ProxyLost => {
                    warn!("HID profile service lost");
                    st.generation += 1;
                    st.proxy = None;
                    st.reset(Some(Error::ServiceLost));
                    Step::None
                }
                Event::AppStatus { registered: true } => {
                    debug!("HID app registered");
                    st.state = ProfileState::AppRegistered;
                    st.status.app_registered = true;
                    st.status.last_error = None;
                    // Reconnect if a device is already held
                    match (st.proxy.clone(), st.dev.clone()) {
                        (Some(proxy), Some(dev)) => {
                            st.state = ProfileState::DeviceConnecting;
                            Step::Connect(proxy, dev)
                        }
                        _ => Step::None,
                    }
                }
                Event::AppStatus { registered: false } => {
                    warn!("HID app registration rejected");
                    st.state = ProfileState::ProxyConnected;
                    st.status.app_registered = false;
                    st.status.device_connected = false;
                    st.status.last_error = Some(Error::RegistrationFailed);
                    Step::None
                }
                Event::ConnectionState { dev, state } => {
                    debug!("HID link to {dev}: {state}");
                    match state {
                        ConnState::Connecting => st.state = ProfileState::DeviceConnecting,
                        ConnState::Connected => {
                            st.state = ProfileState::DeviceConnected;
                            st.status.device_connected = true;
                            st.status.last_error = None;
                        }
                        ConnState::Disconnecting => {}
                        ConnState::Disconnected => {
                            // Profile and app remain valid; only the link dropped
                            st.state = ProfileState::DeviceDisconnected;
                            st.status.device_connected = false;
                            st.status.last_error = Some(Error::DeviceDisconnected);
                        }
                    }
                    Step::None
                }
            }
        };
        self.perform(step);
    }
}
