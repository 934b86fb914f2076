//! Remote-control key event adapter.
//!
//! Translates discrete UI key events into remote-control input reports,
//! with release bookkeeping that guarantees at most one outstanding pressed
//! key per adapter: the host never sees two key-down reports without an
//! intervening release.

use std::sync::Arc;

use btremote_hid::remote;
use btremote_hid::usage::Consumer;

use crate::session::Session;
use crate::SyncMutex;

/// Key-event adapter feeding a [`Session`].
#[derive(Debug)]
pub struct RemoteControl {
    session: Arc<Session>,
    pending: SyncMutex<Pending>,
}

/// At most one outstanding pressed key; cleared on key-up or disconnect.
#[derive(Debug, Default)]
struct Pending {
    key: Option<Consumer>,
    long_press: bool,
}

impl RemoteControl {
    /// Creates an adapter for `session`.
    #[must_use]
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            pending: SyncMutex::default(),
        }
    }

    /// Handles a key press. Any key still pending is released first, then
    /// the new key-down is sent and recorded. Returns false — and drops any
    /// pending state — when no device link is up; callers are expected to
    /// suppress input while disconnected.
    pub fn key_down(&self, key: Consumer) -> bool {
        let mut p = self.pending.lock();
        if !self.session.is_connected() {
            *p = Pending::default();
            return false;
        }
        if p.key.take().is_some() {
            let _ = self.session.send_key_up();
        }
        let Ok(report) = remote::input(key as u16) else {
            return false;
        };
        let sent = self.session.send_key_down(&report);
        if sent {
            p.key = Some(key);
        }
        sent
    }

    /// Handles a key release: sends the all-zero report if a key is pending
    /// and clears it. No-op otherwise.
    pub fn key_up(&self) -> bool {
        let mut p = self.pending.lock();
        p.long_press = false;
        if p.key.take().is_none() {
            return false;
        }
        self.session.send_key_up()
    }

    /// Discrete tap: press immediately followed by release.
    pub fn click(&self, key: Consumer) -> bool {
        self.key_down(key) && self.key_up()
    }

    /// Continuous hold: press and mark the long-press flag. The caller owns
    /// repeat timing and ends the hold with [`Self::key_up`].
    pub fn long_press(&self, key: Consumer) -> bool {
        let sent = self.key_down(key);
        if sent {
            self.pending.lock().long_press = true;
        }
        sent
    }

    /// True while a long-press hold is active.
    #[must_use]
    pub fn is_long_press(&self) -> bool {
        self.pending.lock().long_press
    }

    /// Key currently held down, if any.
    #[must_use]
    pub fn pending_key(&self) -> Option<Consumer> {
        self.pending.lock().key
    }
}

#[cfg(test)]
mod tests {
    use btremote_hid::ReportId;

    use crate::dev::RemoteDevice;
    use crate::stack::fake::FakeStack;
    use crate::stack::ConnState;

    use super::*;

    fn connected() -> (Arc<FakeStack>, RemoteControl) {
        let fake = FakeStack::new();
        let s = Session::new(fake.adapter());
        let dev = RemoteDevice::new("AA:BB:CC:DD:EE:FF".parse().unwrap(), "Glasses");
        s.link(dev.clone());
        fake.grant_proxy();
        fake.app_status(true);
        fake.conn_state(&dev, ConnState::Connected);
        (fake, RemoteControl::new(s))
    }

    fn remote_payloads(fake: &FakeStack) -> Vec<Vec<u8>> {
        let calls = fake.calls.lock();
        calls
            .sent
            .iter()
            .map(|(id, payload)| {
                assert_eq!(*id, ReportId::Remote);
                payload.clone()
            })
            .collect()
    }

    #[test]
    fn down_up() {
        let (fake, rc) = connected();
        assert!(rc.key_down(Consumer::MenuUp));
        assert_eq!(rc.pending_key(), Some(Consumer::MenuUp));
        assert!(rc.key_up());
        assert_eq!(rc.pending_key(), None);
        assert_eq!(
            remote_payloads(&fake),
            [vec![0x42, 0x00], vec![0x00, 0x00]]
        );
    }

    /// A second key-down with no intervening key-up releases the first key
    /// exactly once before the new down report.
    #[test]
    fn down_down_inserts_release() {
        let (fake, rc) = connected();
        assert!(rc.key_down(Consumer::MenuUp));
        assert!(rc.key_down(Consumer::MenuDown));
        assert_eq!(rc.pending_key(), Some(Consumer::MenuDown));
        assert_eq!(
            remote_payloads(&fake),
            [
                vec![0x42, 0x00], // MenuUp down
                vec![0x00, 0x00], // release
                vec![0x43, 0x00], // MenuDown down
            ]
        );
    }

    #[test]
    fn key_up_without_down_is_noop() {
        let (fake, rc) = connected();
        assert!(!rc.key_up());
        assert!(fake.calls.lock().sent.is_empty());
    }

    #[test]
    fn click() {
        let (fake, rc) = connected();
        assert!(rc.click(Consumer::Back));
        assert_eq!(rc.pending_key(), None);
        assert!(!rc.is_long_press());
        assert_eq!(
            remote_payloads(&fake),
            [vec![0x24, 0x02], vec![0x00, 0x00]]
        );
    }

    #[test]
    fn long_press_flag() {
        let (_fake, rc) = connected();
        assert!(rc.long_press(Consumer::VolumeUp));
        assert!(rc.is_long_press());
        assert_eq!(rc.pending_key(), Some(Consumer::VolumeUp));
        assert!(rc.key_up());
        assert!(!rc.is_long_press());
    }

    #[test]
    fn disconnected_drops_pending() {
        let (fake, rc) = connected();
        assert!(rc.key_down(Consumer::MenuPick));

        let dev = RemoteDevice::new("AA:BB:CC:DD:EE:FF".parse().unwrap(), "Glasses");
        fake.conn_state(&dev, ConnState::Disconnected);
        let sent_before = fake.calls.lock().sent.len();

        assert!(!rc.key_down(Consumer::MenuUp));
        assert_eq!(rc.pending_key(), None);
        assert!(!rc.key_up()); // pending already cleared, nothing to send
        assert_eq!(fake.calls.lock().sent.len(), sent_before);
    }
}
