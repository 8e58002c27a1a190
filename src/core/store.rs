// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::watch;

use crate::core::status::{DurationMap, StatusKey};

/// What a renderer sees: current status, today's durations, and whether a
/// transition is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub status: StatusKey,
    pub durations: DurationMap,
    pub busy: bool,
}

/// Sole owner of the session. Every write is republished to subscribers.
pub struct StatusStore {
    session: Session,
    tx: watch::Sender<Session>,
}

impl StatusStore {
    pub fn new() -> Self {
        let session = Session::default();
        let (tx, _rx) = watch::channel(session.clone());
        Self { session, tx }
    }

    pub fn current_status(&self) -> StatusKey {
        self.session.status
    }

    pub fn durations(&self) -> &DurationMap {
        &self.session.durations
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_busy(&self) -> bool {
        self.session.busy
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Authoritative write: replaces status and the whole duration map.
    pub fn apply_snapshot(&mut self, status: StatusKey, durations: DurationMap) {
        self.session.status = status;
        self.session.durations = durations;
        self.publish();
    }

    /// Speculative write: one second into the active bucket. Offline does not
    /// accrue locally.
    pub fn increment_active(&mut self) {
        let status = self.session.status;
        if status == StatusKey::Offline {
            return;
        }
        self.session.durations.add(status, 1);
        self.publish();
    }

    pub fn set_busy(&mut self, busy: bool) {
        if self.session.busy != busy {
            self.session.busy = busy;
            self.publish();
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.session.clone());
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}
