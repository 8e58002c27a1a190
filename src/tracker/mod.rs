// Author: Dustin Pilgrim
// License: MIT

mod run;

#[cfg(test)]
mod tracker_tests;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};

use crate::core::{
    authority::{Authority, Confirm},
    error::TransitionError,
    status::StatusKey,
    store::{Session, StatusStore},
    sync::{SyncAgent, TransitionOutcome},
    tracker_msg::TrackerMsg,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub tick: Duration,
    pub resync: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            resync: Duration::from_secs(30),
        }
    }
}

/// Owns one session for its lifetime: the ticker, the resync task and
/// transition posts all report back through one channel, and only the run
/// loop writes the store.
pub struct Tracker {
    store: StatusStore,
    agent: SyncAgent,
    timing: Timing,

    /// Bumped when a transition starts and when it settles. A fetch sent
    /// under an older generation may predate the echo and is discarded.
    generation: Arc<AtomicU64>,

    tx: mpsc::Sender<TrackerMsg>,
    rx: mpsc::Receiver<TrackerMsg>,
}

impl Tracker {
    pub fn new(authority: Arc<dyn Authority>, timing: Timing) -> Self {
        let (tx, rx) = mpsc::channel::<TrackerMsg>(256);

        Self {
            store: StatusStore::new(),
            agent: SyncAgent::new(authority),
            timing,
            generation: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> TrackerHandle {
        TrackerHandle { tx: self.tx.clone() }
    }

    /// Every store write is published here.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.store.subscribe()
    }
}

/// What a UI holds to talk to a running tracker.
#[derive(Clone)]
pub struct TrackerHandle {
    tx: mpsc::Sender<TrackerMsg>,
}

impl TrackerHandle {
    pub async fn request(
        &self,
        status: StatusKey,
        confirm: Box<dyn Confirm + Send>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let (reply, rx) = oneshot::channel();

        self.tx
            .send(TrackerMsg::Request { status, confirm, reply })
            .await
            .map_err(|_| TransitionError::Closed)?;

        rx.await.map_err(|_| TransitionError::Closed)?
    }

    /// For callers on a plain thread (the stdin reader). Must not be called
    /// from inside the runtime.
    pub fn blocking_request(
        &self,
        status: StatusKey,
        confirm: Box<dyn Confirm + Send>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let (reply, rx) = oneshot::channel();

        self.tx
            .blocking_send(TrackerMsg::Request { status, confirm, reply })
            .map_err(|_| TransitionError::Closed)?;

        rx.blocking_recv().map_err(|_| TransitionError::Closed)?
    }

    pub async fn session(&self) -> Option<Session> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(TrackerMsg::GetSession { reply }).await.ok()?;
        rx.await.ok()
    }
}
