// Author: Dustin Pilgrim
// License: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio::sync::Notify;
use tokio::time::{Duration, sleep};

use crate::core::authority::Authority;
use crate::core::error::AuthorityError;
use crate::core::status::{Snapshot, StatusKey};

/// In-memory authority with call counters and injectable failures.
#[derive(Default)]
pub struct FakeAuthority {
    snapshot: Mutex<Snapshot>,
    fetch_error: Mutex<Option<AuthorityError>>,
    post_error: Mutex<Option<AuthorityError>>,
    post_gate: Option<Arc<Notify>>,
    fetch_gate: Option<Arc<Notify>>,
    fetch_delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
    posts: AtomicUsize,
}

impl FakeAuthority {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Default::default()
        }
    }

    /// Posts park until the returned `Notify` is signalled.
    pub fn gated(snapshot: Snapshot) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let fake = Self {
            snapshot: Mutex::new(snapshot),
            post_gate: Some(Arc::clone(&gate)),
            ..Default::default()
        };
        (fake, gate)
    }

    /// Fetches read the snapshot, then park until the returned `Notify` is
    /// signalled, so they answer with what was current when they were sent.
    pub fn gated_fetch(snapshot: Snapshot) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let fake = Self {
            snapshot: Mutex::new(snapshot),
            fetch_gate: Some(Arc::clone(&gate)),
            ..Default::default()
        };
        (fake, gate)
    }

    pub fn set_snapshot(&self, snapshot: Snapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    pub fn fail_fetch(&self, e: Option<AuthorityError>) {
        *self.fetch_error.lock().unwrap() = e;
    }

    pub fn fail_post(&self, e: Option<AuthorityError>) {
        *self.post_error.lock().unwrap() = e;
    }

    /// Every fetch takes `delay` to answer.
    pub fn delay_fetch(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }
}

impl Authority for FakeAuthority {
    fn fetch_current(&self) -> BoxFuture<'_, Result<Snapshot, AuthorityError>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let result = match self.fetch_error.lock().unwrap().clone() {
                Some(e) => Err(e),
                None => Ok(self.snapshot.lock().unwrap().clone()),
            };
            let delay = *self.fetch_delay.lock().unwrap();
            if let Some(d) = delay {
                sleep(d).await;
            }
            if let Some(gate) = &self.fetch_gate {
                gate.notified().await;
            }
            result
        })
    }

    fn post_transition(&self, status: StatusKey) -> BoxFuture<'_, Result<Snapshot, AuthorityError>> {
        Box::pin(async move {
            self.posts.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.post_gate {
                gate.notified().await;
            }
            if let Some(e) = self.post_error.lock().unwrap().clone() {
                return Err(e);
            }
            let mut snap = self.snapshot.lock().unwrap();
            snap.current_status = status;
            Ok(snap.clone())
        })
    }
}
