// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use crate::core::authority::{Authority, Confirm};
use crate::core::error::{AuthorityError, TransitionError};
use crate::core::status::{Snapshot, StatusKey};
use crate::core::store::StatusStore;
use crate::{pdebug, pinfo, pwarn};

pub const EVALUATION_PROMPT: &str = "Requesting 'Evaluation'. Proceed?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Initial,
    Periodic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Already in the requested status; nothing was sent.
    Unchanged,

    /// The confirmation prompt was declined; nothing was sent.
    Declined,

    /// The authority accepted and echoed this status.
    Applied(StatusKey),
}

/// Result of the pre-flight checks of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Busy is now set; the caller must post and then call `finish_transition`.
    Proceed,

    /// Busy is now set, but the user must agree first. Ask
    /// `EVALUATION_PROMPT`, then settle with `answer_prompt`.
    Confirm,

    Done(TransitionOutcome),
}

/// Moves authoritative data into a `StatusStore`.
#[derive(Clone)]
pub struct SyncAgent {
    authority: Arc<dyn Authority>,
}

impl SyncAgent {
    pub fn new(authority: Arc<dyn Authority>) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> Arc<dyn Authority> {
        Arc::clone(&self.authority)
    }

    /// Fetch and apply. Returns whether the store was updated.
    pub async fn fetch(&self, store: &mut StatusStore, mode: SyncMode) -> bool {
        let result = self.authority.fetch_current().await;
        Self::apply_fetch(store, result, mode)
    }

    /// A failed fetch leaves the store as it was; the next resync heals it.
    pub fn apply_fetch(
        store: &mut StatusStore,
        result: Result<Snapshot, AuthorityError>,
        mode: SyncMode,
    ) -> bool {
        match result {
            Ok(snap) => {
                pdebug!(
                    "Sync",
                    "{:?} sync: {} ({} buckets)",
                    mode,
                    snap.current_status,
                    snap.durations.iter().count()
                );
                store.apply_snapshot(snap.current_status, snap.durations);
                true
            }
            Err(e) => {
                pwarn!("Sync", "{:?} sync failed: {}", mode, e);
                false
            }
        }
    }

    /// Busy, then same status. Anything past those marks the store busy, so
    /// a second request is refused while a prompt is still open.
    pub fn check_transition(store: &mut StatusStore, status: StatusKey) -> Result<Gate, TransitionError> {
        if store.is_busy() {
            pdebug!("Sync", "transition to {} rejected: busy", status);
            return Err(TransitionError::Busy);
        }

        if status == store.current_status() {
            return Ok(Gate::Done(TransitionOutcome::Unchanged));
        }

        store.set_busy(true);

        if status == StatusKey::Evaluation {
            Ok(Gate::Confirm)
        } else {
            Ok(Gate::Proceed)
        }
    }

    /// Settles a `Gate::Confirm`. A decline clears busy and sends nothing.
    pub fn answer_prompt(store: &mut StatusStore, status: StatusKey, accepted: bool) -> Gate {
        if accepted {
            return Gate::Proceed;
        }

        pinfo!("Sync", "transition to {} declined", status);
        store.set_busy(false);
        Gate::Done(TransitionOutcome::Declined)
    }

    /// `check_transition` with the prompt answered inline.
    pub fn begin_transition(
        store: &mut StatusStore,
        status: StatusKey,
        confirm: &dyn Confirm,
    ) -> Result<Gate, TransitionError> {
        match Self::check_transition(store, status)? {
            Gate::Confirm => Ok(Self::answer_prompt(store, status, confirm.confirm(EVALUATION_PROMPT))),
            gate => Ok(gate),
        }
    }

    /// Clears busy, then applies the echo or reports the failure. The session
    /// is untouched on failure.
    pub fn finish_transition(
        store: &mut StatusStore,
        result: Result<Snapshot, AuthorityError>,
    ) -> Result<TransitionOutcome, TransitionError> {
        store.set_busy(false);

        match result {
            Ok(snap) => {
                let status = snap.current_status;
                store.apply_snapshot(status, snap.durations);
                pinfo!("Sync", "status changed to {}", status);
                Ok(TransitionOutcome::Applied(status))
            }
            Err(e) => {
                pwarn!("Sync", "transition failed: {}", e);
                Err(TransitionError::Failed(e))
            }
        }
    }

    pub async fn request_transition(
        &self,
        store: &mut StatusStore,
        status: StatusKey,
        confirm: &dyn Confirm,
    ) -> Result<TransitionOutcome, TransitionError> {
        match Self::begin_transition(store, status, confirm)? {
            Gate::Done(outcome) => Ok(outcome),
            Gate::Confirm | Gate::Proceed => {
                let result = self.authority.post_transition(status).await;
                Self::finish_transition(store, result)
            }
        }
    }
}
