// Author: Dustin Pilgrim
// License: MIT

use tokio::sync::oneshot;

use crate::core::{
    authority::Confirm,
    error::{AuthorityError, TransitionError},
    status::{Snapshot, StatusKey},
    store::Session,
    sync::{SyncMode, TransitionOutcome},
};

pub type TransitionReply = oneshot::Sender<Result<TransitionOutcome, TransitionError>>;

pub enum TrackerMsg {
    Tick,

    Synced {
        mode: SyncMode,
        /// Transition generation when the fetch was sent.
        generation: u64,
        result: Result<Snapshot, AuthorityError>,
    },

    Request {
        status: StatusKey,
        confirm: Box<dyn Confirm + Send>,
        reply: TransitionReply,
    },

    /// The Evaluation prompt was answered off the loop.
    Confirmed {
        status: StatusKey,
        accepted: bool,
        reply: TransitionReply,
    },

    TransitionDone {
        result: Result<Snapshot, AuthorityError>,
        reply: TransitionReply,
    },

    GetSession {
        reply: oneshot::Sender<Session>,
    },
}
