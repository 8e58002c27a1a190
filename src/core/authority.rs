// Author: Dustin Pilgrim
// License: MIT

use futures::future::BoxFuture;

use crate::core::error::AuthorityError;
use crate::core::status::{Snapshot, StatusKey};

/// The remote source of truth for status and durations.
///
/// Implementations must validate the caller's role on every
/// `post_transition`; the tracker's menu filtering is not a security check.
pub trait Authority: Send + Sync {
    fn fetch_current(&self) -> BoxFuture<'_, Result<Snapshot, AuthorityError>>;

    fn post_transition(&self, status: StatusKey) -> BoxFuture<'_, Result<Snapshot, AuthorityError>>;
}

/// Synchronous yes/no prompt used to gate sensitive transitions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
