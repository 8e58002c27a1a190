// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use crate::core::status::{Role, StatusKey};

/// Shown when the authority rejects a transition without saying why.
pub const FALLBACK_TRANSITION_MESSAGE: &str = "Failed to change status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    /// The authority answered and refused; it may say why.
    Rejected { message: Option<String> },

    /// Transport failure: socket missing, timeout, broken pipe.
    Unreachable(String),

    /// The authority answered with something we could not decode.
    Protocol(String),
}

impl AuthorityError {
    pub fn rejected(message: impl Into<String>) -> Self {
        AuthorityError::Rejected { message: Some(message.into()) }
    }

    /// Message to surface to the user: the authority's own, if it gave one.
    pub fn user_message(&self) -> &str {
        match self {
            AuthorityError::Rejected { message: Some(m) } if !m.trim().is_empty() => m,
            _ => FALLBACK_TRANSITION_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Another transition is still in flight.
    Busy,

    /// The tracker that owned the session is gone.
    Closed,

    Failed(AuthorityError),
}

impl TransitionError {
    pub fn user_message(&self) -> String {
        match self {
            TransitionError::Failed(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    NotPermitted { role: Role, status: StatusKey },
}

// ---------------- Display ----------------

impl fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorityError::Rejected { message: Some(m) } => write!(f, "rejected: {m}"),
            AuthorityError::Rejected { message: None } => write!(f, "rejected"),
            AuthorityError::Unreachable(e) => write!(f, "authority unreachable: {e}"),
            AuthorityError::Protocol(e) => write!(f, "bad reply from authority: {e}"),
        }
    }
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::Busy => write!(f, "a status change is already in progress"),
            TransitionError::Closed => write!(f, "tracker is not running"),
            TransitionError::Failed(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::NotPermitted { role, status } => {
                write!(f, "Role {role} may not select '{status}'")
            }
        }
    }
}

impl std::error::Error for AuthorityError {}
impl std::error::Error for TransitionError {}
impl std::error::Error for LedgerError {}
