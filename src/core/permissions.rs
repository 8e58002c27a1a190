// Author: Dustin Pilgrim
// License: MIT

//! Which statuses each role is offered.
//!
//! This only shapes the menu a tracker presents. The ledger checks the same
//! table again on every transition it accepts.

use crate::core::status::{Role, StatusKey};

const EVERYONE: [StatusKey; 4] = [
    StatusKey::Online,
    StatusKey::Break,
    StatusKey::LunchTime,
    StatusKey::Offline,
];

/// Statuses `role` may select, in display order.
pub fn offered(role: Role) -> Vec<StatusKey> {
    StatusKey::ALL
        .into_iter()
        .filter(|s| allows(role, *s))
        .collect()
}

pub fn allows(role: Role, status: StatusKey) -> bool {
    match role {
        Role::Employee => true,
        Role::BranchManager | Role::Hr => EVERYONE.contains(&status),
    }
}
