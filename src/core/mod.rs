// Author: Dustin Pilgrim
// License: MIT

pub mod authority;
pub mod error;
pub mod format;
pub mod ledger;
pub mod permissions;
pub mod status;
pub mod store;
pub mod sync;
pub mod thresholds;
pub mod tracker_msg;

#[cfg(test)]
pub mod testing;
