// Author: Dustin Pilgrim
// License: MIT

pub mod resync;
pub mod ticker;
