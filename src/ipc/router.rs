// Author: Dustin Pilgrim
// License: MIT

use crate::core::ledger::SharedLedger;
use crate::core::status::StatusKey;
use crate::{pdebug, pwarn};

use super::Reply;

/// Routes one IPC request to the ledger and returns the raw reply.
pub async fn route_command(cmd: &str, ledger: &SharedLedger) -> String {
    match cmd {
        "ping" => "pong".to_string(),

        "current" => Reply::Snapshot(ledger.current().await).encode(),

        cmd if cmd.starts_with("status ") => {
            let arg = cmd.strip_prefix("status ").unwrap_or("").trim();

            let status = match arg.parse::<StatusKey>() {
                Ok(s) => s,
                Err(e) => return Reply::error(e).encode(),
            };

            pdebug!("IPC", "transition requested: {}", status);

            match ledger.transition(status).await {
                Ok(snap) => Reply::Snapshot(snap).encode(),
                Err(e) => Reply::error(e.to_string()).encode(),
            }
        }

        _ => {
            pwarn!("IPC", "Unknown IPC command: {}", cmd);
            Reply::error(format!("Unknown command '{cmd}'")).encode()
        }
    }
}
