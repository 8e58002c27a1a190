// Author: Dustin Pilgrim
// License: MIT

pub mod client;
pub mod router;
pub mod server;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::AuthorityError;
use crate::core::status::Snapshot;

pub fn runtime_dir() -> Result<PathBuf, String> {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| "XDG_RUNTIME_DIR is not set".to_string())
}

pub fn socket_path() -> Result<PathBuf, String> {
    Ok(runtime_dir()?.join("presence").join("presence.sock"))
}

/// Body of every `current` / `status` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Error { msg: String },
    Snapshot(Snapshot),
}

impl Reply {
    pub fn error(msg: impl Into<String>) -> Self {
        Reply::Error { msg: msg.into() }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "msg": format!("encode failed: {e}") }).to_string())
    }
}

pub fn decode_reply(raw: &str) -> Result<Snapshot, AuthorityError> {
    match serde_json::from_str::<Reply>(raw.trim()) {
        Ok(Reply::Snapshot(snap)) => Ok(snap),
        Ok(Reply::Error { msg }) => Err(AuthorityError::Rejected { message: Some(msg) }),
        Err(e) => Err(AuthorityError::Protocol(format!("{e}: {}", raw.trim()))),
    }
}
