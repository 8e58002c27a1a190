// Author: Dustin Pilgrim
// License: MIT

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::UnixStream,
    time::{Duration, timeout},
};

use crate::core::authority::Authority;
use crate::core::error::AuthorityError;
use crate::core::status::{Snapshot, StatusKey};

use super::decode_reply;

pub async fn send_raw(path: &Path, cmd: &str) -> Result<String, String> {
    if !path.exists() {
        return Err("authority daemon not running".to_string());
    }

    let mut stream = match timeout(Duration::from_secs(2), UnixStream::connect(path)).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(format!("failed to connect to {}: {e}", path.display())),
        Err(_) => return Err("timeout connecting to daemon".to_string()),
    };

    timeout(Duration::from_secs(2), stream.write_all(cmd.as_bytes()))
        .await
        .map_err(|_| "timeout writing to daemon".to_string())?
        .map_err(|e| format!("write failed: {e}"))?;

    timeout(Duration::from_secs(2), stream.shutdown())
        .await
        .map_err(|_| "timeout finalizing request".to_string())?
        .map_err(|e| format!("shutdown failed: {e}"))?;

    let mut resp = Vec::new();
    timeout(Duration::from_secs(2), stream.read_to_end(&mut resp))
        .await
        .map_err(|_| "timeout reading response".to_string())?
        .map_err(|e| format!("read failed: {e}"))?;

    Ok(String::from_utf8_lossy(&resp).to_string())
}

/// The authority daemon, reached over its Unix socket.
pub struct IpcAuthority {
    path: PathBuf,
}

impl IpcAuthority {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn call(&self, cmd: &str) -> Result<Snapshot, AuthorityError> {
        let raw = send_raw(&self.path, cmd)
            .await
            .map_err(AuthorityError::Unreachable)?;
        decode_reply(&raw)
    }
}

impl Authority for IpcAuthority {
    fn fetch_current(&self) -> BoxFuture<'_, Result<Snapshot, AuthorityError>> {
        Box::pin(self.call("current"))
    }

    fn post_transition(&self, status: StatusKey) -> BoxFuture<'_, Result<Snapshot, AuthorityError>> {
        Box::pin(async move { self.call(&format!("status {}", status.wire_name())).await })
    }
}
