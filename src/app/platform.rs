// Author: Dustin Pilgrim
// License: MIT

use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

pub fn default_ledger_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("presence").join("ledger.json"))
}

// ---------------- single-instance lock ----------------

/// Sits beside the socket it guards: `presence.sock` -> `presence.lock`.
fn lock_path(socket: &Path) -> PathBuf {
    socket.with_extension("lock")
}

/// Held for the life of `serve`. A stale lock (nobody listening) is reclaimed.
pub fn acquire_single_instance_lock(socket: &Path) -> Result<UnixListener, String> {
    let path = lock_path(socket);
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match UnixListener::bind(&path) {
        Ok(l) => Ok(l),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => match UnixStream::connect(&path) {
            Ok(_) => Err(format!(
                "presence is already serving (another instance holds {})",
                path.display()
            )),
            Err(_) => {
                let _ = std::fs::remove_file(&path);
                UnixListener::bind(&path)
                    .map_err(|e| format!("failed to bind instance lock {}: {e}", path.display()))
            }
        },
        Err(e) => Err(format!("failed to bind instance lock {}: {e}", path.display())),
    }
}

pub fn release_single_instance_lock(socket: &Path) {
    let _ = std::fs::remove_file(lock_path(socket));
}
