// Author: Dustin Pilgrim
// License: MIT

pub mod command;
pub mod platform;
pub mod prompt;
pub mod render;
pub mod serve_mode;
pub mod watch_mode;

use std::io;
use std::path::PathBuf;

use crate::cli::Args;
use crate::config::PresenceConfig;
use crate::core::status::Role;

pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// `--role` wins over `presence.role`.
pub fn resolve_role(args: &Args, cfg: &PresenceConfig) -> Result<Role, AnyError> {
    args.role.or(cfg.role).ok_or_else(|| {
        Box::new(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no role configured: pass --role or set presence.role",
        )) as AnyError
    })
}

pub fn resolve_socket(args: &Args, cfg: &PresenceConfig) -> Result<PathBuf, AnyError> {
    if let Some(p) = args.socket.clone().or_else(|| cfg.socket.clone()) {
        return Ok(p);
    }

    crate::ipc::socket_path().map_err(|e| Box::new(io::Error::new(io::ErrorKind::NotFound, e)) as AnyError)
}
