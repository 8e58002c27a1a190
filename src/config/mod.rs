// Author: Dustin Pilgrim
// License: MIT

pub mod parser;

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use rune_cfg::RuneConfig;

use crate::core::status::Role;
use crate::tracker::Timing;
use crate::{pdebug, pinfo};

const DEFAULT_CONFIG: &str = include_str!("default.rune");

#[derive(Debug, Clone, PartialEq)]
pub struct PresenceConfig {
    /// Role of the worker this machine tracks. Also the role the authority
    /// validates transitions against.
    pub role: Option<Role>,
    pub tick_seconds: u64,
    pub resync_seconds: u64,
    pub socket: Option<PathBuf>,
    pub ledger_file: Option<PathBuf>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            role: None,
            tick_seconds: 1,
            resync_seconds: 30,
            socket: None,
            ledger_file: None,
        }
    }
}

impl PresenceConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            tick: Duration::from_secs(self.tick_seconds),
            resync: Duration::from_secs(self.resync_seconds),
        }
    }
}

/// First existing of `~/.config/presence/presence.rune` and
/// `/etc/presence/presence.rune`.
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let user_path = dirs::config_dir().map(|p| p.join("presence").join("presence.rune"));
    let system_path = PathBuf::from("/etc/presence/presence.rune");

    user_path
        .into_iter()
        .chain(std::iter::once(system_path))
        .find(|p| p.exists())
}

/// Loads `explicit` if given, else the first default location, else the
/// embedded defaults.
pub fn load(explicit: Option<&Path>) -> Result<PresenceConfig> {
    let path = match explicit {
        Some(p) if !p.exists() => {
            return Err(eyre::eyre!("config file not found: {}", p.display()));
        }
        Some(p) => Some(p.to_path_buf()),
        None => resolve_default_config_path(),
    };

    let config = match &path {
        Some(path) => {
            let cfg = RuneConfig::from_file(path)
                .wrap_err_with(|| format!("failed to load config from {}", path.display()))?;
            pinfo!("Config", "loaded config from {}", path.display());
            cfg
        }
        None => {
            pdebug!("Config", "using internal default configuration");
            RuneConfig::from_str(DEFAULT_CONFIG)
                .wrap_err("failed to parse internal default config")?
        }
    };

    parser::parse_presence_config(&config)
}
