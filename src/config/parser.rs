// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

use eyre::{Result, eyre};
use rune_cfg::RuneConfig;

use crate::config::PresenceConfig;
use crate::core::status::Role;

fn get_string(config: &RuneConfig, key: &str) -> Option<String> {
    config
        .get::<String>(&format!("presence.{key}"))
        .or_else(|_| config.get::<String>(&format!("presence.{}", key.replace('_', "-"))))
        .ok()
}

fn get_u64(config: &RuneConfig, key: &str) -> Option<u64> {
    config
        .get::<u64>(&format!("presence.{key}"))
        .or_else(|_| config.get::<u64>(&format!("presence.{}", key.replace('_', "-"))))
        .ok()
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

fn positive(config: &RuneConfig, key: &str, default: u64) -> Result<u64> {
    match get_u64(config, key) {
        Some(0) => Err(eyre!("presence.{key} must be at least 1")),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

pub fn parse_presence_config(config: &RuneConfig) -> Result<PresenceConfig> {
    let defaults = PresenceConfig::default();

    let role = get_string(config, "role")
        .map(|raw| raw.parse::<Role>().map_err(|e| eyre!("presence.role: {e}")))
        .transpose()?;

    let tick_seconds = positive(config, "tick_seconds", defaults.tick_seconds)?;
    let resync_seconds = positive(config, "resync_seconds", defaults.resync_seconds)?;

    let socket = get_string(config, "socket")
        .filter(|s| !s.trim().is_empty())
        .map(|s| expand_home(s.trim()));

    let ledger_file = get_string(config, "ledger_file")
        .filter(|s| !s.trim().is_empty())
        .map(|s| expand_home(s.trim()));

    Ok(PresenceConfig {
        role,
        tick_seconds,
        resync_seconds,
        socket,
        ledger_file,
    })
}
