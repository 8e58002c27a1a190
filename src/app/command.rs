// Author: Dustin Pilgrim
// License: MIT

use crate::app::AnyError;
use crate::app::prompt::TerminalConfirm;
use crate::app::render;
use crate::cli::Args;
use crate::config::PresenceConfig;
use crate::core::authority::{Authority, Confirm};
use crate::core::status::StatusKey;
use crate::core::store::StatusStore;
use crate::core::sync::{SyncAgent, SyncMode, TransitionOutcome};
use crate::ipc::client::IpcAuthority;
use std::sync::Arc;

fn authority(args: &Args, cfg: &PresenceConfig) -> Result<Arc<IpcAuthority>, AnyError> {
    Ok(Arc::new(IpcAuthority::new(super::resolve_socket(args, cfg)?)))
}

/// One-shot transition: sync once, then request. Anything that leaves the
/// status unchanged against the caller's wish is an error, so scripts can
/// tell from the exit code.
pub async fn set(
    args: &Args,
    cfg: &PresenceConfig,
    status: StatusKey,
    yes: bool,
) -> Result<(), AnyError> {
    let role = super::resolve_role(args, cfg)?;
    if !crate::core::permissions::allows(role, status) {
        return Err(format!("'{status}' is not available for role {role}").into());
    }

    let agent = SyncAgent::new(authority(args, cfg)?);
    let mut store = StatusStore::new();

    if !agent.fetch(&mut store, SyncMode::Initial).await {
        return Err("could not reach the authority".into());
    }

    let always = |_: &str| true;
    let confirm: &dyn Confirm = if yes { &always } else { &TerminalConfirm };

    match agent.request_transition(&mut store, status, confirm).await {
        Ok(TransitionOutcome::Applied(s)) => println!("{s}"),
        Ok(TransitionOutcome::Unchanged) => println!("Already {status}"),
        Ok(TransitionOutcome::Declined) => println!("Cancelled"),
        Err(e) => return Err(e.user_message().into()),
    }

    Ok(())
}

pub async fn info(args: &Args, cfg: &PresenceConfig, json: bool) -> Result<(), AnyError> {
    let role = super::resolve_role(args, cfg)?;

    match authority(args, cfg)?.fetch_current().await {
        Ok(snap) => {
            if json {
                println!("{}", render::info_json(role, &snap)?);
            } else {
                println!("Role: {role}");
                print!(
                    "{}",
                    render::durations_text(role, snap.current_status, &snap.durations)
                );
            }
        }
        Err(e) => {
            if json {
                // Status bars need valid JSON on stdout even when the daemon is down.
                println!("{}", serde_json::json!({ "msg": e.to_string() }));
            } else {
                eprintln!("presence: {e}");
            }
        }
    }

    Ok(())
}

pub fn options(args: &Args, cfg: &PresenceConfig) -> Result<(), AnyError> {
    let role = super::resolve_role(args, cfg)?;
    println!("{}", render::options_text(role));
    Ok(())
}
