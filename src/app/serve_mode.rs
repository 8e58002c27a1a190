// Author: Dustin Pilgrim
// License: MIT

use std::io;
use std::path::PathBuf;

use tokio::net::UnixListener;
use tokio::signal::unix::{SignalKind, signal};

use crate::app::AnyError;
use crate::cli::Args;
use crate::config::PresenceConfig;
use crate::core::ledger::{Ledger, SharedLedger};
use crate::ipc::server::spawn_ipc_server;
use crate::{perror, pinfo, pwarn};

fn load_ledger(args: &Args, cfg: &PresenceConfig) -> Result<(Ledger, Option<PathBuf>), AnyError> {
    let role = super::resolve_role(args, cfg)?;
    let path = cfg.ledger_file.clone().or_else(super::platform::default_ledger_path);
    let now = chrono::Local::now().naive_local();

    let ledger = match path.as_deref().map(Ledger::load) {
        Some(Ok(Some(record))) => {
            pinfo!("Ledger", "restored ledger ({} since {})", record.status, record.since);
            Ledger::from_record(role, record)
        }
        Some(Ok(None)) | None => Ledger::new(role, now),
        Some(Err(e)) => {
            pwarn!("Ledger", "ledger file unreadable, starting fresh: {}", e);
            Ledger::new(role, now)
        }
    };

    Ok((ledger, path))
}

pub async fn run(args: &Args, cfg: &PresenceConfig) -> Result<(), AnyError> {
    let socket = super::resolve_socket(args, cfg)?;
    let _instance_lock = super::platform::acquire_single_instance_lock(&socket)
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))?;

    let (ledger, ledger_path) = load_ledger(args, cfg)?;
    pinfo!(
        "Serve",
        "authority starting for role {} (day {})",
        ledger.role(),
        ledger.record().day
    );

    let ledger = SharedLedger::new(ledger, ledger_path);

    if let Some(parent) = socket.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if socket.exists() {
        let _ = std::fs::remove_file(&socket);
    }

    let listener = UnixListener::bind(&socket)?;
    pinfo!("IPC", "listening on {}", socket.display());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let server = spawn_ipc_server(ledger.clone(), listener, shutdown_rx);

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => pinfo!("Serve", "received Ctrl+C, shutting down"),
        _ = sigterm.recv() => pinfo!("Serve", "received SIGTERM, shutting down"),
    }

    let _ = shutdown_tx.send(true);
    let _ = server.await;

    if let Err(e) = ledger.save().await {
        perror!("Ledger", "failed to save ledger: {}", e);
    }

    let _ = std::fs::remove_file(&socket);
    super::platform::release_single_instance_lock(&socket);

    Ok(())
}
