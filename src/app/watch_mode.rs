// Author: Dustin Pilgrim
// License: MIT

use std::io::{self, BufRead};
use std::sync::Arc;

use tokio::sync::watch;

use crate::app::AnyError;
use crate::app::prompt::TerminalConfirm;
use crate::app::render;
use crate::cli::Args;
use crate::config::PresenceConfig;
use crate::core::permissions;
use crate::core::status::{Role, StatusKey};
use crate::core::store::Session;
use crate::core::sync::TransitionOutcome;
use crate::ipc::client::IpcAuthority;
use crate::tracker::{Tracker, TrackerHandle};
use crate::{pdebug, pinfo};

pub async fn run(args: &Args, cfg: &PresenceConfig) -> Result<(), AnyError> {
    let role = super::resolve_role(args, cfg)?;
    let socket = super::resolve_socket(args, cfg)?;

    let authority = Arc::new(IpcAuthority::new(socket));
    let tracker = Tracker::new(authority, cfg.timing());
    let handle = tracker.handle();
    let sessions = tracker.subscribe();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let tracker_task = tokio::spawn(tracker.run(shutdown_rx.clone()));
    let render_task = tokio::spawn(render_changes(sessions, shutdown_rx.clone()));

    println!("Options: {}", render::options_text(role).replace('\n', ", "));
    println!("Type a status to switch, an empty line for today's totals, q to quit.");

    {
        let shutdown_tx = shutdown_tx.clone();
        let rt = tokio::runtime::Handle::current();
        std::thread::spawn(move || read_commands(role, handle, rt, shutdown_tx));
    }

    let mut quit = shutdown_rx;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => pinfo!("Watch", "received Ctrl+C, shutting down"),
        _ = quit.wait_for(|stop| *stop) => {}
    }

    let _ = shutdown_tx.send(true);
    let _ = tracker_task.await;
    let _ = render_task.await;

    Ok(())
}

/// Prints whenever the status or the busy flag changes. Ticks alone stay quiet.
async fn render_changes(mut sessions: watch::Receiver<Session>, mut shutdown: watch::Receiver<bool>) {
    let mut last: Option<(StatusKey, bool)> = None;

    loop {
        let seen = {
            let s = sessions.borrow_and_update();
            let key = (s.status, s.busy);
            (last != Some(key)).then(|| (key, render::status_line(&s)))
        };

        if let Some((key, line)) = seen {
            println!("{line}");
            last = Some(key);
        }

        tokio::select! {
            changed = sessions.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// Runs on its own thread: stdin is blocking, and so is `blocking_request`.
fn read_commands(
    role: Role,
    handle: TrackerHandle,
    rt: tokio::runtime::Handle,
    shutdown_tx: watch::Sender<bool>,
) {
    let stdin = io::stdin();

    loop {
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let input = line.trim();
        match input {
            "" => {
                if let Some(s) = rt.block_on(handle.session()) {
                    print!("{}", render::durations_text(role, s.status, &s.durations));
                }
                continue;
            }
            "q" | "quit" | "exit" => break,
            _ => {}
        }

        let status = match input.parse::<StatusKey>() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        if !permissions::allows(role, status) {
            eprintln!("'{status}' is not available for role {role}");
            continue;
        }

        pdebug!("Watch", "requesting {}", status);
        match handle.blocking_request(status, Box::new(TerminalConfirm)) {
            Ok(TransitionOutcome::Applied(_)) => {}
            Ok(TransitionOutcome::Unchanged) => println!("Already {status}"),
            Ok(TransitionOutcome::Declined) => println!("Cancelled"),
            Err(e) => eprintln!("{}", e.user_message()),
        }
    }

    let _ = shutdown_tx.send(true);
}
