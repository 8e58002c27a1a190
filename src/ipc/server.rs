// Author: Dustin Pilgrim
// License: MIT

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    sync::watch,
    task::JoinHandle,
    time::{Duration, timeout},
};

use crate::core::ledger::SharedLedger;
use crate::{pdebug, perror, pinfo};

use super::router::route_command;

const MAX_REQUEST_BYTES: u64 = 256;

/// Serves the ledger on `listener` until `shutdown` turns true.
pub fn spawn_ipc_server(
    ledger: SharedLedger,
    listener: UnixListener,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let accepted = tokio::select! {
                a = listener.accept() => a,
                _ = shutdown.changed() => break,
            };

            match accepted {
                Ok((mut stream, _addr)) => {
                    let ledger = ledger.clone();

                    tokio::spawn(async move {
                        let result =
                            timeout(Duration::from_secs(10), handle_connection(&mut stream, &ledger)).await;

                        match result {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => perror!("IPC", "Error handling IPC connection: {}", e),
                            Err(_) => perror!("IPC", "IPC connection timed out after 10 seconds"),
                        }

                        let _ = stream.shutdown().await;
                    });
                }
                Err(e) => perror!("IPC", "Failed to accept IPC connection: {}", e),
            }
        }

        pinfo!("IPC", "ipc server stopped");
    })
}

async fn handle_connection(stream: &mut UnixStream, ledger: &SharedLedger) -> std::io::Result<()> {
    let mut buf = Vec::new();
    (&mut *stream).take(MAX_REQUEST_BYTES).read_to_end(&mut buf).await?;

    if buf.is_empty() {
        return Ok(());
    }

    let cmd = String::from_utf8_lossy(&buf).trim().to_string();
    pdebug!("IPC", "Received IPC command: {}", cmd);

    let response = route_command(&cmd, ledger).await;

    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    Ok(())
}
