// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc::Sender, watch};
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::core::{authority::Authority, sync::SyncMode, tracker_msg::TrackerMsg};
use crate::pdebug;

/// Initial fetch, then one full refetch per `period` until shutdown. The
/// cadence does not drift with fetch latency.
pub async fn run_resync(
    authority: Arc<dyn Authority>,
    generation: Arc<AtomicU64>,
    tx: Sender<TrackerMsg>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut mode = SyncMode::Initial;
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticks.tick() => {}
            _ = shutdown.changed() => break,
        }

        if *shutdown.borrow() {
            break;
        }

        let sent_at = generation.load(Ordering::SeqCst);
        let result = tokio::select! {
            r = authority.fetch_current() => r,
            _ = shutdown.changed() => break,
        };

        // A fetch that lands after teardown is dropped, never applied.
        if *shutdown.borrow() {
            pdebug!("Sync", "dropping {:?} sync result (tracker stopped)", mode);
            break;
        }

        let msg = TrackerMsg::Synced {
            mode,
            generation: sent_at,
            result,
        };
        if tx.send(msg).await.is_err() {
            pdebug!("Sync", "resync stopping (receiver dropped)");
            break;
        }

        mode = SyncMode::Periodic;
    }

    pdebug!("Sync", "resync stopped");
}
