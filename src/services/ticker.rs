// Author: Dustin Pilgrim
// License: MIT

use crate::core::tracker_msg::TrackerMsg;
use crate::{pdebug, pwarn};

use tokio::sync::{mpsc::Sender, watch};
use tokio::time::{Duration, sleep};

pub async fn run_ticker(tx: Sender<TrackerMsg>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    pdebug!("Ticker", "ticker started ({:?})", period);

    loop {
        tokio::select! {
            _ = sleep(period) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    pdebug!("Ticker", "ticker stopping (shutdown sender dropped)");
                    break;
                }
            }
        }

        if *shutdown.borrow() {
            pdebug!("Ticker", "ticker stopping (shutdown)");
            break;
        }

        // If the tracker is gone, stop.
        if tx.send(TrackerMsg::Tick).await.is_err() {
            pwarn!("Ticker", "ticker stopping (receiver dropped)");
            break;
        }
    }
}
