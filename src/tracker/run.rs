// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::watch;

use crate::core::{
    authority::Confirm,
    format::format_duration,
    status::StatusKey,
    sync::{EVALUATION_PROMPT, Gate, SyncAgent},
    tracker_msg::{TrackerMsg, TransitionReply},
};
use crate::{pdebug, pinfo};

use super::Tracker;

impl Tracker {
    /// Runs until `shutdown` turns true. Nothing is applied after that:
    /// the receiver is dropped with the tracker and in-flight tasks check the
    /// flag before reporting.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        pinfo!(
            "Tracker",
            "tracker starting (tick={:?}, resync={:?})",
            self.timing.tick,
            self.timing.resync
        );

        tokio::spawn(crate::services::ticker::run_ticker(
            self.tx.clone(),
            self.timing.tick,
            shutdown.clone(),
        ));

        tokio::spawn(crate::services::resync::run_resync(
            self.agent.authority(),
            Arc::clone(&self.generation),
            self.tx.clone(),
            self.timing.resync,
            shutdown.clone(),
        ));

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        pinfo!("Tracker", "tracker stopping (shutdown requested)");
                        break;
                    }
                }

                maybe = self.rx.recv() => {
                    let Some(msg) = maybe else {
                        pinfo!("Tracker", "tracker stopping (channel closed)");
                        break;
                    };
                    self.handle_msg(msg, &shutdown);
                }
            }
        }
    }

    fn handle_msg(&mut self, msg: TrackerMsg, shutdown: &watch::Receiver<bool>) {
        match msg {
            TrackerMsg::Tick => self.store.increment_active(),

            TrackerMsg::Synced { mode, generation, result } => {
                if generation != self.generation.load(Ordering::SeqCst) {
                    pdebug!("Tracker", "dropping {:?} sync sent before the last transition", mode);
                    return;
                }

                if SyncAgent::apply_fetch(&mut self.store, result, mode) {
                    let status = self.store.current_status();
                    pdebug!(
                        "Tracker",
                        "session now {} ({})",
                        status,
                        format_duration(self.store.durations().get(status))
                    );
                }
            }

            TrackerMsg::Request { status, confirm, reply } => {
                match SyncAgent::check_transition(&mut self.store, status) {
                    Ok(Gate::Proceed) => {
                        self.generation.fetch_add(1, Ordering::SeqCst);
                        self.spawn_post(status, reply, shutdown.clone());
                    }
                    Ok(Gate::Confirm) => {
                        self.generation.fetch_add(1, Ordering::SeqCst);
                        self.spawn_prompt(status, confirm, reply, shutdown.clone());
                    }
                    Ok(Gate::Done(outcome)) => {
                        let _ = reply.send(Ok(outcome));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }

            TrackerMsg::Confirmed { status, accepted, reply } => {
                match SyncAgent::answer_prompt(&mut self.store, status, accepted) {
                    Gate::Done(outcome) => {
                        let _ = reply.send(Ok(outcome));
                    }
                    Gate::Proceed | Gate::Confirm => self.spawn_post(status, reply, shutdown.clone()),
                }
            }

            TrackerMsg::TransitionDone { result, reply } => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                let out = SyncAgent::finish_transition(&mut self.store, result);
                let _ = reply.send(out);
            }

            TrackerMsg::GetSession { reply } => {
                let _ = reply.send(self.store.session().clone());
            }
        }
    }

    /// Asks on a plain thread so the loop keeps running while the user thinks.
    /// A blocking-pool task would hold up runtime shutdown on a pending read.
    fn spawn_prompt(
        &self,
        status: StatusKey,
        confirm: Box<dyn Confirm + Send>,
        reply: TransitionReply,
        shutdown: watch::Receiver<bool>,
    ) {
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            let accepted = confirm.confirm(EVALUATION_PROMPT);

            if *shutdown.borrow() {
                pdebug!("Tracker", "dropping prompt answer for {} (tracker stopped)", status);
                return;
            }

            if tx
                .blocking_send(TrackerMsg::Confirmed { status, accepted, reply })
                .is_err()
            {
                pdebug!("Tracker", "dropping prompt answer for {} (receiver gone)", status);
            }
        });
    }

    fn spawn_post(
        &self,
        status: StatusKey,
        reply: TransitionReply,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let authority = self.agent.authority();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            pdebug!("Tracker", "posting transition to {}", status);

            let result = tokio::select! {
                r = authority.post_transition(status) => r,
                _ = shutdown.changed() => {
                    pdebug!("Tracker", "transition to {} abandoned (tracker stopped)", status);
                    return;
                }
            };

            if *shutdown.borrow() {
                pdebug!("Tracker", "dropping late transition result for {}", status);
                return;
            }

            if tx.send(TrackerMsg::TransitionDone { result, reply }).await.is_err() {
                pdebug!("Tracker", "dropping transition result for {} (receiver gone)", status);
            }
        });
    }
}
