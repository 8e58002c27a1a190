// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::core::authority::Confirm;
use crate::core::error::{AuthorityError, TransitionError};
use crate::core::status::{DurationMap, Snapshot, StatusKey};
use crate::core::store::Session;
use crate::core::sync::TransitionOutcome;
use crate::core::testing::FakeAuthority;
use crate::tracker::{Timing, Tracker, TrackerHandle};

struct Running {
    handle: TrackerHandle,
    view: watch::Receiver<Session>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

fn start(fake: Arc<FakeAuthority>, timing: Timing) -> Running {
    let tracker = Tracker::new(fake, timing);
    let handle = tracker.handle();
    let view = tracker.subscribe();
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(tracker.run(shutdown_rx));

    Running { handle, view, shutdown, task }
}

fn short_resync() -> Timing {
    Timing {
        tick: Duration::from_secs(1),
        resync: Duration::from_millis(10_500),
    }
}

async fn current(handle: &TrackerHandle) -> Session {
    handle.session().await.expect("tracker running")
}

#[tokio::test(start_paused = true)]
async fn ticks_accrue_until_resync_replaces_them() {
    let fake = Arc::new(FakeAuthority::new(Snapshot::new(StatusKey::Break, DurationMap::new())));
    let run = start(fake.clone(), short_resync());

    sleep(Duration::from_millis(5_500)).await;
    let session = current(&run.handle).await;
    assert_eq!(session.status, StatusKey::Break);
    assert_eq!(session.durations.get(StatusKey::Break), 5);

    fake.set_snapshot(Snapshot::new(
        StatusKey::Break,
        DurationMap::from([(StatusKey::Break, 3)]),
    ));

    // Ticks at 6..10 s, resync at 10.5 s.
    sleep(Duration::from_millis(5_200)).await;
    assert_eq!(current(&run.handle).await.durations.get(StatusKey::Break), 3);
    assert_eq!(fake.fetches(), 2);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn offline_session_does_not_tick() {
    let fake = Arc::new(FakeAuthority::new(Snapshot::new(
        StatusKey::Offline,
        DurationMap::from([(StatusKey::Offline, 100)]),
    )));
    let run = start(fake, Timing::default());

    sleep(Duration::from_millis(3_500)).await;

    let session = current(&run.handle).await;
    assert_eq!(session.durations, DurationMap::from([(StatusKey::Offline, 100)]));

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_initial_fetch_heals_on_next_resync() {
    let fake = Arc::new(FakeAuthority::new(Snapshot::new(
        StatusKey::Online,
        DurationMap::from([(StatusKey::Online, 100)]),
    )));
    fake.fail_fetch(Some(AuthorityError::Unreachable("down".into())));
    let run = start(fake.clone(), short_resync());

    sleep(Duration::from_millis(500)).await;
    assert_eq!(current(&run.handle).await, Session::default());

    fake.fail_fetch(None);
    sleep(Duration::from_millis(10_100)).await;

    let session = current(&run.handle).await;
    assert_eq!(session.status, StatusKey::Online);
    assert_eq!(session.durations.get(StatusKey::Online), 100);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn second_request_is_rejected_while_busy() {
    let (fake, gate) = FakeAuthority::gated(Snapshot::new(StatusKey::Online, DurationMap::new()));
    let fake = Arc::new(fake);
    let run = start(fake.clone(), Timing::default());
    sleep(Duration::from_millis(100)).await;

    let first = tokio::spawn({
        let handle = run.handle.clone();
        async move { handle.request(StatusKey::Break, Box::new(|_: &str| true)).await }
    });
    sleep(Duration::from_millis(100)).await;
    assert!(current(&run.handle).await.busy);

    let second = run
        .handle
        .request(StatusKey::LunchTime, Box::new(|_: &str| true))
        .await;
    assert_eq!(second, Err(TransitionError::Busy));
    assert_eq!(fake.posts(), 1);

    gate.notify_one();
    assert_eq!(first.await.unwrap(), Ok(TransitionOutcome::Applied(StatusKey::Break)));

    let session = current(&run.handle).await;
    assert_eq!(session.status, StatusKey::Break);
    assert!(!session.busy);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn gates_are_answered_without_posting() {
    let fake = Arc::new(FakeAuthority::new(Snapshot::new(StatusKey::Online, DurationMap::new())));
    let run = start(fake.clone(), Timing::default());
    sleep(Duration::from_millis(100)).await;

    let same = run.handle.request(StatusKey::Online, Box::new(|_: &str| true)).await;
    assert_eq!(same, Ok(TransitionOutcome::Unchanged));

    let declined = run
        .handle
        .request(StatusKey::Evaluation, Box::new(|_: &str| false))
        .await;
    assert_eq!(declined, Ok(TransitionOutcome::Declined));

    assert_eq!(fake.posts(), 0);
    assert_eq!(current(&run.handle).await.status, StatusKey::Online);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_transition_reports_server_message() {
    let fake = Arc::new(FakeAuthority::new(Snapshot::new(StatusKey::Online, DurationMap::new())));
    fake.fail_post(Some(AuthorityError::rejected("Role HR may not select 'On-call'")));
    let run = start(fake.clone(), Timing::default());
    sleep(Duration::from_millis(100)).await;

    let err = run
        .handle
        .request(StatusKey::OnCall, Box::new(|_: &str| true))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Role HR may not select 'On-call'");
    let session = current(&run.handle).await;
    assert_eq!(session.status, StatusKey::Online);
    assert!(!session.busy);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn late_transition_result_is_dropped_after_shutdown() {
    let (fake, gate) = FakeAuthority::gated(Snapshot::new(StatusKey::Online, DurationMap::new()));
    let fake = Arc::new(fake);
    let run = start(fake.clone(), Timing::default());
    sleep(Duration::from_millis(100)).await;

    let pending = tokio::spawn({
        let handle = run.handle.clone();
        async move { handle.request(StatusKey::Break, Box::new(|_: &str| true)).await }
    });
    sleep(Duration::from_millis(100)).await;
    assert_eq!(fake.posts(), 1);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
    gate.notify_one();

    assert_eq!(pending.await.unwrap(), Err(TransitionError::Closed));
    assert_eq!(run.view.borrow().status, StatusKey::Online);
    assert!(run.handle.session().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_ticker_and_resync() {
    let fake = Arc::new(FakeAuthority::new(Snapshot::new(StatusKey::Online, DurationMap::new())));
    let run = start(
        fake.clone(),
        Timing {
            tick: Duration::from_secs(1),
            resync: Duration::from_secs(2),
        },
    );

    sleep(Duration::from_millis(5_500)).await;
    assert_eq!(fake.fetches(), 3);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
    let fetched = fake.fetches();
    let seen = run.view.borrow().clone();

    sleep(Duration::from_secs(120)).await;

    assert_eq!(fake.fetches(), fetched);
    assert_eq!(*run.view.borrow(), seen);
}

#[tokio::test(start_paused = true)]
async fn slow_fetches_keep_the_resync_cadence() {
    let fake = Arc::new(FakeAuthority::new(Snapshot::new(StatusKey::Online, DurationMap::new())));
    fake.delay_fetch(Duration::from_secs(3));
    let run = start(
        fake.clone(),
        Timing {
            tick: Duration::from_secs(1),
            resync: Duration::from_secs(10),
        },
    );

    // Sent at 0, 10 and 20 s, each answering 3 s later.
    sleep(Duration::from_millis(21_000)).await;
    assert_eq!(fake.fetches(), 3);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn fetch_in_flight_at_shutdown_is_never_applied() {
    let (fake, gate) =
        FakeAuthority::gated_fetch(Snapshot::new(StatusKey::Break, DurationMap::from([(StatusKey::Break, 60)])));
    let fake = Arc::new(fake);
    let run = start(fake.clone(), Timing::default());
    sleep(Duration::from_millis(100)).await;
    assert_eq!(fake.fetches(), 1);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
    gate.notify_one();
    sleep(Duration::from_millis(100)).await;

    assert_eq!(*run.view.borrow(), Session::default());
    assert_eq!(fake.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn fetch_sent_before_a_transition_does_not_undo_it() {
    let (fake, gate) = FakeAuthority::gated_fetch(Snapshot::new(StatusKey::Online, DurationMap::new()));
    let fake = Arc::new(fake);
    let run = start(fake.clone(), Timing::default());
    sleep(Duration::from_millis(100)).await;
    assert_eq!(fake.fetches(), 1);

    let out = run.handle.request(StatusKey::Break, Box::new(|_: &str| true)).await;
    assert_eq!(out, Ok(TransitionOutcome::Applied(StatusKey::Break)));

    // The parked fetch still carries the pre-transition Online.
    gate.notify_one();
    sleep(Duration::from_millis(100)).await;

    assert_eq!(current(&run.handle).await.status, StatusKey::Break);

    let _ = run.shutdown.send(true);
    run.task.await.unwrap();
}

/// Blocks until the test sends an answer.
struct HeldConfirm(std::sync::mpsc::Receiver<bool>);

impl Confirm for HeldConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0.recv().unwrap_or(false)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_prompt_does_not_stall_the_loop() {
    let fake = Arc::new(FakeAuthority::new(Snapshot::new(StatusKey::Online, DurationMap::new())));
    let mut run = start(
        fake.clone(),
        Timing {
            tick: Duration::from_millis(20),
            resync: Duration::from_secs(60),
        },
    );
    timeout(Duration::from_secs(2), run.view.wait_for(|s| s.status == StatusKey::Online))
        .await
        .expect("initial sync")
        .unwrap();

    let (answer, held) = std::sync::mpsc::channel();
    let pending = tokio::spawn({
        let handle = run.handle.clone();
        async move { handle.request(StatusKey::Evaluation, Box::new(HeldConfirm(held))).await }
    });
    timeout(Duration::from_secs(2), run.view.wait_for(|s| s.busy))
        .await
        .expect("prompt opened")
        .unwrap();

    let during = timeout(Duration::from_millis(500), run.handle.session())
        .await
        .expect("loop answers while the prompt is open")
        .unwrap();
    assert!(during.busy);

    let accrued = during.durations.get(StatusKey::Online);
    timeout(
        Duration::from_secs(2),
        run.view.wait_for(|s| s.durations.get(StatusKey::Online) > accrued),
    )
    .await
    .expect("ticks keep landing")
    .unwrap();

    let _ = run.shutdown.send(true);
    timeout(Duration::from_secs(1), run.task)
        .await
        .expect("shutdown does not wait for the prompt")
        .unwrap();

    let _ = answer.send(true);
    assert_eq!(pending.await.unwrap(), Err(TransitionError::Closed));
    assert_eq!(fake.posts(), 0);
}
