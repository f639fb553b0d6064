use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::{Config, ServiceManager, State};
use crate::{
    error::WorkerError,
    events::{Event, EventKind},
    signals::{Action, ManualSignal, OsSignal, OsSignals, SignalTable, Signaler, control},
    subscribers::Subscribe,
    workers::{WorkerFn, WorkerRef},
};

const LIMIT: Duration = Duration::from_secs(5);

/// Worker that reports each invocation, then serves until its context is cancelled.
fn serving(started: mpsc::UnboundedSender<u32>) -> WorkerRef {
    let calls = Arc::new(AtomicU32::new(0));
    WorkerFn::arc("serving", move |ctx: CancellationToken| {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        let started = started.clone();
        async move {
            let _ = started.send(n);
            ctx.cancelled().await;
            Ok::<_, WorkerError>(Action::Continue)
        }
    })
}

async fn until(mut cond: impl FnMut() -> bool) {
    timeout(LIMIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_stop_tears_down_cleanly() {
    let mgr = Arc::new(ServiceManager::new());
    let manual = Arc::new(ManualSignal::new());
    mgr.add_signaler(manual.clone());
    assert_eq!(mgr.signaler_count(), 1);

    let (tx, mut started) = mpsc::unbounded_channel();
    mgr.start(serving(tx));
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });

    assert_eq!(started.recv().await, Some(1));
    assert!(manual.stop().await);

    let res = timeout(LIMIT, waiter).await.unwrap().unwrap();
    assert!(res.is_ok());
    assert_eq!(mgr.state(), State::Dead);
    assert!(manual.is_cancelled());
}

#[tokio::test]
async fn test_worker_error_is_returned_verbatim() {
    let mgr = ServiceManager::new();
    let worker: WorkerRef = WorkerFn::arc("broken", |_ctx: CancellationToken| async {
        Err::<Action, _>(WorkerError::fail("disk on fire"))
    });

    let err = timeout(LIMIT, mgr.run(worker)).await.unwrap().unwrap_err();
    assert_eq!(err.as_label(), "worker_failed");
    assert_eq!(err.to_string(), "worker failed: disk on fire");
    assert_eq!(mgr.state(), State::Dead);
}

#[tokio::test]
async fn test_restart_reinvokes_under_fresh_context() {
    let mgr = Arc::new(ServiceManager::new());
    let manual = Arc::new(ManualSignal::new());
    mgr.add_signaler(manual.clone());

    let (tx, mut started) = mpsc::unbounded_channel();
    mgr.start(serving(tx));
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });

    assert_eq!(started.recv().await, Some(1));
    assert!(manual.restart().await);
    assert_eq!(started.recv().await, Some(2));
    assert!(manual.restart().await);
    assert_eq!(started.recv().await, Some(3));
    assert!(manual.stop().await);

    let res = timeout(LIMIT, waiter).await.unwrap().unwrap();
    assert!(res.is_ok());
    assert!(started.try_recv().is_err());
}

#[tokio::test]
async fn test_closed_signaler_is_evicted_alone() {
    let mgr = Arc::new(ServiceManager::new());
    let first = Arc::new(ManualSignal::new());
    let second = Arc::new(ManualSignal::new());
    mgr.add_signaler(first.clone());
    mgr.add_signaler(second.clone());

    let (tx, mut started) = mpsc::unbounded_channel();
    mgr.start(serving(tx));
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });
    assert_eq!(started.recv().await, Some(1));

    first.close();
    until(|| mgr.signaler_count() == 1).await;
    assert_eq!(mgr.state(), State::Running);

    assert!(second.stop().await);
    let res = timeout(LIMIT, waiter).await.unwrap().unwrap();
    assert!(res.is_ok());
    assert!(first.is_cancelled());
    assert!(second.is_cancelled());
}

#[tokio::test]
async fn test_all_signalers_closed_still_waits_for_worker() {
    let mgr = Arc::new(ServiceManager::new());
    let manual = Arc::new(ManualSignal::new());
    mgr.add_signaler(manual.clone());

    let release = Arc::new(Notify::new());
    let worker: WorkerRef = WorkerFn::arc("long", {
        let release = release.clone();
        move |_ctx: CancellationToken| {
            let release = release.clone();
            async move {
                release.notified().await;
                Ok::<_, WorkerError>(Action::Stop)
            }
        }
    });
    mgr.start(worker);
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });

    manual.close();
    until(|| mgr.signaler_count() == 0).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    release.notify_one();
    let res = timeout(LIMIT, waiter).await.unwrap().unwrap();
    assert!(res.is_ok());
    assert_eq!(mgr.state(), State::Dead);
}

#[tokio::test]
async fn test_close_one_cancel_other_waits_for_worker() {
    let mgr = Arc::new(ServiceManager::new());
    let first = Arc::new(ManualSignal::new());
    let second = Arc::new(ManualSignal::new());
    mgr.add_signaler(first.clone());
    mgr.add_signaler(second.clone());

    let release = Arc::new(Notify::new());
    let worker: WorkerRef = WorkerFn::arc("gated", {
        let release = release.clone();
        move |_ctx: CancellationToken| {
            let release = release.clone();
            async move {
                release.notified().await;
                Ok::<_, WorkerError>(Action::Stop)
            }
        }
    });
    mgr.start(worker);
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });

    first.close();
    until(|| mgr.signaler_count() == 1).await;

    second.cancel();
    assert!(second.is_cancelled());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());
    assert_eq!(mgr.signaler_count(), 1);

    release.notify_one();
    let res = timeout(LIMIT, waiter).await.unwrap().unwrap();
    assert!(res.is_ok());
    assert_eq!(mgr.state(), State::Dead);
}

#[tokio::test]
async fn test_continue_worker_exits_once_orphaned() {
    let mgr = Arc::new(ServiceManager::new());
    let manual = Arc::new(ManualSignal::new());
    mgr.add_signaler(manual.clone());

    let worker: WorkerRef = WorkerFn::arc("idle", |_ctx: CancellationToken| async {
        Ok::<_, WorkerError>(Action::Continue)
    });
    mgr.start(worker);
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    manual.close();
    let res = timeout(LIMIT, waiter).await.unwrap().unwrap();
    assert!(res.is_ok());
}

#[tokio::test]
async fn test_continue_without_signalers_finishes() {
    let mgr = ServiceManager::new();
    let worker: WorkerRef = WorkerFn::arc("once", |_ctx: CancellationToken| async {
        Ok::<_, WorkerError>(Action::Continue)
    });
    assert!(timeout(LIMIT, mgr.run(worker)).await.unwrap().is_ok());
    assert_eq!(mgr.state(), State::Dead);
}

#[tokio::test]
async fn test_control_sees_manager_state() {
    let mgr = Arc::new(ServiceManager::new());
    let manual = Arc::new(ManualSignal::new());
    mgr.add_signaler(manual.clone());

    let (tx, mut started) = mpsc::unbounded_channel();
    mgr.start(serving(tx));
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });
    assert_eq!(started.recv().await, Some(1));

    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let ctl = control::from_fn(move |m: &ServiceManager| {
        let _ = seen_tx.send((m.state(), m.signaler_count()));
        Action::Stop
    });
    assert!(manual.send(ctl).await);

    let res = timeout(LIMIT, waiter).await.unwrap().unwrap();
    assert!(res.is_ok());
    assert_eq!(seen_rx.recv().await, Some((State::Running, 1)));
}

#[tokio::test]
async fn test_continue_control_changes_nothing() {
    let mgr = Arc::new(ServiceManager::new());
    let manual = Arc::new(ManualSignal::new());
    mgr.add_signaler(manual.clone());

    let (tx, mut started) = mpsc::unbounded_channel();
    mgr.start(serving(tx));
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });
    assert_eq!(started.recv().await, Some(1));

    assert!(manual.send(control::action(Action::Continue)).await);
    assert!(manual.send(control::action(Action::Continue)).await);
    assert_eq!(mgr.state(), State::Running);
    assert!(started.try_recv().is_err());

    assert!(manual.stop().await);
    assert!(timeout(LIMIT, waiter).await.unwrap().unwrap().is_ok());
}

#[tokio::test]
async fn test_panicking_worker_reports_panic() {
    let mgr = ServiceManager::new();
    let worker: WorkerRef = WorkerFn::arc("boom", |_ctx: CancellationToken| async {
        if true {
            panic!("kaboom");
        }
        Ok::<_, WorkerError>(Action::Stop)
    });

    let err = timeout(LIMIT, mgr.run(worker)).await.unwrap().unwrap_err();
    assert!(err.is_panic());
    assert_eq!(mgr.state(), State::Dead);
}

#[tokio::test]
async fn test_signaler_without_channel_is_only_cancelled() {
    let mgr = ServiceManager::new();
    let manual = Arc::new(ManualSignal::new());
    let _taken = manual.wait_channel();
    mgr.add_signaler(manual.clone());
    assert_eq!(mgr.signaler_count(), 0);

    let worker: WorkerRef = WorkerFn::arc("quick", |_ctx: CancellationToken| async {
        Ok::<_, WorkerError>(Action::Stop)
    });
    assert!(timeout(LIMIT, mgr.run(worker)).await.unwrap().is_ok());
    assert!(manual.is_cancelled());
}

#[tokio::test]
async fn test_reentry_launches_nothing() {
    let mgr = ServiceManager::new();
    let calls = Arc::new(AtomicU32::new(0));
    let worker: WorkerRef = WorkerFn::arc("quick", {
        let calls = calls.clone();
        move |_ctx: CancellationToken| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, WorkerError>(Action::Stop) }
        }
    });
    assert!(timeout(LIMIT, mgr.run(worker.clone())).await.unwrap().is_ok());

    mgr.start(worker);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(mgr.state(), State::Dead);

    let again = timeout(Duration::from_millis(50), mgr.wait()).await;
    assert!(again.is_err(), "a second wait has no completion to report");
}

#[cfg(unix)]
#[tokio::test]
async fn test_os_signal_maps_through_table() {
    let table = SignalTable::empty()
        .with(OsSignal::User1, Action::Restart)
        .with(OsSignal::User2, Action::Stop);
    let os = Arc::new(OsSignals::new(table).unwrap());

    let mgr = Arc::new(ServiceManager::new());
    mgr.add_signaler(os.clone());

    let (tx, mut started) = mpsc::unbounded_channel();
    mgr.start(serving(tx));
    let waiter = tokio::spawn({
        let mgr = mgr.clone();
        async move { mgr.wait().await }
    });

    assert_eq!(started.recv().await, Some(1));
    assert!(os.deliver(OsSignal::User1).await);
    assert_eq!(started.recv().await, Some(2));
    assert!(os.deliver(OsSignal::User2).await);

    assert!(timeout(LIMIT, waiter).await.unwrap().unwrap().is_ok());
    assert_eq!(mgr.state(), State::Dead);
}

struct Record(Arc<Mutex<Vec<EventKind>>>);

#[async_trait]
impl Subscribe for Record {
    async fn on_event(&self, event: &Event) {
        self.0.lock().unwrap().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "record"
    }
}

#[tokio::test]
async fn test_subscribers_observe_lifecycle() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mgr = ServiceManager::builder(Config::default())
        .with_subscribers(vec![Arc::new(Record(seen.clone())) as Arc<dyn Subscribe>])
        .build();

    let worker: WorkerRef = WorkerFn::arc("quick", |_ctx: CancellationToken| async {
        Ok::<_, WorkerError>(Action::Stop)
    });
    assert!(timeout(LIMIT, mgr.run(worker)).await.unwrap().is_ok());

    until(|| seen.lock().unwrap().contains(&EventKind::ManagerDead)).await;
    let kinds = seen.lock().unwrap().clone();
    for kind in [
        EventKind::WorkerStarting,
        EventKind::WorkerReturned,
        EventKind::WorkerExited,
        EventKind::SignalersCancelled,
    ] {
        assert!(kinds.contains(&kind), "missing {kind:?}");
    }
}

#[tokio::test]
async fn test_dropping_manager_releases_subscribers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mgr = ServiceManager::builder(Config::default())
        .with_subscribers(vec![Arc::new(Record(seen.clone())) as Arc<dyn Subscribe>])
        .build();
    assert!(Arc::strong_count(&seen) > 1);

    drop(mgr);
    until(|| Arc::strong_count(&seen) == 1).await;
}
