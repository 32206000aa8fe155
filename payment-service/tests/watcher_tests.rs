//! Confirmation watcher behavior tests
//!
//! These run against scripted status sources and a recording sink on a
//! paused clock, so the full ten-minute polling ceiling executes instantly.

use async_trait::async_trait;
use payment_service::config::WatcherSettings;
use payment_service::error::{AppError, Result};
use payment_service::models::PaymentStatus;
use payment_service::providers::StatusSource;
use payment_service::services::watcher::{
    check_once, ChargeRef, ConfirmationSink, ConfirmationWatcher, WatchOutcome,
    IMMEDIATE_CHECK_DELAY,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Replays a fixed sequence of responses, then repeats the fallback
struct ScriptedSource {
    script: Mutex<VecDeque<Result<PaymentStatus>>>,
    fallback: PaymentStatus,
    polls: AtomicUsize,
}

impl ScriptedSource {
    fn new(script: Vec<Result<PaymentStatus>>, fallback: PaymentStatus) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            polls: AtomicUsize::new(0),
        })
    }

    fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn charge_status(&self, _reference: &str) -> Result<PaymentStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(Ok(self.fallback))
    }
}

/// Emulates the conditional paid transition: only the first confirm wins
#[derive(Default)]
struct RecordingSink {
    transitioned: AtomicBool,
    confirmations: AtomicUsize,
    expirations: AtomicUsize,
    terminations: Mutex<Vec<PaymentStatus>>,
}

impl RecordingSink {
    fn confirmation_count(&self) -> usize {
        self.confirmations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmationSink for RecordingSink {
    async fn confirm(&self, _payment_id: Uuid) -> bool {
        let first = !self.transitioned.swap(true, Ordering::SeqCst);
        if first {
            self.confirmations.fetch_add(1, Ordering::SeqCst);
        }
        first
    }

    async fn expire(&self, _payment_id: Uuid) {
        self.expirations.fetch_add(1, Ordering::SeqCst);
    }

    async fn terminate(&self, _payment_id: Uuid, status: PaymentStatus) {
        self.terminations.lock().unwrap().push(status);
    }
}

fn settings() -> WatcherSettings {
    WatcherSettings {
        initial_delay_secs: 5,
        interval_secs: 10,
        max_wait_secs: 600,
        immediate_check: true,
    }
}

fn charge() -> ChargeRef {
    ChargeRef {
        payment_id: Uuid::new_v4(),
        provider_reference: "123456789".to_string(),
    }
}

fn watcher(
    source: Arc<ScriptedSource>,
    sink: Arc<RecordingSink>,
    settings: WatcherSettings,
) -> (ConfirmationWatcher, watch::Sender<bool>) {
    let (tx, rx) = watch::channel(false);
    (ConfirmationWatcher::new(source, sink, settings, rx), tx)
}

#[tokio::test(start_paused = true)]
async fn confirms_exactly_once_on_repeated_paid() {
    let source = ScriptedSource::new(vec![Ok(PaymentStatus::Pending)], PaymentStatus::Paid);
    let sink = Arc::new(RecordingSink::default());
    let (watcher, _tx) = watcher(source.clone(), sink.clone(), settings());

    let outcome = watcher.watch(charge()).await;

    assert_eq!(outcome, WatchOutcome::Confirmed);
    assert_eq!(sink.confirmation_count(), 1);
    // Stopped at the first paid observation
    assert_eq!(source.poll_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn pending_forever_times_out_without_side_effects() {
    let source = ScriptedSource::new(vec![], PaymentStatus::Pending);
    let sink = Arc::new(RecordingSink::default());
    let (watcher, _tx) = watcher(source.clone(), sink.clone(), settings());

    let outcome = watcher.watch(charge()).await;

    assert_eq!(outcome, WatchOutcome::TimedOut);
    assert_eq!(sink.confirmation_count(), 0);
    assert_eq!(sink.expirations.load(Ordering::SeqCst), 1);
    // Immediate check + initial delay + one check per interval up to the ceiling
    assert!(source.poll_count() > 50, "polled {} times", source.poll_count());
}

#[tokio::test(start_paused = true)]
async fn poll_errors_keep_the_cadence() {
    let source = ScriptedSource::new(
        vec![
            Err(AppError::Provider("connection reset".to_string())),
            Err(AppError::Provider("timeout".to_string())),
        ],
        PaymentStatus::Paid,
    );
    let sink = Arc::new(RecordingSink::default());
    let (watcher, _tx) = watcher(source.clone(), sink.clone(), settings());

    let outcome = watcher.watch(charge()).await;

    assert_eq!(outcome, WatchOutcome::Confirmed);
    assert_eq!(sink.confirmation_count(), 1);
    assert_eq!(source.poll_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn provider_terminal_status_stops_polling() {
    let source = ScriptedSource::new(
        vec![Ok(PaymentStatus::Pending), Ok(PaymentStatus::Canceled)],
        PaymentStatus::Paid,
    );
    let sink = Arc::new(RecordingSink::default());
    let (watcher, _tx) = watcher(source.clone(), sink.clone(), settings());

    let outcome = watcher.watch(charge()).await;

    assert_eq!(outcome, WatchOutcome::Terminated(PaymentStatus::Canceled));
    assert_eq!(sink.confirmation_count(), 0);
    assert_eq!(
        *sink.terminations.lock().unwrap(),
        vec![PaymentStatus::Canceled]
    );
}

#[tokio::test(start_paused = true)]
async fn immediate_check_fires_before_initial_delay() {
    let source = ScriptedSource::new(vec![], PaymentStatus::Paid);
    let sink = Arc::new(RecordingSink::default());
    let (watcher, _tx) = watcher(source.clone(), sink.clone(), settings());

    let started = tokio::time::Instant::now();
    let outcome = watcher.watch(charge()).await;

    assert_eq!(outcome, WatchOutcome::Confirmed);
    assert_eq!(started.elapsed(), IMMEDIATE_CHECK_DELAY);
}

#[tokio::test(start_paused = true)]
async fn first_poll_waits_for_initial_delay_when_immediate_check_off() {
    let source = ScriptedSource::new(vec![], PaymentStatus::Paid);
    let sink = Arc::new(RecordingSink::default());
    let mut config = settings();
    config.immediate_check = false;
    let (watcher, _tx) = watcher(source.clone(), sink.clone(), config);

    let started = tokio::time::Instant::now();
    let outcome = watcher.watch(charge()).await;

    assert_eq!(outcome, WatchOutcome::Confirmed);
    assert_eq!(started.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn already_confirmed_charge_reports_without_new_side_effects() {
    let source = ScriptedSource::new(vec![], PaymentStatus::Paid);
    let sink = Arc::new(RecordingSink::default());
    // Another observer already performed the transition
    sink.transitioned.store(true, Ordering::SeqCst);
    let (watcher, _tx) = watcher(source.clone(), sink.clone(), settings());

    let outcome = watcher.watch(charge()).await;

    assert_eq!(outcome, WatchOutcome::AlreadyConfirmed);
    assert_eq!(sink.confirmation_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_watch() {
    let source = ScriptedSource::new(vec![], PaymentStatus::Pending);
    let sink = Arc::new(RecordingSink::default());
    let (watcher, tx) = watcher(source.clone(), sink.clone(), settings());

    let handle = watcher.spawn(charge());
    tokio::time::sleep(Duration::from_secs(30)).await;
    tx.send(true).unwrap();

    let outcome = handle.await.unwrap();
    assert_eq!(outcome, WatchOutcome::ShutDown);
    assert_eq!(sink.confirmation_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn manual_check_and_watcher_confirm_once_between_them() {
    let source = ScriptedSource::new(vec![], PaymentStatus::Paid);
    let sink = Arc::new(RecordingSink::default());
    let (watcher, _tx) = watcher(source.clone(), sink.clone(), settings());

    let target = charge();
    let handle = watcher.spawn(target.clone());

    // The "I already paid" button fires while the watcher is polling
    let paid = check_once(source.as_ref(), sink.as_ref(), &target)
        .await
        .unwrap();
    assert!(paid);

    let outcome = handle.await.unwrap();
    assert!(matches!(
        outcome,
        WatchOutcome::Confirmed | WatchOutcome::AlreadyConfirmed
    ));
    assert_eq!(sink.confirmation_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_check_reports_pending_without_side_effects() {
    let source = ScriptedSource::new(vec![Ok(PaymentStatus::Pending)], PaymentStatus::Pending);
    let sink = Arc::new(RecordingSink::default());

    let paid = check_once(source.as_ref(), sink.as_ref(), &charge())
        .await
        .unwrap();

    assert!(!paid);
    assert_eq!(sink.confirmation_count(), 0);
}
