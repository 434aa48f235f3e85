//! Shared test doubles for store and console tests.
//!
//! Compiled for unit tests and for integration tests through the
//! `test-support` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use futures_util::future::BoxFuture;
use mockable::Clock;
use rust_decimal::Decimal;
use tokio::sync::Notify;

use crate::domain::ports::{
    BackendError, DialogHooks, Envelope, ExtrasBackend, FixedConfirmation, FixtureExtrasBackend,
    MutationAck, Notice, NoticeLevel, NoticeTarget, Notifier, TaskScheduler, TransferListing,
};
use crate::domain::{
    Alias, AliasId, AliasSubmission, Allocation, Collaborators, Decoded, DialogKind,
    ExtrasStatistics, Owner, OwnerId, Transfer, TransferId, TransferSubmission, total_amount,
};

type QueuedTask = (&'static str, BoxFuture<'static, ()>);

/// Scheduler that queues deferred tasks until [`Self::run_pending`].
#[derive(Default)]
pub struct QueuedTaskScheduler {
    queue: Mutex<Vec<QueuedTask>>,
}

impl QueuedTaskScheduler {
    /// Labels of the tasks waiting to run, oldest first.
    pub fn pending(&self) -> Vec<&'static str> {
        self.lock().iter().map(|(label, _)| *label).collect()
    }

    /// Run queued tasks, including any they queue in turn. Returns how many
    /// ran.
    pub async fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch = std::mem::take(&mut *self.lock());
            if batch.is_empty() {
                return ran;
            }
            for (_, task) in batch {
                task.await;
                ran += 1;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<QueuedTask>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskScheduler for QueuedTaskScheduler {
    fn defer(&self, label: &'static str, task: BoxFuture<'static, ()>) {
        self.lock().push((label, task));
    }
}

/// Notifier that keeps every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Every notice so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Error notices shown at `target`.
    pub fn errors_at(&self, target: NoticeTarget) -> Vec<String> {
        self.messages(NoticeLevel::Error, target)
    }

    /// Success notices shown at `target`.
    pub fn successes_at(&self, target: NoticeTarget) -> Vec<String> {
        self.messages(NoticeLevel::Success, target)
    }

    fn messages(&self, level: NoticeLevel, target: NoticeTarget) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|notice| notice.level == level && notice.target == target)
            .map(|notice| notice.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

/// Dialog lifecycle event captured by [`RecordingDialogHooks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    /// `on_open`
    Opened(DialogKind),
    /// `before_close`
    Closing(DialogKind),
    /// `on_closed`
    Closed(DialogKind),
}

/// Dialog hooks that record every transition.
#[derive(Debug, Default)]
pub struct RecordingDialogHooks {
    events: Mutex<Vec<DialogEvent>>,
}

impl RecordingDialogHooks {
    /// Transitions so far.
    pub fn events(&self) -> Vec<DialogEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, event: DialogEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl DialogHooks for RecordingDialogHooks {
    fn on_open(&self, kind: DialogKind) {
        self.record(DialogEvent::Opened(kind));
    }

    fn before_close(&self, kind: DialogKind) {
        self.record(DialogEvent::Closing(kind));
    }

    fn on_closed(&self, kind: DialogKind) {
        self.record(DialogEvent::Closed(kind));
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    /// Clock frozen at noon UTC on the given day, so the local date matches
    /// in every common timezone.
    pub fn at_noon(year: i32, month: u32, day: u32) -> Self {
        let utc_now = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("invalid fixture date {year}-{month}-{day}"));
        Self { utc_now }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Collaborators wired to recording doubles, with handles kept for
/// assertions.
pub struct TestCollaborators {
    /// Recorded notices.
    pub notifier: Arc<RecordingNotifier>,
    /// Queued deferred tasks.
    pub scheduler: Arc<QueuedTaskScheduler>,
    /// Recorded dialog transitions.
    pub dialog_hooks: Arc<RecordingDialogHooks>,
    /// The bundle handed to stores.
    pub collaborators: Collaborators,
}

impl TestCollaborators {
    /// Doubles whose confirmation always answers `confirm`, with the clock
    /// frozen on 2024-03-15.
    pub fn new(confirm: bool) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(QueuedTaskScheduler::default());
        let dialog_hooks = Arc::new(RecordingDialogHooks::default());
        let collaborators = Collaborators {
            notifier: notifier.clone(),
            confirmation: Arc::new(FixedConfirmation(confirm)),
            dialog_hooks: dialog_hooks.clone(),
            scheduler: scheduler.clone(),
            clock: Arc::new(FixtureClock::at_noon(2024, 3, 15)),
        };
        Self {
            notifier,
            scheduler,
            dialog_hooks,
            collaborators,
        }
    }
}

/// Backend whose mutations are counted and then held until
/// [`GatedBackend::open`]. Alias and transfer listings return the configured
/// records; every other answer comes from [`FixtureExtrasBackend`].
#[derive(Debug, Default)]
pub struct GatedBackend {
    aliases: Vec<Alias>,
    transfers: Vec<Transfer>,
    fixture: FixtureExtrasBackend,
    gate: Notify,
    mutations: AtomicUsize,
}

impl GatedBackend {
    /// Backend listing `aliases` and `transfers`, with the gate closed.
    pub fn new(aliases: Vec<Alias>, transfers: Vec<Transfer>) -> Self {
        Self {
            aliases,
            transfers,
            ..Self::default()
        }
    }

    /// Release one held mutation, or the next one to arrive.
    pub fn open(&self) {
        self.gate.notify_one();
    }

    /// Number of mutation calls received so far.
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    async fn held(
        &self,
        ack: Result<MutationAck, BackendError>,
    ) -> Result<MutationAck, BackendError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        ack
    }
}

#[async_trait]
impl ExtrasBackend for GatedBackend {
    async fn list_active_aliases(&self) -> Result<Envelope<Vec<Alias>>, BackendError> {
        Ok(Envelope::ok(self.aliases.clone()))
    }

    async fn list_available_owners(&self) -> Result<Envelope<Vec<Owner>>, BackendError> {
        self.fixture.list_available_owners().await
    }

    async fn create_alias(&self, alias: &AliasSubmission) -> Result<MutationAck, BackendError> {
        let ack = self.fixture.create_alias(alias).await;
        self.held(ack).await
    }

    async fn update_alias(
        &self,
        id: AliasId,
        alias: &AliasSubmission,
    ) -> Result<MutationAck, BackendError> {
        let ack = self.fixture.update_alias(id, alias).await;
        self.held(ack).await
    }

    async fn delete_alias(&self, id: AliasId) -> Result<MutationAck, BackendError> {
        let ack = self.fixture.delete_alias(id).await;
        self.held(ack).await
    }

    async fn list_transfers(&self) -> Result<TransferListing, BackendError> {
        Ok(TransferListing::Bare(self.transfers.clone()))
    }

    async fn create_transfer(
        &self,
        transfer: &TransferSubmission,
    ) -> Result<MutationAck, BackendError> {
        let ack = self.fixture.create_transfer(transfer).await;
        self.held(ack).await
    }

    async fn update_transfer(
        &self,
        id: TransferId,
        transfer: &TransferSubmission,
    ) -> Result<MutationAck, BackendError> {
        let ack = self.fixture.update_transfer(id, transfer).await;
        self.held(ack).await
    }

    async fn delete_transfer(&self, id: TransferId) -> Result<MutationAck, BackendError> {
        let ack = self.fixture.delete_transfer(id).await;
        self.held(ack).await
    }

    async fn statistics(&self) -> Result<Envelope<ExtrasStatistics>, BackendError> {
        self.fixture.statistics().await
    }
}

/// Owner named `name` without a surname.
pub fn sample_owner(id: i64, name: &str) -> Owner {
    Owner {
        id: OwnerId::new(id),
        name: name.to_owned(),
        surname: None,
    }
}

/// Active alias with the given members.
pub fn sample_alias(id: i64, label: &str, owners: &[i64]) -> Alias {
    Alias {
        id: AliasId::new(id),
        label: label.to_owned(),
        owners: Decoded::Valid(owners.iter().copied().map(OwnerId::new).collect()),
        active: true,
    }
}

/// Active transfer created on 2024-01-01 with the given allocations.
pub fn sample_transfer(id: i64, alias_id: i64, allocations: &[(i64, Decimal)]) -> Transfer {
    let allocations = allocations
        .iter()
        .map(|(owner, amount)| Allocation {
            owner_id: OwnerId::new(*owner),
            amount: *amount,
        })
        .collect::<Vec<_>>();
    Transfer {
        id: TransferId::new(id),
        alias_id: AliasId::new(alias_id),
        alias_label: Some(format!("Alias {alias_id}")),
        name: format!("Transfer {id}"),
        created_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
        end_date: None,
        total_amount: total_amount(&allocations),
        allocations: Decoded::Valid(allocations),
        active: true,
    }
}
