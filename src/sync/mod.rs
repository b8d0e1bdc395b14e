//! Synchronization core.
//!
//! [`SyncCore`] owns the in-memory copy of every collection. It is built by
//! [`SyncCore::start`], which migrates legacy local data, bulk-loads each
//! collection and then attaches one store subscription per collection.
//! Mutations write through to the store first and then update local state;
//! subscription snapshots replace local state wholesale.

mod calendar;
pub mod collection;
mod notes;
mod schedule;
mod scores;
mod timer;

pub use collection::{Change, Origin, SyncedCollection};

use crate::cache::LocalCache;
use crate::catalog::{Achievement, Rank};
use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::derived::{self, Statistics, XpProgress};
use crate::error::{AppError, Result};
use crate::migration::{MigrationReport, MigrationRunner};
use crate::models::{
    sticky_note::sort_for_display, CalendarTask, CompletedTask, DailyQuestionLog, FocusSession,
    Record, Stats, StickyNote, TestScore, TimerState,
};
use crate::store::{Collection, DocumentStore, Repository, Subscription};
use crate::timer::{Debouncer, FocusTimer};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

fn order_completed(items: &mut [CompletedTask]) {
    items.sort_by_key(|t| t.date);
}

fn order_scores(items: &mut [TestScore]) {
    items.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
}

fn order_questions(items: &mut [DailyQuestionLog]) {
    items.sort_by_key(|q| q.date);
}

fn order_sessions(items: &mut [FocusSession]) {
    items.sort_by_key(|s| s.completed_at);
}

fn order_calendar(items: &mut [CalendarTask]) {
    items.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
}

struct TimerSlot {
    timer: FocusTimer,
    /// Last timer state known to be in the store, written or loaded here.
    known_remote: Option<TimerState>,
    /// The store holds, or is about to be sent, a running timer.
    running_in_store: bool,
}

/// Shared in-memory state. Subscription callbacks hold a reference to it,
/// never to the core itself.
pub struct SyncState {
    pub completed_tasks: SyncedCollection<CompletedTask>,
    pub test_scores: SyncedCollection<TestScore>,
    pub stats: SyncedCollection<Stats>,
    pub notes: SyncedCollection<StickyNote>,
    pub question_logs: SyncedCollection<DailyQuestionLog>,
    pub focus_sessions: SyncedCollection<FocusSession>,
    pub timer_state: SyncedCollection<TimerState>,
    pub calendar_tasks: SyncedCollection<CalendarTask>,
    timer: Mutex<TimerSlot>,
}

impl SyncState {
    fn new() -> Self {
        Self {
            completed_tasks: SyncedCollection::new(Collection::CompletedTasks.name())
                .ordered_by(order_completed),
            test_scores: SyncedCollection::new(Collection::TestScores.name()).ordered_by(order_scores),
            stats: SyncedCollection::new(Collection::Stats.name()),
            notes: SyncedCollection::new(Collection::Notes.name()).ordered_by(sort_for_display),
            question_logs: SyncedCollection::new(Collection::QuestionLogs.name())
                .ordered_by(order_questions),
            focus_sessions: SyncedCollection::new(Collection::FocusSessions.name())
                .ordered_by(order_sessions),
            timer_state: SyncedCollection::new(Collection::TimerState.name()),
            calendar_tasks: SyncedCollection::new(Collection::CalendarTasks.name())
                .ordered_by(order_calendar),
            timer: Mutex::new(TimerSlot {
                timer: FocusTimer::default(),
                known_remote: None,
                running_in_store: false,
            }),
        }
    }

    fn timer_slot(&self) -> MutexGuard<'_, TimerSlot> {
        crate::safe_lock(&self.timer, "Timer")
    }

    /// Take over a timer state written by another client. Echoes of our
    /// own writes are ignored.
    fn adopt_remote_timer(&self, remote: TimerState) {
        let mut slot = self.timer_slot();
        if slot.known_remote.as_ref() == Some(&remote) || *slot.timer.state() == remote {
            return;
        }
        log::debug!("Adopting timer state from another client");
        slot.timer = FocusTimer::new(remote.clone());
        slot.running_in_store = remote.is_running;
        slot.known_remote = Some(remote);
    }
}

#[derive(Clone)]
struct Repositories {
    tasks: Repository<CompletedTask>,
    scores: Repository<TestScore>,
    stats: Repository<Stats>,
    notes: Repository<StickyNote>,
    questions: Repository<DailyQuestionLog>,
    sessions: Repository<FocusSession>,
    timer: Repository<TimerState>,
    calendar: Repository<CalendarTask>,
}

impl Repositories {
    fn new(store: &Arc<dyn DocumentStore>, user_id: &str) -> Self {
        Self {
            tasks: Repository::new(Arc::clone(store), user_id),
            scores: Repository::new(Arc::clone(store), user_id),
            stats: Repository::new(Arc::clone(store), user_id),
            notes: Repository::new(Arc::clone(store), user_id),
            questions: Repository::new(Arc::clone(store), user_id),
            sessions: Repository::new(Arc::clone(store), user_id),
            timer: Repository::new(Arc::clone(store), user_id),
            calendar: Repository::new(Arc::clone(store), user_id),
        }
    }
}

pub struct SyncCore {
    config: SyncConfig,
    clock: Arc<dyn Clock>,
    repos: Repositories,
    state: Arc<SyncState>,
    subscriptions: Mutex<Vec<Subscription>>,
    timer_writer: Debouncer<TimerState>,
    /// Serializes read-modify-write mutations.
    mutation: Mutex<()>,
    migration: Option<MigrationReport>,
    shut_down: AtomicBool,
}

/// Log a skipped mutation.
fn log_skip(e: &AppError) {
    if matches!(e, AppError::ValidationSkipped { .. }) {
        warn!("{e}");
    }
}

fn load<T: Record>(repo: &Repository<T>, target: &SyncedCollection<T>) {
    match repo.get_all() {
        Ok(items) => {
            target.apply(Origin::Reload, Change::Replace(items));
        }
        Err(e) => warn!("Failed to load {}, keeping local state: {e}", T::COLLECTION),
    }
}

/// Re-read a collection after a write. If the read fails, `fallback` is
/// applied locally instead.
fn reload<T: Record>(repo: &Repository<T>, target: &SyncedCollection<T>, fallback: Change<T>) {
    match repo.get_all() {
        Ok(items) => {
            target.apply(Origin::Reload, Change::Replace(items));
        }
        Err(e) => {
            warn!("Reload of {} failed, applying change locally: {e}", T::COLLECTION);
            target.apply(Origin::Local, fallback);
        }
    }
}

/// Freshest copy of a record: the store's if reachable, else the local one.
/// A record the store no longer has is dropped locally.
fn freshest<T: Record>(repo: &Repository<T>, local: &SyncedCollection<T>, id: &str) -> Result<T> {
    let not_found = || AppError::NotFound {
        entity: T::ENTITY,
        id: id.to_string(),
    };
    match repo.get(id) {
        Ok(Some(record)) => Ok(record),
        Ok(None) => {
            if local.contains(id) {
                local.apply(Origin::Reload, Change::Remove(id.to_string()));
            }
            Err(not_found())
        }
        Err(e) => {
            warn!("Could not refresh {} '{id}', using local copy: {e}", T::ENTITY);
            local.find(id).ok_or_else(not_found)
        }
    }
}

fn spawn_timer_writer(
    repo: Repository<TimerState>,
    state: Arc<SyncState>,
    config: &SyncConfig,
) -> Debouncer<TimerState> {
    Debouncer::spawn(config.timer_debounce, move |timer_state: TimerState| {
        state.timer_slot().known_remote = Some(timer_state.clone());
        if let Err(e) = repo.save(&timer_state) {
            warn!("Failed to save timer state: {e}");
        }
    })
}

impl SyncCore {
    /// Migrate, load and subscribe. Never fails: every store error is
    /// logged and the affected collection starts from whatever was read.
    pub fn start(
        store: Arc<dyn DocumentStore>,
        cache: LocalCache,
        config: SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let runner = MigrationRunner::new(&store, cache, &config.user_id, Arc::clone(&clock));
        let migration = match runner.run_once() {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Local data migration failed, will retry on next start: {e}");
                None
            }
        };

        let repos = Repositories::new(&store, &config.user_id);
        let state = Arc::new(SyncState::new());
        let timer_writer = spawn_timer_writer(repos.timer.clone(), Arc::clone(&state), &config);

        let core = Self {
            config,
            clock,
            repos,
            state,
            subscriptions: Mutex::new(Vec::new()),
            timer_writer,
            mutation: Mutex::new(()),
            migration,
            shut_down: AtomicBool::new(false),
        };
        core.load_all();
        core.restore_timer();
        core.subscribe_all();
        info!("Sync started for user '{}'", core.config.user_id);
        core
    }

    fn load_all(&self) {
        let (repos, state) = (&self.repos, &self.state);
        load(&repos.tasks, &state.completed_tasks);
        load(&repos.scores, &state.test_scores);
        load(&repos.stats, &state.stats);
        load(&repos.notes, &state.notes);
        load(&repos.questions, &state.question_logs);
        load(&repos.sessions, &state.focus_sessions);
        load(&repos.timer, &state.timer_state);
        load(&repos.calendar, &state.calendar_tasks);
    }

    fn watch<T: Record>(
        &self,
        repo: &Repository<T>,
        select: fn(&SyncState) -> &SyncedCollection<T>,
    ) -> Option<Subscription> {
        let state = Arc::clone(&self.state);
        let subscription = repo.subscribe(move |items: Result<Vec<T>>| match items {
            Ok(items) => {
                select(&state).apply(Origin::Subscription, Change::Replace(items));
            }
            Err(e) => warn!("{} subscription error, keeping local state: {e}", T::COLLECTION),
        });
        subscription
            .inspect_err(|e| warn!("Failed to subscribe to {}: {e}", T::COLLECTION))
            .ok()
    }

    fn watch_timer(&self) -> Option<Subscription> {
        let state = Arc::clone(&self.state);
        let subscription = self.repos.timer.subscribe(move |items: Result<Vec<TimerState>>| match items {
            Ok(items) => {
                let remote = items.first().cloned();
                state.timer_state.apply(Origin::Subscription, Change::Replace(items));
                if let Some(remote) = remote {
                    state.adopt_remote_timer(remote);
                }
            }
            Err(e) => warn!("{} subscription error, keeping local state: {e}", Collection::TimerState),
        });
        subscription
            .inspect_err(|e| warn!("Failed to subscribe to {}: {e}", Collection::TimerState))
            .ok()
    }

    fn subscribe_all(&self) {
        let repos = &self.repos;
        let subscriptions = [
            self.watch(&repos.tasks, |s| &s.completed_tasks),
            self.watch(&repos.scores, |s| &s.test_scores),
            self.watch(&repos.stats, |s| &s.stats),
            self.watch(&repos.notes, |s| &s.notes),
            self.watch(&repos.questions, |s| &s.question_logs),
            self.watch(&repos.sessions, |s| &s.focus_sessions),
            self.watch_timer(),
            self.watch(&repos.calendar, |s| &s.calendar_tasks),
        ];
        crate::safe_lock(&self.subscriptions, "Subscriptions").extend(subscriptions.into_iter().flatten());
    }

    /// Release every subscription and write any pending timer state.
    /// Idempotent; also runs on drop.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let released = std::mem::take(&mut *crate::safe_lock(&self.subscriptions, "Subscriptions"));
        drop(released);
        self.timer_writer.shutdown();
        info!("Sync stopped for user '{}'", self.config.user_id);
    }

    fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        crate::safe_lock(&self.mutation, "SyncCore mutations")
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Outcome of the start-up migration; `None` if it failed.
    pub fn migration_report(&self) -> Option<&MigrationReport> {
        self.migration.as_ref()
    }

    pub fn subscription_count(&self) -> usize {
        crate::safe_lock(&self.subscriptions, "Subscriptions").len()
    }

    pub fn statistics(&self) -> Statistics {
        let stats = self.stats();
        self.state.completed_tasks.with(|tasks| {
            self.state.test_scores.with(|scores| {
                self.state.question_logs.with(|logs| {
                    derived::statistics(tasks, scores, logs, &stats, self.config.total_schedule_days)
                })
            })
        })
    }

    pub fn current_rank(&self) -> Rank {
        derived::current_rank(self.stats().total_xp)
    }

    pub fn next_rank(&self) -> Option<Rank> {
        derived::next_rank(self.stats().total_xp)
    }

    pub fn xp_progress(&self) -> XpProgress {
        derived::xp_progress(self.stats().total_xp)
    }

    pub fn unlocked_achievements(&self) -> Vec<&'static Achievement> {
        derived::unlocked_achievements(&self.statistics())
    }
}

impl Drop for SyncCore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
