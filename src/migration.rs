//! One-time transfer of pre-sync local data into the document store.
//!
//! Progress is a persisted state machine: after each legacy collection is
//! replayed and cleared it is recorded as done, so a run interrupted by a
//! store failure resumes at the collection that failed.

use crate::cache::LocalCache;
use crate::catalog::{self, ActivityType};
use crate::clock::Clock;
use crate::constants::{
    LEGACY_COMPLETED_KEY, LEGACY_NOTES_KEY, LEGACY_QUESTIONS_KEY, LEGACY_SCORES_KEY,
    LEGACY_STATS_KEY, MIGRATED_FLAG_KEY, MIGRATION_STATE_KEY,
};
use crate::error::{AppError, Result};
use crate::models::{
    new_record_id, CompletedTask, DailyQuestionLog, Record, Stats, StickyNote, TestScore,
};
use crate::store::{DocumentStore, Repository};
use crate::validation::validate_score;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Legacy local collections, in replay order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyCollection {
    CompletedTasks,
    TestScores,
    Stats,
    StickyNotes,
    QuestionLogs,
}

impl LegacyCollection {
    pub const ORDER: [LegacyCollection; 5] = [
        LegacyCollection::CompletedTasks,
        LegacyCollection::TestScores,
        LegacyCollection::Stats,
        LegacyCollection::StickyNotes,
        LegacyCollection::QuestionLogs,
    ];

    pub fn cache_key(self) -> &'static str {
        match self {
            LegacyCollection::CompletedTasks => LEGACY_COMPLETED_KEY,
            LegacyCollection::TestScores => LEGACY_SCORES_KEY,
            LegacyCollection::Stats => LEGACY_STATS_KEY,
            LegacyCollection::StickyNotes => LEGACY_NOTES_KEY,
            LegacyCollection::QuestionLogs => LEGACY_QUESTIONS_KEY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LegacyCollection::CompletedTasks => "completed tasks",
            LegacyCollection::TestScores => "test scores",
            LegacyCollection::Stats => "stats",
            LegacyCollection::StickyNotes => "sticky notes",
            LegacyCollection::QuestionLogs => "question logs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MigrationState {
    NotStarted,
    InProgress { completed: Vec<LegacyCollection> },
    Completed,
}

impl MigrationState {
    fn is_done(&self, collection: LegacyCollection) -> bool {
        match self {
            MigrationState::NotStarted => false,
            MigrationState::InProgress { completed } => completed.contains(&collection),
            MigrationState::Completed => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Records written per collection replayed in this run.
    pub migrated: Vec<(LegacyCollection, usize)>,
    /// Legacy records dropped because they could not be read.
    pub skipped: usize,
    /// True when nothing ran because an earlier run finished.
    pub already_completed: bool,
}

impl MigrationReport {
    pub fn total_migrated(&self) -> usize {
        self.migrated.iter().map(|(_, n)| n).sum()
    }
}

/// Outcome of replaying one legacy collection.
#[derive(Debug, Default)]
struct Replay {
    migrated: usize,
    skipped: usize,
    failed: usize,
    last_error: Option<AppError>,
}

impl Replay {
    fn save<T: Record>(&mut self, repo: &Repository<T>, record: &T) {
        match repo.save(record) {
            Ok(()) => self.migrated += 1,
            Err(e) => {
                self.failed += 1;
                self.last_error = Some(e);
            }
        }
    }
}

pub struct MigrationRunner {
    cache: LocalCache,
    clock: Arc<dyn Clock>,
    tasks: Repository<CompletedTask>,
    scores: Repository<TestScore>,
    stats: Repository<Stats>,
    notes: Repository<StickyNote>,
    questions: Repository<DailyQuestionLog>,
}

impl MigrationRunner {
    pub fn new(
        store: &Arc<dyn DocumentStore>,
        cache: LocalCache,
        user_id: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            clock,
            tasks: Repository::new(Arc::clone(store), user_id),
            scores: Repository::new(Arc::clone(store), user_id),
            stats: Repository::new(Arc::clone(store), user_id),
            notes: Repository::new(Arc::clone(store), user_id),
            questions: Repository::new(Arc::clone(store), user_id),
        }
    }

    /// Current persisted state. The legacy boolean flag wins over
    /// everything else; an unreadable state record counts as not started.
    pub fn state(&self) -> Result<MigrationState> {
        if self.cache.flag(MIGRATED_FLAG_KEY)? {
            return Ok(MigrationState::Completed);
        }
        match self.cache.get_json::<MigrationState>(MIGRATION_STATE_KEY) {
            Ok(state) => Ok(state.unwrap_or(MigrationState::NotStarted)),
            Err(AppError::Serialization(e)) => {
                warn!("Ignoring unreadable migration state: {e}");
                Ok(MigrationState::NotStarted)
            }
            Err(e) => Err(e),
        }
    }

    fn persist(&self, state: &MigrationState) -> Result<()> {
        self.cache.set_json(MIGRATION_STATE_KEY, state)?;
        if *state == MigrationState::Completed {
            self.cache.set_flag(MIGRATED_FLAG_KEY, true)?;
        }
        Ok(())
    }

    /// Replay every legacy collection not yet migrated.
    ///
    /// Stops at the first collection with a failed write and returns
    /// `MigrationPartialFailure`; that collection keeps its local data and
    /// is replayed in full on the next run.
    pub fn run_once(&self) -> Result<MigrationReport> {
        let state = self.state()?;
        if state == MigrationState::Completed {
            debug!("Local data already migrated");
            return Ok(MigrationReport {
                already_completed: true,
                ..MigrationReport::default()
            });
        }

        let mut completed = match &state {
            MigrationState::InProgress { completed } => completed.clone(),
            MigrationState::NotStarted | MigrationState::Completed => Vec::new(),
        };
        let mut report = MigrationReport::default();

        for collection in LegacyCollection::ORDER {
            if state.is_done(collection) {
                continue;
            }

            let replay = match self.cache.get(collection.cache_key())? {
                Some(raw) => self.replay(collection, &raw),
                None => Replay::default(),
            };

            if replay.failed > 0 {
                if let Some(e) = &replay.last_error {
                    warn!("Migration of {} stopped: {e}", collection.name());
                }
                return Err(AppError::MigrationPartialFailure {
                    collection: collection.name(),
                    failed: replay.failed,
                });
            }

            self.cache.remove(collection.cache_key())?;
            completed.push(collection);
            self.persist(&MigrationState::InProgress {
                completed: completed.clone(),
            })?;
            if replay.migrated > 0 {
                info!("Migrated {} {}", replay.migrated, collection.name());
            }
            report.migrated.push((collection, replay.migrated));
            report.skipped += replay.skipped;
        }

        self.persist(&MigrationState::Completed)?;
        info!(
            "Local data migration completed ({} records, {} skipped)",
            report.total_migrated(),
            report.skipped
        );
        Ok(report)
    }

    fn replay(&self, collection: LegacyCollection, raw: &str) -> Replay {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding unreadable legacy {}: {e}", collection.name());
                return Replay {
                    skipped: 1,
                    ..Replay::default()
                };
            }
        };

        let now = self.clock.now();
        let mut replay = Replay::default();
        match collection {
            LegacyCollection::CompletedTasks => {
                for record in legacy_completed_tasks(&value, now, &mut replay.skipped) {
                    replay.save(&self.tasks, &record);
                }
            }
            LegacyCollection::TestScores => {
                let today = self.clock.today();
                for item in legacy_items(collection, value, &mut replay.skipped) {
                    match legacy_test_score(item, today, now) {
                        Some(record) => replay.save(&self.scores, &record),
                        None => replay.skipped += 1,
                    }
                }
            }
            LegacyCollection::Stats => match legacy_stats(value) {
                Some(record) => replay.save(&self.stats, &record),
                None => replay.skipped += 1,
            },
            LegacyCollection::StickyNotes => {
                for item in legacy_items(collection, value, &mut replay.skipped) {
                    match decode_legacy::<StickyNote>(item, now) {
                        Some(record) => replay.save(&self.notes, &record),
                        None => replay.skipped += 1,
                    }
                }
            }
            LegacyCollection::QuestionLogs => {
                for item in legacy_items(collection, value, &mut replay.skipped) {
                    match decode_legacy::<DailyQuestionLog>(item, now) {
                        Some(record) => replay.save(&self.questions, &record),
                        None => replay.skipped += 1,
                    }
                }
            }
        }
        replay
    }
}

fn legacy_items(collection: LegacyCollection, value: Value, skipped: &mut usize) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Object(_) => {
            warn!("Discarding legacy {}: expected a list", collection.name());
            *skipped += 1;
            Vec::new()
        }
    }
}

fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Completed tasks were stored as an object keyed by date. Values are
/// `{completedAt, activityType}` objects, bare timestamps, or `true`.
fn legacy_completed_tasks(
    value: &Value,
    now: DateTime<Utc>,
    skipped: &mut usize,
) -> Vec<CompletedTask> {
    let Some(entries) = value.as_object() else {
        warn!("Discarding legacy completed tasks: expected an object keyed by date");
        *skipped += 1;
        return Vec::new();
    };

    let mut tasks = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") else {
            warn!("Skipping legacy completed task with bad date '{key}'");
            *skipped += 1;
            continue;
        };
        if matches!(entry, Value::Bool(false) | Value::Null) {
            continue;
        }
        let completed_at = parse_timestamp(entry.get("completedAt"))
            .or_else(|| parse_timestamp(Some(entry)))
            .unwrap_or(now);
        let activity = entry
            .get("activityType")
            .and_then(Value::as_str)
            .and_then(ActivityType::parse)
            .or_else(|| catalog::activity_for(date))
            .unwrap_or(ActivityType::Revision);
        tasks.push(CompletedTask::new(date, activity, completed_at));
    }
    tasks
}

/// Fill the fields old clients sometimes left out or stored as numbers.
fn fill_legacy_fields(map: &mut Map<String, Value>, now: DateTime<Utc>) {
    let id = match map.get("id") {
        Some(Value::String(s)) if !s.is_empty() => None,
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => Some(new_record_id()),
    };
    if let Some(id) = id {
        map.insert("id".into(), Value::String(id));
    }
    if parse_timestamp(map.get("createdAt")).is_none() {
        map.insert("createdAt".into(), Value::String(now.to_rfc3339()));
    }
}

fn decode_legacy<T: Record>(item: Value, now: DateTime<Utc>) -> Option<T> {
    let Value::Object(mut map) = item else {
        warn!("Skipping legacy {} entry that is not an object", T::ENTITY);
        return None;
    };
    fill_legacy_fields(&mut map, now);
    let decoded = serde_json::from_value::<T>(Value::Object(map))
        .map_err(AppError::from)
        .and_then(T::normalized);
    match decoded {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Skipping unreadable legacy {}: {e}", T::ENTITY);
            None
        }
    }
}

fn as_u32(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Old score forms kept subject values as strings and sometimes omitted
/// the id or date. A missing id gets a fresh one.
fn legacy_test_score(item: Value, today: NaiveDate, now: DateTime<Utc>) -> Option<TestScore> {
    let Value::Object(mut map) = item else {
        return None;
    };
    fill_legacy_fields(&mut map, now);

    let (physics, chemistry, biology) = match validate_score(
        as_u32(map.get("physics")),
        as_u32(map.get("chemistry")),
        as_u32(map.get("biology")),
    ) {
        Ok(scores) => scores,
        Err(e) => {
            warn!("Skipping legacy test score: {e}");
            return None;
        }
    };
    let date = map
        .get("date")
        .and_then(Value::as_str)
        .and_then(|s| s.get(..10))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or(today);

    Some(TestScore::from_parts(
        map.get("id").and_then(Value::as_str).map_or_else(new_record_id, str::to_string),
        (physics, chemistry, biology),
        as_u32(map.get("timeTaken")).filter(|t| *t > 0),
        date,
        map.get("notes")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        parse_timestamp(map.get("createdAt")).unwrap_or(now),
    ))
}

fn legacy_stats(value: Value) -> Option<Stats> {
    let Value::Object(mut map) = value else {
        warn!("Discarding legacy stats: expected an object");
        return None;
    };
    // Dates were sometimes saved as full timestamps.
    if let Some(Value::String(last)) = map.get("lastCompletedDate") {
        if let Some(day) = last.get(..10) {
            let day = day.to_string();
            map.insert("lastCompletedDate".into(), Value::String(day));
        }
    }
    match serde_json::from_value(Value::Object(map)) {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Discarding unreadable legacy stats: {e}");
            None
        }
    }
}
