// src/constants.rs

/// Scoping tag written on every document when no user is configured.
pub const DEFAULT_USER_ID: &str = "default-user";

/// Document field carrying the scoping tag.
pub const USER_FIELD: &str = "userId";

/// Record id of the gamification stats singleton.
pub const STATS_RECORD_ID: &str = "stats";

/// Record id of the focus timer singleton.
pub const TIMER_RECORD_ID: &str = "timer";

/// Number of days the schedule progress percentage is measured against.
pub const TOTAL_SCHEDULE_DAYS: u32 = 84;

/// Quiet period before a burst of timer changes is written.
pub const TIMER_DEBOUNCE_MILLIS: u64 = 1000;

/// Maximum physics/chemistry score on a test
pub const MAX_PHYSICS_SCORE: u32 = 180;
pub const MAX_CHEMISTRY_SCORE: u32 = 180;

/// Maximum biology score on a test (botany + zoology)
pub const MAX_BIOLOGY_SCORE: u32 = 360;

/// Default focus interval in minutes
pub const DEFAULT_WORK_MINUTES: u32 = 25;

/// Default break interval in minutes
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Longest focus or break interval the timer accepts, in minutes (4 hours)
pub const MAX_TIMER_MINUTES: u32 = 4 * 60;

/// Maximum sticky note length
pub const MAX_NOTE_TEXT_LEN: usize = 2000;

/// Maximum calendar task title length
pub const MAX_TASK_TITLE_LEN: usize = 200;

/// Local cache keys for data written before remote sync existed.
pub const LEGACY_COMPLETED_KEY: &str = "neet_completed_tasks";
pub const LEGACY_SCORES_KEY: &str = "neet_test_scores";
pub const LEGACY_STATS_KEY: &str = "neet_stats";
pub const LEGACY_QUESTIONS_KEY: &str = "neet_daily_questions";
pub const LEGACY_NOTES_KEY: &str = "neet_sticky_notes";

/// Boolean flag set once the legacy data has been moved to the store.
pub const MIGRATED_FLAG_KEY: &str = "neet_remote_migrated";

/// Persisted migration progress (see `migration::MigrationState`).
pub const MIGRATION_STATE_KEY: &str = "neet_migration_state";
