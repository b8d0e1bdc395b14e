use super::Record;
use crate::constants::{DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES, TIMER_RECORD_ID};
use crate::store::Collection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Work,
    Break,
}

impl TimerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }

    /// The mode that follows a finished interval of this mode.
    pub fn next(self) -> TimerMode {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }
}

/// Persisted focus timer, so a countdown survives reloads and moves
/// between devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    /// Seconds remaining in the current interval.
    pub time_left: u32,
    pub is_running: bool,
    pub sessions_completed: u32,
    /// Minutes.
    pub selected_work_duration: u32,
    /// Minutes.
    pub selected_break_duration: u32,
    /// Absolute deadline of the running interval; `None` while paused.
    #[serde(default)]
    pub expected_end_time: Option<DateTime<Utc>>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            mode: TimerMode::Work,
            time_left: DEFAULT_WORK_MINUTES * 60,
            is_running: false,
            sessions_completed: 0,
            selected_work_duration: DEFAULT_WORK_MINUTES,
            selected_break_duration: DEFAULT_BREAK_MINUTES,
            expected_end_time: None,
        }
    }
}

impl TimerState {
    /// Selected length of `mode` in minutes.
    pub fn duration_minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.selected_work_duration,
            TimerMode::Break => self.selected_break_duration,
        }
    }

    /// Selected length of `mode` in seconds.
    pub fn duration_secs(&self, mode: TimerMode) -> u32 {
        self.duration_minutes(mode) * 60
    }
}

impl Record for TimerState {
    const COLLECTION: Collection = Collection::TimerState;
    const ENTITY: &'static str = "Timer state";

    fn id(&self) -> String {
        TIMER_RECORD_ID.to_string()
    }
}
