use super::{new_record_id, Record, TimerMode};
use crate::store::Collection;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A finished focus or break interval. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: String,
    pub date: NaiveDate,
    /// Minutes.
    pub duration: u32,
    #[serde(rename = "type")]
    pub kind: TimerMode,
    pub completed_at: DateTime<Utc>,
}

impl FocusSession {
    pub fn new(kind: TimerMode, duration_minutes: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: new_record_id(),
            date: completed_at.date_naive(),
            duration: duration_minutes,
            kind,
            completed_at,
        }
    }

    pub fn is_work(&self) -> bool {
        self.kind == TimerMode::Work
    }
}

impl Record for FocusSession {
    const COLLECTION: Collection = Collection::FocusSessions;
    const ENTITY: &'static str = "Focus session";

    fn id(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_session_takes_date_from_completion() {
        let done = Utc.with_ymd_and_hms(2026, 1, 9, 23, 30, 0).unwrap();
        let session = FocusSession::new(TimerMode::Work, 25, done);
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2026, 1, 9).unwrap());
        assert_eq!(session.duration, 25);
        assert!(session.is_work());
        assert!(!session.id.is_empty());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let now = Utc::now();
        let a = FocusSession::new(TimerMode::Break, 5, now);
        let b = FocusSession::new(TimerMode::Break, 5, now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_kind_serialized_as_type() {
        let session = FocusSession::new(TimerMode::Break, 5, Utc::now());
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["type"], "break");
    }
}
