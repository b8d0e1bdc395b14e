use super::Record;
use crate::catalog::ActivityType;
use crate::store::Collection;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A schedule day marked as done. Keyed by its date: at most one per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub date: NaiveDate,
    pub completed_at: DateTime<Utc>,
    pub activity_type: ActivityType,
}

impl CompletedTask {
    pub fn new(date: NaiveDate, activity_type: ActivityType, completed_at: DateTime<Utc>) -> Self {
        Self {
            date,
            completed_at,
            activity_type,
        }
    }
}

impl Record for CompletedTask {
    const COLLECTION: Collection = Collection::CompletedTasks;
    const ENTITY: &'static str = "Completed task";

    fn id(&self) -> String {
        self.date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_is_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let task = CompletedTask::new(date, ActivityType::Revision, Utc::now());
        assert_eq!(task.id(), "2026-01-05");
    }

    #[test]
    fn test_wire_format() {
        let task: CompletedTask = serde_json::from_value(json!({
            "date": "2026-01-07",
            "completedAt": "2026-01-07T10:00:00Z",
            "activityType": "TEST_11"
        }))
        .unwrap();
        assert_eq!(task.activity_type, ActivityType::Test11);
        assert_eq!(task.date, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
    }
}
