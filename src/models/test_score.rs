use super::Record;
use crate::error::Result;
use crate::store::Collection;
use crate::validation::validate_score;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A logged test result. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestScore {
    pub id: String,
    pub physics: u32,
    pub chemistry: u32,
    pub biology: u32,
    /// Always `physics + chemistry + biology`.
    pub total: u32,
    /// Minutes spent on the test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<u32>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Score submission as entered. A missing subject means the form was
/// incomplete and nothing is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTestScore {
    pub physics: Option<u32>,
    pub chemistry: Option<u32>,
    pub biology: Option<u32>,
    pub time_taken: Option<u32>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewTestScore {
    pub fn new(physics: u32, chemistry: u32, biology: u32, date: NaiveDate) -> Self {
        Self {
            physics: Some(physics),
            chemistry: Some(chemistry),
            biology: Some(biology),
            time_taken: None,
            date: Some(date),
            notes: None,
        }
    }
}

impl TestScore {
    /// Validate a submission and build the stored record. `fallback_date`
    /// is used when the submission carries no date.
    pub fn from_input(
        id: String,
        input: &NewTestScore,
        fallback_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let (physics, chemistry, biology) =
            validate_score(input.physics, input.chemistry, input.biology)?;
        let notes = input
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self::from_parts(
            id,
            (physics, chemistry, biology),
            input.time_taken.filter(|t| *t > 0),
            input.date.unwrap_or(fallback_date),
            notes,
            created_at,
        ))
    }

    /// Build from already validated `(physics, chemistry, biology)` scores.
    pub fn from_parts(
        id: String,
        (physics, chemistry, biology): (u32, u32, u32),
        time_taken: Option<u32>,
        date: NaiveDate,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            physics,
            chemistry,
            biology,
            total: physics.saturating_add(chemistry).saturating_add(biology),
            time_taken,
            date,
            notes,
            created_at,
        }
    }
}

impl Record for TestScore {
    const COLLECTION: Collection = Collection::TestScores;
    const ENTITY: &'static str = "Test score";

    fn id(&self) -> String {
        self.id.clone()
    }

    /// Documents written by other clients are range-checked like new input.
    fn normalized(mut self) -> Result<Self> {
        let (physics, chemistry, biology) =
            validate_score(Some(self.physics), Some(self.chemistry), Some(self.biology))?;
        self.total = physics + chemistry + biology;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_total_is_subject_sum() {
        let input = NewTestScore::new(150, 140, 300, date("2026-02-01"));
        let score = TestScore::from_input("s1".into(), &input, date("2026-02-02"), Utc::now()).unwrap();
        assert_eq!(score.total, 590);
        assert_eq!(score.date, date("2026-02-01"));
    }

    #[test]
    fn test_missing_subject_is_skipped() {
        let input = NewTestScore {
            physics: Some(100),
            chemistry: None,
            biology: Some(200),
            ..NewTestScore::default()
        };
        let result = TestScore::from_input("s1".into(), &input, date("2026-02-02"), Utc::now());
        assert!(matches!(result, Err(AppError::ValidationSkipped { field: "chemistry", .. })));
    }

    #[test]
    fn test_out_of_range_subject_is_skipped() {
        let input = NewTestScore::new(181, 100, 100, date("2026-02-01"));
        let result = TestScore::from_input("s1".into(), &input, date("2026-02-02"), Utc::now());
        assert!(matches!(result, Err(AppError::ValidationSkipped { field: "physics", .. })));
    }

    #[test]
    fn test_missing_date_uses_fallback_and_blank_notes_dropped() {
        let input = NewTestScore {
            physics: Some(0),
            chemistry: Some(0),
            biology: Some(0),
            notes: Some("   ".into()),
            ..NewTestScore::default()
        };
        let score = TestScore::from_input("s1".into(), &input, date("2026-02-02"), Utc::now()).unwrap();
        assert_eq!(score.date, date("2026-02-02"));
        assert_eq!(score.total, 0);
        assert!(score.notes.is_none());
    }

    #[test]
    fn test_normalized_repairs_stored_total() {
        let score: TestScore = serde_json::from_value(json!({
            "id": "s1",
            "physics": 100,
            "chemistry": 100,
            "biology": 200,
            "total": 999,
            "date": "2026-02-01",
            "createdAt": "2026-02-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(score.normalized().unwrap().total, 400);
    }

    #[test]
    fn test_normalized_rejects_out_of_range_document() {
        let score: TestScore = serde_json::from_value(json!({
            "id": "s2",
            "physics": 4_000_000_000_u32,
            "chemistry": 4_000_000_000_u32,
            "biology": 10,
            "total": 0,
            "date": "2026-02-01",
            "createdAt": "2026-02-01T08:00:00Z"
        }))
        .unwrap();
        let err = score.normalized().unwrap_err();
        assert!(matches!(err, AppError::ValidationSkipped { field: "physics", .. }));
    }
}
