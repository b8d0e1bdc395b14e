use super::Record;
use crate::error::Result;
use crate::store::Collection;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTally {
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub wrong: u32,
    #[serde(default)]
    pub total: u32,
}

impl SubjectTally {
    pub fn new(correct: u32, wrong: u32) -> Self {
        Self {
            correct,
            wrong,
            total: correct.saturating_add(wrong),
        }
    }
}

/// Practice counts for one subject; absent counts are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyInput {
    pub correct: Option<u32>,
    pub wrong: Option<u32>,
}

impl TallyInput {
    pub fn new(correct: u32, wrong: u32) -> Self {
        Self {
            correct: Some(correct),
            wrong: Some(wrong),
        }
    }

    fn tally(self) -> SubjectTally {
        SubjectTally::new(self.correct.unwrap_or(0), self.wrong.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionInput {
    pub physics: TallyInput,
    pub chemistry: TallyInput,
    pub botany: TallyInput,
    pub zoology: TallyInput,
}

/// One day of question practice. The id is the calendar date, so a second
/// log on the same day replaces the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuestionLog {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub physics: SubjectTally,
    #[serde(default)]
    pub chemistry: SubjectTally,
    #[serde(default)]
    pub botany: SubjectTally,
    #[serde(default)]
    pub zoology: SubjectTally,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub total_wrong: u32,
    #[serde(default)]
    pub total: u32,
    /// Percentage of correct answers, rounded; 0 when nothing was attempted.
    #[serde(default)]
    pub accuracy: u32,
    pub created_at: DateTime<Utc>,
}

impl DailyQuestionLog {
    pub fn new(date: NaiveDate, input: &QuestionInput, created_at: DateTime<Utc>) -> Self {
        Self::from_tallies(
            date,
            [
                input.physics.tally(),
                input.chemistry.tally(),
                input.botany.tally(),
                input.zoology.tally(),
            ],
            created_at,
        )
    }

    /// Build from per-subject tallies (physics, chemistry, botany, zoology),
    /// deriving every aggregate.
    pub fn from_tallies(date: NaiveDate, tallies: [SubjectTally; 4], created_at: DateTime<Utc>) -> Self {
        let [physics, chemistry, botany, zoology] =
            tallies.map(|t| SubjectTally::new(t.correct, t.wrong));
        let total_correct = sum([physics.correct, chemistry.correct, botany.correct, zoology.correct]);
        let total_wrong = sum([physics.wrong, chemistry.wrong, botany.wrong, zoology.wrong]);
        let total = total_correct.saturating_add(total_wrong);

        Self {
            id: date.to_string(),
            date,
            physics,
            chemistry,
            botany,
            zoology,
            total_correct,
            total_wrong,
            total,
            accuracy: accuracy_percent(total_correct, total),
            created_at,
        }
    }
}

fn sum(counts: [u32; 4]) -> u32 {
    counts.into_iter().fold(0, u32::saturating_add)
}

/// `round(100 * correct / total)`, half rounding up; 0 for an empty day.
pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct);
    let total = u64::from(total);
    let rounded = (200 * correct + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(100)
}

impl Record for DailyQuestionLog {
    const COLLECTION: Collection = Collection::QuestionLogs;
    const ENTITY: &'static str = "Question log";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn normalized(self) -> Result<Self> {
        Ok(Self::from_tallies(
            self.date,
            [self.physics, self.chemistry, self.botany, self.zoology],
            self.created_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_aggregates_from_input() {
        let input = QuestionInput {
            physics: TallyInput::new(20, 5),
            chemistry: TallyInput::new(30, 10),
            botany: TallyInput { correct: Some(15), wrong: None },
            zoology: TallyInput::default(),
        };
        let log = DailyQuestionLog::new(date("2026-01-10"), &input, Utc::now());

        assert_eq!(log.id, "2026-01-10");
        assert_eq!(log.physics.total, 25);
        assert_eq!(log.botany, SubjectTally::new(15, 0));
        assert_eq!(log.total_correct, 65);
        assert_eq!(log.total_wrong, 15);
        assert_eq!(log.total, 80);
        assert_eq!(log.accuracy, 81); // 81.25
    }

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(1, 2), 50);
        assert_eq!(accuracy_percent(1, 3), 33);
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(1, 8), 13); // 12.5 rounds up
        assert_eq!(accuracy_percent(7, 7), 100);
    }

    #[test]
    fn test_empty_day_has_zero_accuracy() {
        let log = DailyQuestionLog::new(date("2026-01-10"), &QuestionInput::default(), Utc::now());
        assert_eq!(log.total, 0);
        assert_eq!(log.accuracy, 0);
    }

    #[test]
    fn test_normalized_rebuilds_partial_document() {
        let log: DailyQuestionLog = serde_json::from_value(json!({
            "id": "2026-01-10_1736500000000",
            "date": "2026-01-10",
            "physics": { "correct": 3, "wrong": 1 },
            "createdAt": "2026-01-10T09:00:00Z"
        }))
        .unwrap();
        let log = log.normalized().unwrap();
        assert_eq!(log.id, "2026-01-10");
        assert_eq!(log.physics.total, 4);
        assert_eq!(log.total, 4);
        assert_eq!(log.accuracy, 75);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let input = QuestionInput {
            physics: TallyInput::new(u32::MAX, 1),
            chemistry: TallyInput::new(5, u32::MAX),
            ..QuestionInput::default()
        };
        let log = DailyQuestionLog::new(date("2026-01-10"), &input, Utc::now());

        assert_eq!(log.physics.total, u32::MAX);
        assert_eq!(log.total_correct, u32::MAX);
        assert_eq!(log.total_wrong, u32::MAX);
        assert_eq!(log.total, u32::MAX);
        assert_eq!(log.accuracy, 100);
    }
}
