use super::{log_skip, reload, Change, Origin, SyncCore};
use crate::error::Result;
use crate::models::{new_record_id, DailyQuestionLog, NewTestScore, QuestionInput, TestScore};
use chrono::NaiveDate;
use log::warn;

impl SyncCore {
    /// Validate and store a test result, then reload the collection.
    pub fn add_test_score(&self, input: &NewTestScore) -> Result<TestScore> {
        let _guard = self.lock_mutations();
        let score = TestScore::from_input(new_record_id(), input, self.clock.today(), self.clock.now())
            .inspect_err(log_skip)?;
        self.repos
            .scores
            .save(&score)
            .inspect_err(|e| warn!("Failed to save test score: {e}"))?;
        reload(&self.repos.scores, &self.state.test_scores, Change::Upsert(score.clone()));
        Ok(score)
    }

    pub fn delete_test_score(&self, id: &str) -> Result<()> {
        let _guard = self.lock_mutations();
        self.repos
            .scores
            .delete(id)
            .inspect_err(|e| warn!("Failed to delete test score '{id}': {e}"))?;
        reload(&self.repos.scores, &self.state.test_scores, Change::Remove(id.to_string()));
        Ok(())
    }

    pub fn test_scores(&self) -> Vec<TestScore> {
        self.state.test_scores.snapshot()
    }

    /// Record today's practice. A second call on the same day replaces the
    /// first.
    pub fn add_daily_questions(&self, input: &QuestionInput) -> Result<DailyQuestionLog> {
        let _guard = self.lock_mutations();
        let log = DailyQuestionLog::new(self.clock.today(), input, self.clock.now());
        self.repos
            .questions
            .save(&log)
            .inspect_err(|e| warn!("Failed to save question log: {e}"))?;
        self.state.question_logs.apply(Origin::Local, Change::Upsert(log.clone()));
        Ok(log)
    }

    pub fn question_logs(&self) -> Vec<DailyQuestionLog> {
        self.state.question_logs.snapshot()
    }

    pub fn question_log_on(&self, date: NaiveDate) -> Option<DailyQuestionLog> {
        self.state.question_logs.find(&date.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::Clock;
    use crate::error::AppError;
    use crate::models::{NewTestScore, QuestionInput, TallyInput};
    use crate::store::{Collection, DocumentStore, MemoryStore};
    use crate::test_utils::{clock_on, date, start_sync};
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_score_total_and_max() {
        let store = Arc::new(MemoryStore::new());
        let clock = clock_on("2026-01-10");
        let core = start_sync(&store, &clock);

        let first = core
            .add_test_score(&NewTestScore::new(150, 140, 300, clock.today()))
            .unwrap();
        assert_eq!(first.total, 590);

        clock.advance(Duration::days(1));
        core.add_test_score(&NewTestScore::new(170, 160, 320, clock.today()))
            .unwrap();

        assert_eq!(core.test_scores().len(), 2);
        assert_eq!(core.statistics().max_score, 650);
    }

    #[test]
    fn test_incomplete_score_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let core = start_sync(&store, &clock_on("2026-01-10"));
        let input = NewTestScore {
            physics: Some(150),
            ..NewTestScore::default()
        };

        let err = core.add_test_score(&input).unwrap_err();
        assert!(matches!(err, AppError::ValidationSkipped { .. }));
        assert!(store.is_empty(Collection::TestScores));
        assert!(core.test_scores().is_empty());
    }

    #[test]
    fn test_score_without_date_uses_today() {
        let store = Arc::new(MemoryStore::new());
        let core = start_sync(&store, &clock_on("2026-01-10"));
        let input = NewTestScore {
            date: None,
            ..NewTestScore::new(1, 2, 3, date("2026-01-01"))
        };
        let score = core.add_test_score(&input).unwrap();
        assert_eq!(score.date, date("2026-01-10"));
    }

    #[test]
    fn test_delete_score_converges() {
        let store = Arc::new(MemoryStore::new());
        let core = start_sync(&store, &clock_on("2026-01-10"));
        let score = core
            .add_test_score(&NewTestScore::new(100, 100, 100, date("2026-01-10")))
            .unwrap();

        core.delete_test_score(&score.id).unwrap();
        assert!(core.test_scores().is_empty());
        assert!(store.is_empty(Collection::TestScores));
    }

    #[test]
    fn test_out_of_range_remote_score_is_dropped() {
        let store = Arc::new(MemoryStore::new());
        let core = start_sync(&store, &clock_on("2026-01-10"));
        core.add_test_score(&NewTestScore::new(100, 100, 100, date("2026-01-10")))
            .unwrap();

        store
            .put(
                Collection::TestScores,
                "test-user_x",
                json!({
                    "id": "x",
                    "physics": 4_000_000_000_u32,
                    "chemistry": 4_000_000_000_u32,
                    "biology": 0,
                    "total": 0,
                    "date": "2026-01-10",
                    "createdAt": "2026-01-10T08:00:00Z",
                    "userId": "test-user"
                }),
            )
            .unwrap();

        let scores = core.test_scores();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].total, 300);
        assert_eq!(core.statistics().max_score, 300);
    }

    #[test]
    fn test_huge_question_counts_do_not_overflow() {
        let store = Arc::new(MemoryStore::new());
        let core = start_sync(&store, &clock_on("2026-01-12"));
        let input = QuestionInput {
            physics: TallyInput::new(u32::MAX, 1),
            zoology: TallyInput::new(1, 1),
            ..QuestionInput::default()
        };

        let log = core.add_daily_questions(&input).unwrap();
        assert_eq!(log.total, u32::MAX);
        assert_eq!(core.question_logs().len(), 1);
        assert_eq!(core.statistics().total_questions, u32::MAX);
    }

    #[test]
    fn test_same_day_questions_replace() {
        let store = Arc::new(MemoryStore::new());
        let core = start_sync(&store, &clock_on("2026-01-12"));
        let first = QuestionInput {
            physics: TallyInput::new(10, 5),
            ..QuestionInput::default()
        };
        let second = QuestionInput {
            botany: TallyInput::new(30, 10),
            ..QuestionInput::default()
        };

        core.add_daily_questions(&first).unwrap();
        let log = core.add_daily_questions(&second).unwrap();

        assert_eq!(core.question_logs().len(), 1);
        assert_eq!(store.len(Collection::QuestionLogs), 1);
        let stored = core.question_log_on(date("2026-01-12")).unwrap();
        assert_eq!(stored, log);
        assert_eq!(stored.total, 40);
        assert_eq!(stored.accuracy, 75);
        assert_eq!(stored.physics.total, 0);
    }

    #[test]
    fn test_question_totals_feed_statistics() {
        let store = Arc::new(MemoryStore::new());
        let clock = clock_on("2026-01-12");
        let core = start_sync(&store, &clock);
        let input = QuestionInput {
            zoology: TallyInput::new(7, 3),
            ..QuestionInput::default()
        };
        core.add_daily_questions(&input).unwrap();
        clock.advance(Duration::days(1));
        core.add_daily_questions(&input).unwrap();

        let stats = core.statistics();
        assert_eq!(stats.total_questions, 20);
        assert_eq!(stats.question_days, 2);
    }
}
