pub mod calendar_task;
pub mod completed_task;
pub mod focus_session;
pub mod question_log;
pub mod stats;
pub mod sticky_note;
pub mod test_score;
pub mod timer_state;

pub use calendar_task::{CalendarTask, CalendarTaskPatch, NewCalendarTask};
pub use completed_task::CompletedTask;
pub use focus_session::FocusSession;
pub use question_log::{DailyQuestionLog, QuestionInput, SubjectTally, TallyInput};
pub use stats::Stats;
pub use sticky_note::{NewStickyNote, StickyNote, StickyNotePatch};
pub use test_score::{NewTestScore, TestScore};
pub use timer_state::{TimerMode, TimerState};

use crate::error::Result;
use crate::store::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed document living in one store collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Human-readable entity name for errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> String;

    /// Re-derive computed fields after decoding a document, so a stored
    /// record with stale aggregates never reaches the in-memory state.
    /// A record that fails validation is rejected.
    fn normalized(self) -> Result<Self> {
        Ok(self)
    }
}

/// New record id for entities without a natural key.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
