use super::{Change, Origin, SyncCore};
use crate::catalog::ActivityType;
use crate::error::Result;
use crate::models::stats::ToggleContext;
use crate::models::{CompletedTask, Stats};
use chrono::NaiveDate;
use log::warn;

impl SyncCore {
    /// Mark `date` done, or unmark it if it already is, and move XP by the
    /// activity's value. Returns true when the day is now marked.
    ///
    /// The day is written first; stats are updated locally even if their
    /// write then fails, and that failure is returned.
    pub fn toggle_task(&self, date: NaiveDate, activity: ActivityType) -> Result<bool> {
        let _guard = self.lock_mutations();
        let id = date.to_string();
        let marked = !self.state.completed_tasks.contains(&id);

        if marked {
            let task = CompletedTask::new(date, activity, self.clock.now());
            self.repos
                .tasks
                .save(&task)
                .inspect_err(|e| warn!("Failed to mark {date} done: {e}"))?;
            self.state.completed_tasks.apply(Origin::Local, Change::Upsert(task));
        } else {
            self.repos
                .tasks
                .delete(&id)
                .inspect_err(|e| warn!("Failed to unmark {date}: {e}"))?;
            self.state.completed_tasks.apply(Origin::Local, Change::Remove(id));
        }

        let ctx = ToggleContext {
            today: self.clock.today(),
            yesterday: self.clock.yesterday(),
            now: self.clock.now(),
        };
        let next = self.stats().after_toggle(date, marked, activity.xp(), ctx);
        self.state.stats.apply(Origin::Local, Change::Replace(vec![next.clone()]));
        self.repos
            .stats
            .save(&next)
            .inspect_err(|e| warn!("Failed to save stats: {e}"))?;
        Ok(marked)
    }

    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.state.completed_tasks.contains(&date.to_string())
    }

    pub fn completed_tasks(&self) -> Vec<CompletedTask> {
        self.state.completed_tasks.snapshot()
    }

    pub fn stats(&self) -> Stats {
        self.state.stats.first().unwrap_or_default()
    }
}
