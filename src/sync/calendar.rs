use super::{freshest, log_skip, Change, Origin, SyncCore};
use crate::error::Result;
use crate::models::{new_record_id, CalendarTask, CalendarTaskPatch, NewCalendarTask};
use crate::validation::{validate_task_color, validate_task_title};
use chrono::NaiveDate;
use log::warn;

impl SyncCore {
    pub fn add_calendar_task(&self, input: &NewCalendarTask) -> Result<CalendarTask> {
        let _guard = self.lock_mutations();
        validate_task_title(&input.title).inspect_err(log_skip)?;
        if let Some(color) = &input.color {
            validate_task_color(color).inspect_err(log_skip)?;
        }
        let task = CalendarTask::new(new_record_id(), input, self.clock.now());
        self.write_calendar_task(task)
    }

    /// Merge `patch` onto the freshest copy of the task. An empty patch
    /// writes nothing and returns the local copy.
    pub fn update_calendar_task(&self, id: &str, patch: &CalendarTaskPatch) -> Result<CalendarTask> {
        let _guard = self.lock_mutations();
        self.patch_calendar_task(id, patch)
    }

    pub fn toggle_calendar_task_complete(&self, id: &str) -> Result<CalendarTask> {
        let _guard = self.lock_mutations();
        let mut task = freshest(&self.repos.calendar, &self.state.calendar_tasks, id)?;
        task.apply(
            &CalendarTaskPatch {
                completed: Some(!task.completed),
                ..CalendarTaskPatch::default()
            },
            self.clock.now(),
        );
        self.write_calendar_task(task)
    }

    /// Move a task to another day. Moving onto the same day is a no-op.
    pub fn move_calendar_task(&self, id: &str, date: NaiveDate) -> Result<CalendarTask> {
        let _guard = self.lock_mutations();
        if let Some(task) = self.state.calendar_tasks.find(id).filter(|t| t.date == date) {
            return Ok(task);
        }
        self.patch_calendar_task(id, &CalendarTaskPatch::move_to(date))
    }

    pub fn delete_calendar_task(&self, id: &str) -> Result<()> {
        let _guard = self.lock_mutations();
        self.repos
            .calendar
            .delete(id)
            .inspect_err(|e| warn!("Failed to delete calendar task '{id}': {e}"))?;
        self.state
            .calendar_tasks
            .apply(Origin::Local, Change::Remove(id.to_string()));
        Ok(())
    }

    pub fn calendar_tasks(&self) -> Vec<CalendarTask> {
        self.state.calendar_tasks.snapshot()
    }

    pub fn calendar_tasks_on(&self, date: NaiveDate) -> Vec<CalendarTask> {
        self.state
            .calendar_tasks
            .with(|tasks| tasks.iter().filter(|t| t.date == date).cloned().collect())
    }

    fn patch_calendar_task(&self, id: &str, patch: &CalendarTaskPatch) -> Result<CalendarTask> {
        if let Some(title) = &patch.title {
            validate_task_title(title).inspect_err(log_skip)?;
        }
        if let Some(color) = &patch.color {
            validate_task_color(color).inspect_err(log_skip)?;
        }
        if patch.is_empty() {
            if let Some(task) = self.state.calendar_tasks.find(id) {
                return Ok(task);
            }
        }
        let mut task = freshest(&self.repos.calendar, &self.state.calendar_tasks, id)?;
        task.apply(patch, self.clock.now());
        self.write_calendar_task(task)
    }

    fn write_calendar_task(&self, task: CalendarTask) -> Result<CalendarTask> {
        self.repos
            .calendar
            .save(&task)
            .inspect_err(|e| warn!("Failed to save calendar task '{}': {e}", task.id))?;
        self.state
            .calendar_tasks
            .apply(Origin::Local, Change::Upsert(task.clone()));
        Ok(task)
    }
}
