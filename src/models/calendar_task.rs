use super::Record;
use crate::store::Collection;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_TASK_COLOR: &str = "blue";

fn default_task_color() -> String {
    DEFAULT_TASK_COLOR.to_string()
}

/// A free-form task placed on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarTask {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    /// Category tag, one of `catalog::TASK_COLORS`.
    #[serde(default = "default_task_color")]
    pub color: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCalendarTask {
    pub title: String,
    pub date: NaiveDate,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarTaskPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub color: Option<String>,
    pub completed: Option<bool>,
}

impl CalendarTaskPatch {
    pub fn move_to(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.color.is_none() && self.completed.is_none()
    }
}

impl CalendarTask {
    pub fn new(id: String, input: &NewCalendarTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title.trim().to_string(),
            date: input.date,
            color: input.color.clone().unwrap_or_else(default_task_color),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow merge of the provided fields; bumps `updated_at`.
    pub fn apply(&mut self, patch: &CalendarTaskPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now;
    }
}

impl Record for CalendarTask {
    const COLLECTION: Collection = Collection::CalendarTasks;
    const ENTITY: &'static str = "Calendar task";

    fn id(&self) -> String {
        self.id.clone()
    }
}
