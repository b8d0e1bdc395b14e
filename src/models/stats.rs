use super::Record;
use crate::constants::STATS_RECORD_ID;
use crate::store::Collection;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Gamification counters. Singleton; changes only when a schedule day is
/// toggled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(rename = "totalXP", default)]
    pub total_xp: u32,
    #[serde(default)]
    pub streak_current: u32,
    #[serde(default)]
    pub streak_max: u32,
    #[serde(default)]
    pub last_completed_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Calendar context a toggle is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleContext {
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
    pub now: DateTime<Utc>,
}

impl Stats {
    /// Stats after marking (`marked == true`) or unmarking `date`.
    ///
    /// XP moves by `xp` and never drops below zero. The streak is only
    /// evaluated when today's date is marked; unmarking never rolls it back.
    #[must_use]
    pub fn after_toggle(&self, date: NaiveDate, marked: bool, xp: u32, ctx: ToggleContext) -> Stats {
        let mut next = self.clone();

        next.total_xp = if marked {
            self.total_xp.saturating_add(xp)
        } else {
            self.total_xp.saturating_sub(xp)
        };

        if marked && date == ctx.today {
            if self.last_completed_date == Some(ctx.yesterday) {
                next.streak_current = self.streak_current.saturating_add(1);
            } else if self.last_completed_date != Some(ctx.today) {
                next.streak_current = 1;
            }
            next.streak_max = self.streak_max.max(next.streak_current);
        }

        if marked {
            next.last_completed_date = Some(date);
        }
        next.updated_at = Some(ctx.now);
        next
    }
}

impl Record for Stats {
    const COLLECTION: Collection = Collection::Stats;
    const ENTITY: &'static str = "Stats";

    fn id(&self) -> String {
        STATS_RECORD_ID.to_string()
    }
}
