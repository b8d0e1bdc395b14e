//! Derived state: rank, XP progress, statistics and achievements.
//!
//! Pure functions over the synchronized records. Nothing here touches the
//! store.

use crate::catalog::{Achievement, Rank, ACHIEVEMENTS, RANKS};
use crate::models::{CompletedTask, DailyQuestionLog, Stats, TestScore};
use serde::Serialize;

const FIRST_RANK: Rank = Rank {
    name: "Aspirant",
    min_xp: 0,
    color: "#86868b",
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub completed_count: u32,
    pub progress_percent: u32,
    pub mocks_completed: u32,
    pub analysis_completed: u32,
    pub max_score: u32,
    pub streak_current: u32,
    pub streak_max: u32,
    pub total_questions: u32,
    pub question_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpProgress {
    /// XP earned since reaching the current rank.
    pub current: u32,
    /// XP between the current and the next rank; 0 at the top rank.
    pub needed: u32,
    pub percent: u32,
}

/// `round(100 * part / whole)`, half rounding up; 0 when `whole` is 0.
fn percent_of(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part);
    let whole = u64::from(whole);
    u32::try_from((200 * part + whole) / (2 * whole)).unwrap_or(u32::MAX)
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn rank_index(total_xp: u32) -> usize {
    RANKS
        .iter()
        .rposition(|rank| rank.min_xp <= total_xp)
        .unwrap_or(0)
}

pub fn current_rank(total_xp: u32) -> Rank {
    RANKS.get(rank_index(total_xp)).copied().unwrap_or(FIRST_RANK)
}

pub fn next_rank(total_xp: u32) -> Option<Rank> {
    RANKS.get(rank_index(total_xp) + 1).copied()
}

pub fn xp_progress(total_xp: u32) -> XpProgress {
    let current = current_rank(total_xp);
    // Past the last rank the whole XP total is shown as a full bar.
    let Some(next) = next_rank(total_xp) else {
        return XpProgress {
            current: total_xp,
            needed: total_xp,
            percent: 100,
        };
    };
    let earned = total_xp.saturating_sub(current.min_xp);
    let needed = next.min_xp - current.min_xp;
    XpProgress {
        current: earned,
        needed,
        percent: percent_of(earned, needed).min(100),
    }
}

pub fn statistics(
    completed: &[CompletedTask],
    scores: &[TestScore],
    questions: &[DailyQuestionLog],
    stats: &Stats,
    total_schedule_days: u32,
) -> Statistics {
    let completed_count = count(completed.len());
    Statistics {
        completed_count,
        progress_percent: percent_of(completed_count, total_schedule_days),
        mocks_completed: count(
            completed
                .iter()
                .filter(|t| t.activity_type.is_mock_or_test())
                .count(),
        ),
        analysis_completed: count(completed.iter().filter(|t| t.activity_type.is_analysis()).count()),
        max_score: scores.iter().map(|s| s.total).max().unwrap_or(0),
        streak_current: stats.streak_current,
        streak_max: stats.streak_max,
        total_questions: questions.iter().map(|q| q.total).fold(0, u32::saturating_add),
        question_days: count(questions.len()),
    }
}

pub fn unlocked_achievements(statistics: &Statistics) -> Vec<&'static Achievement> {
    ACHIEVEMENTS
        .iter()
        .filter(|achievement| (achievement.condition)(statistics))
        .collect()
}
