//! Static tables: activity types, ranks, achievements and the revision
//! schedule. Read-only, no I/O.

use crate::derived::Statistics;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    #[serde(rename = "REVISION")]
    Revision,
    #[serde(rename = "TEST_11")]
    Test11,
    #[serde(rename = "TEST_12")]
    Test12,
    #[serde(rename = "TEST_FULL")]
    TestFull,
    #[serde(rename = "MOCK")]
    Mock,
    #[serde(rename = "ANALYSIS")]
    Analysis,
    #[serde(rename = "BACKLOG")]
    Backlog,
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "LIGHT_REVISE")]
    LightRevise,
    #[serde(rename = "FINAL_TOUCH")]
    FinalTouch,
}

impl ActivityType {
    pub const ALL: [ActivityType; 10] = [
        ActivityType::Revision,
        ActivityType::Test11,
        ActivityType::Test12,
        ActivityType::TestFull,
        ActivityType::Mock,
        ActivityType::Analysis,
        ActivityType::Backlog,
        ActivityType::Rest,
        ActivityType::LightRevise,
        ActivityType::FinalTouch,
    ];

    /// The tag stored on completed tasks.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Revision => "REVISION",
            ActivityType::Test11 => "TEST_11",
            ActivityType::Test12 => "TEST_12",
            ActivityType::TestFull => "TEST_FULL",
            ActivityType::Mock => "MOCK",
            ActivityType::Analysis => "ANALYSIS",
            ActivityType::Backlog => "BACKLOG",
            ActivityType::Rest => "REST",
            ActivityType::LightRevise => "LIGHT_REVISE",
            ActivityType::FinalTouch => "FINAL_TOUCH",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == tag)
    }

    pub fn xp(self) -> u32 {
        match self {
            ActivityType::Revision | ActivityType::LightRevise => 10,
            ActivityType::Test11
            | ActivityType::Test12
            | ActivityType::TestFull
            | ActivityType::Mock => 50,
            ActivityType::Analysis => 30,
            ActivityType::Backlog => 20,
            ActivityType::Rest => 5,
            ActivityType::FinalTouch => 15,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityType::Revision => "Revision",
            ActivityType::Test11 => "Test (11th)",
            ActivityType::Test12 => "Test (12th)",
            ActivityType::TestFull => "Full Test",
            ActivityType::Mock => "Mock Test",
            ActivityType::Analysis => "Analysis",
            ActivityType::Backlog => "Backlog",
            ActivityType::Rest => "Rest Day",
            ActivityType::LightRevise => "Light Revise",
            ActivityType::FinalTouch => "Final Touch",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ActivityType::Revision => "#007aff",
            ActivityType::Test11
            | ActivityType::Test12
            | ActivityType::TestFull
            | ActivityType::Mock => "#ff9500",
            ActivityType::Analysis => "#af52de",
            ActivityType::Backlog => "#ff3b30",
            ActivityType::Rest => "#34c759",
            ActivityType::LightRevise => "#5ac8fa",
            ActivityType::FinalTouch => "#5856d6",
        }
    }

    /// Mock and test days both count towards "mocks completed".
    pub fn is_mock_or_test(self) -> bool {
        let tag = self.as_str();
        tag.contains("MOCK") || tag.contains("TEST")
    }

    pub fn is_analysis(self) -> bool {
        self == ActivityType::Analysis
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub name: &'static str,
    pub min_xp: u32,
    pub color: &'static str,
}

/// Ordered by strictly increasing `min_xp`; the first entry starts at 0.
pub const RANKS: &[Rank] = &[
    Rank { name: "Aspirant", min_xp: 0, color: "#86868b" },
    Rank { name: "Intern", min_xp: 200, color: "#5ac8fa" },
    Rank { name: "Resident", min_xp: 500, color: "#34c759" },
    Rank { name: "Specialist", min_xp: 1000, color: "#ff9500" },
    Rank { name: "Surgeon", min_xp: 2000, color: "#ff2d55" },
];

pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub condition: fn(&Statistics) -> bool,
}

impl std::fmt::Debug for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Achievement").field("id", &self.id).finish_non_exhaustive()
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_day",
        name: "First Step",
        description: "Complete your first day",
        condition: |s| s.completed_count >= 1,
    },
    Achievement {
        id: "week_warrior",
        name: "Week Warrior",
        description: "Complete a full week",
        condition: |s| s.streak_max >= 7,
    },
    Achievement {
        id: "streak_7",
        name: "7-Day Streak",
        description: "Maintain a 7-day streak",
        condition: |s| s.streak_current >= 7,
    },
    Achievement {
        id: "streak_14",
        name: "Fortnight Fighter",
        description: "Maintain a 14-day streak",
        condition: |s| s.streak_current >= 14,
    },
    Achievement {
        id: "score_600",
        name: "600+ Club",
        description: "Score 600+ in a mock",
        condition: |s| s.max_score >= 600,
    },
    Achievement {
        id: "score_700",
        name: "700+ Score",
        description: "Score 700+ in a mock",
        condition: |s| s.max_score >= 700,
    },
    Achievement {
        id: "half_way",
        name: "Halfway There",
        description: "Complete 50% of schedule",
        condition: |s| s.progress_percent >= 50,
    },
    Achievement {
        id: "finisher",
        name: "The Finisher",
        description: "Complete entire schedule",
        condition: |s| s.progress_percent >= 100,
    },
    Achievement {
        id: "mock_master",
        name: "Mock Master",
        description: "Complete 10 mock tests",
        condition: |s| s.mocks_completed >= 10,
    },
    Achievement {
        id: "analyst",
        name: "The Analyst",
        description: "Complete 10 analysis sessions",
        condition: |s| s.analysis_completed >= 10,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDay {
    pub week: u32,
    pub phase: &'static str,
    pub date: NaiveDate,
    pub activity: ActivityType,
}

use ActivityType::{
    Analysis as A, Backlog as B, FinalTouch as FT, LightRevise as LR, Mock as M, Rest as REST,
    Revision as R, Test11 as T11, Test12 as T12, TestFull as TF,
};

/// (week, phase, activities from Monday on). Week 12 runs eight days.
const WEEKS: &[(u32, &str, &[ActivityType])] = &[
    (1, "Foundation", &[R, R, T11, A, B, R, REST]),
    (2, "Foundation", &[R, R, T12, A, B, R, REST]),
    (3, "Foundation", &[R, R, TF, A, B, R, REST]),
    (4, "Intensive", &[M, A, B, REST, M, A, B]),
    (5, "Intensive", &[R, M, A, B, M, A, REST]),
    (6, "Intensive", &[B, M, A, REST, M, A, B]),
    (7, "Intensive", &[R, M, A, B, M, A, REST]),
    (8, "Intensive", &[B, M, A, REST, M, A, B]),
    (9, "Intensive", &[R, M, A, B, M, A, REST]),
    (10, "Intensive", &[B, M, A, REST, M, A, B]),
    (11, "INTENSE", &[M, A, M, A, M, A, REST]),
    (12, "FINAL", &[M, A, M, A, M, A, LR, FT]),
];

/// First scheduled day (a Monday).
pub fn schedule_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap_or(NaiveDate::MIN)
}

/// Every scheduled day in date order.
pub fn schedule_days() -> Vec<ScheduleDay> {
    let start = schedule_start();
    let mut days = Vec::new();
    for (week, phase, activities) in WEEKS {
        let week_start = u64::from(week - 1) * 7;
        for (offset, activity) in (0u64..).zip(activities.iter()) {
            if let Some(date) = start.checked_add_days(Days::new(week_start + offset)) {
                days.push(ScheduleDay {
                    week: *week,
                    phase: *phase,
                    date,
                    activity: *activity,
                });
            }
        }
    }
    days
}

/// The activity planned for `date`, if the date is on the schedule.
pub fn activity_for(date: NaiveDate) -> Option<ActivityType> {
    schedule_days()
        .into_iter()
        .find(|d| d.date == date)
        .map(|d| d.activity)
}

/// Preset sticky note palette: (id, background, border).
pub const NOTE_COLORS: &[(&str, &str, &str)] = &[
    ("yellow", "#fff9c4", "#fbc02d"),
    ("blue", "#e3f2fd", "#64b5f6"),
    ("green", "#e8f5e9", "#81c784"),
    ("pink", "#fce4ec", "#f06292"),
    ("purple", "#f3e5f5", "#ba68c8"),
    ("white", "#ffffff", "#e0e0e0"),
];

/// Calendar task categories: (color id, category name).
pub const TASK_COLORS: &[(&str, &str)] = &[
    ("blue", "Study"),
    ("green", "Personal"),
    ("orange", "Exam Prep"),
    ("purple", "Revision"),
    ("red", "Important"),
    ("teal", "Other"),
];
