//! Focus timer.
//!
//! [`FocusTimer`] is a pure state machine over [`TimerState`]; callers pass
//! the current time in. A running interval stores its absolute deadline, so
//! time spent suspended is recovered from the deadline rather than from
//! counting ticks.

pub mod debounce;

pub use debounce::Debouncer;

use crate::error::Result;
use crate::models::{FocusSession, TimerMode, TimerState};
use crate::validation::validate_timer_minutes;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    state: TimerState,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(TimerState::default())
    }
}

/// Whole seconds from `now` until `deadline`, rounded up, never negative.
fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let millis = (deadline - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    u32::try_from((millis + 999) / 1000).unwrap_or(u32::MAX)
}

impl FocusTimer {
    pub fn new(state: TimerState) -> Self {
        Self { state }
    }

    /// Resume a persisted timer. A running interval whose deadline already
    /// passed completes at once and yields its session.
    pub fn restore(state: TimerState, now: DateTime<Utc>) -> (Self, Option<FocusSession>) {
        let mut timer = Self::new(state);
        if !timer.state.is_running {
            timer.state.expected_end_time = None;
            return (timer, None);
        }
        if timer.state.expected_end_time.is_none() {
            timer.state.expected_end_time = Some(now + Duration::seconds(i64::from(timer.state.time_left)));
        }
        let session = timer.tick(now);
        (timer, session)
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn into_state(self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Only worth writing while running or once something was completed.
    pub fn should_persist(&self) -> bool {
        self.state.is_running || self.state.sessions_completed > 0
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.state.is_running {
            return;
        }
        if self.state.time_left == 0 {
            self.state.time_left = self.state.duration_secs(self.state.mode);
        }
        self.state.is_running = true;
        self.state.expected_end_time = Some(now + Duration::seconds(i64::from(self.state.time_left)));
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !self.state.is_running {
            return;
        }
        if let Some(end) = self.state.expected_end_time {
            self.state.time_left = seconds_until(end, now);
        }
        self.state.is_running = false;
        self.state.expected_end_time = None;
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.state.is_running {
            self.pause(now);
        } else {
            self.start(now);
        }
    }

    /// Stop and refill the current mode's interval.
    pub fn reset(&mut self) {
        self.state.is_running = false;
        self.state.expected_end_time = None;
        self.state.time_left = self.state.duration_secs(self.state.mode);
    }

    pub fn switch_mode(&mut self, mode: TimerMode) {
        self.state.mode = mode;
        self.reset();
    }

    /// Change the length of `mode`'s interval and switch to it.
    pub fn select_duration(&mut self, mode: TimerMode, minutes: u32) -> Result<()> {
        let minutes = validate_timer_minutes(minutes)?;
        match mode {
            TimerMode::Work => self.state.selected_work_duration = minutes,
            TimerMode::Break => self.state.selected_break_duration = minutes,
        }
        self.switch_mode(mode);
        Ok(())
    }

    /// Advance to `now`. Returns the finished session when the countdown
    /// reaches zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<FocusSession> {
        if !self.state.is_running {
            return None;
        }
        let end = self.state.expected_end_time?;
        self.state.time_left = seconds_until(end, now);
        if self.state.time_left > 0 {
            return None;
        }
        Some(self.complete(end))
    }

    fn complete(&mut self, finished_at: DateTime<Utc>) -> FocusSession {
        let finished = self.state.mode;
        let session = FocusSession::new(finished, self.state.duration_minutes(finished), finished_at);
        if finished == TimerMode::Work {
            self.state.sessions_completed = self.state.sessions_completed.saturating_add(1);
        }
        self.state.mode = finished.next();
        self.reset();
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_start_sets_deadline() {
        let mut timer = FocusTimer::default();
        timer.start(t0());
        assert!(timer.is_running());
        assert_eq!(timer.state().expected_end_time, Some(t0() + Duration::minutes(25)));
    }

    #[test]
    fn test_pause_keeps_remaining_time() {
        let mut timer = FocusTimer::default();
        timer.toggle(t0());
        timer.toggle(t0() + Duration::seconds(90));
        assert!(!timer.is_running());
        assert_eq!(timer.state().time_left, 25 * 60 - 90);
        assert!(timer.state().expected_end_time.is_none());

        timer.start(t0() + Duration::minutes(10));
        assert_eq!(
            timer.state().expected_end_time,
            Some(t0() + Duration::minutes(10) + Duration::seconds(25 * 60 - 90))
        );
    }

    #[test]
    fn test_work_completion_records_session_and_switches_to_break() {
        let mut timer = FocusTimer::default();
        timer.start(t0());
        assert!(timer.tick(t0() + Duration::minutes(10)).is_none());

        let session = timer.tick(t0() + Duration::minutes(26)).unwrap();
        assert_eq!(session.kind, TimerMode::Work);
        assert_eq!(session.duration, 25);
        assert_eq!(session.completed_at, t0() + Duration::minutes(25));

        let state = timer.state();
        assert_eq!(state.mode, TimerMode::Break);
        assert_eq!(state.time_left, 5 * 60);
        assert_eq!(state.sessions_completed, 1);
        assert!(!state.is_running);
    }

    #[test]
    fn test_break_completion_returns_to_work() {
        let mut timer = FocusTimer::default();
        timer.switch_mode(TimerMode::Break);
        timer.start(t0());
        let session = timer.tick(t0() + Duration::minutes(5)).unwrap();
        assert_eq!(session.kind, TimerMode::Break);
        assert_eq!(timer.state().mode, TimerMode::Work);
        assert_eq!(timer.state().sessions_completed, 0);
    }

    #[test]
    fn test_reset_refills_current_mode() {
        let mut timer = FocusTimer::default();
        timer.switch_mode(TimerMode::Break);
        timer.start(t0());
        timer.tick(t0() + Duration::seconds(30));
        timer.reset();
        assert_eq!(timer.state().time_left, 5 * 60);
        assert_eq!(timer.state().mode, TimerMode::Break);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_select_duration() {
        let mut timer = FocusTimer::default();
        timer.start(t0());
        timer.select_duration(TimerMode::Work, 50).unwrap();
        assert_eq!(timer.state().time_left, 50 * 60);
        assert!(!timer.is_running());

        assert!(timer.select_duration(TimerMode::Break, 0).is_err());
        assert_eq!(timer.state().selected_break_duration, 5);
    }

    #[test]
    fn test_restore_past_deadline_completes() {
        let mut timer = FocusTimer::default();
        timer.start(t0());
        let saved = timer.into_state();

        let (restored, session) = FocusTimer::restore(saved, t0() + Duration::hours(3));
        assert!(session.is_some());
        assert_eq!(restored.state().mode, TimerMode::Break);
        assert_eq!(restored.state().sessions_completed, 1);
    }

    #[test]
    fn test_restore_future_deadline_recomputes_time_left() {
        let mut timer = FocusTimer::default();
        timer.start(t0());
        let saved = timer.into_state();

        let (restored, session) = FocusTimer::restore(saved, t0() + Duration::minutes(20));
        assert!(session.is_none());
        assert!(restored.is_running());
        assert_eq!(restored.state().time_left, 5 * 60);
    }

    #[test]
    fn test_should_persist() {
        let mut timer = FocusTimer::default();
        assert!(!timer.should_persist());
        timer.start(t0());
        assert!(timer.should_persist());
        timer.pause(t0());
        assert!(!timer.should_persist());
        timer.start(t0());
        timer.tick(t0() + Duration::hours(1));
        assert!(timer.should_persist());
    }
}
