//! Focus timer operations.
//!
//! The live [`FocusTimer`] sits in the state's timer slot. Changes are
//! mirrored into the `timerState` collection and handed to the debounced
//! writer while the timer runs, once a session has been completed, or when
//! the store still holds a running copy that would otherwise go stale.
//! Plain ticks only move the slot's countdown and are never written.

use super::{log_skip, Change, Origin, SyncCore, TimerSlot};
use crate::error::Result;
use crate::models::{FocusSession, TimerMode, TimerState};
use crate::timer::FocusTimer;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::MutexGuard;

impl SyncCore {
    /// Resume the timer loaded from the store. Runs once during start-up.
    pub(super) fn restore_timer(&self) {
        let Some(saved) = self.state.timer_state.first() else {
            return;
        };
        let (timer, session) = FocusTimer::restore(saved.clone(), self.clock.now());
        let changed = *timer.state() != saved;
        let mut slot = self.state.timer_slot();
        slot.timer = timer;
        slot.running_in_store = saved.is_running;
        slot.known_remote = Some(saved);
        if changed {
            self.publish_timer(slot);
        } else {
            drop(slot);
        }

        if let Some(session) = session {
            info!("Timer finished while away, recording {} session", session.kind.as_str());
            if let Err(e) = self.record_session(&session) {
                warn!("Failed to record recovered focus session: {e}");
            }
        }
    }

    /// Mirror the slot's timer locally and schedule a write if needed.
    /// Consumes the guard so the lock is released before anything else.
    fn publish_timer(&self, mut slot: MutexGuard<'_, TimerSlot>) {
        let current = slot.timer.state().clone();
        let persist = slot.timer.should_persist() || slot.running_in_store;
        if persist {
            slot.running_in_store = current.is_running;
        }
        drop(slot);

        self.state
            .timer_state
            .apply(Origin::Local, Change::Upsert(current.clone()));
        if persist {
            self.timer_writer.schedule(current);
        }
    }

    fn update_timer<R>(&self, change: impl FnOnce(&mut FocusTimer, DateTime<Utc>) -> R) -> R {
        let now = self.clock.now();
        let mut slot = self.state.timer_slot();
        let before = slot.timer.state().clone();
        let result = change(&mut slot.timer, now);
        if *slot.timer.state() != before {
            self.publish_timer(slot);
        }
        result
    }

    pub fn start_timer(&self) {
        self.update_timer(FocusTimer::start);
    }

    pub fn pause_timer(&self) {
        self.update_timer(FocusTimer::pause);
    }

    pub fn toggle_timer(&self) {
        self.update_timer(FocusTimer::toggle);
    }

    pub fn reset_timer(&self) {
        self.update_timer(|timer, _| timer.reset());
    }

    pub fn switch_timer_mode(&self, mode: TimerMode) {
        self.update_timer(|timer, _| timer.switch_mode(mode));
    }

    /// Change one mode's interval length; switches to that mode.
    pub fn select_timer_duration(&self, mode: TimerMode, minutes: u32) -> Result<()> {
        self.update_timer(|timer, _| timer.select_duration(mode, minutes))
            .inspect_err(log_skip)
    }

    /// Advance the countdown to the current time. When an interval
    /// finishes, its session is recorded and returned.
    pub fn tick_timer(&self) -> Result<Option<FocusSession>> {
        let _guard = self.lock_mutations();
        let mut slot = self.state.timer_slot();
        let Some(session) = slot.timer.tick(self.clock.now()) else {
            return Ok(None);
        };
        self.publish_timer(slot);
        self.record_session(&session)?;
        Ok(Some(session))
    }

    fn record_session(&self, session: &FocusSession) -> Result<()> {
        self.repos
            .sessions
            .save(session)
            .inspect_err(|e| warn!("Failed to save focus session '{}': {e}", session.id))?;
        self.state
            .focus_sessions
            .apply(Origin::Local, Change::Upsert(session.clone()));
        Ok(())
    }

    pub fn timer_state(&self) -> TimerState {
        self.state.timer_slot().timer.state().clone()
    }

    /// Write any pending timer state now.
    pub fn flush_timer(&self) {
        self.timer_writer.flush();
    }

    pub fn focus_sessions(&self) -> Vec<FocusSession> {
        self.state.focus_sessions.snapshot()
    }
}
