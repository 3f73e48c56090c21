//! The workout session timer.
//!
//! A `SessionTimer` walks a `SessionPlan` one second per `tick()`. Each step
//! has a work phase and, when its rest is non-zero, a rest phase. Cues are
//! handed to an injected `CuePlayer` and never affect the state machine.

mod clock;
mod cue;
mod driver;
mod gate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cue::{CueKind, CuePlayer, LogCues, QueuedCues, SilentCues};
pub use driver::TimerDriver;
pub use gate::{EXIT_HOLD, HoldGate, SKIP_HOLD, TAP_DEBOUNCE};

use crate::plan::{Exercise, SessionPlan};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Work,
    Rest,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    #[error("timer is already running")]
    AlreadyRunning,
    #[error("timer is not running")]
    NotRunning,
    #[error("session is already complete")]
    Complete,
    #[error("session plan has no steps")]
    EmptyPlan,
}

/// What a phase expiry did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Rest,
    NextStep,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub step_index: usize,
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub is_running: bool,
    pub is_complete: bool,
    pub started_at: DateTime<Utc>,
}

pub struct SessionTimer {
    plan: SessionPlan,
    step_index: usize,
    phase: Phase,
    seconds_remaining: u32,
    running: bool,
    complete: bool,
    has_started: bool,
    started_at: DateTime<Utc>,
    cues: Arc<dyn CuePlayer>,
    clock: Arc<dyn Clock>,
}

impl SessionTimer {
    pub fn new(
        plan: SessionPlan,
        cues: Arc<dyn CuePlayer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TimerError> {
        let first = plan.get(0).ok_or(TimerError::EmptyPlan)?;
        let seconds_remaining = first.work_seconds;
        let started_at = clock.now();
        debug!(
            "SessionTimer::new steps={} warmup={}",
            plan.len(),
            plan.warmup_len()
        );
        Ok(Self {
            plan,
            step_index: 0,
            phase: Phase::Work,
            seconds_remaining,
            running: false,
            complete: false,
            has_started: false,
            started_at,
            cues,
            clock,
        })
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.complete {
            return Err(TimerError::Complete);
        }
        if self.running {
            return Err(TimerError::AlreadyRunning);
        }
        self.running = true;
        if !self.has_started {
            self.has_started = true;
            self.cue(CueKind::Go);
        }
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if !self.running {
            return Err(TimerError::NotRunning);
        }
        self.running = false;
        Ok(())
    }

    /// One elapsed second. Ignored while paused.
    pub fn tick(&mut self) -> Result<Option<Transition>, TimerError> {
        if self.complete {
            return Err(TimerError::Complete);
        }
        if !self.running {
            return Ok(None);
        }
        if self.seconds_remaining > 1 {
            let old = self.seconds_remaining;
            self.seconds_remaining -= 1;
            if self.phase == Phase::Work && (old == 2 || old == 3) {
                self.cue(CueKind::Countdown);
            }
            return Ok(None);
        }
        Ok(Some(self.advance_phase()))
    }

    /// Expire the current phase now, running or paused.
    pub fn skip(&mut self) -> Result<Transition, TimerError> {
        if self.complete {
            return Err(TimerError::Complete);
        }
        Ok(self.advance_phase())
    }

    pub fn reset(&mut self) {
        self.step_index = 0;
        self.phase = Phase::Work;
        self.seconds_remaining = self.plan.get(0).map_or(0, |e| e.work_seconds);
        self.running = false;
        self.complete = false;
        self.has_started = false;
    }

    fn advance_phase(&mut self) -> Transition {
        let rest = self.current_step().map_or(0, |e| e.rest_seconds);
        if self.phase == Phase::Work && rest > 0 {
            self.phase = Phase::Rest;
            self.seconds_remaining = rest;
            self.cue(CueKind::Rest);
            return Transition::Rest;
        }

        let next = self.step_index + 1;
        match self.plan.get(next) {
            Some(step) => {
                self.step_index = next;
                self.phase = Phase::Work;
                self.seconds_remaining = step.work_seconds;
                self.cue(CueKind::Go);
                Transition::NextStep
            }
            None => {
                self.step_index = self.plan.len();
                self.phase = Phase::Work;
                self.seconds_remaining = 0;
                self.running = false;
                self.complete = true;
                debug!("SessionTimer complete after {}s", self.elapsed_seconds());
                self.cue(CueKind::Done);
                Transition::Complete
            }
        }
    }

    fn cue(&self, kind: CueKind) {
        cue::play_or_warn(self.cues.as_ref(), kind);
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            step_index: self.step_index,
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            is_running: self.running,
            is_complete: self.complete,
            started_at: self.started_at,
        }
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    pub fn current_step(&self) -> Option<&Exercise> {
        self.plan.get(self.step_index)
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Full length of the current phase, for progress rings.
    pub fn phase_total(&self) -> u32 {
        match (self.current_step(), self.phase) {
            (Some(step), Phase::Work) => step.work_seconds,
            (Some(step), Phase::Rest) => step.rest_seconds,
            (None, _) => 0,
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        (self.clock.now() - self.started_at).num_seconds().max(0) as u64
    }

    pub fn elapsed_minutes(&self) -> u32 {
        minutes_from_seconds(self.elapsed_seconds())
    }
}

pub fn minutes_from_seconds(seconds: u64) -> u32 {
    (seconds as f64 / 60.0).round() as u32
}

/// `mm:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Category, Exercise};
    use anyhow::anyhow;
    use chrono::{Duration, TimeZone};

    fn step(id: &str, work: u32, rest: u32) -> Exercise {
        Exercise::new(id, id, Category::Cardio, work, rest)
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap(),
        ))
    }

    fn timer_with(steps: Vec<Exercise>) -> (SessionTimer, Arc<QueuedCues>, Arc<ManualClock>) {
        let cues = Arc::new(QueuedCues::new());
        let clock = clock();
        let timer =
            SessionTimer::new(SessionPlan::from_steps(steps), cues.clone(), clock.clone()).unwrap();
        (timer, cues, clock)
    }

    fn scenario() -> (SessionTimer, Arc<QueuedCues>, Arc<ManualClock>) {
        timer_with(vec![step("a", 3, 2), step("b", 2, 0)])
    }

    fn at(timer: &SessionTimer) -> (usize, Phase, u32) {
        (timer.step_index(), timer.phase(), timer.seconds_remaining())
    }

    #[test]
    fn new_timer_starts_idle_on_first_work_phase() {
        let (timer, cues, _) = scenario();
        assert_eq!(at(&timer), (0, Phase::Work, 3));
        assert!(!timer.is_running());
        assert!(!timer.is_complete());
        assert!(cues.drain().is_empty());
    }

    #[test]
    fn empty_plan_is_rejected() {
        let result = SessionTimer::new(
            SessionPlan::from_steps(vec![]),
            Arc::new(SilentCues),
            Arc::new(SystemClock),
        );
        assert!(matches!(result, Err(TimerError::EmptyPlan)));
    }

    #[test]
    fn two_step_scenario_walks_expected_states() {
        let (mut timer, _, _) = scenario();
        timer.start().unwrap();

        let expected = [
            (0, Phase::Work, 2),
            (0, Phase::Work, 1),
            (0, Phase::Rest, 2),
            (0, Phase::Rest, 1),
            (1, Phase::Work, 2),
            (1, Phase::Work, 1),
        ];
        for (t, want) in expected.iter().enumerate() {
            timer.tick().unwrap();
            assert_eq!(at(&timer), *want, "after tick {}", t + 1);
        }

        assert_eq!(timer.tick().unwrap(), Some(Transition::Complete));
        assert!(timer.is_complete());
        assert!(!timer.is_running());
        assert_eq!(timer.seconds_remaining(), 0);
        assert_eq!(timer.step_index(), 2);
    }

    #[test]
    fn cue_order_for_scenario() {
        let (mut timer, cues, _) = scenario();
        timer.start().unwrap();
        while !timer.is_complete() {
            timer.tick().unwrap();
        }
        assert_eq!(
            cues.drain(),
            vec![
                CueKind::Go,
                CueKind::Countdown,
                CueKind::Countdown,
                CueKind::Rest,
                CueKind::Go,
                CueKind::Countdown,
                CueKind::Done,
            ]
        );
    }

    #[test]
    fn work_plus_rest_ticks_complete_any_plan() {
        let plans = vec![
            vec![step("a", 5, 0)],
            vec![step("a", 4, 3), step("b", 6, 2), step("c", 2, 1)],
            vec![step("a", 10, 0), step("b", 1, 5), step("c", 3, 0)],
        ];
        for steps in plans {
            let total: u32 = steps.iter().map(|s| s.work_seconds + s.rest_seconds).sum();
            let (mut timer, _, _) = timer_with(steps);
            timer.start().unwrap();
            for _ in 0..total - 1 {
                timer.tick().unwrap();
                assert!(!timer.is_complete());
            }
            timer.tick().unwrap();
            assert!(timer.is_complete());
            assert_eq!(timer.seconds_remaining(), 0);
        }
    }

    #[test]
    fn rest_cue_never_counts_down() {
        let (mut timer, cues, _) = timer_with(vec![step("a", 1, 5), step("b", 9, 0)]);
        timer.start().unwrap();
        timer.tick().unwrap();
        assert_eq!(timer.phase(), Phase::Rest);
        cues.drain();
        for _ in 0..4 {
            timer.tick().unwrap();
        }
        assert!(cues.drain().is_empty());
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let (mut timer, cues, _) = timer_with(vec![step("a", 30, 10)]);
        timer.start().unwrap();
        for _ in 0..7 {
            timer.tick().unwrap();
        }
        timer.pause().unwrap();
        let paused = timer.state();
        for _ in 0..20 {
            assert_eq!(timer.tick().unwrap(), None);
        }
        assert_eq!(timer.state(), paused);

        cues.drain();
        timer.start().unwrap();
        assert_eq!(timer.seconds_remaining(), 23);
        assert!(cues.drain().is_empty(), "resume must not replay go");
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut timer, _, _) = scenario();
        timer.start().unwrap();
        for _ in 0..4 {
            timer.tick().unwrap();
        }
        timer.reset();
        let first = timer.state();
        timer.reset();
        assert_eq!(timer.state(), first);
        assert_eq!(at(&timer), (0, Phase::Work, 3));
        assert!(!first.is_running);
        assert!(!first.is_complete);

        while !timer.is_complete() {
            let _ = timer.skip();
        }
        timer.reset();
        assert_eq!(timer.state(), first);
    }

    #[test]
    fn reset_rearms_first_start_cue() {
        let (mut timer, cues, _) = scenario();
        timer.start().unwrap();
        timer.reset();
        cues.drain();
        timer.start().unwrap();
        assert_eq!(cues.drain(), vec![CueKind::Go]);
    }

    #[test]
    fn skip_on_last_step_without_rest_completes() {
        let (mut timer, cues, _) = timer_with(vec![step("only", 40, 0)]);
        assert_eq!(timer.skip().unwrap(), Transition::Complete);
        assert!(timer.is_complete());
        assert_eq!(cues.drain(), vec![CueKind::Done]);
    }

    #[test]
    fn skip_inserts_rest_only_when_present() {
        let (mut timer, _, _) = scenario();
        assert_eq!(timer.skip().unwrap(), Transition::Rest);
        assert_eq!(at(&timer), (0, Phase::Rest, 2));
        assert_eq!(timer.skip().unwrap(), Transition::NextStep);
        assert_eq!(at(&timer), (1, Phase::Work, 2));
        assert!(!timer.is_running(), "skip while paused stays paused");
    }

    #[test]
    fn invalid_transitions_leave_state_alone() {
        let (mut timer, _, _) = timer_with(vec![step("only", 5, 0)]);
        assert_eq!(timer.pause(), Err(TimerError::NotRunning));
        timer.start().unwrap();
        assert_eq!(timer.start(), Err(TimerError::AlreadyRunning));
        timer.skip().unwrap();

        let done = timer.state();
        assert_eq!(timer.start(), Err(TimerError::Complete));
        assert_eq!(timer.tick(), Err(TimerError::Complete));
        assert_eq!(timer.skip(), Err(TimerError::Complete));
        assert_eq!(timer.state(), done);
        assert!(!(done.is_running && done.is_complete));
    }

    #[test]
    fn zero_length_work_expires_on_first_tick() {
        let (mut timer, _, _) = timer_with(vec![step("a", 0, 0), step("b", 5, 0)]);
        timer.start().unwrap();
        assert_eq!(timer.tick().unwrap(), Some(Transition::NextStep));
        assert_eq!(at(&timer), (1, Phase::Work, 5));
    }

    struct BrokenSpeaker;

    impl CuePlayer for BrokenSpeaker {
        fn play(&self, _cue: CueKind) -> anyhow::Result<()> {
            Err(anyhow!("no audio device"))
        }
    }

    #[test]
    fn failing_cues_do_not_stop_progress() {
        let plan = SessionPlan::from_steps(vec![step("a", 3, 2), step("b", 2, 0)]);
        let mut timer =
            SessionTimer::new(plan, Arc::new(BrokenSpeaker), Arc::new(SystemClock)).unwrap();
        timer.start().unwrap();
        for _ in 0..7 {
            timer.tick().unwrap();
        }
        assert!(timer.is_complete());
    }

    #[test]
    fn elapsed_minutes_round_wall_clock() {
        let (mut timer, _, clock) = timer_with(vec![step("a", 30, 0), step("b", 30, 0)]);
        timer.start().unwrap();
        clock.advance(Duration::seconds(95));
        while !timer.is_complete() {
            timer.skip().unwrap();
        }
        assert_eq!(timer.elapsed_seconds(), 95);
        assert_eq!(timer.elapsed_minutes(), 2);
    }

    #[test]
    fn phase_total_tracks_current_phase() {
        let (mut timer, _, _) = scenario();
        assert_eq!(timer.phase_total(), 3);
        timer.skip().unwrap();
        assert_eq!(timer.phase_total(), 2);
    }

    #[test]
    fn clock_format_pads() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(minutes_from_seconds(29), 0);
        assert_eq!(minutes_from_seconds(30), 1);
    }
}
