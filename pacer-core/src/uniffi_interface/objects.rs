use crate::plan::Plan;
use crate::progress::achievements::Achievement;
use crate::timer::{CueKind, Phase, SessionTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum TimerPhase {
    Work,
    Rest,
}

impl From<Phase> for TimerPhase {
    fn from(p: Phase) -> Self {
        match p {
            Phase::Work => TimerPhase::Work,
            Phase::Rest => TimerPhase::Rest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum Cue {
    Countdown,
    Go,
    Rest,
    Done,
}

impl From<CueKind> for Cue {
    fn from(c: CueKind) -> Self {
        match c {
            CueKind::Countdown => Cue::Countdown,
            CueKind::Go => Cue::Go,
            CueKind::Rest => Cue::Rest,
            CueKind::Done => Cue::Done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct TimerSnapshot {
    pub step_index: u32,
    pub step_count: u32,
    pub phase: TimerPhase,
    pub seconds_remaining: u32,
    pub phase_total: u32,
    pub exercise_name: Option<String>,
    pub is_warmup: bool,
    pub progress_pct: u32,
    pub is_running: bool,
    pub is_complete: bool,
}

impl From<&SessionTimer> for TimerSnapshot {
    fn from(t: &SessionTimer) -> Self {
        let index = t.step_index();
        TimerSnapshot {
            step_index: index as u32,
            step_count: t.plan().len() as u32,
            phase: t.phase().into(),
            seconds_remaining: t.seconds_remaining(),
            phase_total: t.phase_total(),
            exercise_name: t.current_step().map(|e| e.name.clone()),
            is_warmup: t.plan().is_warmup(index),
            progress_pct: t.plan().progress_pct(index),
            is_running: t.is_running(),
            is_complete: t.is_complete(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct PlanSummary {
    pub key: String,
    pub label: String,
    pub emoji: Option<String>,
    pub exercise_count: u32,
    pub planned_seconds: u32,
}

impl PlanSummary {
    pub fn new(key: &str, plan: &Plan) -> Self {
        PlanSummary {
            key: key.to_string(),
            label: plan.label.clone(),
            emoji: plan.emoji.clone(),
            exercise_count: plan.exercises.len() as u32,
            planned_seconds: plan.planned_seconds(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct SavedWorkout {
    pub plan_key: String,
    pub minutes: u32,
    pub streak: u32,
    /// Titles of achievements unlocked by this workout.
    pub unlocked: Vec<String>,
}

pub(crate) fn titles(unlocked: &[&'static Achievement]) -> Vec<String> {
    unlocked.iter().map(|a| a.title.to_string()).collect()
}
