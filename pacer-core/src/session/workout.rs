//! Workout lifecycle: start, run, pause, skip, reset, exit.

use crate::db::PlanStore;
use crate::plan::{Category, SessionPlan};
use crate::session::Session;
use crate::session::session::ActiveWorkout;
use crate::timer::{Phase, SessionTimer, TimerDriver, TimerState, Transition};
use anyhow::{Result, anyhow};
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// Number of upcoming steps shown next to the current one.
pub const UP_NEXT_COUNT: usize = 3;

/// Everything a front end needs to draw the running workout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutView {
    pub plan_key: String,
    pub plan_label: String,
    pub exercise: Option<String>,
    pub category: Option<Category>,
    pub instructions: Vec<String>,
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub phase_total: u32,
    pub step_index: usize,
    pub step_count: usize,
    pub is_warmup: bool,
    pub up_next: Vec<String>,
    pub progress_pct: u32,
    pub is_running: bool,
    pub is_complete: bool,
}

impl WorkoutView {
    fn of(active: &ActiveWorkout, timer: &SessionTimer) -> Self {
        let plan = timer.plan();
        let index = timer.step_index();
        let step = timer.current_step();
        Self {
            plan_key: active.plan_key.clone(),
            plan_label: active.plan_label.clone(),
            exercise: step.map(|e| e.name.clone()),
            category: step.map(|e| e.category),
            instructions: step.map(|e| e.instructions.clone()).unwrap_or_default(),
            phase: timer.phase(),
            seconds_remaining: timer.seconds_remaining(),
            phase_total: timer.phase_total(),
            step_index: index,
            step_count: plan.len(),
            is_warmup: plan.is_warmup(index),
            up_next: plan
                .up_next(index, UP_NEXT_COUNT)
                .iter()
                .map(|e| e.name.clone())
                .collect(),
            progress_pct: plan.progress_pct(index),
            is_running: timer.is_running(),
            is_complete: timer.is_complete(),
        }
    }
}

fn no_workout() -> anyhow::Error {
    anyhow!("No active workout")
}

impl<S: PlanStore> Session<S> {
    /// Load the plan and set up a fresh, idle timer for it. Any workout
    /// already in progress is discarded. Returns the channel on which the
    /// timer publishes its state.
    pub async fn start_workout(&self, plan_key: &str) -> Result<watch::Receiver<TimerState>> {
        let plan = self.store.get_plan(plan_key).await?;
        let with_warmup = self.settings().await.with_warmup;
        let steps = SessionPlan::assemble(&plan, with_warmup);
        let timer = SessionTimer::new(steps, self.cue_player().await, self.clock.clone())?;
        let (updates, rx) = watch::channel(timer.state());

        let mut active = self.active.lock().await;
        if let Some(mut old) = active.take() {
            info!("Discarding unfinished workout {}", old.plan_key);
            old.stop_driver();
        }
        info!(
            "Starting workout {} ({} steps, warm-up {})",
            plan_key,
            timer.plan().len(),
            with_warmup
        );
        *active = Some(ActiveWorkout {
            plan_key: plan_key.to_string(),
            plan_label: plan.label,
            timer: Arc::new(Mutex::new(timer)),
            updates,
            driver: None,
        });
        Ok(rx)
    }
}

impl<S> Session<S> {
    /// Start or resume the clock.
    pub async fn resume(&self) -> Result<()> {
        let mut guard = self.active.lock().await;
        let active = guard.as_mut().ok_or_else(no_workout)?;
        let state = {
            let mut timer = active.timer.lock().await;
            timer.start()?;
            timer.state()
        };
        active.stop_driver();
        active.driver = Some(TimerDriver::spawn(
            active.timer.clone(),
            active.updates.clone(),
        ));
        active.updates.send_replace(state);
        debug!("Workout resumed");
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        let mut guard = self.active.lock().await;
        let active = guard.as_mut().ok_or_else(no_workout)?;
        active.stop_driver();
        let state = {
            let mut timer = active.timer.lock().await;
            timer.pause()?;
            timer.state()
        };
        debug!("Workout paused at {}s", state.seconds_remaining);
        active.updates.send_replace(state);
        Ok(())
    }

    /// Pause when running, resume otherwise. Returns whether it now runs.
    pub async fn toggle(&self) -> Result<bool> {
        let running = {
            let guard = self.active.lock().await;
            let active = guard.as_ref().ok_or_else(no_workout)?;
            active.timer.lock().await.is_running()
        };
        if running {
            self.pause().await?;
        } else {
            self.resume().await?;
        }
        Ok(!running)
    }

    /// End the current phase early.
    pub async fn skip(&self) -> Result<Transition> {
        let mut guard = self.active.lock().await;
        let active = guard.as_mut().ok_or_else(no_workout)?;
        let (transition, state) = {
            let mut timer = active.timer.lock().await;
            let transition = timer.skip()?;
            (transition, timer.state())
        };
        if state.is_complete {
            active.stop_driver();
        }
        active.updates.send_replace(state);
        debug!("Skipped: {:?}", transition);
        Ok(transition)
    }

    /// Back to the first step, paused.
    pub async fn reset(&self) -> Result<()> {
        let mut guard = self.active.lock().await;
        let active = guard.as_mut().ok_or_else(no_workout)?;
        active.stop_driver();
        let state = {
            let mut timer = active.timer.lock().await;
            timer.reset();
            timer.state()
        };
        active.updates.send_replace(state);
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<WorkoutView> {
        let guard = self.active.lock().await;
        let active = guard.as_ref().ok_or_else(no_workout)?;
        let timer = active.timer.lock().await;
        Ok(WorkoutView::of(active, &timer))
    }

    pub async fn is_complete(&self) -> bool {
        match self.active.lock().await.as_ref() {
            Some(active) => active.timer.lock().await.is_complete(),
            None => false,
        }
    }

    /// Leave the workout without saving. Returns whether one was running.
    pub async fn exit_workout(&self) -> bool {
        match self.active.lock().await.take() {
            Some(mut active) => {
                info!("Exiting workout {}", active.plan_key);
                active.stop_driver();
                true
            }
            None => false,
        }
    }
}
