use crate::db::{self, DocumentStore, PersistenceGateway, PlanStore, SessionRecord};
use crate::plan::SessionPlan;
use crate::timer::{QueuedCues, SessionTimer, SystemClock};
use crate::uniffi_interface::errors::PacerError;
use crate::uniffi_interface::objects::{Cue, PlanSummary, SavedWorkout, TimerSnapshot, titles};
use chrono::Local;
use log::*;
use std::sync::{Arc, Mutex, MutexGuard};

/// A session timer for hosts that bring their own one-second clock: the
/// host calls `tick()` every second and polls `drain_cues()` for audio.
#[derive(uniffi::Object)]
pub struct TimerHandle {
    plan_key: String,
    timer: Mutex<SessionTimer>,
    cues: Arc<QueuedCues>,
}

impl TimerHandle {
    fn lock(&self) -> Result<MutexGuard<'_, SessionTimer>, PacerError> {
        self.timer
            .lock()
            .map_err(|_| PacerError::from("timer lock poisoned"))
    }
}

#[uniffi::export]
impl TimerHandle {
    #[uniffi::constructor]
    pub fn new(plan_key: String, with_warmup: bool) -> Result<Self, PacerError> {
        let rt = crate::runtime::init_global_runtime_blocking()?;
        let plan = rt.block_on(async {
            let store = DocumentStore::open_default().await?;
            store.get_plan(&plan_key).await
        })?;
        let cues = Arc::new(QueuedCues::new());
        let timer = SessionTimer::new(
            SessionPlan::assemble(&plan, with_warmup),
            cues.clone(),
            Arc::new(SystemClock),
        )?;
        debug!("TimerHandle created for {}", plan_key);
        Ok(Self {
            plan_key,
            timer: Mutex::new(timer),
            cues,
        })
    }

    pub fn plan_key(&self) -> String {
        self.plan_key.clone()
    }

    pub fn start(&self) -> Result<(), PacerError> {
        Ok(self.lock()?.start()?)
    }

    pub fn pause(&self) -> Result<(), PacerError> {
        Ok(self.lock()?.pause()?)
    }

    pub fn tick(&self) -> Result<TimerSnapshot, PacerError> {
        let mut timer = self.lock()?;
        timer.tick()?;
        Ok(TimerSnapshot::from(&*timer))
    }

    pub fn skip(&self) -> Result<TimerSnapshot, PacerError> {
        let mut timer = self.lock()?;
        timer.skip()?;
        Ok(TimerSnapshot::from(&*timer))
    }

    pub fn reset(&self) -> Result<(), PacerError> {
        self.lock()?.reset();
        Ok(())
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, PacerError> {
        Ok(TimerSnapshot::from(&*self.lock()?))
    }

    pub fn elapsed_minutes(&self) -> Result<u32, PacerError> {
        Ok(self.lock()?.elapsed_minutes())
    }

    pub fn drain_cues(&self) -> Vec<Cue> {
        self.cues.drain().into_iter().map(Cue::from).collect()
    }
}

#[uniffi::export]
pub fn setup_database(path: String) -> Result<(), PacerError> {
    let rt = crate::runtime::init_global_runtime_blocking()?;
    rt.block_on(async {
        db::set_db_path(&path).await?;
        DocumentStore::open_default().await?;
        Ok::<(), anyhow::Error>(())
    })?;
    Ok(())
}

#[uniffi::export]
pub fn list_plans() -> Result<Vec<PlanSummary>, PacerError> {
    let rt = crate::runtime::init_global_runtime_blocking()?;
    let plans = rt.block_on(async {
        let store = DocumentStore::open_default().await?;
        db::operations::get_all_plans(&store).await
    })?;
    Ok(plans
        .iter()
        .map(|(key, plan)| PlanSummary::new(key, plan))
        .collect())
}

/// Persist a finished workout, timestamped now in local time.
#[uniffi::export]
pub fn record_session(plan_key: String, minutes: u32) -> Result<SavedWorkout, PacerError> {
    let rt = crate::runtime::init_global_runtime_blocking()?;
    let record = SessionRecord {
        plan_key,
        minutes,
        completed_at: Local::now().fixed_offset(),
    };
    let outcome = rt.block_on(async {
        let store = DocumentStore::open_default().await?;
        store.record_session(record).await
    })?;
    info!("Recorded {} from host", outcome.entry.plan_key);
    Ok(SavedWorkout {
        plan_key: outcome.entry.plan_key.clone(),
        minutes: outcome.entry.mins,
        streak: outcome.streak,
        unlocked: titles(&outcome.unlocked),
    })
}
