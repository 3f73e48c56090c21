use crate::db::DocumentStore;
use crate::session::summary::SessionSummary;
use crate::timer::{Clock, CuePlayer, SessionTimer, SilentCues, TimerDriver, TimerState};
use chrono::{FixedOffset, Local};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub with_warmup: bool,
    pub sound_on: bool,
    /// Offset used for history date keys and time-of-day achievements.
    pub utc_offset: FixedOffset,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            with_warmup: true,
            sound_on: true,
            utc_offset: *Local::now().offset(),
        }
    }
}

/// The live timer of the current workout and everything that drives it.
pub(crate) struct ActiveWorkout {
    pub(crate) plan_key: String,
    pub(crate) plan_label: String,
    pub(crate) timer: Arc<Mutex<SessionTimer>>,
    pub(crate) updates: watch::Sender<TimerState>,
    pub(crate) driver: Option<TimerDriver>,
}

impl ActiveWorkout {
    pub(crate) fn stop_driver(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
    }
}

/// One user's workout session: at most one live timer, plus the summary of
/// the last finished workout until it is saved or discarded.
pub struct Session<S = DocumentStore> {
    pub(crate) store: Arc<S>,
    cues: Arc<dyn CuePlayer>,
    pub(crate) clock: Arc<dyn Clock>,
    settings: Mutex<SessionSettings>,
    pub(crate) active: Mutex<Option<ActiveWorkout>>,
    pub(crate) pending: Mutex<Option<SessionSummary>>,
}

impl<S> Session<S> {
    pub fn new(
        store: Arc<S>,
        cues: Arc<dyn CuePlayer>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            store,
            cues,
            clock,
            settings: Mutex::new(settings),
            active: Mutex::new(None),
            pending: Mutex::new(None),
        }
    }

    pub async fn settings(&self) -> SessionSettings {
        *self.settings.lock().await
    }

    /// Applies to the next workout started.
    pub async fn set_sound(&self, on: bool) {
        self.settings.lock().await.sound_on = on;
    }

    pub(crate) async fn cue_player(&self) -> Arc<dyn CuePlayer> {
        if self.settings.lock().await.sound_on {
            self.cues.clone()
        } else {
            Arc::new(SilentCues)
        }
    }

    pub async fn has_active_workout(&self) -> bool {
        self.active.lock().await.is_some()
    }
}
