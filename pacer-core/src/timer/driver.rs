use super::{SessionTimer, TimerState};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The one-second clock behind a running timer.
///
/// Owns the spawned task exclusively; `stop()` and `Drop` abort it, so a
/// replaced or discarded driver can never tick the timer again.
pub struct TimerDriver {
    handle: Option<JoinHandle<()>>,
}

impl TimerDriver {
    /// Spawn the ticking task. Must be called inside a tokio runtime.
    ///
    /// The task exits on its own once the timer is paused or complete.
    pub fn spawn(timer: Arc<Mutex<SessionTimer>>, updates: watch::Sender<TimerState>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                let mut timer = timer.lock().await;
                if let Err(e) = timer.tick() {
                    warn!("TimerDriver stopping: {}", e);
                    break;
                }
                let state = timer.state();
                drop(timer);

                let keep_going = state.is_running && !state.is_complete;
                // A closed channel only means nobody is watching.
                let _ = updates.send(state);
                if !keep_going {
                    debug!("TimerDriver finished: timer paused or complete");
                    break;
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
