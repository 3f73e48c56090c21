use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    Countdown,
    Go,
    Rest,
    Done,
}

impl fmt::Display for CueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CueKind::Countdown => write!(f, "countdown"),
            CueKind::Go => write!(f, "go"),
            CueKind::Rest => write!(f, "rest"),
            CueKind::Done => write!(f, "done"),
        }
    }
}

/// Plays a cue. Fire-and-forget: the timer only logs a returned error.
pub trait CuePlayer: Send + Sync {
    fn play(&self, cue: CueKind) -> Result<()>;
}

pub(crate) fn play_or_warn(player: &dyn CuePlayer, cue: CueKind) {
    if let Err(e) = player.play(cue) {
        warn!("Cue {} failed to play: {}", cue, e);
    }
}

pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn play(&self, _cue: CueKind) -> Result<()> {
        Ok(())
    }
}

pub struct LogCues;

impl CuePlayer for LogCues {
    fn play(&self, cue: CueKind) -> Result<()> {
        info!("cue: {}", cue);
        Ok(())
    }
}

/// Buffers cues for a host that polls them (foreign UIs, tests).
#[derive(Default)]
pub struct QueuedCues {
    queue: Mutex<Vec<CueKind>>,
}

impl QueuedCues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<CueKind> {
        match self.queue.lock() {
            Ok(mut q) => std::mem::take(&mut *q),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl CuePlayer for QueuedCues {
    fn play(&self, cue: CueKind) -> Result<()> {
        self.queue
            .lock()
            .map_err(|_| anyhow::anyhow!("cue queue poisoned"))?
            .push(cue);
        Ok(())
    }
}
