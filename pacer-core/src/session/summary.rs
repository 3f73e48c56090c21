//! Finishing a workout and handing it to the persistence gateway.

use crate::db::{PersistenceGateway, RecordOutcome, SessionRecord};
use crate::session::Session;
use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset};
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub plan_key: String,
    pub plan_label: String,
    pub elapsed_seconds: u64,
    /// Elapsed time rounded to the nearest minute.
    pub minutes: u32,
    pub steps: usize,
    pub completed_at: DateTime<FixedOffset>,
}

impl SessionSummary {
    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            plan_key: self.plan_key.clone(),
            minutes: self.minutes,
            completed_at: self.completed_at,
        }
    }
}

impl<S> Session<S> {
    /// Close a finished workout and keep its summary until it is saved or
    /// discarded.
    pub async fn complete_workout(&self) -> Result<SessionSummary> {
        let offset = self.settings().await.utc_offset;
        let mut guard = self.active.lock().await;
        let active = guard
            .as_mut()
            .ok_or_else(|| anyhow!("No active workout"))?;
        let summary = {
            let timer = active.timer.lock().await;
            if !timer.is_complete() {
                return Err(anyhow!("Workout is not finished yet"));
            }
            SessionSummary {
                plan_key: active.plan_key.clone(),
                plan_label: active.plan_label.clone(),
                elapsed_seconds: timer.elapsed_seconds(),
                minutes: timer.elapsed_minutes(),
                steps: timer.plan().len(),
                completed_at: self.clock.now().with_timezone(&offset),
            }
        };
        active.stop_driver();
        *guard = None;
        info!(
            "Workout {} complete: {} min",
            summary.plan_key, summary.minutes
        );
        *self.pending.lock().await = Some(summary.clone());
        Ok(summary)
    }

    pub async fn pending_summary(&self) -> Option<SessionSummary> {
        self.pending.lock().await.clone()
    }

    pub async fn discard_summary(&self) -> Option<SessionSummary> {
        self.pending.lock().await.take()
    }
}

impl<S: PersistenceGateway> Session<S> {
    /// Persist the pending summary. On failure the summary stays pending so
    /// the caller can retry.
    pub async fn save_summary(&self) -> Result<RecordOutcome> {
        let mut pending = self.pending.lock().await;
        let summary = pending
            .as_ref()
            .ok_or_else(|| anyhow!("No finished workout to save"))?;
        match self.store.record_session(summary.record()).await {
            Ok(outcome) => {
                *pending = None;
                Ok(outcome)
            }
            Err(e) => {
                warn!("Saving workout {} failed: {}", summary.plan_key, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::WorkoutEntry;
    use crate::db::{DocumentStore, PlanStore};
    use crate::plan::{Category, Exercise, Plan};
    use crate::session::SessionSettings;
    use crate::timer::{ManualClock, QueuedCues};
    use chrono::{Duration, TimeZone, Timelike, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Serves one plan and fails the first `failures` saves.
    struct FlakyGateway {
        failures: AtomicU32,
    }

    impl PlanStore for FlakyGateway {
        async fn get_plan(&self, _plan_key: &str) -> Result<Plan> {
            let mut plan = Plan::new("Short");
            plan.exercises = vec![Exercise::new("a", "Plank", Category::Abs, 1, 0)];
            Ok(plan)
        }
    }

    impl PersistenceGateway for FlakyGateway {
        async fn record_session(&self, record: SessionRecord) -> Result<RecordOutcome> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(anyhow!("disk full"));
            }
            Ok(RecordOutcome {
                entry: WorkoutEntry {
                    plan_key: record.plan_key,
                    mins: record.minutes,
                    time: record.completed_at,
                },
                streak: 1,
                unlocked: vec![],
            })
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 6, 0, 0).unwrap(),
        ))
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            with_warmup: false,
            sound_on: true,
            utc_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        }
    }

    async fn finish<S: PlanStore>(session: &Session<S>, plan_key: &str) {
        session.start_workout(plan_key).await.unwrap();
        while !session.is_complete().await {
            session.skip().await.unwrap();
        }
    }

    #[tokio::test]
    async fn summary_rounds_elapsed_minutes() {
        let clock = clock();
        let session = Session::new(
            Arc::new(FlakyGateway {
                failures: AtomicU32::new(0),
            }),
            Arc::new(QueuedCues::new()),
            clock.clone(),
            settings(),
        );
        finish(&session, "short").await;
        clock.advance(Duration::seconds(95));

        let summary = session.complete_workout().await.unwrap();
        assert_eq!(summary.elapsed_seconds, 95);
        assert_eq!(summary.minutes, 2);
        assert_eq!(summary.completed_at.hour(), 8);
        assert!(!session.has_active_workout().await);
        assert_eq!(session.pending_summary().await, Some(summary));
    }

    #[tokio::test]
    async fn unfinished_workout_cannot_be_completed() {
        let session = Session::new(
            Arc::new(FlakyGateway {
                failures: AtomicU32::new(0),
            }),
            Arc::new(QueuedCues::new()),
            clock(),
            settings(),
        );
        assert!(session.complete_workout().await.is_err());
        session.start_workout("short").await.unwrap();
        assert!(session.complete_workout().await.is_err());
        assert!(session.has_active_workout().await);
    }

    #[tokio::test]
    async fn failed_save_keeps_summary_for_retry() {
        let session = Session::new(
            Arc::new(FlakyGateway {
                failures: AtomicU32::new(1),
            }),
            Arc::new(QueuedCues::new()),
            clock(),
            settings(),
        );
        finish(&session, "short").await;
        let summary = session.complete_workout().await.unwrap();

        assert!(session.save_summary().await.is_err());
        assert_eq!(session.pending_summary().await, Some(summary.clone()));

        let outcome = session.save_summary().await.unwrap();
        assert_eq!(outcome.entry.mins, summary.minutes);
        assert!(session.pending_summary().await.is_none());
        assert!(session.save_summary().await.is_err());
    }

    #[tokio::test]
    async fn discarded_summary_is_not_saved() {
        let session = Session::new(
            Arc::new(FlakyGateway {
                failures: AtomicU32::new(0),
            }),
            Arc::new(QueuedCues::new()),
            clock(),
            settings(),
        );
        finish(&session, "short").await;
        session.complete_workout().await.unwrap();
        assert!(session.discard_summary().await.is_some());
        assert!(session.save_summary().await.is_err());
    }

    #[tokio::test]
    async fn saved_workout_lands_in_document_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DocumentStore::open(dir.path().join("db.json")).await.unwrap());
        let clock = clock();
        let session = Session::new(store.clone(), Arc::new(QueuedCues::new()), clock.clone(), settings());

        finish(&session, "evening").await;
        clock.advance(Duration::minutes(12));
        session.complete_workout().await.unwrap();
        let outcome = session.save_summary().await.unwrap();

        assert_eq!(outcome.streak, 1);
        let ids: Vec<_> = outcome.unlocked.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["first_workout", "early_bird"]);

        let db = store.load().await.unwrap();
        let day = outcome.entry.time.date_naive();
        assert_eq!(db.history[&day][0].plan_key, "evening");
        assert_eq!(db.history[&day][0].mins, 12);
    }
}
