use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use log::{debug, info};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::{
    db::models::{ChallengeProgress, Database, Plans, WorkoutEntry},
    db::{DocumentStore, RecordOutcome, SessionRecord, StoreError},
    plan::{Category, Exercise, Plan},
    progress::achievements::{Achievement, unlock_earned},
    progress::{challenges, history},
};

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern should compile"));

// Plans
pub fn resolve_plan(db: &Database, plan_key: &str) -> Result<Plan> {
    if let Some(id) = challenges::challenge_id_from_plan_key(plan_key) {
        let challenge =
            challenges::find(id).ok_or_else(|| StoreError::UnknownChallenge(id.to_string()))?;
        let day = db.active_challenges.get(id).map_or(1, |p| p.current_day);
        return Ok(challenge.plan_for_day(day));
    }
    db.plans
        .get(plan_key)
        .cloned()
        .ok_or_else(|| StoreError::UnknownPlan(plan_key.to_string()).into())
}

pub async fn get_all_plans(store: &DocumentStore) -> Result<Plans> {
    Ok(store.load().await?.plans)
}

/// Lowercase, dash-separated key for a plan label.
pub fn slugify(label: &str) -> String {
    let lower = label.trim().to_lowercase();
    NON_SLUG.replace_all(&lower, "-").trim_matches('-').to_string()
}

/// Create an empty plan and return its key. Taken keys get a numeric suffix.
pub async fn create_plan(store: &DocumentStore, label: &str) -> Result<String> {
    let base = slugify(label);
    if base.is_empty() {
        return Err(anyhow!("Plan label must contain a letter or digit"));
    }
    let label = label.trim().to_string();
    store
        .update(move |db| {
            let mut key = base.clone();
            let mut n = 2;
            while db.plans.contains_key(&key) {
                key = format!("{}-{}", base, n);
                n += 1;
            }
            info!("Creating plan {} ({})", key, label);
            db.plans.insert(key.clone(), Plan::new(label));
            Ok(key)
        })
        .await
}

pub async fn delete_plan(store: &DocumentStore, plan_key: &str) -> Result<Plan> {
    let key = plan_key.to_string();
    store
        .update(move |db| {
            db.plans
                .remove(&key)
                .ok_or_else(|| StoreError::UnknownPlan(key.clone()).into())
        })
        .await
}

/// Append an exercise with a fresh id. Work and rest fall back to 45/15.
pub async fn add_exercise(
    store: &DocumentStore,
    plan_key: &str,
    name: &str,
    category: Category,
    work_seconds: Option<u32>,
    rest_seconds: Option<u32>,
) -> Result<Exercise> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Exercise name must not be empty"));
    }
    let exercise = Exercise::new(
        Uuid::new_v4().to_string(),
        name,
        category,
        work_seconds.unwrap_or(crate::plan::DEFAULT_WORK_SECONDS),
        rest_seconds.unwrap_or(crate::plan::DEFAULT_REST_SECONDS),
    );
    let key = plan_key.to_string();
    store
        .update(move |db| {
            let plan = db
                .plans
                .get_mut(&key)
                .ok_or_else(|| StoreError::UnknownPlan(key.clone()))?;
            plan.exercises.push(exercise.clone());
            plan.duration = Some(plan.planned_seconds().div_ceil(60));
            debug!("Added {} to plan {}", exercise.name, key);
            Ok(exercise)
        })
        .await
}

pub async fn remove_exercise(store: &DocumentStore, plan_key: &str, exercise_id: &str) -> Result<Exercise> {
    let key = plan_key.to_string();
    let id = exercise_id.to_string();
    store
        .update(move |db| {
            let plan = db
                .plans
                .get_mut(&key)
                .ok_or_else(|| StoreError::UnknownPlan(key.clone()))?;
            let pos = plan
                .exercises
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| StoreError::UnknownExercise {
                    plan: key.clone(),
                    id: id.clone(),
                })?;
            let removed = plan.exercises.remove(pos);
            plan.duration = Some(plan.planned_seconds().div_ceil(60));
            Ok(removed)
        })
        .await
}

// History
/// Append a finished session under its local date, refresh the streak,
/// advance the challenge it belongs to and unlock achievements, all in one
/// write.
pub async fn record_session(store: &DocumentStore, record: SessionRecord) -> Result<RecordOutcome> {
    store
        .update(move |db| {
            let today = record.completed_at.date_naive();
            let entry = WorkoutEntry {
                plan_key: record.plan_key.clone(),
                mins: record.minutes,
                time: record.completed_at,
            };
            db.history.entry(today).or_default().push(entry.clone());
            db.profile.streak = history::current_streak(&db.history, today);

            if let Some(id) = challenges::challenge_id_from_plan_key(&record.plan_key) {
                if !db.active_challenges.contains_key(id) {
                    begin_challenge(db, id)?;
                }
                advance_challenge(db, id, today)?;
            }

            let unlocked = unlock_earned(db, Some(&record.completed_at));
            info!(
                "Recorded {} ({} min), streak {}",
                record.plan_key, record.minutes, db.profile.streak
            );
            Ok(RecordOutcome {
                entry,
                streak: db.profile.streak,
                unlocked,
            })
        })
        .await
}

// Hydration & weight
#[derive(Debug, Clone)]
pub struct WaterOutcome {
    pub current: u32,
    pub goal: u32,
    pub unlocked: Vec<&'static Achievement>,
}

pub async fn add_water(store: &DocumentStore, ml: u32, today: NaiveDate) -> Result<WaterOutcome> {
    store
        .update(move |db| {
            if db.profile.last_water_date != Some(today) {
                debug!("New day for water, resetting counter");
                db.profile.current_water = 0;
                db.profile.last_water_date = Some(today);
            }
            let current = db.profile.current_water;
            db.profile.current_water = current.checked_add(ml).ok_or_else(|| {
                anyhow!("{} ml on top of {} ml is not a plausible day", ml, current)
            })?;
            db.water_history.insert(today, db.profile.current_water);
            Ok(WaterOutcome {
                current: db.profile.current_water,
                goal: db.profile.water_goal,
                unlocked: unlock_earned(db, None),
            })
        })
        .await
}

pub async fn log_weight(store: &DocumentStore, kg: f64, today: NaiveDate) -> Result<Vec<&'static Achievement>> {
    if !kg.is_finite() || kg <= 0.0 {
        return Err(anyhow!("Invalid weight: {}", kg));
    }
    store
        .update(move |db| {
            db.weight_history.insert(today, kg);
            db.profile.current_weight = kg;
            Ok(unlock_earned(db, None))
        })
        .await
}

// Challenges
fn begin_challenge(db: &mut Database, challenge_id: &str) -> Result<ChallengeProgress> {
    if challenges::find(challenge_id).is_none() {
        return Err(StoreError::UnknownChallenge(challenge_id.to_string()).into());
    }
    let progress = ChallengeProgress {
        challenge_id: challenge_id.to_string(),
        current_day: 1,
        completed_date: None,
    };
    info!("Starting challenge {}", challenge_id);
    db.active_challenges
        .insert(challenge_id.to_string(), progress.clone());
    Ok(progress)
}

/// Move to the next day unless today was already counted or the challenge
/// is finished. Returns whether the day advanced.
fn advance_challenge(db: &mut Database, challenge_id: &str, today: NaiveDate) -> Result<bool> {
    let challenge = challenges::find(challenge_id)
        .ok_or_else(|| StoreError::UnknownChallenge(challenge_id.to_string()))?;
    let progress = db
        .active_challenges
        .get_mut(challenge_id)
        .ok_or_else(|| anyhow!("Challenge {} has not been started", challenge_id))?;
    if challenge.is_finished(progress) || progress.completed_date == Some(today) {
        return Ok(false);
    }
    progress.current_day += 1;
    progress.completed_date = Some(today);
    debug!("Challenge {} now on day {}", challenge_id, progress.current_day);
    Ok(true)
}

/// Start (or restart from day one) a challenge from the catalogue.
pub async fn start_challenge(store: &DocumentStore, challenge_id: &str) -> Result<ChallengeProgress> {
    let id = challenge_id.to_string();
    store.update(move |db| begin_challenge(db, &id)).await
}

pub async fn challenge_plan(store: &DocumentStore, challenge_id: &str) -> Result<Plan> {
    let db = store.load().await?;
    resolve_plan(&db, &challenges::plan_key(challenge_id))
}

#[derive(Debug, Clone)]
pub struct ChallengeDayOutcome {
    pub progress: ChallengeProgress,
    pub advanced: bool,
    pub finished: bool,
    pub unlocked: Vec<&'static Achievement>,
}

pub async fn complete_challenge_day(
    store: &DocumentStore,
    challenge_id: &str,
    today: NaiveDate,
) -> Result<ChallengeDayOutcome> {
    let id = challenge_id.to_string();
    store
        .update(move |db| {
            let advanced = advance_challenge(db, &id, today)?;
            let progress = db
                .active_challenges
                .get(&id)
                .cloned()
                .ok_or_else(|| anyhow!("Challenge {} has not been started", id))?;
            let finished = challenges::find(&id).is_some_and(|c| c.is_finished(&progress));
            Ok(ChallengeDayOutcome {
                progress,
                advanced,
                finished,
                unlocked: unlock_earned(db, None),
            })
        })
        .await
}
