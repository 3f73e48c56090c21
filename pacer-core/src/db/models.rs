use crate::plan::{Category, Exercise, Plan};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type Plans = BTreeMap<String, Plan>;
pub type History = BTreeMap<NaiveDate, Vec<WorkoutEntry>>;
/// Millilitres per day.
pub type WaterHistory = BTreeMap<NaiveDate, u32>;
/// Kilograms per day.
pub type WeightHistory = BTreeMap<NaiveDate, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub goal: String,
    pub water_goal: u32,
    #[serde(default)]
    pub current_water: u32,
    #[serde(default)]
    pub current_weight: f64,
    #[serde(default)]
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_water_date: Option<NaiveDate>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Athlete".to_string(),
            goal: "Stay consistent".to_string(),
            water_goal: 2500,
            current_water: 0,
            current_weight: 0.0,
            streak: 0,
            last_water_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    pub plan_key: String,
    pub mins: u32,
    pub time: DateTime<FixedOffset>,
}

impl fmt::Display for WorkoutEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} min @ {}",
            self.plan_key,
            self.mins,
            self.time.format("%H:%M")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeProgress {
    pub challenge_id: String,
    pub current_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
}

/// The whole persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub plans: Plans,
    #[serde(default)]
    pub history: History,
    #[serde(default)]
    pub water_history: WaterHistory,
    #[serde(default)]
    pub weight_history: WeightHistory,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub active_challenges: BTreeMap<String, ChallengeProgress>,
    #[serde(default)]
    pub daily_tips: Vec<String>,
}

/// Top-level keys to replace. Absent keys are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub profile: Option<Profile>,
    pub plans: Option<Plans>,
    pub history: Option<History>,
    pub water_history: Option<WaterHistory>,
    pub weight_history: Option<WeightHistory>,
    pub achievements: Option<Vec<String>>,
    pub active_challenges: Option<BTreeMap<String, ChallengeProgress>>,
    pub daily_tips: Option<Vec<String>>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none()
            && self.plans.is_none()
            && self.history.is_none()
            && self.water_history.is_none()
            && self.weight_history.is_none()
            && self.achievements.is_none()
            && self.active_challenges.is_none()
            && self.daily_tips.is_none()
    }

    pub fn apply_to(self, db: &mut Database) {
        if let Some(v) = self.profile {
            db.profile = v;
        }
        if let Some(v) = self.plans {
            db.plans = v;
        }
        if let Some(v) = self.history {
            db.history = v;
        }
        if let Some(v) = self.water_history {
            db.water_history = v;
        }
        if let Some(v) = self.weight_history {
            db.weight_history = v;
        }
        if let Some(v) = self.achievements {
            db.achievements = v;
        }
        if let Some(v) = self.active_challenges {
            db.active_challenges = v;
        }
        if let Some(v) = self.daily_tips {
            db.daily_tips = v;
        }
    }
}

impl Database {
    /// Starting document for a fresh install.
    pub fn seed() -> Self {
        let mut plans = Plans::new();

        let mut morning = Plan::new("Morning Burn");
        morning.emoji = Some("🌅".to_string());
        morning.color = "#FF6B35".to_string();
        morning.difficulty = Some("Beginner".to_string());
        morning.equipment = Some("Jump rope".to_string());
        morning.exercises = vec![
            Exercise::new("m1", "Jump Rope", Category::Cardio, 120, 30).with_instructions(vec![
                "Keep elbows close to your sides".to_string(),
                "Land softly on the balls of your feet".to_string(),
            ]),
            Exercise::new("m2", "High Knees", Category::Cardio, 45, 15),
            Exercise::new("m3", "Mountain Climbers", Category::Cardio, 45, 15),
            Exercise::new("m4", "Plank", Category::Abs, 60, 0),
        ];
        morning.duration = Some(morning.planned_seconds().div_ceil(60));
        plans.insert("morning".to_string(), morning);

        let mut evening = Plan::new("Evening Core");
        evening.emoji = Some("🌙".to_string());
        evening.color = "#7B61FF".to_string();
        evening.difficulty = Some("Intermediate".to_string());
        evening.equipment = Some("Mat".to_string());
        evening.exercises = vec![
            Exercise::new("e1", "Bicycle Crunches", Category::Abs, 45, 15),
            Exercise::new("e2", "Leg Raises", Category::Abs, 40, 15),
            Exercise::new("e3", "Russian Twists", Category::Abs, 40, 15),
            Exercise::new("e4", "Burpees", Category::Cardio, 40, 0),
        ];
        evening.duration = Some(evening.planned_seconds().div_ceil(60));
        plans.insert("evening".to_string(), evening);

        Self {
            version: 0,
            profile: Profile::default(),
            plans,
            history: History::new(),
            water_history: WaterHistory::new(),
            weight_history: WeightHistory::new(),
            achievements: Vec::new(),
            active_challenges: BTreeMap::new(),
            daily_tips: vec![
                "Drink a glass of water before every workout.".to_string(),
                "Consistency beats intensity. Show up today.".to_string(),
                "Breathe out on the effort, in on the release.".to_string(),
                "Sleep is part of the training plan.".to_string(),
                "Warm up first: cold muscles pull, warm muscles perform.".to_string(),
            ],
        }
    }

    pub fn total_workouts(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }
}
