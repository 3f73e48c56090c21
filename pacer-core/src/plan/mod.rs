//! Exercises, workout plans and the per-session step list.
//!
//! Plans live in the document store keyed by slug. A `SessionPlan` is the
//! immutable list a timer walks through: the optional warm-up prefix
//! followed by the plan's own exercises.

mod pool;

pub use pool::{EXERCISE_POOL, PoolEntry, WARMUP_EXERCISES, warmup_exercises};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const DEFAULT_WORK_SECONDS: u32 = 45;
pub const DEFAULT_REST_SECONDS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Warmup,
    Cardio,
    Abs,
    Strength,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Warmup => "warmup",
            Category::Cardio => "cardio",
            Category::Abs => "abs",
            Category::Strength => "strength",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "warmup" | "warm-up" => Ok(Category::Warmup),
            "cardio" => Ok(Category::Cardio),
            "abs" | "core" => Ok(Category::Abs),
            "strength" => Ok(Category::Strength),
            _ => Err(anyhow!("Invalid exercise category: {}", s)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Older documents store generated ids as millisecond timestamps.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Int(i64),
        Float(f64),
    }

    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Str(s) => Ok(s),
        StrOrNum::Int(i) => Ok(i.to_string()),
        StrOrNum::Float(f) => Ok(format!("{}", f)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(rename = "duration")]
    pub work_seconds: u32,
    #[serde(rename = "rest", default)]
    pub rest_seconds: u32,
    #[serde(rename = "steps", default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
}

impl Exercise {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        work_seconds: u32,
        rest_seconds: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            work_seconds,
            rest_seconds,
            instructions: Vec::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Build an exercise from an `EXERCISE_POOL` entry, matched case-insensitively.
    pub fn from_pool(id: impl Into<String>, name: &str, rest_seconds: u32) -> Result<Self> {
        let entry = EXERCISE_POOL
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| anyhow!("No pool exercise named {}", name))?;
        Ok(Self::new(
            id,
            entry.name,
            entry.category,
            entry.default_duration,
            rest_seconds,
        ))
    }

    pub fn total_seconds(&self) -> u32 {
        self.work_seconds.saturating_add(self.rest_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

fn default_color() -> String {
    "#7B61FF".to_string()
}

impl Plan {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            emoji: None,
            color: default_color(),
            exercises: Vec::new(),
            difficulty: None,
            equipment: None,
            duration: None,
        }
    }

    /// Total planned seconds, rest included.
    pub fn planned_seconds(&self) -> u32 {
        self.exercises
            .iter()
            .map(Exercise::total_seconds)
            .fold(0, u32::saturating_add)
    }
}

/// The ordered steps of one session. Immutable once assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    steps: Vec<Exercise>,
    warmup_len: usize,
}

impl SessionPlan {
    pub fn assemble(plan: &Plan, with_warmup: bool) -> Self {
        let mut steps = Vec::with_capacity(plan.exercises.len() + WARMUP_EXERCISES.len());
        if with_warmup {
            steps.extend(warmup_exercises());
        }
        let warmup_len = steps.len();
        steps.extend(plan.exercises.iter().cloned());
        Self { steps, warmup_len }
    }

    pub fn from_steps(steps: Vec<Exercise>) -> Self {
        Self {
            steps,
            warmup_len: 0,
        }
    }

    pub fn steps(&self) -> &[Exercise] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Exercise> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn warmup_len(&self) -> usize {
        self.warmup_len
    }

    pub fn is_warmup(&self, index: usize) -> bool {
        index < self.warmup_len
    }

    pub fn up_next(&self, index: usize, count: usize) -> &[Exercise] {
        let start = (index + 1).min(self.steps.len());
        let end = (start + count).min(self.steps.len());
        &self.steps[start..end]
    }

    /// Share of steps already finished, rounded to a whole percent.
    pub fn progress_pct(&self, index: usize) -> u32 {
        if self.steps.is_empty() {
            return 100;
        }
        let done = index.min(self.steps.len()) as f64;
        ((done / self.steps.len() as f64) * 100.0).round() as u32
    }
}
