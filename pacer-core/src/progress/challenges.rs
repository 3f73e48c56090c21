use crate::db::models::ChallengeProgress;
use crate::plan::{DEFAULT_REST_SECONDS, EXERCISE_POOL, Exercise, Plan};

pub const CHALLENGE_PLAN_PREFIX: &str = "challenge:";

/// Extra work seconds added per challenge day.
const DAILY_RAMP_SECONDS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub desc: &'static str,
    pub days: u32,
    pub exercises_per_day: usize,
    pub difficulty: &'static str,
    pub reward_emoji: &'static str,
}

pub const CALISTHENICS_CHALLENGES: &[Challenge] = &[
    Challenge {
        id: "pushup_7",
        title: "7-Day Kickstart",
        desc: "A short daily circuit to build the habit",
        days: 7,
        exercises_per_day: 3,
        difficulty: "Beginner",
        reward_emoji: "🥉",
    },
    Challenge {
        id: "core_14",
        title: "14-Day Core Builder",
        desc: "Two weeks of abs and conditioning",
        days: 14,
        exercises_per_day: 4,
        difficulty: "Intermediate",
        reward_emoji: "🥈",
    },
    Challenge {
        id: "cali_30",
        title: "30-Day Calisthenics",
        desc: "A month of bodyweight work, a little harder each day",
        days: 30,
        exercises_per_day: 5,
        difficulty: "Advanced",
        reward_emoji: "🥇",
    },
];

pub fn find(id: &str) -> Option<&'static Challenge> {
    CALISTHENICS_CHALLENGES.iter().find(|c| c.id == id)
}

pub fn plan_key(challenge_id: &str) -> String {
    format!("{}{}", CHALLENGE_PLAN_PREFIX, challenge_id)
}

pub fn challenge_id_from_plan_key(plan_key: &str) -> Option<&str> {
    plan_key.strip_prefix(CHALLENGE_PLAN_PREFIX)
}

impl Challenge {
    pub fn is_finished(&self, progress: &ChallengeProgress) -> bool {
        progress.current_day > self.days
    }

    /// Whole percent of days done.
    pub fn progress_pct(&self, progress: &ChallengeProgress) -> u32 {
        let done = progress.current_day.saturating_sub(1).min(self.days);
        ((done as f64 / self.days as f64) * 100.0).round() as u32
    }

    /// The circuit for `day` (1-based): a window over the exercise pool that
    /// shifts daily, with work time ramping up.
    pub fn plan_for_day(&self, day: u32) -> Plan {
        let day = day.clamp(1, self.days);
        let offset = (day as usize - 1) % EXERCISE_POOL.len();
        let ramp = (day - 1) * DAILY_RAMP_SECONDS;

        let mut plan = Plan::new(format!("{} - Day {}", self.title, day));
        plan.emoji = Some(self.reward_emoji.to_string());
        plan.difficulty = Some(self.difficulty.to_string());
        plan.exercises = (0..self.exercises_per_day)
            .map(|i| {
                let entry = &EXERCISE_POOL[(offset + i) % EXERCISE_POOL.len()];
                Exercise::new(
                    format!("{}-d{}-{}", self.id, day, i + 1),
                    entry.name,
                    entry.category,
                    entry.default_duration + ramp,
                    DEFAULT_REST_SECONDS,
                )
            })
            .collect();
        plan.duration = Some(plan.planned_seconds().div_ceil(60));
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(day: u32) -> ChallengeProgress {
        ChallengeProgress {
            challenge_id: "pushup_7".into(),
            current_day: day,
            completed_date: None,
        }
    }

    #[test]
    fn day_plan_rotates_and_ramps() {
        let c = find("pushup_7").unwrap();
        let d1 = c.plan_for_day(1);
        let d2 = c.plan_for_day(2);
        assert_eq!(d1.exercises.len(), 3);
        assert_eq!(d1.exercises[0].name, EXERCISE_POOL[0].name);
        assert_eq!(d2.exercises[0].name, EXERCISE_POOL[1].name);
        assert_eq!(
            d2.exercises[0].work_seconds,
            EXERCISE_POOL[1].default_duration + DAILY_RAMP_SECONDS
        );
        assert!(d2.label.ends_with("Day 2"));
    }

    #[test]
    fn day_is_clamped_to_challenge_length() {
        let c = find("pushup_7").unwrap();
        assert_eq!(c.plan_for_day(40).label, c.plan_for_day(7).label);
        assert_eq!(c.plan_for_day(0).label, c.plan_for_day(1).label);
    }

    #[test]
    fn finished_after_last_day() {
        let c = find("pushup_7").unwrap();
        assert!(!c.is_finished(&progress(7)));
        assert!(c.is_finished(&progress(8)));
        assert_eq!(c.progress_pct(&progress(1)), 0);
        assert_eq!(c.progress_pct(&progress(8)), 100);
    }

    #[test]
    fn plan_keys_round_trip_the_id() {
        let key = plan_key("core_14");
        assert_eq!(challenge_id_from_plan_key(&key), Some("core_14"));
        assert_eq!(challenge_id_from_plan_key("morning"), None);
    }
}
