use crate::db::models::Database;
use crate::progress::{body, challenges};
use chrono::{DateTime, FixedOffset, Timelike};
use log::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub desc: &'static str,
    pub emoji: &'static str,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_workout",
        title: "First Steps",
        desc: "Complete your first workout",
        emoji: "👟",
    },
    Achievement {
        id: "streak_3",
        title: "On Fire",
        desc: "Maintain a 3-day streak",
        emoji: "🔥",
    },
    Achievement {
        id: "water_goal",
        title: "Hydration Hero",
        desc: "Hit your water goal 3 times",
        emoji: "💧",
    },
    Achievement {
        id: "weight_logged",
        title: "Self-Aware",
        desc: "Log your weight for the first time",
        emoji: "⚖️",
    },
    Achievement {
        id: "early_bird",
        title: "Early Bird",
        desc: "Workout before 9:00 AM",
        emoji: "🌅",
    },
    Achievement {
        id: "night_owl",
        title: "Night Owl",
        desc: "Workout after 9:00 PM",
        emoji: "🌙",
    },
    Achievement {
        id: "cali_master",
        title: "Cali King",
        desc: "Complete a 7-day Calisthenics challenge",
        emoji: "👑",
    },
];

const STREAK_TARGET: u32 = 3;
const WATER_GOAL_DAYS: usize = 3;
const EARLY_BIRD_BEFORE_HOUR: u32 = 9;
const NIGHT_OWL_FROM_HOUR: u32 = 21;
const CALI_MASTER_MIN_DAYS: u32 = 7;

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

fn earned(db: &Database, id: &str, workout_at: Option<&DateTime<FixedOffset>>) -> bool {
    match id {
        "first_workout" => db.total_workouts() > 0,
        "streak_3" => db.profile.streak >= STREAK_TARGET,
        "water_goal" => {
            body::water_goal_days(&db.water_history, db.profile.water_goal) >= WATER_GOAL_DAYS
        }
        "weight_logged" => !db.weight_history.is_empty(),
        "early_bird" => workout_at.is_some_and(|t| t.hour() < EARLY_BIRD_BEFORE_HOUR),
        "night_owl" => workout_at.is_some_and(|t| t.hour() >= NIGHT_OWL_FROM_HOUR),
        "cali_master" => db.active_challenges.values().any(|p| {
            challenges::find(&p.challenge_id)
                .is_some_and(|c| c.days >= CALI_MASTER_MIN_DAYS && c.is_finished(p))
        }),
        _ => false,
    }
}

/// Unlock everything the document now qualifies for. `workout_at` is set
/// when evaluating right after a workout, for the time-of-day badges.
/// Returns only the newly unlocked ones.
pub fn unlock_earned(
    db: &mut Database,
    workout_at: Option<&DateTime<FixedOffset>>,
) -> Vec<&'static Achievement> {
    let mut unlocked = Vec::new();
    for a in ACHIEVEMENTS {
        if db.has_achievement(a.id) || !earned(db, a.id, workout_at) {
            continue;
        }
        info!("Achievement unlocked: {} ({})", a.title, a.id);
        db.achievements.push(a.id.to_string());
        unlocked.push(a);
    }
    unlocked
}

/// Catalogue with unlock flags, in display order.
pub fn catalogue(db: &Database) -> Vec<(&'static Achievement, bool)> {
    ACHIEVEMENTS
        .iter()
        .map(|a| (a, db.has_achievement(a.id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ChallengeProgress, WorkoutEntry};
    use chrono::{NaiveDate, TimeZone};

    fn at(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, hour, 30, 0)
            .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn with_workout(db: &mut Database, time: DateTime<FixedOffset>) {
        db.history.entry(time.date_naive()).or_default().push(WorkoutEntry {
            plan_key: "morning".into(),
            mins: 10,
            time,
        });
    }

    #[test]
    fn first_early_workout_unlocks_two() {
        let mut db = Database::seed();
        let t = at(7);
        with_workout(&mut db, t);
        let ids: Vec<_> = unlock_earned(&mut db, Some(&t)).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["first_workout", "early_bird"]);
        assert!(unlock_earned(&mut db, Some(&t)).is_empty(), "unlocks are idempotent");
    }

    #[test]
    fn night_owl_starts_at_nine_pm() {
        let mut db = Database::seed();
        with_workout(&mut db, at(20));
        let ids: Vec<_> = unlock_earned(&mut db, Some(&at(20))).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["first_workout"]);
        let ids: Vec<_> = unlock_earned(&mut db, Some(&at(21))).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["night_owl"]);
    }

    #[test]
    fn time_badges_need_a_workout() {
        let mut db = Database::seed();
        assert!(unlock_earned(&mut db, None).is_empty());
    }

    #[test]
    fn water_goal_needs_three_days() {
        let mut db = Database::seed();
        db.profile.water_goal = 2000;
        db.water_history.insert(day(1), 2000);
        db.water_history.insert(day(2), 2500);
        db.water_history.insert(day(3), 1999);
        assert!(unlock_earned(&mut db, None).is_empty());
        db.water_history.insert(day(4), 2100);
        let ids: Vec<_> = unlock_earned(&mut db, None).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["water_goal"]);
    }

    #[test]
    fn finished_week_challenge_crowns_cali_king() {
        let mut db = Database::seed();
        db.active_challenges.insert(
            "pushup_7".into(),
            ChallengeProgress {
                challenge_id: "pushup_7".into(),
                current_day: 7,
                completed_date: Some(day(7)),
            },
        );
        assert!(unlock_earned(&mut db, None).is_empty());
        if let Some(p) = db.active_challenges.get_mut("pushup_7") {
            p.current_day = 8;
        }
        let ids: Vec<_> = unlock_earned(&mut db, None).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["cali_master"]);
    }

    #[test]
    fn catalogue_marks_unlocked() {
        let mut db = Database::seed();
        db.achievements.push("streak_3".into());
        let cat = catalogue(&db);
        assert_eq!(cat.len(), ACHIEVEMENTS.len());
        assert!(cat.iter().any(|(a, on)| a.id == "streak_3" && *on));
        assert_eq!(cat.iter().filter(|(_, on)| *on).count(), 1);
        assert_eq!(find("night_owl").map(|a| a.emoji), Some("🌙"));
    }
}
