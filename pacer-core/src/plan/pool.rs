use super::{Category, Exercise};

#[derive(Debug, Clone, Copy)]
pub struct PoolEntry {
    pub name: &'static str,
    pub category: Category,
    pub default_duration: u32,
}

/// (id, name, work seconds, rest seconds)
pub const WARMUP_EXERCISES: &[(&str, &str, u32, u32)] = &[
    ("w1", "Neck Rolls", 20, 5),
    ("w2", "Arm Circles", 25, 5),
    ("w3", "Hip Circles", 25, 5),
    ("w4", "Leg Swings", 30, 5),
    ("w5", "Torso Twists", 25, 5),
    ("w6", "March in Place", 40, 10),
];

pub const EXERCISE_POOL: &[PoolEntry] = &[
    PoolEntry {
        name: "Jump Rope",
        category: Category::Cardio,
        default_duration: 120,
    },
    PoolEntry {
        name: "High Knees",
        category: Category::Cardio,
        default_duration: 45,
    },
    PoolEntry {
        name: "Burpees",
        category: Category::Cardio,
        default_duration: 40,
    },
    PoolEntry {
        name: "Mountain Climbers",
        category: Category::Cardio,
        default_duration: 45,
    },
    PoolEntry {
        name: "Plank",
        category: Category::Abs,
        default_duration: 60,
    },
    PoolEntry {
        name: "Bicycle Crunches",
        category: Category::Abs,
        default_duration: 45,
    },
    PoolEntry {
        name: "Leg Raises",
        category: Category::Abs,
        default_duration: 40,
    },
    PoolEntry {
        name: "Russian Twists",
        category: Category::Abs,
        default_duration: 40,
    },
];

pub fn warmup_exercises() -> impl Iterator<Item = Exercise> {
    WARMUP_EXERCISES
        .iter()
        .map(|(id, name, work, rest)| Exercise::new(*id, *name, Category::Warmup, *work, *rest))
}
