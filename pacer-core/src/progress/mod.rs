//! Derived views over the stored document: streaks and stats, achievements,
//! challenges and body metrics.

pub mod achievements;
pub mod body;
pub mod challenges;
pub mod history;

use crate::db::models::Database;
use rand::seq::IndexedRandom;

/// A random tip from the document, if it has any.
pub fn daily_tip(db: &Database) -> Option<&str> {
    db.daily_tips
        .choose(&mut rand::rng())
        .map(String::as_str)
}
