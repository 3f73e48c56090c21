use crate::db::models::{WaterHistory, WeightHistory};
use chrono::NaiveDate;

pub const WEIGHT_TREND_POINTS: usize = 7;

pub fn water_goal_days(history: &WaterHistory, goal: u32) -> usize {
    if goal == 0 {
        return 0;
    }
    history.values().filter(|ml| **ml >= goal).count()
}

/// Share of the daily goal, 0.0 to 1.0.
pub fn water_progress(current: u32, goal: u32) -> f64 {
    if goal == 0 {
        return 1.0;
    }
    (current as f64 / goal as f64).min(1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightTrend {
    pub points: Vec<(NaiveDate, f64)>,
    pub min: f64,
    pub max: f64,
}

impl WeightTrend {
    /// The most recent points, oldest first. `None` below two points, since
    /// a single reading has no trend.
    pub fn from_history(history: &WeightHistory) -> Option<Self> {
        let skip = history.len().saturating_sub(WEIGHT_TREND_POINTS);
        let points: Vec<(NaiveDate, f64)> =
            history.iter().skip(skip).map(|(d, w)| (*d, *w)).collect();
        if points.len() < 2 {
            return None;
        }
        let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        Some(Self { points, min, max })
    }

    pub fn latest(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.1)
    }

    /// Latest minus earliest.
    pub fn change(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.1 - first.1,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn trend_keeps_last_seven() {
        let history: WeightHistory = (1..=10).map(|d| (day(d), 80.0 - d as f64 * 0.5)).collect();
        let trend = WeightTrend::from_history(&history).unwrap();
        assert_eq!(trend.points.len(), WEIGHT_TREND_POINTS);
        assert_eq!(trend.points[0].0, day(4));
        assert_eq!(trend.latest(), 75.0);
        assert_eq!(trend.max, 78.0);
        assert_eq!(trend.min, 75.0);
        assert_eq!(trend.change(), -3.0);
    }

    #[test]
    fn single_reading_has_no_trend() {
        let mut history = WeightHistory::new();
        history.insert(day(1), 70.0);
        assert!(WeightTrend::from_history(&history).is_none());
    }

    #[test]
    fn water_progress_is_capped() {
        assert_eq!(water_progress(1250, 2500), 0.5);
        assert_eq!(water_progress(4000, 2500), 1.0);
        assert_eq!(water_goal_days(&WaterHistory::new(), 0), 0);
    }
}
