use crate::db::models::{History, WorkoutEntry};
use chrono::{Days, NaiveDate};

pub const HEATMAP_DAYS: u64 = 28;

/// Consecutive days with at least one workout, counting back from `today`.
/// Zero when nothing was done today.
pub fn current_streak(history: &History, today: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = Some(today);
    while let Some(d) = day {
        if !history.get(&d).is_some_and(|v| !v.is_empty()) {
            break;
        }
        count += 1;
        day = d.checked_sub_days(Days::new(1));
    }
    count
}

/// The last `n` days ending today, oldest first.
pub fn last_n_days(today: NaiveDate, n: u64) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .filter_map(|i| today.checked_sub_days(Days::new(i)))
        .collect()
}

/// Heatmap shade for a day's workout count.
pub fn intensity(count: usize) -> u8 {
    match count {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    }
}

pub fn plans_done_on(history: &History, day: NaiveDate) -> Vec<&str> {
    history
        .get(&day)
        .map(|v| v.iter().map(|w| w.plan_key.as_str()).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub count: usize,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub streak: u32,
    pub total_sessions: usize,
    pub total_minutes: u32,
    pub active_days_this_week: usize,
    pub week: Vec<(NaiveDate, bool)>,
    pub heatmap: Vec<HeatmapDay>,
}

impl HistoryStats {
    pub fn compute(history: &History, today: NaiveDate) -> Self {
        let count_on = |d: &NaiveDate| history.get(d).map_or(0, Vec::len);

        let week: Vec<(NaiveDate, bool)> = last_n_days(today, 7)
            .into_iter()
            .map(|d| (d, count_on(&d) > 0))
            .collect();

        let heatmap = last_n_days(today, HEATMAP_DAYS)
            .into_iter()
            .map(|date| {
                let count = count_on(&date);
                HeatmapDay {
                    date,
                    count,
                    level: intensity(count),
                }
            })
            .collect();

        Self {
            streak: current_streak(history, today),
            total_sessions: history.values().map(Vec::len).sum(),
            total_minutes: history.values().flatten().map(|w| w.mins).sum(),
            active_days_this_week: week.iter().filter(|(_, active)| *active).count(),
            week,
            heatmap,
        }
    }
}

/// Days newest first, each with its entries.
pub fn entries_newest_first(history: &History) -> Vec<(NaiveDate, &[WorkoutEntry])> {
    history
        .iter()
        .rev()
        .filter(|(_, v)| !v.is_empty())
        .map(|(d, v)| (*d, v.as_slice()))
        .collect()
}

/// "Today", "Yesterday" or a short weekday date.
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if today.checked_sub_days(Days::new(1)) == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%a, %b %-d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn entry(plan: &str, mins: u32, day: u32) -> WorkoutEntry {
        WorkoutEntry {
            plan_key: plan.into(),
            mins,
            time: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2025, 3, day, 8, 0, 0)
                .unwrap(),
        }
    }

    fn history(days: &[(u32, usize)]) -> History {
        let mut h = History::new();
        for (d, n) in days {
            h.insert(date(*d), (0..*n).map(|_| entry("morning", 10, *d)).collect());
        }
        h
    }

    #[test]
    fn streak_counts_back_from_today() {
        let h = history(&[(10, 1), (9, 2), (8, 1), (6, 1)]);
        assert_eq!(current_streak(&h, date(10)), 3);
        assert_eq!(current_streak(&h, date(11)), 0);
        assert_eq!(current_streak(&h, date(6)), 1);
    }

    #[test]
    fn empty_day_breaks_streak() {
        let mut h = history(&[(10, 1), (8, 1)]);
        h.insert(date(9), vec![]);
        assert_eq!(current_streak(&h, date(10)), 1);
    }

    #[test]
    fn stats_summarise_history() {
        let h = history(&[(10, 3), (9, 1), (2, 2), (1, 1)]);
        let stats = HistoryStats::compute(&h, date(10));
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.total_sessions, 7);
        assert_eq!(stats.total_minutes, 70);
        assert_eq!(stats.active_days_this_week, 2);
        assert_eq!(stats.week.len(), 7);
        assert_eq!(stats.week.last(), Some(&(date(10), true)));
        assert_eq!(stats.heatmap.len(), HEATMAP_DAYS as usize);
        let last = stats.heatmap.last().unwrap();
        assert_eq!((last.date, last.count, last.level), (date(10), 3, 3));
    }

    #[test]
    fn intensity_caps_at_three() {
        assert_eq!(
            [0, 1, 2, 3, 9].map(intensity),
            [0, 1, 2, 3, 3]
        );
    }

    #[test]
    fn last_days_are_oldest_first() {
        assert_eq!(last_n_days(date(3), 3), vec![date(1), date(2), date(3)]);
    }

    #[test]
    fn newest_day_comes_first() {
        let h = history(&[(1, 1), (5, 2), (3, 1)]);
        let days: Vec<_> = entries_newest_first(&h).into_iter().map(|(d, _)| d).collect();
        assert_eq!(days, vec![date(5), date(3), date(1)]);
        assert_eq!(plans_done_on(&h, date(5)), vec!["morning", "morning"]);
    }

    #[test]
    fn labels_recent_days() {
        assert_eq!(day_label(date(10), date(10)), "Today");
        assert_eq!(day_label(date(9), date(10)), "Yesterday");
        assert_eq!(day_label(date(3), date(10)), "Mon, Mar 3");
    }
}
