//! Dashboard aggregation over habit and entry snapshots.
//!
//! Every function here is a pure, idempotent read over in-memory data
//! fetched for one request: callers pass the user's habits, entries, and an
//! explicit `today`. Missing or empty data degrades to zero-valued results,
//! never to an error.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::model::{Entry, Habit};
use crate::stats::streak::{DayRecord, StreakEngine};

/// Fixed cyclical palette for category charts.
const CATEGORY_PALETTE: [&str; 8] = [
    "#8B5CF6", // Violet
    "#06B6D4", // Cyan
    "#F59E0B", // Amber
    "#EC4899", // Pink
    "#10B981", // Emerald
    "#6366F1", // Indigo
    "#EF4444", // Red
    "#14B8A6", // Teal
];

/// The headline numbers at the top of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineStats {
    pub active_habits: u32,
    /// Completion rate over the trailing 7 days, as a whole percentage.
    pub completion_rate: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Today's completed entries whose habit is currently active.
    pub completed_today: u32,
    /// Theoretical maximum for today (= active habit count).
    pub total_today: u32,
}

/// One day of the weekly trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short weekday name ("Mon", "Tue", ...).
    pub day_name: String,
    pub completed: u32,
    pub total: u32,
    pub rate: u32,
}

/// One day of the monthly trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrendPoint {
    pub date: NaiveDate,
    /// Day of month, for chart axis labels.
    pub day: u32,
    pub completed: u32,
    pub total: u32,
    pub rate: u32,
}

/// One slice of the category pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: String,
    pub count: u32,
    /// Display color from the fixed palette, by slice position.
    pub fill: String,
}

/// One row of the per-habit streak leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStreakRow {
    pub habit_id: String,
    pub title: String,
    pub color: String,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// round(100 * numerator / denominator), 0 when the denominator is 0.
fn percent(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((numerator as f64 / denominator as f64) * 100.0).round() as u32
}

/// Dashboard aggregation engine.
///
/// Wraps a [`StreakEngine`] so streak-bearing aggregates share one
/// configured lookback bound.
#[derive(Debug, Clone, Default)]
pub struct DashboardAnalyzer {
    pub streaks: StreakEngine,
}

impl DashboardAnalyzer {
    /// Create an analyzer with the default streak lookback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer around a configured streak engine.
    pub fn with_streak_engine(streaks: StreakEngine) -> Self {
        Self { streaks }
    }

    /// Compute the headline stats for one user.
    ///
    /// `habits` and `entries` are the user's full collections; inactive
    /// habits are excluded from today's counts, the 7-day rate, and the
    /// merged streak, even when their entries are dated today.
    pub fn headline_stats(
        &self,
        habits: &[Habit],
        entries: &[Entry],
        today: NaiveDate,
    ) -> HeadlineStats {
        let active_ids: HashSet<&str> = habits
            .iter()
            .filter(|h| h.active)
            .map(|h| h.id.as_str())
            .collect();
        let active_habits = active_ids.len();

        let completed_today = entries
            .iter()
            .filter(|e| e.entry_date == today && e.completed && active_ids.contains(e.habit_id.as_str()))
            .count();

        // Trailing 7 calendar days, today inclusive.
        let window_start = today.checked_sub_days(Days::new(6)).unwrap_or(today);
        let completed_in_window = entries
            .iter()
            .filter(|e| {
                e.completed
                    && active_ids.contains(e.habit_id.as_str())
                    && e.entry_date >= window_start
                    && e.entry_date <= today
            })
            .count();
        let completion_rate = percent(completed_in_window, active_habits * 7);

        // Merged streak over active habits' records: a day counts when any
        // of them was completed.
        let records: Vec<DayRecord> = entries
            .iter()
            .filter(|e| active_ids.contains(e.habit_id.as_str()))
            .map(|e| DayRecord::new(e.entry_date, e.completed))
            .collect();
        let streaks = self.streaks.compute(&records, active_habits, today);

        HeadlineStats {
            active_habits: active_habits as u32,
            completion_rate,
            current_streak: streaks.current_streak,
            best_streak: streaks.best_streak,
            completed_today: completed_today as u32,
            total_today: active_habits as u32,
        }
    }

    /// Completion trend over the trailing 7 days, oldest first.
    pub fn weekly_trend(
        &self,
        habits: &[Habit],
        entries: &[Entry],
        today: NaiveDate,
    ) -> Vec<TrendPoint> {
        self.trend_days(habits, entries, today, 7)
            .map(|(date, completed, total, rate)| TrendPoint {
                date,
                day_name: date.format("%a").to_string(),
                completed,
                total,
                rate,
            })
            .collect()
    }

    /// Completion trend over the trailing 30 days, oldest first.
    pub fn monthly_trend(
        &self,
        habits: &[Habit],
        entries: &[Entry],
        today: NaiveDate,
    ) -> Vec<MonthlyTrendPoint> {
        self.trend_days(habits, entries, today, 30)
            .map(|(date, completed, total, rate)| MonthlyTrendPoint {
                date,
                day: date.day(),
                completed,
                total,
                rate,
            })
            .collect()
    }

    /// Shared per-day scan for the trend charts.
    ///
    /// The denominator for every day is the *current* active habit count,
    /// not the count on that historical day.
    fn trend_days<'a>(
        &self,
        habits: &'a [Habit],
        entries: &'a [Entry],
        today: NaiveDate,
        days: u64,
    ) -> impl Iterator<Item = (NaiveDate, u32, u32, u32)> + 'a {
        let active_ids: HashSet<&str> = habits
            .iter()
            .filter(|h| h.active)
            .map(|h| h.id.as_str())
            .collect();
        let active_count = active_ids.len();

        (0..days).rev().filter_map(move |back| {
            let date = today.checked_sub_days(Days::new(back))?;
            let completed = entries
                .iter()
                .filter(|e| {
                    e.entry_date == date && e.completed && active_ids.contains(e.habit_id.as_str())
                })
                .count();
            Some((
                date,
                completed as u32,
                active_count as u32,
                percent(completed, active_count),
            ))
        })
    }

    /// Group all habits (active and inactive) by category.
    ///
    /// Missing or blank categories fall under "Uncategorized"; slices keep
    /// first-seen order and take their color from the fixed palette.
    pub fn category_breakdown(&self, habits: &[Habit]) -> Vec<CategorySlice> {
        let mut counts: Vec<(String, u32)> = Vec::new();
        for habit in habits {
            let category = habit
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or("Uncategorized");
            match counts.iter_mut().find(|(name, _)| name == category) {
                Some((_, count)) => *count += 1,
                None => counts.push((category.to_string(), 1)),
            }
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(index, (category, count))| CategorySlice {
                category,
                count,
                fill: CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()].to_string(),
            })
            .collect()
    }

    /// Per-habit streak leaderboard over the active habits, sorted by
    /// current streak, longest first.
    pub fn habit_streaks(
        &self,
        habits: &[Habit],
        entries: &[Entry],
        today: NaiveDate,
    ) -> Vec<HabitStreakRow> {
        let mut records_by_habit: HashMap<&str, Vec<DayRecord>> = HashMap::new();
        for entry in entries {
            records_by_habit
                .entry(entry.habit_id.as_str())
                .or_default()
                .push(DayRecord::new(entry.entry_date, entry.completed));
        }

        // Each habit's computation is independent: disjoint record sets,
        // joined here in habit order before sorting.
        let mut rows: Vec<HabitStreakRow> = habits
            .iter()
            .filter(|h| h.active)
            .map(|habit| {
                let records = records_by_habit
                    .get(habit.id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let streaks = self.streaks.compute(records, 1, today);
                HabitStreakRow {
                    habit_id: habit.id.clone(),
                    title: habit.title.clone(),
                    color: habit.color.clone(),
                    current_streak: streaks.current_streak,
                    best_streak: streaks.best_streak,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));
        rows
    }
}
