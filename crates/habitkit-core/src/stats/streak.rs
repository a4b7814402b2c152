//! Consecutive-day streak computation.
//!
//! Turns a sparse set of per-day completion records into a current-streak
//! and best-streak count. The same algorithm serves two call sites: the
//! per-user headline streak (all active habits' records merged, a day counts
//! when *any* of them was completed) and the per-habit leaderboard (one
//! habit's records, `habit_count = 1`).

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default cap on the current-streak backward walk, in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// How merged multi-habit records contribute to a streak day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum StreakMode {
    /// A day contributes when at least one fed record for it is completed.
    /// An `allHabitsCompleted` mode is a possible future addition; it is a
    /// different contract, not a variation of this one.
    AnyHabitCompleted,
}

impl Default for StreakMode {
    fn default() -> Self {
        StreakMode::AnyHabitCompleted
    }
}

/// One day's completion record, as fed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub completed: bool,
}

impl DayRecord {
    pub fn new(date: NaiveDate, completed: bool) -> Self {
        Self { date, completed }
    }
}

/// Computed streak lengths, in consecutive days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Length of the unbroken run ending at (or just before) today.
    pub current_streak: u32,
    /// Longest run anywhere in the history, never less than current.
    pub best_streak: u32,
}

/// Streak calculator.
///
/// The backward walk for the current streak is capped at `lookback_days`
/// iterations rather than running until a gap is found. This is a policy
/// bound, not a correctness bound.
#[derive(Debug, Clone)]
pub struct StreakEngine {
    pub lookback_days: u32,
    pub mode: StreakMode,
}

impl Default for StreakEngine {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            mode: StreakMode::AnyHabitCompleted,
        }
    }
}

impl StreakEngine {
    /// Create an engine with the default 365-day lookback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom lookback cap.
    pub fn with_lookback(lookback_days: u32) -> Self {
        Self {
            lookback_days,
            mode: StreakMode::AnyHabitCompleted,
        }
    }

    /// Compute current and best streaks from an unordered record list.
    ///
    /// `habit_count` is a zero-guard only: when no habits are tracked both
    /// streaks are 0 regardless of records. `today` must be supplied by the
    /// caller; today having no completion yet does not break the current
    /// streak.
    pub fn compute(
        &self,
        records: &[DayRecord],
        habit_count: usize,
        today: NaiveDate,
    ) -> StreakSummary {
        if habit_count == 0 {
            return StreakSummary::default();
        }

        // Multiset: date -> number of completed records on that date.
        let mut completions_by_date: HashMap<NaiveDate, u32> = HashMap::new();
        for record in records {
            if record.completed {
                *completions_by_date.entry(record.date).or_insert(0) += 1;
            }
        }

        let current_streak = self.current_streak(&completions_by_date, today);
        let best_streak = best_streak(&completions_by_date, current_streak);

        StreakSummary {
            current_streak,
            best_streak,
        }
    }

    /// Walk backward from today, counting consecutive completed days.
    fn current_streak(
        &self,
        completions_by_date: &HashMap<NaiveDate, u32>,
        today: NaiveDate,
    ) -> u32 {
        let mut streak = 0;
        let mut check_date = today;

        for _ in 0..self.lookback_days {
            if completions_by_date.contains_key(&check_date) {
                streak += 1;
            } else if check_date != today {
                break;
            }
            // An empty today is "not done yet", not a break.

            match check_date.checked_sub_days(Days::new(1)) {
                Some(prev) => check_date = prev,
                None => break,
            }
        }

        streak
    }
}

/// Scan all distinct completed dates, most recent first, tracking the
/// longest run of exactly-one-day gaps.
fn best_streak(completions_by_date: &HashMap<NaiveDate, u32>, current_streak: u32) -> u32 {
    let mut dates: Vec<NaiveDate> = completions_by_date.keys().copied().collect();
    dates.sort_unstable();
    dates.reverse();

    let mut best = 0;
    let mut run = 0;
    let mut prev_date: Option<NaiveDate> = None;

    for date in dates {
        match prev_date {
            Some(prev) => {
                if (prev - date).num_days() == 1 {
                    run += 1;
                } else {
                    best = best.max(run);
                    run = 1;
                }
            }
            None => run = 1,
        }
        prev_date = Some(date);
    }

    // An ongoing run was never "closed" by a gap; the current streak may
    // also exceed every closed run.
    best.max(run).max(current_streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn completed_on(days: &[&str]) -> Vec<DayRecord> {
        days.iter().map(|d| DayRecord::new(date(d), true)).collect()
    }

    #[test]
    fn zero_habits_means_zero_streaks() {
        let engine = StreakEngine::new();
        let records = completed_on(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        let summary = engine.compute(&records, 0, date("2024-01-03"));
        assert_eq!(summary, StreakSummary::default());
    }

    #[test]
    fn no_records_means_zero_streaks() {
        let engine = StreakEngine::new();
        let summary = engine.compute(&[], 3, date("2024-01-03"));
        assert_eq!(summary, StreakSummary::default());
    }

    #[test]
    fn incomplete_records_do_not_count() {
        let engine = StreakEngine::new();
        let records = vec![
            DayRecord::new(date("2024-01-02"), false),
            DayRecord::new(date("2024-01-03"), false),
        ];
        let summary = engine.compute(&records, 1, date("2024-01-03"));
        assert_eq!(summary, StreakSummary::default());
    }

    #[test]
    fn unmarked_today_does_not_break_current_streak() {
        let engine = StreakEngine::new();
        // Completed yesterday and the three days before; nothing today.
        let records = completed_on(&["2024-03-07", "2024-03-08", "2024-03-09", "2024-03-10"]);
        let summary = engine.compute(&records, 1, date("2024-03-11"));
        assert_eq!(summary.current_streak, 4);
        assert_eq!(summary.best_streak, 4);
    }

    #[test]
    fn completed_today_counts() {
        let engine = StreakEngine::new();
        let records = completed_on(&["2024-03-10", "2024-03-11"]);
        let summary = engine.compute(&records, 1, date("2024-03-11"));
        assert_eq!(summary.current_streak, 2);
    }

    #[test]
    fn gap_before_yesterday_breaks_current_streak() {
        let engine = StreakEngine::new();
        // Nearest completion is two days back: no current streak.
        let records = completed_on(&["2024-01-01", "2024-01-03"]);
        let summary = engine.compute(&records, 1, date("2024-01-05"));
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.best_streak, 1);
    }

    #[test]
    fn best_streak_spans_closed_runs() {
        let engine = StreakEngine::new();
        // Five consecutive days, a gap, then a single day.
        let records = completed_on(&[
            "2024-01-01",
            "2024-01-02",
            "2024-01-03",
            "2024-01-04",
            "2024-01-05",
            "2024-01-10",
        ]);
        let summary = engine.compute(&records, 1, date("2024-01-15"));
        assert_eq!(summary.best_streak, 5);
        assert_eq!(summary.current_streak, 0);
    }

    #[test]
    fn ongoing_run_is_reflected_in_best() {
        let engine = StreakEngine::new();
        let records = completed_on(&["2024-01-08", "2024-01-09", "2024-01-10"]);
        let summary = engine.compute(&records, 1, date("2024-01-10"));
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.best_streak, 3);
    }

    #[test]
    fn multiple_completions_on_one_day_count_once() {
        let engine = StreakEngine::new();
        // Two habits completed on the same days: still day-granular.
        let mut records = completed_on(&["2024-01-09", "2024-01-10"]);
        records.extend(completed_on(&["2024-01-09", "2024-01-10"]));
        let summary = engine.compute(&records, 2, date("2024-01-10"));
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.best_streak, 2);
    }

    #[test]
    fn any_habit_completed_merges_across_habits() {
        let engine = StreakEngine::new();
        // Habit A on the 9th, habit B on the 10th: the merged streak is 2.
        let records = vec![
            DayRecord::new(date("2024-01-09"), true),
            DayRecord::new(date("2024-01-10"), true),
            DayRecord::new(date("2024-01-09"), false),
            DayRecord::new(date("2024-01-10"), false),
        ];
        let summary = engine.compute(&records, 2, date("2024-01-10"));
        assert_eq!(summary.current_streak, 2);
    }

    #[test]
    fn lookback_caps_the_backward_walk() {
        let engine = StreakEngine::with_lookback(10);
        let today = date("2024-06-30");
        let mut records = Vec::new();
        let mut day = today;
        for _ in 0..30 {
            records.push(DayRecord::new(day, true));
            day = day.checked_sub_days(Days::new(1)).unwrap();
        }
        let summary = engine.compute(&records, 1, today);
        assert_eq!(summary.current_streak, 10);
    }

    #[test]
    fn end_to_end_three_day_run_with_unmarked_fourth_day() {
        let engine = StreakEngine::new();
        let records = completed_on(&["2024-06-01", "2024-06-02", "2024-06-03"]);
        let summary = engine.compute(&records, 1, date("2024-06-04"));
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.best_streak, 3);
    }

    proptest! {
        #[test]
        fn best_is_never_less_than_current(
            offsets in proptest::collection::vec(0u64..400, 0..60),
            habit_count in 0usize..4,
        ) {
            let today = date("2024-06-30");
            let records: Vec<DayRecord> = offsets
                .iter()
                .filter_map(|&off| today.checked_sub_days(Days::new(off)))
                .map(|d| DayRecord::new(d, true))
                .collect();
            let summary = StreakEngine::new().compute(&records, habit_count, today);
            prop_assert!(summary.best_streak >= summary.current_streak);
            if habit_count == 0 {
                prop_assert_eq!(summary, StreakSummary::default());
            }
        }

        #[test]
        fn streaks_never_exceed_distinct_completed_days(
            offsets in proptest::collection::vec(0u64..100, 0..40),
        ) {
            let today = date("2024-06-30");
            let records: Vec<DayRecord> = offsets
                .iter()
                .filter_map(|&off| today.checked_sub_days(Days::new(off)))
                .map(|d| DayRecord::new(d, true))
                .collect();
            let distinct: std::collections::HashSet<NaiveDate> =
                records.iter().map(|r| r.date).collect();
            let summary = StreakEngine::new().compute(&records, 1, today);
            prop_assert!(summary.best_streak as usize <= distinct.len());
            prop_assert!(summary.current_streak as usize <= distinct.len());
        }
    }
}
