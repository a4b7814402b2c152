//! Statistics module for HabitKit
//!
//! This module turns raw habit and entry collections into the derived
//! numbers the dashboard shows: consecutive-day streaks, headline stats,
//! weekly/monthly completion trends, category breakdowns, and the per-habit
//! streak leaderboard.

mod dashboard;
mod streak;

pub use dashboard::{
    CategorySlice, DashboardAnalyzer, HabitStreakRow, HeadlineStats, MonthlyTrendPoint,
    TrendPoint,
};

pub use streak::{DayRecord, StreakEngine, StreakMode, StreakSummary, DEFAULT_LOOKBACK_DAYS};
