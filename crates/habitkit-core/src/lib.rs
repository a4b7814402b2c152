//! # HabitKit Core Library
//!
//! This library provides the core business logic for HabitKit, a personal
//! habit tracker. It implements a CLI-first philosophy where all operations
//! are available via a standalone CLI binary, with any GUI being a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Storage**: SQLite-based storage for users, habits, per-day entries,
//!   and badges, plus TOML-based configuration
//! - **Streak Engine**: pure computation of current/best consecutive-day
//!   streaks from sparse completion records, with an explicit `today` input
//! - **Dashboard Analytics**: headline stats, weekly/monthly completion
//!   trends, category breakdowns, and the per-habit streak leaderboard
//! - **Export**: CSV rendering of entry history
//!
//! ## Key Components
//!
//! - [`HabitDb`]: record storage and mutation entry points
//! - [`StreakEngine`]: the streak calculator
//! - [`DashboardAnalyzer`]: read-only aggregation over store snapshots
//! - [`Config`]: application configuration management

pub mod error;
pub mod export;
pub mod model;
pub mod stats;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, NotFoundError, ValidationError};
pub use model::{Badge, Entry, GoalType, Habit, HabitUpdate, HabitWithStatus, ToggleResult, User};
pub use stats::{
    DashboardAnalyzer, DayRecord, HeadlineStats, StreakEngine, StreakMode, StreakSummary,
};
pub use storage::{Config, HabitDb};
