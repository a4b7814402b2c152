//! Domain types for habit tracking.
//!
//! A [`User`] owns a tree of [`Habit`]s, per-day [`Entry`] records, and
//! awarded [`Badge`]s. Entries are unique per (habit, calendar date) and are
//! keyed by `NaiveDate`; row timestamps are UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// How completion of a habit is measured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Done / not done.
    Binary,
    /// Minutes (or another time unit) toward a target.
    Duration,
    /// A count toward a target.
    Quantity,
}

impl GoalType {
    /// Stable string form used in storage and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Binary => "binary",
            GoalType::Duration => "duration",
            GoalType::Quantity => "quantity",
        }
    }
}

impl Default for GoalType {
    fn default() -> Self {
        GoalType::Binary
    }
}

impl FromStr for GoalType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(GoalType::Binary),
            "duration" => Ok(GoalType::Duration),
            "quantity" => Ok(GoalType::Quantity),
            other => Err(ValidationError::InvalidGoalType(other.to_string())),
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account. `external_id` is the identity handed to us by the auth
/// provider and is the key used at the public API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Informational only; dates are evaluated against the caller's clock.
    pub timezone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tracked habit.
///
/// `active = false` excludes the habit from "today" aggregation and future
/// toggles, but its historical entries still count toward best streaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Display color; never consulted by the engines.
    pub color: String,
    pub goal_type: GoalType,
    pub goal_target: Option<f64>,
    pub unit: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a habit; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub goal_type: Option<GoalType>,
    pub goal_target: Option<f64>,
    pub unit: Option<String>,
    pub active: Option<bool>,
}

/// One per-habit, per-day completion record. At most one exists per
/// (habit_id, entry_date); writes for an existing date update in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub habit_id: String,
    pub user_id: String,
    pub entry_date: NaiveDate,
    pub completed: bool,
    /// Raw number for duration/quantity habits.
    pub value: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a toggle: the entry touched and its new completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResult {
    pub entry_id: String,
    pub completed: bool,
}

/// A habit joined with its entry for a given day, for the daily check list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitWithStatus {
    #[serde(flatten)]
    pub habit: Habit,
    pub today_completed: bool,
    pub today_value: f64,
    pub today_entry_id: Option<String>,
}

/// An award attached to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub awarded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_type_round_trip() {
        for gt in [GoalType::Binary, GoalType::Duration, GoalType::Quantity] {
            assert_eq!(gt.as_str().parse::<GoalType>().unwrap(), gt);
        }
    }

    #[test]
    fn goal_type_rejects_unknown() {
        assert!("weekly".parse::<GoalType>().is_err());
    }

    #[test]
    fn goal_type_serde_lowercase() {
        let json = serde_json::to_string(&GoalType::Duration).unwrap();
        assert_eq!(json, "\"duration\"");
    }
}
