//! SQLite-based storage for users, habits, entries, and badges.
//!
//! All public operations are keyed by the user's external (auth provider)
//! id. Mutations check ownership references up front and fail with
//! [`NotFoundError`] rather than creating partial state; reads return
//! empty collections or `None` for missing data.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use super::migrations;
use crate::error::{CoreError, DatabaseError, NotFoundError, Result, ValidationError};
use crate::model::{
    Badge, Entry, GoalType, Habit, HabitUpdate, HabitWithStatus, ToggleResult, User,
};

// === Helper Functions ===

/// Parse goal type from database string
fn parse_goal_type(goal_type_str: &str) -> GoalType {
    match goal_type_str {
        "duration" => GoalType::Duration,
        "quantity" => GoalType::Quantity,
        _ => GoalType::Binary,
    }
}

/// Format a calendar date for database storage
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a calendar date from its `YYYY-MM-DD` database form
fn parse_date(date_str: &str) -> std::result::Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a User from a database row
fn row_to_user(row: &rusqlite::Row) -> std::result::Result<User, rusqlite::Error> {
    let created_at_str: String = row.get(6)?;
    let updated_at_str: String = row.get(7)?;
    Ok(User {
        id: row.get(0)?,
        external_id: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        timezone: row.get(4)?,
        is_active: row.get(5)?,
        created_at: parse_datetime_fallback(&created_at_str),
        updated_at: parse_datetime_fallback(&updated_at_str),
    })
}

/// Build a Habit from a database row
fn row_to_habit(row: &rusqlite::Row) -> std::result::Result<Habit, rusqlite::Error> {
    let goal_type_str: String = row.get(6)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        color: row.get(5)?,
        goal_type: parse_goal_type(&goal_type_str),
        goal_target: row.get(7)?,
        unit: row.get(8)?,
        active: row.get(9)?,
        created_at: parse_datetime_fallback(&created_at_str),
        updated_at: parse_datetime_fallback(&updated_at_str),
    })
}

/// Build an Entry from a database row
fn row_to_entry(row: &rusqlite::Row) -> std::result::Result<Entry, rusqlite::Error> {
    let entry_date_str: String = row.get(3)?;
    let created_at_str: String = row.get(7)?;
    let updated_at_str: String = row.get(8)?;
    Ok(Entry {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        user_id: row.get(2)?,
        entry_date: parse_date(&entry_date_str)?,
        completed: row.get(4)?,
        value: row.get(5)?,
        notes: row.get(6)?,
        created_at: parse_datetime_fallback(&created_at_str),
        updated_at: parse_datetime_fallback(&updated_at_str),
    })
}

/// Build a Badge from a database row
fn row_to_badge(row: &rusqlite::Row) -> std::result::Result<Badge, rusqlite::Error> {
    let metadata_json: Option<String> = row.get(5)?;
    let metadata = metadata_json.and_then(|s| serde_json::from_str(&s).ok());
    let awarded_at_str: String = row.get(6)?;
    Ok(Badge {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        icon: row.get(4)?,
        metadata,
        awarded_at: parse_datetime_fallback(&awarded_at_str),
    })
}

const HABIT_COLUMNS: &str = "id, user_id, title, description, category, color, goal_type,
        goal_target, unit, active, created_at, updated_at";

const ENTRY_COLUMNS: &str =
    "id, habit_id, user_id, entry_date, completed, value, notes, created_at, updated_at";

/// Fields for creating a habit. The habit is always created active.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub color: String,
    pub goal_type: GoalType,
    pub goal_target: Option<f64>,
    pub unit: Option<String>,
}

/// SQLite database for habit storage.
///
/// Stores users, habits, per-day entries, and badges.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitkit/habitkit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("habitkit.db");
        let conn = Connection::open(&path).map_err(|source| {
            CoreError::Database(DatabaseError::OpenFailed { path, source })
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| CoreError::Database(DatabaseError::MigrationFailed(e.to_string())))
    }

    // === Users ===

    /// Look up a user by external id.
    pub fn get_user(&self, external_id: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, external_id, email, name, timezone, is_active, created_at, updated_at
             FROM users WHERE external_id = ?1",
        )?;
        let user = stmt
            .query_row(params![external_id], row_to_user)
            .optional()?;
        Ok(user)
    }

    fn require_user(&self, external_id: &str) -> Result<User> {
        self.get_user(external_id)?
            .ok_or_else(|| NotFoundError::User(external_id.to_string()).into())
    }

    /// Fetch the user for an external id, creating the record on first
    /// sight. Email and name are refreshed when they have changed.
    pub fn get_or_create_user(
        &self,
        external_id: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<User> {
        if let Some(existing) = self.get_user(external_id)? {
            if existing.email.as_deref() != email || existing.name.as_deref() != name {
                self.conn.execute(
                    "UPDATE users SET email = ?1, name = ?2, updated_at = ?3 WHERE id = ?4",
                    params![email, name, Utc::now().to_rfc3339(), existing.id],
                )?;
                return self.require_user(external_id);
            }
            return Ok(existing);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            external_id: external_id.to_string(),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            timezone: "UTC".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO users (id, external_id, email, name, timezone, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id,
                user.external_id,
                user.email,
                user.name,
                user.timezone,
                user.is_active,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(user)
    }

    /// Update a user's timezone and/or display name.
    pub fn update_user(
        &self,
        external_id: &str,
        timezone: Option<&str>,
        name: Option<&str>,
    ) -> Result<User> {
        let user = self.require_user(external_id)?;
        self.conn.execute(
            "UPDATE users SET timezone = COALESCE(?1, timezone),
                              name = COALESCE(?2, name),
                              updated_at = ?3
             WHERE id = ?4",
            params![timezone, name, Utc::now().to_rfc3339(), user.id],
        )?;
        self.require_user(external_id)
    }

    /// Mark a user inactive without deleting any data.
    pub fn deactivate_user(&self, external_id: &str) -> Result<()> {
        let user = self.require_user(external_id)?;
        self.conn.execute(
            "UPDATE users SET is_active = 0, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), user.id],
        )?;
        Ok(())
    }

    /// Delete a user and everything they own: entries, habits, badges,
    /// then the user row itself.
    pub fn delete_user(&self, external_id: &str) -> Result<()> {
        let user = self.require_user(external_id)?;
        self.conn
            .execute("DELETE FROM entries WHERE user_id = ?1", params![user.id])?;
        self.conn
            .execute("DELETE FROM habits WHERE user_id = ?1", params![user.id])?;
        self.conn
            .execute("DELETE FROM badges WHERE user_id = ?1", params![user.id])?;
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", params![user.id])?;
        Ok(())
    }

    // === Habits ===

    /// Create a habit for a user. Fails if the user does not exist or the
    /// title is empty.
    pub fn create_habit(&self, external_id: &str, new: NewHabit) -> Result<Habit> {
        if new.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title").into());
        }
        let user = self.require_user(external_id)?;

        let now = Utc::now();
        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            title: new.title,
            description: new.description,
            category: new.category,
            color: new.color,
            goal_type: new.goal_type,
            goal_target: new.goal_target,
            unit: new.unit,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO habits (id, user_id, title, description, category, color, goal_type,
                                 goal_target, unit, active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                habit.id,
                habit.user_id,
                habit.title,
                habit.description,
                habit.category,
                habit.color,
                habit.goal_type.as_str(),
                habit.goal_target,
                habit.unit,
                habit.active,
                habit.created_at.to_rfc3339(),
                habit.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(habit)
    }

    /// Get a habit by id.
    pub fn get_habit(&self, habit_id: &str) -> Result<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"))?;
        let habit = stmt.query_row(params![habit_id], row_to_habit).optional()?;
        Ok(habit)
    }

    fn require_habit(&self, habit_id: &str) -> Result<Habit> {
        self.get_habit(habit_id)?
            .ok_or_else(|| NotFoundError::Habit(habit_id.to_string()).into())
    }

    /// List a user's habits, optionally restricted to active ones.
    ///
    /// Returns an empty list for an unknown user.
    pub fn list_habits(&self, external_id: &str, active_only: bool) -> Result<Vec<Habit>> {
        let user = match self.get_user(external_id)? {
            Some(user) => user,
            None => return Ok(Vec::new()),
        };
        let sql = if active_only {
            format!(
                "SELECT {HABIT_COLUMNS} FROM habits
                 WHERE user_id = ?1 AND active = 1 ORDER BY created_at"
            )
        } else {
            format!("SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ?1 ORDER BY created_at")
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let habits = stmt.query_map(params![user.id], row_to_habit)?;
        habits.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List all of a user's habits together with their completion status
    /// for `today`, for the daily check list.
    pub fn list_habits_with_status(
        &self,
        external_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<HabitWithStatus>> {
        let habits = self.list_habits(external_id, false)?;
        let mut out = Vec::with_capacity(habits.len());
        for habit in habits {
            let entry = self.entry_for_habit_date(&habit.id, today)?;
            out.push(HabitWithStatus {
                today_completed: entry.as_ref().map(|e| e.completed).unwrap_or(false),
                today_value: entry.as_ref().and_then(|e| e.value).unwrap_or(0.0),
                today_entry_id: entry.map(|e| e.id),
                habit,
            });
        }
        Ok(out)
    }

    /// Apply a partial update to a habit.
    pub fn update_habit(&self, habit_id: &str, update: HabitUpdate) -> Result<Habit> {
        let habit = self.require_habit(habit_id)?;
        let HabitUpdate {
            title,
            description,
            category,
            color,
            goal_type,
            goal_target,
            unit,
            active,
        } = update;
        self.conn.execute(
            "UPDATE habits SET title = COALESCE(?1, title),
                               description = COALESCE(?2, description),
                               category = COALESCE(?3, category),
                               color = COALESCE(?4, color),
                               goal_type = COALESCE(?5, goal_type),
                               goal_target = COALESCE(?6, goal_target),
                               unit = COALESCE(?7, unit),
                               active = COALESCE(?8, active),
                               updated_at = ?9
             WHERE id = ?10",
            params![
                title,
                description,
                category,
                color,
                goal_type.map(|g| g.as_str()),
                goal_target,
                unit,
                active,
                Utc::now().to_rfc3339(),
                habit.id,
            ],
        )?;
        self.require_habit(habit_id)
    }

    /// Delete a habit and all of its entries. No orphan entries survive.
    pub fn delete_habit(&self, habit_id: &str) -> Result<()> {
        let habit = self.require_habit(habit_id)?;
        self.conn
            .execute("DELETE FROM entries WHERE habit_id = ?1", params![habit.id])?;
        self.conn
            .execute("DELETE FROM habits WHERE id = ?1", params![habit.id])?;
        Ok(())
    }

    // === Entries ===

    fn entry_for_habit_date(&self, habit_id: &str, date: NaiveDate) -> Result<Option<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE habit_id = ?1 AND entry_date = ?2"
        ))?;
        let entry = stmt
            .query_row(params![habit_id, format_date(date)], row_to_entry)
            .optional()?;
        Ok(entry)
    }

    /// Flip the completion flag for (habit, date), creating a completed
    /// entry if none exists yet. The primary daily-check mutation.
    pub fn toggle_entry(
        &self,
        external_id: &str,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<ToggleResult> {
        let user = self.require_user(external_id)?;
        self.require_habit(habit_id)?;

        if let Some(existing) = self.entry_for_habit_date(habit_id, date)? {
            let flipped = !existing.completed;
            self.conn.execute(
                "UPDATE entries SET completed = ?1, updated_at = ?2 WHERE id = ?3",
                params![flipped, Utc::now().to_rfc3339(), existing.id],
            )?;
            return Ok(ToggleResult {
                entry_id: existing.id,
                completed: flipped,
            });
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO entries (id, habit_id, user_id, entry_date, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
            params![id, habit_id, user.id, format_date(date), now],
        )?;
        Ok(ToggleResult {
            entry_id: id,
            completed: true,
        })
    }

    /// Upsert an entry's value/notes/completion for (habit, date).
    ///
    /// `completed = None` preserves the stored flag (false on creation);
    /// value and notes are overwritten with whatever is supplied.
    pub fn log_entry(
        &self,
        external_id: &str,
        habit_id: &str,
        date: NaiveDate,
        value: Option<f64>,
        notes: Option<&str>,
        completed: Option<bool>,
    ) -> Result<String> {
        let user = self.require_user(external_id)?;
        self.require_habit(habit_id)?;

        if let Some(existing) = self.entry_for_habit_date(habit_id, date)? {
            self.conn.execute(
                "UPDATE entries SET value = ?1, notes = ?2, completed = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    value,
                    notes,
                    completed.unwrap_or(existing.completed),
                    Utc::now().to_rfc3339(),
                    existing.id,
                ],
            )?;
            return Ok(existing.id);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO entries (id, habit_id, user_id, entry_date, completed, value, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                id,
                habit_id,
                user.id,
                format_date(date),
                completed.unwrap_or(false),
                value,
                notes,
                now,
            ],
        )?;
        Ok(id)
    }

    /// List a user's entries for one calendar date.
    pub fn list_entries_for_date(&self, external_id: &str, date: NaiveDate) -> Result<Vec<Entry>> {
        let user = match self.get_user(external_id)? {
            Some(user) => user,
            None => return Ok(Vec::new()),
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?1 AND entry_date = ?2"
        ))?;
        let entries = stmt.query_map(params![user.id, format_date(date)], row_to_entry)?;
        entries.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List a user's entries with `start <= entry_date <= end`.
    pub fn list_entries_in_range(
        &self,
        external_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Entry>> {
        if end < start {
            return Err(ValidationError::InvalidDateRange { start, end }.into());
        }
        let user = match self.get_user(external_id)? {
            Some(user) => user,
            None => return Ok(Vec::new()),
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries
             WHERE user_id = ?1 AND entry_date >= ?2 AND entry_date <= ?3
             ORDER BY entry_date"
        ))?;
        let entries = stmt.query_map(
            params![user.id, format_date(start), format_date(end)],
            row_to_entry,
        )?;
        entries.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List all of a user's entries.
    pub fn list_entries_for_user(&self, external_id: &str) -> Result<Vec<Entry>> {
        let user = match self.get_user(external_id)? {
            Some(user) => user,
            None => return Ok(Vec::new()),
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?1 ORDER BY entry_date"
        ))?;
        let entries = stmt.query_map(params![user.id], row_to_entry)?;
        entries.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List a habit's entries, optionally restricted to a date range.
    pub fn list_entries_for_habit(
        &self,
        habit_id: &str,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Entry>> {
        if let Some((start, end)) = range {
            if end < start {
                return Err(ValidationError::InvalidDateRange { start, end }.into());
            }
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM entries
                 WHERE habit_id = ?1 AND entry_date >= ?2 AND entry_date <= ?3
                 ORDER BY entry_date"
            ))?;
            let entries = stmt.query_map(
                params![habit_id, format_date(start), format_date(end)],
                row_to_entry,
            )?;
            return entries.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into);
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE habit_id = ?1 ORDER BY entry_date"
        ))?;
        let entries = stmt.query_map(params![habit_id], row_to_entry)?;
        entries.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Force `completed = false` on today's entries of inactive habits,
    /// so a deactivated habit never shows as done today.
    ///
    /// Returns the number of entries fixed.
    pub fn cleanup_inactive_today(&self, external_id: &str, today: NaiveDate) -> Result<usize> {
        let user = self.require_user(external_id)?;
        let fixed = self.conn.execute(
            "UPDATE entries SET completed = 0, updated_at = ?1
             WHERE user_id = ?2 AND entry_date = ?3 AND completed = 1
               AND habit_id IN (SELECT id FROM habits WHERE user_id = ?2 AND active = 0)",
            params![Utc::now().to_rfc3339(), user.id, format_date(today)],
        )?;
        Ok(fixed)
    }

    // === Badges ===

    /// Award a badge to a user.
    pub fn award_badge(
        &self,
        external_id: &str,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
        metadata: Option<serde_json::Value>,
    ) -> Result<Badge> {
        let user = self.require_user(external_id)?;
        let badge = Badge {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            name: name.to_string(),
            description: description.map(str::to_string),
            icon: icon.map(str::to_string),
            metadata,
            awarded_at: Utc::now(),
        };
        let metadata_json = badge
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.conn.execute(
            "INSERT INTO badges (id, user_id, name, description, icon, metadata, awarded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                badge.id,
                badge.user_id,
                badge.name,
                badge.description,
                badge.icon,
                metadata_json,
                badge.awarded_at.to_rfc3339(),
            ],
        )?;
        Ok(badge)
    }

    /// List a user's badges.
    pub fn list_badges(&self, external_id: &str) -> Result<Vec<Badge>> {
        let user = match self.get_user(external_id)? {
            Some(user) => user,
            None => return Ok(Vec::new()),
        };
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, description, icon, metadata, awarded_at
             FROM badges WHERE user_id = ?1 ORDER BY awarded_at",
        )?;
        let badges = stmt.query_map(params![user.id], row_to_badge)?;
        badges.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> HabitDb {
        let db = HabitDb::open_memory().unwrap();
        db.get_or_create_user("user-1", Some("a@example.com"), Some("Ada"))
            .unwrap();
        db
    }

    fn new_habit(title: &str) -> NewHabit {
        NewHabit {
            title: title.to_string(),
            description: None,
            category: None,
            color: "#FFB4A2".to_string(),
            goal_type: GoalType::Binary,
            goal_target: None,
            unit: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn get_or_create_is_idempotent_and_refreshes_profile() {
        let db = test_db();
        let first = db.get_user("user-1").unwrap().unwrap();
        let again = db
            .get_or_create_user("user-1", Some("a@example.com"), Some("Ada"))
            .unwrap();
        assert_eq!(first.id, again.id);

        let renamed = db
            .get_or_create_user("user-1", Some("a@example.com"), Some("Ada L."))
            .unwrap();
        assert_eq!(renamed.id, first.id);
        assert_eq!(renamed.name.as_deref(), Some("Ada L."));
    }

    #[test]
    fn create_habit_requires_user() {
        let db = HabitDb::open_memory().unwrap();
        let err = db.create_habit("ghost", new_habit("Stretch")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(NotFoundError::User(_))));
    }

    #[test]
    fn create_habit_rejects_empty_title() {
        let db = test_db();
        let err = db.create_habit("user-1", new_habit("  ")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn habit_round_trip_and_partial_update() {
        let db = test_db();
        let mut draft = new_habit("Read");
        draft.category = Some("Learning".to_string());
        draft.goal_type = GoalType::Duration;
        draft.goal_target = Some(30.0);
        draft.unit = Some("min".to_string());
        let habit = db.create_habit("user-1", draft).unwrap();
        assert!(habit.active);

        let updated = db
            .update_habit(
                &habit.id,
                HabitUpdate {
                    title: Some("Read books".to_string()),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Read books");
        assert!(!updated.active);
        // Untouched fields survive
        assert_eq!(updated.goal_type, GoalType::Duration);
        assert_eq!(updated.goal_target, Some(30.0));
    }

    #[test]
    fn list_habits_active_only_filter() {
        let db = test_db();
        let a = db.create_habit("user-1", new_habit("A")).unwrap();
        let _b = db.create_habit("user-1", new_habit("B")).unwrap();
        db.update_habit(
            &a.id,
            HabitUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(db.list_habits("user-1", false).unwrap().len(), 2);
        let active = db.list_habits("user-1", true).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "B");
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let db = test_db();
        let habit = db.create_habit("user-1", new_habit("Run")).unwrap();
        let day = date("2024-06-01");

        let first = db.toggle_entry("user-1", &habit.id, day).unwrap();
        assert!(first.completed);
        let second = db.toggle_entry("user-1", &habit.id, day).unwrap();
        assert_eq!(second.entry_id, first.entry_id);
        assert!(!second.completed);
        let third = db.toggle_entry("user-1", &habit.id, day).unwrap();
        assert!(third.completed);

        // Still exactly one entry for the (habit, date) pair
        let entries = db.list_entries_for_habit(&habit.id, None).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn toggle_rejects_missing_user_and_habit() {
        let db = test_db();
        let habit = db.create_habit("user-1", new_habit("Run")).unwrap();
        let day = date("2024-06-01");

        let err = db.toggle_entry("ghost", &habit.id, day).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(NotFoundError::User(_))));
        let err = db.toggle_entry("user-1", "missing", day).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(NotFoundError::Habit(_))));
    }

    #[test]
    fn log_entry_upserts_and_preserves_completed() {
        let db = test_db();
        let habit = db.create_habit("user-1", new_habit("Meditate")).unwrap();
        let day = date("2024-06-02");

        // Creation without an explicit flag defaults to not completed
        let id = db
            .log_entry("user-1", &habit.id, day, Some(10.0), Some("short"), None)
            .unwrap();
        let entry = db.entry_for_habit_date(&habit.id, day).unwrap().unwrap();
        assert_eq!(entry.id, id);
        assert!(!entry.completed);
        assert_eq!(entry.value, Some(10.0));

        // Marking complete, then logging again without a flag keeps it
        db.log_entry("user-1", &habit.id, day, Some(20.0), None, Some(true))
            .unwrap();
        let id2 = db
            .log_entry("user-1", &habit.id, day, Some(25.0), None, None)
            .unwrap();
        assert_eq!(id2, id);
        let entry = db.entry_for_habit_date(&habit.id, day).unwrap().unwrap();
        assert!(entry.completed);
        assert_eq!(entry.value, Some(25.0));
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn delete_habit_cascades_to_entries() {
        let db = test_db();
        let habit = db.create_habit("user-1", new_habit("Swim")).unwrap();
        for day in ["2024-06-01", "2024-06-02", "2024-06-03"] {
            db.toggle_entry("user-1", &habit.id, date(day)).unwrap();
        }
        assert_eq!(db.list_entries_for_habit(&habit.id, None).unwrap().len(), 3);

        db.delete_habit(&habit.id).unwrap();
        assert!(db.get_habit(&habit.id).unwrap().is_none());
        assert_eq!(db.list_entries_for_habit(&habit.id, None).unwrap().len(), 0);
    }

    #[test]
    fn delete_user_cascades_everything() {
        let db = test_db();
        let habit = db.create_habit("user-1", new_habit("Swim")).unwrap();
        db.toggle_entry("user-1", &habit.id, date("2024-06-01"))
            .unwrap();
        db.award_badge("user-1", "First Streak", None, None, None)
            .unwrap();

        db.delete_user("user-1").unwrap();
        assert!(db.get_user("user-1").unwrap().is_none());
        assert!(db.get_habit(&habit.id).unwrap().is_none());
        assert_eq!(db.list_entries_for_habit(&habit.id, None).unwrap().len(), 0);
    }

    #[test]
    fn entries_in_range_are_inclusive_and_ordered() {
        let db = test_db();
        let habit = db.create_habit("user-1", new_habit("Walk")).unwrap();
        for day in ["2024-05-30", "2024-06-01", "2024-06-03", "2024-06-05"] {
            db.toggle_entry("user-1", &habit.id, date(day)).unwrap();
        }

        let entries = db
            .list_entries_in_range("user-1", date("2024-06-01"), date("2024-06-03"))
            .unwrap();
        let days: Vec<_> = entries.iter().map(|e| e.entry_date).collect();
        assert_eq!(days, vec![date("2024-06-01"), date("2024-06-03")]);

        let err = db
            .list_entries_in_range("user-1", date("2024-06-03"), date("2024-06-01"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn reads_degrade_to_empty_for_unknown_user() {
        let db = HabitDb::open_memory().unwrap();
        assert!(db.list_habits("nobody", false).unwrap().is_empty());
        assert!(db
            .list_entries_for_date("nobody", date("2024-06-01"))
            .unwrap()
            .is_empty());
        assert!(db.list_badges("nobody").unwrap().is_empty());
    }

    #[test]
    fn cleanup_clears_today_for_inactive_habits_only() {
        let db = test_db();
        let keep = db.create_habit("user-1", new_habit("Keep")).unwrap();
        let drop = db.create_habit("user-1", new_habit("Drop")).unwrap();
        let today = date("2024-06-10");
        let yesterday = date("2024-06-09");

        db.toggle_entry("user-1", &keep.id, today).unwrap();
        db.toggle_entry("user-1", &drop.id, today).unwrap();
        db.toggle_entry("user-1", &drop.id, yesterday).unwrap();

        db.update_habit(
            &drop.id,
            HabitUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        let fixed = db.cleanup_inactive_today("user-1", today).unwrap();
        assert_eq!(fixed, 1);

        let today_entries = db.list_entries_for_date("user-1", today).unwrap();
        for entry in today_entries {
            if entry.habit_id == drop.id {
                assert!(!entry.completed);
            } else {
                assert!(entry.completed);
            }
        }
        // Historical entries of the inactive habit are untouched
        let past = db.entry_for_habit_date(&drop.id, yesterday).unwrap().unwrap();
        assert!(past.completed);
    }

    #[test]
    fn status_list_joins_todays_entries() {
        let db = test_db();
        let habit = db.create_habit("user-1", new_habit("Journal")).unwrap();
        let other = db.create_habit("user-1", new_habit("Stretch")).unwrap();
        let today = date("2024-06-10");
        db.log_entry("user-1", &habit.id, today, Some(3.0), None, Some(true))
            .unwrap();

        let statuses = db.list_habits_with_status("user-1", today).unwrap();
        assert_eq!(statuses.len(), 2);
        let journal = statuses.iter().find(|s| s.habit.id == habit.id).unwrap();
        assert!(journal.today_completed);
        assert_eq!(journal.today_value, 3.0);
        assert!(journal.today_entry_id.is_some());
        let stretch = statuses.iter().find(|s| s.habit.id == other.id).unwrap();
        assert!(!stretch.today_completed);
        assert!(stretch.today_entry_id.is_none());
    }

    #[test]
    fn badges_round_trip_metadata() {
        let db = test_db();
        let badge = db
            .award_badge(
                "user-1",
                "Seven Days",
                Some("A week without a gap"),
                Some("flame"),
                Some(serde_json::json!({ "streak": 7 })),
            )
            .unwrap();
        let badges = db.list_badges("user-1").unwrap();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].id, badge.id);
        assert_eq!(badges[0].metadata.as_ref().unwrap()["streak"], 7);
    }
}
