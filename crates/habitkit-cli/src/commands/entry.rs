//! Daily entry commands for CLI.

use clap::Subcommand;
use habitkit_core::storage::HabitDb;

use super::{date_or_today, parse_date_arg, today};

#[derive(Subcommand)]
pub enum EntryAction {
    /// Flip completion for a habit on a date (creates the entry if needed)
    Toggle {
        /// Habit ID
        habit_id: String,
        /// Entry date (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Record a value/notes entry for a duration or quantity habit
    Log {
        /// Habit ID
        habit_id: String,
        /// Entry date (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Measured value
        #[arg(long)]
        value: Option<f64>,
        /// Free-text note
        #[arg(long)]
        notes: Option<String>,
        /// Completion flag; omitted keeps the stored one
        #[arg(long)]
        completed: Option<bool>,
    },
    /// List entries, by habit or by date range
    List {
        /// Restrict to one habit
        #[arg(long)]
        habit_id: Option<String>,
        /// A single date
        #[arg(long)]
        date: Option<String>,
        /// Range start (inclusive)
        #[arg(long)]
        start: Option<String>,
        /// Range end (inclusive)
        #[arg(long)]
        end: Option<String>,
    },
    /// Mark today's entries of inactive habits as not completed
    Cleanup {
        /// Date to treat as "today" (default: today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: EntryAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        EntryAction::Toggle { habit_id, date } => {
            let date = date_or_today(date.as_deref())?;
            let result = db.toggle_entry(user, &habit_id, date)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        EntryAction::Log {
            habit_id,
            date,
            value,
            notes,
            completed,
        } => {
            let date = date_or_today(date.as_deref())?;
            let entry_id = db.log_entry(user, &habit_id, date, value, notes.as_deref(), completed)?;
            println!("Entry logged: {entry_id}");
        }
        EntryAction::List {
            habit_id,
            date,
            start,
            end,
        } => {
            let entries = if let Some(habit_id) = habit_id {
                let range = match (start, end) {
                    (Some(s), Some(e)) => Some((parse_date_arg(&s)?, parse_date_arg(&e)?)),
                    _ => None,
                };
                db.list_entries_for_habit(&habit_id, range)?
            } else if let Some(date) = date {
                db.list_entries_for_date(user, parse_date_arg(&date)?)?
            } else if let (Some(s), Some(e)) = (start, end) {
                db.list_entries_in_range(user, parse_date_arg(&s)?, parse_date_arg(&e)?)?
            } else {
                db.list_entries_for_user(user)?
            };
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        EntryAction::Cleanup { date } => {
            let date = match date {
                Some(s) => parse_date_arg(&s)?,
                None => today(),
            };
            let fixed = db.cleanup_inactive_today(user, date)?;
            println!("Fixed {fixed} entries");
        }
    }
    Ok(())
}
