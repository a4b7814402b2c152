//! Export commands for CLI.

use chrono::Days;
use clap::Subcommand;
use habitkit_core::export::entries_to_csv;
use habitkit_core::storage::HabitDb;

use super::{parse_date_arg, today};

#[derive(Subcommand)]
pub enum ExportAction {
    /// Print entry history as CSV
    Csv {
        /// Range start (inclusive; default: 30 days ago)
        #[arg(long)]
        start: Option<String>,
        /// Range end (inclusive; default: today)
        #[arg(long)]
        end: Option<String>,
        /// Restrict to these habit ids (repeatable; default: all)
        #[arg(long = "habit")]
        habits: Vec<String>,
    },
}

pub fn run(action: ExportAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        ExportAction::Csv { start, end, habits } => {
            let end_date = match end {
                Some(s) => parse_date_arg(&s)?,
                None => today(),
            };
            let start_date = match start {
                Some(s) => parse_date_arg(&s)?,
                None => end_date.checked_sub_days(Days::new(30)).unwrap_or(end_date),
            };

            let all_habits = db.list_habits(user, false)?;
            let mut entries = db.list_entries_in_range(user, start_date, end_date)?;
            if !habits.is_empty() {
                entries.retain(|e| habits.contains(&e.habit_id));
            }

            print!("{}", entries_to_csv(&all_habits, &entries));
        }
    }
    Ok(())
}
