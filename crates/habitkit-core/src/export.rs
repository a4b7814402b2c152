//! CSV rendering of entry data.
//!
//! A pure formatting pass over entries joined with their habits; the CLI
//! decides which entries to feed in (date range, habit filter).

use std::collections::HashMap;

use crate::model::{Entry, Habit};

const CSV_HEADER: &str = "Date,Habit,Category,Completed,Value,Notes";

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render entries as CSV, one row per entry.
///
/// Entries whose habit is not in `habits` are kept with the habit title
/// "Unknown" and an empty category.
pub fn entries_to_csv(habits: &[Habit], entries: &[Entry]) -> String {
    let habit_by_id: HashMap<&str, &Habit> =
        habits.iter().map(|h| (h.id.as_str(), h)).collect();

    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for entry in entries {
        let habit = habit_by_id.get(entry.habit_id.as_str());
        let title = habit.map(|h| h.title.as_str()).unwrap_or("Unknown");
        let category = habit
            .and_then(|h| h.category.as_deref())
            .map(str::trim)
            .unwrap_or("");
        let value = entry.value.map(|v| v.to_string()).unwrap_or_default();
        let row = [
            entry.entry_date.format("%Y-%m-%d").to_string(),
            csv_field(title),
            csv_field(category),
            (if entry.completed { "Yes" } else { "No" }).to_string(),
            value,
            csv_field(entry.notes.as_deref().unwrap_or("")),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}
