pub mod badge;
pub mod config;
pub mod entry;
pub mod export;
pub mod habit;
pub mod stats;
pub mod user;

use chrono::{Local, NaiveDate};

/// Today per the local process clock. Dates elsewhere are explicit inputs;
/// only the CLI boundary reads the wall clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, habitkit_core::ValidationError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| habitkit_core::ValidationError::InvalidDate(s.to_string()))
}

/// Resolve an optional date argument, defaulting to today.
pub fn date_or_today(arg: Option<&str>) -> Result<NaiveDate, habitkit_core::ValidationError> {
    match arg {
        Some(s) => parse_date_arg(s),
        None => Ok(today()),
    }
}
