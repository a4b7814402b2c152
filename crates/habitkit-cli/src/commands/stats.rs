//! Dashboard statistics commands for CLI.

use clap::Subcommand;
use habitkit_core::stats::{DashboardAnalyzer, StreakEngine};
use habitkit_core::storage::{Config, HabitDb};

use super::date_or_today;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Headline stats: active habits, completion rate, streaks
    Overview {
        /// Date to treat as "today" (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Completion trend over the trailing 7 days
    Weekly {
        #[arg(long)]
        date: Option<String>,
    },
    /// Completion trend over the trailing 30 days
    Monthly {
        #[arg(long)]
        date: Option<String>,
    },
    /// Habit counts grouped by category
    Categories,
    /// Per-habit streak leaderboard
    Streaks {
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: StatsAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;
    let config = Config::load()?;
    let analyzer = DashboardAnalyzer::with_streak_engine(StreakEngine::with_lookback(
        config.streaks.lookback_days,
    ));

    let habits = db.list_habits(user, false)?;
    let entries = db.list_entries_for_user(user)?;

    match action {
        StatsAction::Overview { date } => {
            let today = date_or_today(date.as_deref())?;
            let stats = analyzer.headline_stats(&habits, &entries, today);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Weekly { date } => {
            let today = date_or_today(date.as_deref())?;
            let trend = analyzer.weekly_trend(&habits, &entries, today);
            println!("{}", serde_json::to_string_pretty(&trend)?);
        }
        StatsAction::Monthly { date } => {
            let today = date_or_today(date.as_deref())?;
            let trend = analyzer.monthly_trend(&habits, &entries, today);
            println!("{}", serde_json::to_string_pretty(&trend)?);
        }
        StatsAction::Categories => {
            let breakdown = analyzer.category_breakdown(&habits);
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        }
        StatsAction::Streaks { date } => {
            let today = date_or_today(date.as_deref())?;
            let rows = analyzer.habit_streaks(&habits, &entries, today);
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}
