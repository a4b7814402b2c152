//! Habit management commands for CLI.

use clap::Subcommand;
use habitkit_core::model::{GoalType, HabitUpdate};
use habitkit_core::storage::habit_db::NewHabit;
use habitkit_core::storage::{Config, HabitDb};

use super::date_or_today;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit title
        title: String,
        /// Habit description
        #[arg(long)]
        description: Option<String>,
        /// Category for grouping
        #[arg(long)]
        category: Option<String>,
        /// Display color (defaults to the configured habit color)
        #[arg(long)]
        color: Option<String>,
        /// Goal type: binary, duration, or quantity (default: binary)
        #[arg(long, default_value = "binary")]
        goal_type: String,
        /// Numeric goal target for duration/quantity habits
        #[arg(long)]
        goal_target: Option<f64>,
        /// Unit label for the goal target
        #[arg(long)]
        unit: Option<String>,
    },
    /// List habits
    List {
        /// Only active habits
        #[arg(long)]
        active_only: bool,
    },
    /// List all habits with today's completion status
    Status {
        /// Date to evaluate as "today" (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New display color
        #[arg(long)]
        color: Option<String>,
        /// New goal type
        #[arg(long)]
        goal_type: Option<String>,
        /// New goal target
        #[arg(long)]
        goal_target: Option<f64>,
        /// New unit label
        #[arg(long)]
        unit: Option<String>,
        /// Activate or deactivate the habit
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a habit and all of its entries
    Delete {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        HabitAction::Create {
            title,
            description,
            category,
            color,
            goal_type,
            goal_target,
            unit,
        } => {
            let config = Config::load()?;
            let habit = db.create_habit(
                user,
                NewHabit {
                    title,
                    description,
                    category,
                    color: color.unwrap_or(config.habits.default_color),
                    goal_type: goal_type.parse::<GoalType>()?,
                    goal_target,
                    unit,
                },
            )?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { active_only } => {
            let habits = db.list_habits(user, active_only)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Status { date } => {
            let today = date_or_today(date.as_deref())?;
            let statuses = db.list_habits_with_status(user, today)?;
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        HabitAction::Get { id } => match db.get_habit(&id)? {
            Some(habit) => println!("{}", serde_json::to_string_pretty(&habit)?),
            None => println!("No habit with id '{id}'"),
        },
        HabitAction::Update {
            id,
            title,
            description,
            category,
            color,
            goal_type,
            goal_target,
            unit,
            active,
        } => {
            let goal_type = goal_type.map(|s| s.parse::<GoalType>()).transpose()?;
            let habit = db.update_habit(
                &id,
                HabitUpdate {
                    title,
                    description,
                    category,
                    color,
                    goal_type,
                    goal_target,
                    unit,
                    active,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Delete { id } => {
            db.delete_habit(&id)?;
            println!("Habit deleted: {id}");
        }
    }
    Ok(())
}
