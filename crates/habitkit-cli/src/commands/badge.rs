//! Badge commands for CLI.

use clap::Subcommand;
use habitkit_core::storage::HabitDb;

#[derive(Subcommand)]
pub enum BadgeAction {
    /// Award a badge to the user
    Award {
        /// Badge name
        name: String,
        /// Badge description
        #[arg(long)]
        description: Option<String>,
        /// Icon identifier
        #[arg(long)]
        icon: Option<String>,
        /// Free-form JSON metadata
        #[arg(long)]
        metadata: Option<String>,
    },
    /// List the user's badges
    List,
}

pub fn run(action: BadgeAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        BadgeAction::Award {
            name,
            description,
            icon,
            metadata,
        } => {
            let metadata = metadata
                .as_deref()
                .map(serde_json::from_str::<serde_json::Value>)
                .transpose()?;
            let badge = db.award_badge(user, &name, description.as_deref(), icon.as_deref(), metadata)?;
            println!("{}", serde_json::to_string_pretty(&badge)?);
        }
        BadgeAction::List => {
            let badges = db.list_badges(user)?;
            println!("{}", serde_json::to_string_pretty(&badges)?);
        }
    }
    Ok(())
}
