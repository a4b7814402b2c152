//! User account commands for CLI.

use clap::Subcommand;
use habitkit_core::storage::HabitDb;

#[derive(Subcommand)]
pub enum UserAction {
    /// Create the user record if it doesn't exist yet
    Init {
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the user record
    Show,
    /// Update timezone or display name
    Update {
        /// IANA timezone name
        #[arg(long)]
        timezone: Option<String>,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Mark the user inactive without deleting data
    Deactivate,
    /// Delete the user and all owned habits, entries, and badges
    Delete,
}

pub fn run(action: UserAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = HabitDb::open()?;

    match action {
        UserAction::Init { email, name } => {
            let record = db.get_or_create_user(user, email.as_deref(), name.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        UserAction::Show => match db.get_user(user)? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => println!("No user record for '{user}'"),
        },
        UserAction::Update { timezone, name } => {
            let record = db.update_user(user, timezone.as_deref(), name.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        UserAction::Deactivate => {
            db.deactivate_user(user)?;
            println!("User deactivated: {user}");
        }
        UserAction::Delete => {
            db.delete_user(user)?;
            println!("User deleted: {user}");
        }
    }
    Ok(())
}
