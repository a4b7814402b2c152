use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "habitkit-cli", version, about = "HabitKit CLI")]
struct Cli {
    /// External user id to operate as
    #[arg(long, global = true, env = "HABITKIT_USER", default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User account management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Daily entry management
    Entry {
        #[command(subcommand)]
        action: commands::entry::EntryAction,
    },
    /// Dashboard statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Badge management
    Badge {
        #[command(subcommand)]
        action: commands::badge::BadgeAction,
    },
    /// Data export
    Export {
        #[command(subcommand)]
        action: commands::export::ExportAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action, &cli.user),
        Commands::Habit { action } => commands::habit::run(action, &cli.user),
        Commands::Entry { action } => commands::entry::run(action, &cli.user),
        Commands::Stats { action } => commands::stats::run(action, &cli.user),
        Commands::Badge { action } => commands::badge::run(action, &cli.user),
        Commands::Export { action } => commands::export::run(action, &cli.user),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
