use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sprintsight-cli", version, about = "Sprintsight delivery analytics CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Board and sprint health monitoring
    Boards {
        #[command(subcommand)]
        action: commands::boards::BoardsAction,
    },
    /// Velocity and capacity statistics
    Capacity {
        #[command(subcommand)]
        action: commands::capacity::CapacityAction,
    },
    /// Task export with remaining-effort forecasts
    Tasks {
        #[command(subcommand)]
        action: commands::tasks::TasksAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Boards { action } => commands::boards::run(action),
        Commands::Capacity { action } => commands::capacity::run(action),
        Commands::Tasks { action } => commands::tasks::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
