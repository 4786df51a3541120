use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "phoenix-widgets", version, about = "Phoenix widget engine CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Score a widget from raw engagement numbers
    Score(commands::score::ScoreArgs),
    /// Time-of-day multiplier for a widget type
    Context(commands::context::ContextArgs),
    /// Check a layout file for collisions and find a free slot
    Place(commands::place::PlaceArgs),
    /// Run a deterministic dashboard simulation
    Simulate(commands::simulate::SimulateArgs),
    /// Run the periodic drivers in real time
    Watch(commands::watch::WatchArgs),
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Score(args) => commands::score::run(args),
        Commands::Context(args) => commands::context::run(args),
        Commands::Place(args) => commands::place::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Completions { shell } => {
            commands::completions::run(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
