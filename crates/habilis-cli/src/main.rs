use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habilis", version, about = "Habilis kit quiz CLI")]
struct Cli {
    /// Use this config file instead of ~/.config/habilis/quiz.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive quiz and checkout
    Quiz(commands::quiz::QuizArgs),
    /// Resolve a profile from a list of answer labels
    Resolve(commands::resolve::ResolveArgs),
    /// List the quiz questions
    Questions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List profiles, tie-break order and product mapping
    Profiles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Quiz(args) => commands::quiz::run(config, args),
        Commands::Resolve(args) => commands::resolve::run(config, args),
        Commands::Questions { json } => commands::catalog::questions(config, json),
        Commands::Profiles { json } => commands::catalog::profiles(config, json),
        Commands::Config { action } => commands::config::run(config, action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "habilis", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
