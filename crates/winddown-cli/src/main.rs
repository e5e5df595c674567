use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use winddown_core::Config;

mod commands;
mod terminal_host;

#[derive(Parser)]
#[command(name = "winddown", version, about = "Winddown break timer CLI")]
struct Cli {
    /// Config file (default: ~/.config/winddown/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live break timer in this terminal
    Run,
    /// Replay a coding session on a simulated clock
    Simulate(commands::simulate::SimulateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(config_path: &Path) {
    let fallback = std::fs::read_to_string(config_path)
        .ok()
        .and_then(|content| toml::from_str::<Config>(&content).ok())
        .map(|cfg| cfg.log_filter)
        .unwrap_or_else(|| Config::default().log_filter);

    let filter = EnvFilter::try_from_env("WINDDOWN_LOG")
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config_path = match cli.config.map_or_else(Config::path, Ok) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    init_logging(&config_path);

    let result = match cli.command {
        Commands::Run => commands::run::run(&config_path),
        Commands::Simulate(args) => commands::simulate::run(&config_path, args),
        Commands::Config { action } => commands::config::run(&config_path, action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "winddown", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
