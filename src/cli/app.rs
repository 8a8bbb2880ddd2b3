//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::report::BoardReport;
use super::{script, tui};
use crate::config::Config;
use crate::domain::{BoardEngine, SystemClock};

#[derive(Parser)]
#[command(name = "redboard")]
#[command(author, version, about = "Terminal kanban board for red-team operations")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, short = 'c', global = true, env = "REDBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive board (default)
    Tui,

    /// Print the initial board with lane stats
    Show,

    /// Replay a command script against a fresh board and print the result
    Run {
        /// Script file (one command per line)
        script: PathBuf,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("redboard starting");

    let config = Config::load(cli.config.as_deref())?;
    match &cli.config {
        Some(path) => output.verbose_ctx("config", &format!("Loaded {}", path.display())),
        None => output.verbose_ctx(
            "config",
            &format!(
                "Using {}",
                Config::global_config_path()
                    .filter(|p| p.exists())
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "built-in defaults".to_string())
            ),
        ),
    }

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => tui::run(&output, &config)?,

        Commands::Show => {
            let mut engine = BoardEngine::new(
                config.build_board()?,
                config.engine_settings(),
                config.heartbeat(),
                Box::new(SystemClock),
            );
            BoardReport::from_engine(&engine)?.print(&output, false);
            engine.shutdown();
        }

        Commands::Run { script } => {
            output.verbose_ctx("run", &format!("Replaying {}", script.display()));
            script::run(&output, &config, &script)?
        }
    }

    Ok(())
}
