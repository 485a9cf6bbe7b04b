//! grove binary entry point

mod cli;

use clap::{Parser, Subcommand};
use cli::context::CommandContext;
use cli::land::{run_land, LandOptions};
use cli::worktrees::run_worktrees;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Git worktree fleet manager with stacked-PR landing
#[derive(Parser)]
#[command(name = "grove", version, about)]
struct Cli {
    /// Repository path (defaults to the current directory)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Land the current stack's pull requests bottom-up
    Land {
        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,

        /// Preview every phase without mutating anything
        #[arg(long)]
        dry_run: bool,

        /// Land only the current branch and its ancestors
        #[arg(long)]
        down: bool,

        /// Machine-oriented output for shell integration
        #[arg(long)]
        script: bool,
    },
    /// List the worktree fleet
    Worktrees {
        /// Machine-oriented output
        #[arg(long)]
        script: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("grove={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> grove::Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    match args.command {
        Commands::Land {
            force,
            dry_run,
            down,
            script,
        } => {
            let ctx = CommandContext::new(&path, dry_run)?;
            run_land(
                &ctx,
                LandOptions {
                    force,
                    dry_run,
                    down,
                    script,
                },
            )
            .await
        }
        Commands::Worktrees { script } => {
            let git = grove::ports::GitCli::discover(&path)?;
            run_worktrees(&git, script)
        }
    }
}
