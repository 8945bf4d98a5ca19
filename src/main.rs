//! Skirmish CLI - run tank matches and tournaments from the command line.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Skirmish - a deterministic turn-based tank combat simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (per-tick engine events)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single match between two algorithms on one map
    Run {
        /// Map file
        #[arg(required = true)]
        game_map: PathBuf,

        /// Player 1's algorithm name
        #[arg(long, default_value = "hybrid")]
        algorithm1: String,

        /// Player 2's algorithm name
        #[arg(long, default_value = "hybrid")]
        algorithm2: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run the same map and algorithm pair under several game managers and
    /// group identical outcomes
    Comparative {
        /// Map file
        #[arg(long)]
        game_map: PathBuf,

        /// Folder that receives the comparative results file
        #[arg(long)]
        game_managers_folder: PathBuf,

        /// Player 1's algorithm name
        #[arg(long)]
        algorithm1: String,

        /// Player 2's algorithm name
        #[arg(long)]
        algorithm2: String,

        /// Game manager names to compare (default: all registered)
        #[arg(long = "game-manager")]
        game_managers: Vec<String>,

        /// Worker threads (default: rayon's choice)
        #[arg(long)]
        num_threads: Option<usize>,
    },

    /// Pair algorithms across a folder of maps and tally a scoreboard
    Competition {
        /// Folder of map files; also receives the results file
        #[arg(long)]
        game_maps_folder: PathBuf,

        /// Game manager name
        #[arg(long, default_value = "engine")]
        game_manager: String,

        /// Competing algorithm names (repeat the flag; at least two)
        #[arg(long = "algorithm", required = true, num_args = 1..)]
        algorithms: Vec<String>,

        /// Worker threads (default: rayon's choice)
        #[arg(long)]
        num_threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// List registered algorithms and game managers
    List,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let result = match args.command {
        Commands::Run {
            game_map,
            algorithm1,
            algorithm2,
            format,
        } => cli::run::execute(game_map, algorithm1, algorithm2, format),

        Commands::Comparative {
            game_map,
            game_managers_folder,
            algorithm1,
            algorithm2,
            game_managers,
            num_threads,
        } => {
            let game_managers = if game_managers.is_empty() {
                skirmish::GAME_MANAGERS
                    .iter()
                    .map(|spec| spec.name.to_string())
                    .collect()
            } else {
                game_managers
            };
            cli::comparative::execute(
                game_map,
                game_managers_folder,
                algorithm1,
                algorithm2,
                game_managers,
                num_threads,
            )
        }

        Commands::Competition {
            game_maps_folder,
            game_manager,
            algorithms,
            num_threads,
            progress,
        } => cli::competition::execute(
            game_maps_folder,
            game_manager,
            algorithms,
            num_threads,
            progress,
        ),

        Commands::List => {
            println!("Algorithms:");
            for spec in skirmish::ALGORITHMS {
                println!("  {} - {}", spec.name, spec.description);
            }
            println!();
            println!("Game managers:");
            for spec in skirmish::GAME_MANAGERS {
                println!("  {} - {}", spec.name, spec.description);
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
