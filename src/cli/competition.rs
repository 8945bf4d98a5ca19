//! Competition command implementation.

use std::path::PathBuf;

use super::CliError;
use skirmish::tournament::{run_competition, CompetitionConfig};

/// Execute the competition command.
///
/// # Errors
///
/// Returns an error on unknown names or an unusable maps folder.
pub(crate) fn execute(
    game_maps_folder: PathBuf,
    game_manager: String,
    algorithms: Vec<String>,
    num_threads: Option<usize>,
    progress: bool,
) -> Result<(), CliError> {
    let config = CompetitionConfig {
        game_maps_folder,
        game_manager,
        algorithms,
        num_threads,
        progress,
    };
    let report = run_competition(&config)?;

    println!("Competition finished: {} match(es) played.", report.matches_played);
    println!();
    println!("Scoreboard:");
    for (name, score) in &report.scoreboard {
        println!("  {name}: {score}");
    }
    if let Some(path) = &report.output_path {
        println!();
        println!("Results written to: {}", path.display());
    }

    Ok(())
}
