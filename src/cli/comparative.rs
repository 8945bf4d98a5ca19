//! Comparative command implementation.

use std::path::PathBuf;

use super::CliError;
use skirmish::tournament::{run_comparative, ComparativeConfig};

/// Execute the comparative command.
///
/// # Errors
///
/// Returns an error on unknown names or an unreadable map.
pub(crate) fn execute(
    game_map: PathBuf,
    game_managers_folder: PathBuf,
    algorithm1: String,
    algorithm2: String,
    game_managers: Vec<String>,
    num_threads: Option<usize>,
) -> Result<(), CliError> {
    let config = ComparativeConfig {
        game_map,
        output_folder: game_managers_folder,
        algorithm1,
        algorithm2,
        game_managers,
        num_threads,
    };
    let report = run_comparative(&config)?;

    println!(
        "Compared {} game manager run(s) in {} outcome group(s).",
        report
            .groups
            .iter()
            .map(|g| g.managers.len())
            .sum::<usize>(),
        report.groups.len()
    );
    for group in &report.groups {
        println!(
            "  [{}] {} ({} rounds)",
            group.managers.join(","),
            group.result.message(),
            group.result.rounds
        );
    }
    if let Some(path) = &report.output_path {
        println!("Results written to: {}", path.display());
    }

    Ok(())
}
