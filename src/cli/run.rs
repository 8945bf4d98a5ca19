//! Run command implementation: a single match on one map.

use std::fs;
use std::path::PathBuf;

use super::output::{format_text, JsonMatchResult};
use super::{CliError, OutputFormat};
use skirmish::tournament::{read_map_file, run_match, EngineManager};
use skirmish::find_algorithm;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the map is unreadable or the match fails.
pub(crate) fn execute(
    game_map: PathBuf,
    algorithm1: String,
    algorithm2: String,
    format: OutputFormat,
) -> Result<(), CliError> {
    let algo1 = find_algorithm(&algorithm1)
        .ok_or_else(|| CliError::new(format!("unknown algorithm '{algorithm1}'")))?;
    let algo2 = find_algorithm(&algorithm2)
        .ok_or_else(|| CliError::new(format!("unknown algorithm '{algorithm2}'")))?;

    let (map, warnings) = read_map_file(&game_map)?;
    if !warnings.is_empty() {
        fs::write("input_errors.txt", warnings.join("\n") + "\n")?;
        eprintln!(
            "{} map warning(s) written to input_errors.txt",
            warnings.len()
        );
    }

    let result = run_match(&map, &EngineManager, algo1, algo2)?;

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result, &algorithm1, &algorithm2));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonMatchResult::from_result(&result))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
