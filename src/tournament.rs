//! Tournament runner: pairs algorithms across maps and aggregates results.
//!
//! A match is a pure function of `(map, max_steps, num_shells, algorithm
//! pair)`: engines share no state, so the driver runs matches on rayon
//! workers while each engine instance stays single-threaded.
//!
//! Two sweep modes, mirroring the engine's external contract:
//! - **comparative**: one map, two algorithms, several game managers; the
//!   results file groups managers that produced identical outcomes.
//! - **competition**: a folder of maps, one manager, N algorithms paired by
//!   a per-map offset rule; the results file is a points scoreboard.

mod mapfile;
mod pairing;

pub use mapfile::{parse_map, read_map_file, InputError, MapData};
pub use pairing::pairs_for_map;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use rayon::prelude::*;

use crate::algo::{find_algorithm, AlgorithmSpec, Player, TankAlgorithm};
use crate::game::{BoardView, Engine, EngineError, MatchResult, PlayerId};

/// The engine run contract, as seen by the tournament driver.
///
/// Implementations take their dependencies (initial snapshot, limits,
/// player objects, algorithm factories) only through this call.
pub trait GameManager: Send + Sync {
    /// Run one match to completion.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the match aborts on an internal
    /// inconsistency; the driver reports it and continues.
    #[allow(clippy::too_many_arguments)]
    fn run(
        &self,
        map: &BoardView,
        max_steps: u32,
        num_shells: u32,
        player1: &mut dyn Player,
        player2: &mut dyn Player,
        algo1: &dyn Fn(PlayerId, u32) -> Box<dyn TankAlgorithm>,
        algo2: &dyn Fn(PlayerId, u32) -> Box<dyn TankAlgorithm>,
    ) -> Result<MatchResult, EngineError>;
}

/// The built-in engine behind the [`GameManager`] contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineManager;

impl GameManager for EngineManager {
    fn run(
        &self,
        map: &BoardView,
        max_steps: u32,
        num_shells: u32,
        player1: &mut dyn Player,
        player2: &mut dyn Player,
        algo1: &dyn Fn(PlayerId, u32) -> Box<dyn TankAlgorithm>,
        algo2: &dyn Fn(PlayerId, u32) -> Box<dyn TankAlgorithm>,
    ) -> Result<MatchResult, EngineError> {
        let mut engine = Engine::new(map, max_steps, num_shells, algo1, algo2)?;
        engine.run(player1, player2)
    }
}

/// A named game manager in the built-in registry.
#[derive(Clone, Copy)]
pub struct ManagerSpec {
    /// Registry name.
    pub name: &'static str,
    /// One-line description for listings.
    pub description: &'static str,
    make: fn() -> Box<dyn GameManager>,
}

impl ManagerSpec {
    /// Instantiate the manager.
    #[must_use]
    pub fn create(&self) -> Box<dyn GameManager> {
        (self.make)()
    }
}

impl fmt::Debug for ManagerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerSpec").field("name", &self.name).finish()
    }
}

/// All registered game managers.
pub const GAME_MANAGERS: &[ManagerSpec] = &[ManagerSpec {
    name: "engine",
    description: "The built-in tick engine",
    make: || Box::new(EngineManager),
}];

/// Look up a registered game manager by name.
#[must_use]
pub fn find_game_manager(name: &str) -> Option<&'static ManagerSpec> {
    GAME_MANAGERS.iter().find(|spec| spec.name == name)
}

/// Fatal tournament error.
#[derive(Debug)]
pub enum TournamentError {
    /// An algorithm name is not in the registry.
    UnknownAlgorithm(String),
    /// A game-manager name is not in the registry.
    UnknownManager(String),
    /// Competition mode needs at least two algorithms.
    TooFewAlgorithms(usize),
    /// The maps folder held no readable maps.
    NoMaps(PathBuf),
    /// A map failed to parse.
    Input(InputError),
    /// Filesystem trouble outside map parsing.
    Io(String),
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlgorithm(name) => write!(f, "unknown algorithm '{name}'"),
            Self::UnknownManager(name) => write!(f, "unknown game manager '{name}'"),
            Self::TooFewAlgorithms(n) => {
                write!(f, "competition mode needs at least 2 algorithms, got {n}")
            }
            Self::NoMaps(folder) => write!(f, "no maps found in {}", folder.display()),
            Self::Input(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TournamentError {}

impl From<InputError> for TournamentError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

/// Run one match between two registered algorithms.
///
/// # Errors
///
/// Returns [`EngineError`] when the engine aborts the match.
pub fn run_match(
    map: &MapData,
    manager: &dyn GameManager,
    algo1: &AlgorithmSpec,
    algo2: &AlgorithmSpec,
) -> Result<MatchResult, EngineError> {
    let mut player1 = algo1.create_player(1, map.num_shells);
    let mut player2 = algo2.create_player(2, map.num_shells);
    manager.run(
        &map.view(),
        map.max_steps,
        map.num_shells,
        player1.as_mut(),
        player2.as_mut(),
        &|player, tank| algo1.create(player, tank),
        &|player, tank| algo2.create(player, tank),
    )
}

/// Inputs for a comparative sweep.
#[derive(Debug, Clone)]
pub struct ComparativeConfig {
    /// The single map to play on.
    pub game_map: PathBuf,
    /// Folder that receives the results file.
    pub output_folder: PathBuf,
    /// Player 1's algorithm name.
    pub algorithm1: String,
    /// Player 2's algorithm name.
    pub algorithm2: String,
    /// Game managers to compare.
    pub game_managers: Vec<String>,
    /// Worker threads; `None` keeps rayon's default.
    pub num_threads: Option<usize>,
}

/// One manager's outcome in a comparative sweep.
#[derive(Debug, Clone)]
pub struct ComparativeOutcome {
    /// Manager name.
    pub manager: String,
    /// Its match result.
    pub result: MatchResult,
}

/// Managers that produced the identical outcome.
#[derive(Debug, Clone)]
pub struct ComparativeGroup {
    /// Manager names, sorted.
    pub managers: Vec<String>,
    /// The shared result.
    pub result: MatchResult,
}

/// Result of a comparative sweep.
#[derive(Debug, Clone)]
pub struct ComparativeReport {
    /// Outcome groups, largest first.
    pub groups: Vec<ComparativeGroup>,
    /// Where the results file landed, if it could be written.
    pub output_path: Option<PathBuf>,
    /// The formatted results file content.
    pub content: String,
}

/// Run every requested game manager on the same map and algorithm pair,
/// then group identical outcomes.
///
/// # Errors
///
/// Returns [`TournamentError`] on unresolvable names or an unreadable map.
/// Per-match engine failures are logged and the sweep continues.
pub fn run_comparative(config: &ComparativeConfig) -> Result<ComparativeReport, TournamentError> {
    let algo1 = find_algorithm(&config.algorithm1)
        .ok_or_else(|| TournamentError::UnknownAlgorithm(config.algorithm1.clone()))?;
    let algo2 = find_algorithm(&config.algorithm2)
        .ok_or_else(|| TournamentError::UnknownAlgorithm(config.algorithm2.clone()))?;
    let managers: Vec<&ManagerSpec> = config
        .game_managers
        .iter()
        .map(|name| {
            find_game_manager(name).ok_or_else(|| TournamentError::UnknownManager(name.clone()))
        })
        .collect::<Result<_, _>>()?;

    let (map, warnings) = read_map_file(&config.game_map)?;
    write_input_errors(&warnings);
    configure_threads(config.num_threads);

    let outcomes: Vec<ComparativeOutcome> = managers
        .par_iter()
        .filter_map(|spec| {
            let manager = spec.create();
            match run_match(&map, manager.as_ref(), algo1, algo2) {
                Ok(result) => Some(ComparativeOutcome {
                    manager: spec.name.to_string(),
                    result,
                }),
                Err(e) => {
                    warn!("game manager '{}' failed: {e}", spec.name);
                    None
                }
            }
        })
        .collect();

    let groups = group_outcomes(outcomes);
    let content = format_comparative(
        &config.game_map,
        &config.algorithm1,
        &config.algorithm2,
        &groups,
    );
    let filename = format!("comparative_results_{}.txt", timestamp_millis());
    let output_path = write_or_dump(&config.output_folder, &filename, &content);

    Ok(ComparativeReport {
        groups,
        output_path,
        content,
    })
}

/// Group outcomes by identical `(winner, reason, rounds, final snapshot)`.
/// Largest group first; ties broken by the first manager name.
#[must_use]
pub fn group_outcomes(outcomes: Vec<ComparativeOutcome>) -> Vec<ComparativeGroup> {
    let mut groups: Vec<ComparativeGroup> = Vec::new();
    for outcome in outcomes {
        if let Some(group) = groups.iter_mut().find(|g| g.result == outcome.result) {
            group.managers.push(outcome.manager);
        } else {
            groups.push(ComparativeGroup {
                managers: vec![outcome.manager],
                result: outcome.result,
            });
        }
    }
    for group in &mut groups {
        group.managers.sort();
    }
    groups.sort_by(|a, b| {
        b.managers
            .len()
            .cmp(&a.managers.len())
            .then_with(|| a.managers[0].cmp(&b.managers[0]))
    });
    groups
}

/// Render the comparative results file.
fn format_comparative(
    game_map: &Path,
    algorithm1: &str,
    algorithm2: &str,
    groups: &[ComparativeGroup],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("game_map={}\n", file_name(game_map)));
    out.push_str(&format!("algorithm1={algorithm1}\n"));
    out.push_str(&format!("algorithm2={algorithm2}\n"));
    out.push('\n');

    for (i, group) in groups.iter().enumerate() {
        out.push_str(&group.managers.join(","));
        out.push('\n');
        out.push_str(&group.result.message());
        out.push('\n');
        out.push_str(&group.result.rounds.to_string());
        out.push('\n');
        for line in group.result.final_view.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        if i + 1 < groups.len() {
            out.push('\n');
        }
    }
    out
}

/// Inputs for a competition sweep.
#[derive(Debug, Clone)]
pub struct CompetitionConfig {
    /// Folder of map files; also receives the results file.
    pub game_maps_folder: PathBuf,
    /// The game manager to run every match with.
    pub game_manager: String,
    /// Competing algorithm names, at least two.
    pub algorithms: Vec<String>,
    /// Worker threads; `None` keeps rayon's default.
    pub num_threads: Option<usize>,
    /// Show a progress bar.
    pub progress: bool,
}

/// Result of a competition sweep.
#[derive(Debug, Clone)]
pub struct CompetitionReport {
    /// `(algorithm, points)` sorted by points descending.
    pub scoreboard: Vec<(String, u32)>,
    /// Matches completed.
    pub matches_played: usize,
    /// Where the results file landed, if it could be written.
    pub output_path: Option<PathBuf>,
    /// The formatted results file content.
    pub content: String,
}

/// Points for winning one match.
pub const WIN_POINTS: u32 = 3;
/// Points each for a tie.
pub const TIE_POINTS: u32 = 1;

/// Pair the algorithms across every map in the folder and tally points.
///
/// # Errors
///
/// Returns [`TournamentError`] on unresolvable names, an empty maps folder,
/// or an unreadable map. Per-match engine failures are logged and skipped.
pub fn run_competition(config: &CompetitionConfig) -> Result<CompetitionReport, TournamentError> {
    if config.algorithms.len() < 2 {
        return Err(TournamentError::TooFewAlgorithms(config.algorithms.len()));
    }
    let specs: Vec<&AlgorithmSpec> = config
        .algorithms
        .iter()
        .map(|name| {
            find_algorithm(name).ok_or_else(|| TournamentError::UnknownAlgorithm(name.clone()))
        })
        .collect::<Result<_, _>>()?;
    let manager_spec = find_game_manager(&config.game_manager)
        .ok_or_else(|| TournamentError::UnknownManager(config.game_manager.clone()))?;

    let map_paths = list_map_files(&config.game_maps_folder)?;
    let mut maps = Vec::with_capacity(map_paths.len());
    let mut all_warnings = Vec::new();
    for path in &map_paths {
        let (map, mut warnings) = read_map_file(path)?;
        for warning in &mut warnings {
            *warning = format!("{}: {warning}", file_name(path));
        }
        all_warnings.append(&mut warnings);
        maps.push(map);
    }
    write_input_errors(&all_warnings);
    configure_threads(config.num_threads);

    // Flatten the per-map pairings into one match list.
    let matchups: Vec<(usize, usize, usize)> = (0..maps.len())
        .flat_map(|k| {
            pairs_for_map(specs.len(), k)
                .into_iter()
                .map(move |(i, j)| (k, i, j))
        })
        .collect();

    let bar = if config.progress {
        let bar = ProgressBar::new(matchups.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} matches")
                .expect("valid template")
                .progress_chars("=>-"),
        );
        Some(bar)
    } else {
        None
    };

    let outcomes: Vec<(usize, usize, Option<MatchResult>)> = matchups
        .par_iter()
        .map(|&(map_idx, i, j)| {
            let manager = manager_spec.create();
            let result = match run_match(&maps[map_idx], manager.as_ref(), specs[i], specs[j]) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(
                        "match {} vs {} on {} failed: {e}",
                        specs[i].name,
                        specs[j].name,
                        file_name(&map_paths[map_idx])
                    );
                    None
                }
            };
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            (i, j, result)
        })
        .collect();

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let mut points = vec![0u32; specs.len()];
    let mut matches_played = 0;
    for (i, j, result) in outcomes {
        let Some(result) = result else { continue };
        matches_played += 1;
        match result.winner {
            1 => points[i] += WIN_POINTS,
            2 => points[j] += WIN_POINTS,
            _ => {
                points[i] += TIE_POINTS;
                points[j] += TIE_POINTS;
            }
        }
        debug!(
            "{} vs {}: {} in {} rounds",
            specs[i].name,
            specs[j].name,
            result.message(),
            result.rounds
        );
    }

    let mut scoreboard: Vec<(String, u32)> = specs
        .iter()
        .zip(&points)
        .map(|(spec, score)| (spec.name.to_string(), *score))
        .collect();
    scoreboard.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut content = String::new();
    content.push_str(&format!(
        "game_maps_folder={}\n",
        config.game_maps_folder.display()
    ));
    content.push_str(&format!("game_manager={}\n\n", config.game_manager));
    for (name, score) in &scoreboard {
        content.push_str(&format!("{name} {score}\n"));
    }

    let filename = format!("competition_{}.txt", timestamp_millis());
    let output_path = write_or_dump(&config.game_maps_folder, &filename, &content);

    Ok(CompetitionReport {
        scoreboard,
        matches_played,
        output_path,
        content,
    })
}

/// Map files in the folder, sorted by file name for deterministic indexing.
fn list_map_files(folder: &Path) -> Result<Vec<PathBuf>, TournamentError> {
    let entries = fs::read_dir(folder)
        .map_err(|e| TournamentError::Io(format!("{}: {e}", folder.display())))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    if paths.is_empty() {
        return Err(TournamentError::NoMaps(folder.to_path_buf()));
    }
    Ok(paths)
}

/// Collected map warnings go to `input_errors.txt`, as the parser contract
/// requires. Failure to write is itself only a warning.
fn write_input_errors(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    let body = warnings.join("\n") + "\n";
    if let Err(e) = fs::write("input_errors.txt", body) {
        warn!("failed to write input_errors.txt: {e}");
    }
}

/// Size the global rayon pool once; later calls keep the first size.
fn configure_threads(num_threads: Option<usize>) {
    if let Some(n) = num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok();
    }
}

/// Write the results file, falling back to stdout when the folder refuses.
fn write_or_dump(folder: &Path, filename: &str, content: &str) -> Option<PathBuf> {
    let path = folder.join(filename);
    match fs::write(&path, content) {
        Ok(()) => Some(path),
        Err(e) => {
            warn!("could not create {}: {e}; printing instead", path.display());
            println!("{content}");
            None
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
