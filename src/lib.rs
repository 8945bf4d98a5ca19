// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Skirmish: a deterministic, turn-based tank combat simulator.
//!
//! Two players each control one or more tanks on a bounded toroidal grid
//! populated with walls, mines, and in-flight shells. Tank algorithms
//! request one action per tick; the engine resolves all requests
//! simultaneously under a strict legality and collision protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │       Tournament Runner             │
//! ├─────────────────────────────────────┤
//! │       Tank Algorithms               │
//! ├─────────────────────────────────────┤
//! │       Tick Engine (game)            │
//! └─────────────────────────────────────┘
//! ```

pub mod algo;
pub mod game;
pub mod tournament;

// Re-export key types at crate root for convenience
pub use algo::{
    find_algorithm, AlgorithmSpec, BattleInfo, Player, TankAlgorithm, TankAlgorithmFactory,
    ALGORITHMS,
};
pub use game::{
    Action, Board, BoardView, Direction, EndReason, Engine, EngineError, MatchResult, PlayerId,
    Point,
};
pub use tournament::{
    find_game_manager, run_match, EngineManager, GameManager, MapData, TournamentError,
    GAME_MANAGERS,
};
