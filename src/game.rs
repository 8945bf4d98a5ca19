//! Game core: board, entities, and the tick engine.
//!
//! Implements the combat rules:
//! - Toroidal grid with walls, mines, shells, and tanks
//! - Simultaneous action resolution with a strict legality gate
//! - Two-cell shell flight split into unit sub-steps with collision passes
//! - End-of-game arbitration (eliminations, zero-ammo countdown, step limit)

mod action;
mod board;
mod engine;
mod entities;
mod geometry;
mod invariants;
mod view;

pub use action::Action;
pub use board::{Board, CellOccupied};
pub use engine::{EndReason, Engine, EngineError, MatchResult, AMMO_DEPLETION_GRACE};
pub use entities::{
    Entity, EntityId, EntityKind, PlayerId, Shell, Tank, Wall, BACKWARD_READY, SHOOT_COOLDOWN,
};
pub use geometry::{Direction, Point, ALL_DIRECTIONS};
pub use invariants::{check_board, InvariantViolation, MAX_BACKWARD_PHASE, MAX_COOLDOWN};
pub use view::{BoardView, CH_EMPTY, CH_MINE, CH_OUT_OF_BOUNDS, CH_SELF, CH_SHELL, CH_WALL};
