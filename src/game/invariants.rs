//! Board invariants - sanity checks that detect engine bugs.
//!
//! These should NEVER trigger in a correctly implemented engine; a violation
//! means a bug, not a game outcome. The engine runs the check at every tick
//! boundary and aborts the match with a diagnostic when one fires.

use std::collections::HashMap;

use crate::game::board::Board;
use crate::game::entities::EntityKind;
use crate::game::geometry::Point;

/// Largest legal shoot cooldown.
pub const MAX_COOLDOWN: u8 = 5;

/// Largest legal backward-phase value.
pub const MAX_BACKWARD_PHASE: u8 = 3;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all board invariants at a tick boundary.
///
/// Returns the violations found, empty when all invariants hold.
#[must_use]
pub fn check_board(board: &Board) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    // At a tick boundary every cell holds at most one solid entity. Shells
    // are exempt from cell uniqueness only where they pass over a mine;
    // resting on a wall, a tank, or another shell means a missed collision.
    let mut solid_by_cell: HashMap<Point, usize> = HashMap::new();
    let mut shells_by_cell: HashMap<Point, usize> = HashMap::new();
    for (_, entity) in board.entities() {
        if matches!(entity.kind, EntityKind::Shell(_)) {
            *shells_by_cell.entry(entity.pos).or_insert(0) += 1;
        } else {
            *solid_by_cell.entry(entity.pos).or_insert(0) += 1;
        }
    }
    for (pos, count) in &solid_by_cell {
        if *count > 1 {
            violations.push(InvariantViolation {
                message: format!("{count} entities stacked on cell ({}, {})", pos.x, pos.y),
            });
        }
    }
    for (pos, count) in &shells_by_cell {
        if *count > 1 {
            violations.push(InvariantViolation {
                message: format!("{count} shells left overlapping at ({}, {})", pos.x, pos.y),
            });
        }
        let over = board
            .entities()
            .find(|(_, e)| e.pos == *pos && !matches!(e.kind, EntityKind::Shell(_)))
            .map(|(_, e)| &e.kind);
        if matches!(over, Some(EntityKind::Wall(_) | EntityKind::Tank(_))) {
            violations.push(InvariantViolation {
                message: format!("shell resting on an occupied cell ({}, {})", pos.x, pos.y),
            });
        }
    }

    for (_, entity) in board.entities() {
        // The cell index must name a live entity standing on that cell.
        let indexed = board
            .occupant(entity.pos)
            .and_then(|other| board.get(other))
            .map(|other| other.pos);
        if indexed != Some(entity.pos) {
            violations.push(InvariantViolation {
                message: format!(
                    "cell index out of sync at ({}, {})",
                    entity.pos.x, entity.pos.y
                ),
            });
        }

        match &entity.kind {
            EntityKind::Wall(wall) => {
                if wall.hits > 1 {
                    violations.push(InvariantViolation {
                        message: format!(
                            "wall at ({}, {}) has {} hits",
                            entity.pos.x, entity.pos.y, wall.hits
                        ),
                    });
                }
            }
            EntityKind::Tank(tank) => {
                if tank.cooldown > MAX_COOLDOWN {
                    violations.push(InvariantViolation {
                        message: format!(
                            "tank {} of player {} has cooldown {}",
                            tank.tank_id, tank.player, tank.cooldown
                        ),
                    });
                }
                if tank.backward_phase > MAX_BACKWARD_PHASE {
                    violations.push(InvariantViolation {
                        message: format!(
                            "tank {} of player {} has backward phase {}",
                            tank.tank_id, tank.player, tank.backward_phase
                        ),
                    });
                }
            }
            EntityKind::Mine | EntityKind::Shell(_) => {}
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Entity, Tank, Wall};

    #[test]
    fn test_clean_board_has_no_violations() {
        let mut board = Board::new(4, 4);
        board
            .add(Entity {
                pos: Point::new(0, 0),
                kind: EntityKind::Tank(Tank::new(1, 3)),
            })
            .unwrap();
        board
            .add(Entity {
                pos: Point::new(1, 1),
                kind: EntityKind::Wall(Wall::default()),
            })
            .unwrap();
        assert!(check_board(&board).is_empty());
    }

    #[test]
    fn test_shell_over_mine_is_legal() {
        let mut board = Board::new(4, 4);
        board
            .add(Entity {
                pos: Point::new(2, 2),
                kind: EntityKind::Mine,
            })
            .unwrap();
        board.spawn_shell(
            Point::new(2, 2),
            crate::game::entities::Shell {
                dir: crate::game::geometry::Direction::R,
                player: 1,
                tank_id: 0,
                fresh: false,
            },
        );
        assert!(check_board(&board).is_empty());
    }

    #[test]
    fn test_shell_resting_on_tank_detected() {
        let mut board = Board::new(4, 4);
        board
            .add(Entity {
                pos: Point::new(1, 1),
                kind: EntityKind::Tank(Tank::new(2, 3)),
            })
            .unwrap();
        // The shell spawn path skips the conflict check, forcing an overlap
        // the collision passes should have resolved.
        board.spawn_shell(
            Point::new(1, 1),
            crate::game::entities::Shell {
                dir: crate::game::geometry::Direction::U,
                player: 1,
                tank_id: 0,
                fresh: true,
            },
        );
        let violations = check_board(&board);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("resting"));
    }

    #[test]
    fn test_out_of_range_cooldown_detected() {
        let mut board = Board::new(4, 4);
        let mut tank = Tank::new(1, 3);
        tank.cooldown = 9;
        board
            .add(Entity {
                pos: Point::new(0, 0),
                kind: EntityKind::Tank(tank),
            })
            .unwrap();
        let violations = check_board(&board);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("cooldown"));
    }
}
