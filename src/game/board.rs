//! The board: an arena of entities plus a cell index.
//!
//! The board owns every entity for the lifetime of a match. Removal is
//! exclusive and terminal. The ownership list preserves insertion order,
//! which fixes the iteration order the engine relies on for determinism.

use std::collections::HashMap;
use std::fmt;

use crate::game::entities::{Entity, EntityId, EntityKind, PlayerId, Shell, Tank};
use crate::game::geometry::Point;

/// Error returned when an insert would stack two entities on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOccupied {
    /// The contested cell.
    pub pos: Point,
}

impl fmt::Display for CellOccupied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell ({}, {}) is already occupied", self.pos.x, self.pos.y)
    }
}

impl std::error::Error for CellOccupied {}

/// One arena slot; the generation bumps on removal so stale handles miss.
#[derive(Debug, Clone)]
struct Slot {
    gen: u32,
    entity: Option<Entity>,
}

/// The game board.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Ownership list in insertion order.
    order: Vec<EntityId>,
    /// Cell index for O(1) occupancy lookup. During a tick this can briefly
    /// be stale for cells involved in a pending collision; `rebuild_index`
    /// reconciles it at the tick boundary.
    index: HashMap<Point, EntityId>,
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Insert an entity, rejecting cell conflicts. Used while populating a
    /// board from a snapshot, where every cell holds at most one entity.
    ///
    /// # Errors
    ///
    /// Returns [`CellOccupied`] if the target cell is taken.
    pub fn add(&mut self, entity: Entity) -> Result<EntityId, CellOccupied> {
        if self.occupant(entity.pos).is_some() {
            return Err(CellOccupied { pos: entity.pos });
        }
        Ok(self.insert(entity))
    }

    /// Insert a freshly fired shell. Shells may transiently share a cell
    /// (they annihilate in the next collision pass), so no conflict check.
    pub fn spawn_shell(&mut self, pos: Point, shell: Shell) -> EntityId {
        self.insert(Entity {
            pos,
            kind: EntityKind::Shell(shell),
        })
    }

    fn insert(&mut self, entity: Entity) -> EntityId {
        let pos = entity.pos;
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entity = Some(entity);
            EntityId {
                index,
                gen: slot.gen,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                gen: 0,
                entity: Some(entity),
            });
            EntityId { index, gen: 0 }
        };
        self.order.push(id);
        self.index.insert(pos, id);
        id
    }

    /// Resolve a handle to its entity, if still alive.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.gen != id.gen {
            return None;
        }
        slot.entity.as_ref()
    }

    /// Mutable variant of [`Board::get`].
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.gen != id.gen {
            return None;
        }
        slot.entity.as_mut()
    }

    /// Whether the handle still resolves to a live entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// The indexed occupant of a cell, if any.
    #[must_use]
    pub fn occupant(&self, pos: Point) -> Option<EntityId> {
        self.index.get(&pos).copied().filter(|id| self.contains(*id))
    }

    /// The wall at a cell, if any. Walls never move or share cells, so the
    /// index answer is authoritative at any point in the tick.
    #[must_use]
    pub fn wall_at(&self, pos: Point) -> Option<EntityId> {
        let id = self.occupant(pos)?;
        matches!(self.get(id)?.kind, EntityKind::Wall(_)).then_some(id)
    }

    /// The tank standing on a cell, if any. Scans the ownership list rather
    /// than the index, so a tank shadowed by a transient overlap is still
    /// found.
    #[must_use]
    pub fn tank_at(&self, pos: Point) -> Option<EntityId> {
        self.entities()
            .find(|(_, e)| matches!(e.kind, EntityKind::Tank(_)) && e.pos == pos)
            .map(|(id, _)| id)
    }

    /// Move a live entity to a new cell, updating the index.
    pub fn move_entity(&mut self, id: EntityId, to: Point) {
        let Some(entity) = self.get_mut(id) else {
            return;
        };
        let from = entity.pos;
        entity.pos = to;
        if self.index.get(&from) == Some(&id) {
            self.index.remove(&from);
        }
        self.index.insert(to, id);
    }

    /// Remove an entity, dropping it from the ownership list and the cell
    /// index. Returns the removed entity.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.gen != id.gen {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.gen += 1;
        self.free.push(id.index);
        self.order.retain(|other| *other != id);
        if self.index.get(&entity.pos) == Some(&id) {
            self.index.remove(&entity.pos);
        }
        Some(entity)
    }

    /// Rebuild the cell index from the ownership list. Called at the tick
    /// boundary after multi-remove sequences.
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for id in &self.order {
            if let Some(slot) = self.slots.get(id.index as usize) {
                if slot.gen == id.gen {
                    if let Some(entity) = &slot.entity {
                        self.index.insert(entity.pos, *id);
                    }
                }
            }
        }
    }

    /// All live entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.order
            .iter()
            .filter_map(move |id| self.get(*id).map(|e| (*id, e)))
    }

    /// All live shells in insertion order.
    pub fn shells(&self) -> impl Iterator<Item = (EntityId, &Shell)> {
        self.entities().filter_map(|(id, e)| match &e.kind {
            EntityKind::Shell(s) => Some((id, s)),
            _ => None,
        })
    }

    /// All live walls in insertion order.
    pub fn walls(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities().filter_map(|(id, e)| match &e.kind {
            EntityKind::Wall(_) => Some(id),
            _ => None,
        })
    }

    /// All live mines in insertion order.
    pub fn mines(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities().filter_map(|(id, e)| match &e.kind {
            EntityKind::Mine => Some(id),
            _ => None,
        })
    }

    /// All live tanks in insertion order.
    pub fn tanks(&self) -> impl Iterator<Item = (EntityId, &Tank)> {
        self.entities().filter_map(|(id, e)| match &e.kind {
            EntityKind::Tank(t) => Some((id, t)),
            _ => None,
        })
    }

    /// Live tanks belonging to one player.
    pub fn player_tanks(&self, player: PlayerId) -> impl Iterator<Item = (EntityId, &Tank)> {
        self.tanks().filter(move |(_, t)| t.player == player)
    }

    /// Count of live tanks for a player.
    #[must_use]
    pub fn count_player_tanks(&self, player: PlayerId) -> usize {
        self.player_tanks(player).count()
    }
}
