//! The per-tick scheduler: gather, gate, execute, advance shells, arbitrate.
//!
//! One tick is indivisible. The engine asks each live tank's algorithm for
//! an action, checks it against the legality rules, executes approved
//! actions in ascending `(player, tank_id)` order, advances shells in two
//! unit sub-steps with a collision pass around each, and finally runs the
//! end-of-game arbiter. Everything is synchronous and deterministic; log
//! output is advisory and never alters outcomes.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::debug;

use crate::algo::{Player, TankAlgorithm};
use crate::game::action::Action;
use crate::game::board::{Board, CellOccupied};
use crate::game::entities::{Entity, EntityId, EntityKind, PlayerId, Shell, Tank};
use crate::game::geometry::Point;
use crate::game::invariants::check_board;
use crate::game::view::BoardView;

/// Ticks both sides may play on after every tank runs out of ammo.
pub const AMMO_DEPLETION_GRACE: u32 = 40;

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// At least one side lost its last tank.
    AllTanksDead,
    /// The tick count reached the map's step limit.
    MaxSteps,
    /// The zero-ammo countdown expired.
    ZeroShells,
}

impl EndReason {
    /// Canonical name used in result files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EndReason::AllTanksDead => "ALL_TANKS_DEAD",
            EndReason::MaxSteps => "MAX_STEPS",
            EndReason::ZeroShells => "ZERO_SHELLS",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Winning player: 0 for a tie, otherwise 1 or 2.
    pub winner: u8,
    /// Why the match ended.
    pub reason: EndReason,
    /// Live tank counts at the end, player 1 first.
    pub remaining_tanks: [usize; 2],
    /// Snapshot of the final board.
    pub final_view: BoardView,
    /// Ticks played.
    pub rounds: u32,
}

impl MatchResult {
    /// One-line message in the result-file format.
    #[must_use]
    pub fn message(&self) -> String {
        if self.winner == 0 {
            format!("Tie: {}", self.reason)
        } else {
            format!("Player {} won: {}", self.winner, self.reason)
        }
    }
}

/// Fatal engine error. A match that raises one terminates with a diagnostic
/// and must not corrupt tournament results.
#[derive(Debug, Clone)]
pub enum EngineError {
    /// The initial snapshot stacked two entities on one cell.
    Setup(CellOccupied),
    /// A runtime invariant was violated mid-match.
    Invariant(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Setup(e) => write!(f, "invalid initial board: {e}"),
            EngineError::Invariant(msg) => write!(f, "runtime invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<CellOccupied> for EngineError {
    fn from(e: CellOccupied) -> Self {
        EngineError::Setup(e)
    }
}

/// One tank's seat: its board handle, identity, and decision routine.
struct TankSlot {
    id: EntityId,
    player: PlayerId,
    tank_id: u32,
    algorithm: Box<dyn TankAlgorithm>,
    alive: bool,
}

/// The match engine.
pub struct Engine {
    board: Board,
    roster: Vec<TankSlot>,
    max_steps: u32,
    tick: u32,
    ammo_countdown: Option<u32>,
}

impl Engine {
    /// Build an engine from an initial snapshot.
    ///
    /// Tanks are numbered by sorting all of them by `(x, y)` ascending and
    /// counting per player from 0; each gets an algorithm from its player's
    /// factory, keyed by `(player, tank_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Setup`] when the snapshot stacks entities.
    pub fn new(
        map: &BoardView,
        max_steps: u32,
        num_shells: u32,
        algo1: &dyn Fn(PlayerId, u32) -> Box<dyn TankAlgorithm>,
        algo2: &dyn Fn(PlayerId, u32) -> Box<dyn TankAlgorithm>,
    ) -> Result<Self, EngineError> {
        let mut board = Board::new(map.rows(), map.cols());
        let mut tank_cells: Vec<(Point, PlayerId)> = Vec::new();

        for x in 0..map.rows() {
            for y in 0..map.cols() {
                let pos = Point::new(x as i32, y as i32);
                match map.cell(x, y) {
                    '#' => {
                        board.add(Entity {
                            pos,
                            kind: EntityKind::Wall(crate::game::entities::Wall::default()),
                        })?;
                    }
                    '@' => {
                        board.add(Entity {
                            pos,
                            kind: EntityKind::Mine,
                        })?;
                    }
                    '1' => tank_cells.push((pos, 1)),
                    '2' => tank_cells.push((pos, 2)),
                    _ => {}
                }
            }
        }

        tank_cells.sort_by_key(|(pos, _)| (pos.x, pos.y));

        let mut roster = Vec::with_capacity(tank_cells.len());
        let mut next_id: [u32; 2] = [0, 0];
        for (pos, player) in tank_cells {
            let tank_id = next_id[usize::from(player) - 1];
            next_id[usize::from(player) - 1] += 1;

            let mut tank = Tank::new(player, num_shells);
            tank.tank_id = tank_id;
            let id = board.add(Entity {
                pos,
                kind: EntityKind::Tank(tank),
            })?;

            let factory = if player == 1 { algo1 } else { algo2 };
            roster.push(TankSlot {
                id,
                player,
                tank_id,
                algorithm: factory(player, tank_id),
                alive: true,
            });
        }

        roster.sort_by_key(|slot| (slot.player, slot.tank_id));

        Ok(Self {
            board,
            roster,
            max_steps,
            tick: 0,
            ammo_countdown: None,
        })
    }

    /// The current board, for snapshots and inspection.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Ticks played so far.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Tank payload for `(player, tank_id)`, if that tank is still alive.
    #[must_use]
    pub fn tank(&self, player: PlayerId, tank_id: u32) -> Option<&Tank> {
        let slot = self
            .roster
            .iter()
            .find(|s| s.player == player && s.tank_id == tank_id)?;
        self.board.get(slot.id)?.as_tank()
    }

    /// Position of tank `(player, tank_id)`, if it is still alive.
    #[must_use]
    pub fn tank_position(&self, player: PlayerId, tank_id: u32) -> Option<Point> {
        let slot = self
            .roster
            .iter()
            .find(|s| s.player == player && s.tank_id == tank_id)?;
        self.board.get(slot.id).map(|e| e.pos)
    }

    /// Run the match to completion.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Invariant`] if the board state goes
    /// inconsistent, which indicates a bug rather than a game outcome.
    pub fn run(
        &mut self,
        player1: &mut dyn Player,
        player2: &mut dyn Player,
    ) -> Result<MatchResult, EngineError> {
        // A map that starts one side empty is decided before any tick runs.
        if let Some(result) = self.immediate_result() {
            return Ok(result);
        }

        loop {
            if let Some(result) = self.step(player1, player2)? {
                return Ok(result);
            }
        }
    }

    /// Execute one full tick. Returns the result when the match ends.
    ///
    /// [`Engine::run`] drives this to completion; tests step tick by tick.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Invariant`] when the board goes inconsistent.
    pub fn step(
        &mut self,
        player1: &mut dyn Player,
        player2: &mut dyn Player,
    ) -> Result<Option<MatchResult>, EngineError> {
        self.tick += 1;
        let requests = self.gather();
        let decisions: Vec<(usize, Action, bool)> = requests
            .into_iter()
            .map(|(idx, action)| {
                let legal = self.is_action_legal(idx, action);
                (idx, action, legal)
            })
            .collect();

        let shot = self.execute(&decisions, player1, player2);

        self.resolve_collisions();
        self.advance_shells_substep();
        self.advance_shells_substep();
        self.clear_fresh_flags();
        self.tick_cooldowns(&shot);

        self.board.rebuild_index();
        let violations = check_board(&self.board);
        if let Some(v) = violations.first() {
            return Err(EngineError::Invariant(v.to_string()));
        }

        Ok(self.arbitrate())
    }

    /// Ask each live tank's algorithm for its action this tick. Dead tanks
    /// are skipped entirely, not recorded as illegal.
    fn gather(&mut self) -> Vec<(usize, Action)> {
        let mut requests = Vec::with_capacity(self.roster.len());
        for idx in 0..self.roster.len() {
            if !self.roster[idx].alive || !self.board.contains(self.roster[idx].id) {
                continue;
            }
            let action = self.roster[idx].algorithm.get_action();
            requests.push((idx, action));
        }
        requests
    }

    /// The legality gate. Pure: all side effects (backward cancellation)
    /// happen during execution.
    fn is_action_legal(&self, idx: usize, action: Action) -> bool {
        let slot = &self.roster[idx];
        let Some(tank) = self.board.get(slot.id).and_then(Entity::as_tank) else {
            return false;
        };
        let pos = self.board.get(slot.id).map(|e| e.pos).unwrap_or_default();

        // Warm-up phases lock the tank to the backward move or one of the
        // two actions that cancel it.
        if tank.backward_pending() {
            return matches!(
                action,
                Action::MoveBackward | Action::MoveForward | Action::GetBattleInfo
            );
        }

        match action {
            Action::MoveForward => {
                let ahead = pos.step(tank.dir, 1, self.board.rows(), self.board.cols());
                self.board.wall_at(ahead).is_none()
            }
            Action::MoveBackward => {
                if tank.backward_phase == crate::game::entities::BACKWARD_READY {
                    let behind = pos.step(tank.dir, -1, self.board.rows(), self.board.cols());
                    self.board.wall_at(behind).is_none()
                } else {
                    true
                }
            }
            Action::Shoot => tank.can_shoot(),
            _ => true,
        }
    }

    /// Execute the gated requests in roster order. Returns, per roster
    /// index, whether that tank shot this tick (its cooldown was just set
    /// and must not decrement tonight).
    fn execute(
        &mut self,
        decisions: &[(usize, Action, bool)],
        player1: &mut dyn Player,
        player2: &mut dyn Player,
    ) -> Vec<bool> {
        let mut shot = vec![false; self.roster.len()];
        let (rows, cols) = (self.board.rows(), self.board.cols());

        for &(idx, action, legal) in decisions {
            let slot_id = self.roster[idx].id;
            if !self.roster[idx].alive || !self.board.contains(slot_id) {
                continue;
            }
            let (player, tank_id) = (self.roster[idx].player, self.roster[idx].tank_id);
            if !legal {
                debug!(
                    "tick {}: tank {tank_id} of player {player} tried {action}, ignored",
                    self.tick
                );
                continue;
            }

            match action {
                Action::MoveForward => {
                    let tank = self.tank_payload_mut(slot_id);
                    if tank.backward_phase > 0 {
                        // The forward request spends the tick cancelling the
                        // pending reverse.
                        tank.cancel_backward();
                        debug!(
                            "tick {}: tank {tank_id} of player {player} cancelled backward move",
                            self.tick
                        );
                    } else {
                        let dir = tank.dir;
                        let from = self.board.get(slot_id).map(|e| e.pos).unwrap_or_default();
                        let to = from.step(dir, 1, rows, cols);
                        self.board.move_entity(slot_id, to);
                        debug!(
                            "tick {}: tank {tank_id} of player {player} moved forward to ({}, {})",
                            self.tick, to.x, to.y
                        );
                    }
                }
                Action::MoveBackward => {
                    let phase = self.tank_payload_mut(slot_id).backward_phase;
                    if phase == crate::game::entities::BACKWARD_READY {
                        let dir = self.tank_payload_mut(slot_id).dir;
                        let from = self.board.get(slot_id).map(|e| e.pos).unwrap_or_default();
                        let to = from.step(dir, -1, rows, cols);
                        self.board.move_entity(slot_id, to);
                        self.tank_payload_mut(slot_id).backward_phase = 0;
                        debug!(
                            "tick {}: tank {tank_id} of player {player} moved backward to ({}, {})",
                            self.tick, to.x, to.y
                        );
                    } else {
                        self.tank_payload_mut(slot_id).backward_phase = phase + 1;
                        debug!(
                            "tick {}: tank {tank_id} of player {player} backward warm-up {}",
                            self.tick,
                            phase + 1
                        );
                    }
                }
                Action::RotateLeft45
                | Action::RotateLeft90
                | Action::RotateRight45
                | Action::RotateRight90 => {
                    let k = action.rotation();
                    let tank = self.tank_payload_mut(slot_id);
                    if k < 0 {
                        tank.rotate_left(-k);
                    } else {
                        tank.rotate_right(k);
                    }
                }
                Action::Shoot => {
                    self.execute_shoot(slot_id, player, tank_id);
                    shot[idx] = true;
                }
                Action::GetBattleInfo => {
                    // Cancelling a pending reverse is a side effect; the
                    // snapshot is delivered either way.
                    let tank = self.tank_payload_mut(slot_id);
                    if tank.backward_pending() {
                        tank.cancel_backward();
                    }
                    let view = BoardView::from_board(&self.board, Some(slot_id));
                    let slot = &mut self.roster[idx];
                    let player_obj: &mut dyn Player =
                        if player == 1 { player1 } else { player2 };
                    player_obj.update_tank_with_battle_info(slot.algorithm.as_mut(), &view);
                    debug!(
                        "tick {}: tank {tank_id} of player {player} requested battle info",
                        self.tick
                    );
                }
                Action::DoNothing => {}
            }
        }

        shot
    }

    /// Fire a shell from the cell ahead of the cannon. Spawning into a wall
    /// is the first impact; spawning into a tank is an immediate hit. In
    /// both cases the shell never reaches the board.
    fn execute_shoot(&mut self, slot_id: EntityId, player: PlayerId, tank_id: u32) {
        let (rows, cols) = (self.board.rows(), self.board.cols());
        let dir = self.tank_payload_mut(slot_id).dir;
        let from = self.board.get(slot_id).map(|e| e.pos).unwrap_or_default();
        self.tank_payload_mut(slot_id).note_shot();

        let spawn = from.step(dir, 1, rows, cols);
        if let Some(wall_id) = self.board.wall_at(spawn) {
            debug!(
                "tick {}: shell from tank {tank_id} of player {player} spawned into a wall at ({}, {})",
                self.tick, spawn.x, spawn.y
            );
            self.hit_wall(wall_id);
            return;
        }
        if let Some(victim) = self.board.tank_at(spawn) {
            debug!(
                "tick {}: shell from tank {tank_id} of player {player} hit a tank point-blank at ({}, {})",
                self.tick, spawn.x, spawn.y
            );
            self.destroy(victim);
            return;
        }

        self.board.spawn_shell(
            spawn,
            Shell {
                dir,
                player,
                tank_id,
                fresh: true,
            },
        );
    }

    /// Resolve all collisions at current positions: shells with walls,
    /// shells with tanks, shells with shells, tanks with mines, tanks with
    /// tanks. The destruction set is unioned before anything is removed, so
    /// the class order affects only the log.
    fn resolve_collisions(&mut self) {
        let mut destroy: BTreeSet<EntityId> = BTreeSet::new();
        let mut wall_hits: Vec<EntityId> = Vec::new();

        let shells: Vec<(EntityId, Point)> = self
            .board
            .shells()
            .map(|(id, _)| (id, self.board.get(id).map(|e| e.pos).unwrap_or_default()))
            .collect();
        let tanks: Vec<(EntityId, Point)> = self
            .board
            .tanks()
            .map(|(id, _)| (id, self.board.get(id).map(|e| e.pos).unwrap_or_default()))
            .collect();

        for &(sid, pos) in &shells {
            if let Some(wid) = self.board.wall_at(pos) {
                wall_hits.push(wid);
                destroy.insert(sid);
            }
        }
        for &(sid, spos) in &shells {
            for &(tid, tpos) in &tanks {
                if spos == tpos {
                    debug!("tick {}: shell hit a tank at ({}, {})", self.tick, spos.x, spos.y);
                    destroy.insert(sid);
                    destroy.insert(tid);
                }
            }
        }
        let mut shells_by_cell: HashMap<Point, Vec<EntityId>> = HashMap::new();
        for &(sid, pos) in &shells {
            shells_by_cell.entry(pos).or_default().push(sid);
        }
        for (pos, group) in &shells_by_cell {
            if group.len() > 1 {
                debug!("tick {}: shells collided at ({}, {})", self.tick, pos.x, pos.y);
                destroy.extend(group.iter().copied());
            }
        }
        for mid in self.board.mines().collect::<Vec<_>>() {
            let mpos = self.board.get(mid).map(|e| e.pos).unwrap_or_default();
            for &(tid, tpos) in &tanks {
                if mpos == tpos {
                    debug!(
                        "tick {}: tank stepped on a mine at ({}, {})",
                        self.tick, mpos.x, mpos.y
                    );
                    destroy.insert(mid);
                    destroy.insert(tid);
                }
            }
        }
        let mut tanks_by_cell: HashMap<Point, Vec<EntityId>> = HashMap::new();
        for &(tid, pos) in &tanks {
            tanks_by_cell.entry(pos).or_default().push(tid);
        }
        for (pos, group) in &tanks_by_cell {
            if group.len() > 1 {
                debug!("tick {}: tanks collided at ({}, {})", self.tick, pos.x, pos.y);
                destroy.extend(group.iter().copied());
            }
        }

        for wid in wall_hits {
            self.hit_wall(wid);
        }
        for id in destroy {
            self.destroy(id);
        }
    }

    /// Advance every non-fresh shell one cell, resolving collisions on the
    /// candidate cells before any position changes. Crossing shells (each
    /// arriving where the other started) annihilate as if they met in the
    /// shared cell.
    fn advance_shells_substep(&mut self) {
        let (rows, cols) = (self.board.rows(), self.board.cols());

        let mut moving: Vec<(EntityId, Point, Point)> = Vec::new();
        let mut dwelling: Vec<(EntityId, Point)> = Vec::new();
        for (id, shell) in self.board.shells() {
            let pos = self.board.get(id).map(|e| e.pos).unwrap_or_default();
            if shell.fresh {
                dwelling.push((id, pos));
            } else {
                moving.push((id, pos, pos.step(shell.dir, 1, rows, cols)));
            }
        }

        let mut destroy: BTreeSet<EntityId> = BTreeSet::new();
        let mut wall_hits: Vec<EntityId> = Vec::new();

        for &(id, _, to) in &moving {
            if let Some(wid) = self.board.wall_at(to) {
                debug!("tick {}: shell hit a wall at ({}, {})", self.tick, to.x, to.y);
                wall_hits.push(wid);
                destroy.insert(id);
                continue;
            }
            if let Some(tid) = self.board.tank_at(to) {
                debug!("tick {}: shell hit a tank at ({}, {})", self.tick, to.x, to.y);
                destroy.insert(id);
                destroy.insert(tid);
            }
        }

        let mut by_dest: HashMap<Point, Vec<EntityId>> = HashMap::new();
        for &(id, _, to) in &moving {
            by_dest.entry(to).or_default().push(id);
        }
        for (pos, group) in &by_dest {
            if group.len() > 1 {
                debug!("tick {}: shells met at ({}, {})", self.tick, pos.x, pos.y);
                destroy.extend(group.iter().copied());
            }
        }

        for &(id, _, to) in &moving {
            for &(did, dpos) in &dwelling {
                if to == dpos {
                    debug!("tick {}: shell ran into a dwelling shell at ({}, {})", self.tick, to.x, to.y);
                    destroy.insert(id);
                    destroy.insert(did);
                }
            }
        }

        for i in 0..moving.len() {
            for j in (i + 1)..moving.len() {
                let (a, a_from, a_to) = moving[i];
                let (b, b_from, b_to) = moving[j];
                if a_to == b_from && b_to == a_from {
                    debug!(
                        "tick {}: shells crossed between ({}, {}) and ({}, {})",
                        self.tick, a_from.x, a_from.y, b_from.x, b_from.y
                    );
                    destroy.insert(a);
                    destroy.insert(b);
                }
            }
        }

        for wid in wall_hits {
            self.hit_wall(wid);
        }
        for id in &destroy {
            self.destroy(*id);
        }
        for (id, _, to) in moving {
            if !destroy.contains(&id) && self.board.contains(id) {
                self.board.move_entity(id, to);
            }
        }
    }

    /// First hit marks the wall, second removes it.
    fn hit_wall(&mut self, wall_id: EntityId) {
        let damaged = match self.board.get(wall_id).map(|e| &e.kind) {
            Some(EntityKind::Wall(wall)) => wall.is_damaged(),
            _ => return,
        };
        if damaged {
            debug!("tick {}: wall destroyed", self.tick);
            self.board.remove(wall_id);
        } else if let Some(entity) = self.board.get_mut(wall_id) {
            if let EntityKind::Wall(wall) = &mut entity.kind {
                wall.hits = 1;
            }
        }
    }

    /// Remove an entity and, if it was a tank, mark its seat dead.
    fn destroy(&mut self, id: EntityId) {
        if let Some(entity) = self.board.remove(id) {
            if let EntityKind::Tank(tank) = entity.kind {
                debug!(
                    "tick {}: tank {} of player {} destroyed",
                    self.tick, tank.tank_id, tank.player
                );
                for slot in &mut self.roster {
                    if slot.id == id {
                        slot.alive = false;
                    }
                }
            }
        }
    }

    /// Drop fresh flags at the end of the spawn tick.
    fn clear_fresh_flags(&mut self) {
        let ids: Vec<EntityId> = self
            .board
            .shells()
            .filter(|(_, s)| s.fresh)
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            if let Some(entity) = self.board.get_mut(id) {
                if let EntityKind::Shell(shell) = &mut entity.kind {
                    shell.fresh = false;
                }
            }
        }
    }

    /// End-of-tick cooldown pass for every live tank that did not shoot.
    fn tick_cooldowns(&mut self, shot: &[bool]) {
        for idx in 0..self.roster.len() {
            if shot[idx] {
                continue;
            }
            let slot_id = self.roster[idx].id;
            if !self.roster[idx].alive || !self.board.contains(slot_id) {
                continue;
            }
            self.tank_payload_mut(slot_id).tick_cooldown();
        }
    }

    /// End-of-tick arbitration, in rule order: eliminations first, then the
    /// zero-ammo countdown, then the step limit.
    fn arbitrate(&mut self) -> Option<MatchResult> {
        let p1 = self.board.count_player_tanks(1);
        let p2 = self.board.count_player_tanks(2);

        if p1 == 0 || p2 == 0 {
            let winner = match (p1, p2) {
                (0, 0) => 0,
                (0, _) => 2,
                _ => 1,
            };
            return Some(self.build_result(winner, EndReason::AllTanksDead));
        }

        // Armed once when every live tank is dry; decremented on the ticks
        // after; never disarmed.
        if self.ammo_countdown.is_none() && self.all_out_of_ammo() {
            debug!(
                "tick {}: all tanks out of ammo, {AMMO_DEPLETION_GRACE}-tick countdown armed",
                self.tick
            );
            self.ammo_countdown = Some(AMMO_DEPLETION_GRACE);
        } else if let Some(remaining) = self.ammo_countdown {
            let remaining = remaining.saturating_sub(1);
            self.ammo_countdown = Some(remaining);
            if remaining == 0 {
                return Some(self.build_result(0, EndReason::ZeroShells));
            }
        }

        if self.tick >= self.max_steps {
            return Some(self.build_result(0, EndReason::MaxSteps));
        }

        None
    }

    fn all_out_of_ammo(&self) -> bool {
        self.board.tanks().all(|(_, tank)| tank.ammo == 0)
    }

    /// Result for a map that starts with an empty side; no ticks are played.
    fn immediate_result(&self) -> Option<MatchResult> {
        let p1 = self.board.count_player_tanks(1);
        let p2 = self.board.count_player_tanks(2);
        let winner = match (p1, p2) {
            (0, 0) => 0,
            (0, _) => 2,
            (_, 0) => 1,
            _ => return None,
        };
        Some(MatchResult {
            winner,
            reason: EndReason::AllTanksDead,
            remaining_tanks: [p1, p2],
            final_view: BoardView::from_board(&self.board, None),
            rounds: 0,
        })
    }

    fn build_result(&self, winner: u8, reason: EndReason) -> MatchResult {
        MatchResult {
            winner,
            reason,
            remaining_tanks: [
                self.board.count_player_tanks(1),
                self.board.count_player_tanks(2),
            ],
            final_view: BoardView::from_board(&self.board, None),
            rounds: self.tick,
        }
    }

    /// Mutable tank payload for a handle known to be a live tank.
    fn tank_payload_mut(&mut self, id: EntityId) -> &mut Tank {
        match &mut self
            .board
            .get_mut(id)
            .expect("tank handle went stale mid-action")
            .kind
        {
            EntityKind::Tank(tank) => tank,
            _ => unreachable!("handle does not name a tank"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{NullPlayer, ScriptedAlgorithm};
    use crate::game::view::BoardView;

    /// Build an engine from grid rows, driving each player's tanks with a
    /// per-player action script.
    fn scripted_engine(
        rows: &[&str],
        max_steps: u32,
        num_shells: u32,
        script1: Vec<Action>,
        script2: Vec<Action>,
    ) -> Engine {
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
        let view = BoardView::from_grid(&grid);
        Engine::new(
            &view,
            max_steps,
            num_shells,
            &move |_, _| -> Box<dyn TankAlgorithm> {
                Box::new(ScriptedAlgorithm::new(script1.clone()))
            },
            &move |_, _| -> Box<dyn TankAlgorithm> {
                Box::new(ScriptedAlgorithm::new(script2.clone()))
            },
        )
        .unwrap()
    }

    fn run(engine: &mut Engine) -> MatchResult {
        let mut p1 = NullPlayer;
        let mut p2 = NullPlayer;
        engine.run(&mut p1, &mut p2).unwrap()
    }

    #[test]
    fn test_tank_ids_assigned_by_position() {
        let engine = scripted_engine(
            &["2 1   ", "      ", " 1  2 "],
            10,
            3,
            vec![],
            vec![],
        );
        // Global (x, y) order: (0,0)=2, (0,2)=1, (2,1)=1, (2,4)=2.
        assert_eq!(engine.tank_position(2, 0), Some(Point::new(0, 0)));
        assert_eq!(engine.tank_position(1, 0), Some(Point::new(0, 2)));
        assert_eq!(engine.tank_position(1, 1), Some(Point::new(2, 1)));
        assert_eq!(engine.tank_position(2, 1), Some(Point::new(2, 4)));
    }

    #[test]
    fn test_empty_player_is_immediate_loss() {
        let mut engine = scripted_engine(&["1    ", "     "], 10, 3, vec![], vec![]);
        let result = run(&mut engine);
        assert_eq!(result.winner, 1);
        assert_eq!(result.reason, EndReason::AllTanksDead);
        assert_eq!(result.rounds, 0);
        assert_eq!(result.remaining_tanks, [1, 0]);
    }

    #[test]
    fn test_max_steps_tie() {
        let mut engine = scripted_engine(
            &["1   2"],
            4,
            3,
            vec![Action::DoNothing; 8],
            vec![Action::DoNothing; 8],
        );
        let result = run(&mut engine);
        assert_eq!(result.winner, 0);
        assert_eq!(result.reason, EndReason::MaxSteps);
        assert_eq!(result.rounds, 4);
        assert_eq!(result.remaining_tanks, [1, 1]);
    }

    #[test]
    fn test_forward_wraps_around_torus() {
        // Player 1 faces L; forward from column 0 wraps to the last column.
        let mut engine = scripted_engine(
            &["1    ", "    2"],
            1,
            3,
            vec![Action::MoveForward],
            vec![Action::DoNothing],
        );
        let result = run(&mut engine);
        assert_eq!(engine.tank_position(1, 0), Some(Point::new(0, 4)));
        assert_eq!(result.reason, EndReason::MaxSteps);
    }

    #[test]
    fn test_forward_into_wall_is_ignored() {
        let mut engine = scripted_engine(
            &["#1  2"],
            1,
            3,
            vec![Action::MoveForward],
            vec![Action::DoNothing],
        );
        run(&mut engine);
        assert_eq!(engine.tank_position(1, 0), Some(Point::new(0, 1)));
    }

    #[test]
    fn test_backward_state_machine_full_cycle() {
        // Phases 1, 2, 3 with no movement, then the actual move on tick 4.
        let mut engine = scripted_engine(
            &["  1  ", "    2"],
            4,
            3,
            vec![Action::MoveBackward; 4],
            vec![Action::DoNothing; 4],
        );
        let mut p1 = NullPlayer;
        let mut p2 = NullPlayer;
        for expected_phase in [1, 2, 3] {
            engine.step(&mut p1, &mut p2).unwrap();
            assert_eq!(engine.tank(1, 0).unwrap().backward_phase, expected_phase);
            assert_eq!(engine.tank_position(1, 0), Some(Point::new(0, 2)));
        }
        engine.step(&mut p1, &mut p2).unwrap();
        // Facing L, backward is +y.
        assert_eq!(engine.tank_position(1, 0), Some(Point::new(0, 3)));
        assert_eq!(engine.tank(1, 0).unwrap().backward_phase, 0);
    }

    #[test]
    fn test_forward_cancels_pending_backward_without_moving() {
        let mut engine = scripted_engine(
            &["  1  ", "    2"],
            2,
            3,
            vec![Action::MoveBackward, Action::MoveForward],
            vec![Action::DoNothing; 2],
        );
        let result = run(&mut engine);
        assert_eq!(engine.tank_position(1, 0), Some(Point::new(0, 2)));
        assert_eq!(engine.tank(1, 0).unwrap().backward_phase, 0);
        assert_eq!(result.reason, EndReason::MaxSteps);
    }

    #[test]
    fn test_rotation_during_warmup_is_ignored() {
        let mut engine = scripted_engine(
            &["  1  ", "    2"],
            2,
            3,
            vec![Action::MoveBackward, Action::RotateLeft45],
            vec![Action::DoNothing; 2],
        );
        run(&mut engine);
        // The rotation was swallowed; the warm-up phase is unchanged.
        assert_eq!(engine.tank(1, 0).unwrap().dir, crate::game::geometry::Direction::L);
        assert_eq!(engine.tank(1, 0).unwrap().backward_phase, 1);
    }

    #[test]
    fn test_shoot_spends_ammo_and_sets_cooldown() {
        let mut engine = scripted_engine(
            &["1    ", "    2"],
            1,
            3,
            vec![Action::Shoot],
            vec![Action::DoNothing],
        );
        run(&mut engine);
        let tank = engine.tank(1, 0).unwrap();
        assert_eq!(tank.ammo, 2);
        assert_eq!(tank.cooldown, crate::game::entities::SHOOT_COOLDOWN);
    }

    #[test]
    fn test_second_shot_blocked_until_cooldown_clears() {
        // The wall behind the muzzle soaks the shells so only the cooldown
        // schedule is observable: shots land on ticks 1 and 7.
        let mut engine = scripted_engine(
            &["#1   ", "    2"],
            7,
            5,
            vec![Action::Shoot; 7],
            vec![Action::DoNothing; 7],
        );
        let mut p1 = NullPlayer;
        let mut p2 = NullPlayer;
        for _ in 0..6 {
            engine.step(&mut p1, &mut p2).unwrap();
            assert_eq!(engine.tank(1, 0).unwrap().ammo, 4, "cooldown must block re-shoot");
        }
        engine.step(&mut p1, &mut p2).unwrap();
        assert_eq!(engine.tank(1, 0).unwrap().ammo, 3);
    }

    #[test]
    fn test_shell_spawned_into_wall_damages_it() {
        // Player 2 faces R with the wall directly at the muzzle: the spawn
        // is the first impact and no shell reaches the board.
        let mut engine = scripted_engine(
            &["2#  1"],
            1,
            3,
            vec![Action::DoNothing],
            vec![Action::Shoot],
        );
        run(&mut engine);
        assert_eq!(engine.board().shells().count(), 0);
        let wall_id = engine.board().wall_at(Point::new(0, 1)).unwrap();
        match &engine.board().get(wall_id).unwrap().kind {
            EntityKind::Wall(w) => assert_eq!(w.hits, 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_point_blank_shot_kills_adjacent_tank() {
        // Player 1 faces L with the enemy directly at the muzzle; the spawn
        // is an immediate hit.
        let mut engine = scripted_engine(
            &["21   "],
            5,
            3,
            vec![Action::Shoot],
            vec![Action::DoNothing; 5],
        );
        let result = run(&mut engine);
        assert_eq!(result.winner, 1);
        assert_eq!(result.reason, EndReason::AllTanksDead);
        assert_eq!(result.rounds, 1);
    }

    #[test]
    fn test_mine_step_destroys_both() {
        let mut engine = scripted_engine(
            &["@1  2"],
            5,
            3,
            vec![Action::MoveForward],
            vec![Action::DoNothing; 5],
        );
        let result = run(&mut engine);
        assert_eq!(result.winner, 2);
        assert_eq!(result.reason, EndReason::AllTanksDead);
        assert_eq!(result.rounds, 1);
        assert_eq!(engine.board().mines().count(), 0);
    }

    #[test]
    fn test_zero_ammo_countdown_expires_into_tie() {
        // Each tank fires its only shell straight into an adjacent wall, so
        // both sides are dry after tick 1 and nothing else can happen.
        let mut engine = scripted_engine(
            &["#1   ", "   2#"],
            100,
            1,
            vec![Action::Shoot],
            vec![Action::Shoot],
        );
        let result = run(&mut engine);
        assert_eq!(result.winner, 0);
        assert_eq!(result.reason, EndReason::ZeroShells);
        // Armed at the end of tick 1, expires 40 ticks later.
        assert_eq!(result.rounds, 1 + AMMO_DEPLETION_GRACE);
    }

    #[test]
    fn test_fresh_shells_dwell_one_tick() {
        // Player 1 at (0, 0) faces L; its shell spawns across the seam at
        // (0, 4) and dwells there for the spawn tick.
        let mut engine = scripted_engine(
            &["1    ", "     ", "    2"],
            2,
            3,
            vec![Action::Shoot, Action::DoNothing],
            vec![Action::DoNothing, Action::DoNothing],
        );
        let mut p1 = NullPlayer;
        let mut p2 = NullPlayer;
        engine.step(&mut p1, &mut p2).unwrap();
        let shell_pos: Vec<Point> = engine
            .board()
            .shells()
            .map(|(id, _)| engine.board().get(id).unwrap().pos)
            .collect();
        assert_eq!(shell_pos, vec![Point::new(0, 4)]);
        engine.step(&mut p1, &mut p2).unwrap();
        let shell_pos: Vec<Point> = engine
            .board()
            .shells()
            .map(|(id, _)| engine.board().get(id).unwrap().pos)
            .collect();
        // Two cells per tick once the dwell tick has passed.
        assert_eq!(shell_pos, vec![Point::new(0, 2)]);
    }
}
