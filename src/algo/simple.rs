//! Baseline algorithms: a stationary sniper and an idle opponent.

use crate::algo::hybrid::rotation_toward;
use crate::algo::{BattleInfo, TankAlgorithm};
use crate::game::{Action, Direction, PlayerId, Point, SHOOT_COOLDOWN};

/// Holds its cell, tracks the nearest enemy with the turret, and fires
/// whenever the line of sight is clear.
pub struct SniperAlgorithm {
    info_interval: u32,
    step: u32,
    info: Option<BattleInfo>,
    dir: Direction,
    ammo: u32,
    cooldown: u8,
    primed: bool,
}

impl SniperAlgorithm {
    /// Create a sniper for one tank.
    #[must_use]
    pub fn new(player: PlayerId, _tank_index: u32, info_interval: u32) -> Self {
        let dir = if player == 1 {
            Direction::L
        } else {
            Direction::R
        };
        Self {
            info_interval: info_interval.max(1),
            step: 1,
            info: None,
            dir,
            ammo: 0,
            cooldown: 0,
            primed: false,
        }
    }

    fn choose(&self) -> Action {
        let Some(info) = &self.info else {
            return Action::GetBattleInfo;
        };
        if self.step % self.info_interval == 0 {
            return Action::GetBattleInfo;
        }
        let Some(pos) = info.my_pos else {
            return Action::DoNothing;
        };
        let Some(enemy) = info.closest_enemy(pos) else {
            return Action::DoNothing;
        };

        let wanted = Direction::toward(pos, enemy, info.rows, info.cols);
        if let Some(rotation) = rotation_toward(self.dir, wanted) {
            return rotation;
        }
        if self.ammo > 0 && self.cooldown == 0 && self.line_is_clear(pos) {
            return Action::Shoot;
        }
        Action::DoNothing
    }

    /// Walk the cannon axis until an enemy, a blocker, or a full lap.
    fn line_is_clear(&self, pos: Point) -> bool {
        let Some(info) = &self.info else {
            return false;
        };
        let mut current = pos;
        for _ in 0..info.rows.max(info.cols) {
            current = current.step(self.dir, 1, info.rows, info.cols);
            if info.is_wall(current) || info.allies.contains(&current) {
                return false;
            }
            if info.enemies.contains(&current) {
                return true;
            }
        }
        false
    }

    fn apply(&mut self, action: Action) {
        let mut shot = false;
        match action {
            Action::Shoot => {
                self.ammo = self.ammo.saturating_sub(1);
                self.cooldown = SHOOT_COOLDOWN;
                shot = true;
            }
            Action::RotateLeft45 => self.dir = self.dir.rotated_left(1),
            Action::RotateLeft90 => self.dir = self.dir.rotated_left(2),
            Action::RotateRight45 => self.dir = self.dir.rotated_right(1),
            Action::RotateRight90 => self.dir = self.dir.rotated_right(2),
            _ => {}
        }
        if !shot && self.cooldown > 0 {
            self.cooldown -= 1;
        }
        self.step += 1;
    }
}

impl TankAlgorithm for SniperAlgorithm {
    fn get_action(&mut self) -> Action {
        let action = self.choose();
        self.apply(action);
        action
    }

    fn update_battle_info(&mut self, info: BattleInfo) {
        if !self.primed {
            self.ammo = info.num_shells;
            self.primed = true;
        }
        self.info = Some(info);
    }
}

/// Requests nothing and does nothing. A deterministic baseline opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleAlgorithm;

impl TankAlgorithm for IdleAlgorithm {
    fn get_action(&mut self) -> Action {
        Action::DoNothing
    }

    fn update_battle_info(&mut self, _info: BattleInfo) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::BoardView;

    fn info_from(rows: &[&str], player: PlayerId) -> BattleInfo {
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
        BattleInfo::decode(&BoardView::from_grid(&grid), player, 3)
    }

    #[test]
    fn test_sniper_requests_info_first() {
        let mut sniper = SniperAlgorithm::new(1, 0, 4);
        assert_eq!(sniper.get_action(), Action::GetBattleInfo);
    }

    #[test]
    fn test_sniper_fires_down_clear_line() {
        // Facing L with the enemy two cells left: aligned, clear, fire.
        let mut sniper = SniperAlgorithm::new(1, 0, 100);
        sniper.update_battle_info(info_from(&["   2 %"], 1));
        assert_eq!(sniper.get_action(), Action::Shoot);
    }

    #[test]
    fn test_sniper_turns_before_firing() {
        // The short toroidal way to the enemy is straight up; the sniper
        // spawns facing L, so a quarter turn comes first.
        let mut sniper = SniperAlgorithm::new(1, 0, 100);
        sniper.update_battle_info(info_from(&["%  ", "   ", "2  "], 1));
        assert_eq!(sniper.get_action(), Action::RotateRight90);
    }

    #[test]
    fn test_sniper_holds_fire_behind_wall() {
        let mut sniper = SniperAlgorithm::new(1, 0, 100);
        sniper.update_battle_info(info_from(&["   2#%"], 1));
        assert_eq!(sniper.get_action(), Action::DoNothing);
    }

    #[test]
    fn test_idle_always_passes() {
        let mut idle = IdleAlgorithm;
        assert_eq!(idle.get_action(), Action::DoNothing);
    }
}
