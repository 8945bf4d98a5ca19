//! The player object shared by the built-in algorithms.

use crate::algo::{BattleInfo, Player, TankAlgorithm};
use crate::game::{BoardView, PlayerId};

/// Decodes raw snapshots into [`BattleInfo`] for its tanks.
///
/// Both sides use the same decoding; the player index only flips which
/// digit counts as friendly.
#[derive(Debug, Clone, Copy)]
pub struct InfoPlayer {
    player: PlayerId,
    num_shells: u32,
}

impl InfoPlayer {
    /// Create the player object for one side.
    #[must_use]
    pub const fn new(player: PlayerId, num_shells: u32) -> Self {
        Self { player, num_shells }
    }
}

impl Player for InfoPlayer {
    fn update_tank_with_battle_info(
        &mut self,
        algorithm: &mut dyn TankAlgorithm,
        view: &BoardView,
    ) {
        let info = BattleInfo::decode(view, self.player, self.num_shells);
        algorithm.update_battle_info(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Point;

    struct Capture {
        last: Option<BattleInfo>,
    }

    impl TankAlgorithm for Capture {
        fn get_action(&mut self) -> crate::game::Action {
            crate::game::Action::DoNothing
        }

        fn update_battle_info(&mut self, info: BattleInfo) {
            self.last = Some(info);
        }
    }

    #[test]
    fn test_relays_decoded_info() {
        let grid = vec![vec!['%', ' '], vec![' ', '2']];
        let view = BoardView::from_grid(&grid);
        let mut player = InfoPlayer::new(1, 3);
        let mut algo = Capture { last: None };
        player.update_tank_with_battle_info(&mut algo, &view);
        let info = algo.last.unwrap();
        assert_eq!(info.my_pos, Some(Point::new(0, 0)));
        assert_eq!(info.enemies, vec![Point::new(1, 1)]);
        assert_eq!(info.num_shells, 3);
    }
}
