//! Property-based tests for the engine.
//!
//! Random action scripts on a handful of board layouts must never panic,
//! never violate board invariants, and always produce an internally
//! consistent result.
//!
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use skirmish::algo::{NullPlayer, ScriptedAlgorithm, TankAlgorithm};
use skirmish::game::{check_board, Action, BoardView, Direction, EndReason, Engine};

const ACTIONS: [Action; 9] = [
    Action::MoveForward,
    Action::MoveBackward,
    Action::RotateLeft45,
    Action::RotateLeft90,
    Action::RotateRight45,
    Action::RotateRight90,
    Action::Shoot,
    Action::GetBattleInfo,
    Action::DoNothing,
];

const LAYOUTS: [&[&str]; 3] = [
    &["1    ", "     ", "     ", "     ", "    2"],
    &["1 # 2", " @   ", "#   #", "     ", "  @  "],
    &["11   ", "     ", "## ##", "     ", "   22"],
];

fn build_engine(layout: &[&str], max_steps: u32, s1: Vec<Action>, s2: Vec<Action>) -> Engine {
    let grid: Vec<Vec<char>> = layout.iter().map(|r| r.chars().collect()).collect();
    let view = BoardView::from_grid(&grid);
    Engine::new(
        &view,
        max_steps,
        3,
        &move |_, _| -> Box<dyn TankAlgorithm> { Box::new(ScriptedAlgorithm::new(s1.clone())) },
        &move |_, _| -> Box<dyn TankAlgorithm> { Box::new(ScriptedAlgorithm::new(s2.clone())) },
    )
    .unwrap()
}

fn action_script() -> impl Strategy<Value = Vec<Action>> {
    proptest::collection::vec(proptest::sample::select(ACTIONS.to_vec()), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Any pair of scripts runs to a clean, consistent result.
    #[test]
    fn prop_random_scripts_finish_consistently(
        layout_idx in 0usize..3,
        script1 in action_script(),
        script2 in action_script(),
    ) {
        let mut engine = build_engine(LAYOUTS[layout_idx], 30, script1, script2);
        let result = engine.run(&mut NullPlayer, &mut NullPlayer).unwrap();

        prop_assert!(result.winner <= 2);
        prop_assert!(result.rounds <= 30);
        // Winner consistency: a victory means the loser has nothing left.
        if result.winner == 1 {
            prop_assert_eq!(result.remaining_tanks[1], 0);
        } else if result.winner == 2 {
            prop_assert_eq!(result.remaining_tanks[0], 0);
        } else if result.reason == EndReason::AllTanksDead {
            prop_assert_eq!(result.remaining_tanks, [0, 0]);
        }
        // The final board satisfies every invariant.
        prop_assert!(check_board(engine.board()).is_empty());
        // Tank counts on the board match the reported result.
        prop_assert_eq!(engine.board().count_player_tanks(1), result.remaining_tanks[0]);
        prop_assert_eq!(engine.board().count_player_tanks(2), result.remaining_tanks[1]);
    }

    /// The engine is a pure function of its inputs.
    #[test]
    fn prop_matches_are_deterministic(
        layout_idx in 0usize..3,
        script1 in action_script(),
        script2 in action_script(),
    ) {
        let mut a = build_engine(LAYOUTS[layout_idx], 25, script1.clone(), script2.clone());
        let mut b = build_engine(LAYOUTS[layout_idx], 25, script1, script2);
        let ra = a.run(&mut NullPlayer, &mut NullPlayer).unwrap();
        let rb = b.run(&mut NullPlayer, &mut NullPlayer).unwrap();
        prop_assert_eq!(ra, rb);
    }

    /// Rotating by +k then -k restores the direction, for k in {1, 2}.
    #[test]
    fn prop_rotation_round_trip(dir_idx in 0i32..8, k in 1i32..=2) {
        let dir = Direction::from_index(dir_idx);
        prop_assert_eq!(dir.rotated_right(k).rotated_left(k), dir);
        prop_assert_eq!(dir.rotated_left(k).rotated_right(k), dir);
    }

    /// A tank with zero ammo never manages to shoot: ammo stays zero and no
    /// shell ever appears.
    #[test]
    fn prop_no_ammo_never_shoots(script in action_script()) {
        let grid: Vec<Vec<char>> = LAYOUTS[0].iter().map(|r| r.chars().collect()).collect();
        let view = BoardView::from_grid(&grid);
        let mut engine = Engine::new(
            &view,
            20,
            0,
            &move |_, _| -> Box<dyn TankAlgorithm> { Box::new(ScriptedAlgorithm::new(script.clone())) },
            &move |_, _| -> Box<dyn TankAlgorithm> { Box::new(ScriptedAlgorithm::new(vec![])) },
        )
        .unwrap();
        let result = engine.run(&mut NullPlayer, &mut NullPlayer).unwrap();
        // With zero shells on both sides the countdown arms immediately; the
        // match can only end by countdown, step limit, or a mine/collision.
        prop_assert!(matches!(
            result.reason,
            EndReason::ZeroShells | EndReason::MaxSteps | EndReason::AllTanksDead
        ));
        if let Some(tank) = engine.tank(1, 0) {
            prop_assert_eq!(tank.ammo, 0);
        }
    }
}
