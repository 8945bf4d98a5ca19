//! Tank algorithms: the decision contract and the built-in implementations.
//!
//! An algorithm is opaque to the engine: once per tick it is asked for an
//! action, and when its tank requests battle info the owning [`Player`]
//! hands it a decoded snapshot. Algorithms never mutate engine state and
//! must be deterministic given the sequence of views they observe.
//!
//! Dynamic plug-in loading is out of scope; implementations are looked up
//! by name in a built-in registry instead.

mod battle_info;
mod hybrid;
mod players;
mod simple;

pub use battle_info::BattleInfo;
pub use hybrid::HybridAlgorithm;
pub use players::InfoPlayer;
pub use simple::{IdleAlgorithm, SniperAlgorithm};

use crate::game::{Action, BoardView, PlayerId};

/// The decision routine driving one tank.
pub trait TankAlgorithm {
    /// The action this tank requests for the current tick.
    fn get_action(&mut self) -> Action;

    /// Receive a battle-info snapshot requested via [`Action::GetBattleInfo`].
    fn update_battle_info(&mut self, info: BattleInfo);
}

/// The per-player object that relays battle info to its tanks' algorithms.
///
/// The engine hands it the raw char-grid view; the player decides what
/// structured form its algorithms get.
pub trait Player {
    /// Decode `view` and forward it to `algorithm`.
    fn update_tank_with_battle_info(
        &mut self,
        algorithm: &mut dyn TankAlgorithm,
        view: &BoardView,
    );
}

/// Factory producing one algorithm per `(player, tank_index)`.
pub type TankAlgorithmFactory = Box<dyn Fn(PlayerId, u32) -> Box<dyn TankAlgorithm> + Send + Sync>;

/// A named algorithm in the built-in registry.
#[derive(Clone, Copy)]
pub struct AlgorithmSpec {
    /// Registry name, as passed on the command line.
    pub name: &'static str,
    /// One-line description for listings.
    pub description: &'static str,
    make: fn(PlayerId, u32) -> Box<dyn TankAlgorithm>,
}

impl AlgorithmSpec {
    /// Instantiate the algorithm for one tank.
    #[must_use]
    pub fn create(&self, player: PlayerId, tank_index: u32) -> Box<dyn TankAlgorithm> {
        (self.make)(player, tank_index)
    }

    /// Build the player object that decodes views for this algorithm.
    #[must_use]
    pub fn create_player(&self, player: PlayerId, num_shells: u32) -> Box<dyn Player> {
        Box::new(InfoPlayer::new(player, num_shells))
    }

    /// A boxed factory closure, for call sites that outlive the spec lookup.
    #[must_use]
    pub fn factory(&self) -> TankAlgorithmFactory {
        let make = self.make;
        Box::new(move |player, tank_index| make(player, tank_index))
    }
}

impl std::fmt::Debug for AlgorithmSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmSpec")
            .field("name", &self.name)
            .finish()
    }
}

/// All registered algorithms.
pub const ALGORITHMS: &[AlgorithmSpec] = &[
    AlgorithmSpec {
        name: "hybrid",
        description: "BFS chase with shell avoidance and line-of-sight shooting",
        make: |player, tank_index| {
            // Player 1 leans aggressive (longer path horizon, tighter threat
            // radius); player 2 leans defensive.
            if player == 1 {
                Box::new(HybridAlgorithm::new(player, tank_index, 5, 2.0, 5))
            } else {
                Box::new(HybridAlgorithm::new(player, tank_index, 3, 4.0, 5))
            }
        },
    },
    AlgorithmSpec {
        name: "sniper",
        description: "Holds position, turns toward the nearest enemy, fires on line of sight",
        make: |player, tank_index| Box::new(SniperAlgorithm::new(player, tank_index, 4)),
    },
    AlgorithmSpec {
        name: "idle",
        description: "Does nothing; baseline opponent",
        make: |_, _| Box::new(IdleAlgorithm),
    },
];

/// Look up a registered algorithm by name.
#[must_use]
pub fn find_algorithm(name: &str) -> Option<&'static AlgorithmSpec> {
    ALGORITHMS.iter().find(|spec| spec.name == name)
}

/// Replays a fixed action list, then does nothing. Deterministic by
/// construction; used by tests and the engine benchmarks.
#[derive(Debug, Clone)]
pub struct ScriptedAlgorithm {
    actions: Vec<Action>,
    next: usize,
}

impl ScriptedAlgorithm {
    /// Create a script that plays `actions` in order.
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, next: 0 }
    }
}

impl TankAlgorithm for ScriptedAlgorithm {
    fn get_action(&mut self) -> Action {
        let action = self
            .actions
            .get(self.next)
            .copied()
            .unwrap_or(Action::DoNothing);
        self.next += 1;
        action
    }

    fn update_battle_info(&mut self, _info: BattleInfo) {}
}

/// A player that discards battle info. Pairs with [`ScriptedAlgorithm`] in
/// tests that do not exercise the info path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPlayer;

impl Player for NullPlayer {
    fn update_tank_with_battle_info(
        &mut self,
        _algorithm: &mut dyn TankAlgorithm,
        _view: &BoardView,
    ) {
    }
}
