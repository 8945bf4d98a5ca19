//! The action request enum tanks submit once per tick.

/// One action request, as returned by a tank algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move one cell in the cannon direction.
    MoveForward,
    /// Enter or advance the multi-tick backward state machine.
    MoveBackward,
    /// Rotate the cannon 45 degrees counter-clockwise.
    RotateLeft45,
    /// Rotate the cannon 90 degrees counter-clockwise.
    RotateLeft90,
    /// Rotate the cannon 45 degrees clockwise.
    RotateRight45,
    /// Rotate the cannon 90 degrees clockwise.
    RotateRight90,
    /// Fire a shell from the cell ahead of the cannon.
    Shoot,
    /// Request a battle-info snapshot instead of acting.
    GetBattleInfo,
    /// Explicitly pass the tick.
    DoNothing,
}

impl Action {
    /// Short name used in log lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Action::MoveForward => "MoveForward",
            Action::MoveBackward => "MoveBackward",
            Action::RotateLeft45 => "RotateLeft45",
            Action::RotateLeft90 => "RotateLeft90",
            Action::RotateRight45 => "RotateRight45",
            Action::RotateRight90 => "RotateRight90",
            Action::Shoot => "Shoot",
            Action::GetBattleInfo => "GetBattleInfo",
            Action::DoNothing => "DoNothing",
        }
    }

    /// Rotation amount in eighths of a turn: negative left, positive right,
    /// zero for non-rotations.
    #[must_use]
    pub const fn rotation(self) -> i32 {
        match self {
            Action::RotateLeft45 => -1,
            Action::RotateLeft90 => -2,
            Action::RotateRight45 => 1,
            Action::RotateRight90 => 2,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
