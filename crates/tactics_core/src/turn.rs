//! Turn phase state machine.
//!
//! The cycle is fixed:
//!
//! ```text
//! SetActions -> Autoplayer -> Summon -> Attack -> Return
//!     ^                                              |
//!     +-- EnemyAttack <- EnemySpawn <- EnemyMove <---+
//! ```
//!
//! [`TurnController`] only tracks which phase is current and the turn
//! counter. The entry actions of each phase are run by
//! [`crate::battle::Battle::enter_phase`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A phase of the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Player toggles play/pause on units.
    SetActions,
    /// Player units walk one step.
    Autoplayer,
    /// Player may deploy one card.
    Summon,
    /// Player pattern attacks.
    Attack,
    /// Player units that scored a kill return to hand.
    Return,
    /// Enemy AI decides and enemy units walk.
    EnemyMove,
    /// Pending enemies appear and a new one is rolled.
    EnemySpawn,
    /// Enemy pattern attacks.
    EnemyAttack,
}

impl Phase {
    /// Every phase in cycle order, starting at `SetActions`.
    pub const ALL: [Self; 8] = [
        Self::SetActions,
        Self::Autoplayer,
        Self::Summon,
        Self::Attack,
        Self::Return,
        Self::EnemyMove,
        Self::EnemySpawn,
        Self::EnemyAttack,
    ];

    /// The phase that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::SetActions => Self::Autoplayer,
            Self::Autoplayer => Self::Summon,
            Self::Summon => Self::Attack,
            Self::Attack => Self::Return,
            Self::Return => Self::EnemyMove,
            Self::EnemyMove => Self::EnemySpawn,
            Self::EnemySpawn => Self::EnemyAttack,
            Self::EnemyAttack => Self::SetActions,
        }
    }

    /// Only a forced advance can leave this phase.
    #[must_use]
    pub const fn requires_force(self) -> bool {
        matches!(self, Self::Autoplayer | Self::EnemyMove)
    }

    /// The frame update leaves this phase on its own once glides settle.
    #[must_use]
    pub const fn waits_for_glides(self) -> bool {
        matches!(self, Self::Autoplayer | Self::Attack | Self::EnemyMove)
    }

    /// Short name for logs and the headless protocol.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SetActions => "set_actions",
            Self::Autoplayer => "autoplayer",
            Self::Summon => "summon",
            Self::Attack => "attack",
            Self::Return => "return",
            Self::EnemyMove => "enemy_move",
            Self::EnemySpawn => "enemy_spawn",
            Self::EnemyAttack => "enemy_attack",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current phase and completed turn count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnController {
    phase: Phase,
    turn_count: u32,
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnController {
    /// A match opens on the summon phase.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Summon,
            turn_count: 0,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of completed enemy-attack → set-actions wraps.
    #[must_use]
    pub const fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Move to the next phase.
    ///
    /// Returns the entered phase, or `None` if the current phase needs
    /// `force` and it was not given.
    pub fn advance(&mut self, force: bool) -> Option<Phase> {
        if self.phase.requires_force() && !force {
            return None;
        }
        let next = self.phase.next();
        if next == Phase::SetActions {
            self.turn_count += 1;
        }
        self.phase = next;
        Some(next)
    }
}
