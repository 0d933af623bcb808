//! Player input.
//!
//! Inputs are already resolved to board and pool targets; mapping screen
//! positions to tiles and slots is the presentation layer's job.

use serde::{Deserialize, Serialize};

use crate::board::BoardCoord;
use crate::roster::RosterId;

/// A player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum Input {
    /// Request the next phase (the hourglass / space bar).
    Advance,
    /// Flip play/pause on the player unit at `tile`. Set-actions phase only.
    ToggleIntent {
        /// Tile holding the unit.
        tile: BoardCoord,
    },
    /// Pick up a card from the pool. Summon phase only.
    PickCard {
        /// Pool slot.
        slot: usize,
    },
    /// Drop the held card on a roster character to deploy it.
    DropOnRoster {
        /// Target character.
        roster: RosterId,
    },
    /// Drop the held card without deploying.
    ReleaseCard,
}
