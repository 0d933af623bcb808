//! Movement card templates.

use serde::{Deserialize, Serialize};

/// One step of a movement card.
///
/// `x` shifts columns and `y` shifts rows, relative to the unit's tile (or to
/// the player start tile for the first step of a loop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementStep {
    /// Column delta.
    pub x: i32,
    /// Row delta.
    pub y: i32,
    /// Whether landing on this step triggers a pattern attack.
    #[serde(default)]
    pub attack: bool,
}

impl MovementStep {
    /// Plain move step.
    #[must_use]
    pub const fn walk(x: i32, y: i32) -> Self {
        Self { x, y, attack: false }
    }

    /// Move step that attacks on arrival.
    #[must_use]
    pub const fn strike(x: i32, y: i32) -> Self {
        Self { x, y, attack: true }
    }
}

/// Named, ordered path that a unit loops through.
///
/// # Example JSON
///
/// ```json
/// { "name": "straight-1", "movements": [ { "x": 0, "y": -1, "attack": true } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementCard {
    /// Card name, used by enemy templates to reference it.
    pub name: String,
    /// Ordered steps.
    #[serde(alias = "movements")]
    pub steps: Vec<MovementStep>,
}

impl MovementCard {
    /// Create a card from its steps.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<MovementStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Number of steps in one loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Card has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`, wrapping around the loop.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&MovementStep> {
        if self.steps.is_empty() {
            None
        } else {
            self.steps.get(index % self.steps.len())
        }
    }

    /// Index that follows `index` in the loop.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        if self.steps.is_empty() {
            0
        } else {
            (index + 1) % self.steps.len()
        }
    }
}
