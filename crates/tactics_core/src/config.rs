//! Battle configuration.
//!
//! Every tunable of a match lives here. Defaults reproduce the shipped game:
//! a 4×3 board, player start on row 0 column 1, at most four enemies, a
//! forced third template on every seventh spawn roll.

use serde::{Deserialize, Serialize};

use crate::board::BoardCoord;
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Periodic override of the weighted enemy roll.
///
/// On roll number `n` (0-based count of successful reservations so far), if
/// `n % period == period - 1` the `forced_template` is picked instead of a
/// weighted draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnCadence {
    /// Number of rolls in one cadence cycle (0 disables the override).
    pub period: u32,
    /// Enemy template index forced on the last roll of each cycle.
    pub forced_template: Option<usize>,
}

impl SpawnCadence {
    /// Template forced for the given spawn count, if this roll is a forced slot.
    #[must_use]
    pub fn forced_for(&self, spawned: u32) -> Option<usize> {
        if self.period == 0 {
            return None;
        }
        if spawned % self.period == self.period - 1 {
            self.forced_template
        } else {
            None
        }
    }
}

impl Default for SpawnCadence {
    fn default() -> Self {
        Self {
            period: 7,
            forced_template: Some(2),
        }
    }
}

/// Configuration for a single battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Board rows.
    pub rows: i32,
    /// Board columns.
    pub cols: i32,
    /// Anchor tile for deployments, enemy spawns and card loop restarts.
    pub player_start: BoardCoord,
    /// World-space size of one tile.
    pub tile_size: Vec2Fixed,
    /// World-space position of the board's lower-left corner.
    pub board_origin: Vec2Fixed,
    /// Live enemy count at which new spawn rolls stop.
    pub enemy_cap: usize,
    /// Forced-template schedule.
    pub spawn_cadence: SpawnCadence,
    /// Health and max-health ceiling for return-to-hand healing.
    pub return_stat_cap: u32,
    /// Seconds a unit glides into its next tile.
    #[serde(with = "fixed_serde")]
    pub move_glide: Fixed,
    /// Seconds for each leg of a bounce off a surviving defender.
    #[serde(with = "fixed_serde")]
    pub bounce_glide: Fixed,
    /// Seconds an attack effect travels to its target tile.
    #[serde(with = "fixed_serde")]
    pub attack_glide: Fixed,
    /// Seed for enemy rolls.
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 3,
            player_start: BoardCoord::new(0, 1),
            tile_size: Vec2Fixed::new(
                Fixed::from_num(4) / Fixed::from_num(3),
                Fixed::from_num(4) / Fixed::from_num(3),
            ),
            board_origin: Vec2Fixed::from_ints(6, 3),
            enemy_cap: 4,
            spawn_cadence: SpawnCadence::default(),
            return_stat_cap: 3,
            move_glide: Fixed::from_num(0.25),
            bounce_glide: Fixed::from_num(0.15),
            attack_glide: Fixed::from_num(0.2),
            seed: 0,
        }
    }
}

impl BattleConfig {
    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Same config with a different seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Same config with a different board size and start tile.
    #[must_use]
    pub fn with_board(mut self, rows: i32, cols: i32, player_start: BoardCoord) -> Self {
        self.rows = rows;
        self.cols = cols;
        self.player_start = player_start;
        self
    }

    /// Check that the config describes a playable board.
    pub fn validate(&self) -> Result<()> {
        if self.rows <= 0 || self.cols <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "board must have positive size, got {}x{}",
                self.rows, self.cols
            )));
        }
        let start = self.player_start;
        if start.row < 0 || start.row >= self.rows || start.col < 0 || start.col >= self.cols {
            return Err(GameError::InvalidConfig(format!(
                "player start {start} is outside a {}x{} board",
                self.rows, self.cols
            )));
        }
        if self.move_glide <= Fixed::ZERO
            || self.bounce_glide <= Fixed::ZERO
            || self.attack_glide <= Fixed::ZERO
        {
            return Err(GameError::InvalidConfig(
                "glide durations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
