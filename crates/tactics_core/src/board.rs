//! Board grid and tile occupancy.
//!
//! The board is a fixed `rows × cols` grid addressed row-major. Each tile
//! holds at most one occupant. Occupancy is only changed by the movement,
//! combat and spawn code inside this crate, which keeps it in lockstep with
//! every unit's `board_pos`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::error::{GameError, Result};
use crate::math::Vec2Fixed;
use crate::storage::EntityId;

/// Row/column address of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardCoord {
    /// Row index (0 is the bottom row).
    pub row: i32,
    /// Column index.
    pub col: i32,
}

impl BoardCoord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Shift by a card or pattern offset (`x` moves columns, `y` moves rows).
    ///
    /// Saturates at the `i32` range; a saturated coordinate is never on a board.
    #[must_use]
    pub const fn offset(self, x: i32, y: i32) -> Self {
        Self {
            row: self.row.saturating_add(y),
            col: self.col.saturating_add(x),
        }
    }
}

impl fmt::Display for BoardCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Enemy reserved on a tile, materialized on the next spawn phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingSpawn {
    /// Index into the enemy template table.
    pub enemy: usize,
    /// Index into the enemy movement card table.
    pub card: usize,
}

/// A single board tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Address of this tile.
    pub coord: BoardCoord,
    /// Unit standing on the tile.
    pub occupant: Option<EntityId>,
    /// World-space center.
    pub center: Vec2Fixed,
    /// A player unit is about to step here (recomputed every enemy AI pass).
    pub player_threatens: bool,
    /// Enemy waiting to appear here.
    pub pending_spawn: Option<PendingSpawn>,
}

/// Fixed-size grid of tiles.
#[derive(Debug, Clone)]
pub struct Board {
    rows: i32,
    cols: i32,
    tiles: Vec<Tile>,
}

impl Board {
    /// Create an empty board with tile centers laid out from `origin`.
    #[must_use]
    pub fn new(rows: i32, cols: i32, origin: Vec2Fixed, tile_size: Vec2Fixed) -> Self {
        let half = Vec2Fixed::new(tile_size.x / 2, tile_size.y / 2);
        let mut tiles = Vec::with_capacity((rows.max(0) * cols.max(0)) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let center = origin + half + tile_size.scale(Vec2Fixed::from_ints(col, row));
                tiles.push(Tile {
                    coord: BoardCoord::new(row, col),
                    occupant: None,
                    center,
                    player_threatens: false,
                    pending_spawn: None,
                });
            }
        }
        Self { rows, cols, tiles }
    }

    /// Create the board described by a battle config.
    #[must_use]
    pub fn from_config(config: &BattleConfig) -> Self {
        Self::new(config.rows, config.cols, config.board_origin, config.tile_size)
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Check whether a coordinate lies on the board.
    #[must_use]
    pub const fn contains(&self, coord: BoardCoord) -> bool {
        coord.row >= 0 && coord.row < self.rows && coord.col >= 0 && coord.col < self.cols
    }

    fn index(&self, coord: BoardCoord) -> Result<usize> {
        if self.contains(coord) {
            Ok((coord.row * self.cols + coord.col) as usize)
        } else {
            Err(GameError::TileOutOfBounds {
                row: coord.row,
                col: coord.col,
            })
        }
    }

    /// Look up a tile.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::TileOutOfBounds`] for coordinates off the board.
    pub fn tile(&self, coord: BoardCoord) -> Result<&Tile> {
        let i = self.index(coord)?;
        Ok(&self.tiles[i])
    }

    pub(crate) fn tile_mut(&mut self, coord: BoardCoord) -> Result<&mut Tile> {
        let i = self.index(coord)?;
        Ok(&mut self.tiles[i])
    }

    /// Unit on a tile, `None` for empty or off-board tiles.
    #[must_use]
    pub fn occupant(&self, coord: BoardCoord) -> Option<EntityId> {
        self.tile(coord).ok().and_then(|t| t.occupant)
    }

    /// World-space center of a tile.
    pub fn center(&self, coord: BoardCoord) -> Result<Vec2Fixed> {
        self.tile(coord).map(|t| t.center)
    }

    /// Tile is on the board, unoccupied and not reserved for a spawn.
    #[must_use]
    pub fn is_free(&self, coord: BoardCoord) -> bool {
        self.tile(coord)
            .map(|t| t.occupant.is_none() && t.pending_spawn.is_none())
            .unwrap_or(false)
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Tiles holding a pending enemy spawn, row-major.
    pub fn pending_spawns(&self) -> impl Iterator<Item = (BoardCoord, PendingSpawn)> + '_ {
        self.tiles
            .iter()
            .filter_map(|t| t.pending_spawn.map(|p| (t.coord, p)))
    }

    /// Number of occupied tiles.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.occupant.is_some()).count()
    }

    pub(crate) fn place(&mut self, coord: BoardCoord, id: EntityId) -> Result<()> {
        self.tile_mut(coord)?.occupant = Some(id);
        Ok(())
    }

    pub(crate) fn vacate(&mut self, coord: BoardCoord) -> Result<Option<EntityId>> {
        Ok(self.tile_mut(coord)?.occupant.take())
    }

    pub(crate) fn clear_threats(&mut self) {
        for tile in &mut self.tiles {
            tile.player_threatens = false;
        }
    }
}
