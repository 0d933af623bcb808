//! Error types for the battle core.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all battle errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Tile coordinate outside the board.
    #[error("Invalid tile coordinate: {row},{col}")]
    TileOutOfBounds {
        /// Requested row.
        row: i32,
        /// Requested column.
        col: i32,
    },

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    /// Movement card referenced by name that does not exist.
    #[error("Unknown movement card: {0}")]
    UnknownCard(String),

    /// Movement card with no steps.
    #[error("Movement card '{0}' has no steps")]
    EmptyCard(String),

    /// Template data that cannot be used.
    #[error("Invalid game data: {0}")]
    InvalidData(String),

    /// Battle configuration that cannot be used.
    #[error("Invalid battle config: {0}")]
    InvalidConfig(String),

    /// Config file parsing error.
    #[error("Failed to parse battle config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}
