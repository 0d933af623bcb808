//! Asset loading for headless play.
//!
//! Reads the four JSON template tables and the optional RON battle config
//! from disk. The core crate never touches the filesystem; everything it
//! needs is handed over as a validated [`GameData`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tactics_core::config::BattleConfig;
use tactics_core::data::{CharacterData, EnemyData, GameData, MovementCard};
use tactics_core::error::GameError;
use thiserror::Error;

/// Player movement cards.
pub const PLAYER_CARDS_FILE: &str = "movement.json";
/// Enemy movement cards.
pub const ENEMY_CARDS_FILE: &str = "enemy_movement.json";
/// Player roster.
pub const CHARACTERS_FILE: &str = "characters.json";
/// Enemy templates.
pub const ENEMIES_FILE: &str = "enemies.json";

/// Error loading template data or config.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// File is not valid JSON for its table.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Data directory does not exist.
    #[error("Data directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Parsed data or config was rejected by the core.
    #[error(transparent)]
    Invalid(#[from] GameError),
}

/// Directory holding the bundled asset files.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, DataLoadError> {
    let path = dir.join(file);
    let content = fs::read_to_string(&path).map_err(|source| DataLoadError::Io {
        path: path.clone(),
        source,
    })?;
    let table: Vec<T> =
        serde_json::from_str(&content).map_err(|source| DataLoadError::Parse { path, source })?;
    tracing::debug!(file, entries = table.len(), "Loaded table");
    Ok(table)
}

/// Load and validate every template table in `dir`.
///
/// # Errors
///
/// Returns an error if the directory or a file is missing, a file does not
/// parse, or the combined data fails [`GameData::validate`].
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    if !dir.is_dir() {
        return Err(DataLoadError::DirectoryNotFound(dir.to_path_buf()));
    }

    let data = GameData {
        player_cards: read_table::<MovementCard>(dir, PLAYER_CARDS_FILE)?,
        enemy_cards: read_table::<MovementCard>(dir, ENEMY_CARDS_FILE)?,
        characters: read_table::<CharacterData>(dir, CHARACTERS_FILE)?,
        enemies: read_table::<EnemyData>(dir, ENEMIES_FILE)?,
    };
    data.validate()?;

    tracing::info!(
        dir = %dir.display(),
        player_cards = data.player_cards.len(),
        enemy_cards = data.enemy_cards.len(),
        characters = data.characters.len(),
        enemies = data.enemies.len(),
        "Game data loaded"
    );
    Ok(data)
}

/// Load a battle config from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or holds an
/// unusable config.
pub fn load_config(path: &Path) -> Result<BattleConfig, DataLoadError> {
    let content = fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BattleConfig::from_ron_str(&content)?)
}
