//! Template data for movement cards and characters.
//!
//! This module contains pure data structures deserialized from the asset
//! files. Templates are shared read-only for the whole match; per-unit
//! mutable state lives in [`crate::components`] and [`crate::roster`].
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `tactics_headless`.

mod card_data;
mod character_data;
mod game_data;

pub use card_data::{MovementCard, MovementStep};
pub use character_data::{AttackOffset, CharacterData, EnemyData};
pub use game_data::GameData;
