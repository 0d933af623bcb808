//! # Tactics Core
//!
//! Turn-based board combat core for the card-path tactics game.
//!
//! This crate contains **only** gameplay logic:
//! - No rendering
//! - No audio
//! - No file IO (asset data arrives already deserialized)
//! - No floating-point math (uses fixed-point)
//! - No unseeded randomness
//!
//! Units deployed from movement cards walk their card's path one step per
//! phase, collide with each other, attack, return to hand, and die. Enemies
//! are rolled from weighted templates and steered by a small threat-based AI.
//! A strict phase machine sequences it all.
//!
//! ## Crate Structure
//!
//! - [`board`] - Grid tiles and occupancy
//! - [`storage`] - Entity storage with optional components
//! - [`components`] - Unit, glide and stat components
//! - [`data`] - Movement card and character templates
//! - [`roster`] - Player characters that live outside the board
//! - [`deck`] - Deployment pool of movement cards
//! - [`movement`] - Movement wave resolution
//! - [`combat`] - Damage, pattern attacks, return-to-hand
//! - [`spawn`] - Enemy spawn reservation and weighted rolls
//! - [`ai`] - Enemy threat evaluation
//! - [`animation`] - Glides and attack effects
//! - [`turn`] - Phase state machine
//! - [`battle`] - The owning match state and per-frame update
//! - [`snapshot`] - Serializable presentation view
//! - [`config`] - Board size, caps, glide timings and seed

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod animation;
pub mod battle;
pub mod board;
pub mod combat;
pub mod components;
pub mod config;
pub mod data;
pub mod deck;
pub mod error;
pub mod events;
pub mod input;
pub mod math;
pub mod movement;
pub mod roster;
pub mod snapshot;
pub mod spawn;
pub mod storage;
pub mod turn;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::Battle;
    pub use crate::board::{Board, BoardCoord, PendingSpawn, Tile};
    pub use crate::components::{CardRef, CharacterStats, Intent, Owner, Side, Unit};
    pub use crate::config::{BattleConfig, SpawnCadence};
    pub use crate::data::{AttackOffset, CharacterData, EnemyData, GameData, MovementCard, MovementStep};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{BattleEvent, MatchOutcome, MatchStats};
    pub use crate::input::Input;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::roster::RosterId;
    pub use crate::snapshot::BattleSnapshot;
    pub use crate::storage::EntityId;
    pub use crate::turn::Phase;
}
