//! Component definitions.
//!
//! Components are pure data with no behavior beyond small helpers. All
//! battle entities are composed of these components.

use serde::{Deserialize, Serialize};

use crate::board::BoardCoord;
use crate::data::{AttackOffset, CharacterData};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::roster::RosterId;
use crate::storage::EntityId;

// ============================================================================
// Unit Identity
// ============================================================================

/// What a unit does when its side's movement wave runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Intent {
    /// Advance along the card.
    #[default]
    Play,
    /// Hold position for this wave.
    Pause,
}

impl Intent {
    /// The other intent.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Play => Self::Pause,
            Self::Pause => Self::Play,
        }
    }
}

/// Who a unit belongs to, and where its stats live.
///
/// Player units read and write the stats of their roster entry; enemy units
/// carry their own [`CharacterStats`] component, instanced from `template`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Deployed from the player roster.
    Player(RosterId),
    /// Spawned from an enemy template.
    Enemy {
        /// Index into the enemy template table.
        template: usize,
    },
}

impl Owner {
    /// Unit is controlled by the player.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Self::Player(_))
    }

    /// Side this owner fights on.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::Player(_) => Side::Player,
            Self::Enemy { .. } => Side::Enemy,
        }
    }
}

/// One of the two opposing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Player-controlled units.
    Player,
    /// Enemy units.
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Reference into one of the two movement card tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRef {
    /// Player card table.
    Player(usize),
    /// Enemy card table.
    Enemy(usize),
}

/// Sprite orientation after the last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Moved toward higher rows.
    #[default]
    Up,
    /// Moved toward lower rows.
    Down,
    /// Moved toward lower columns.
    Left,
    /// Moved toward higher columns.
    Right,
}

impl Facing {
    /// Facing for a world-space movement delta. Horizontal wins only when strictly larger.
    #[must_use]
    pub fn from_delta(delta: Vec2Fixed) -> Self {
        if delta.x.abs() > delta.y.abs() {
            if delta.x > Fixed::ZERO {
                Self::Right
            } else {
                Self::Left
            }
        } else if delta.y > Fixed::ZERO {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// A unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Owning side and stats location.
    pub owner: Owner,
    /// Movement card this unit walks.
    pub card: CardRef,
    /// Tile the unit stands on.
    pub board_pos: BoardCoord,
    /// Index of the card step that brought the unit here.
    pub step_index: usize,
    /// Moved during the current wave.
    pub did_move: bool,
    /// Play or pause for the next wave.
    pub intent: Intent,
    /// Presentation hint.
    pub facing: Facing,
}

impl Unit {
    /// Fresh unit at step 0 of its card.
    #[must_use]
    pub const fn new(owner: Owner, card: CardRef, board_pos: BoardCoord, facing: Facing) -> Self {
        Self {
            owner,
            card,
            board_pos,
            step_index: 0,
            did_move: false,
            intent: Intent::Play,
            facing,
        }
    }

    /// Unit is controlled by the player.
    #[must_use]
    pub const fn player_controlled(&self) -> bool {
        self.owner.is_player()
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Mutable per-instance character stats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterStats {
    /// Health cap.
    pub max_health: u32,
    /// Current health.
    pub health: u32,
    /// Damage dealt.
    pub power: u32,
    /// Portrait / sprite identifier.
    pub portrait: String,
    /// Tiles hit by pattern attacks.
    pub attack_pattern: Vec<AttackOffset>,
    /// Scored a kill this loop; returns to hand at the end of the card.
    pub returning: bool,
}

impl CharacterStats {
    /// Full-health instance of a template.
    #[must_use]
    pub fn from_data(data: &CharacterData) -> Self {
        Self {
            max_health: data.max_health,
            health: data.max_health,
            power: data.power,
            portrait: data.portrait.clone(),
            attack_pattern: data.attack_pattern.clone(),
            returning: false,
        }
    }

    /// Subtract health, saturating at zero. Returns `true` if this killed the unit.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.health == 0
    }
}

// ============================================================================
// Presentation Components
// ============================================================================

/// World-space position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Current position.
    pub position: Vec2Fixed,
}

/// Timed glide toward a target, with an optional return leg.
///
/// Every frame the position closes `delta / remaining` of the gap to the
/// target. When the outbound leg runs out the return leg (if any) takes
/// over, inheriting the overshoot; on completion the position snaps to the
/// final target and the component is removed, or the entity is destroyed if
/// `despawn_on_arrival` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locomotion {
    /// Outbound target.
    pub target: Vec2Fixed,
    /// Remaining outbound time in seconds.
    #[serde(with = "fixed_serde")]
    pub duration: Fixed,
    /// Target of the return leg.
    pub return_target: Option<Vec2Fixed>,
    /// Remaining return time in seconds.
    #[serde(with = "fixed_serde")]
    pub return_duration: Fixed,
    /// Destroy the entity when the glide completes.
    pub despawn_on_arrival: bool,
}

impl Locomotion {
    /// One-way glide.
    #[must_use]
    pub const fn glide(target: Vec2Fixed, duration: Fixed) -> Self {
        Self {
            target,
            duration,
            return_target: None,
            return_duration: Fixed::ZERO,
            despawn_on_arrival: false,
        }
    }

    /// Out-and-back glide that ends where it started.
    #[must_use]
    pub const fn bounce(toward: Vec2Fixed, home: Vec2Fixed, leg: Fixed) -> Self {
        Self {
            target: toward,
            duration: leg,
            return_target: Some(home),
            return_duration: leg,
            despawn_on_arrival: false,
        }
    }

    /// One-way glide that destroys its entity on arrival.
    #[must_use]
    pub const fn projectile(target: Vec2Fixed, duration: Fixed) -> Self {
        Self {
            target,
            duration,
            return_target: None,
            return_duration: Fixed::ZERO,
            despawn_on_arrival: true,
        }
    }
}

/// Transient visual for one tile hit by a pattern attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackEffect {
    /// Unit that attacked.
    pub attacker: EntityId,
    /// Tile being hit.
    pub tile: BoardCoord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_toggle() {
        assert_eq!(Intent::Play.toggled(), Intent::Pause);
        assert_eq!(Intent::Pause.toggled(), Intent::Play);
        assert_eq!(Intent::default(), Intent::Play);
    }

    #[test]
    fn test_facing_from_delta() {
        assert_eq!(Facing::from_delta(Vec2Fixed::from_ints(2, 1)), Facing::Right);
        assert_eq!(Facing::from_delta(Vec2Fixed::from_ints(-2, 1)), Facing::Left);
        assert_eq!(Facing::from_delta(Vec2Fixed::from_ints(0, 1)), Facing::Up);
        assert_eq!(Facing::from_delta(Vec2Fixed::from_ints(0, -1)), Facing::Down);
        // Diagonal ties go vertical.
        assert_eq!(Facing::from_delta(Vec2Fixed::from_ints(1, 1)), Facing::Up);
    }

    #[test]
    fn test_take_damage_saturates() {
        let mut stats = CharacterStats::from_data(&CharacterData {
            max_health: 2,
            power: 1,
            portrait: "x".to_string(),
            attack_pattern: Vec::new(),
        });
        assert_eq!(stats.health, 2);
        assert!(!stats.take_damage(1));
        assert!(stats.take_damage(5));
        assert_eq!(stats.health, 0);
    }

    #[test]
    fn test_owner_side() {
        assert!(Owner::Player(RosterId(0)).is_player());
        assert!(!Owner::Enemy { template: 1 }.is_player());
        assert_eq!(Owner::Enemy { template: 1 }.side(), Side::Enemy);
        assert_eq!(Side::Player.opponent(), Side::Enemy);
    }
}
