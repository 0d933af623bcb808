//! Events emitted by the battle for animation and audio cues.

use serde::{Deserialize, Serialize};

use crate::board::BoardCoord;
use crate::components::Owner;
use crate::roster::RosterId;
use crate::storage::EntityId;
use crate::turn::Phase;

/// Counters reported when the match ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MatchStats {
    /// Enemy spawns successfully reserved.
    pub enemies_spawned: u32,
    /// Completed turns.
    pub turn_count: u32,
    /// Kills of the cadence-forced template.
    pub bosses_defeated: u32,
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Every roster character died.
    Defeat(MatchStats),
}

/// Something that happened during the last update or input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    /// The turn controller entered a new phase.
    PhaseChanged {
        /// Phase left.
        from: Phase,
        /// Phase entered.
        to: Phase,
    },
    /// A card was paired with a roster character and placed on the board.
    CardPlaced {
        /// New unit.
        entity: EntityId,
        /// Character deployed.
        roster: RosterId,
        /// Player card slot.
        card: usize,
        /// Entry tile.
        at: BoardCoord,
    },
    /// A unit stepped to a new tile.
    UnitMoved {
        /// Unit.
        entity: EntityId,
        /// Tile left.
        from: BoardCoord,
        /// Tile entered.
        to: BoardCoord,
    },
    /// A unit walked into an enemy and bounced back.
    UnitBounced {
        /// Unit.
        entity: EntityId,
        /// Tile it bounced off.
        toward: BoardCoord,
    },
    /// A collision dealt damage.
    CollisionHit {
        /// Moving unit.
        attacker: EntityId,
        /// Unit in the way.
        defender: EntityId,
        /// Damage dealt.
        damage: u32,
    },
    /// A unit landed on an attack step and struck its pattern.
    PatternAttack {
        /// Attacking unit.
        attacker: EntityId,
        /// In-bounds tiles hit.
        tiles: Vec<BoardCoord>,
    },
    /// A unit died.
    UnitKilled {
        /// Unit.
        entity: EntityId,
        /// Its owner.
        owner: Owner,
        /// Tile it died on.
        at: BoardCoord,
    },
    /// A player unit finished its loop after a kill and returned to hand.
    UnitReturned {
        /// Unit.
        entity: EntityId,
        /// Character returned.
        roster: RosterId,
    },
    /// A spawn tile was reserved for the next spawn phase.
    SpawnReserved {
        /// Reserved tile.
        at: BoardCoord,
        /// Enemy template.
        template: usize,
        /// Enemy card.
        card: usize,
    },
    /// A reserved enemy appeared.
    EnemySpawned {
        /// New unit.
        entity: EntityId,
        /// Enemy template.
        template: usize,
        /// Tile.
        at: BoardCoord,
    },
    /// The match was lost.
    Defeat {
        /// Final counters.
        stats: MatchStats,
    },
}
