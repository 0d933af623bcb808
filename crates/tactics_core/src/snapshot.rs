//! Serializable view of a battle for presentation layers.

use serde::{Deserialize, Serialize};

use crate::battle::Battle;
use crate::board::{BoardCoord, PendingSpawn};
use crate::components::{Facing, Intent, Owner};
use crate::events::{MatchOutcome, MatchStats};
use crate::math::Vec2Fixed;
use crate::roster::RosterId;
use crate::storage::EntityId;
use crate::turn::Phase;

/// One tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    /// Address.
    pub coord: BoardCoord,
    /// World-space center.
    pub center: Vec2Fixed,
    /// Unit on the tile.
    pub occupant: Option<EntityId>,
    /// Marked by the last enemy AI pass.
    pub player_threatens: bool,
    /// Enemy arriving next spawn phase.
    pub pending_spawn: Option<PendingSpawn>,
}

/// One unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    /// Entity.
    pub entity: EntityId,
    /// Owner.
    pub owner: Owner,
    /// Name of the card it walks.
    pub card: String,
    /// Tile.
    pub board_pos: BoardCoord,
    /// Current card step.
    pub step_index: usize,
    /// Play or pause.
    pub intent: Intent,
    /// Sprite orientation.
    pub facing: Facing,
    /// Current world position (mid-glide positions included).
    pub position: Vec2Fixed,
    /// Current health.
    pub health: u32,
    /// Health cap.
    pub max_health: u32,
    /// Damage dealt.
    pub power: u32,
    /// Portrait id.
    pub portrait: String,
}

/// One attack effect in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectView {
    /// Entity.
    pub entity: EntityId,
    /// Tile being hit.
    pub tile: BoardCoord,
    /// Current world position.
    pub position: Vec2Fixed,
}

/// One pool slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    /// Slot index.
    pub slot: usize,
    /// Card name.
    pub name: String,
    /// Shown in the pool.
    pub visible: bool,
    /// Can be picked up.
    pub pickable: bool,
}

/// One roster character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterView {
    /// Roster id.
    pub id: RosterId,
    /// Portrait id.
    pub portrait: String,
    /// Current health.
    pub health: u32,
    /// Health cap.
    pub max_health: u32,
    /// Damage dealt.
    pub power: u32,
    /// On the board.
    pub deployed: bool,
    /// Dead for good.
    pub dead: bool,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Current phase.
    pub phase: Phase,
    /// Frames run.
    pub frame: u64,
    /// Board rows.
    pub rows: i32,
    /// Board columns.
    pub cols: i32,
    /// Match counters.
    pub stats: MatchStats,
    /// Set once the match is over.
    pub outcome: Option<MatchOutcome>,
    /// Tiles, row-major.
    pub tiles: Vec<TileView>,
    /// Units, in creation order.
    pub units: Vec<UnitView>,
    /// Attack effects in flight.
    pub effects: Vec<EffectView>,
    /// Card pool.
    pub cards: Vec<CardView>,
    /// Held pool slot.
    pub picked: Option<usize>,
    /// Player roster.
    pub roster: Vec<RosterView>,
}

impl BattleSnapshot {
    /// Units matching a predicate.
    pub fn units_where(&self, mut predicate: impl FnMut(&UnitView) -> bool) -> impl Iterator<Item = &UnitView> {
        self.units.iter().filter(move |u| predicate(u))
    }
}

impl Battle {
    /// Capture the presentation state.
    #[must_use]
    pub fn snapshot(&self) -> BattleSnapshot {
        let tiles = self
            .board
            .tiles()
            .map(|t| TileView {
                coord: t.coord,
                center: t.center,
                occupant: t.occupant,
                player_threatens: t.player_threatens,
                pending_spawn: t.pending_spawn,
            })
            .collect();

        let mut units = Vec::new();
        let mut effects = Vec::new();
        for id in self.entities.sorted_ids() {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            let position = entity.transform.map(|t| t.position).unwrap_or_default();
            if let Some(unit) = entity.unit {
                let stats = self.unit_stats(id);
                units.push(UnitView {
                    entity: id,
                    owner: unit.owner,
                    card: self
                        .data
                        .card(unit.card)
                        .map(|c| c.name.clone())
                        .unwrap_or_default(),
                    board_pos: unit.board_pos,
                    step_index: unit.step_index,
                    intent: unit.intent,
                    facing: unit.facing,
                    position,
                    health: stats.map_or(0, |s| s.health),
                    max_health: stats.map_or(0, |s| s.max_health),
                    power: stats.map_or(0, |s| s.power),
                    portrait: stats.map(|s| s.portrait.clone()).unwrap_or_default(),
                });
            }
            if let Some(effect) = entity.effect {
                effects.push(EffectView {
                    entity: id,
                    tile: effect.tile,
                    position,
                });
            }
        }

        let cards = self
            .pool
            .items()
            .iter()
            .enumerate()
            .map(|(slot, item)| CardView {
                slot,
                name: self
                    .data
                    .player_cards
                    .get(item.card)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                visible: item.visible,
                pickable: item.pickable,
            })
            .collect();

        let roster = self
            .roster
            .iter()
            .map(|(id, entry)| RosterView {
                id,
                portrait: entry.stats.portrait.clone(),
                health: entry.stats.health,
                max_health: entry.stats.max_health,
                power: entry.stats.power,
                deployed: entry.deployed,
                dead: entry.dead,
            })
            .collect();

        BattleSnapshot {
            phase: self.phase(),
            frame: self.frame(),
            rows: self.board.rows(),
            cols: self.board.cols(),
            stats: self.stats(),
            outcome: self.outcome(),
            tiles,
            units,
            effects,
            cards,
            picked: self.pool.picked(),
            roster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::data::{CharacterData, GameData, MovementCard, MovementStep};

    fn battle() -> Battle {
        let data = GameData {
            player_cards: vec![MovementCard::new("down", vec![MovementStep::walk(0, -1)])],
            enemy_cards: Vec::new(),
            characters: vec![CharacterData {
                max_health: 2,
                power: 1,
                portrait: "knight".to_string(),
                attack_pattern: Vec::new(),
            }],
            enemies: Vec::new(),
        };
        let config = BattleConfig::default().with_board(4, 3, BoardCoord::new(3, 1));
        Battle::new(config, data).unwrap()
    }

    #[test]
    fn test_snapshot_lists_board_and_pool() {
        let b = battle();
        let snap = b.snapshot();
        assert_eq!(snap.phase, Phase::Summon);
        assert_eq!(snap.tiles.len(), 12);
        assert_eq!(snap.cards.len(), 1);
        assert_eq!(snap.cards[0].name, "down");
        assert!(snap.units.is_empty());
        assert_eq!(snap.roster[0].portrait, "knight");
    }

    #[test]
    fn test_snapshot_shows_deployed_unit() {
        let mut b = battle();
        assert!(b.deploy(0, RosterId(0)));
        let snap = b.snapshot();
        assert_eq!(snap.units.len(), 1);
        let unit = &snap.units[0];
        assert_eq!(unit.board_pos, BoardCoord::new(2, 1));
        assert_eq!(unit.health, 2);
        assert_eq!(unit.card, "down");
        assert!(snap.roster[0].deployed);
        assert!(!snap.cards[0].visible);
        assert_eq!(snap.units_where(|u| u.owner.is_player()).count(), 1);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let b = battle();
        let json = serde_json::to_string(&b.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Summon\""));
    }
}
