//! Enemy threat evaluation.
//!
//! Before the enemy wave, every tile a player unit is about to step onto is
//! marked as threatened. Each enemy then picks its intent:
//!
//! | Enemy's tile | Enemy's next tile | Intent |
//! |--------------|-------------------|--------|
//! | threatened   | any               | Play   |
//! | safe         | threatened        | Pause  |
//! | safe         | safe              | Play   |

use crate::battle::Battle;
use crate::components::{Intent, Side};
use crate::movement::{next_target, WaveSummary};

impl Battle {
    /// Enemy-move phase entry action: decide intents, then run the enemy wave.
    pub(crate) fn enemy_ai(&mut self) -> WaveSummary {
        self.mark_threats();
        self.decide_enemy_intents();
        self.move_units(Side::Enemy)
    }

    /// Recompute `player_threatens` on every tile.
    ///
    /// A player unit threatens its next tile unless another player unit
    /// stands there.
    pub(crate) fn mark_threats(&mut self) {
        self.board.clear_threats();
        for id in self.unit_ids(Side::Player) {
            let Some(unit) = self.entities.unit(id).copied() else {
                continue;
            };
            let Some((_, next)) = self
                .data
                .card(unit.card)
                .and_then(|card| next_target(card, &unit, self.config.player_start))
            else {
                continue;
            };
            let held_by_player = self
                .board
                .occupant(next)
                .and_then(|occupant| self.entities.unit(occupant))
                .is_some_and(|u| u.player_controlled());
            if held_by_player {
                continue;
            }
            if let Ok(tile) = self.board.tile_mut(next) {
                tile.player_threatens = true;
            }
        }
    }

    fn decide_enemy_intents(&mut self) {
        for id in self.unit_ids(Side::Enemy) {
            let Some(unit) = self.entities.unit(id).copied() else {
                continue;
            };
            let threatened = |coord| {
                self.board
                    .tile(coord)
                    .is_ok_and(|tile| tile.player_threatens)
            };
            let next_threatened = self
                .data
                .card(unit.card)
                .and_then(|card| next_target(card, &unit, self.config.player_start))
                .is_some_and(|(_, next)| threatened(next));

            let intent = if threatened(unit.board_pos) {
                Intent::Play
            } else if next_threatened {
                Intent::Pause
            } else {
                Intent::Play
            };
            if let Some(u) = self.entities.unit_mut(id) {
                u.intent = intent;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardCoord;
    use crate::components::{CardRef, Owner};
    use crate::config::BattleConfig;
    use crate::data::{CharacterData, EnemyData, GameData, MovementCard, MovementStep};
    use crate::roster::RosterId;
    use crate::storage::EntityId;

    fn character() -> CharacterData {
        CharacterData {
            max_health: 3,
            power: 1,
            portrait: "c".to_string(),
            attack_pattern: Vec::new(),
        }
    }

    fn battle() -> Battle {
        let data = GameData {
            player_cards: vec![MovementCard::new(
                "south",
                vec![MovementStep::walk(0, -1), MovementStep::walk(0, -1), MovementStep::walk(0, -1)],
            )],
            enemy_cards: vec![MovementCard::new(
                "climb",
                vec![MovementStep::walk(0, 1), MovementStep::walk(0, 1)],
            )],
            characters: vec![character(), character()],
            enemies: vec![EnemyData {
                character: character(),
                moves: vec!["climb".to_string()],
                random_weight: 1,
            }],
        };
        let config = BattleConfig::default().with_board(4, 3, BoardCoord::new(3, 1));
        Battle::new(config, data).unwrap()
    }

    fn player(b: &mut Battle, roster: usize, row: i32, col: i32, step: usize) -> EntityId {
        let id = b
            .spawn_unit(
                Owner::Player(RosterId(roster)),
                CardRef::Player(0),
                BoardCoord::new(row, col),
            )
            .unwrap();
        b.entities.unit_mut(id).unwrap().step_index = step;
        id
    }

    fn enemy(b: &mut Battle, row: i32, col: i32, step: usize) -> EntityId {
        let id = b
            .spawn_unit(
                Owner::Enemy { template: 0 },
                CardRef::Enemy(0),
                BoardCoord::new(row, col),
            )
            .unwrap();
        b.entities.unit_mut(id).unwrap().step_index = step;
        id
    }

    #[test]
    fn test_player_threatens_next_tile() {
        let mut b = battle();
        player(&mut b, 0, 2, 1, 0);
        b.mark_threats();
        let threatened: Vec<BoardCoord> = b
            .board
            .tiles()
            .filter(|t| t.player_threatens)
            .map(|t| t.coord)
            .collect();
        assert_eq!(threatened, vec![BoardCoord::new(1, 1)]);
    }

    #[test]
    fn test_no_threat_on_friendly_tile() {
        let mut b = battle();
        player(&mut b, 0, 2, 1, 0);
        player(&mut b, 1, 1, 1, 1);
        b.mark_threats();
        assert!(!b.board.tile(BoardCoord::new(1, 1)).unwrap().player_threatens);
        // The front unit still threatens the tile ahead of it.
        assert!(b.board.tile(BoardCoord::new(0, 1)).unwrap().player_threatens);
    }

    #[test]
    fn test_threat_on_enemy_tile() {
        let mut b = battle();
        player(&mut b, 0, 2, 1, 0);
        let e = enemy(&mut b, 1, 1, 0);
        b.mark_threats();
        b.decide_enemy_intents();
        assert!(b.board.tile(BoardCoord::new(1, 1)).unwrap().player_threatens);
        assert_eq!(b.entities.unit(e).unwrap().intent, Intent::Play);
    }

    #[test]
    fn test_enemy_pauses_before_threatened_tile() {
        let mut b = battle();
        player(&mut b, 0, 2, 1, 0);
        let e = enemy(&mut b, 0, 1, 0);
        b.mark_threats();
        b.decide_enemy_intents();
        assert_eq!(b.entities.unit(e).unwrap().intent, Intent::Pause);
    }

    #[test]
    fn test_threats_cleared_each_pass() {
        let mut b = battle();
        let p = player(&mut b, 0, 2, 1, 0);
        b.mark_threats();
        b.retire_unit(p);
        b.board.vacate(BoardCoord::new(2, 1)).unwrap();
        b.mark_threats();
        assert!(b.board.tiles().all(|t| !t.player_threatens));
    }

    #[test]
    fn test_paused_enemy_holds_during_wave() {
        let mut b = battle();
        player(&mut b, 0, 2, 1, 0);
        let e = enemy(&mut b, 0, 1, 0);
        let summary = b.enemy_ai();
        assert_eq!(summary.moved, 0);
        assert_eq!(b.entities.unit(e).unwrap().board_pos, BoardCoord::new(0, 1));
    }
}
