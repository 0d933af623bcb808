//! Damage, pattern attacks and return-to-hand.

use crate::battle::Battle;
use crate::components::{AttackEffect, CardRef, Locomotion, Owner, Side, Transform};
use crate::events::BattleEvent;
use crate::storage::{Entity, EntityId};

impl Battle {
    /// Deal `amount` damage to a unit. Returns `true` if it died.
    ///
    /// A dead player character is marked dead and its card goes back to the
    /// pool. The unit's tile is vacated and the entity is queued for
    /// destruction.
    pub(crate) fn damage(&mut self, id: EntityId, amount: u32) -> bool {
        let Some(unit) = self.entities.unit(id).copied() else {
            return false;
        };
        let Some(stats) = self.unit_stats_mut(id) else {
            tracing::error!(entity = id, "Damaged unit has no stats");
            return false;
        };
        let died = stats.take_damage(amount);
        let remaining = stats.health;
        tracing::debug!(entity = id, amount, remaining, "Unit damaged");
        if !died {
            return false;
        }

        match unit.owner {
            Owner::Player(roster) => {
                if let Some(entry) = self.roster.get_mut(roster) {
                    entry.deployed = false;
                    entry.dead = true;
                }
                if let CardRef::Player(card) = unit.card {
                    self.pool.reveal(card);
                }
            }
            Owner::Enemy { template } => {
                if self.config.spawn_cadence.forced_template == Some(template) {
                    self.bosses_defeated += 1;
                }
            }
        }

        if let Err(err) = self.board.vacate(unit.board_pos) {
            tracing::error!(entity = id, error = %err, "Dead unit stood off the board");
        }
        self.retire_unit(id);
        self.events.push(BattleEvent::UnitKilled {
            entity: id,
            owner: unit.owner,
            at: unit.board_pos,
        });
        tracing::info!(entity = id, owner = ?unit.owner, tile = %unit.board_pos, "Unit killed");
        true
    }

    /// Pattern attacks for every unit of `side` that moved onto an attack step.
    pub(crate) fn do_attacks(&mut self, side: Side) {
        for id in self.unit_ids(side) {
            let Some(unit) = self.entities.unit(id).copied() else {
                continue;
            };
            if !unit.did_move {
                continue;
            }
            let is_attack_step = self
                .data
                .card(unit.card)
                .and_then(|card| card.step(unit.step_index))
                .is_some_and(|step| step.attack);
            if !is_attack_step {
                continue;
            }
            let Some((pattern, power)) = self
                .unit_stats(id)
                .map(|s| (s.attack_pattern.clone(), s.power))
            else {
                continue;
            };
            let Ok(origin) = self.board.center(unit.board_pos) else {
                tracing::error!(entity = id, tile = %unit.board_pos, "Attacker stands off the board");
                continue;
            };

            let mut tiles = Vec::with_capacity(pattern.len());
            for offset in pattern {
                let tile = unit.board_pos.offset(offset.x, offset.y);
                let Ok(target_center) = self.board.center(tile) else {
                    continue;
                };
                tiles.push(tile);

                self.entities.insert(
                    Entity::new()
                        .with_transform(Transform { position: origin })
                        .with_locomotion(Locomotion::projectile(target_center, self.config.attack_glide))
                        .with_effect(AttackEffect { attacker: id, tile }),
                );

                let Some(target) = self.board.occupant(tile) else {
                    continue;
                };
                let target_side = self.entities.unit(target).map(|u| u.owner.side());
                if target_side == Some(side.opponent())
                    && self.damage(target, power)
                    && unit.player_controlled()
                {
                    if let Some(stats) = self.unit_stats_mut(id) {
                        stats.returning = true;
                    }
                }
            }

            tracing::debug!(entity = id, tiles = tiles.len(), "Pattern attack");
            self.events.push(BattleEvent::PatternAttack { attacker: id, tiles });
        }
    }

    /// Return every player unit that finished its loop after scoring a kill.
    ///
    /// The character heals one point and gains one max health (each only
    /// below the configured cap), the card goes back to the pool and the
    /// unit leaves the board.
    pub(crate) fn return_units(&mut self) {
        let cap = self.config.return_stat_cap;
        for id in self.unit_ids(Side::Player) {
            let Some(unit) = self.entities.unit(id).copied() else {
                continue;
            };
            let (Owner::Player(roster), CardRef::Player(card)) = (unit.owner, unit.card) else {
                continue;
            };
            let Some(card_len) = self.data.player_cards.get(card).map(|c| c.len()) else {
                continue;
            };
            let Some(entry) = self.roster.get_mut(roster) else {
                continue;
            };
            if unit.step_index + 1 != card_len || !entry.stats.returning {
                continue;
            }

            entry.deployed = false;
            if entry.stats.health < cap {
                entry.stats.health += 1;
            }
            if entry.stats.max_health < cap {
                entry.stats.max_health += 1;
            }
            entry.stats.returning = false;
            let (health, max_health) = (entry.stats.health, entry.stats.max_health);

            self.pool.reveal(card);
            if let Err(err) = self.board.vacate(unit.board_pos) {
                tracing::error!(entity = id, error = %err, "Returning unit stood off the board");
            }
            self.retire_unit(id);
            self.events.push(BattleEvent::UnitReturned { entity: id, roster });
            tracing::info!(entity = id, roster = %roster, health, max_health, "Unit returned to hand");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardCoord;
    use crate::config::BattleConfig;
    use crate::data::{AttackOffset, CharacterData, EnemyData, GameData, MovementCard, MovementStep};
    use crate::roster::RosterId;
    use crate::turn::Phase;

    fn character(max_health: u32, pattern: Vec<AttackOffset>) -> CharacterData {
        CharacterData {
            max_health,
            power: 1,
            portrait: "c".to_string(),
            attack_pattern: pattern,
        }
    }

    fn battle() -> Battle {
        let data = GameData {
            player_cards: vec![MovementCard::new(
                "strike",
                vec![MovementStep::walk(0, -1), MovementStep::strike(0, -1)],
            )],
            enemy_cards: vec![MovementCard::new("up", vec![MovementStep::walk(0, 1)])],
            characters: vec![character(1, vec![AttackOffset { x: 0, y: -1 }, AttackOffset { x: 0, y: -9 }])],
            enemies: vec![
                EnemyData {
                    character: character(2, Vec::new()),
                    moves: vec!["up".to_string()],
                    random_weight: 1,
                },
                EnemyData {
                    character: character(1, Vec::new()),
                    moves: vec!["up".to_string()],
                    random_weight: 1,
                },
                EnemyData {
                    character: character(1, Vec::new()),
                    moves: vec!["up".to_string()],
                    random_weight: 0,
                },
            ],
        };
        let config = BattleConfig::default().with_board(4, 3, BoardCoord::new(3, 1));
        Battle::new(config, data).unwrap()
    }

    fn enemy(b: &mut Battle, template: usize, row: i32, col: i32) -> EntityId {
        b.spawn_unit(Owner::Enemy { template }, CardRef::Enemy(0), BoardCoord::new(row, col))
            .unwrap()
    }

    #[test]
    fn test_damage_survivor_keeps_tile() {
        let mut b = battle();
        let id = enemy(&mut b, 0, 0, 0);
        assert!(!b.damage(id, 1));
        assert_eq!(b.unit_stats(id).unwrap().health, 1);
        assert_eq!(b.board.occupant(BoardCoord::new(0, 0)), Some(id));
    }

    #[test]
    fn test_damage_kill_vacates_and_queues() {
        let mut b = battle();
        let id = enemy(&mut b, 0, 0, 0);
        assert!(b.damage(id, 5));
        assert_eq!(b.board.occupant(BoardCoord::new(0, 0)), None);
        assert!(b.entities.unit(id).is_none());
        assert_eq!(b.destroy_queue.drain_sorted(), vec![id]);
        assert_eq!(b.bosses_defeated, 0);
    }

    #[test]
    fn test_killing_forced_template_counts_boss() {
        let mut b = battle();
        let id = enemy(&mut b, 2, 1, 1);
        assert!(b.damage(id, 1));
        assert_eq!(b.bosses_defeated, 1);
    }

    #[test]
    fn test_player_death_marks_roster_and_reveals_card() {
        let mut b = battle();
        assert!(b.deploy(0, RosterId(0)));
        let id = b.board.occupant(BoardCoord::new(2, 1)).unwrap();
        assert!(b.damage(id, 1));
        let entry = b.roster.get(RosterId(0)).unwrap();
        assert!(entry.dead);
        assert!(!entry.deployed);
        assert!(b.pool.item(0).unwrap().visible);
    }

    #[test]
    fn test_pattern_attack_hits_in_bounds_tiles_only() {
        let mut b = battle();
        assert!(b.deploy(0, RosterId(0)));
        let player = b.board.occupant(BoardCoord::new(2, 1)).unwrap();
        let target = enemy(&mut b, 1, 0, 1);
        {
            let unit = b.entities.unit_mut(player).unwrap();
            unit.board_pos = BoardCoord::new(1, 1);
            unit.step_index = 1;
            unit.did_move = true;
        }
        b.board.vacate(BoardCoord::new(2, 1)).unwrap();
        b.board.place(BoardCoord::new(1, 1), player).unwrap();

        b.do_attacks(Side::Player);

        assert!(b.entities.unit(target).is_none());
        assert!(b.roster.get(RosterId(0)).unwrap().stats.returning);
        // One effect for the in-bounds offset; the far one is skipped.
        assert_eq!(b.entities.count_where(|e| e.effect.is_some()), 1);
        assert_eq!(b.glide_count(), 1);
    }

    #[test]
    fn test_no_attack_without_move() {
        let mut b = battle();
        assert!(b.deploy(0, RosterId(0)));
        b.do_attacks(Side::Player);
        assert_eq!(b.entities.count_where(|e| e.effect.is_some()), 0);
    }

    #[test]
    fn test_return_heals_with_cap() {
        let mut b = battle();
        assert!(b.deploy(0, RosterId(0)));
        let id = b.board.occupant(BoardCoord::new(2, 1)).unwrap();
        b.entities.unit_mut(id).unwrap().step_index = 1;
        b.roster.get_mut(RosterId(0)).unwrap().stats.returning = true;
        assert_eq!(b.phase(), Phase::Attack);

        b.return_units();

        let entry = b.roster.get(RosterId(0)).unwrap();
        assert!(!entry.deployed);
        assert!(!entry.stats.returning);
        assert_eq!(entry.stats.health, 2);
        assert_eq!(entry.stats.max_health, 2);
        assert!(b.pool.item(0).unwrap().visible);
        assert_eq!(b.board.occupant(BoardCoord::new(2, 1)), None);

        b.roster.get_mut(RosterId(0)).unwrap().stats.health = 3;
        b.roster.get_mut(RosterId(0)).unwrap().stats.max_health = 3;
        let again = b
            .spawn_unit(Owner::Player(RosterId(0)), CardRef::Player(0), BoardCoord::new(2, 1))
            .unwrap();
        b.entities.unit_mut(again).unwrap().step_index = 1;
        b.roster.get_mut(RosterId(0)).unwrap().stats.returning = true;
        b.return_units();
        let entry = b.roster.get(RosterId(0)).unwrap();
        assert_eq!((entry.stats.health, entry.stats.max_health), (3, 3));
    }

    #[test]
    fn test_no_return_without_kill() {
        let mut b = battle();
        assert!(b.deploy(0, RosterId(0)));
        let id = b.board.occupant(BoardCoord::new(2, 1)).unwrap();
        b.entities.unit_mut(id).unwrap().step_index = 1;
        b.return_units();
        assert!(b.entities.unit(id).is_some());
        assert!(b.roster.get(RosterId(0)).unwrap().deployed);
    }
}
