//! Enemy spawn reservation and weighted rolls.
//!
//! Enemies appear with a one-phase delay: a spawn phase first materializes
//! every enemy reserved by the previous one, then (below the enemy cap)
//! rolls a new template and reserves its entry tile.

use rand::Rng;

use crate::battle::Battle;
use crate::board::PendingSpawn;
use crate::components::{CardRef, Owner, Side};
use crate::events::BattleEvent;

/// Pick an index by cumulative weight.
///
/// Draws a roll uniformly in `0..total` and walks the weights until the roll
/// falls inside one. Returns `None` when every weight is zero.
pub fn weighted_pick<R: Rng + ?Sized>(weights: &[u32], rng: &mut R) -> Option<usize> {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for (i, &weight) in weights.iter().enumerate() {
        let weight = u64::from(weight);
        if roll < weight {
            return Some(i);
        }
        roll -= weight;
    }
    None
}

impl Battle {
    /// Spawn phase entry action.
    pub(crate) fn spawn_enemy(&mut self) {
        self.materialize_pending();

        let live = self.unit_ids(Side::Enemy).len();
        if live < self.config.enemy_cap {
            self.roll_spawn();
        } else {
            tracing::debug!(live, cap = self.config.enemy_cap, "Enemy cap reached; no spawn roll");
        }
    }

    fn materialize_pending(&mut self) {
        let pending: Vec<_> = self.board.pending_spawns().collect();
        for (at, spawn) in pending {
            if self.board.occupant(at).is_some() {
                continue;
            }
            let owner = Owner::Enemy {
                template: spawn.enemy,
            };
            match self.spawn_unit(owner, CardRef::Enemy(spawn.card), at) {
                Ok(entity) => {
                    if let Ok(tile) = self.board.tile_mut(at) {
                        tile.pending_spawn = None;
                    }
                    self.events.push(BattleEvent::EnemySpawned {
                        entity,
                        template: spawn.enemy,
                        at,
                    });
                    tracing::info!(entity, template = spawn.enemy, tile = %at, "Enemy spawned");
                }
                Err(err) => tracing::error!(tile = %at, error = %err, "Failed to spawn enemy"),
            }
        }
    }

    fn roll_spawn(&mut self) {
        let template = match self.config.spawn_cadence.forced_for(self.enemies_spawned) {
            Some(forced) => forced,
            None => {
                let weights: Vec<u32> = self.data.enemies.iter().map(|e| e.random_weight).collect();
                let Some(picked) = weighted_pick(&weights, &mut self.rng) else {
                    tracing::warn!("Enemy spawn weights sum to zero; roll dropped");
                    return;
                };
                picked
            }
        };
        let Some(enemy) = self.data.enemies.get(template) else {
            tracing::warn!(template, "Spawn roll picked a missing template; roll dropped");
            return;
        };
        if enemy.moves.is_empty() {
            tracing::warn!(template, "Enemy template has no moves; roll dropped");
            return;
        }

        let name = &enemy.moves[self.rng.random_range(0..enemy.moves.len())];
        let Some((card, first)) = self
            .data
            .enemy_card_by_name(name)
            .and_then(|(i, c)| c.step(0).map(|s| (i, *s)))
        else {
            tracing::warn!(template, card = %name, "Enemy move does not name a card; roll dropped");
            return;
        };

        let at = self.config.player_start.offset(first.x, first.y);
        if !self.board.contains(at) {
            tracing::warn!(template, card, tile = %at, "Enemy entry tile off the board; roll dropped");
            return;
        }
        if !self.board.is_free(at) {
            tracing::debug!(template, tile = %at, "Enemy entry tile taken; roll dropped");
            return;
        }

        if let Ok(tile) = self.board.tile_mut(at) {
            tile.pending_spawn = Some(PendingSpawn {
                enemy: template,
                card,
            });
        }
        self.enemies_spawned += 1;
        self.events.push(BattleEvent::SpawnReserved { at, template, card });
        tracing::info!(template, card, tile = %at, spawned = self.enemies_spawned, "Enemy spawn reserved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_weighted_pick_zero_total() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(weighted_pick(&[0, 0], &mut rng), None);
        assert_eq!(weighted_pick(&[], &mut rng), None);
    }

    #[test]
    fn test_weighted_pick_skips_zero_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(weighted_pick(&[0, 3, 0], &mut rng), Some(1));
        }
    }

    #[test]
    fn test_weighted_pick_frequencies() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let weights = [1, 3, 6];
        let mut counts = [0u32; 3];
        let draws = 20_000;
        for _ in 0..draws {
            let i = weighted_pick(&weights, &mut rng).unwrap();
            counts[i] += 1;
        }
        for (count, weight) in counts.iter().zip(weights) {
            let observed = f64::from(*count) / f64::from(draws);
            let expected = f64::from(weight) / 10.0;
            assert!((observed - expected).abs() < 0.02, "observed {observed}, expected {expected}");
        }
    }

    #[test]
    fn test_weighted_pick_total_above_u32() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut counts = [0u32; 3];
        for _ in 0..1_000 {
            counts[weighted_pick(&[u32::MAX, u32::MAX, 0], &mut rng).unwrap()] += 1;
        }
        assert_eq!(counts[2], 0);
        assert!(counts[0] > 400 && counts[1] > 400, "{counts:?}");
    }

    #[test]
    fn test_weighted_pick_is_seeded() {
        let mut a = ChaCha8Rng::seed_from_u64(3);
        let mut b = ChaCha8Rng::seed_from_u64(3);
        let xs: Vec<_> = (0..50).map(|_| weighted_pick(&[2, 5, 1], &mut a)).collect();
        let ys: Vec<_> = (0..50).map(|_| weighted_pick(&[2, 5, 1], &mut b)).collect();
        assert_eq!(xs, ys);
    }
}
