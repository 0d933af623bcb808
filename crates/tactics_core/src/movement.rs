//! Movement wave resolution.
//!
//! One wave advances every unit of one side by one card step. Units try to
//! move in creation order; a unit whose destination holds a friendly unit is
//! deferred and retried after the rest of the side has moved, pass after
//! pass, until a pass frees nobody (deadlock) or every unit has resolved.
//! Walking into an enemy is a collision attack: the mover takes the tile if
//! the defender dies and bounces back otherwise.

use crate::battle::Battle;
use crate::board::BoardCoord;
use crate::components::{Facing, Intent, Locomotion, Side, Unit};
use crate::data::MovementCard;
use crate::error::Result;
use crate::events::BattleEvent;
use crate::storage::EntityId;

/// Result of one move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAttempt {
    /// The unit stepped onto its next tile.
    Moved,
    /// The unit killed the defender and took its tile.
    Overran,
    /// The unit hit a surviving defender and stayed put.
    Bounced,
    /// A friendly unit is in the way; retry later in the wave.
    Blocked,
    /// The move cannot happen this wave (off-board destination or bad data).
    Held,
}

impl MoveAttempt {
    /// The attempt is final for this wave.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Blocked)
    }
}

/// Summary of one movement wave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaveSummary {
    /// Units that changed tile.
    pub moved: usize,
    /// Units that bounced off a defender.
    pub bounced: usize,
    /// Deferred retry passes run.
    pub passes: usize,
    /// Units still blocked when the wave ended.
    pub deadlocked: usize,
}

/// Next step index and destination tile of a unit.
///
/// The loop restarts from `start`: when the next index wraps to 0 the
/// destination is `start` plus the first step, which is the card's entry
/// tile. Returns `None` for a card without steps.
#[must_use]
pub fn next_target(card: &MovementCard, unit: &Unit, start: BoardCoord) -> Option<(usize, BoardCoord)> {
    let next_index = card.next_index(unit.step_index);
    let step = card.step(next_index)?;
    let origin = if next_index == 0 { start } else { unit.board_pos };
    Some((next_index, origin.offset(step.x, step.y)))
}

impl Battle {
    /// Run one movement wave for `side`.
    ///
    /// The phase machine runs this on entering the autoplayer and enemy-move
    /// phases; calling it directly resolves a wave outside the cycle.
    pub fn move_units(&mut self, side: Side) -> WaveSummary {
        let mut summary = WaveSummary::default();
        let mut deferred = Vec::new();

        for id in self.unit_ids(side) {
            let Some(unit) = self.entities.unit_mut(id) else {
                continue;
            };
            unit.did_move = false;
            if unit.intent != Intent::Play {
                continue;
            }
            let attempt = self.try_move(id);
            summary.record(attempt);
            if !attempt.is_resolved() {
                deferred.push(id);
            }
        }

        let mut last_len = deferred.len();
        while last_len > 0 {
            summary.passes += 1;
            for id in std::mem::take(&mut deferred) {
                let attempt = self.try_move(id);
                summary.record(attempt);
                if !attempt.is_resolved() {
                    deferred.push(id);
                }
            }
            if deferred.len() == last_len {
                break;
            }
            last_len = deferred.len();
        }
        summary.deadlocked = deferred.len();

        tracing::debug!(
            side = ?side,
            moved = summary.moved,
            bounced = summary.bounced,
            passes = summary.passes,
            deadlocked = summary.deadlocked,
            "Movement wave resolved"
        );
        summary
    }

    fn try_move(&mut self, id: EntityId) -> MoveAttempt {
        match self.try_move_inner(id) {
            Ok(attempt) => attempt,
            Err(err) => {
                tracing::error!(entity = id, error = %err, "Move attempt failed");
                MoveAttempt::Held
            }
        }
    }

    fn try_move_inner(&mut self, id: EntityId) -> Result<MoveAttempt> {
        let Some(unit) = self.entities.unit(id).copied() else {
            return Ok(MoveAttempt::Held);
        };
        let Some((next_index, dest)) = self
            .data
            .card(unit.card)
            .and_then(|card| next_target(card, &unit, self.config.player_start))
        else {
            tracing::warn!(entity = id, card = ?unit.card, "Unit has no usable movement card");
            return Ok(MoveAttempt::Held);
        };
        if !self.board.contains(dest) {
            tracing::warn!(entity = id, from = %unit.board_pos, to = %dest, "Move destination off the board; holding");
            return Ok(MoveAttempt::Held);
        }

        let mut overran = false;
        if let Some(occupant) = self.board.occupant(dest) {
            let occupant_side = self.entities.unit(occupant).map(|u| u.owner.side());
            if occupant_side != Some(unit.owner.side().opponent()) {
                return Ok(MoveAttempt::Blocked);
            }

            let power = self.unit_stats(id).map_or(0, |s| s.power);
            self.events.push(BattleEvent::CollisionHit {
                attacker: id,
                defender: occupant,
                damage: power,
            });
            if !self.damage(occupant, power) {
                let home = self.board.center(unit.board_pos)?;
                let toward = self.board.center(dest)?;
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.locomotion = Some(Locomotion::bounce(toward, home, self.config.bounce_glide));
                }
                self.events.push(BattleEvent::UnitBounced { entity: id, toward: dest });
                return Ok(MoveAttempt::Bounced);
            }
            if unit.player_controlled() {
                if let Some(stats) = self.unit_stats_mut(id) {
                    stats.returning = true;
                }
            }
            overran = true;
        }

        let from_center = self.board.center(unit.board_pos)?;
        let to_center = self.board.center(dest)?;
        self.board.vacate(unit.board_pos)?;
        self.board.place(dest, id)?;

        if let Some(entity) = self.entities.get_mut(id) {
            if let Some(u) = entity.unit.as_mut() {
                u.board_pos = dest;
                u.step_index = next_index;
                u.facing = Facing::from_delta(to_center - from_center);
                u.did_move = true;
            }
            entity.locomotion = Some(Locomotion::glide(to_center, self.config.move_glide));
        }
        self.events.push(BattleEvent::UnitMoved {
            entity: id,
            from: unit.board_pos,
            to: dest,
        });

        Ok(if overran {
            MoveAttempt::Overran
        } else {
            MoveAttempt::Moved
        })
    }
}

impl WaveSummary {
    fn record(&mut self, attempt: MoveAttempt) {
        match attempt {
            MoveAttempt::Moved | MoveAttempt::Overran => self.moved += 1,
            MoveAttempt::Bounced => self.bounced += 1,
            MoveAttempt::Blocked | MoveAttempt::Held => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CardRef, Owner};
    use crate::data::MovementStep;
    use crate::roster::RosterId;

    fn unit_at(row: i32, col: i32, step_index: usize) -> Unit {
        let mut unit = Unit::new(
            Owner::Player(RosterId(0)),
            CardRef::Player(0),
            BoardCoord::new(row, col),
            Facing::Up,
        );
        unit.step_index = step_index;
        unit
    }

    fn card() -> MovementCard {
        MovementCard::new(
            "hook",
            vec![
                MovementStep::walk(0, -1),
                MovementStep::walk(0, -1),
                MovementStep::strike(1, 0),
            ],
        )
    }

    #[test]
    fn test_next_target_walks_from_current_tile() {
        let start = BoardCoord::new(3, 1);
        let target = next_target(&card(), &unit_at(2, 1, 0), start);
        assert_eq!(target, Some((1, BoardCoord::new(1, 1))));
    }

    #[test]
    fn test_next_target_wraps_to_entry_tile() {
        let start = BoardCoord::new(3, 1);
        let target = next_target(&card(), &unit_at(1, 2, 2), start);
        assert_eq!(target, Some((0, BoardCoord::new(2, 1))));
    }

    #[test]
    fn test_next_target_empty_card() {
        let empty = MovementCard::new("none", Vec::new());
        assert_eq!(next_target(&empty, &unit_at(0, 0, 0), BoardCoord::new(0, 0)), None);
    }

    #[test]
    fn test_blocked_is_only_unresolved_attempt() {
        assert!(!MoveAttempt::Blocked.is_resolved());
        assert!(MoveAttempt::Held.is_resolved());
        assert!(MoveAttempt::Bounced.is_resolved());
    }
}
