//! Scripted player strategies for headless playtesting.
//!
//! A strategy makes the decisions a human would: which card to deploy on
//! which character during summon, and which units to pause during
//! set-actions. Everything else is pressing advance and letting glides
//! finish.

use serde::{Deserialize, Serialize};
use tactics_core::battle::Battle;
use tactics_core::board::BoardCoord;
use tactics_core::components::{Intent, Side};
use tactics_core::events::{MatchOutcome, MatchStats};
use tactics_core::input::Input;
use tactics_core::math::Fixed;
use tactics_core::movement::next_target;
use tactics_core::roster::RosterId;
use tactics_core::turn::Phase;

/// How the scripted player plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Never deploys; only advances phases.
    Passive,
    /// Deploys every turn with the healthiest character, never pauses.
    #[default]
    Greedy,
    /// Deploys like greedy and pauses units about to bounce off an enemy
    /// that would survive the hit.
    Cautious,
}

impl Strategy {
    /// Lowercase name, as accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Greedy => "greedy",
            Self::Cautious => "cautious",
        }
    }
}

/// Result of one auto-played match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Battle seed.
    pub seed: u64,
    /// Strategy used.
    pub strategy: Strategy,
    /// Final outcome, `None` if the step budget ran out first.
    pub outcome: Option<MatchOutcome>,
    /// Counters at the end.
    pub stats: MatchStats,
    /// Frames run.
    pub frames: u64,
    /// Strategy steps taken.
    pub steps: u64,
    /// State hash at the end.
    pub final_hash: u64,
}

/// Simulated time per update while auto-playing.
#[must_use]
pub fn step_delta() -> Fixed {
    Fixed::from_num(1) / Fixed::from_num(20)
}

/// Take one decision, then press advance or run one update.
pub fn step(battle: &mut Battle, strategy: Strategy) {
    match battle.phase() {
        Phase::Summon if strategy != Strategy::Passive => {
            if let Some((slot, roster)) = choose_deployment(battle) {
                if battle.deploy(slot, roster) {
                    return;
                }
            }
        }
        Phase::SetActions if strategy == Strategy::Cautious => {
            for (tile, intent) in plan_intents(battle) {
                if battle.intent_at(tile) != Some(intent) {
                    battle.toggle_intent(tile);
                }
            }
        }
        _ => {}
    }

    if !battle.handle_input(Input::Advance) {
        battle.update(step_delta());
    }
}

/// First visible card whose entry tile is open, paired with the healthiest
/// available character.
#[must_use]
pub fn choose_deployment(battle: &Battle) -> Option<(usize, RosterId)> {
    let roster = battle
        .roster()
        .iter()
        .filter(|(_, entry)| entry.available())
        .max_by_key(|(id, entry)| (entry.stats.health, std::cmp::Reverse(id.0)))
        .map(|(id, _)| id)?;

    let start = battle.config().player_start;
    let slot = battle.pool().items().iter().enumerate().find_map(|(slot, item)| {
        let first = battle.data().player_cards.get(item.card)?.step(0)?;
        let at = start.offset(first.x, first.y);
        let open = battle.board().contains(at) && battle.board().occupant(at).is_none();
        (item.visible && open).then_some(slot)
    })?;
    Some((slot, roster))
}

/// Intent for every player unit: pause when the next tile holds an enemy
/// the unit cannot kill, play otherwise.
#[must_use]
pub fn plan_intents(battle: &Battle) -> Vec<(BoardCoord, Intent)> {
    let start = battle.config().player_start;
    battle
        .unit_ids(Side::Player)
        .into_iter()
        .filter_map(|id| {
            let unit = battle.entities().unit(id)?;
            let card = battle.data().card(unit.card)?;
            let power = battle.unit_stats(id)?.power;
            let (_, target) = next_target(card, unit, start)?;

            let bounces = battle
                .board()
                .occupant(target)
                .filter(|&other| {
                    battle
                        .entities()
                        .unit(other)
                        .is_some_and(|u| u.owner.side() == Side::Enemy)
                })
                .and_then(|enemy| battle.unit_stats(enemy))
                .is_some_and(|stats| stats.health > power);

            let intent = if bounces { Intent::Pause } else { Intent::Play };
            Some((unit.board_pos, intent))
        })
        .collect()
}

/// Play `battle` with `strategy` until defeat or `max_steps`.
#[must_use]
pub fn play_match(mut battle: Battle, strategy: Strategy, max_steps: u64) -> MatchReport {
    let mut steps = 0;
    while steps < max_steps && !battle.is_over() {
        step(&mut battle, strategy);
        steps += 1;
    }
    // Events are only for presentation.
    battle.take_events();

    let report = MatchReport {
        seed: battle.config().seed,
        strategy,
        outcome: battle.outcome(),
        stats: battle.stats(),
        frames: battle.frame(),
        steps,
        final_hash: battle.state_hash(),
    };
    tracing::debug!(
        seed = report.seed,
        strategy = strategy.name(),
        over = report.outcome.is_some(),
        turns = report.stats.turn_count,
        "Match finished"
    );
    report
}
