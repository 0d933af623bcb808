//! Test fixtures and helpers.
//!
//! Pre-built card sets, characters and battles for consistent testing.
//! Every battle fixture uses a 4×3 board with the player start on the
//! top-middle tile (row 3, col 1), so cards stepping `(0,-1)` enter one
//! row below it. Row 0 is the bottom row, so fixture battles run mirrored
//! from the default config: player units walk down and enemies climb.

use fixed::types::I32F32;
use tactics_core::prelude::*;

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Frame time used by the drivers below.
#[must_use]
pub fn frame_delta() -> Fixed {
    fixed_f(0.05)
}

/// Player start tile of every fixture config.
pub const START: BoardCoord = BoardCoord::new(3, 1);

// ============================================================================
// Data
// ============================================================================

/// A card made of plain walking steps.
#[must_use]
pub fn walk_card(name: &str, steps: &[(i32, i32)]) -> MovementCard {
    MovementCard::new(
        name,
        steps.iter().map(|&(x, y)| MovementStep::walk(x, y)).collect(),
    )
}

/// The single-step card that walks one row south and repeats.
#[must_use]
pub fn straight_one() -> MovementCard {
    walk_card("straight-1", &[(0, -1)])
}

/// A character with no attack pattern.
#[must_use]
pub fn character(portrait: &str, max_health: u32, power: u32) -> CharacterData {
    CharacterData {
        max_health,
        power,
        portrait: portrait.to_string(),
        attack_pattern: Vec::new(),
    }
}

/// A character that hits the given tile offsets on attack steps.
#[must_use]
pub fn striker(portrait: &str, max_health: u32, power: u32, pattern: &[(i32, i32)]) -> CharacterData {
    CharacterData {
        attack_pattern: pattern.iter().map(|&(x, y)| AttackOffset { x, y }).collect(),
        ..character(portrait, max_health, power)
    }
}

/// An enemy template walking the named cards.
#[must_use]
pub fn enemy(character: CharacterData, moves: &[&str], random_weight: u32) -> EnemyData {
    EnemyData {
        character,
        moves: moves.iter().map(|m| (*m).to_string()).collect(),
        random_weight,
    }
}

/// A small but complete data set.
///
/// - Player cards: `straight-1`, `lance` (two walks south, then a strike),
///   `hook` (diagonal entry, walk, strike sideways)
/// - Enemy cards: `enemy-climb` and `enemy-zigzag`, both entering on row 0 and climbing
/// - Characters: knight (3 hp), archer (2 hp)
/// - Enemies: slime (weight 5), brute (weight 2), boss (weight 0, the
///   default forced template)
#[must_use]
pub fn standard_data() -> GameData {
    GameData {
        player_cards: vec![
            straight_one(),
            MovementCard::new(
                "lance",
                vec![
                    MovementStep::walk(0, -1),
                    MovementStep::walk(0, -1),
                    MovementStep::strike(0, -1),
                ],
            ),
            MovementCard::new(
                "hook",
                vec![
                    MovementStep::walk(1, -1),
                    MovementStep::walk(0, -1),
                    MovementStep::strike(-1, 0),
                ],
            ),
        ],
        enemy_cards: vec![
            walk_card("enemy-climb", &[(0, -3), (0, 1), (0, 1)]),
            walk_card("enemy-zigzag", &[(-1, -3), (1, 1), (-1, 1)]),
        ],
        characters: vec![
            striker("knight", 3, 1, &[(0, -1)]),
            striker("archer", 2, 1, &[(0, -2), (0, -1)]),
        ],
        enemies: vec![
            enemy(striker("slime", 1, 1, &[(0, 1)]), &["enemy-climb", "enemy-zigzag"], 5),
            enemy(striker("brute", 2, 1, &[(0, 1)]), &["enemy-climb"], 2),
            enemy(striker("boss", 3, 2, &[(-1, 1), (0, 1), (1, 1)]), &["enemy-climb"], 0),
        ],
    }
}

// ============================================================================
// Battles
// ============================================================================

/// Fixture config: 4×3 board, start at [`START`], default timings.
#[must_use]
pub fn test_config() -> BattleConfig {
    BattleConfig::default().with_board(4, 3, START)
}

/// A fresh battle on [`standard_data`].
#[must_use]
pub fn battle() -> Battle {
    battle_with(standard_data())
}

/// A fresh battle on [`standard_data`] with a given seed.
#[must_use]
pub fn battle_with_seed(seed: u64) -> Battle {
    Battle::new(test_config().with_seed(seed), standard_data()).expect("fixture battle is valid")
}

/// A fresh battle on custom data.
#[must_use]
pub fn battle_with(data: GameData) -> Battle {
    Battle::new(test_config(), data).expect("fixture battle is valid")
}

/// Put a player unit straight onto a tile.
pub fn place_player(battle: &mut Battle, roster: usize, card: usize, row: i32, col: i32) -> EntityId {
    battle
        .spawn_unit(
            Owner::Player(RosterId(roster)),
            CardRef::Player(card),
            BoardCoord::new(row, col),
        )
        .expect("player placement is valid")
}

/// Put an enemy unit straight onto a tile.
pub fn place_enemy(battle: &mut Battle, template: usize, card: usize, row: i32, col: i32) -> EntityId {
    battle
        .spawn_unit(
            Owner::Enemy { template },
            CardRef::Enemy(card),
            BoardCoord::new(row, col),
        )
        .expect("enemy placement is valid")
}

// ============================================================================
// Drivers
// ============================================================================

/// Run updates until no glide is active. Returns `false` on timeout.
pub fn settle(battle: &mut Battle, max_frames: usize) -> bool {
    for _ in 0..max_frames {
        if battle.glide_count() == 0 {
            return true;
        }
        battle.update(frame_delta());
    }
    battle.glide_count() == 0
}

/// Press advance, or tick a frame when the phase needs glides to settle,
/// until `target` is reached. Returns `false` on timeout or defeat.
pub fn drive_to_phase(battle: &mut Battle, target: Phase, max_frames: usize) -> bool {
    for _ in 0..max_frames {
        if battle.phase() == target {
            return true;
        }
        if battle.is_over() {
            return false;
        }
        if !battle.handle_input(Input::Advance) {
            battle.update(frame_delta());
        }
    }
    battle.phase() == target
}

/// One step of a scripted player.
///
/// In the summon phase it deploys the first visible card onto the first
/// available character, or passes when nothing fits. Elsewhere it presses
/// advance and ticks a frame when advance is refused.
pub fn scripted_step(battle: &mut Battle) {
    if battle.phase() == Phase::Summon {
        let slot = battle.pool().items().iter().position(|item| item.visible);
        let roster = battle
            .roster()
            .iter()
            .find(|(_, entry)| entry.available())
            .map(|(id, _)| id);
        if let (Some(slot), Some(roster)) = (slot, roster) {
            battle.handle_input(Input::PickCard { slot });
            if battle.handle_input(Input::DropOnRoster { roster }) {
                return;
            }
        }
    }
    if !battle.handle_input(Input::Advance) {
        battle.update(frame_delta());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_data_validates() {
        assert!(standard_data().validate().is_ok());
    }

    #[test]
    fn test_fixture_battle_opens_in_summon() {
        let b = battle();
        assert_eq!(b.phase(), Phase::Summon);
        assert_eq!(b.roster().len(), 2);
    }

    #[test]
    fn test_drive_to_phase_reaches_set_actions() {
        let mut b = battle();
        assert!(drive_to_phase(&mut b, Phase::SetActions, 200));
        assert_eq!(b.turn_count(), 1);
    }
}
