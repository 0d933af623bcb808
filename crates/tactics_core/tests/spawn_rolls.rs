//! Enemy spawn rolls observed through whole battles.

use tactics_core::prelude::*;
use tactics_test_utils::fixtures::{battle_with_seed, drive_to_phase, standard_data, test_config};

fn first_reservation(battle: &mut Battle) -> Option<usize> {
    if !drive_to_phase(battle, Phase::SetActions, 200) {
        return None;
    }
    battle.take_events().iter().find_map(|e| match e {
        BattleEvent::SpawnReserved { template, .. } => Some(*template),
        _ => None,
    })
}

#[test]
fn test_template_frequencies_follow_weights() {
    // Slime weighs 5, brute 2, boss 0.
    let runs = 2_000u32;
    let mut counts = [0u32; 3];
    for seed in 0..u64::from(runs) {
        let mut b = battle_with_seed(seed);
        let template = first_reservation(&mut b).expect("first spawn roll reserves a tile");
        counts[template] += 1;
    }

    assert_eq!(counts[2], 0);
    let slime = f64::from(counts[0]) / f64::from(runs);
    assert!((slime - 5.0 / 7.0).abs() < 0.04, "slime share {slime}");
}

#[test]
fn test_cadence_forces_boss_template() {
    let mut config = test_config().with_seed(11);
    config.spawn_cadence = SpawnCadence {
        period: 1,
        forced_template: Some(2),
    };
    let mut b = Battle::new(config, standard_data()).unwrap();
    assert_eq!(first_reservation(&mut b), Some(2));
}

#[test]
fn test_enemy_cap_stops_rolls() {
    let mut config = test_config().with_seed(5);
    config.enemy_cap = 1;
    let mut b = Battle::new(config, standard_data()).unwrap();

    for _ in 0..4 {
        assert!(drive_to_phase(&mut b, Phase::SetActions, 400));
        b.handle_input(Input::Advance);
    }
    assert_eq!(b.unit_ids(Side::Enemy).len(), 1);
    assert_eq!(b.stats().enemies_spawned, 1);
}

#[test]
fn test_zero_weights_never_reserve() {
    let mut data = standard_data();
    for enemy in &mut data.enemies {
        enemy.random_weight = 0;
    }
    let mut b = Battle::new(test_config(), data).unwrap();
    assert_eq!(first_reservation(&mut b), None);
    assert_eq!(b.stats().enemies_spawned, 0);
}

#[test]
fn test_same_seed_same_rolls() {
    let rolls = |seed| {
        let mut b = battle_with_seed(seed);
        let mut templates = Vec::new();
        for _ in 0..5 {
            templates.push(first_reservation(&mut b));
            b.handle_input(Input::Advance);
        }
        templates
    };
    assert_eq!(rolls(42), rolls(42));
}

#[test]
fn test_weights_beyond_u32_total_still_roll() {
    let mut data = standard_data();
    data.enemies[0].random_weight = u32::MAX;
    data.enemies[1].random_weight = 2;
    let mut b = Battle::new(test_config(), data).unwrap();

    let template = first_reservation(&mut b).expect("first spawn roll reserves a tile");
    assert_ne!(template, 2);
    assert_eq!(b.stats().enemies_spawned, 1);
}
