//! Board and roster invariants.
//!
//! Checks that hold after every phase transition of a battle driven only
//! through its public inputs. Tests that place units directly with
//! `spawn_unit` bypass the card pool, so only the occupancy check applies
//! to them.

use tactics_core::prelude::*;

/// Assert that tile occupants and unit positions agree both ways.
///
/// # Panics
///
/// Panics with the first mismatch found.
pub fn assert_occupancy(battle: &Battle) {
    if let Err(err) = battle.check_occupancy() {
        panic!("occupancy out of sync in {}: {err}", battle.phase());
    }
    let units = battle
        .entities()
        .count_where(|e| e.unit.is_some());
    assert_eq!(
        battle.board().occupied_count(),
        units,
        "every unit must hold exactly one tile"
    );
}

/// Assert that each deployed roster entry has exactly one unit on the
/// board, and dead or benched entries have none.
///
/// # Panics
///
/// Panics on the first entry whose unit count disagrees with its flags.
pub fn assert_roster_matches_board(battle: &Battle) {
    for (id, entry) in battle.roster().iter() {
        let on_board = battle
            .entities()
            .count_where(|e| e.unit.is_some_and(|u| u.owner == Owner::Player(id)));
        let expected = usize::from(entry.deployed);
        assert_eq!(
            on_board, expected,
            "roster {id}: deployed={} dead={} but {on_board} unit(s) on board",
            entry.deployed, entry.dead
        );
        assert!(!(entry.dead && entry.deployed), "roster {id} is dead and deployed");
    }
}

/// Assert that a card is hidden in the pool exactly while a unit walks it.
///
/// # Panics
///
/// Panics on the first card whose visibility disagrees with the board.
pub fn assert_pool_matches_board(battle: &Battle) {
    for item in battle.pool().items() {
        let walking = battle
            .entities()
            .count_where(|e| e.unit.is_some_and(|u| u.card == CardRef::Player(item.card)));
        assert!(walking <= 1, "card {} walked by {walking} units", item.card);
        assert_eq!(
            item.visible,
            walking == 0,
            "card {} visible={} with {walking} unit(s) walking it",
            item.card,
            item.visible
        );
    }
}

/// Run every invariant in this module.
pub fn assert_all(battle: &Battle) {
    assert_occupancy(battle);
    assert_roster_matches_board(battle);
    assert_pool_matches_board(battle);
}
