//! Loading template tables from disk and playing the bundled data.

use std::fs;
use std::path::Path;

use tactics_core::prelude::*;
use tactics_headless::autoplay::{play_match, Strategy};
use tactics_headless::data_loader::{
    default_data_dir, load_config, load_game_data, DataLoadError, CHARACTERS_FILE,
    ENEMIES_FILE, ENEMY_CARDS_FILE, PLAYER_CARDS_FILE,
};
use tactics_headless::runner::HeadlessRunner;
use tactics_test_utils::fixtures::standard_data;

fn write_tables(dir: &Path, data: &GameData) {
    let write = |file: &str, json: String| fs::write(dir.join(file), json).unwrap();
    write(PLAYER_CARDS_FILE, serde_json::to_string(&data.player_cards).unwrap());
    write(ENEMY_CARDS_FILE, serde_json::to_string(&data.enemy_cards).unwrap());
    write(CHARACTERS_FILE, serde_json::to_string(&data.characters).unwrap());
    write(ENEMIES_FILE, serde_json::to_string(&data.enemies).unwrap());
}

#[test]
fn test_tables_load_back_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), &standard_data());
    assert_eq!(load_game_data(dir.path()).unwrap(), standard_data());
}

#[test]
fn test_movements_key_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), &standard_data());
    fs::write(
        dir.path().join(PLAYER_CARDS_FILE),
        r#"[{"name":"straight-1","movements":[{"x":0,"y":-1,"attack":true}]}]"#,
    )
    .unwrap();

    let data = load_game_data(dir.path()).unwrap();
    assert_eq!(data.player_cards.len(), 1);
    assert!(data.player_cards[0].steps[0].attack);
}

#[test]
fn test_malformed_table_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), &standard_data());
    fs::write(dir.path().join(CHARACTERS_FILE), "{ not an array").unwrap();

    let err = load_game_data(dir.path()).unwrap_err();
    assert!(matches!(&err, DataLoadError::Parse { path, .. } if path.ends_with(CHARACTERS_FILE)));
}

#[test]
fn test_missing_table_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), &standard_data());
    fs::remove_file(dir.path().join(ENEMIES_FILE)).unwrap();

    let err = load_game_data(dir.path()).unwrap_err();
    assert!(matches!(err, DataLoadError::Io { .. }));
}

#[test]
fn test_unplayable_character_is_rejected() {
    let mut data = standard_data();
    data.characters[1].max_health = 0;
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), &data);

    let err = load_game_data(dir.path()).unwrap_err();
    assert!(matches!(err, DataLoadError::Invalid(GameError::InvalidData(_))));
}

#[test]
fn test_bad_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("battle.ron");
    fs::write(&path, "(rows: 0)").unwrap();
    assert!(matches!(
        load_config(&path),
        Err(DataLoadError::Invalid(GameError::InvalidConfig(_)))
    ));

    fs::write(&path, "(rows: ").unwrap();
    assert!(matches!(
        load_config(&path),
        Err(DataLoadError::Invalid(GameError::ConfigParse(_)))
    ));
}

#[test]
fn test_bundled_data_plays() {
    let dir = default_data_dir();
    let config = load_config(&dir.join("battle.ron")).unwrap().with_seed(21);
    let data = load_game_data(&dir).unwrap();

    let report = play_match(Battle::new(config, data).unwrap(), Strategy::Greedy, 2_000);
    assert!(report.stats.turn_count > 0);
    assert!(report.stats.enemies_spawned > 0);
}

#[test]
fn test_bundled_data_over_protocol() {
    let dir = default_data_dir();
    let config = load_config(&dir.join("battle.ron")).unwrap();
    let battle = Battle::new(config, load_game_data(&dir).unwrap()).unwrap();
    let mut runner = HeadlessRunner::new(battle);

    let script = concat!(
        "{\"cmd\":\"pick\",\"slot\":1}\n",
        "{\"cmd\":\"drop\",\"roster\":0}\n",
        "{\"cmd\":\"tick\",\"count\":20}\n",
        "{\"cmd\":\"query\"}\n",
    );
    let mut out = Vec::new();
    runner.run(script.as_bytes(), &mut out).unwrap();

    let last: serde_json::Value = String::from_utf8(out)
        .unwrap()
        .lines()
        .last()
        .map(|l| serde_json::from_str(l).unwrap())
        .unwrap();
    assert_eq!(last["type"], "state");
    assert_eq!(last["snapshot"]["units"].as_array().unwrap().len(), 1);
    assert_eq!(last["snapshot"]["roster"][0]["deployed"], true);
    // The bundled board starts the player on row 0, so `lance` climbs.
    assert_eq!(last["snapshot"]["units"][0]["facing"], "Up");
}
