//! Character templates for the player roster and enemy spawns.

use serde::{Deserialize, Serialize};

/// Tile offset hit by a pattern attack, relative to the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackOffset {
    /// Column delta.
    pub x: i32,
    /// Row delta.
    pub y: i32,
}

/// Base stats shared by player characters and enemies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterData {
    /// Health cap; units start at full health.
    pub max_health: u32,
    /// Damage dealt by collisions and pattern attacks.
    pub power: u32,
    /// Portrait / sprite identifier for the presentation layer.
    pub portrait: String,
    /// Tiles hit when the unit lands on an attack step.
    #[serde(default)]
    pub attack_pattern: Vec<AttackOffset>,
}

/// Enemy template with its movement choices and spawn weight.
///
/// # Example JSON
///
/// ```json
/// {
///     "max_health": 2, "power": 1, "portrait": "slime",
///     "attack_pattern": [ { "x": 0, "y": 1 } ],
///     "moves": [ "enemy-climb" ],
///     "random_weight": 5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyData {
    /// Base stats.
    #[serde(flatten)]
    pub character: CharacterData,
    /// Names of enemy movement cards this template may walk.
    pub moves: Vec<String>,
    /// Relative weight in the spawn roll.
    #[serde(default)]
    pub random_weight: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_flattens_base_stats() {
        let json = r#"{
            "max_health": 3, "power": 2, "portrait": "golem",
            "attack_pattern": [{"x": 1, "y": 0}, {"x": -1, "y": 0}],
            "moves": ["sweep", "down"], "random_weight": 4
        }"#;
        let enemy: EnemyData = serde_json::from_str(json).unwrap();
        assert_eq!(enemy.character.max_health, 3);
        assert_eq!(enemy.character.attack_pattern.len(), 2);
        assert_eq!(enemy.moves, vec!["sweep".to_string(), "down".to_string()]);
        assert_eq!(enemy.random_weight, 4);
    }

    #[test]
    fn test_missing_pattern_is_empty() {
        let json = r#"{"max_health": 1, "power": 1, "portrait": "imp"}"#;
        let data: CharacterData = serde_json::from_str(json).unwrap();
        assert!(data.attack_pattern.is_empty());
    }
}
