//! The full template set a battle is played with.

use serde::{Deserialize, Serialize};

use super::{CharacterData, EnemyData, MovementCard};
use crate::components::CardRef;
use crate::error::{GameError, Result};

/// Every template table a battle needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameData {
    /// Movement cards offered to the player, one deployment slot each.
    pub player_cards: Vec<MovementCard>,
    /// Movement cards enemies walk, referenced by name.
    pub enemy_cards: Vec<MovementCard>,
    /// Player roster, in display order.
    pub characters: Vec<CharacterData>,
    /// Enemy templates.
    pub enemies: Vec<EnemyData>,
}

impl GameData {
    /// Resolve a card reference.
    #[must_use]
    pub fn card(&self, card: CardRef) -> Option<&MovementCard> {
        match card {
            CardRef::Player(i) => self.player_cards.get(i),
            CardRef::Enemy(i) => self.enemy_cards.get(i),
        }
    }

    /// Find an enemy card by name.
    #[must_use]
    pub fn enemy_card_by_name(&self, name: &str) -> Option<(usize, &MovementCard)> {
        self.enemy_cards
            .iter()
            .enumerate()
            .find(|(_, card)| card.name == name)
    }

    /// Sum of all enemy spawn weights.
    #[must_use]
    pub fn total_enemy_weight(&self) -> u64 {
        self.enemies.iter().map(|e| u64::from(e.random_weight)).sum()
    }

    /// Check that the templates can be played.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyCard`] for cards without steps and
    /// [`GameError::InvalidData`] when there is no roster to play with.
    pub fn validate(&self) -> Result<()> {
        if self.characters.is_empty() {
            return Err(GameError::InvalidData(
                "at least one player character is required".to_string(),
            ));
        }
        if let Some(card) = self
            .player_cards
            .iter()
            .chain(&self.enemy_cards)
            .find(|card| card.is_empty())
        {
            return Err(GameError::EmptyCard(card.name.clone()));
        }
        if let Some(c) = self.characters.iter().find(|c| c.max_health == 0) {
            return Err(GameError::InvalidData(format!(
                "character '{}' has zero max health",
                c.portrait
            )));
        }
        for enemy in &self.enemies {
            if enemy.character.max_health == 0 {
                return Err(GameError::InvalidData(format!(
                    "enemy '{}' has zero max health",
                    enemy.character.portrait
                )));
            }
            for name in &enemy.moves {
                if self.enemy_card_by_name(name).is_none() {
                    tracing::warn!(
                        enemy = %enemy.character.portrait,
                        card = %name,
                        "Enemy references an unknown movement card"
                    );
                }
            }
        }
        Ok(())
    }
}
