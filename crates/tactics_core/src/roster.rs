//! Player characters that persist across deployments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::CharacterStats;
use crate::data::CharacterData;

/// Index of a roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RosterId(pub usize);

impl fmt::Display for RosterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One player character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Stats, shared by the deployed unit.
    pub stats: CharacterStats,
    /// A unit for this character is on the board.
    pub deployed: bool,
    /// Killed; can never deploy again.
    pub dead: bool,
}

impl RosterEntry {
    /// Can be paired with a card right now.
    #[must_use]
    pub const fn available(&self) -> bool {
        !self.dead && !self.deployed
    }
}

/// The full player roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Roster at full health from character templates.
    #[must_use]
    pub fn from_data(characters: &[CharacterData]) -> Self {
        Self {
            entries: characters
                .iter()
                .map(|c| RosterEntry {
                    stats: CharacterStats::from_data(c),
                    deployed: false,
                    dead: false,
                })
                .collect(),
        }
    }

    /// Entry by ID.
    #[must_use]
    pub fn get(&self, id: RosterId) -> Option<&RosterEntry> {
        self.entries.get(id.0)
    }

    /// Mutable entry by ID.
    pub fn get_mut(&mut self, id: RosterId) -> Option<&mut RosterEntry> {
        self.entries.get_mut(id.0)
    }

    /// Entries with their IDs.
    pub fn iter(&self) -> impl Iterator<Item = (RosterId, &RosterEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (RosterId(i), e))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every character is dead.
    #[must_use]
    pub fn all_dead(&self) -> bool {
        self.entries.iter().all(|e| e.dead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        let data = CharacterData {
            max_health: 2,
            power: 1,
            portrait: "knight".to_string(),
            attack_pattern: Vec::new(),
        };
        Roster::from_data(&[data.clone(), data])
    }

    #[test]
    fn test_fresh_roster_is_available() {
        let r = roster();
        assert_eq!(r.len(), 2);
        assert!(r.iter().all(|(_, e)| e.available()));
        assert!(!r.all_dead());
    }

    #[test]
    fn test_all_dead() {
        let mut r = roster();
        r.get_mut(RosterId(0)).unwrap().dead = true;
        assert!(!r.all_dead());
        r.get_mut(RosterId(1)).unwrap().dead = true;
        assert!(r.all_dead());
    }

    #[test]
    fn test_deployed_is_unavailable() {
        let mut r = roster();
        r.get_mut(RosterId(1)).unwrap().deployed = true;
        assert!(!r.get(RosterId(1)).unwrap().available());
        assert!(r.get(RosterId(2)).is_none());
    }
}
