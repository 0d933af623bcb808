//! Deployment pool of player movement cards.
//!
//! One card item per player movement card. Items are hidden while their
//! card is on the board and shown again when the unit dies or returns.

use serde::{Deserialize, Serialize};

/// A player card plus its pool state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardItem {
    /// Index into the player card table.
    pub card: usize,
    /// Shown in the pool (not in play).
    pub visible: bool,
    /// Can be picked up right now.
    pub pickable: bool,
}

/// All card items and the one currently held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPool {
    items: Vec<CardItem>,
    picked: Option<usize>,
}

impl DeploymentPool {
    /// One visible, pickable item per card.
    #[must_use]
    pub fn new(card_count: usize) -> Self {
        Self {
            items: (0..card_count)
                .map(|card| CardItem {
                    card,
                    visible: true,
                    pickable: true,
                })
                .collect(),
            picked: None,
        }
    }

    /// Items in slot order.
    #[must_use]
    pub fn items(&self) -> &[CardItem] {
        &self.items
    }

    /// Item in a slot.
    #[must_use]
    pub fn item(&self, slot: usize) -> Option<&CardItem> {
        self.items.get(slot)
    }

    /// Slot currently held.
    #[must_use]
    pub const fn picked(&self) -> Option<usize> {
        self.picked
    }

    /// Pick up a slot if it is visible and pickable.
    pub fn pick(&mut self, slot: usize) -> bool {
        match self.items.get(slot) {
            Some(item) if item.visible && item.pickable => {
                self.picked = Some(slot);
                true
            }
            _ => false,
        }
    }

    /// Drop whatever is held. Returns the slot that was held.
    pub fn release(&mut self) -> Option<usize> {
        self.picked.take()
    }

    /// Set every item's pickable flag.
    pub fn set_pickable(&mut self, pickable: bool) {
        for item in &mut self.items {
            item.pickable = pickable;
        }
    }

    /// Hide a slot while its card is in play.
    pub fn hide(&mut self, slot: usize) {
        if let Some(item) = self.items.get_mut(slot) {
            item.visible = false;
        }
    }

    /// Show every item holding `card` again.
    pub fn reveal(&mut self, card: usize) {
        for item in self.items.iter_mut().filter(|i| i.card == card) {
            item.visible = true;
        }
    }
}
