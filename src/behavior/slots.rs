//! Behavior slots
//!
//! A slot is a channel of an entity (movement, action...) that only one
//! behavior may drive at a time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::BehaviorId;

/// Slot identifier. Negative values mean "no slot".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot(pub i32);

impl Slot {
    /// Behaviors in this slot never exclude each other
    pub const NONE: Slot = Slot(-1);
    pub const MOVEMENT: Slot = Slot(0);
    pub const ACTION: Slot = Slot(1);
    pub const IDLE: Slot = Slot(2);

    /// Whether this slot admits only one occupant
    pub fn is_exclusive(self) -> bool {
        self.0 >= 0
    }
}

/// Per-entity map from slot to the behavior currently occupying it
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    occupants: BTreeMap<Slot, BehaviorId>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Who holds the slot right now
    pub fn occupant(&self, slot: Slot) -> Option<BehaviorId> {
        self.occupants.get(&slot).copied()
    }

    /// True if an exclusive slot has no occupant. Unslotted is never "free".
    pub fn is_free(&self, slot: Slot) -> bool {
        slot.is_exclusive() && !self.occupants.contains_key(&slot)
    }

    /// Put `id` into the slot, returning the previous occupant
    pub fn claim(&mut self, slot: Slot, id: BehaviorId) -> Option<BehaviorId> {
        if !slot.is_exclusive() {
            return None;
        }
        self.occupants.insert(slot, id)
    }

    /// Free the slot, but only if `id` is the one holding it
    pub fn release(&mut self, slot: Slot, id: BehaviorId) -> bool {
        if self.occupant(slot) == Some(id) {
            self.occupants.remove(&slot);
            true
        } else {
            false
        }
    }

    /// Does `id` hold any slot?
    pub fn holds(&self, id: BehaviorId) -> bool {
        self.occupants.values().any(|held| *held == id)
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn clear(&mut self) {
        self.occupants.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, BehaviorId)> + '_ {
        self.occupants.iter().map(|(slot, id)| (*slot, *id))
    }
}
