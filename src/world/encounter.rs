//! Random encounters
//!
//! Maps carry an encounter table: hostile groups that may ambush the party
//! while it travels or rests.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ecs::Tile;

/// One hostile in an encounter group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterMember {
    pub id: String,
    pub entity_type: String,
}

/// A group of hostiles that can appear as a random encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterGroup {
    pub id: String,
    /// Matches any party level when `None`
    #[serde(default)]
    pub level: Option<u32>,
    /// Subtracted from the scout's chance to spot the group
    #[serde(default)]
    pub stealth: u32,
    pub members: Vec<EncounterMember>,
}

/// A region of a map with its own, usually nastier, groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterZone {
    pub min: Tile,
    pub max: Tile,
    #[serde(default)]
    pub dangerousness: u32,
    pub groups: Vec<EncounterGroup>,
}

impl EncounterZone {
    pub fn contains(&self, tile: Tile) -> bool {
        tile.x >= self.min.x && tile.x <= self.max.x && tile.y >= self.min.y && tile.y <= self.max.y
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterTable {
    /// Percent chance of an encounter before dangerousness
    pub base_chance: u32,
    pub dangerousness: u32,
    /// How far a group's level may be from the party's average level
    pub level_tolerance: u32,
    pub groups: Vec<EncounterGroup>,
    pub zones: Vec<EncounterZone>,
}

impl Default for EncounterTable {
    fn default() -> Self {
        Self {
            base_chance: 15,
            dangerousness: 0,
            level_tolerance: 3,
            groups: Vec::new(),
            zones: Vec::new(),
        }
    }
}

impl EncounterTable {
    /// Roll for an encounter at `tile` against a party of `average_level`
    pub fn roll(&self, tile: Tile, average_level: u32, rng: &mut StdRng) -> Option<EncounterGroup> {
        let mut dangerousness = self.dangerousness;
        let mut viable: Vec<&EncounterGroup> = self.groups.iter().collect();
        for zone in self.zones.iter().filter(|zone| zone.contains(tile)) {
            viable.extend(zone.groups.iter());
            dangerousness = dangerousness.max(zone.dangerousness);
        }
        if viable.is_empty() {
            return None;
        }

        let chance = self.base_chance.saturating_add(dangerousness);
        if rng.gen_range(0..100) >= chance {
            return None;
        }

        let low = average_level.saturating_sub(self.level_tolerance);
        let high = average_level.saturating_add(self.level_tolerance);
        viable.retain(|group| group.level.map_or(true, |level| level >= low && level <= high));
        viable.choose(rng).map(|group| (*group).clone())
    }
}
