//! Map structures
//!
//! The simulation talks to maps through the [`GameMap`] trait. [`StaticMap`]
//! is the data-driven implementation built from a [`MapDefinition`].

use std::collections::HashSet;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::encounter::{EncounterGroup, EncounterTable};
use crate::data::SimulationConfig;
use crate::ecs::{PositionChange, Tile};

/// What the simulation needs from a map
pub trait GameMap {
    fn id(&self) -> &str;

    /// Game seconds per real second while this map is active
    fn time_multiplier(&self) -> u32;

    /// Overworld travel map (as opposed to a local area)
    fn is_world_map(&self) -> bool;

    /// Map used to fight out an encounter from a world map
    fn is_combat_map(&self) -> bool;

    /// Combat map to use for a fight starting at `tile`
    fn combat_map_id(&self, tile: Tile) -> Option<String>;

    /// Roll for a random encounter
    fn random_encounter(&mut self, tile: Tile, average_level: u32, rng: &mut StdRng) -> Option<EncounterGroup>;

    fn is_blocked(&self, tile: Tile) -> bool;

    fn set_render_grid(&mut self, enabled: bool);

    fn render_grid(&self) -> bool;

    /// Called every tick while the map is active
    fn update(&mut self, _delta: f32) {}

    /// Called right before the simulation leaves this map
    fn will_change(&mut self) {}

    /// An entity on this map moved
    fn entity_moved(&mut self, _change: &PositionChange) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    World,
    Local,
    Combat,
}

/// Area of a world map that leads to a particular combat map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatMapRegion {
    pub min: Tile,
    pub max: Tile,
    pub map_id: String,
}

impl CombatMapRegion {
    pub fn contains(&self, tile: Tile) -> bool {
        tile.x >= self.min.x && tile.x <= self.max.x && tile.y >= self.min.y && tile.y <= self.max.y
    }
}

/// What a combat map needs to set up a fight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatMapRequest {
    pub origin_map: String,
    pub encounter: EncounterGroup,
    /// Where the party stood when attacked
    pub from: Tile,
    /// Where the party returns after fleeing or winning
    pub escape: Tile,
}

/// Data-file description of a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub id: String,
    pub kind: MapKind,
    pub width: i32,
    pub height: i32,
    /// Overrides the configured multiplier for this kind of map
    #[serde(default)]
    pub time_multiplier: Option<u32>,
    #[serde(default)]
    pub blocked: Vec<Tile>,
    #[serde(default)]
    pub combat_maps: Vec<CombatMapRegion>,
    #[serde(default)]
    pub default_combat_map: Option<String>,
    #[serde(default)]
    pub encounters: EncounterTable,
}

impl MapDefinition {
    pub fn new(id: impl Into<String>, kind: MapKind, width: i32, height: i32) -> Self {
        Self {
            id: id.into(),
            kind,
            width,
            height,
            time_multiplier: None,
            blocked: Vec::new(),
            combat_maps: Vec::new(),
            default_combat_map: None,
            encounters: EncounterTable::default(),
        }
    }
}

/// A map fully described by data
#[derive(Debug, Clone)]
pub struct StaticMap {
    definition: MapDefinition,
    time_multiplier: u32,
    blocked: HashSet<Tile>,
    render_grid: bool,
}

impl StaticMap {
    pub fn new(definition: MapDefinition, config: &SimulationConfig) -> Self {
        let configured = match definition.kind {
            MapKind::World => config.world_time_multiplier,
            MapKind::Local | MapKind::Combat => config.local_time_multiplier,
        };
        let time_multiplier = definition.time_multiplier.unwrap_or(configured).max(1);
        let blocked = definition.blocked.iter().copied().collect();
        Self {
            definition,
            time_multiplier,
            blocked,
            render_grid: false,
        }
    }

    pub fn kind(&self) -> MapKind {
        self.definition.kind
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.definition.width && tile.y < self.definition.height
    }

    pub fn block(&mut self, tile: Tile) {
        self.blocked.insert(tile);
    }

    pub fn encounters_mut(&mut self) -> &mut EncounterTable {
        &mut self.definition.encounters
    }
}

impl GameMap for StaticMap {
    fn id(&self) -> &str {
        &self.definition.id
    }

    fn time_multiplier(&self) -> u32 {
        self.time_multiplier
    }

    fn is_world_map(&self) -> bool {
        self.definition.kind == MapKind::World
    }

    fn is_combat_map(&self) -> bool {
        self.definition.kind == MapKind::Combat
    }

    fn combat_map_id(&self, tile: Tile) -> Option<String> {
        self.definition
            .combat_maps
            .iter()
            .find(|region| region.contains(tile))
            .map(|region| region.map_id.clone())
            .or_else(|| self.definition.default_combat_map.clone())
    }

    fn random_encounter(&mut self, tile: Tile, average_level: u32, rng: &mut StdRng) -> Option<EncounterGroup> {
        self.definition.encounters.roll(tile, average_level, rng)
    }

    fn is_blocked(&self, tile: Tile) -> bool {
        !self.in_bounds(tile) || self.blocked.contains(&tile)
    }

    fn set_render_grid(&mut self, enabled: bool) {
        self.render_grid = enabled;
    }

    fn render_grid(&self) -> bool {
        self.render_grid
    }

    fn will_change(&mut self) {
        self.render_grid = false;
    }
}
