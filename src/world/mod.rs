//! World module
//!
//! Maps as seen by the simulation, and the random encounters they spawn.

pub mod encounter;
pub mod map;

pub use encounter::{EncounterGroup, EncounterMember, EncounterTable, EncounterZone};
pub use map::{CombatMapRegion, CombatMapRequest, GameMap, MapDefinition, MapKind, StaticMap};
