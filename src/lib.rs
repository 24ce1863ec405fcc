//! Hourglass - simulation clock and behavior scheduler
//!
//! Drives the world of a real-time tactical RPG: a calendar that runs at
//! per-map speeds, fast-forwarding through rests and travel, combat mode
//! switching, and the prioritized behaviors every entity carries.

pub mod behavior;
pub mod combat;
pub mod data;
pub mod ecs;
pub mod entities;
pub mod game;
pub mod save;
pub mod ui;
pub mod world;

// Re-export commonly used types
pub use behavior::{Behavior, BehaviorKind, BehaviorParams, BehaviorRunner, SimCommand};
pub use data::SimulationConfig;
pub use ecs::{EntityRegistry, EntitySpawn, Owner, Tile};
pub use game::{FastForwardCallback, FastForwardOutcome, FastForwardRequest, Simulation};
