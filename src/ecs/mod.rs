//! Entity Component System module
//!
//! Components carried by simulated entities and the registry that owns them.

pub mod components;
mod registry;

pub use components::*;
pub use registry::{EntityRegistry, EntitySpawn, PositionChange, TickEnv};
