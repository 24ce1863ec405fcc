//! Data loading and external configuration
//!
//! Simulation tuning and map definitions are read from RON files, with
//! fallback to built-in defaults.

pub mod loader;

pub use loader::{CalendarConfig, ConfigError, SimulationConfig, load_map_definitions};
