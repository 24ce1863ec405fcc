//! Save/load system
//!
//! Handles world snapshots and save slots.

pub mod save_game;

pub use save_game::{
    EntitySnapshot, SaveError, WorldSnapshot, SAVE_VERSION,
    save_world, load_world, delete_save,
    save_exists, save_directory, save_path,
};
