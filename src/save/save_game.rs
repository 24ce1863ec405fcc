//! World save/load system
//!
//! Snapshots every persisted entity with its behaviors, slot assignments and
//! forbidden-by registry. Fast-forward and combat state are never saved, so
//! saving is refused while either is active.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::behavior::{BehaviorRunner, SavedRunner};
use crate::combat::CombatSystem;
use crate::ecs::{Identity, Owner, TrackedPosition};
use crate::game::{GameDate, Simulation};
use crate::ui::Ui;

/// Save file version for compatibility checking
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Cannot save during combat")]
    CombatInProgress,

    #[error("Cannot save on a combat map")]
    OnCombatMap,

    #[error("Cannot save while fast-forwarding")]
    FastForwarding,

    #[error("Entity {internal_id} belongs to unknown map {map_id}")]
    UnknownMap { internal_id: String, map_id: String },
}

/// One persisted entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub identity: Identity,
    pub owner: Owner,
    pub active: bool,
    pub position: TrackedPosition,
    pub runner: SavedRunner,
}

/// Complete save data structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub date_seconds: f64,
    pub id_counter: u64,
    pub active_map: Option<String>,
    pub entities: Vec<EntitySnapshot>,
}

impl WorldSnapshot {
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let snapshot: Self = serde_json::from_str(json)?;

        // Version check
        if snapshot.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }
}

impl<C: CombatSystem, U: Ui> Simulation<C, U> {
    /// Capture the world. Refused during combat, on a combat map and while
    /// fast-forwarding.
    pub fn snapshot(&self) -> Result<WorldSnapshot, SaveError> {
        if self.is_fast_forwarding() {
            return Err(SaveError::FastForwarding);
        }
        if self.is_combat_in_progress() {
            return Err(SaveError::CombatInProgress);
        }
        if self.active_map().is_some_and(|map| map.is_combat_map()) {
            return Err(SaveError::OnCombatMap);
        }

        let registry = self.entities();
        let mut entities = Vec::new();
        let mut query = registry
            .world()
            .query::<(&Identity, &Owner, &crate::ecs::Active, &TrackedPosition, &BehaviorRunner)>();
        for (entity, (identity, owner, active, position, runner)) in query.iter() {
            if registry.is_transient(entity) {
                continue;
            }
            entities.push(EntitySnapshot {
                identity: identity.clone(),
                owner: owner.clone(),
                active: active.0,
                position: *position,
                runner: runner.to_saved(),
            });
        }
        entities.sort_by(|a, b| a.identity.internal_id.cmp(&b.identity.internal_id));

        Ok(WorldSnapshot {
            version: SAVE_VERSION,
            date_seconds: self.date().total_seconds(),
            id_counter: registry.id_counter(),
            active_map: self.active_map_id().map(str::to_string),
            entities,
        })
    }

    /// Replace every entity with the ones in `snapshot`. Maps must already
    /// be registered. The party is left for the caller to rebuild.
    pub fn restore(&mut self, snapshot: WorldSnapshot) -> Result<(), SaveError> {
        if self.is_fast_forwarding() {
            return Err(SaveError::FastForwarding);
        }
        for entity in &snapshot.entities {
            if let Owner::Map(map_id) = &entity.owner {
                if self.map(map_id).is_none() {
                    return Err(SaveError::UnknownMap {
                        internal_id: entity.identity.internal_id.clone(),
                        map_id: map_id.clone(),
                    });
                }
            }
        }

        self.end_combat();
        let calendar = self.config().calendar;
        self.set_date(GameDate::from_seconds(snapshot.date_seconds, calendar));

        let registry = self.entities_mut();
        registry.clear();
        registry.set_id_counter(snapshot.id_counter);
        let count = snapshot.entities.len();
        for entity in snapshot.entities {
            let mut position = entity.position;
            position.mark_changed();
            registry.insert(
                entity.identity,
                entity.owner,
                entity.active,
                position,
                BehaviorRunner::from_saved(entity.runner),
            );
        }

        match snapshot.active_map {
            Some(map_id) => {
                self.enter_map(&map_id);
            }
            None => self.leave_map(),
        }
        self.pause_game(true);
        log::info!("Restored {} entities", count);
        Ok(())
    }
}

/// Get the save directory path
pub fn save_directory() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "hourglass", "Hourglass") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push("saves");
        path
    } else {
        // Fallback to current directory
        PathBuf::from("./saves")
    }
}

/// Get the path for a specific save slot
pub fn save_path(slot: u8) -> PathBuf {
    let mut path = save_directory();
    path.push(format!("world_{}.json", slot));
    path
}

/// Check if a save exists in the given slot
pub fn save_exists(slot: u8) -> bool {
    save_path(slot).exists()
}

/// Save the world to a slot
pub fn save_world<C: CombatSystem, U: Ui>(sim: &Simulation<C, U>, slot: u8) -> Result<(), SaveError> {
    let json = sim.snapshot()?.to_json()?;

    // Ensure directory exists
    fs::create_dir_all(save_directory())?;
    fs::write(save_path(slot), json)?;

    log::info!("World saved to slot {}", slot);
    Ok(())
}

/// Load a world snapshot from a slot
pub fn load_world(slot: u8) -> Result<WorldSnapshot, SaveError> {
    let data = fs::read_to_string(save_path(slot))?;
    let snapshot = WorldSnapshot::from_json(&data)?;
    log::info!("World loaded from slot {}", slot);
    Ok(snapshot)
}

/// Delete a save slot
pub fn delete_save(slot: u8) -> Result<(), SaveError> {
    let path = save_path(slot);
    if path.exists() {
        fs::remove_file(&path)?;
        log::info!("Deleted save slot {}", slot);
    }
    Ok(())
}
