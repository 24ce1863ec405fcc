//! ECS Components
//!
//! Components attached to every simulated entity.

use serde::{Deserialize, Serialize};

// ============================================================================
// Position
// ============================================================================

/// Integer tile coordinates on a map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another tile
    pub fn distance(&self, other: &Tile) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Tile) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// What changed since the position was last inspected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionChanges {
    pub moved: bool,
    pub tile_changed: bool,
}

/// Continuous position that remembers whether it moved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPosition {
    x: f32,
    y: f32,
    #[serde(skip)]
    moved: bool,
    #[serde(skip)]
    tile_changed: bool,
}

impl TrackedPosition {
    pub fn at_tile(tile: Tile) -> Self {
        Self {
            x: tile.x as f32,
            y: tile.y as f32,
            moved: true,
            tile_changed: true,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn tile(&self) -> Tile {
        Tile::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn set(&mut self, x: f32, y: f32) {
        if x == self.x && y == self.y {
            return;
        }
        let before = self.tile();
        self.x = x;
        self.y = y;
        self.moved = true;
        if self.tile() != before {
            self.tile_changed = true;
        }
    }

    pub fn set_tile(&mut self, tile: Tile) {
        self.set(tile.x as f32, tile.y as f32);
    }

    /// Flag the position as changed without moving, e.g. after a map switch
    pub fn mark_changed(&mut self) {
        self.moved = true;
        self.tile_changed = true;
    }

    /// Read and clear the change flags
    pub fn take_changes(&mut self) -> PositionChanges {
        let changes = PositionChanges {
            moved: self.moved,
            tile_changed: self.tile_changed,
        };
        self.moved = false;
        self.tile_changed = false;
        changes
    }
}

// ============================================================================
// Identity & Ownership
// ============================================================================

/// Who the entity is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Designer-given id, not unique
    pub id: String,
    /// Unique per world, `<type>#<n>` in lower case
    pub internal_id: String,
    pub entity_type: String,
}

/// What drives the entity's updates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Updated at the coarse global interval, whatever map is active
    Global,
    /// Updated every tick while the map is active
    Map(String),
    /// Not updated at all
    Unassigned,
}

impl Owner {
    pub fn is_on(&self, map_id: &str) -> bool {
        matches!(self, Owner::Map(id) if id == map_id)
    }

    pub fn map_id(&self) -> Option<&str> {
        match self {
            Owner::Map(id) => Some(id),
            _ => None,
        }
    }
}

/// Inactive entities are skipped by every update pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Active(pub bool);

/// Marker for characters the player commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerControlled;

/// Marker for entities that are left out of saves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transient;
