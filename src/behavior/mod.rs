//! Behavior module - per-entity scheduling of timed behaviors
//!
//! Every entity owns a [`BehaviorRunner`]: an ordered list of behaviors,
//! a slot table that keeps behaviors driving the same channel mutually
//! exclusive, a pool of retired instances and a registry of forbidden kinds.

mod attack;
mod flicker;
mod forbid;
mod kind;
mod movement;
mod pool;
mod runner;
mod slots;
mod wait;

use std::any::Any;
use std::fmt;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ecs::{Tile, TrackedPosition};

pub use attack::AttackBehavior;
pub use flicker::FlickerBehavior;
pub use forbid::ForbiddenRegistry;
pub use kind::{BehaviorKind, VERB_BEHAVIORS};
pub use movement::{MoveToBehavior, WanderBehavior};
pub use pool::BehaviorPool;
pub use runner::{BehaviorRunner, SavedRunner, SavedRunnerEntry};
pub use slots::{Slot, SlotTable};
pub use wait::WaitBehavior;

/// Identifies a behavior inside one runner. Never reused by that runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BehaviorId(pub u64);

/// Errors raised while setting up a behavior
#[derive(Debug, Error, PartialEq)]
pub enum BehaviorError {
    #[error("{kind} cannot be initialized with {params}")]
    InvalidParams {
        kind: BehaviorKind,
        params: &'static str,
    },

    #[error("{kind} needs a target")]
    MissingTarget { kind: BehaviorKind },

    #[error("entity {0} has no behavior runner")]
    NoRunner(String),
}

/// Initialization arguments for [`Behavior::init`]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BehaviorParams {
    #[default]
    None,
    /// Seconds to wait
    Duration(f32),
    MoveTo { destination: Tile, speed: f32 },
    Wander { radius: i32, chance_to_move: u32 },
    Attack { target: String },
    Flicker { period: f32, duration: Option<f32> },
}

impl BehaviorParams {
    pub fn name(&self) -> &'static str {
        match self {
            BehaviorParams::None => "no parameters",
            BehaviorParams::Duration(_) => "a duration",
            BehaviorParams::MoveTo { .. } => "a destination",
            BehaviorParams::Wander { .. } => "wander settings",
            BehaviorParams::Attack { .. } => "an attack target",
            BehaviorParams::Flicker { .. } => "flicker settings",
        }
    }
}

/// Who a behavior is being attached to
#[derive(Debug, Clone, Copy)]
pub struct BehaviorOwner<'a> {
    pub internal_id: &'a str,
    pub tile: Tile,
}

/// Requests a behavior makes to the simulation. They are applied after the
/// entity pass of the tick that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    SwitchToMap { map_id: String, start: Tile },
    StartCombat,
    EndCombat,
    Message(String),
}

/// Everything a behavior may touch while it updates
pub struct BehaviorContext<'a> {
    /// Internal id of the owning entity
    pub owner: &'a str,
    pub position: &'a mut TrackedPosition,
    /// The world clock is paused. Behaviors still run but should not progress.
    pub paused: bool,
    pub in_combat: bool,
    pub rng: &'a mut StdRng,
    pub commands: &'a mut Vec<SimCommand>,
}

/// State shared by every behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorFlags {
    pub paused: bool,
}

/// A unit of per-entity logic driven by the runner
pub trait Behavior: fmt::Debug + Send + Sync {
    fn kind(&self) -> BehaviorKind;

    /// Prepare the behavior for `owner`. Called once after the instance is
    /// obtained from the pool.
    fn init(&mut self, owner: &BehaviorOwner<'_>, params: &BehaviorParams)
        -> Result<(), BehaviorError>;

    fn update(&mut self, ctx: &mut BehaviorContext<'_>, delta: f32);

    fn is_finished(&self) -> bool;

    /// Clear all state so the instance can be reused
    fn reset(&mut self);

    fn flags(&self) -> &BehaviorFlags;
    fn flags_mut(&mut self) -> &mut BehaviorFlags;

    /// Whether this behavior keeps the turn from passing in combat
    fn blocking_in_combat(&self) -> bool;

    fn to_saved(&self) -> SavedBehavior;

    fn as_any(&self) -> &dyn Any;

    fn slot(&self) -> Slot {
        self.kind().default_slot()
    }

    fn is_verb(&self) -> bool {
        self.kind().is_verb()
    }

    fn is_paused(&self) -> bool {
        self.flags().paused
    }

    fn pause(&mut self) {
        self.flags_mut().paused = true;
    }

    fn resume(&mut self) {
        self.flags_mut().paused = false;
    }

    /// Called once when the behavior leaves its runner
    fn on_remove(&mut self) {}
}

/// Serialized form of a behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SavedBehavior {
    Wait(WaitBehavior),
    MoveTo(MoveToBehavior),
    Wander(WanderBehavior),
    Attack(AttackBehavior),
    Flicker(FlickerBehavior),
}

impl SavedBehavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            SavedBehavior::Wait(_) => BehaviorKind::Wait,
            SavedBehavior::MoveTo(_) => BehaviorKind::MoveTo,
            SavedBehavior::Wander(_) => BehaviorKind::Wander,
            SavedBehavior::Attack(_) => BehaviorKind::Attack,
            SavedBehavior::Flicker(_) => BehaviorKind::Flicker,
        }
    }

    pub fn into_behavior(self) -> Box<dyn Behavior> {
        match self {
            SavedBehavior::Wait(b) => Box::new(b),
            SavedBehavior::MoveTo(b) => Box::new(b),
            SavedBehavior::Wander(b) => Box::new(b),
            SavedBehavior::Attack(b) => Box::new(b),
            SavedBehavior::Flicker(b) => Box::new(b),
        }
    }
}

/// Shorthand for the parameter mismatch error
pub(crate) fn invalid_params(kind: BehaviorKind, params: &BehaviorParams) -> BehaviorError {
    BehaviorError::InvalidParams {
        kind,
        params: params.name(),
    }
}
