//! Behavior kinds
//!
//! The closed set of behavior types an entity can run, together with the
//! family table used by polymorphic queries ("any behavior of the MoveTo
//! family" also matches a Wander).

use serde::{Deserialize, Serialize};

use super::attack::AttackBehavior;
use super::flicker::FlickerBehavior;
use super::movement::{MoveToBehavior, WanderBehavior};
use super::slots::Slot;
use super::wait::WaitBehavior;
use super::Behavior;

/// Every concrete behavior type known to the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BehaviorKind {
    /// Idle for a fixed amount of time
    Wait,
    /// Walk to a destination tile
    MoveTo,
    /// Randomly stroll around a home tile (a kind of MoveTo)
    Wander,
    /// Wind up and strike a target
    Attack,
    /// Cosmetic blinking, occupies no slot
    Flicker,
}

/// Behaviors that count as "verbs", i.e. commands that can be given to
/// characters. An idle party is one with none of these running.
pub const VERB_BEHAVIORS: &[BehaviorKind] = &[
    BehaviorKind::MoveTo,
    BehaviorKind::Wander,
    BehaviorKind::Attack,
];

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 5] = [
        BehaviorKind::Wait,
        BehaviorKind::MoveTo,
        BehaviorKind::Wander,
        BehaviorKind::Attack,
        BehaviorKind::Flicker,
    ];

    /// Display name, also used in logs
    pub fn name(self) -> &'static str {
        match self {
            BehaviorKind::Wait => "Wait",
            BehaviorKind::MoveTo => "MoveTo",
            BehaviorKind::Wander => "Wander",
            BehaviorKind::Attack => "Attack",
            BehaviorKind::Flicker => "Flicker",
        }
    }

    /// The kind this one specializes, if any
    pub fn parent(self) -> Option<BehaviorKind> {
        match self {
            BehaviorKind::Wander => Some(BehaviorKind::MoveTo),
            _ => None,
        }
    }

    /// True if `self` is `ancestor` or one of its descendants
    pub fn is_a(self, ancestor: BehaviorKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Is this kind one of the verb behaviors?
    pub fn is_verb(self) -> bool {
        VERB_BEHAVIORS.contains(&self)
    }

    /// The slot a freshly created behavior of this kind occupies
    pub fn default_slot(self) -> Slot {
        match self {
            BehaviorKind::MoveTo | BehaviorKind::Wander => Slot::MOVEMENT,
            BehaviorKind::Attack => Slot::ACTION,
            BehaviorKind::Wait => Slot::IDLE,
            BehaviorKind::Flicker => Slot::NONE,
        }
    }

    /// Construct a fresh, uninitialized instance
    pub fn instantiate(self) -> Box<dyn Behavior> {
        match self {
            BehaviorKind::Wait => Box::new(WaitBehavior::default()),
            BehaviorKind::MoveTo => Box::new(MoveToBehavior::default()),
            BehaviorKind::Wander => Box::new(WanderBehavior::default()),
            BehaviorKind::Attack => Box::new(AttackBehavior::default()),
            BehaviorKind::Flicker => Box::new(FlickerBehavior::default()),
        }
    }
}

impl std::fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
