//! Movement behaviors
//!
//! MoveTo walks an entity to a destination tile; Wander is a MoveTo that
//! keeps picking random destinations around a home tile and never finishes.

use std::any::Any;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    invalid_params, Behavior, BehaviorContext, BehaviorError, BehaviorFlags, BehaviorKind,
    BehaviorOwner, BehaviorParams, SavedBehavior,
};
use crate::ecs::Tile;

/// Tiles per second used when no speed is given
pub const DEFAULT_WALK_SPEED: f32 = 4.0;

const WANDER_SPEED: f32 = 2.0;
/// Seconds between two "should I move?" rolls of a wanderer
const WANDER_DECISION_INTERVAL: f32 = 1.0;

// ============================================================================
// MoveTo
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToBehavior {
    flags: BehaviorFlags,
    destination: Tile,
    /// Tiles per second
    speed: f32,
    arrived: bool,
}

impl Default for MoveToBehavior {
    fn default() -> Self {
        Self {
            flags: BehaviorFlags::default(),
            destination: Tile::new(0, 0),
            speed: DEFAULT_WALK_SPEED,
            arrived: false,
        }
    }
}

impl MoveToBehavior {
    pub fn towards(destination: Tile, speed: f32) -> Self {
        Self {
            destination,
            speed,
            ..Self::default()
        }
    }

    pub fn destination(&self) -> Tile {
        self.destination
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    fn step(&mut self, ctx: &mut BehaviorContext<'_>, delta: f32) {
        let (target_x, target_y) = (self.destination.x as f32, self.destination.y as f32);
        let dx = target_x - ctx.position.x();
        let dy = target_y - ctx.position.y();
        let distance = (dx * dx + dy * dy).sqrt();
        let travel = self.speed * delta;

        if distance <= travel || distance <= f32::EPSILON {
            ctx.position.set(target_x, target_y);
            self.arrived = true;
        } else {
            let ratio = travel / distance;
            ctx.position
                .set(ctx.position.x() + dx * ratio, ctx.position.y() + dy * ratio);
        }
    }
}

impl Behavior for MoveToBehavior {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::MoveTo
    }

    fn init(&mut self, _owner: &BehaviorOwner<'_>, params: &BehaviorParams) -> Result<(), BehaviorError> {
        match params {
            BehaviorParams::MoveTo { destination, speed } if *speed > 0.0 => {
                self.destination = *destination;
                self.speed = *speed;
                self.arrived = false;
                Ok(())
            }
            other => Err(invalid_params(self.kind(), other)),
        }
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>, delta: f32) {
        if ctx.paused || self.arrived {
            return;
        }
        self.step(ctx, delta);
    }

    fn is_finished(&self) -> bool {
        self.arrived
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn flags(&self) -> &BehaviorFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut BehaviorFlags {
        &mut self.flags
    }

    fn blocking_in_combat(&self) -> bool {
        true
    }

    fn to_saved(&self) -> SavedBehavior {
        SavedBehavior::MoveTo(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Wander
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WanderBehavior {
    flags: BehaviorFlags,
    home: Tile,
    radius: i32,
    /// Percent chance to start walking on each decision
    chance_to_move: u32,
    since_decision: f32,
    current: Option<MoveToBehavior>,
}

impl WanderBehavior {
    pub fn home(&self) -> Tile {
        self.home
    }

    pub fn is_walking(&self) -> bool {
        self.current.is_some()
    }
}

impl Behavior for WanderBehavior {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Wander
    }

    fn init(&mut self, owner: &BehaviorOwner<'_>, params: &BehaviorParams) -> Result<(), BehaviorError> {
        match params {
            BehaviorParams::Wander {
                radius,
                chance_to_move,
            } if *radius >= 0 => {
                self.home = owner.tile;
                self.radius = *radius;
                self.chance_to_move = (*chance_to_move).min(100);
                self.since_decision = 0.0;
                self.current = None;
                Ok(())
            }
            other => Err(invalid_params(self.kind(), other)),
        }
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>, delta: f32) {
        if ctx.paused {
            return;
        }

        if let Some(walk) = self.current.as_mut() {
            walk.update(ctx, delta);
            if walk.is_finished() {
                self.current = None;
            }
            return;
        }

        self.since_decision += delta;
        if self.since_decision < WANDER_DECISION_INTERVAL {
            return;
        }
        self.since_decision -= WANDER_DECISION_INTERVAL;

        if ctx.rng.gen_range(0..100) >= self.chance_to_move {
            return;
        }
        let destination = Tile::new(
            self.home.x + ctx.rng.gen_range(-self.radius..=self.radius),
            self.home.y + ctx.rng.gen_range(-self.radius..=self.radius),
        );
        if destination != ctx.position.tile() {
            log::trace!("{} wanders to {:?}", ctx.owner, destination);
            self.current = Some(MoveToBehavior::towards(destination, WANDER_SPEED));
        }
    }

    fn is_finished(&self) -> bool {
        false
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn flags(&self) -> &BehaviorFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut BehaviorFlags {
        &mut self.flags
    }

    fn blocking_in_combat(&self) -> bool {
        false
    }

    fn to_saved(&self) -> SavedBehavior {
        SavedBehavior::Wander(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::test_support::{owner, Harness};

    #[test]
    fn test_move_to_reaches_destination() {
        let mut harness = Harness::at(Tile::new(0, 0));
        let mut walk = MoveToBehavior::default();
        walk.init(
            &owner(Tile::new(0, 0)),
            &BehaviorParams::MoveTo {
                destination: Tile::new(3, 0),
                speed: 2.0,
            },
        )
        .unwrap();

        walk.update(&mut harness.ctx(), 1.0);
        assert!(!walk.is_finished());
        assert_eq!(harness.position.tile(), Tile::new(2, 0));

        walk.update(&mut harness.ctx(), 1.0);
        assert!(walk.is_finished());
        assert_eq!(harness.position.tile(), Tile::new(3, 0));
    }

    #[test]
    fn test_move_to_marks_position_changed() {
        let mut harness = Harness::at(Tile::new(1, 1));
        harness.position.take_changes();
        let mut walk = MoveToBehavior::towards(Tile::new(1, 2), 10.0);

        walk.update(&mut harness.ctx(), 1.0);
        let changes = harness.position.take_changes();
        assert!(changes.moved);
        assert!(changes.tile_changed);
    }

    #[test]
    fn test_wander_never_finishes_and_stays_near_home() {
        let mut harness = Harness::at(Tile::new(5, 5));
        let mut wander = WanderBehavior::default();
        wander
            .init(
                &owner(Tile::new(5, 5)),
                &BehaviorParams::Wander {
                    radius: 2,
                    chance_to_move: 100,
                },
            )
            .unwrap();

        for _ in 0..200 {
            wander.update(&mut harness.ctx(), 0.25);
            assert!(!wander.is_finished());
            let tile = harness.position.tile();
            assert!(tile.chebyshev_distance(&Tile::new(5, 5)) <= 2);
        }
    }

    #[test]
    fn test_wander_is_a_move_to() {
        assert!(WanderBehavior::default().kind().is_a(BehaviorKind::MoveTo));
    }
}
