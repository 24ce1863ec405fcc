//! Flicker behavior - cosmetic blinking that occupies no slot

use std::any::Any;

use serde::{Deserialize, Serialize};

use super::{
    invalid_params, Behavior, BehaviorContext, BehaviorError, BehaviorFlags, BehaviorKind,
    BehaviorOwner, BehaviorParams, SavedBehavior,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlickerBehavior {
    flags: BehaviorFlags,
    period: f32,
    /// Runs forever when `None`
    duration: Option<f32>,
    elapsed: f32,
    since_toggle: f32,
    visible: bool,
}

impl Default for FlickerBehavior {
    fn default() -> Self {
        Self {
            flags: BehaviorFlags::default(),
            period: 0.25,
            duration: None,
            elapsed: 0.0,
            since_toggle: 0.0,
            visible: true,
        }
    }
}

impl FlickerBehavior {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Behavior for FlickerBehavior {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Flicker
    }

    fn init(&mut self, _owner: &BehaviorOwner<'_>, params: &BehaviorParams) -> Result<(), BehaviorError> {
        match params {
            BehaviorParams::Flicker { period, duration } if *period > 0.0 => {
                *self = Self {
                    period: *period,
                    duration: *duration,
                    ..Self::default()
                };
                Ok(())
            }
            other => Err(invalid_params(self.kind(), other)),
        }
    }

    fn update(&mut self, _ctx: &mut BehaviorContext<'_>, delta: f32) {
        self.elapsed += delta;
        self.since_toggle += delta;
        while self.since_toggle >= self.period {
            self.since_toggle -= self.period;
            self.visible = !self.visible;
        }
    }

    fn is_finished(&self) -> bool {
        self.duration.is_some_and(|duration| self.elapsed >= duration)
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
        SavedBehavior::Flicker(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_remove(&mut self) {
        self.visible = true;
    }
}
