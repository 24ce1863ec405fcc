//! Wait behavior - idle for a fixed amount of time

use std::any::Any;

use serde::{Deserialize, Serialize};

use super::{
    invalid_params, Behavior, BehaviorContext, BehaviorError, BehaviorFlags, BehaviorKind,
    BehaviorOwner, BehaviorParams, SavedBehavior,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitBehavior {
    flags: BehaviorFlags,
    /// Seconds to wait
    duration: f32,
    /// Seconds waited so far
    waited: f32,
}

impl WaitBehavior {
    pub fn waited(&self) -> f32 {
        self.waited
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

impl Behavior for WaitBehavior {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Wait
    }

    fn init(&mut self, _owner: &BehaviorOwner<'_>, params: &BehaviorParams) -> Result<(), BehaviorError> {
        match params {
            BehaviorParams::Duration(seconds) if *seconds >= 0.0 => {
                self.duration = *seconds;
                self.waited = 0.0;
                Ok(())
            }
            other => Err(invalid_params(self.kind(), other)),
        }
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>, delta: f32) {
        if ctx.paused {
            return;
        }
        self.waited += delta;
    }

    fn is_finished(&self) -> bool {
        self.waited > self.duration
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
        SavedBehavior::Wait(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
