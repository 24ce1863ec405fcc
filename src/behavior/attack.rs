//! Attack behavior
//!
//! Winds up for a moment, then strikes its target. Striking outside of
//! combat starts it.

use std::any::Any;

use serde::{Deserialize, Serialize};

use super::{
    Behavior, BehaviorContext, BehaviorError, BehaviorFlags, BehaviorKind, BehaviorOwner,
    BehaviorParams, SavedBehavior, SimCommand,
};

/// Seconds between starting the attack and the strike
pub const ATTACK_WIND_UP: f32 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackBehavior {
    flags: BehaviorFlags,
    target: String,
    wind_up: f32,
    struck: bool,
}

impl AttackBehavior {
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Behavior for AttackBehavior {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Attack
    }

    fn init(&mut self, _owner: &BehaviorOwner<'_>, params: &BehaviorParams) -> Result<(), BehaviorError> {
        match params {
            BehaviorParams::Attack { target } if !target.is_empty() => {
                self.target = target.clone();
                self.wind_up = 0.0;
                self.struck = false;
                Ok(())
            }
            _ => Err(BehaviorError::MissingTarget { kind: self.kind() }),
        }
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>, delta: f32) {
        if ctx.paused || self.struck {
            return;
        }
        self.wind_up += delta;
        if self.wind_up < ATTACK_WIND_UP {
            return;
        }

        if !ctx.in_combat {
            ctx.commands.push(SimCommand::StartCombat);
        }
        ctx.commands
            .push(SimCommand::Message(format!("{} strikes {}", ctx.owner, self.target)));
        self.struck = true;
    }

    fn is_finished(&self) -> bool {
        self.struck
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
        SavedBehavior::Attack(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::test_support::{owner, Harness};
    use crate::ecs::Tile;

    fn attack(target: &str) -> AttackBehavior {
        let mut attack = AttackBehavior::default();
        attack
            .init(
                &owner(Tile::new(0, 0)),
                &BehaviorParams::Attack {
                    target: target.to_string(),
                },
            )
            .unwrap();
        attack
    }

    #[test]
    fn test_strike_outside_combat_starts_combat() {
        let mut harness = Harness::at(Tile::new(0, 0));
        let mut attack = attack("wolf#3");

        attack.update(&mut harness.ctx(), ATTACK_WIND_UP);
        assert!(attack.is_finished());
        assert_eq!(harness.commands[0], SimCommand::StartCombat);
        assert_eq!(harness.commands.len(), 2);
    }

    #[test]
    fn test_strike_in_combat_only_reports() {
        let mut harness = Harness::at(Tile::new(0, 0));
        harness.in_combat = true;
        let mut attack = attack("wolf#3");

        attack.update(&mut harness.ctx(), 0.2);
        assert!(harness.commands.is_empty());
        attack.update(&mut harness.ctx(), 0.4);
        assert_eq!(
            harness.commands,
            vec![SimCommand::Message("hero#1 strikes wolf#3".to_string())]
        );
    }

    #[test]
    fn test_requires_target() {
        let mut attack = AttackBehavior::default();
        let err = attack.init(&owner(Tile::new(0, 0)), &BehaviorParams::Duration(1.0));
        assert_eq!(err, Err(BehaviorError::MissingTarget { kind: BehaviorKind::Attack }));
    }
}
