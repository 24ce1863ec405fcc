//! Turn management for combat
//!
//! Handles side order, rounds and the start/end of combat.

use hecs::Entity;

/// What the simulation needs from a combat implementation
pub trait CombatSystem {
    fn start_combat(&mut self);
    fn end_combat(&mut self);
    fn is_combat_in_progress(&self) -> bool;
    fn is_players_turn(&self) -> bool;
    /// Whether the player may leave combat right now
    fn can_player_end_combat(&self) -> bool;
    fn switch_to_next_side(&mut self);
    /// Add an entity to the fight
    fn join(&mut self, entity: Entity, side: Side);
    /// Take an entity out of the fight (died, fled, detached)
    fn leave(&mut self, entity: Entity);
    /// Called every unpaused tick
    fn update(&mut self, _delta: f32) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Hostile,
}

/// Sides take turns; each side acts with all of its members before
/// passing the turn on.
#[derive(Debug, Clone)]
pub struct TurnBasedCombat {
    in_progress: bool,
    /// Sides in turn order
    turn_order: Vec<Side>,
    /// Index of the side whose turn it is
    current_index: usize,
    round: u32,
    combatants: Vec<(Entity, Side)>,
}

impl TurnBasedCombat {
    pub fn new() -> Self {
        Self {
            in_progress: false,
            turn_order: vec![Side::Player, Side::Hostile],
            current_index: 0,
            round: 1,
            combatants: Vec::new(),
        }
    }

    /// The side whose turn it is
    pub fn current_side(&self) -> Option<Side> {
        if !self.in_progress {
            return None;
        }
        self.turn_order.get(self.current_index).copied()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn combatants(&self) -> &[(Entity, Side)] {
        &self.combatants
    }

    pub fn hostiles_remaining(&self) -> usize {
        self.combatants
            .iter()
            .filter(|(_, side)| *side == Side::Hostile)
            .count()
    }
}

impl Default for TurnBasedCombat {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatSystem for TurnBasedCombat {
    fn start_combat(&mut self) {
        if self.in_progress {
            return;
        }
        self.in_progress = true;
        self.current_index = 0;
        self.round = 1;
        log::info!("Combat started");
    }

    fn end_combat(&mut self) {
        if !self.in_progress {
            return;
        }
        self.in_progress = false;
        self.combatants.clear();
        log::info!("Combat ended after {} rounds", self.round);
    }

    fn is_combat_in_progress(&self) -> bool {
        self.in_progress
    }

    fn is_players_turn(&self) -> bool {
        self.current_side() == Some(Side::Player)
    }

    fn can_player_end_combat(&self) -> bool {
        self.is_players_turn() && self.hostiles_remaining() == 0
    }

    fn switch_to_next_side(&mut self) {
        if !self.in_progress {
            return;
        }
        self.current_index += 1;
        if self.current_index >= self.turn_order.len() {
            self.current_index = 0;
            self.round += 1;
        }
        log::debug!("Turn passes to {:?}", self.current_side());
    }

    fn join(&mut self, entity: Entity, side: Side) {
        if !self.combatants.iter().any(|(e, _)| *e == entity) {
            self.combatants.push((entity, side));
        }
    }

    fn leave(&mut self, entity: Entity) {
        self.combatants.retain(|(e, _)| *e != entity);
    }
}
