//! Combat mode
//!
//! Starting and ending combat, in cooperation with the fast-forward session
//! and the world clock. Turn order itself belongs to the combat system.

use hecs::Entity;

use super::fast_forward::{InterruptOutcome, InterruptReason};
use super::state::Simulation;
use crate::combat::{CombatSystem, Side};
use crate::ui::Ui;

impl<C: CombatSystem, U: Ui> Simulation<C, U> {
    pub fn is_combat_in_progress(&self) -> bool {
        self.combat.is_combat_in_progress()
    }

    /// Enter combat on the active map. Returns false if combat could not
    /// start: no active map, or a running fast-forward refused to stop.
    pub fn start_combat(&mut self) -> bool {
        if self.active_map.is_none() {
            log::error!("Cannot start combat without an active map");
            return false;
        }
        if self.interrupt_fast_forward(InterruptReason::Ambush) == InterruptOutcome::Continued
            || self.fast_forward.is_some()
        {
            log::info!("Combat start abandoned, fast-forward goes on");
            return false;
        }

        self.set_stealth(false);
        self.combat.start_combat();
        self.ui.enter_combat_mode();
        self.unpause_game(false);
        if let Some(map) = self.active_map_mut() {
            map.set_render_grid(true);
        }
        true
    }

    /// Leave combat. Does nothing unless combat is in progress.
    pub fn end_combat(&mut self) -> bool {
        if !self.combat.is_combat_in_progress() {
            return false;
        }
        self.combat.end_combat();
        self.ui.exit_combat_mode();
        self.ui.stop_target_selection();
        if let Some(map) = self.active_map_mut() {
            map.set_render_grid(false);
        }
        true
    }

    /// Bring the player characters and `hostiles` into the fight
    pub(super) fn join_combat(&mut self, hostiles: &[Entity]) {
        for member in self.party.player_characters() {
            self.combat.join(member.entity, Side::Player);
        }
        for &entity in hostiles {
            self.combat.join(entity, Side::Hostile);
        }
    }

    /// Detach an entity and take it out of any fight
    pub fn remove_entity(&mut self, entity: Entity) {
        self.combat.leave(entity);
        self.entities.remove(entity);
    }

    pub fn switch_to_next_side(&mut self) {
        self.combat.switch_to_next_side();
    }

    pub fn is_players_turn(&self) -> bool {
        self.combat.is_players_turn()
    }

    pub fn can_player_end_combat(&self) -> bool {
        self.combat.can_player_end_combat()
    }

    /// Toggle sneaking for the player characters. Only local maps allow it.
    pub fn set_stealth(&mut self, sneaking: bool) {
        if sneaking && (self.active_map.is_none() || self.on_world_map()) {
            return;
        }
        self.party.set_stealth(sneaking);
    }
}
