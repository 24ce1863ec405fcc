//! Map transitions
//!
//! Leaving a map always detaches NPC followers, ends combat and pauses the
//! clock first. The simulation then clears its active map and records a
//! [`MapTransition`] for the map-loading collaborator, which calls
//! [`Simulation::enter_map`] once the new map is ready.

use super::fast_forward::{InterruptOutcome, InterruptReason};
use super::state::Simulation;
use crate::combat::CombatSystem;
use crate::ecs::Tile;
use crate::ui::Ui;
use crate::world::CombatMapRequest;

/// A map change waiting to be carried out
#[derive(Debug, Clone, PartialEq)]
pub enum MapTransition {
    Local {
        map_id: String,
        from: Option<String>,
        start: Tile,
    },
    Combat {
        map_id: String,
        request: CombatMapRequest,
    },
}

impl MapTransition {
    pub fn map_id(&self) -> &str {
        match self {
            MapTransition::Local { map_id, .. } | MapTransition::Combat { map_id, .. } => map_id,
        }
    }
}

impl<C: CombatSystem, U: Ui> Simulation<C, U> {
    pub fn pending_transition(&self) -> Option<&MapTransition> {
        self.pending_transition.as_ref()
    }

    pub fn take_pending_transition(&mut self) -> Option<MapTransition> {
        self.pending_transition.take()
    }

    /// Make a registered map the active one. Returns false for unknown ids.
    pub fn enter_map(&mut self, map_id: &str) -> bool {
        if !self.maps.contains_key(map_id) {
            log::error!("Cannot enter unknown map {}", map_id);
            return false;
        }
        if self
            .pending_transition
            .as_ref()
            .is_some_and(|transition| transition.map_id() == map_id)
        {
            self.pending_transition = None;
        }
        self.active_map = Some(map_id.to_string());
        log::info!("Entered map {}", map_id);
        true
    }

    /// Leave the active map for `map_id`
    pub fn switch_to_map(&mut self, map_id: &str, start: Tile) {
        let from = self.active_map.clone();
        log::info!(
            "Switching from {} to {}",
            from.as_deref().unwrap_or("nowhere"),
            map_id
        );
        self.prepare_map_change();
        self.pending_transition = Some(MapTransition::Local {
            map_id: map_id.to_string(),
            from,
            start,
        });
        self.active_map = None;
    }

    /// Leave the active map without a destination, e.g. before loading a
    /// save that was made off-map
    pub fn leave_map(&mut self) {
        if self.active_map.is_none() {
            return;
        }
        self.prepare_map_change();
        self.active_map = None;
    }

    /// Move the fight described by `request` onto a dedicated combat map.
    /// Returns false if the transition was aborted.
    pub fn switch_to_combat_map(&mut self, request: CombatMapRequest) -> bool {
        if self.interrupt_fast_forward(InterruptReason::Ambush) == InterruptOutcome::Continued {
            return false;
        }

        let combat_map = self
            .active_map()
            .and_then(|map| map.combat_map_id(request.from));
        let Some(map_id) = combat_map else {
            log::error!(
                "No combat map defined for {:?} on {}",
                request.from,
                request.origin_map
            );
            self.active_map = None;
            return false;
        };

        log::info!(
            "Switching to combat map {} for encounter {}",
            map_id,
            request.encounter.id
        );
        self.prepare_map_change();
        self.pending_transition = Some(MapTransition::Combat { map_id, request });
        self.active_map = None;
        true
    }

    fn prepare_map_change(&mut self) {
        // Followers stay on the map they are on
        for follower in self.party.remove_all_non_player_characters() {
            log::debug!("Follower {:?} leaves the party", follower.entity);
        }
        self.end_combat();
        self.pause_game(false);
        if let Some(map) = self.active_map_mut() {
            map.will_change();
        }
    }
}
