//! Encounter resolution
//!
//! What happens when the random encounter scheduled for a fast-forward
//! session comes due: the best scout may spot it in time; otherwise the party
//! is ambushed, on a dedicated combat map when travelling the world map or in
//! place on a local map.

use std::collections::HashSet;

use rand::Rng;

use super::fast_forward::{InterruptOutcome, InterruptReason};
use super::state::Simulation;
use crate::combat::CombatSystem;
use crate::ecs::{EntitySpawn, Owner, Tile};
use crate::ui::{MessageCategory, Ui};
use crate::world::{CombatMapRequest, EncounterGroup};

/// Best odds a scout ever gets, in percent
const MAX_SCOUT_CHANCE: u32 = 95;

impl<C: CombatSystem, U: Ui> Simulation<C, U> {
    pub(super) fn resolve_fast_forward_encounter(&mut self) {
        let Some(group) = self
            .fast_forward
            .as_mut()
            .and_then(|session| session.take_encounter())
        else {
            return;
        };

        if self.scout_spots(&group) {
            log::info!("Encounter {} avoided by scouting", group.id);
            self.ui.log_message(
                "Your scout spotted enemies nearby and the party slipped away.",
                MessageCategory::Combat,
            );
            return;
        }

        let on_world_map = self.on_world_map();
        let anchor = self
            .party
            .traveler(on_world_map)
            .and_then(|entity| self.entities.tile(entity))
            .unwrap_or_default();

        if on_world_map {
            let origin_map = self.active_map.clone().unwrap_or_default();
            self.abort_fast_forward();
            self.ui
                .log_message("You have been ambushed!", MessageCategory::Combat);
            self.switch_to_combat_map(CombatMapRequest {
                origin_map,
                encounter: group,
                from: anchor,
                escape: anchor,
            });
            return;
        }

        match self.interrupt_fast_forward(InterruptReason::Ambush) {
            InterruptOutcome::Cancelled => {
                self.ambush(group, anchor);
            }
            _ => log::info!("Encounter {} passed while the party rested on", group.id),
        }
    }

    fn scout_spots(&mut self, group: &EncounterGroup) -> bool {
        let Some(scout) = self.party.best_scout() else {
            return false;
        };
        if scout.scouting == 0 {
            return false;
        }
        let chance = (scout.scouting * self.config.scout_chance_per_rank)
            .saturating_sub(group.stealth)
            .min(MAX_SCOUT_CHANCE);
        self.rng.gen_range(0..100) < chance
    }

    /// Place `group` around `anchor` on the active map and start combat
    /// with everyone placed.
    ///
    /// Members that find no free tile are logged and detached. If nobody
    /// could be placed the ambush is dropped and combat does not start.
    pub fn ambush(&mut self, group: EncounterGroup, anchor: Tile) -> bool {
        let Some(map_id) = self.active_map.clone() else {
            log::error!("Encounter {} has no map to happen on", group.id);
            return false;
        };

        let mut taken = self.entities.occupied_tiles(&map_id);
        let mut placed = Vec::new();
        for member in &group.members {
            let entity = self
                .entities
                .spawn(EntitySpawn::new(&member.id, &member.entity_type).inactive());
            self.entities.mark_transient(entity);

            match self.free_tile_near(&map_id, anchor, &taken) {
                Some(tile) => {
                    taken.insert(tile);
                    self.entities.set_tile(entity, tile);
                    self.entities.set_owner(entity, Owner::Map(map_id.clone()));
                    self.entities.set_active(entity, true);
                    placed.push(entity);
                }
                None => {
                    log::error!(
                        "No room for {} of encounter {} near {:?}",
                        member.id,
                        group.id,
                        anchor
                    );
                    self.entities.remove(entity);
                }
            }
        }

        if placed.is_empty() {
            log::warn!("Encounter {} dropped, nobody could be placed", group.id);
            return false;
        }
        if !self.start_combat() {
            return false;
        }
        self.join_combat(&placed);
        true
    }

    /// Nearest free tile on rings of growing radius around `anchor`
    fn free_tile_near(&self, map_id: &str, anchor: Tile, taken: &HashSet<Tile>) -> Option<Tile> {
        let map = self.map(map_id)?;
        for radius in 1..=self.config.encounter_placement_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs().max(dy.abs()) != radius {
                        continue;
                    }
                    let tile = Tile::new(anchor.x + dx, anchor.y + dy);
                    if !map.is_blocked(tile) && !taken.contains(&tile) {
                        return Some(tile);
                    }
                }
            }
        }
        None
    }
}
