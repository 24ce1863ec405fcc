//! Player party
//!
//! The characters travelling with the player, plus the group token that
//! represents them on world maps.

use hecs::Entity;

use crate::behavior::VERB_BEHAVIORS;
use crate::ecs::EntityRegistry;

/// One character in the party
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyMember {
    pub entity: Entity,
    pub level: u32,
    /// Scouting skill rank
    pub scouting: u32,
    /// NPC followers are not player controlled
    pub player_controlled: bool,
    pub sneaking: bool,
}

impl PartyMember {
    pub fn new(entity: Entity, level: u32) -> Self {
        Self {
            entity,
            level,
            scouting: 0,
            player_controlled: true,
            sneaking: false,
        }
    }

    pub fn with_scouting(mut self, rank: u32) -> Self {
        self.scouting = rank;
        self
    }

    pub fn follower(mut self) -> Self {
        self.player_controlled = false;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerParty {
    members: Vec<PartyMember>,
    /// Token used on world maps
    group_entity: Option<Entity>,
}

impl PlayerParty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, member: PartyMember) {
        if !self.members.iter().any(|m| m.entity == member.entity) {
            self.members.push(member);
        }
    }

    pub fn set_group_entity(&mut self, entity: Entity) {
        self.group_entity = Some(entity);
    }

    pub fn group_entity(&self) -> Option<Entity> {
        self.group_entity
    }

    pub fn members(&self) -> &[PartyMember] {
        &self.members
    }

    pub fn player_characters(&self) -> impl Iterator<Item = &PartyMember> + '_ {
        self.members.iter().filter(|m| m.player_controlled)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Rounded average level of the player characters
    pub fn average_level(&self) -> u32 {
        let (total, count) = self
            .player_characters()
            .fold((0u32, 0u32), |(total, count), m| (total + m.level, count + 1));
        if count == 0 {
            return 0;
        }
        (total as f32 / count as f32).round() as u32
    }

    /// The player character with the highest scouting rank
    pub fn best_scout(&self) -> Option<&PartyMember> {
        self.player_characters().max_by_key(|m| m.scouting)
    }

    /// Who stands for the party on the current map
    pub fn traveler(&self, on_world_map: bool) -> Option<Entity> {
        if on_world_map {
            self.group_entity
        } else {
            self.player_characters().next().map(|m| m.entity)
        }
    }

    /// Drop NPC followers, returning them
    pub fn remove_all_non_player_characters(&mut self) -> Vec<PartyMember> {
        let (kept, removed): (Vec<_>, Vec<_>) =
            self.members.drain(..).partition(|m| m.player_controlled);
        self.members = kept;
        removed
    }

    /// Does the party have a command in progress?
    pub fn has_active_verb_behavior(&self, registry: &EntityRegistry, on_world_map: bool) -> bool {
        let busy = |entity: Entity| {
            registry
                .runner(entity)
                .map(|runner| runner.has_active(VERB_BEHAVIORS))
                .unwrap_or(false)
        };
        if on_world_map {
            return self.group_entity.map(busy).unwrap_or(false);
        }
        self.player_characters().any(|m| busy(m.entity))
    }

    pub fn set_stealth(&mut self, sneaking: bool) {
        for member in self.members.iter_mut().filter(|m| m.player_controlled) {
            member.sneaking = sneaking;
        }
    }

    pub fn is_sneaking(&self) -> bool {
        self.player_characters().any(|m| m.sneaking)
    }
}
