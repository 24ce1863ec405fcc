//! Entity registry
//!
//! Wraps the hecs world with the bookkeeping the simulation needs: unique
//! internal ids, lookup by internal id, ownership changes and the per-tick
//! behavior pass.

use std::collections::{HashMap, HashSet};

use hecs::{Entity, World};
use rand::rngs::StdRng;

use super::components::*;
use crate::behavior::{
    BehaviorContext, BehaviorError, BehaviorId, BehaviorKind, BehaviorOwner, BehaviorParams,
    BehaviorRunner, SimCommand,
};

/// Everything needed to spawn an entity
#[derive(Debug, Clone)]
pub struct EntitySpawn {
    pub id: String,
    pub entity_type: String,
    pub owner: Owner,
    pub tile: Tile,
    pub active: bool,
}

impl EntitySpawn {
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            owner: Owner::Unassigned,
            tile: Tile::default(),
            active: true,
        }
    }

    pub fn on_map(mut self, map_id: impl Into<String>) -> Self {
        self.owner = Owner::Map(map_id.into());
        self
    }

    pub fn global(mut self) -> Self {
        self.owner = Owner::Global;
        self
    }

    pub fn at(mut self, tile: Tile) -> Self {
        self.tile = tile;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// A map-owned entity moved since it was last looked at
#[derive(Debug, Clone, PartialEq)]
pub struct PositionChange {
    pub entity: Entity,
    pub internal_id: String,
    pub map_id: String,
    pub tile: Tile,
    pub tile_changed: bool,
}

/// Shared state lent to every behavior during an entity pass
pub struct TickEnv<'a> {
    pub paused: bool,
    pub in_combat: bool,
    pub rng: &'a mut StdRng,
    pub commands: &'a mut Vec<SimCommand>,
    pub position_changes: &'a mut Vec<PositionChange>,
}

#[derive(Default)]
pub struct EntityRegistry {
    world: World,
    by_internal_id: HashMap<String, Entity>,
    id_counter: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn len(&self) -> usize {
        self.by_internal_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_internal_id.is_empty()
    }

    /// Last number handed out for an internal id
    pub fn id_counter(&self) -> u64 {
        self.id_counter
    }

    pub fn set_id_counter(&mut self, counter: u64) {
        self.id_counter = counter;
    }

    fn next_internal_id(&mut self, entity_type: &str) -> String {
        self.id_counter += 1;
        format!("{}#{}", entity_type, self.id_counter).to_lowercase()
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    pub fn spawn(&mut self, spawn: EntitySpawn) -> Entity {
        let internal_id = self.next_internal_id(&spawn.entity_type);
        let identity = Identity {
            id: spawn.id,
            internal_id,
            entity_type: spawn.entity_type,
        };
        self.insert(
            identity,
            spawn.owner,
            spawn.active,
            TrackedPosition::at_tile(spawn.tile),
            BehaviorRunner::new(),
        )
    }

    /// Insert an entity whose identity already exists, e.g. from a save
    pub fn insert(
        &mut self,
        identity: Identity,
        owner: Owner,
        active: bool,
        position: TrackedPosition,
        runner: BehaviorRunner,
    ) -> Entity {
        let internal_id = identity.internal_id.clone();
        let entity = self
            .world
            .spawn((identity, owner, Active(active), position, runner));
        if let Some(previous) = self.by_internal_id.insert(internal_id.clone(), entity) {
            log::warn!("Internal id {} reused, dropping the older entity", internal_id);
            let _ = self.world.despawn(previous);
        }
        entity
    }

    /// Take an entity out of the world for good
    pub fn despawn(&mut self, entity: Entity) {
        if let Some(internal_id) = self.internal_id(entity) {
            self.by_internal_id.remove(&internal_id);
        }
        let _ = self.world.despawn(entity);
    }

    /// Detach an entity: deactivated, owned by nothing, left out of saves
    pub fn remove(&mut self, entity: Entity) {
        if let Ok(mut runner) = self.world.get::<&mut BehaviorRunner>(entity) {
            runner.remove_all();
        }
        self.set_active(entity, false);
        self.set_owner(entity, Owner::Unassigned);
        let _ = self.world.insert_one(entity, Transient);
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.by_internal_id.clear();
    }

    // ========================================================================
    // Lookup and components
    // ========================================================================

    pub fn find(&self, internal_id: &str) -> Option<Entity> {
        self.by_internal_id.get(internal_id).copied()
    }

    pub fn internal_id(&self, entity: Entity) -> Option<String> {
        self.world
            .get::<&Identity>(entity)
            .ok()
            .map(|identity| identity.internal_id.clone())
    }

    pub fn identity(&self, entity: Entity) -> Option<Identity> {
        self.world.get::<&Identity>(entity).ok().map(|identity| (*identity).clone())
    }

    pub fn owner(&self, entity: Entity) -> Option<Owner> {
        self.world.get::<&Owner>(entity).ok().map(|owner| (*owner).clone())
    }

    /// Change what drives the entity's updates
    pub fn set_owner(&mut self, entity: Entity, owner: Owner) -> bool {
        let Ok(mut current) = self.world.get::<&mut Owner>(entity) else {
            return false;
        };
        *current = owner;
        drop(current);
        if let Ok(mut position) = self.world.get::<&mut TrackedPosition>(entity) {
            position.mark_changed();
        }
        true
    }

    pub fn is_active(&self, entity: Entity) -> bool {
        self.world
            .get::<&Active>(entity)
            .map(|active| active.0)
            .unwrap_or(false)
    }

    pub fn set_active(&mut self, entity: Entity, active: bool) {
        if let Ok(mut current) = self.world.get::<&mut Active>(entity) {
            current.0 = active;
        }
    }

    pub fn is_transient(&self, entity: Entity) -> bool {
        self.world.get::<&Transient>(entity).is_ok()
    }

    pub fn mark_transient(&mut self, entity: Entity) {
        let _ = self.world.insert_one(entity, Transient);
    }

    pub fn set_player_controlled(&mut self, entity: Entity) {
        let _ = self.world.insert_one(entity, PlayerControlled);
    }

    pub fn is_player_controlled(&self, entity: Entity) -> bool {
        self.world.get::<&PlayerControlled>(entity).is_ok()
    }

    pub fn tile(&self, entity: Entity) -> Option<Tile> {
        self.world
            .get::<&TrackedPosition>(entity)
            .ok()
            .map(|position| position.tile())
    }

    pub fn set_tile(&mut self, entity: Entity, tile: Tile) {
        if let Ok(mut position) = self.world.get::<&mut TrackedPosition>(entity) {
            position.set_tile(tile);
        }
    }

    pub fn runner(&self, entity: Entity) -> Option<hecs::Ref<'_, BehaviorRunner>> {
        self.world.get::<&BehaviorRunner>(entity).ok()
    }

    pub fn runner_mut(&mut self, entity: Entity) -> Option<hecs::RefMut<'_, BehaviorRunner>> {
        self.world.get::<&mut BehaviorRunner>(entity).ok()
    }

    /// Entities whose owner matches `filter`
    pub fn owned_by(&self, filter: impl Fn(&Owner) -> bool) -> Vec<Entity> {
        self.world
            .query::<&Owner>()
            .iter()
            .filter(|(_, owner)| filter(owner))
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Tiles taken by active entities on `map_id`
    pub fn occupied_tiles(&self, map_id: &str) -> HashSet<Tile> {
        self.world
            .query::<(&Owner, &Active, &TrackedPosition)>()
            .iter()
            .filter(|(_, (owner, active, _))| active.0 && owner.is_on(map_id))
            .map(|(_, (_, _, position))| position.tile())
            .collect()
    }

    // ========================================================================
    // Behaviors
    // ========================================================================

    pub fn add_behavior(
        &mut self,
        entity: Entity,
        kind: BehaviorKind,
        params: &BehaviorParams,
    ) -> Result<Option<BehaviorId>, BehaviorError> {
        let (identity, position, runner) = self.behavior_parts(entity)?;
        let owner = BehaviorOwner {
            internal_id: &identity.internal_id,
            tile: position.tile(),
        };
        runner.add_behavior(kind, &owner, params)
    }

    pub fn enqueue_behavior(
        &mut self,
        entity: Entity,
        kind: BehaviorKind,
        params: &BehaviorParams,
    ) -> Result<Option<BehaviorId>, BehaviorError> {
        let (identity, position, runner) = self.behavior_parts(entity)?;
        let owner = BehaviorOwner {
            internal_id: &identity.internal_id,
            tile: position.tile(),
        };
        runner.enqueue_behavior(kind, &owner, params)
    }

    fn behavior_parts(
        &mut self,
        entity: Entity,
    ) -> Result<(&Identity, &mut TrackedPosition, &mut BehaviorRunner), BehaviorError> {
        self.world
            .query_one_mut::<(&Identity, &mut TrackedPosition, &mut BehaviorRunner)>(entity)
            .map_err(|_| BehaviorError::NoRunner(format!("{:?}", entity)))
    }

    /// Run one behavior pass over every active entity whose owner matches
    pub fn tick_owned_by(&mut self, filter: impl Fn(&Owner) -> bool, delta: f32, env: &mut TickEnv<'_>) {
        for (entity, (identity, owner, active, position, runner)) in self.world.query_mut::<(
            &Identity,
            &Owner,
            &Active,
            &mut TrackedPosition,
            &mut BehaviorRunner,
        )>() {
            if !active.0 || !filter(owner) {
                continue;
            }

            report_position(entity, identity, owner, position, env.position_changes);
            let mut ctx = BehaviorContext {
                owner: &identity.internal_id,
                position: &mut *position,
                paused: env.paused,
                in_combat: env.in_combat,
                rng: &mut *env.rng,
                commands: &mut *env.commands,
            };
            runner.tick(&mut ctx, delta);
            report_position(entity, identity, owner, position, env.position_changes);
        }
    }
}

fn report_position(
    entity: Entity,
    identity: &Identity,
    owner: &Owner,
    position: &mut TrackedPosition,
    out: &mut Vec<PositionChange>,
) {
    let Some(map_id) = owner.map_id() else {
        return;
    };
    let changes = position.take_changes();
    if changes.moved {
        out.push(PositionChange {
            entity,
            internal_id: identity.internal_id.clone(),
            map_id: map_id.to_string(),
            tile: position.tile(),
            tile_changed: changes.tile_changed,
        });
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    struct Sinks {
        rng: StdRng,
        commands: Vec<SimCommand>,
        changes: Vec<PositionChange>,
    }

    impl Sinks {
        fn new() -> Self {
            Self {
                rng: StdRng::seed_from_u64(1),
                commands: Vec::new(),
                changes: Vec::new(),
            }
        }

        fn env(&mut self) -> TickEnv<'_> {
            TickEnv {
                paused: false,
                in_combat: false,
                rng: &mut self.rng,
                commands: &mut self.commands,
                position_changes: &mut self.changes,
            }
        }
    }

    #[test]
    fn test_internal_ids_are_unique_and_lowercase() {
        let mut registry = EntityRegistry::new();
        let a = registry.spawn(EntitySpawn::new("wolf", "Wolf"));
        let b = registry.spawn(EntitySpawn::new("wolf", "Wolf"));

        assert_eq!(registry.internal_id(a).as_deref(), Some("wolf#1"));
        assert_eq!(registry.internal_id(b).as_deref(), Some("wolf#2"));
        assert_eq!(registry.find("wolf#2"), Some(b));
        assert_eq!(registry.id_counter(), 2);
    }

    #[test]
    fn test_tick_skips_inactive_and_other_owners() {
        let mut registry = EntityRegistry::new();
        let mut sinks = Sinks::new();
        let walking = registry.spawn(EntitySpawn::new("a", "villager").on_map("village"));
        let asleep = registry.spawn(EntitySpawn::new("b", "villager").on_map("village").inactive());
        let elsewhere = registry.spawn(EntitySpawn::new("c", "villager").on_map("castle"));
        let params = BehaviorParams::MoveTo {
            destination: Tile::new(2, 0),
            speed: 1.0,
        };
        for entity in [walking, asleep, elsewhere] {
            registry.add_behavior(entity, BehaviorKind::MoveTo, &params).unwrap();
        }

        registry.tick_owned_by(|owner| owner.is_on("village"), 1.0, &mut sinks.env());

        assert_eq!(registry.tile(walking), Some(Tile::new(1, 0)));
        assert_eq!(registry.tile(asleep), Some(Tile::new(0, 0)));
        assert_eq!(registry.tile(elsewhere), Some(Tile::new(0, 0)));
    }

    #[test]
    fn test_position_changes_reported_for_map_entities_only() {
        let mut registry = EntityRegistry::new();
        let mut sinks = Sinks::new();
        let on_map = registry.spawn(EntitySpawn::new("a", "guard").on_map("village"));
        registry.spawn(EntitySpawn::new("b", "weather").global());

        registry.tick_owned_by(|_| true, 0.1, &mut sinks.env());
        assert_eq!(sinks.changes.len(), 1);
        assert_eq!(sinks.changes[0].entity, on_map);

        sinks.changes.clear();
        registry.tick_owned_by(|_| true, 0.1, &mut sinks.env());
        assert!(sinks.changes.is_empty());
    }

    #[test]
    fn test_remove_detaches_entity() {
        let mut registry = EntityRegistry::new();
        let entity = registry.spawn(EntitySpawn::new("a", "bandit").on_map("village"));
        registry
            .add_behavior(entity, BehaviorKind::Wait, &BehaviorParams::Duration(5.0))
            .unwrap();

        registry.remove(entity);
        assert!(!registry.is_active(entity));
        assert_eq!(registry.owner(entity), Some(Owner::Unassigned));
        assert!(registry.is_transient(entity));
        assert!(registry.runner(entity).unwrap().is_empty());
    }

    #[test]
    fn test_occupied_tiles() {
        let mut registry = EntityRegistry::new();
        registry.spawn(EntitySpawn::new("a", "guard").on_map("village").at(Tile::new(1, 1)));
        registry.spawn(EntitySpawn::new("b", "guard").on_map("village").at(Tile::new(2, 2)).inactive());
        let occupied = registry.occupied_tiles("village");
        assert!(occupied.contains(&Tile::new(1, 1)));
        assert!(!occupied.contains(&Tile::new(2, 2)));
    }
}
