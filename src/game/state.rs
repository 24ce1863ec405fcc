//! Simulation state
//!
//! [`Simulation`] owns the world clock, the fast-forward session, the entity
//! registry and the collaborators (maps, combat, UI, party), and drives them
//! once per frame through [`Simulation::update`].

use std::collections::HashMap;
use std::time::Duration;

use hecs::Entity;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::fast_forward::{FastForwardOutcome, FastForwardSession};
use super::time::{GameDate, WorldClock};
use super::transition::MapTransition;
use crate::behavior::{BehaviorError, BehaviorId, BehaviorKind, BehaviorParams, SimCommand};
use crate::combat::{CombatSystem, TurnBasedCombat};
use crate::data::SimulationConfig;
use crate::ecs::{EntityRegistry, Owner, PositionChange, TickEnv};
use crate::entities::PlayerParty;
use crate::ui::{HeadlessUi, MessageCategory, Ui};
use crate::world::GameMap;

/// The steps of one tick, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    FastForward,
    MapEntities,
    Commands,
    GameTime,
    GlobalEntities,
    Combat,
    IdlePause,
}

/// Top-level simulation controller
pub struct Simulation<C = TurnBasedCombat, U = HeadlessUi> {
    pub(super) config: SimulationConfig,
    pub(super) clock: WorldClock,
    pub(super) fast_forward: Option<FastForwardSession>,
    pub(super) last_fast_forward_outcome: Option<FastForwardOutcome>,
    pub(super) entities: EntityRegistry,
    pub(super) party: PlayerParty,
    pub(super) maps: HashMap<String, Box<dyn GameMap>>,
    pub(super) active_map: Option<String>,
    pub(super) pending_transition: Option<MapTransition>,
    pub(super) combat: C,
    pub(super) ui: U,
    pub(super) rng: StdRng,
    commands: Vec<SimCommand>,
    position_changes: Vec<PositionChange>,
    last_tick_phases: Vec<TickPhase>,
}

impl Simulation<TurnBasedCombat, HeadlessUi> {
    /// A simulation with the default combat and no UI frontend
    pub fn headless(config: SimulationConfig) -> Self {
        Self::new(config, TurnBasedCombat::new(), HeadlessUi::new())
    }
}

impl<C: CombatSystem, U: Ui> Simulation<C, U> {
    pub fn new(config: SimulationConfig, combat: C, ui: U) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            clock: WorldClock::new(config.calendar),
            config,
            fast_forward: None,
            last_fast_forward_outcome: None,
            entities: EntityRegistry::new(),
            party: PlayerParty::new(),
            maps: HashMap::new(),
            active_map: None,
            pending_transition: None,
            combat,
            ui,
            rng,
            commands: Vec::new(),
            position_changes: Vec::new(),
            last_tick_phases: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &WorldClock {
        &self.clock
    }

    pub fn date(&self) -> &GameDate {
        self.clock.date()
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    pub fn party(&self) -> &PlayerParty {
        &self.party
    }

    pub fn party_mut(&mut self) -> &mut PlayerParty {
        &mut self.party
    }

    pub fn combat(&self) -> &C {
        &self.combat
    }

    pub fn combat_mut(&mut self) -> &mut C {
        &mut self.combat
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// Phases run by the most recent tick
    pub fn last_tick_phases(&self) -> &[TickPhase] {
        &self.last_tick_phases
    }

    /// Map entities that moved during the most recent tick
    pub fn last_position_changes(&self) -> &[PositionChange] {
        &self.position_changes
    }

    pub fn set_date(&mut self, date: GameDate) {
        self.clock.set_date(date);
    }

    /// Jump the calendar forward, e.g. for a scripted time skip
    pub fn advance_game_seconds(&mut self, seconds: f64) {
        self.clock.date_mut().add_seconds(seconds);
    }

    // ========================================================================
    // Maps
    // ========================================================================

    /// Make a map available. Replaces a map with the same id.
    pub fn register_map(&mut self, map: Box<dyn GameMap>) {
        let id = map.id().to_string();
        if self.maps.insert(id.clone(), map).is_some() {
            log::warn!("Map {} registered twice, keeping the newer one", id);
        }
    }

    pub fn map(&self, id: &str) -> Option<&dyn GameMap> {
        self.maps.get(id).map(|map| map.as_ref())
    }

    pub fn active_map_id(&self) -> Option<&str> {
        self.active_map.as_deref()
    }

    pub fn active_map(&self) -> Option<&dyn GameMap> {
        self.active_map.as_deref().and_then(|id| self.map(id))
    }

    pub(super) fn active_map_mut(&mut self) -> Option<&mut Box<dyn GameMap>> {
        let id = self.active_map.as_deref()?;
        self.maps.get_mut(id)
    }

    pub(super) fn active_time_multiplier(&self) -> Option<u32> {
        self.active_map().map(|map| map.time_multiplier())
    }

    pub(super) fn on_world_map(&self) -> bool {
        self.active_map().is_some_and(|map| map.is_world_map())
    }

    // ========================================================================
    // Pause
    // ========================================================================

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Pause the clock. An automatic pause is refused while fast-forwarding.
    pub fn pause_game(&mut self, by_player: bool) {
        if !by_player && self.fast_forward.is_some() {
            return;
        }
        self.clock.pause(by_player);
    }

    pub fn unpause_game(&mut self, by_player: bool) {
        self.clock.unpause(by_player);
    }

    // ========================================================================
    // Player commands
    // ========================================================================

    /// Give `entity` a behavior on the player's behalf.
    ///
    /// A verb issued on a world map lifts the idle pause. The clock does not
    /// count it as a player unpause, so the party pauses again once idle.
    pub fn command_party(
        &mut self,
        entity: Entity,
        kind: BehaviorKind,
        params: &BehaviorParams,
    ) -> Result<Option<BehaviorId>, BehaviorError> {
        let added = self.entities.add_behavior(entity, kind, params)?;
        if added.is_some() && kind.is_verb() && self.on_world_map() {
            self.unpause_game(false);
        }
        Ok(added)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance the simulation by one frame
    pub fn update(&mut self, delta: Duration) {
        self.last_tick_phases.clear();
        self.position_changes.clear();

        let delta = self.update_fast_forward(delta.as_secs_f32());
        self.update_game_state(delta);
    }

    pub(super) fn trace(&mut self, phase: TickPhase) {
        self.last_tick_phases.push(phase);
    }

    fn update_game_state(&mut self, delta: f32) {
        if let Some(map_id) = self.active_map.clone() {
            self.trace(TickPhase::MapEntities);
            if let Some(map) = self.maps.get_mut(&map_id) {
                map.update(delta);
            }
            self.run_entities(|owner| owner.is_on(&map_id), delta);
            self.dispatch_position_changes();
        }

        if !self.commands.is_empty() {
            self.trace(TickPhase::Commands);
            self.apply_commands();
        }

        if self.clock.is_paused() {
            return;
        }

        // The active map may have changed above
        if !self.combat.is_combat_in_progress() {
            if let Some(multiplier) = self.active_time_multiplier() {
                self.trace(TickPhase::GameTime);
                self.clock.advance(delta, multiplier);
            }
        }

        self.trace(TickPhase::GlobalEntities);
        if let Some(accumulated) = self
            .clock
            .accumulate_global(delta, self.config.global_update_interval)
        {
            self.run_entities(|owner| *owner == Owner::Global, accumulated);
        }

        self.trace(TickPhase::Combat);
        self.combat.update(delta);

        self.check_idle_pause();
    }

    fn run_entities(&mut self, filter: impl Fn(&Owner) -> bool, delta: f32) {
        let mut env = TickEnv {
            paused: self.clock.is_paused(),
            in_combat: self.combat.is_combat_in_progress(),
            rng: &mut self.rng,
            commands: &mut self.commands,
            position_changes: &mut self.position_changes,
        };
        self.entities.tick_owned_by(filter, delta, &mut env);
    }

    fn dispatch_position_changes(&mut self) {
        for change in &self.position_changes {
            if let Some(map) = self.maps.get_mut(&change.map_id) {
                map.entity_moved(change);
            }
        }
    }

    fn apply_commands(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            match command {
                SimCommand::SwitchToMap { map_id, start } => self.switch_to_map(&map_id, start),
                SimCommand::StartCombat => {
                    self.start_combat();
                }
                SimCommand::EndCombat => {
                    self.end_combat();
                }
                SimCommand::Message(text) => self.ui.log_message(&text, MessageCategory::System),
            }
        }
    }

    /// Pause when the party idles on a world map. Skipped when no map is
    /// active, which includes the tick in which a map switch cleared it.
    fn check_idle_pause(&mut self) {
        let Some(map) = self.active_map() else {
            return;
        };
        if !map.is_world_map()
            || self.combat.is_combat_in_progress()
            || self.fast_forward.is_some()
            || self.clock.unpaused_by_player()
        {
            return;
        }
        if self.party.has_active_verb_behavior(&self.entities, true) {
            return;
        }
        self.trace(TickPhase::IdlePause);
        log::debug!("Party idle on the world map, pausing");
        self.pause_game(false);
    }
}
