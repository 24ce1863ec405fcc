//! Scenario tests driving a whole simulation tick by tick

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use hecs::Entity;

use super::*;
use crate::behavior::{
    Behavior, BehaviorContext, BehaviorError, BehaviorFlags, BehaviorKind, BehaviorOwner,
    BehaviorParams, SavedBehavior, SimCommand, WaitBehavior,
};
use crate::data::SimulationConfig;
use crate::ecs::{EntitySpawn, Owner, Tile};
use crate::entities::PartyMember;
use crate::world::{EncounterGroup, EncounterMember, MapDefinition, MapKind, StaticMap};

const FRAME: Duration = Duration::from_millis(16);
const MAX_FRAMES: usize = 5_000;

// ============================================================================
// Fixtures
// ============================================================================

struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
    decision: InterruptDecision,
}

impl Recorder {
    fn boxed(decision: InterruptDecision) -> (Box<dyn FastForwardCallback>, Rc<RefCell<Vec<String>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder {
            events: events.clone(),
            decision,
        };
        (Box::new(recorder), events)
    }
}

impl FastForwardCallback for Recorder {
    fn on_finished(&mut self) {
        self.events.borrow_mut().push("finished".to_string());
    }

    fn on_cancelled(&mut self, hours_passed: f32) {
        self.events.borrow_mut().push(format!("cancelled {:.1}", hours_passed));
    }

    fn on_interrupted(&mut self, _reason: InterruptReason, hours_passed: f32) -> InterruptDecision {
        self.events.borrow_mut().push(format!("interrupted {:.1}", hours_passed));
        self.decision
    }
}

/// Sends the party to another map on its first update
#[derive(Debug, Default)]
struct Portal {
    flags: BehaviorFlags,
    used: bool,
}

impl Behavior for Portal {
    fn kind(&self) -> BehaviorKind {
        BehaviorKind::Wait
    }

    fn init(&mut self, _owner: &BehaviorOwner<'_>, _params: &BehaviorParams) -> Result<(), BehaviorError> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>, _delta: f32) {
        ctx.commands.push(SimCommand::SwitchToMap {
            map_id: "village".to_string(),
            start: Tile::new(1, 1),
        });
        self.used = true;
    }

    fn is_finished(&self) -> bool {
        self.used
    }

    fn reset(&mut self) {
        self.used = false;
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
        SavedBehavior::Wait(WaitBehavior::default())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        rng_seed: Some(seed),
        ..SimulationConfig::default()
    }
}

fn bandits(count: usize) -> EncounterGroup {
    EncounterGroup {
        id: "bandits".to_string(),
        level: None,
        stealth: 0,
        members: (0..count)
            .map(|_| EncounterMember {
                id: "bandit".to_string(),
                entity_type: "Bandit".to_string(),
            })
            .collect(),
    }
}

fn with_encounter(mut definition: MapDefinition, group: Option<EncounterGroup>) -> MapDefinition {
    if let Some(group) = group {
        definition.encounters.base_chance = 100;
        definition.encounters.groups.push(group);
    }
    definition
}

/// A village (multiplier 60) with the hero at (5, 5), or the middle of
/// smaller maps
fn village(seed: u64, size: i32, group: Option<EncounterGroup>) -> (Simulation, Entity) {
    let config = config(seed);
    let mut sim = Simulation::headless(config.clone());
    let definition = with_encounter(MapDefinition::new("village", MapKind::Local, size, size), group);
    sim.register_map(Box::new(StaticMap::new(definition, &config)));

    let start = Tile::new(5.min(size / 2), 5.min(size / 2));
    let hero = sim
        .entities_mut()
        .spawn(EntitySpawn::new("hero", "Hero").on_map("village").at(start));
    sim.entities_mut().set_player_controlled(hero);
    sim.party_mut().add_member(PartyMember::new(hero, 3));
    assert!(sim.enter_map("village"));
    (sim, hero)
}

/// A world map (multiplier 1200) with the party token at (20, 20)
fn overworld(seed: u64, group: Option<EncounterGroup>, combat_map: bool) -> (Simulation, Entity) {
    let config = config(seed);
    let mut sim = Simulation::headless(config.clone());
    let mut definition = with_encounter(MapDefinition::new("overworld", MapKind::World, 64, 64), group);
    if combat_map {
        definition.default_combat_map = Some("plains".to_string());
    }
    sim.register_map(Box::new(StaticMap::new(definition, &config)));
    sim.register_map(Box::new(StaticMap::new(
        MapDefinition::new("plains", MapKind::Combat, 16, 16),
        &config,
    )));
    sim.register_map(Box::new(StaticMap::new(
        MapDefinition::new("village", MapKind::Local, 16, 16),
        &config,
    )));

    let hero = sim
        .entities_mut()
        .spawn(EntitySpawn::new("hero", "Hero").on_map("village").at(Tile::new(1, 1)));
    let caravan = sim
        .entities_mut()
        .spawn(EntitySpawn::new("caravan", "Caravan").on_map("overworld").at(Tile::new(20, 20)));
    sim.party_mut().add_member(PartyMember::new(hero, 3));
    sim.party_mut().set_group_entity(caravan);
    assert!(sim.enter_map("overworld"));
    (sim, caravan)
}

fn run_frames(sim: &mut Simulation, frames: usize) {
    for _ in 0..frames {
        sim.update(FRAME);
    }
}

fn run_while_fast_forwarding(sim: &mut Simulation) {
    for _ in 0..MAX_FRAMES {
        if !sim.is_fast_forwarding() {
            return;
        }
        sim.update(FRAME);
    }
    panic!("fast-forward never ended");
}

fn is_terminal(event: &str) -> bool {
    event == "finished" || event.starts_with("cancelled") || event.starts_with("interrupted")
}

// ============================================================================
// Fast-forward
// ============================================================================

#[test]
fn test_rest_finishes_once_after_target_duration() {
    let (mut sim, _) = village(1, 20, None);
    let (callback, events) = Recorder::boxed(InterruptDecision::Accept);
    assert!(sim.begin_fast_forward(FastForwardRequest::new("Resting", 8.0), Some(callback)));

    // 8h at x60 is 480s of session time, covered in steps of 0.2 * 1200 / 60
    let session = sim.fast_forward_session().unwrap();
    assert_eq!(session.target_duration(), 480.0);

    run_frames(&mut sim, 120);
    assert!(sim.is_fast_forwarding());
    assert!(events.borrow().is_empty());

    run_frames(&mut sim, 1);
    assert!(!sim.is_fast_forwarding());
    assert_eq!(*events.borrow(), vec!["finished"]);
    assert_eq!(sim.last_fast_forward_outcome(), Some(FastForwardOutcome::Finished));
    assert!(sim.date().total_hours() >= 8.0);

    run_frames(&mut sim, 10);
    assert_eq!(events.borrow().len(), 1);
    assert_eq!(sim.ui().times_progress_shown(), 1);
    assert_eq!(sim.ui().times_progress_hidden(), 1);
}

#[test]
fn test_second_session_is_refused() {
    let (mut sim, _) = village(1, 20, None);
    assert!(sim.begin_fast_forward(FastForwardRequest::new("Resting", 8.0), None));
    assert!(!sim.begin_fast_forward(FastForwardRequest::new("Waiting", 1.0), None));
    assert_eq!(sim.fast_forward_session().unwrap().target_duration(), 480.0);
}

#[test]
fn test_exactly_one_outcome_per_session() {
    for seed in 0..16 {
        let (mut sim, _) = village(seed, 20, Some(bandits(1)));
        let (callback, events) = Recorder::boxed(InterruptDecision::Accept);
        sim.begin_fast_forward(
            FastForwardRequest::new("Resting", 8.0).with_random_encounter(),
            Some(callback),
        );

        if seed % 2 == 1 {
            run_frames(&mut sim, 5);
            sim.request_fast_forward_cancel();
        }
        run_while_fast_forwarding(&mut sim);
        run_frames(&mut sim, 5);

        let terminal = events.borrow().iter().filter(|e| is_terminal(e)).count();
        assert_eq!(terminal, 1, "seed {} produced {:?}", seed, events.borrow());
        assert!(sim.last_fast_forward_outcome().is_some());
    }
}

#[test]
fn test_cancel_is_observed_on_next_tick() {
    let (mut sim, _) = village(1, 20, None);
    let (callback, events) = Recorder::boxed(InterruptDecision::Accept);
    sim.begin_fast_forward(FastForwardRequest::new("Resting", 8.0), Some(callback));
    run_frames(&mut sim, 3);

    assert!(sim.request_fast_forward_cancel());
    assert!(sim.is_fast_forwarding());
    assert!(events.borrow().is_empty());

    run_frames(&mut sim, 1);
    assert!(!sim.is_fast_forwarding());
    assert_eq!(*events.borrow(), vec!["cancelled 0.2"]);
    assert_eq!(sim.last_fast_forward_outcome(), Some(FastForwardOutcome::Cancelled));
    assert!(!sim.request_fast_forward_cancel());
}

#[test]
fn test_declined_interruption_keeps_resting() {
    let (mut sim, _) = village(4, 20, Some(bandits(2)));
    let (callback, events) = Recorder::boxed(InterruptDecision::Decline);
    sim.begin_fast_forward(
        FastForwardRequest::new("Resting", 8.0).with_random_encounter(),
        Some(callback),
    );
    assert!(sim.fast_forward_session().unwrap().pending_encounter().is_some());

    let mut last_elapsed = 0.0;
    while let Some(session) = sim.fast_forward_session() {
        assert!(session.elapsed() >= last_elapsed);
        last_elapsed = session.elapsed();
        sim.update(FRAME);
    }

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("interrupted"));
    assert_eq!(events[1], "finished");
    assert!(!sim.is_combat_in_progress());
    // Nobody was spawned
    assert_eq!(sim.entities().len(), 1);
}

#[test]
fn test_fast_forward_refused_without_map() {
    let mut sim = Simulation::headless(config(1));
    assert!(!sim.begin_fast_forward(FastForwardRequest::new("Resting", 8.0), None));
    assert!(!sim.is_fast_forwarding());

    // Nothing left to block an automatic pause
    sim.pause_game(false);
    assert!(sim.is_paused());
}

#[test]
fn test_interrupt_without_session() {
    let (mut sim, _) = village(1, 20, None);
    assert_eq!(
        sim.interrupt_fast_forward(InterruptReason::Scripted),
        InterruptOutcome::NotRunning
    );
}

#[test]
fn test_automatic_pause_refused_while_fast_forwarding() {
    let (mut sim, _) = village(1, 20, None);
    sim.begin_fast_forward(FastForwardRequest::new("Resting", 1.0), None);
    sim.pause_game(false);
    assert!(!sim.is_paused());
    sim.pause_game(true);
    assert!(sim.is_paused());
}

// ============================================================================
// Encounters
// ============================================================================

#[test]
fn test_local_ambush_places_group_and_starts_combat() {
    let (mut sim, _) = village(2, 20, Some(bandits(2)));
    let (callback, events) = Recorder::boxed(InterruptDecision::Accept);
    sim.begin_fast_forward(
        FastForwardRequest::new("Resting", 8.0).with_random_encounter(),
        Some(callback),
    );
    run_while_fast_forwarding(&mut sim);

    assert_eq!(events.borrow().len(), 1);
    assert!(events.borrow()[0].starts_with("interrupted"));
    assert_eq!(
        sim.last_fast_forward_outcome(),
        Some(FastForwardOutcome::Interrupted(InterruptReason::Ambush))
    );
    assert!(sim.is_combat_in_progress());
    assert!(sim.ui().in_combat_mode());
    assert!(sim.ui().has_message_containing("ambushed"));
    assert!(sim.active_map().unwrap().render_grid());
    assert!(!sim.is_paused());

    let anchor = Tile::new(5, 5);
    let mut tiles = Vec::new();
    for internal_id in ["bandit#2", "bandit#3"] {
        let bandit = sim.entities().find(internal_id).unwrap();
        assert!(sim.entities().is_active(bandit));
        assert!(sim.entities().is_transient(bandit));
        assert_eq!(sim.entities().owner(bandit), Some(Owner::Map("village".to_string())));
        let tile = sim.entities().tile(bandit).unwrap();
        assert_eq!(tile.chebyshev_distance(&anchor), 1);
        tiles.push(tile);
    }
    assert_ne!(tiles[0], tiles[1]);

    // Hero and both bandits are in the fight
    assert_eq!(sim.combat().combatants().len(), 3);
    assert_eq!(sim.combat().hostiles_remaining(), 2);
    for internal_id in ["bandit#2", "bandit#3"] {
        let bandit = sim.entities().find(internal_id).unwrap();
        sim.remove_entity(bandit);
        assert!(!sim.entities().is_active(bandit));
    }
    assert_eq!(sim.combat().hostiles_remaining(), 0);
    assert!(sim.can_player_end_combat());
}

#[test]
fn test_ambush_with_no_room_detaches_members() {
    // A 1x1 map leaves no tile around the hero
    let (mut sim, _) = village(2, 1, Some(bandits(1)));
    let (callback, _events) = Recorder::boxed(InterruptDecision::Accept);
    sim.begin_fast_forward(
        FastForwardRequest::new("Resting", 8.0).with_random_encounter(),
        Some(callback),
    );
    run_while_fast_forwarding(&mut sim);

    assert!(!sim.is_combat_in_progress());
    assert!(!sim.ui().in_combat_mode());
    let bandit = sim.entities().find("bandit#2").unwrap();
    assert!(!sim.entities().is_active(bandit));
    assert_eq!(sim.entities().owner(bandit), Some(Owner::Unassigned));

    // The encounter does not come back
    run_frames(&mut sim, 20);
    assert!(!sim.is_combat_in_progress());
    assert_eq!(sim.entities().len(), 2);
}

#[test]
fn test_world_map_encounter_moves_to_combat_map() {
    let (mut sim, _) = overworld(3, Some(bandits(1)), true);
    let (callback, events) = Recorder::boxed(InterruptDecision::Accept);
    sim.begin_fast_forward(
        FastForwardRequest::new("Travelling", 12.0).with_random_encounter(),
        Some(callback),
    );
    run_while_fast_forwarding(&mut sim);

    // World map ambushes end the session without telling the callback
    assert!(events.borrow().is_empty());
    assert_eq!(sim.last_fast_forward_outcome(), Some(FastForwardOutcome::Ambushed));
    assert!(sim.ui().has_message_containing("ambushed"));
    assert!(sim.active_map_id().is_none());
    assert!(sim.is_paused());

    match sim.pending_transition() {
        Some(MapTransition::Combat { map_id, request }) => {
            assert_eq!(map_id, "plains");
            assert_eq!(request.origin_map, "overworld");
            assert_eq!(request.encounter.id, "bandits");
            assert_eq!(request.from, Tile::new(20, 20));
        }
        other => panic!("unexpected transition {:?}", other),
    }

    assert!(sim.enter_map("plains"));
    assert!(sim.pending_transition().is_none());
}

#[test]
fn test_world_map_encounter_without_combat_map() {
    let (mut sim, _) = overworld(3, Some(bandits(1)), false);
    sim.begin_fast_forward(
        FastForwardRequest::new("Travelling", 12.0).with_random_encounter(),
        None,
    );
    run_while_fast_forwarding(&mut sim);

    assert_eq!(sim.last_fast_forward_outcome(), Some(FastForwardOutcome::Ambushed));
    assert!(sim.active_map_id().is_none());
    assert!(sim.pending_transition().is_none());
    assert!(!sim.is_combat_in_progress());
}

#[test]
fn test_scout_can_spot_ambush() {
    let mut spotted = 0;
    for seed in 0..20 {
        let (mut sim, hero) = village(seed, 20, Some(bandits(1)));
        let mut party = crate::entities::PlayerParty::new();
        party.add_member(PartyMember::new(hero, 3).with_scouting(10));
        *sim.party_mut() = party;

        sim.begin_fast_forward(
            FastForwardRequest::new("Resting", 8.0).with_random_encounter(),
            None,
        );
        run_while_fast_forwarding(&mut sim);

        if sim.ui().has_message_containing("spotted") {
            spotted += 1;
            assert_eq!(sim.last_fast_forward_outcome(), Some(FastForwardOutcome::Finished));
            assert!(!sim.is_combat_in_progress());
        }
    }
    assert!(spotted > 0);
}

// ============================================================================
// Combat mode
// ============================================================================

#[test]
fn test_start_combat_needs_a_map() {
    let mut sim = Simulation::headless(config(1));
    assert!(!sim.start_combat());
    assert!(!sim.is_combat_in_progress());
}

#[test]
fn test_start_combat_abandoned_when_interrupt_declined() {
    let (mut sim, _) = village(1, 20, None);
    let (callback, events) = Recorder::boxed(InterruptDecision::Decline);
    sim.begin_fast_forward(FastForwardRequest::new("Resting", 8.0), Some(callback));

    assert!(!sim.start_combat());
    assert!(sim.is_fast_forwarding());
    assert!(!sim.is_combat_in_progress());
    assert!(!sim.ui().in_combat_mode());
    assert_eq!(*events.borrow(), vec!["interrupted 0.0"]);
}

#[test]
fn test_start_combat_stops_fast_forward() {
    let (mut sim, _) = village(1, 20, None);
    let (callback, events) = Recorder::boxed(InterruptDecision::Accept);
    sim.begin_fast_forward(FastForwardRequest::new("Resting", 8.0), Some(callback));

    assert!(sim.start_combat());
    assert!(!sim.is_fast_forwarding());
    assert_eq!(
        sim.last_fast_forward_outcome(),
        Some(FastForwardOutcome::Interrupted(InterruptReason::Ambush))
    );
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn test_end_combat_restores_ui_and_grid() {
    let (mut sim, _) = village(1, 20, None);
    sim.pause_game(true);
    sim.set_stealth(true);
    assert!(sim.party().is_sneaking());

    assert!(sim.start_combat());
    assert!(!sim.party().is_sneaking());
    assert!(!sim.is_paused());
    assert!(sim.ui().in_combat_mode());
    assert!(sim.active_map().unwrap().render_grid());
    assert!(sim.is_players_turn());

    assert!(sim.end_combat());
    assert!(!sim.ui().in_combat_mode());
    assert!(!sim.active_map().unwrap().render_grid());
    assert!(!sim.end_combat());
}

#[test]
fn test_stealth_refused_on_world_map() {
    let (mut sim, _) = overworld(1, None, true);
    sim.set_stealth(true);
    assert!(!sim.party().is_sneaking());
}

// ============================================================================
// Tick
// ============================================================================

#[test]
fn test_tick_phase_order() {
    let (mut sim, _) = village(1, 20, None);
    sim.update(FRAME);
    assert_eq!(
        sim.last_tick_phases(),
        &[
            TickPhase::MapEntities,
            TickPhase::GameTime,
            TickPhase::GlobalEntities,
            TickPhase::Combat,
        ]
    );

    sim.begin_fast_forward(FastForwardRequest::new("Resting", 1.0), None);
    sim.update(FRAME);
    assert_eq!(sim.last_tick_phases()[0], TickPhase::FastForward);

    let (mut sim, _) = village(1, 20, None);
    sim.pause_game(true);
    sim.update(FRAME);
    assert_eq!(sim.last_tick_phases(), &[TickPhase::MapEntities]);
}

#[test]
fn test_behavior_commands_run_after_entities() {
    let (mut sim, _) = village(1, 20, None);
    let guard = sim
        .entities_mut()
        .spawn(EntitySpawn::new("guard", "Guard").on_map("village").at(Tile::new(6, 5)));
    sim.entities_mut()
        .add_behavior(
            guard,
            BehaviorKind::Attack,
            &BehaviorParams::Attack {
                target: "hero#1".to_string(),
            },
        )
        .unwrap();

    sim.update(Duration::from_millis(600));
    assert_eq!(
        sim.last_tick_phases(),
        &[
            TickPhase::MapEntities,
            TickPhase::Commands,
            TickPhase::GlobalEntities,
            TickPhase::Combat,
        ]
    );
    assert!(sim.is_combat_in_progress());
    assert!(sim.ui().has_message_containing("guard#2 strikes hero#1"));
}

#[test]
fn test_global_entities_update_in_batches() {
    let mut sim = Simulation::headless(config(1));
    let courier = sim
        .entities_mut()
        .spawn(EntitySpawn::new("courier", "Courier").global());
    sim.entities_mut()
        .add_behavior(courier, BehaviorKind::Wait, &BehaviorParams::Duration(0.5))
        .unwrap();

    sim.update(Duration::from_millis(200));
    sim.update(Duration::from_millis(200));
    assert_eq!(sim.entities().runner(courier).unwrap().len(), 1);

    // 0.6s built up, handed over in one go
    sim.update(Duration::from_millis(200));
    assert!(sim.entities().runner(courier).unwrap().is_empty());
}

#[test]
fn test_calendar_stops_during_combat() {
    let (mut sim, _) = village(1, 20, None);
    assert!(sim.start_combat());
    let before = sim.date().total_seconds();
    run_frames(&mut sim, 10);
    assert_eq!(sim.date().total_seconds(), before);

    sim.end_combat();
    run_frames(&mut sim, 1);
    assert!(sim.date().total_seconds() > before);
}

#[test]
fn test_calendar_uses_map_multiplier() {
    let (mut sim, _) = overworld(1, None, true);
    sim.unpause_game(true);
    sim.update(Duration::from_secs(1));
    assert_eq!(sim.date().total_seconds(), 1200.0);
}

#[test]
fn test_idle_party_pauses_on_world_map() {
    let (mut sim, caravan) = overworld(1, None, true);
    sim.update(FRAME);
    assert!(sim.is_paused());
    assert!(!sim.clock().paused_by_player());
    assert_eq!(sim.last_tick_phases().last(), Some(&TickPhase::IdlePause));

    // A travel order lifts the idle pause and keeps the clock running
    sim.command_party(
        caravan,
        BehaviorKind::MoveTo,
        &BehaviorParams::MoveTo {
            destination: Tile::new(40, 20),
            speed: 4.0,
        },
    )
    .unwrap()
    .unwrap();
    assert!(!sim.is_paused());
    assert!(!sim.clock().unpaused_by_player());
    run_frames(&mut sim, 60);
    assert!(!sim.is_paused());
    assert!(sim.entities().tile(caravan).unwrap().x > 20);

    // So does an explicit unpause
    sim.entities_mut().runner_mut(caravan).unwrap().remove_all();
    sim.unpause_game(true);
    sim.update(FRAME);
    assert!(!sim.is_paused());
}

#[test]
fn test_non_verb_command_keeps_idle_pause() {
    let (mut sim, caravan) = overworld(1, None, true);
    sim.update(FRAME);
    assert!(sim.is_paused());

    sim.command_party(caravan, BehaviorKind::Wait, &BehaviorParams::Duration(5.0))
        .unwrap()
        .unwrap();
    assert!(sim.is_paused());
}

#[test]
fn test_map_switch_command_clears_active_map() {
    let (mut sim, caravan) = overworld(1, None, true);
    sim.unpause_game(true);
    sim.entities_mut()
        .runner_mut(caravan)
        .unwrap()
        .insert(Box::new(Portal::default()));

    sim.update(FRAME);
    assert!(sim.active_map_id().is_none());
    assert!(!sim.last_tick_phases().contains(&TickPhase::IdlePause));
    assert!(matches!(
        sim.pending_transition(),
        Some(MapTransition::Local { map_id, from: Some(from), .. })
            if map_id == "village" && from == "overworld"
    ));

    // Nothing on a map runs until the new map is entered
    sim.unpause_game(true);
    sim.update(FRAME);
    assert!(!sim.last_tick_phases().contains(&TickPhase::MapEntities));
    assert!(sim.enter_map("village"));
    assert!(sim.pending_transition().is_none());
}

#[test]
fn test_map_change_drops_followers() {
    let (mut sim, hero) = village(1, 20, None);
    let dog = sim
        .entities_mut()
        .spawn(EntitySpawn::new("dog", "Dog").on_map("village").at(Tile::new(4, 5)));
    sim.party_mut().add_member(PartyMember::new(dog, 1).follower());
    assert!(sim.start_combat());

    sim.switch_to_map("overworld", Tile::new(0, 0));
    assert_eq!(sim.party().members().len(), 1);
    assert_eq!(sim.party().members()[0].entity, hero);
    assert!(!sim.is_combat_in_progress());
    assert!(sim.is_paused());
    // The follower stays where it was
    assert_eq!(sim.entities().owner(dog), Some(Owner::Map("village".to_string())));
}

#[test]
fn test_position_changes_reach_the_map() {
    let (mut sim, hero) = village(1, 20, None);
    sim.update(FRAME);
    // Freshly spawned entities report their first position
    assert!(sim
        .last_position_changes()
        .iter()
        .any(|change| change.entity == hero && change.tile_changed));

    sim.update(FRAME);
    assert!(sim.last_position_changes().is_empty());
}
