//! Hourglass - Entry Point
//!
//! Runs a headless simulation: a party walks around a village, rests for the
//! night and then travels the world map, with every decision logged.

use std::time::Duration;

use anyhow::{Context, Result};

use hourglass::behavior::BehaviorParams;
use hourglass::data::{load_map_definitions, SimulationConfig};
use hourglass::entities::PartyMember;
use hourglass::game::{FastForwardCallback, InterruptDecision, InterruptReason};
use hourglass::world::{MapDefinition, MapKind, StaticMap};
use hourglass::{BehaviorKind, EntitySpawn, FastForwardRequest, Simulation, Tile};

/// Target frames per second for the simulation loop
const TARGET_FPS: u64 = 60;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

/// Give up on a scenario after this many frames
const MAX_FRAMES: u32 = 10_000;

const CONFIG_PATH: &str = "assets/simulation.ron";
const MAPS_PATH: &str = "assets/maps.ron";

/// Logs how a rest went
struct RestLog;

impl FastForwardCallback for RestLog {
    fn on_finished(&mut self) {
        log::info!("The party wakes up rested");
    }

    fn on_cancelled(&mut self, hours_passed: f32) {
        log::info!("Rest cut short after {:.1} hours", hours_passed);
    }

    fn on_interrupted(&mut self, reason: InterruptReason, hours_passed: f32) -> InterruptDecision {
        log::info!("Rest interrupted ({:?}) after {:.1} hours", reason, hours_passed);
        InterruptDecision::Accept
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Hourglass v{}", env!("CARGO_PKG_VERSION"));

    let config = SimulationConfig::load_or_default(CONFIG_PATH);
    let mut sim = Simulation::headless(config.clone());

    let definitions = if std::path::Path::new(MAPS_PATH).exists() {
        load_map_definitions(MAPS_PATH).context("loading map definitions")?
    } else {
        default_maps()
    };
    for definition in definitions {
        sim.register_map(Box::new(StaticMap::new(definition, &config)));
    }

    // Party
    let hero = sim
        .entities_mut()
        .spawn(EntitySpawn::new("hero", "Hero").on_map("village").at(Tile::new(5, 5)));
    sim.entities_mut().set_player_controlled(hero);
    let caravan = sim
        .entities_mut()
        .spawn(EntitySpawn::new("caravan", "Caravan").on_map("overworld").at(Tile::new(20, 20)));
    sim.party_mut().add_member(PartyMember::new(hero, 3).with_scouting(2));
    sim.party_mut().set_group_entity(caravan);

    // A villager wandering around the square
    let villager = sim
        .entities_mut()
        .spawn(EntitySpawn::new("villager", "Villager").on_map("village").at(Tile::new(10, 10)));
    sim.entities_mut().add_behavior(
        villager,
        BehaviorKind::Wander,
        &BehaviorParams::Wander {
            radius: 3,
            chance_to_move: 50,
        },
    )?;

    if !sim.enter_map("village") {
        anyhow::bail!("village map missing");
    }
    sim.unpause_game(true);

    // Walk across the village
    sim.command_party(
        hero,
        BehaviorKind::MoveTo,
        &BehaviorParams::MoveTo {
            destination: Tile::new(12, 5),
            speed: 4.0,
        },
    )?;
    run_until(&mut sim, |sim| !sim.entities().runner(hero).is_some_and(|r| !r.is_empty()));
    log::info!("Hero arrived at {:?} on {}", sim.entities().tile(hero), sim.date());

    // Rest for the night
    sim.begin_fast_forward(FastForwardRequest::new("Resting", 8.0), Some(Box::new(RestLog)));
    run_until(&mut sim, |sim| !sim.is_fast_forwarding());
    log::info!("Rest ended ({:?}) on {}", sim.last_fast_forward_outcome(), sim.date());

    // Travel the world map
    sim.switch_to_map("overworld", Tile::new(20, 20));
    if let Some(transition) = sim.take_pending_transition() {
        sim.enter_map(transition.map_id());
    }
    sim.unpause_game(true);
    sim.begin_fast_forward(
        FastForwardRequest::new("Travelling", 12.0).with_random_encounter(),
        None,
    );
    run_until(&mut sim, |sim| !sim.is_fast_forwarding());
    log::info!("Travel ended ({:?}) on {}", sim.last_fast_forward_outcome(), sim.date());
    if let Some(transition) = sim.pending_transition() {
        log::info!("Next map: {}", transition.map_id());
    }

    for message in sim.ui().messages() {
        println!("[{:?}] {}", message.category, message.text);
    }
    println!("{}", sim.date());

    log::info!("Hourglass shutting down");
    Ok(())
}

fn run_until(sim: &mut Simulation, done: impl Fn(&Simulation) -> bool) {
    for _ in 0..MAX_FRAMES {
        if done(sim) {
            return;
        }
        sim.update(FRAME_TIME);
    }
    log::warn!("Scenario did not settle after {} frames", MAX_FRAMES);
}

fn default_maps() -> Vec<MapDefinition> {
    let mut overworld = MapDefinition::new("overworld", MapKind::World, 64, 64);
    overworld.default_combat_map = Some("plains".to_string());
    overworld.encounters.base_chance = 40;
    overworld.encounters.groups.push(hourglass::world::EncounterGroup {
        id: "wolves".to_string(),
        level: None,
        stealth: 5,
        members: vec![hourglass::world::EncounterMember {
            id: "wolf".to_string(),
            entity_type: "Wolf".to_string(),
        }],
    });

    vec![
        overworld,
        MapDefinition::new("village", MapKind::Local, 24, 24),
        MapDefinition::new("plains", MapKind::Combat, 16, 16),
    ]
}
