#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative creature arena and drone records for Sonar Scout.

mod estimate;

use sonar_scout_core::{
    ClearReason, Color, Command, CreatureId, CreatureKind, CreatureStatus, DroneId, EngineConfig,
    Event, Fix, Owner, Point, Quadrant, Sighting,
};
use tracing::warn;

use crate::estimate::Estimate;

/// Represents the authoritative state accumulated across turns.
#[derive(Debug)]
pub struct World {
    map_max: i32,
    creature_speed_bound: i32,
    monster_speed_bound: i32,
    light_cooldown_turns: i32,
    max_targets_per_drone: usize,
    turn: u32,
    own_score: u32,
    foe_score: u32,
    radar_reported: bool,
    creatures: Vec<Creature>,
    drones: Vec<Drone>,
}

impl World {
    /// Creates an empty world shaped by the provided configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            map_max: config.map_max,
            creature_speed_bound: config.creature_speed_bound,
            monster_speed_bound: config.monster_speed_bound,
            light_cooldown_turns: config.light_cooldown_turns,
            max_targets_per_drone: config.max_targets_per_drone,
            turn: 0,
            own_score: 0,
            foe_score: 0,
            radar_reported: false,
            creatures: Vec::new(),
            drones: Vec::new(),
        }
    }

    fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        match self
            .creatures
            .binary_search_by_key(&id, |creature| creature.id)
        {
            Ok(index) => Some(&mut self.creatures[index]),
            Err(_) => {
                warn!(
                    turn = self.turn,
                    creature = id.get(),
                    "observation refers to an unknown creature"
                );
                None
            }
        }
    }

    fn drone(&self, id: DroneId) -> Option<&Drone> {
        self.drones.iter().find(|drone| drone.id == id)
    }

    fn own_drone_mut(&mut self, id: DroneId) -> Option<&mut Drone> {
        let turn = self.turn;
        let found = self
            .drones
            .iter_mut()
            .find(|drone| drone.id == id && drone.owner == Owner::Me);
        if found.is_none() {
            warn!(turn, drone = id.get(), "command refers to an unknown drone");
        }
        found
    }

    fn register_creature(&mut self, id: CreatureId, color: Color, kind: CreatureKind) {
        let Err(index) = self
            .creatures
            .binary_search_by_key(&id, |creature| creature.id)
        else {
            return;
        };

        let band = kind.depth_band(self.map_max);
        self.creatures.insert(
            index,
            Creature {
                id,
                kind,
                color,
                status: CreatureStatus::Unlocated,
                foe_scanned: false,
                fix: None,
                last_seen: None,
                radar_seen: false,
                estimate: Estimate::new(band),
            },
        );
    }

    fn begin_turn(&mut self, turn: u32) {
        self.turn = turn;
        self.radar_reported = false;
        for creature in &mut self.creatures {
            creature.fix = None;
            creature.radar_seen = false;
        }
        for drone in &mut self.drones {
            drone.pending_scans.clear();
        }
    }

    fn record_registrations(
        &mut self,
        owner: Owner,
        creatures: Vec<CreatureId>,
        out_events: &mut Vec<Event>,
    ) {
        for id in creatures {
            let Some(creature) = self.creature_mut(id) else {
                continue;
            };

            let newly_registered = match owner {
                Owner::Me => {
                    let fresh = creature.status != CreatureStatus::Registered;
                    creature.status = CreatureStatus::Registered;
                    fresh
                }
                Owner::Foe => !std::mem::replace(&mut creature.foe_scanned, true),
            };

            if newly_registered {
                out_events.push(Event::CreatureRegistered {
                    creature: id,
                    owner,
                });
            }
        }
    }

    fn update_drone(
        &mut self,
        owner: Owner,
        id: DroneId,
        position: Point,
        battery: i32,
        emergency: bool,
        out_events: &mut Vec<Event>,
    ) {
        if let Some(drone) = self.drones.iter_mut().find(|drone| drone.id == id) {
            drone.position = position;
            drone.battery = battery;
            drone.emergency = emergency;
            return;
        }

        let index = self.drones.partition_point(|drone| drone.id < id);
        self.drones.insert(
            index,
            Drone {
                id,
                owner,
                position,
                battery,
                emergency,
                light_cooldown: 0,
                targets: Vec::new(),
                pending_scans: Vec::new(),
                surfacing: false,
            },
        );
        out_events.push(Event::DroneDiscovered { drone: id, owner });
    }

    fn record_drone_scan(&mut self, drone: DroneId, id: CreatureId, out_events: &mut Vec<Event>) {
        let Some(owner) = self.drone(drone).map(|record| record.owner) else {
            warn!(drone = drone.get(), "scan reported by an unknown drone");
            return;
        };

        let Some(creature) = self.creature_mut(id) else {
            return;
        };

        match owner {
            Owner::Foe => creature.foe_scanned = true,
            Owner::Me => {
                if !creature.status.is_secured() {
                    creature.status = CreatureStatus::Scanned;
                    out_events.push(Event::CreatureScanned { creature: id, drone });
                }
                if let Some(record) = self.own_drone_mut(drone) {
                    if !record.pending_scans.contains(&id) {
                        record.pending_scans.push(id);
                    }
                }
            }
        }
    }

    fn observe_creature(&mut self, id: CreatureId, fix: Fix, out_events: &mut Vec<Event>) {
        let turn = self.turn;
        let Some(creature) = self.creature_mut(id) else {
            return;
        };

        creature.fix = Some(fix);
        creature.last_seen = Some(Sighting { turn, fix });
        creature.estimate.collapse(fix.position);
        if matches!(
            creature.status,
            CreatureStatus::Unlocated | CreatureStatus::Departed
        ) {
            creature.status = CreatureStatus::Located;
            out_events.push(Event::CreatureLocated { creature: id });
        }
    }

    fn observe_radar(
        &mut self,
        drone: DroneId,
        id: CreatureId,
        quadrant: Quadrant,
        out_events: &mut Vec<Event>,
    ) {
        let Some(origin) = self
            .drone(drone)
            .filter(|record| record.owner == Owner::Me)
            .map(|record| record.position)
        else {
            warn!(drone = drone.get(), "radar blip from an unknown drone");
            return;
        };

        self.radar_reported = true;
        let Some(creature) = self.creature_mut(id) else {
            return;
        };

        creature.radar_seen = true;
        if creature.fix.is_none() {
            creature.estimate.tighten(origin, quadrant);
        }
        if creature.status == CreatureStatus::Unlocated {
            creature.status = CreatureStatus::Located;
            out_events.push(Event::CreatureLocated { creature: id });
        }
    }

    fn seal_observations(&mut self, out_events: &mut Vec<Event>) {
        let pending: Vec<CreatureId> = self
            .drones
            .iter()
            .filter(|drone| drone.owner == Owner::Me)
            .flat_map(|drone| drone.pending_scans.iter().copied())
            .collect();

        let radar_reported = self.radar_reported;
        for creature in &mut self.creatures {
            // Scans die with an emergency: the referee stops listing them.
            if creature.status == CreatureStatus::Scanned && !pending.contains(&creature.id) {
                creature.status = CreatureStatus::Located;
            }

            let unseen = !creature.radar_seen && creature.fix.is_none();
            let claimable = matches!(
                creature.status,
                CreatureStatus::Unlocated | CreatureStatus::Located
            );
            if radar_reported && unseen && claimable {
                creature.status = CreatureStatus::Departed;
                out_events.push(Event::CreatureDeparted {
                    creature: creature.id,
                });
            }
        }
    }

    fn assign_targets(
        &mut self,
        drone: DroneId,
        mut creatures: Vec<CreatureId>,
        out_events: &mut Vec<Event>,
    ) {
        let cap = self.max_targets_per_drone;
        let Some(record) = self.own_drone_mut(drone) else {
            return;
        };

        creatures.truncate(cap);
        if record.targets == creatures {
            return;
        }

        record.targets.clone_from(&creatures);
        out_events.push(Event::TargetsAssigned { drone, creatures });
    }

    fn clear_targets(&mut self, drone: DroneId, reason: ClearReason, out_events: &mut Vec<Event>) {
        let Some(record) = self.own_drone_mut(drone) else {
            return;
        };

        if record.targets.is_empty() {
            return;
        }

        record.targets.clear();
        out_events.push(Event::TargetsCleared { drone, reason });
    }

    fn set_surfacing(&mut self, drone: DroneId, surfacing: bool, out_events: &mut Vec<Event>) {
        let Some(record) = self.own_drone_mut(drone) else {
            return;
        };

        if record.surfacing != surfacing {
            record.surfacing = surfacing;
            out_events.push(Event::SurfacingChanged { drone, surfacing });
        }
    }

    fn record_light(&mut self, drone: DroneId, activated: bool) {
        let reset = self.light_cooldown_turns;
        let Some(record) = self.own_drone_mut(drone) else {
            return;
        };

        record.light_cooldown = if activated {
            reset
        } else {
            record.light_cooldown.saturating_sub(1)
        };
    }

    fn grow_uncertainty(&mut self) {
        for creature in &mut self.creatures {
            if creature.status == CreatureStatus::Departed {
                continue;
            }
            let margin = if creature.kind.is_monster() {
                self.monster_speed_bound
            } else {
                self.creature_speed_bound
            };
            creature.estimate.grow(margin);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RegisterCreature {
            creature,
            color,
            kind,
        } => world.register_creature(creature, color, kind),
        Command::BeginTurn { turn } => world.begin_turn(turn),
        Command::ReportScores { own, foe } => {
            world.own_score = own;
            world.foe_score = foe;
        }
        Command::RecordRegistrations { owner, creatures } => {
            world.record_registrations(owner, creatures, out_events);
        }
        Command::UpdateDrone {
            owner,
            drone,
            position,
            battery,
            emergency,
        } => world.update_drone(owner, drone, position, battery, emergency, out_events),
        Command::RecordDroneScan { drone, creature } => {
            world.record_drone_scan(drone, creature, out_events);
        }
        Command::ObserveCreature {
            creature,
            position,
            velocity,
        } => world.observe_creature(creature, Fix { position, velocity }, out_events),
        Command::ObserveRadar {
            drone,
            creature,
            quadrant,
        } => world.observe_radar(drone, creature, quadrant, out_events),
        Command::SealObservations => world.seal_observations(out_events),
        Command::AssignTargets { drone, creatures } => {
            world.assign_targets(drone, creatures, out_events);
        }
        Command::ClearTargets { drone, reason } => world.clear_targets(drone, reason, out_events),
        Command::SetSurfacing { drone, surfacing } => {
            world.set_surfacing(drone, surfacing, out_events);
        }
        Command::RecordLight { drone, activated } => world.record_light(drone, activated),
        Command::GrowUncertainty => world.grow_uncertainty(),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Owner, World};
    use sonar_scout_core::{CreatureSnapshot, CreatureView, DroneSnapshot, DroneView};

    /// Scores last reported by the referee as `(own, foe)`.
    #[must_use]
    pub fn reported_scores(world: &World) -> (u32, u32) {
        (world.own_score, world.foe_score)
    }

    /// Captures a read-only view of every roster entry.
    #[must_use]
    pub fn creature_view(world: &World) -> CreatureView {
        let snapshots = world
            .creatures
            .iter()
            .map(|creature| CreatureSnapshot {
                id: creature.id,
                kind: creature.kind,
                color: creature.color,
                status: creature.status,
                foe_scanned: creature.foe_scanned,
                fix: creature.fix,
                last_seen: creature.last_seen,
                bounds: creature.estimate.bounds(),
                estimate: creature
                    .fix
                    .map_or_else(|| creature.estimate.center(), |fix| fix.position),
            })
            .collect();
        CreatureView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of my drones.
    #[must_use]
    pub fn drone_view(world: &World) -> DroneView {
        let snapshots = world
            .drones
            .iter()
            .filter(|drone| drone.owner == Owner::Me)
            .map(|drone| DroneSnapshot {
                id: drone.id,
                position: drone.position,
                battery: drone.battery,
                emergency: drone.emergency,
                light_cooldown: drone.light_cooldown,
                targets: drone.targets.clone(),
                pending_scans: drone.pending_scans.clone(),
                surfacing: drone.surfacing,
            })
            .collect();
        DroneView::from_snapshots(snapshots)
    }
}

#[derive(Clone, Debug)]
struct Creature {
    id: CreatureId,
    kind: CreatureKind,
    color: Color,
    status: CreatureStatus,
    foe_scanned: bool,
    fix: Option<Fix>,
    last_seen: Option<Sighting>,
    radar_seen: bool,
    estimate: Estimate,
}

#[derive(Clone, Debug)]
struct Drone {
    id: DroneId,
    owner: Owner,
    position: Point,
    battery: i32,
    emergency: bool,
    light_cooldown: i32,
    targets: Vec<CreatureId>,
    pending_scans: Vec<CreatureId>,
    surfacing: bool,
}
