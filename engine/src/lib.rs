#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn orchestrator wiring the world and the pure systems together.
//!
//! Each turn runs the same pipeline: observation ingestion, score projection,
//! ascend phase, target allocation, steering, collision vetting and finally
//! uncertainty growth.

use sonar_scout_core::{
    geometry::clamp_to_rect, validate_roster, Command, ConfigError, CreatureView, DroneOrder,
    EngineConfig, Event, Fix, Owner, Rect, RosterEntry, TurnContext, TurnObservation,
};
use sonar_scout_system_allocation::{self as allocation, Allocation};
use sonar_scout_system_collision::CollisionPredictor;
use sonar_scout_system_pilot::{Pilot, Steering};
use sonar_scout_system_scoring as scoring;
use sonar_scout_world::{self as world, query, World};
use tracing::debug;

/// Decision engine owning the world and every system's scratch state.
#[derive(Debug)]
pub struct Engine {
    world: World,
    allocation: Allocation,
    pilot: Pilot,
    predictor: CollisionPredictor,
    map: Rect,
    monster_memory_turns: u32,
    next_turn: u32,
    context: TurnContext,
    events: Vec<Event>,
    commands: Vec<Command>,
    steerings: Vec<Steering>,
    monsters: Vec<Fix>,
}

impl Engine {
    /// Validates the configuration and the roster, then registers the roster.
    pub fn new(config: &EngineConfig, roster: &[RosterEntry]) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_roster(roster)?;

        let mut world = World::new(config);
        let mut events = Vec::new();
        for entry in roster {
            world::apply(
                &mut world,
                Command::RegisterCreature {
                    creature: entry.creature,
                    color: entry.color,
                    kind: entry.kind,
                },
                &mut events,
            );
        }

        Ok(Self {
            world,
            allocation: Allocation::new(config.max_targets_per_drone),
            pilot: Pilot::new(config),
            predictor: CollisionPredictor::new(config),
            map: config.map_bounds(),
            monster_memory_turns: config.monster_memory_turns,
            next_turn: 0,
            context: TurnContext::default(),
            events,
            commands: Vec::new(),
            steerings: Vec::new(),
            monsters: Vec::new(),
        })
    }

    /// Context computed during the most recent turn.
    #[must_use]
    pub fn context(&self) -> TurnContext {
        self.context
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events raised while processing the most recent turn.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Decides one order per own drone, in ascending drone id order.
    pub fn turn(&mut self, observation: &TurnObservation) -> Vec<DroneOrder> {
        self.events.clear();
        let turn = self.next_turn;
        self.next_turn += 1;

        self.ingest(turn, observation);

        let creatures = query::creature_view(&self.world);
        let (own_score, foe_score) = query::reported_scores(&self.world);
        let projection = scoring::project(0, &creatures);
        self.context = TurnContext {
            turn,
            projected_score: projection.total,
            focus_type: None,
            remaining: allocation::remaining(&creatures),
        };
        debug!(
            turn,
            own_score,
            foe_score,
            projected = projection.total,
            bonus = projection.bonus_points,
            remaining = self.context.remaining,
            "projected score"
        );

        let drones = query::drone_view(&self.world);
        self.pilot.ascend_phase(&drones, &self.context, &mut self.commands);
        self.flush_commands();

        let drones = query::drone_view(&self.world);
        self.context.focus_type =
            self.allocation.handle(&self.events, &drones, &creatures, &mut self.commands);
        self.flush_commands();

        let drones = query::drone_view(&self.world);
        self.pilot.steer(&drones, &creatures, &mut self.steerings, &mut self.commands);
        self.collect_monsters(turn, &creatures);

        let mut orders = Vec::with_capacity(self.steerings.len());
        for steering in self.steerings.drain(..) {
            let origin = drones.get(steering.drone).map(|drone| drone.position);
            let destination = match (steering.destination, steering.aim, origin) {
                (Some(destination), Some(aim), Some(origin)) => {
                    Some(self.predictor.vet(origin, destination, aim, &self.monsters))
                }
                (destination, _, _) => destination,
            };
            if destination != steering.destination {
                debug!(
                    drone = steering.drone.get(),
                    ?destination,
                    "evading predicted monster contact"
                );
            }

            let order = steering.into_order(destination);
            debug!(
                turn,
                drone = order.drone.get(),
                mode = ?order.mode,
                action = ?order.action,
                light = order.light,
                "drone order"
            );
            orders.push(order);
        }

        self.commands.push(Command::GrowUncertainty);
        self.flush_commands();

        orders
    }

    fn ingest(&mut self, turn: u32, observation: &TurnObservation) {
        self.commands.clear();
        self.commands.push(Command::BeginTurn { turn });
        self.commands.push(Command::ReportScores {
            own: observation.own_score,
            foe: observation.foe_score,
        });
        self.commands.push(Command::RecordRegistrations {
            owner: Owner::Me,
            creatures: observation.own_registered.clone(),
        });
        self.commands.push(Command::RecordRegistrations {
            owner: Owner::Foe,
            creatures: observation.foe_registered.clone(),
        });

        let own = observation
            .own_drones
            .iter()
            .map(|report| (Owner::Me, report));
        let foe = observation
            .foe_drones
            .iter()
            .map(|report| (Owner::Foe, report));
        for (owner, report) in own.chain(foe) {
            self.commands.push(Command::UpdateDrone {
                owner,
                drone: report.drone,
                position: report.position,
                battery: report.battery,
                emergency: report.emergency,
            });
        }

        for scan in &observation.drone_scans {
            self.commands.push(Command::RecordDroneScan {
                drone: scan.drone,
                creature: scan.creature,
            });
        }
        for visible in &observation.visible {
            self.commands.push(Command::ObserveCreature {
                creature: visible.creature,
                position: visible.position,
                velocity: visible.velocity,
            });
        }
        for blip in &observation.radar {
            self.commands.push(Command::ObserveRadar {
                drone: blip.drone,
                creature: blip.creature,
                quadrant: blip.quadrant,
            });
        }
        self.commands.push(Command::SealObservations);

        self.flush_commands();
    }

    /// Gathers the monsters to vet moves against: those in sight plus those
    /// seen within the memory window, dead-reckoned to this turn.
    fn collect_monsters(&mut self, turn: u32, creatures: &CreatureView) {
        self.monsters.clear();
        for creature in creatures
            .iter()
            .filter(|creature| creature.kind.is_monster())
        {
            let fix = match (creature.fix, creature.last_seen) {
                (Some(fix), _) => fix,
                (None, Some(sighting)) if sighting.age(turn) <= self.monster_memory_turns => {
                    let mut fix = sighting.extrapolate(turn);
                    fix.position = clamp_to_rect(fix.position, &self.map);
                    debug!(
                        monster = creature.id.get(),
                        age = sighting.age(turn),
                        position = ?fix.position,
                        "vetting against a remembered monster"
                    );
                    fix
                }
                (None, _) => continue,
            };
            self.monsters.push(fix);
        }
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
