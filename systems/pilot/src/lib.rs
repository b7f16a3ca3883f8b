#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that runs the per-drone decision state machine.
//!
//! Decisions happen in two passes. [`Pilot::ascend_phase`] runs before target
//! allocation and flips the sticky surfacing flag; [`Pilot::steer`] runs after
//! allocation and turns each drone's mode into a capped move and a light
//! decision.

use sonar_scout_core::{
    geometry::{barycenter, clamp_to_rect, distance},
    Action, ClearReason, Command, CreatureId, CreatureKind, CreatureStatus, CreatureView,
    DroneId, DroneOrder, DroneSnapshot, DroneView, EngineConfig, LightPolicy, Mode, Point,
    Quadrant, Rect, TurnContext,
};

/// Planned behaviour of a drone before collision vetting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Steering {
    /// Drone being steered.
    pub drone: DroneId,
    /// Selected behaviour.
    pub mode: Mode,
    /// Point the drone is heading for, `None` when holding.
    pub aim: Option<Point>,
    /// Step toward the aim point capped at the per-turn distance.
    pub destination: Option<Point>,
    /// Whether the light burst is activated.
    pub light: bool,
    /// Creatures pursued this turn.
    pub targets: Vec<CreatureId>,
}

/// Drone decision system shaped by the engine configuration.
#[derive(Debug)]
pub struct Pilot {
    map: Rect,
    max_step: i32,
    surface_y: i32,
    surface_score_threshold: u32,
    light_min_battery: i32,
    light_too_close_radius: f64,
    light_policy: LightPolicy,
    idle_exploration: bool,
    exploration_margin: i32,
    aims: Vec<Point>,
}

impl Pilot {
    /// Creates a pilot using the thresholds from the configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            map: config.map_bounds(),
            max_step: config.max_step,
            surface_y: config.surface_y,
            surface_score_threshold: config.surface_score_threshold,
            light_min_battery: config.light_min_battery,
            light_too_close_radius: config.light_too_close_radius,
            light_policy: config.light_policy,
            idle_exploration: config.idle_exploration,
            exploration_margin: config.exploration_margin,
            aims: Vec::new(),
        }
    }

    /// Decides which drones head to the surface this turn.
    ///
    /// Drones carrying scans start ascending once the projected score reaches
    /// the threshold or nothing remains to pursue; they keep ascending until
    /// they reach the surface line. Entering the ascent drops the target set.
    pub fn ascend_phase(&self, drones: &DroneView, context: &TurnContext, out: &mut Vec<Command>) {
        out.clear();

        let triggered =
            context.projected_score >= self.surface_score_threshold || context.remaining == 0;

        for drone in drones.iter() {
            let arrived = drone.position.y() <= self.surface_y;
            let surfacing = !drone.emergency
                && !arrived
                && (drone.surfacing || (triggered && !drone.pending_scans.is_empty()));

            if surfacing == drone.surfacing {
                continue;
            }

            out.push(Command::SetSurfacing {
                drone: drone.id,
                surfacing,
            });
            if surfacing {
                out.push(Command::ClearTargets {
                    drone: drone.id,
                    reason: ClearReason::Surfacing,
                });
            }
        }
    }

    /// Steers every drone according to its mode and decides its light.
    ///
    /// Emits one `RecordLight` command per drone so cooldowns advance.
    ///
    /// # Panics
    ///
    /// Panics when a pursuing drone has no target with a known estimate, which
    /// means target reconciliation let a stale id through.
    pub fn steer(
        &mut self,
        drones: &DroneView,
        creatures: &CreatureView,
        out: &mut Vec<Steering>,
        commands: &mut Vec<Command>,
    ) {
        out.clear();
        commands.clear();

        for drone in drones.iter() {
            let steering = self.steer_one(drone, creatures);
            commands.push(Command::RecordLight {
                drone: drone.id,
                activated: steering.light,
            });
            out.push(steering);
        }
    }

    fn steer_one(&mut self, drone: &DroneSnapshot, creatures: &CreatureView) -> Steering {
        let (mode, aim) = if drone.emergency {
            (Mode::Emergency, None)
        } else if drone.surfacing && drone.position.y() > self.surface_y {
            (
                Mode::Ascend,
                Some(Point::new(drone.position.x(), self.surface_y)),
            )
        } else if !drone.targets.is_empty() {
            self.aims.clear();
            self.aims.extend(
                drone
                    .targets
                    .iter()
                    .filter_map(|target| creatures.get(*target))
                    .map(|creature| creature.estimate),
            );
            let aim = barycenter(&self.aims)
                .expect("pursuing drone must hold at least one known target");
            (Mode::Pursue, Some(aim))
        } else {
            (Mode::Idle, self.explore(drone.position, creatures))
        };

        Steering {
            drone: drone.id,
            mode,
            aim,
            destination: aim.map(|aim| self.step_toward(drone.position, aim)),
            light: mode != Mode::Emergency && self.wants_light(drone, creatures),
            targets: drone.targets.clone(),
        }
    }

    /// Moves at most one step toward `aim`, reaching it when close enough.
    #[must_use]
    pub fn step_toward(&self, from: Point, aim: Point) -> Point {
        let gap = distance(from, aim);
        let max_step = f64::from(self.max_step);
        if gap <= max_step {
            return clamp_to_rect(aim, &self.map);
        }

        let scale = max_step / gap;
        let offset = from.vector_to(aim);
        let step = Point::new(
            from.x() + (f64::from(offset.dx()) * scale).round() as i32,
            from.y() + (f64::from(offset.dy()) * scale).round() as i32,
        );
        clamp_to_rect(step, &self.map)
    }

    /// Sweep point for an idle drone, `None` when exploration is off or every
    /// fish was located at least once.
    ///
    /// Outside the band of the shallowest unlocated type the drone dives to
    /// the band's top corner on its own side of the map. Inside, it heads for
    /// the band edges bordering the quadrant that holds most of that type's
    /// estimates.
    fn explore(&self, from: Point, creatures: &CreatureView) -> Option<Point> {
        if !self.idle_exploration {
            return None;
        }

        let fish_type = creatures
            .iter()
            .filter(|creature| creature.status == CreatureStatus::Unlocated)
            .filter_map(|creature| creature.kind.fish_type())
            .min()?;
        let band = CreatureKind::Fish(fish_type).depth_band(self.map.y_max());
        let zone = Rect::new(
            band.x_min() + self.exploration_margin,
            band.x_max() - self.exploration_margin,
            band.y_min(),
            band.y_max(),
        );

        if !zone.contains(from) {
            let x = if from.x() < self.map.center().x() {
                zone.x_min()
            } else {
                zone.x_max()
            };
            return Some(Point::new(x, zone.y_min()));
        }

        let mut counts = [0_usize; 4];
        for creature in creatures.iter() {
            if creature.status == CreatureStatus::Unlocated
                && creature.kind.fish_type() == Some(fish_type)
            {
                counts[quadrant_index(Quadrant::locate(from, creature.estimate))] += 1;
            }
        }
        let mut richest = Quadrant::TopLeft;
        for quadrant in [
            Quadrant::TopRight,
            Quadrant::BottomLeft,
            Quadrant::BottomRight,
        ] {
            if counts[quadrant_index(quadrant)] > counts[quadrant_index(richest)] {
                richest = quadrant;
            }
        }

        let vertical = if richest.is_top() {
            Point::new(from.x(), zone.y_min())
        } else {
            Point::new(from.x(), zone.y_max())
        };
        let horizontal = if richest.is_left() {
            Point::new(zone.x_min(), from.y())
        } else {
            Point::new(zone.x_max(), from.y())
        };
        barycenter(&[vertical, horizontal])
    }

    fn wants_light(&self, drone: &DroneSnapshot, creatures: &CreatureView) -> bool {
        if drone.battery < self.light_min_battery || drone.light_cooldown > 0 {
            return false;
        }

        let crowded = creatures.iter().any(|creature| {
            creature.fix.is_some_and(|fix| {
                distance(fix.position, drone.position) <= self.light_too_close_radius
            })
        });
        if crowded {
            return false;
        }

        let near_target = |radius: f64| {
            drone
                .targets
                .iter()
                .filter_map(|target| creatures.get(*target))
                .any(|creature| distance(creature.estimate, drone.position) <= radius)
        };
        let deep_enough = |depth: i32| drone.position.y() >= depth;

        match self.light_policy {
            LightPolicy::NearTarget { radius } => near_target(radius),
            LightPolicy::BelowDepth { depth } => deep_enough(depth),
            LightPolicy::Either { radius, depth } => near_target(radius) || deep_enough(depth),
        }
    }
}

const fn quadrant_index(quadrant: Quadrant) -> usize {
    match quadrant {
        Quadrant::TopLeft => 0,
        Quadrant::TopRight => 1,
        Quadrant::BottomLeft => 2,
        Quadrant::BottomRight => 3,
    }
}

impl Steering {
    /// Builds the order sent to the drone once the destination was vetted.
    #[must_use]
    pub fn into_order(self, destination: Option<Point>) -> DroneOrder {
        DroneOrder {
            drone: self.drone,
            mode: self.mode,
            action: destination.map_or(Action::Hold, Action::MoveTo),
            light: self.light,
            targets: self.targets,
        }
    }
}
