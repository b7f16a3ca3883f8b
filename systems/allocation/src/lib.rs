#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that reconciles and distributes creature targets among drones.

use sonar_scout_core::{
    geometry::distance, ClearReason, Command, CreatureId, CreatureStatus, CreatureView, DroneId,
    DroneView, Event, Owner, Point, FISH_TYPES,
};

/// Target allocator that reuses scratch buffers across turns.
#[derive(Debug)]
pub struct Allocation {
    max_targets_per_drone: usize,
    secured: Vec<CreatureId>,
    plans: Vec<Plan>,
    pool: Vec<Candidate>,
    picks: Vec<(f64, usize)>,
}

impl Allocation {
    /// Creates an allocator that hands at most `max_targets_per_drone`
    /// creatures to a single drone.
    #[must_use]
    pub fn new(max_targets_per_drone: usize) -> Self {
        Self {
            max_targets_per_drone,
            secured: Vec::new(),
            plans: Vec::new(),
            pool: Vec::new(),
            picks: Vec::new(),
        }
    }

    /// Reconciles every drone's target set with this turn's events and hands
    /// fresh targets to drones left without any.
    ///
    /// Returns the focus type: the lowest fish type still offering an
    /// unassigned located creature. The output buffer is cleared before being
    /// populated with `ClearTargets` and `AssignTargets` commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        drones: &DroneView,
        creatures: &CreatureView,
        out: &mut Vec<Command>,
    ) -> Option<u8> {
        out.clear();

        self.collect_secured(events);
        self.reconcile(drones, creatures);
        self.prepare_pool(creatures);

        let focus = self.pool.first().map(|candidate| candidate.fish_type);
        if let Some(focus) = focus {
            self.acquire(focus);
        }

        for plan in &self.plans {
            plan.emit(out);
        }
        focus
    }

    fn collect_secured(&mut self, events: &[Event]) {
        self.secured.clear();
        for event in events {
            match event {
                Event::CreatureScanned { creature, .. }
                | Event::CreatureRegistered {
                    creature,
                    owner: Owner::Me,
                } => self.secured.push(*creature),
                _ => {}
            }
        }
    }

    fn reconcile(&mut self, drones: &DroneView, creatures: &CreatureView) {
        self.plans.clear();
        for drone in drones.iter() {
            let reason = if drone.emergency {
                Some(ClearReason::Emergency)
            } else if drone.surfacing {
                Some(ClearReason::Surfacing)
            } else if drone
                .targets
                .iter()
                .any(|target| self.secured.contains(target))
            {
                Some(ClearReason::TargetSecured)
            } else {
                None
            };

            let targets = match reason {
                Some(_) => Vec::new(),
                None => drone
                    .targets
                    .iter()
                    .copied()
                    .filter(|target| is_available(creatures, *target))
                    .collect(),
            };

            self.plans.push(Plan {
                drone: drone.id,
                position: drone.position,
                previous: drone.targets.clone(),
                cleared: reason.filter(|_| !drone.targets.is_empty()),
                eligible: !drone.emergency && !drone.surfacing,
                targets,
            });
        }
    }

    fn prepare_pool(&mut self, creatures: &CreatureView) {
        self.pool.clear();
        for snapshot in creatures.iter() {
            let Some(fish_type) = snapshot
                .kind
                .fish_type()
                .filter(|fish_type| *fish_type < FISH_TYPES)
            else {
                continue;
            };
            if snapshot.status != CreatureStatus::Located {
                continue;
            }
            if self
                .plans
                .iter()
                .any(|plan| plan.targets.contains(&snapshot.id))
            {
                continue;
            }

            self.pool.push(Candidate {
                id: snapshot.id,
                fish_type,
                estimate: snapshot.estimate,
                taken: false,
            });
        }

        self.pool
            .sort_by_key(|candidate| (candidate.fish_type, candidate.estimate.x(), candidate.id));
    }

    fn acquire(&mut self, focus: u8) {
        let mut counts = [0_usize; FISH_TYPES as usize];
        for candidate in &self.pool {
            counts[usize::from(candidate.fish_type)] += 1;
        }

        for plan in &mut self.plans {
            if !plan.eligible || !plan.targets.is_empty() {
                continue;
            }

            for fish_type in focus..FISH_TYPES {
                let cap = counts[usize::from(fish_type)]
                    .div_ceil(2)
                    .min(self.max_targets_per_drone);
                if cap == 0 {
                    continue;
                }

                self.picks.clear();
                for (index, candidate) in self.pool.iter().enumerate() {
                    if !candidate.taken && candidate.fish_type == fish_type {
                        self.picks
                            .push((distance(plan.position, candidate.estimate), index));
                    }
                }
                self.picks
                    .sort_by(|left, right| left.0.total_cmp(&right.0).then(left.1.cmp(&right.1)));

                for &(_, index) in self.picks.iter().take(cap) {
                    let candidate = &mut self.pool[index];
                    candidate.taken = true;
                    plan.targets.push(candidate.id);
                }

                if !plan.targets.is_empty() {
                    break;
                }
            }
        }
    }
}

/// Counts located fish that nobody has scanned, registered or lost yet.
#[must_use]
pub fn remaining(creatures: &CreatureView) -> usize {
    creatures
        .iter()
        .filter(|creature| !creature.kind.is_monster())
        .filter(|creature| creature.status == CreatureStatus::Located)
        .count()
}

fn is_available(creatures: &CreatureView, id: CreatureId) -> bool {
    creatures
        .get(id)
        .is_some_and(|creature| creature.status == CreatureStatus::Located)
}

#[derive(Clone, Debug, PartialEq)]
struct Plan {
    drone: DroneId,
    position: Point,
    previous: Vec<CreatureId>,
    cleared: Option<ClearReason>,
    eligible: bool,
    targets: Vec<CreatureId>,
}

impl Plan {
    fn emit(&self, out: &mut Vec<Command>) {
        if let Some(reason) = self.cleared {
            out.push(Command::ClearTargets {
                drone: self.drone,
                reason,
            });
            if !self.targets.is_empty() {
                out.push(Command::AssignTargets {
                    drone: self.drone,
                    creatures: self.targets.clone(),
                });
            }
            return;
        }

        if self.targets != self.previous {
            out.push(Command::AssignTargets {
                drone: self.drone,
                creatures: self.targets.clone(),
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: CreatureId,
    fish_type: u8,
    estimate: Point,
    taken: bool,
}

#[cfg(test)]
mod tests {
    use super::{remaining, Allocation};
    use sonar_scout_core::{
        ClearReason, Color, Command, CreatureId, CreatureKind, CreatureSnapshot, CreatureStatus,
        CreatureView, DroneId, DroneSnapshot, DroneView, Event, Owner, Point, Rect,
    };

    fn fish(id: u32, fish_type: u8, status: CreatureStatus, at: Point) -> CreatureSnapshot {
        CreatureSnapshot {
            id: CreatureId::new(id),
            kind: CreatureKind::Fish(fish_type),
            color: Color::new(0),
            status,
            foe_scanned: false,
            fix: None,
            last_seen: None,
            bounds: Rect::point(at),
            estimate: at,
        }
    }

    fn drone(id: u32, at: Point, targets: &[u32]) -> DroneSnapshot {
        DroneSnapshot {
            id: DroneId::new(id),
            position: at,
            battery: 30,
            emergency: false,
            light_cooldown: 0,
            targets: targets.iter().copied().map(CreatureId::new).collect(),
            pending_scans: Vec::new(),
            surfacing: false,
        }
    }

    fn ids(values: &[u32]) -> Vec<CreatureId> {
        values.iter().copied().map(CreatureId::new).collect()
    }

    #[test]
    fn nothing_located_yields_no_focus() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![fish(
            1,
            0,
            CreatureStatus::Unlocated,
            Point::new(100, 3000),
        )]);
        let drones = DroneView::from_snapshots(vec![drone(0, Point::new(0, 0), &[])]);
        let mut out = Vec::new();

        let focus = allocation.handle(&[], &drones, &creatures, &mut out);

        assert_eq!(focus, None);
        assert!(out.is_empty());
    }

    #[test]
    fn drones_split_the_focus_type() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![
            fish(1, 0, CreatureStatus::Located, Point::new(1000, 3000)),
            fish(2, 0, CreatureStatus::Located, Point::new(2000, 3000)),
            fish(3, 0, CreatureStatus::Located, Point::new(8000, 3000)),
            fish(4, 0, CreatureStatus::Located, Point::new(9000, 3000)),
            fish(5, 1, CreatureStatus::Located, Point::new(5000, 6000)),
        ]);
        let drones = DroneView::from_snapshots(vec![
            drone(0, Point::new(1500, 500), &[]),
            drone(1, Point::new(8500, 500), &[]),
        ]);
        let mut out = Vec::new();

        let focus = allocation.handle(&[], &drones, &creatures, &mut out);

        assert_eq!(focus, Some(0));
        assert_eq!(
            out,
            vec![
                Command::AssignTargets {
                    drone: DroneId::new(0),
                    creatures: ids(&[1, 2]),
                },
                Command::AssignTargets {
                    drone: DroneId::new(1),
                    creatures: ids(&[3, 4]),
                },
            ]
        );
    }

    #[test]
    fn exhausted_focus_type_moves_second_drone_deeper() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![
            fish(1, 0, CreatureStatus::Located, Point::new(1000, 3000)),
            fish(5, 1, CreatureStatus::Located, Point::new(5000, 6000)),
        ]);
        let drones = DroneView::from_snapshots(vec![
            drone(0, Point::new(1500, 500), &[]),
            drone(1, Point::new(8500, 500), &[]),
        ]);
        let mut out = Vec::new();

        let _ = allocation.handle(&[], &drones, &creatures, &mut out);

        assert_eq!(
            out,
            vec![
                Command::AssignTargets {
                    drone: DroneId::new(0),
                    creatures: ids(&[1]),
                },
                Command::AssignTargets {
                    drone: DroneId::new(1),
                    creatures: ids(&[5]),
                },
            ]
        );
    }

    #[test]
    fn secured_target_clears_the_set_and_reallocates() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![
            fish(1, 0, CreatureStatus::Scanned, Point::new(1000, 3000)),
            fish(2, 0, CreatureStatus::Located, Point::new(2000, 3000)),
            fish(3, 1, CreatureStatus::Located, Point::new(2000, 6000)),
        ]);
        let drones = DroneView::from_snapshots(vec![drone(0, Point::new(1000, 3000), &[1, 2])]);
        let events = [Event::CreatureScanned {
            creature: CreatureId::new(1),
            drone: DroneId::new(0),
        }];
        let mut out = Vec::new();

        let focus = allocation.handle(&events, &drones, &creatures, &mut out);

        assert_eq!(focus, Some(0));
        assert_eq!(
            out,
            vec![
                Command::ClearTargets {
                    drone: DroneId::new(0),
                    reason: ClearReason::TargetSecured,
                },
                Command::AssignTargets {
                    drone: DroneId::new(0),
                    creatures: ids(&[2]),
                },
            ]
        );
    }

    #[test]
    fn departed_target_is_filtered_without_clearing() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![
            fish(1, 0, CreatureStatus::Departed, Point::new(1000, 3000)),
            fish(2, 0, CreatureStatus::Located, Point::new(2000, 3000)),
        ]);
        let drones = DroneView::from_snapshots(vec![drone(0, Point::new(1000, 3000), &[1, 2])]);
        let mut out = Vec::new();

        let _ = allocation.handle(&[], &drones, &creatures, &mut out);

        assert_eq!(
            out,
            vec![Command::AssignTargets {
                drone: DroneId::new(0),
                creatures: ids(&[2]),
            }]
        );
    }

    #[test]
    fn emergency_and_surfacing_drones_drop_targets() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![
            fish(1, 0, CreatureStatus::Located, Point::new(1000, 3000)),
            fish(2, 0, CreatureStatus::Located, Point::new(2000, 3000)),
        ]);
        let mut broken = drone(0, Point::new(1000, 3000), &[1]);
        broken.emergency = true;
        let mut rising = drone(1, Point::new(2000, 3000), &[2]);
        rising.surfacing = true;
        let drones = DroneView::from_snapshots(vec![broken, rising]);
        let mut out = Vec::new();

        let _ = allocation.handle(&[], &drones, &creatures, &mut out);

        assert_eq!(
            out,
            vec![
                Command::ClearTargets {
                    drone: DroneId::new(0),
                    reason: ClearReason::Emergency,
                },
                Command::ClearTargets {
                    drone: DroneId::new(1),
                    reason: ClearReason::Surfacing,
                },
            ]
        );
    }

    #[test]
    fn held_targets_stay_out_of_the_pool() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![
            fish(1, 0, CreatureStatus::Located, Point::new(1000, 3000)),
            fish(2, 0, CreatureStatus::Located, Point::new(2000, 3000)),
        ]);
        let drones = DroneView::from_snapshots(vec![
            drone(0, Point::new(1000, 3000), &[]),
            drone(1, Point::new(1000, 3000), &[1]),
        ]);
        let mut out = Vec::new();

        let _ = allocation.handle(&[], &drones, &creatures, &mut out);

        assert_eq!(
            out,
            vec![Command::AssignTargets {
                drone: DroneId::new(0),
                creatures: ids(&[2]),
            }]
        );
    }

    #[test]
    fn foe_registration_does_not_secure_targets() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![fish(
            1,
            0,
            CreatureStatus::Located,
            Point::new(1000, 3000),
        )]);
        let drones = DroneView::from_snapshots(vec![drone(0, Point::new(0, 0), &[1])]);
        let events = [Event::CreatureRegistered {
            creature: CreatureId::new(1),
            owner: Owner::Foe,
        }];
        let mut out = Vec::new();

        let _ = allocation.handle(&events, &drones, &creatures, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn unknown_fish_types_never_enter_the_pool() {
        let mut allocation = Allocation::new(4);
        let creatures = CreatureView::from_snapshots(vec![
            fish(1, 3, CreatureStatus::Located, Point::new(1000, 3000)),
            fish(2, 1, CreatureStatus::Located, Point::new(2000, 6000)),
        ]);
        let drones = DroneView::from_snapshots(vec![drone(0, Point::new(1000, 3000), &[])]);
        let mut out = Vec::new();

        let focus = allocation.handle(&[], &drones, &creatures, &mut out);

        assert_eq!(focus, Some(1));
        assert_eq!(
            out,
            vec![Command::AssignTargets {
                drone: DroneId::new(0),
                creatures: ids(&[2]),
            }]
        );
    }

    #[test]
    fn remaining_counts_located_fish_only() {
        let mut monster = fish(9, 0, CreatureStatus::Located, Point::new(0, 5000));
        monster.kind = CreatureKind::Monster;
        let creatures = CreatureView::from_snapshots(vec![
            fish(1, 0, CreatureStatus::Located, Point::new(1000, 3000)),
            fish(2, 1, CreatureStatus::Scanned, Point::new(1000, 6000)),
            fish(3, 2, CreatureStatus::Departed, Point::new(1000, 8000)),
            monster,
        ]);
        assert_eq!(remaining(&creatures), 1);
    }
}
