use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sonar_scout_core::{
    Color, Command, CreatureId, CreatureKind, CreatureSnapshot, CreatureStatus, CreatureView,
    DroneId, DroneSnapshot, DroneView, Point, Rect,
};
use sonar_scout_system_allocation::Allocation;

const MAX_TARGETS: usize = 4;

#[test]
fn fresh_allocations_are_disjoint_and_capped() {
    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let creatures = random_creatures(&mut rng);
        let drones = random_drones(&mut rng);

        let mut allocation = Allocation::new(MAX_TARGETS);
        let mut out = Vec::new();
        let focus = allocation.handle(&[], &drones, &creatures, &mut out);

        let mut seen = HashSet::new();
        for command in &out {
            let Command::AssignTargets {
                creatures: assigned,
                ..
            } = command
            else {
                panic!("seed {seed}: fresh drones should only receive assignments");
            };

            assert!(!assigned.is_empty(), "seed {seed}: empty assignment");
            assert!(assigned.len() <= MAX_TARGETS, "seed {seed}: over capacity");

            let fish_type = type_of(&creatures, assigned[0]);
            let pool = creatures
                .iter()
                .filter(|creature| creature.status == CreatureStatus::Located)
                .filter(|creature| creature.kind.fish_type() == Some(fish_type))
                .count();
            assert!(
                assigned.len() <= pool.div_ceil(2),
                "seed {seed}: {} targets of type {fish_type} out of {pool}",
                assigned.len()
            );
            assert!(focus.is_some_and(|focus| fish_type >= focus));

            for id in assigned {
                assert_eq!(type_of(&creatures, *id), fish_type, "seed {seed}: mixed set");
                let creature = creatures.get(*id).expect("assigned creature exists");
                assert_eq!(creature.status, CreatureStatus::Located);
                assert!(seen.insert(*id), "seed {seed}: {id:?} assigned twice");
            }
        }
    }
}

#[test]
fn allocation_is_deterministic() {
    for seed in 100..116 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let creatures = random_creatures(&mut rng);
        let drones = random_drones(&mut rng);

        let mut first = Vec::new();
        let mut second = Vec::new();
        let mut allocation = Allocation::new(MAX_TARGETS);
        let focus_first = allocation.handle(&[], &drones, &creatures, &mut first);
        let mut allocation = Allocation::new(MAX_TARGETS);
        let focus_second = allocation.handle(&[], &drones, &creatures, &mut second);

        assert_eq!(focus_first, focus_second);
        assert_eq!(first, second, "seed {seed}: allocation diverged");
    }
}

fn type_of(creatures: &CreatureView, id: CreatureId) -> u8 {
    creatures
        .get(id)
        .and_then(|creature| creature.kind.fish_type())
        .expect("assigned creature is a fish")
}

fn random_creatures(rng: &mut ChaCha8Rng) -> CreatureView {
    let statuses = [
        CreatureStatus::Unlocated,
        CreatureStatus::Located,
        CreatureStatus::Located,
        CreatureStatus::Located,
        CreatureStatus::Scanned,
        CreatureStatus::Registered,
        CreatureStatus::Departed,
    ];

    let count = rng.gen_range(0..=14);
    let snapshots = (0..count)
        .map(|index| {
            let kind = if rng.gen_bool(0.15) {
                CreatureKind::Monster
            } else {
                CreatureKind::Fish(rng.gen_range(0..3))
            };
            let band = kind.depth_band(9999);
            let estimate = Point::new(
                rng.gen_range(band.x_min()..=band.x_max()),
                rng.gen_range(band.y_min()..=band.y_max()),
            );
            CreatureSnapshot {
                id: CreatureId::new(index + 4),
                kind,
                color: Color::new(rng.gen_range(0..4)),
                status: statuses[rng.gen_range(0..statuses.len())],
                foe_scanned: rng.gen_bool(0.3),
                fix: None,
                last_seen: None,
                bounds: Rect::point(estimate),
                estimate,
            }
        })
        .collect();
    CreatureView::from_snapshots(snapshots)
}

fn random_drones(rng: &mut ChaCha8Rng) -> DroneView {
    let count = rng.gen_range(1..=3);
    let snapshots = (0..count)
        .map(|index| DroneSnapshot {
            id: DroneId::new(index),
            position: Point::new(rng.gen_range(0..=9999), rng.gen_range(0..=9999)),
            battery: 30,
            emergency: false,
            light_cooldown: 0,
            targets: Vec::new(),
            pending_scans: Vec::new(),
            surfacing: false,
        })
        .collect();
    DroneView::from_snapshots(snapshots)
}
