#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that projects the score I would hold after surfacing.

use sonar_scout_core::{CreatureSnapshot, CreatureView, COLORS, FISH_TYPES};

/// Secured members a color or type category needs to count as complete.
pub const SET_SIZE: usize = 3;

/// Bonus awarded for a completed color or type set nobody else completed.
pub const SET_BONUS: u32 = 6;

/// Bonus awarded for a completed set the opponent already touched.
pub const SHARED_SET_BONUS: u32 = 3;

/// Breakdown of a projected score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreProjection {
    /// Score supplied by the caller before any creature was counted.
    pub base: u32,
    /// Points earned by individual scanned or registered fish.
    pub creature_points: u32,
    /// Points earned by completed color and type sets.
    pub bonus_points: u32,
    /// Sum of the three parts.
    pub total: u32,
}

/// Projects the score obtained if every pending scan were registered.
///
/// Monsters never score. A color or type category is complete once
/// [`SET_SIZE`] of its fish are scanned or registered, whatever the roster
/// holds beyond that.
#[must_use]
pub fn project(base: u32, creatures: &CreatureView) -> ScoreProjection {
    let creature_points: u32 = creatures
        .iter()
        .filter(|creature| creature.status.is_secured())
        .filter_map(fish_points)
        .sum();

    let color_bonus: u32 = (0..COLORS)
        .map(|color| set_bonus(creatures, |creature| creature.color.get() == color))
        .sum();
    let type_bonus: u32 = (0..FISH_TYPES)
        .map(|fish_type| {
            set_bonus(creatures, |creature| {
                creature.kind.fish_type() == Some(fish_type)
            })
        })
        .sum();
    let bonus_points = color_bonus + type_bonus;

    ScoreProjection {
        base,
        creature_points,
        bonus_points,
        total: base + creature_points + bonus_points,
    }
}

fn fish_points(creature: &CreatureSnapshot) -> Option<u32> {
    let fish_type = creature.kind.fish_type()?;
    let points = u32::from(fish_type) + 1;
    Some(if creature.foe_scanned {
        points
    } else {
        points * 2
    })
}

fn set_bonus<F>(creatures: &CreatureView, member: F) -> u32
where
    F: Fn(&CreatureSnapshot) -> bool,
{
    let mut secured = 0;
    let mut shared = false;
    for creature in creatures
        .iter()
        .filter(|creature| !creature.kind.is_monster())
        .filter(|creature| creature.status.is_secured())
        .filter(|creature| member(creature))
    {
        secured += 1;
        shared |= creature.foe_scanned;
    }

    match (secured >= SET_SIZE, shared) {
        (false, _) => 0,
        (true, true) => SHARED_SET_BONUS,
        (true, false) => SET_BONUS,
    }
}

#[cfg(test)]
mod tests {
    use super::{project, ScoreProjection};
    use sonar_scout_core::{
        Color, CreatureId, CreatureKind, CreatureSnapshot, CreatureStatus, CreatureView,
    };

    fn creature(
        id: u32,
        color: u8,
        kind: CreatureKind,
        status: CreatureStatus,
    ) -> CreatureSnapshot {
        let bounds = kind.depth_band(9999);
        CreatureSnapshot {
            id: CreatureId::new(id),
            kind,
            color: Color::new(color),
            status,
            foe_scanned: false,
            fix: None,
            last_seen: None,
            bounds,
            estimate: bounds.center(),
        }
    }

    fn fish(id: u32, color: u8, fish_type: u8, status: CreatureStatus) -> CreatureSnapshot {
        creature(id, color, CreatureKind::Fish(fish_type), status)
    }

    fn foe_scanned(mut snapshot: CreatureSnapshot) -> CreatureSnapshot {
        snapshot.foe_scanned = true;
        snapshot
    }

    #[test]
    fn empty_roster_keeps_the_base() {
        let projection = project(7, &CreatureView::default());
        assert_eq!(
            projection,
            ScoreProjection {
                base: 7,
                creature_points: 0,
                bonus_points: 0,
                total: 7,
            }
        );
    }

    #[test]
    fn unshared_scans_are_doubled() {
        let view = CreatureView::from_snapshots(vec![
            fish(1, 0, 2, CreatureStatus::Scanned),
            foe_scanned(fish(2, 1, 0, CreatureStatus::Registered)),
            fish(3, 2, 1, CreatureStatus::Located),
            fish(4, 3, 1, CreatureStatus::Located),
        ]);

        let projection = project(0, &view);
        assert_eq!(projection.creature_points, 6 + 1);
    }

    #[test]
    fn complete_color_set_earns_full_bonus() {
        let view = CreatureView::from_snapshots(vec![
            fish(1, 0, 0, CreatureStatus::Scanned),
            fish(2, 0, 1, CreatureStatus::Scanned),
            fish(3, 0, 2, CreatureStatus::Registered),
            fish(4, 1, 0, CreatureStatus::Located),
            fish(5, 1, 1, CreatureStatus::Located),
            fish(6, 1, 2, CreatureStatus::Located),
        ]);

        let projection = project(0, &view);
        assert_eq!(projection.creature_points, 2 + 4 + 6);
        assert_eq!(projection.bonus_points, 6);
        assert_eq!(projection.total, 18);
    }

    #[test]
    fn set_touched_by_foe_earns_half_bonus() {
        let view = CreatureView::from_snapshots(vec![
            fish(1, 0, 0, CreatureStatus::Scanned),
            foe_scanned(fish(2, 0, 1, CreatureStatus::Scanned)),
            fish(3, 0, 2, CreatureStatus::Scanned),
            fish(4, 1, 0, CreatureStatus::Located),
            fish(5, 1, 1, CreatureStatus::Located),
            fish(6, 1, 2, CreatureStatus::Located),
        ]);

        let projection = project(0, &view);
        assert_eq!(projection.bonus_points, 3);
    }

    #[test]
    fn three_secured_members_complete_a_type() {
        let view = CreatureView::from_snapshots(vec![
            fish(1, 0, 0, CreatureStatus::Scanned),
            fish(2, 1, 0, CreatureStatus::Scanned),
            fish(3, 2, 0, CreatureStatus::Registered),
            fish(4, 3, 0, CreatureStatus::Located),
            creature(9, 0, CreatureKind::Monster, CreatureStatus::Located),
        ]);

        let projection = project(0, &view);
        // Every color holds a single secured fish, short of a set.
        assert_eq!(projection.bonus_points, 6);
        assert_eq!(projection.creature_points, 6);
        assert_eq!(projection.total, 12);
    }

    #[test]
    fn fourth_member_keeps_the_type_bonus() {
        let view = CreatureView::from_snapshots(vec![
            fish(1, 0, 2, CreatureStatus::Scanned),
            fish(2, 1, 2, CreatureStatus::Scanned),
            fish(3, 2, 2, CreatureStatus::Scanned),
            fish(4, 3, 2, CreatureStatus::Registered),
        ]);

        let projection = project(0, &view);
        assert_eq!(projection.bonus_points, 6);
        assert_eq!(projection.creature_points, 24);
    }

    #[test]
    fn color_and_type_sets_stack() {
        let view = CreatureView::from_snapshots(vec![
            fish(1, 0, 0, CreatureStatus::Scanned),
            fish(2, 0, 1, CreatureStatus::Scanned),
            fish(3, 0, 2, CreatureStatus::Scanned),
            fish(4, 1, 0, CreatureStatus::Scanned),
            fish(5, 2, 0, CreatureStatus::Scanned),
        ]);

        let projection = project(0, &view);
        // Color 0 and type 0 are complete.
        assert_eq!(projection.bonus_points, 6 + 6);
        assert_eq!(projection.creature_points, 2 + 4 + 6 + 2 + 2);
    }

    #[test]
    fn monsters_never_score() {
        let monster = creature(9, 0, CreatureKind::Monster, CreatureStatus::Scanned);

        let projection = project(0, &CreatureView::from_snapshots(vec![monster]));
        assert_eq!(projection.total, 0);
    }

    #[test]
    fn departed_member_leaves_the_set_short() {
        let view = CreatureView::from_snapshots(vec![
            fish(1, 2, 0, CreatureStatus::Scanned),
            fish(2, 2, 1, CreatureStatus::Registered),
            fish(3, 2, 2, CreatureStatus::Departed),
        ]);

        let projection = project(0, &view);
        assert_eq!(projection.bonus_points, 0);
    }
}
