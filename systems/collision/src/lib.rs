#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that predicts drone/monster collisions and searches evasive
//! headings.

use glam::DVec2;
use sonar_scout_core::{
    geometry::{distance, solve_quadratic_roots},
    EngineConfig, Fix, Point, Rect, Vector,
};

/// Collision predictor that reuses its heading table across turns.
#[derive(Debug)]
pub struct CollisionPredictor {
    radius: f64,
    max_step: f64,
    map: Rect,
    headings: Vec<DVec2>,
}

impl CollisionPredictor {
    /// Creates a predictor using the radius, step and angular spacing from the
    /// configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let step = config.evasion_angle_step_degrees.to_radians();
        let count = (std::f64::consts::TAU / step).round().max(1.0) as usize;
        let headings = (0..count)
            .map(|index| {
                let angle = step * index as f64;
                DVec2::new(angle.cos(), angle.sin())
            })
            .collect();

        Self {
            radius: config.collision_radius,
            max_step: f64::from(config.max_step),
            map: config.map_bounds(),
            headings,
        }
    }

    /// Reports whether the drone moving by `drone_velocity` this turn meets the
    /// monster.
    ///
    /// The motion is solved in the monster's frame: a collision happens when the
    /// relative distance reaches the radius at some `t` in `(0, 1]`.
    #[must_use]
    pub fn predicts_collision(&self, monster: &Fix, drone: Point, drone_velocity: Vector) -> bool {
        let offset = to_dvec(monster.position) - to_dvec(drone);
        if offset.length() <= self.radius {
            return true;
        }

        let relative = vector_to_dvec(monster.velocity) - vector_to_dvec(drone_velocity);
        let a = relative.length_squared();
        let b = 2.0 * offset.dot(relative);
        let c = offset.length_squared() - self.radius * self.radius;

        solve_quadratic_roots(a, b, c).is_some()
    }

    /// Checks the planned move against every tracked monster and replaces it
    /// with the safe heading closest to `aim` when it collides.
    ///
    /// The planned destination is kept when the move is safe or when no
    /// sampled heading is.
    #[must_use]
    pub fn vet(&self, drone: Point, destination: Point, aim: Point, monsters: &[Fix]) -> Point {
        if monsters.is_empty() || self.is_safe(drone, destination, monsters) {
            return destination;
        }

        let mut best: Option<(f64, Point)> = None;
        for heading in &self.headings {
            let reach = to_dvec(drone) + *heading * self.max_step;
            let candidate = Point::new(reach.x.round() as i32, reach.y.round() as i32);
            if !self.map.contains(candidate) || !self.is_safe(drone, candidate, monsters) {
                continue;
            }

            let gap = distance(candidate, aim);
            if best.map_or(true, |(closest, _)| gap < closest) {
                best = Some((gap, candidate));
            }
        }

        best.map_or(destination, |(_, candidate)| candidate)
    }

    fn is_safe(&self, drone: Point, destination: Point, monsters: &[Fix]) -> bool {
        let velocity = drone.vector_to(destination);
        !monsters
            .iter()
            .any(|monster| self.predicts_collision(monster, drone, velocity))
    }
}

fn to_dvec(point: Point) -> DVec2 {
    DVec2::new(f64::from(point.x()), f64::from(point.y()))
}

fn vector_to_dvec(vector: Vector) -> DVec2 {
    DVec2::new(f64::from(vector.dx()), f64::from(vector.dy()))
}

#[cfg(test)]
mod tests {
    use super::CollisionPredictor;
    use sonar_scout_core::{geometry::distance, EngineConfig, Fix, Point, Vector};

    fn predictor() -> CollisionPredictor {
        CollisionPredictor::new(&EngineConfig::default())
    }

    fn monster(x: i32, y: i32, dx: i32, dy: i32) -> Fix {
        Fix {
            position: Point::new(x, y),
            velocity: Vector::new(dx, dy),
        }
    }

    #[test]
    fn heading_table_matches_angle_step() {
        assert_eq!(predictor().headings.len(), 36);
    }

    #[test]
    fn closing_monster_within_reach_collides() {
        // Gap 1000, closing speed 540: 1000 - 540 <= 500.
        let hit = predictor().predicts_collision(
            &monster(1000, 5000, -540, 0),
            Point::new(0, 5000),
            Vector::ZERO,
        );
        assert!(hit);
    }

    #[test]
    fn receding_monster_never_collides() {
        let hit = predictor().predicts_collision(
            &monster(1000, 5000, 540, 0),
            Point::new(0, 5000),
            Vector::ZERO,
        );
        assert!(!hit);
    }

    #[test]
    fn monster_inside_radius_collides_immediately() {
        let hit = predictor().predicts_collision(
            &monster(5300, 5300, 0, 0),
            Point::new(5000, 5000),
            Vector::ZERO,
        );
        assert!(hit);
    }

    #[test]
    fn slow_approach_falls_short() {
        // Gap 1000, closing speed 400: the monster stops 600 away.
        let hit = predictor().predicts_collision(
            &monster(6000, 5000, 0, 0),
            Point::new(5000, 5000),
            Vector::new(400, 0),
        );
        assert!(!hit);
    }

    #[test]
    fn safe_move_is_kept() {
        let destination = Point::new(5000, 4400);
        let vetted = predictor().vet(
            Point::new(5000, 5000),
            destination,
            destination,
            &[monster(8000, 8000, 0, 0)],
        );
        assert_eq!(vetted, destination);
    }

    #[test]
    fn colliding_move_is_replaced_by_safe_heading() {
        let predictor = predictor();
        let drone = Point::new(5000, 5000);
        let destination = Point::new(5600, 5000);
        let monsters = [monster(6000, 5000, 0, 0)];

        let vetted = predictor.vet(drone, destination, Point::new(7000, 5000), &monsters);

        assert_ne!(vetted, destination);
        assert!((distance(drone, vetted) - 600.0).abs() <= 1.0);
        assert!(!predictor.predicts_collision(&monsters[0], drone, drone.vector_to(vetted)));
        assert!(vetted.x() > drone.x(), "evasion should still lean toward the aim");
    }

    #[test]
    fn evasion_stays_on_the_map() {
        let predictor = predictor();
        let drone = Point::new(0, 9999);
        let destination = Point::new(600, 9999);
        let monsters = [monster(1000, 9999, -100, 0)];

        let vetted = predictor.vet(drone, destination, destination, &monsters);

        assert!(EngineConfig::default().map_bounds().contains(vetted));
    }

    #[test]
    fn hopeless_situation_keeps_destination() {
        let drone = Point::new(5000, 5000);
        let destination = Point::new(5000, 4400);
        let vetted = predictor().vet(
            drone,
            destination,
            destination,
            &[monster(5000, 5000, 0, 0)],
        );
        assert_eq!(vetted, destination);
    }
}
