//! Tunable engine parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{geometry::Rect, RosterEntry, FISH_TYPES};

/// Policy deciding whether a light burst can reveal anything worthwhile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum LightPolicy {
    /// Useful when one of the drone's own targets is estimated within `radius`.
    NearTarget {
        /// Distance from the drone to a target estimate, in map units.
        radius: f64,
    },
    /// Useful once the drone is at least `depth` below the surface.
    BelowDepth {
        /// Minimum vertical coordinate of the drone.
        depth: i32,
    },
    /// Useful when either of the other two predicates holds.
    Either {
        /// Distance from the drone to a target estimate, in map units.
        radius: f64,
        /// Minimum vertical coordinate of the drone.
        depth: i32,
    },
}

impl Default for LightPolicy {
    fn default() -> Self {
        Self::NearTarget { radius: 2000.0 }
    }
}

/// Parameters shared by every component of the decision engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest valid map coordinate on both axes.
    pub map_max: i32,
    /// Maximum distance a drone travels in a single turn.
    pub max_step: i32,
    /// Depth at or above which pending scans are registered.
    pub surface_y: i32,
    /// Combined safety radius of a drone and a monster.
    pub collision_radius: f64,
    /// Angular spacing of evasive headings, in degrees.
    pub evasion_angle_step_degrees: f64,
    /// Upper bound on how far an unseen fish moves per turn.
    pub creature_speed_bound: i32,
    /// Upper bound on how far an unseen monster moves per turn.
    pub monster_speed_bound: i32,
    /// Turns a monster's last sighting keeps being vetted against.
    pub monster_memory_turns: u32,
    /// Battery required before a light burst is considered.
    pub light_min_battery: i32,
    /// A creature closer than this makes a light burst pointless.
    pub light_too_close_radius: f64,
    /// Turns a drone waits after a light burst.
    pub light_cooldown_turns: i32,
    /// Usefulness predicate for light bursts.
    pub light_policy: LightPolicy,
    /// Largest number of creatures a single drone pursues at once.
    pub max_targets_per_drone: usize,
    /// Projected score at which drones carrying scans head to the surface.
    pub surface_score_threshold: u32,
    /// Whether idle drones sweep the band of fish never located yet.
    pub idle_exploration: bool,
    /// Horizontal distance from the map edges that exploration keeps.
    pub exploration_margin: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            map_max: 9999,
            max_step: 600,
            surface_y: 500,
            collision_radius: 500.0,
            evasion_angle_step_degrees: 10.0,
            creature_speed_bound: 400,
            monster_speed_bound: 540,
            monster_memory_turns: 2,
            light_min_battery: 5,
            light_too_close_radius: 800.0,
            light_cooldown_turns: 2,
            light_policy: LightPolicy::default(),
            max_targets_per_drone: 4,
            surface_score_threshold: 20,
            idle_exploration: false,
            exploration_margin: 750,
        }
    }
}

impl EngineConfig {
    /// Rectangle covering the whole playable map.
    #[must_use]
    pub const fn map_bounds(&self) -> Rect {
        Rect::new(0, self.map_max, 0, self.map_max)
    }

    /// Checks that the parameters describe a usable engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_max <= 0 {
            return Err(ConfigError::EmptyMap(self.map_max));
        }
        if self.max_step <= 0 {
            return Err(ConfigError::NonPositiveStep(self.max_step));
        }
        if self.surface_y < 0 || self.surface_y > self.map_max {
            return Err(ConfigError::SurfaceOutsideMap(self.surface_y));
        }
        if !(self.collision_radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(self.collision_radius));
        }
        if !(self.evasion_angle_step_degrees > 0.0 && self.evasion_angle_step_degrees <= 180.0) {
            return Err(ConfigError::InvalidAngleStep(
                self.evasion_angle_step_degrees,
            ));
        }
        if self.creature_speed_bound < 0 {
            return Err(ConfigError::NegativeSpeedBound(self.creature_speed_bound));
        }
        if self.monster_speed_bound < 0 {
            return Err(ConfigError::NegativeMonsterSpeedBound(
                self.monster_speed_bound,
            ));
        }
        if self.exploration_margin < 0 || self.exploration_margin * 2 >= self.map_max {
            return Err(ConfigError::InvalidExplorationMargin(
                self.exploration_margin,
            ));
        }
        if self.max_targets_per_drone == 0 {
            return Err(ConfigError::NoTargetCapacity);
        }
        Ok(())
    }
}

/// Checks that every roster entry names a known fish type.
pub fn validate_roster(roster: &[RosterEntry]) -> Result<(), ConfigError> {
    for entry in roster {
        if let Some(fish_type) = entry.kind.fish_type() {
            if fish_type >= FISH_TYPES {
                return Err(ConfigError::UnknownFishType {
                    creature: entry.creature.get(),
                    fish_type,
                });
            }
        }
    }
    Ok(())
}

/// Reasons an [`EngineConfig`] or a roster is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The map must span at least one unit.
    #[error("map_max must be positive, got {0}")]
    EmptyMap(i32),
    /// Drones must be able to move.
    #[error("max_step must be positive, got {0}")]
    NonPositiveStep(i32),
    /// The surface line must lie on the map.
    #[error("surface_y {0} lies outside the map")]
    SurfaceOutsideMap(i32),
    /// Collisions need a positive safety radius.
    #[error("collision_radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    /// Evasive sampling needs a step in `(0, 180]` degrees.
    #[error("evasion_angle_step_degrees must lie in (0, 180], got {0}")]
    InvalidAngleStep(f64),
    /// Uncertainty growth cannot shrink estimates.
    #[error("creature_speed_bound must not be negative, got {0}")]
    NegativeSpeedBound(i32),
    /// Monster uncertainty growth cannot shrink estimates either.
    #[error("monster_speed_bound must not be negative, got {0}")]
    NegativeMonsterSpeedBound(i32),
    /// Exploration needs a horizontal corridor left between the margins.
    #[error("exploration_margin {0} leaves no room to explore")]
    InvalidExplorationMargin(i32),
    /// Every drone must be able to hold at least one target.
    #[error("max_targets_per_drone must be at least 1")]
    NoTargetCapacity,
    /// Fish types are indexed `0..FISH_TYPES`.
    #[error("creature {creature} has unknown fish type {fish_type}")]
    UnknownFishType {
        /// Roster identifier of the offending entry.
        creature: u32,
        /// Type index found in the roster.
        fish_type: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::{validate_roster, ConfigError, EngineConfig};
    use crate::{Color, CreatureId, CreatureKind, RosterEntry};

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_step_is_rejected() {
        let config = EngineConfig {
            max_step: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveStep(0)));
    }

    #[test]
    fn surface_below_map_is_rejected() {
        let config = EngineConfig {
            surface_y: 20_000,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SurfaceOutsideMap(20_000))
        );
    }

    #[test]
    fn negative_monster_speed_is_rejected() {
        let config = EngineConfig {
            monster_speed_bound: -1,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeMonsterSpeedBound(-1))
        );
    }

    #[test]
    fn margins_swallowing_the_map_are_rejected() {
        let config = EngineConfig {
            exploration_margin: 5000,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidExplorationMargin(5000))
        );
    }

    #[test]
    fn roster_with_unknown_fish_type_is_rejected() {
        let entry = |creature, kind| RosterEntry {
            creature: CreatureId::new(creature),
            color: Color::new(0),
            kind,
        };
        let known = [
            entry(4, CreatureKind::Fish(2)),
            entry(9, CreatureKind::Monster),
        ];
        assert_eq!(validate_roster(&known), Ok(()));

        let unknown = [
            entry(4, CreatureKind::Fish(0)),
            entry(7, CreatureKind::Fish(3)),
        ];
        assert_eq!(
            validate_roster(&unknown),
            Err(ConfigError::UnknownFishType {
                creature: 7,
                fish_type: 3,
            })
        );
    }

    #[test]
    fn error_messages_name_the_field() {
        let message = ConfigError::InvalidAngleStep(0.0).to_string();
        assert!(message.contains("evasion_angle_step_degrees"));
    }
}
