#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sonar Scout decision engine.
//!
//! This crate defines the message surface that connects the adapter, the
//! authoritative world, and the pure systems. The engine translates each
//! turn's [`TurnObservation`] into [`Command`] values, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches
//! or [`DroneOrder`] values for the adapter to print.

pub mod config;
pub mod geometry;

use serde::{Deserialize, Serialize};

pub use config::{validate_roster, ConfigError, EngineConfig, LightPolicy};
pub use geometry::{Point, Rect, Vector};

/// Number of fish types present in the roster.
pub const FISH_TYPES: u8 = 3;

/// Number of color categories present in the roster.
pub const COLORS: u8 = 4;

/// Unique identifier assigned to a creature or monster by the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a drone, own or foe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DroneId(u32);

impl DroneId {
    /// Creates a new drone identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Color category of a fish, used for set-completion bonuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color(u8);

impl Color {
    /// Creates a new color category.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric category index.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Category of a roster entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    /// Harmless creature worth points once scanned, tagged with its type index.
    Fish(u8),
    /// Hostile monster that disables drones on contact.
    Monster,
}

impl CreatureKind {
    /// Decodes the protocol type field, where `-1` marks a monster.
    #[must_use]
    pub fn from_protocol(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Monster),
            0..=2 => u8::try_from(value).ok().map(Self::Fish),
            _ => None,
        }
    }

    /// Type index of a fish, `None` for monsters.
    #[must_use]
    pub const fn fish_type(self) -> Option<u8> {
        match self {
            Self::Fish(fish_type) => Some(fish_type),
            Self::Monster => None,
        }
    }

    /// Reports whether the entry is a monster.
    #[must_use]
    pub const fn is_monster(self) -> bool {
        matches!(self, Self::Monster)
    }

    /// Depth band the kind is confined to on a map spanning `0..=map_max`.
    ///
    /// Fish of type 0, 1 and 2 live in consecutive quarter-depth bands below
    /// the first quarter; monsters roam the three lower quarters.
    #[must_use]
    pub fn depth_band(self, map_max: i32) -> Rect {
        let quarter = (map_max + 1) / 4;
        let (top, bottom) = match self {
            Self::Fish(fish_type) => {
                let band = i32::from(fish_type.min(FISH_TYPES - 1)) + 1;
                (quarter * band, (quarter * (band + 1)).min(map_max))
            }
            Self::Monster => (quarter, map_max),
        };
        Rect::new(0, map_max, top, bottom)
    }
}

/// Compass quadrant reported by a radar blip, relative to the observing drone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// The creature lies above and to the left of the drone.
    TopLeft,
    /// The creature lies above and to the right of the drone.
    TopRight,
    /// The creature lies below and to the left of the drone.
    BottomLeft,
    /// The creature lies below and to the right of the drone.
    BottomRight,
}

impl Quadrant {
    /// Decodes the two-letter protocol label (`TL`, `TR`, `BL`, `BR`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "TL" => Some(Self::TopLeft),
            "TR" => Some(Self::TopRight),
            "BL" => Some(Self::BottomLeft),
            "BR" => Some(Self::BottomRight),
            _ => None,
        }
    }

    /// Quadrant of `point` as seen from `origin`; ties fall right and below.
    #[must_use]
    pub const fn locate(origin: Point, point: Point) -> Self {
        match (point.x() < origin.x(), point.y() < origin.y()) {
            (true, true) => Self::TopLeft,
            (false, true) => Self::TopRight,
            (true, false) => Self::BottomLeft,
            (false, false) => Self::BottomRight,
        }
    }

    /// Reports whether the creature lies left of the drone.
    #[must_use]
    pub const fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Reports whether the creature lies above the drone.
    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// Side of the contest a drone or a registration belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Drones controlled by this engine.
    Me,
    /// Drones controlled by the opponent.
    Foe,
}

/// Progress of a roster entry from this engine's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreatureStatus {
    /// Never observed; the estimate is the whole depth band.
    Unlocated,
    /// Observed by radar or sight but not yet scanned.
    Located,
    /// Scanned by one of my drones and awaiting registration at the surface.
    Scanned,
    /// Registered by me; its points are banked.
    Registered,
    /// Left the map; it can no longer be scanned.
    Departed,
}

impl CreatureStatus {
    /// Reports whether the creature counts toward my score.
    #[must_use]
    pub const fn is_secured(self) -> bool {
        matches!(self, Self::Scanned | Self::Registered)
    }
}

/// Reasons a drone's target set was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClearReason {
    /// One of the targets was scanned or registered this turn.
    TargetSecured,
    /// The drone suffered an emergency.
    Emergency,
    /// The drone is heading to the surface.
    Surfacing,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Adds a roster entry at contest start.
    RegisterCreature {
        /// Identifier listed in the roster.
        creature: CreatureId,
        /// Color category of the entry.
        color: Color,
        /// Fish type or monster marker.
        kind: CreatureKind,
    },
    /// Opens a new turn, discarding per-turn observations of the previous one.
    BeginTurn {
        /// Zero-based turn index.
        turn: u32,
    },
    /// Records the scores reported by the referee.
    ReportScores {
        /// Score credited to me.
        own: u32,
        /// Score credited to the opponent.
        foe: u32,
    },
    /// Records creatures whose scans are saved by a side.
    RecordRegistrations {
        /// Side that registered the scans.
        owner: Owner,
        /// Registered creatures.
        creatures: Vec<CreatureId>,
    },
    /// Creates or refreshes a drone record.
    UpdateDrone {
        /// Side controlling the drone.
        owner: Owner,
        /// Identifier of the drone.
        drone: DroneId,
        /// Exact drone position.
        position: Point,
        /// Remaining battery.
        battery: i32,
        /// Whether the drone is disabled by an emergency.
        emergency: bool,
    },
    /// Records a scan held by a drone and not yet registered.
    RecordDroneScan {
        /// Drone holding the scan.
        drone: DroneId,
        /// Scanned creature.
        creature: CreatureId,
    },
    /// Records a creature directly visible this turn.
    ObserveCreature {
        /// Visible creature.
        creature: CreatureId,
        /// Exact position.
        position: Point,
        /// Displacement over the coming turn.
        velocity: Vector,
    },
    /// Records a radar blip seen by one of my drones.
    ObserveRadar {
        /// Observing drone.
        drone: DroneId,
        /// Creature the blip refers to.
        creature: CreatureId,
        /// Quadrant of the creature relative to the drone.
        quadrant: Quadrant,
    },
    /// Marks the end of observation ingestion for the current turn.
    SealObservations,
    /// Replaces a drone's target set.
    AssignTargets {
        /// Drone receiving the targets.
        drone: DroneId,
        /// Targets in pursuit order.
        creatures: Vec<CreatureId>,
    },
    /// Empties a drone's target set.
    ClearTargets {
        /// Drone losing its targets.
        drone: DroneId,
        /// Why the set was discarded.
        reason: ClearReason,
    },
    /// Sets or clears the sticky surfacing flag.
    SetSurfacing {
        /// Drone whose flag changes.
        drone: DroneId,
        /// Whether the drone keeps heading to the surface.
        surfacing: bool,
    },
    /// Records the light decision taken for the drone this turn.
    RecordLight {
        /// Drone that decided.
        drone: DroneId,
        /// Whether the light burst was activated.
        activated: bool,
    },
    /// Grows every estimate by the per-turn speed bound.
    GrowUncertainty,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A drone id was seen for the first time.
    DroneDiscovered {
        /// Newly tracked drone.
        drone: DroneId,
        /// Side controlling the drone.
        owner: Owner,
    },
    /// A creature received its first observation.
    CreatureLocated {
        /// Located creature.
        creature: CreatureId,
    },
    /// One of my drones scanned a creature for the first time.
    CreatureScanned {
        /// Scanned creature.
        creature: CreatureId,
        /// Drone holding the scan.
        drone: DroneId,
    },
    /// A side registered a creature for the first time.
    CreatureRegistered {
        /// Registered creature.
        creature: CreatureId,
        /// Side that registered it.
        owner: Owner,
    },
    /// A creature left the map.
    CreatureDeparted {
        /// Creature that left.
        creature: CreatureId,
    },
    /// A drone's target set was replaced.
    TargetsAssigned {
        /// Drone receiving the targets.
        drone: DroneId,
        /// Targets now held.
        creatures: Vec<CreatureId>,
    },
    /// A drone's target set was emptied.
    TargetsCleared {
        /// Drone that lost its targets.
        drone: DroneId,
        /// Why the set was discarded.
        reason: ClearReason,
    },
    /// A drone's surfacing flag changed.
    SurfacingChanged {
        /// Drone whose flag changed.
        drone: DroneId,
        /// New flag value.
        surfacing: bool,
    },
}

/// Exact kinematic state of a directly visible creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fix {
    /// Exact position this turn.
    pub position: Point,
    /// Displacement over the coming turn.
    pub velocity: Vector,
}

/// Exact sighting remembered after the creature leaves view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sighting {
    /// Turn on which the creature was seen.
    pub turn: u32,
    /// Kinematic state observed on that turn.
    pub fix: Fix,
}

impl Sighting {
    /// Turns elapsed between the sighting and `turn`.
    #[must_use]
    pub const fn age(&self, turn: u32) -> u32 {
        turn.saturating_sub(self.turn)
    }

    /// Dead-reckons the sighting forward to `turn` at constant velocity.
    #[must_use]
    pub fn extrapolate(&self, turn: u32) -> Fix {
        let age = i32::try_from(self.age(turn)).unwrap_or(i32::MAX);
        let Fix { position, velocity } = self.fix;
        let dx = velocity.dx().saturating_mul(age);
        let dy = velocity.dy().saturating_mul(age);
        Fix {
            position: Point::new(
                position.x().saturating_add(dx),
                position.y().saturating_add(dy),
            ),
            velocity,
        }
    }
}

/// Immutable representation of a single creature's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatureSnapshot {
    /// Roster identifier.
    pub id: CreatureId,
    /// Fish type or monster marker.
    pub kind: CreatureKind,
    /// Color category.
    pub color: Color,
    /// Progress from my point of view.
    pub status: CreatureStatus,
    /// Whether the opponent scanned or registered the creature.
    pub foe_scanned: bool,
    /// Exact state when directly visible this turn.
    pub fix: Option<Fix>,
    /// Most recent exact sighting, kept once the creature leaves view.
    pub last_seen: Option<Sighting>,
    /// Rectangle enclosing every position the creature may occupy.
    pub bounds: Rect,
    /// Best single-point estimate of the position.
    pub estimate: Point,
}

/// Read-only snapshot describing every roster entry.
#[derive(Clone, Debug, Default)]
pub struct CreatureView {
    snapshots: Vec<CreatureSnapshot>,
}

impl CreatureView {
    /// Creates a new creature view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CreatureSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &CreatureSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a creature by identifier.
    #[must_use]
    pub fn get(&self, id: CreatureId) -> Option<&CreatureSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CreatureSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of one of my drones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroneSnapshot {
    /// Identifier of the drone.
    pub id: DroneId,
    /// Exact position.
    pub position: Point,
    /// Remaining battery.
    pub battery: i32,
    /// Whether the drone is disabled by an emergency.
    pub emergency: bool,
    /// Turns left before the light is ready; ready when `<= 0`.
    pub light_cooldown: i32,
    /// Creatures assigned to the drone, in pursuit order.
    pub targets: Vec<CreatureId>,
    /// Scans held by the drone and not yet registered.
    pub pending_scans: Vec<CreatureId>,
    /// Whether the drone keeps heading to the surface.
    pub surfacing: bool,
}

/// Read-only snapshot describing my drones.
#[derive(Clone, Debug, Default)]
pub struct DroneView {
    snapshots: Vec<DroneSnapshot>,
}

impl DroneView {
    /// Creates a new drone view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DroneSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &DroneSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a drone by identifier.
    #[must_use]
    pub fn get(&self, id: DroneId) -> Option<&DroneSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }
}

/// Per-turn values shared between systems instead of ambient globals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TurnContext {
    /// Zero-based turn index.
    pub turn: u32,
    /// Score I would hold if every pending scan were registered.
    pub projected_score: u32,
    /// Lowest fish type still offering available creatures.
    pub focus_type: Option<u8>,
    /// Located fish that are neither scanned, registered nor departed.
    pub remaining: usize,
}

/// Drone state reported by the referee.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DroneReport {
    /// Identifier of the drone.
    pub drone: DroneId,
    /// Exact position.
    pub position: Point,
    /// Whether the drone is disabled by an emergency.
    pub emergency: bool,
    /// Remaining battery.
    pub battery: i32,
}

/// Scan held by a drone and not yet registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DroneScan {
    /// Drone holding the scan.
    pub drone: DroneId,
    /// Scanned creature.
    pub creature: CreatureId,
}

/// Creature directly visible this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleCreature {
    /// Visible creature.
    pub creature: CreatureId,
    /// Exact position.
    pub position: Point,
    /// Displacement over the coming turn.
    pub velocity: Vector,
}

/// Radar blip seen by one of my drones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadarReport {
    /// Observing drone.
    pub drone: DroneId,
    /// Creature the blip refers to.
    pub creature: CreatureId,
    /// Quadrant of the creature relative to the drone.
    pub quadrant: Quadrant,
}

/// Roster line announced once before the first turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Identifier of the creature or monster.
    pub creature: CreatureId,
    /// Color category; meaningless for monsters.
    pub color: Color,
    /// Fish type or monster marker.
    pub kind: CreatureKind,
}

/// Every observation batch received for a single turn, in protocol order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnObservation {
    /// My current score.
    pub own_score: u32,
    /// The opponent's current score.
    pub foe_score: u32,
    /// Creatures I have registered.
    pub own_registered: Vec<CreatureId>,
    /// Creatures the opponent has registered.
    pub foe_registered: Vec<CreatureId>,
    /// State of my drones.
    pub own_drones: Vec<DroneReport>,
    /// State of the opponent's drones.
    pub foe_drones: Vec<DroneReport>,
    /// Unregistered scans held by any drone.
    pub drone_scans: Vec<DroneScan>,
    /// Creatures directly visible to any of my drones.
    pub visible: Vec<VisibleCreature>,
    /// Radar blips seen by my drones.
    pub radar: Vec<RadarReport>,
}

/// Behaviour a drone follows this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Heading to the surface to register pending scans.
    Ascend,
    /// Heading to the barycenter of assigned targets.
    Pursue,
    /// No target; holding position or sweeping a band nobody located yet.
    Idle,
    /// Disabled; holding position until repaired.
    Emergency,
}

/// Movement part of a drone order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Move toward the provided destination.
    MoveTo(Point),
    /// Stay in place.
    Hold,
}

/// Decision emitted for one of my drones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroneOrder {
    /// Drone the order applies to.
    pub drone: DroneId,
    /// Behaviour selected this turn.
    pub mode: Mode,
    /// Movement to perform.
    pub action: Action,
    /// Whether to activate the light burst.
    pub light: bool,
    /// Creatures currently pursued, for annotation.
    pub targets: Vec<CreatureId>,
}
