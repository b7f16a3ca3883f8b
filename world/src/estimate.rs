//! Shrinking bounding boxes that enclose creatures between sightings.

use sonar_scout_core::{Point, Quadrant, Rect};

/// Rectangle guaranteed to contain a creature, confined to its depth band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Estimate {
    band: Rect,
    bounds: Rect,
}

impl Estimate {
    /// Starts from the whole band: nothing is known yet.
    pub(crate) const fn new(band: Rect) -> Self {
        Self { band, bounds: band }
    }

    pub(crate) const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Collapses the estimate onto an exact sighting.
    pub(crate) fn collapse(&mut self, position: Point) {
        self.bounds = Rect::point(position);
    }

    /// Narrows the estimate with a radar blip seen from `drone`.
    ///
    /// A blip cutting the estimate down to nothing means the creature escaped
    /// the growth bound; the estimate then restarts from the blip's quadrant.
    pub(crate) fn tighten(&mut self, drone: Point, quadrant: Quadrant) {
        let region = quadrant_region(&self.band, drone, quadrant);
        if region.is_empty() {
            return;
        }

        let narrowed = self.bounds.intersect(&region);
        self.bounds = if narrowed.is_empty() { region } else { narrowed };
    }

    /// Grows the estimate by the distance a creature covers in one turn.
    pub(crate) fn grow(&mut self, margin: i32) {
        let grown = self.bounds.expand(margin).intersect(&self.band);
        if !grown.is_empty() {
            self.bounds = grown;
        }
    }

    /// Center of the rectangle, used when the creature is not visible.
    pub(crate) fn center(&self) -> Point {
        self.bounds.center()
    }
}

fn quadrant_region(band: &Rect, drone: Point, quadrant: Quadrant) -> Rect {
    let (x_min, x_max) = if quadrant.is_left() {
        (band.x_min(), drone.x())
    } else {
        (drone.x(), band.x_max())
    };
    let (y_min, y_max) = if quadrant.is_top() {
        (band.y_min(), drone.y())
    } else {
        (drone.y(), band.y_max())
    };

    Rect::new(x_min, x_max, y_min, y_max).intersect(band)
}
