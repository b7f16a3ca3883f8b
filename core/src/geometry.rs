//! Integer map geometry shared by the estimator, the pilot and the collision predictor.

use serde::{Deserialize, Serialize};

/// Location on the contest map expressed in whole map units.
///
/// The `y` axis grows downward: `y = 0` is the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Creates a new map point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, increasing with depth.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the point displaced by the provided vector.
    #[must_use]
    pub const fn offset(self, by: Vector) -> Self {
        Self::new(self.x + by.dx, self.y + by.dy)
    }

    /// Returns the displacement leading from `self` to `other`.
    #[must_use]
    pub const fn vector_to(self, other: Point) -> Vector {
        Vector::new(other.x - self.x, other.y - self.y)
    }
}

/// Displacement covered in a single turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector {
    dx: i32,
    dy: i32,
}

impl Vector {
    /// Zero displacement.
    pub const ZERO: Vector = Vector::new(0, 0);

    /// Creates a new displacement.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Euclidean length of the displacement.
    #[must_use]
    pub fn length(&self) -> f64 {
        f64::from(self.dx).hypot(f64::from(self.dy))
    }
}

/// Axis-aligned rectangle with inclusive integer bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
}

impl Rect {
    /// Creates a rectangle from its inclusive bounds.
    #[must_use]
    pub const fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Degenerate rectangle covering exactly one point.
    #[must_use]
    pub const fn point(point: Point) -> Self {
        Self::new(point.x(), point.x(), point.y(), point.y())
    }

    /// Smallest horizontal coordinate contained in the rectangle.
    #[must_use]
    pub const fn x_min(&self) -> i32 {
        self.x_min
    }

    /// Largest horizontal coordinate contained in the rectangle.
    #[must_use]
    pub const fn x_max(&self) -> i32 {
        self.x_max
    }

    /// Smallest vertical coordinate contained in the rectangle.
    #[must_use]
    pub const fn y_min(&self) -> i32 {
        self.y_min
    }

    /// Largest vertical coordinate contained in the rectangle.
    #[must_use]
    pub const fn y_max(&self) -> i32 {
        self.y_max
    }

    /// Reports whether the bounds describe no point at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    /// Reports whether the point lies within the inclusive bounds.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x() >= self.x_min
            && point.x() <= self.x_max
            && point.y() >= self.y_min
            && point.y() <= self.y_max
    }

    /// Reports whether `other` lies entirely within `self`.
    #[must_use]
    pub const fn encloses(&self, other: &Rect) -> bool {
        other.x_min >= self.x_min
            && other.x_max <= self.x_max
            && other.y_min >= self.y_min
            && other.y_max <= self.y_max
    }

    /// Intersection of both rectangles; may be empty.
    #[must_use]
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x_min.max(other.x_min),
            self.x_max.min(other.x_max),
            self.y_min.max(other.y_min),
            self.y_max.min(other.y_max),
        )
    }

    /// Grows the rectangle by `margin` on every side.
    #[must_use]
    pub const fn expand(&self, margin: i32) -> Rect {
        Rect::new(
            self.x_min - margin,
            self.x_max + margin,
            self.y_min - margin,
            self.y_max + margin,
        )
    }

    /// Center of the rectangle rounded to the nearest map unit.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            round_half(i64::from(self.x_min) + i64::from(self.x_max)),
            round_half(i64::from(self.y_min) + i64::from(self.y_max)),
        )
    }
}

fn round_half(sum: i64) -> i32 {
    (sum as f64 / 2.0).round() as i32
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    a.vector_to(b).length()
}

/// Arithmetic mean of the points rounded to the nearest map unit.
///
/// Returns `None` when no point is provided.
#[must_use]
pub fn barycenter(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let count = points.len() as f64;
    let (sum_x, sum_y) = points.iter().fold((0_i64, 0_i64), |(sx, sy), point| {
        (sx + i64::from(point.x()), sy + i64::from(point.y()))
    });

    Some(Point::new(
        (sum_x as f64 / count).round() as i32,
        (sum_y as f64 / count).round() as i32,
    ))
}

/// Clamps the point into the rectangle axis by axis.
#[must_use]
pub fn clamp_to_rect(point: Point, rect: &Rect) -> Point {
    Point::new(
        point.x().clamp(rect.x_min(), rect.x_max().max(rect.x_min())),
        point.y().clamp(rect.y_min(), rect.y_max().max(rect.y_min())),
    )
}

/// Smallest root of `a·t² + b·t + c = 0` lying in `(0, 1]`.
///
/// Returns `None` when `a <= 0`, when the roots are complex, or when neither
/// root falls inside the unit turn.
#[must_use]
pub fn solve_quadratic_roots(a: f64, b: f64, c: f64) -> Option<f64> {
    if a <= 0.0 {
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = (-b - root) / (2.0 * a);
    let far = (-b + root) / (2.0 * a);

    [near, far].into_iter().find(|t| *t > 0.0 && *t <= 1.0)
}
