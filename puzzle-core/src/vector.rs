use std::fmt;
use std::ops::{Add, Sub};

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Immutable two dimensional value used for positions, sizes and deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

/// Axis selector used by connectors and size references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Component of `v` along this axis.
    pub fn of(self, v: Vector) -> f64 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    /// Same value on both axes.
    pub const fn cast(v: f64) -> Self {
        Vector { x: v, y: v }
    }

    pub fn plus(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    pub fn minus(self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    /// Delta that moves `self` onto `other`.
    pub fn diff(self, other: Vector) -> Vector {
        other.minus(self)
    }

    pub fn multiply(self, factor: Vector) -> Vector {
        Vector::new(self.x * factor.x, self.y * factor.y)
    }

    pub fn divide(self, divisor: Vector) -> Vector {
        Vector::new(self.x / divisor.x, self.y / divisor.y)
    }

    pub fn scale(self, factor: f64) -> Vector {
        Vector::new(self.x * factor, self.y * factor)
    }

    pub fn min(self, other: Vector) -> Vector {
        Vector::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Vector) -> Vector {
        Vector::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Smallest of the two components.
    pub fn inner_min(self) -> f64 {
        self.x.min(self.y)
    }

    pub fn inner_max(self) -> f64 {
        self.x.max(self.y)
    }

    pub fn is_null(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Component-wise equality within `delta`.
    pub fn equal(self, other: Vector, delta: f64) -> bool {
        (self.x - other.x).abs() <= delta && (self.y - other.y).abs() <= delta
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        self.plus(rhs)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        self.minus(rhs)
    }
}

impl From<(f64, f64)> for Vector {
    fn from(v: (f64, f64)) -> Self {
        Vector { x: v.0, y: v.1 }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Mutable position owned by exactly one piece. Queries hand out [`Vector`]
/// snapshots through [`Anchor::as_vector`].
#[derive(Debug, PartialEq)]
pub struct Anchor {
    x: f64,
    y: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64) -> Self {
        Anchor { x, y }
    }

    /// Uniform point between the origin and `(max_x, max_y)`. A negative
    /// bound spans the other side of the axis; a non-finite one pins it to 0.
    pub fn at_random(max_x: f64, max_y: f64, rng: &mut dyn RngCore) -> Self {
        Anchor::new(random_up_to(max_x, rng), random_up_to(max_y, rng))
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Position this anchor would have after translating, without moving it.
    pub fn translated(&self, dx: f64, dy: f64) -> Vector {
        Vector::new(self.x + dx, self.y + dy)
    }

    pub fn relocate_to(&mut self, point: Vector) {
        self.x = point.x;
        self.y = point.y;
    }

    pub fn diff(&self, other: Vector) -> Vector {
        self.as_vector().diff(other)
    }

    pub fn close_to(&self, other: Vector, tolerance: f64) -> bool {
        self.as_vector().equal(other, tolerance)
    }

    pub fn as_vector(&self) -> Vector {
        Vector::new(self.x, self.y)
    }
}

impl From<Vector> for Anchor {
    fn from(v: Vector) -> Self {
        Anchor::new(v.x, v.y)
    }
}

fn random_up_to(bound: f64, rng: &mut dyn RngCore) -> f64 {
    if !bound.is_finite() || bound == 0.0 {
        return 0.0;
    }
    rng.random_range(bound.min(0.0)..=bound.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn diff_points_from_self_to_other() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(4.0, 0.0);
        assert_eq!(a.diff(b), Vector::new(3.0, -2.0));
        assert_eq!(a + a.diff(b), b);
    }

    #[test]
    fn equal_uses_independent_axis_tolerance() {
        let a = Vector::new(0.0, 0.0);
        assert!(a.equal(Vector::new(1.0, -1.0), 1.0));
        assert!(!a.equal(Vector::new(1.5, 0.0), 1.0));
    }

    #[test]
    fn anchor_translates_in_place() {
        let mut anchor = Anchor::new(1.0, 1.0);
        let snapshot = anchor.as_vector();
        anchor.translate(2.0, 3.0);
        assert_eq!(anchor.as_vector(), Vector::new(3.0, 4.0));
        assert_eq!(snapshot, Vector::new(1.0, 1.0));
    }

    #[test]
    fn random_anchor_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let a = Anchor::at_random(10.0, 5.0, &mut rng);
            assert!((0.0..=10.0).contains(&a.x()));
            assert!((0.0..=5.0).contains(&a.y()));
        }
    }

    #[test]
    fn random_anchor_tolerates_odd_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..32 {
            let a = Anchor::at_random(-10.0, f64::NAN, &mut rng);
            assert!((-10.0..=0.0).contains(&a.x()));
            assert_eq!(a.y(), 0.0);
        }
        let b = Anchor::at_random(f64::INFINITY, 0.0, &mut rng);
        assert_eq!(b.as_vector(), Vector::ZERO);
    }
}
