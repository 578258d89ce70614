//! Angle math on normalized 2D landmark coordinates.

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// Added to the norm product so zero-length vectors never divide by zero
const NORM_EPSILON: f64 = 1e-6;

/// A 2D point or vector in normalized frame space
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Angle in degrees at vertex `b` between the rays `b→a` and `b→c`
///
/// Always in `[0, 180]`. Degenerate input (a ray of zero length) yields 90°
/// rather than failing.
pub fn joint_angle(a: Point, b: Point, c: Point) -> f64 {
    vector_angle(a - b, c - b)
}

/// Angle in degrees between two vectors, in `[0, 180]`
pub fn vector_angle(v1: Point, v2: Point) -> f64 {
    let cos_angle = v1.dot(v2) / (v1.norm() * v2.norm() + NORM_EPSILON);
    cos_angle.clamp(-1.0, 1.0).acos().to_degrees()
}
