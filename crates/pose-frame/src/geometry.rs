//! Planar joint geometry

use serde::{Deserialize, Serialize};

/// A 2-D point in normalized frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Unsigned angle at vertex `b` between rays b→a and b→c, in degrees.
///
/// Always lies in [0, 180]: reflex results are folded back to `360 - angle`.
/// NaN inputs propagate; callers gate on landmark visibility first.
pub fn angle(a: Point2, b: Point2, c: Point2) -> f64 {
    let rad = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let degrees = rad.to_degrees().abs();

    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Horizontal distance between two points
pub fn horizontal_span(a: Point2, b: Point2) -> f64 {
    (a.x - b.x).abs()
}
