use crate::foundation::core::Point;
use crate::foundation::error::{WeightError, WeightResult};

/// A finite, non-degenerate line segment in UV space.
///
/// Bones wrap a segment; smoothing guide lines are plain segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    a: Point,
    b: Point,
}

impl Segment {
    pub fn new(a: Point, b: Point) -> WeightResult<Self> {
        if !(a.is_finite() && b.is_finite()) {
            return Err(WeightError::invalid_bone(format!(
                "segment endpoints must be finite, got {a:?}-{b:?}"
            )));
        }
        if a == b {
            return Err(WeightError::invalid_bone(format!(
                "segment endpoints coincide at ({}, {})",
                a.x, a.y
            )));
        }
        Ok(Self { a, b })
    }

    pub fn a(&self) -> Point {
        self.a
    }

    pub fn b(&self) -> Point {
        self.b
    }

    pub fn length(&self) -> f64 {
        (self.a - self.b).hypot()
    }

    /// Shortest Euclidean distance from `x` to the segment.
    ///
    /// When `x` projects inside `[a, b]` this is the perpendicular distance to the carrier line,
    /// otherwise the distance to the nearer endpoint.
    pub fn dist(&self, x: Point) -> f64 {
        let (a, b) = (self.a, self.b);
        if (a - b).dot(x - b) * (b - a).dot(x - a) >= 0.0 {
            (b - a).cross(x - a).abs() / self.length()
        } else {
            a.distance(x).min(b.distance(x))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/segment.rs"]
mod tests;
