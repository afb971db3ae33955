use crate::foundation::error::{WeightError, WeightResult};

pub use kurbo::{Point, Vec2};

/// Pixel resolution of a weight map and of every image exported from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> WeightResult<Self> {
        let res = Self { width, height };
        res.validate()?;
        Ok(res)
    }

    pub fn square(side: u32) -> WeightResult<Self> {
        Self::new(side, side)
    }

    pub fn validate(self) -> WeightResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WeightError::validation(
                "resolution width/height must be > 0",
            ));
        }
        Ok(())
    }

    pub fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// UV sample point of cell `(i, j)`. Cell `(0, 0)` maps to UV `(0, 0)`, not to the cell center.
    pub fn cell_uv(self, i: u32, j: u32) -> Point {
        Point::new(
            f64::from(i) / f64::from(self.width),
            f64::from(j) / f64::from(self.height),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
