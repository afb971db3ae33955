use std::marker::PhantomData;

use crate::foundation::core::{Point, Resolution};
use crate::foundation::error::{WeightError, WeightResult};
use crate::geometry::bone::BoneSet;
use crate::geometry::segment::Segment;
use crate::weights::stage::{Maskable, Masked, Normalized, Prunable, Smoothed, Stage};

/// Distances below this are clamped before taking the inverse-distance falloff.
///
/// A sample lying exactly on a bone would otherwise get an infinite weight.
pub const MIN_DISTANCE: f64 = 1e-9;

/// Per-pixel bone weights over UV space.
///
/// The map is bound to one [`BoneSet`] for its whole lifetime. Each cell holds at most one
/// entry per bone; a missing entry reads as weight 0. Storage is a dense
/// `height × width × bones` table indexed through the set's name-to-index table.
///
/// The type parameter tracks which shaping operations have run (see [`crate::stage`]).
#[derive(Clone, Debug)]
pub struct WeightMap<S: Stage = Normalized> {
    resolution: Resolution,
    bones: BoneSet,
    weights: Vec<Option<f64>>,
    _stage: PhantomData<S>,
}

impl WeightMap<Normalized> {
    /// Bind a new map to `bones` and fill every cell with normalized inverse-distance weights.
    #[tracing::instrument(skip(bones), fields(bone_count = bones.len()))]
    pub fn from_distances(resolution: Resolution, bones: &BoneSet) -> WeightResult<Self> {
        resolution.validate()?;
        if bones.is_empty() {
            return Err(WeightError::validation(
                "a weight map needs at least one bone",
            ));
        }

        let mut weights = Vec::with_capacity(resolution.cell_count() * bones.len());
        for j in 0..resolution.height {
            for i in 0..resolution.width {
                let uv = resolution.cell_uv(i, j);
                weights.extend(
                    bones
                        .iter()
                        .map(|bone| Some(1.0 / bone.dist(uv).max(MIN_DISTANCE))),
                );
            }
        }

        let map = WeightMap::<Smoothed> {
            resolution,
            bones: bones.clone(),
            weights,
            _stage: PhantomData,
        };
        Ok(map.normalize())
    }
}

impl<S: Stage> WeightMap<S> {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }

    /// The active bone set this map was built from.
    pub fn bones(&self) -> &BoneSet {
        &self.bones
    }

    pub fn stage_name(&self) -> &'static str {
        S::NAME
    }

    /// Weight of `bone` at cell `(i, j)`, or `None` when the cell has no entry for it.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` lies outside the map.
    pub fn entry(&self, i: u32, j: u32, bone: &str) -> Option<f64> {
        let k = self.bones.index_of(bone)?;
        self.cell_slice(i, j)[k]
    }

    /// Weight of `bone` at cell `(i, j)`, reading missing entries as 0.
    pub fn weight(&self, i: u32, j: u32, bone: &str) -> f64 {
        self.entry(i, j, bone).unwrap_or(0.0)
    }

    /// Entries present at cell `(i, j)`, in bone declaration order.
    pub fn cell(&self, i: u32, j: u32) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.bones
            .names()
            .zip(self.cell_slice(i, j).iter())
            .filter_map(|(name, w)| w.map(|w| (name, w)))
    }

    /// Number of entries present at cell `(i, j)`.
    pub fn entry_count(&self, i: u32, j: u32) -> usize {
        self.cell_slice(i, j).iter().flatten().count()
    }

    /// Sum of the weights present at cell `(i, j)`.
    pub fn cell_sum(&self, i: u32, j: u32) -> f64 {
        self.cell_slice(i, j).iter().flatten().sum()
    }

    /// Rescale every cell so its weights sum to 1. Empty and zero-sum cells are left untouched.
    pub fn normalize(mut self) -> WeightMap<Normalized> {
        for cell in self.cells_mut() {
            let sum: f64 = cell.iter().flatten().sum();
            if sum > 0.0 && sum.is_finite() {
                for w in cell.iter_mut().flatten() {
                    *w /= sum;
                }
            }
        }
        self.restage()
    }

    /// Fade the `bone` channel to 0 along the `guide` line.
    ///
    /// Each existing entry is multiplied by `1 - 1 / (1 + distance * strength)` clamped to `[0, 1]`,
    /// where `distance` is measured from the cell to `guide`. Other channels are not touched, so the
    /// result must be normalized again. An unknown `bone` leaves the map unchanged.
    pub fn smooth_edge(
        mut self,
        bone: &str,
        guide: &Segment,
        strength: f64,
    ) -> WeightResult<WeightMap<Smoothed>> {
        if !strength.is_finite() || strength < 0.0 {
            return Err(WeightError::validation(format!(
                "smoothing strength must be finite and >= 0, got {strength}"
            )));
        }
        let Some(k) = self.bones.index_of(bone) else {
            tracing::warn!(bone, "smooth_edge: bone is not part of this map, nothing to smooth");
            return Ok(self.restage());
        };

        let resolution = self.resolution;
        let n = self.bones.len();
        for (c, cell) in self.weights.chunks_exact_mut(n).enumerate() {
            let Some(w) = cell[k].as_mut() else {
                continue;
            };
            let falloff = 1.0 - 1.0 / (1.0 + guide.dist(cell_point(resolution, c)) * strength);
            *w *= falloff.clamp(0.0, 1.0);
        }
        tracing::debug!(bone, strength, "smoothed edge");
        Ok(self.restage())
    }

    fn restage<T: Stage>(self) -> WeightMap<T> {
        WeightMap {
            resolution: self.resolution,
            bones: self.bones,
            weights: self.weights,
            _stage: PhantomData,
        }
    }

    pub(crate) fn cell_slice(&self, i: u32, j: u32) -> &[Option<f64>] {
        assert!(
            i < self.resolution.width && j < self.resolution.height,
            "cell ({i}, {j}) is outside a {}x{} weight map",
            self.resolution.width,
            self.resolution.height
        );
        let n = self.bones.len();
        let start = (j as usize * self.resolution.width as usize + i as usize) * n;
        &self.weights[start..start + n]
    }

    fn cells_mut(&mut self) -> std::slice::ChunksExactMut<'_, Option<f64>> {
        let n = self.bones.len();
        self.weights.chunks_exact_mut(n)
    }
}

impl<S: Prunable> WeightMap<S> {
    /// Keep only the `count` strongest entries of every cell, then re-normalize.
    ///
    /// Among equal weights the bone declared later in the set is dropped first.
    /// A `count` of 0 empties every cell.
    pub fn limit_weight_count(mut self, count: usize) -> WeightMap<Normalized> {
        let mut ranked: Vec<(usize, f64)> = Vec::with_capacity(self.bones.len());
        for cell in self.cells_mut() {
            ranked.clear();
            ranked.extend(cell.iter().enumerate().filter_map(|(k, w)| w.map(|w| (k, w))));
            if ranked.len() <= count {
                continue;
            }
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            for &(k, _) in &ranked[count..] {
                cell[k] = None;
            }
        }
        tracing::debug!(count, "limited weight count");
        self.normalize()
    }
}

impl<S: Maskable> WeightMap<S> {
    /// Scale every entry of each cell by `other`'s weight for `bone` at the same cell.
    ///
    /// Cells where `other` has no entry for `bone` (or `bone` is unknown to `other`) are scaled by 0.
    /// The result is not re-normalized.
    pub fn multiply(
        mut self,
        other: &WeightMap<Normalized>,
        bone: &str,
    ) -> WeightResult<WeightMap<Masked>> {
        if other.resolution != self.resolution {
            return Err(WeightError::validation(format!(
                "cannot multiply a {}x{} map by a {}x{} map",
                self.resolution.width,
                self.resolution.height,
                other.resolution.width,
                other.resolution.height
            )));
        }
        let source = other.bones.index_of(bone);
        if source.is_none() {
            tracing::warn!(bone, "multiply: bone is not part of the source map, using factor 0");
        }

        let m = other.bones.len();
        for (c, cell) in self.cells_mut().enumerate() {
            let factor = source
                .and_then(|k| other.weights[c * m + k])
                .unwrap_or(0.0);
            for w in cell.iter_mut().flatten() {
                *w *= factor;
            }
        }
        tracing::debug!(bone, "multiplied by source channel");
        Ok(self.restage())
    }
}

fn cell_point(resolution: Resolution, c: usize) -> Point {
    let width = resolution.width as usize;
    resolution.cell_uv((c % width) as u32, (c / width) as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/weights/grid.rs"]
mod tests;
