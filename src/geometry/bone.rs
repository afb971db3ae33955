use std::collections::BTreeMap;

use crate::foundation::core::Point;
use crate::foundation::error::{WeightError, WeightResult};
use crate::geometry::segment::Segment;

/// A named line segment in UV space acting as a rigging influence axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    name: String,
    segment: Segment,
}

impl Bone {
    pub fn new(name: impl Into<String>, a: Point, b: Point) -> WeightResult<Self> {
        let name = name.into();
        validate_bone_name(&name)?;
        let segment = Segment::new(a, b)
            .map_err(|e| WeightError::invalid_bone(format!("bone '{name}': {e}")))?;
        Ok(Self { name, segment })
    }

    /// Build a bone from pixel coordinates on a square UV map of `uv_size` pixels.
    pub fn from_pixels(
        name: impl Into<String>,
        a_px: Point,
        b_px: Point,
        uv_size: f64,
    ) -> WeightResult<Self> {
        if !uv_size.is_finite() || uv_size <= 0.0 {
            return Err(WeightError::validation(format!(
                "uv_size must be finite and > 0, got {uv_size}"
            )));
        }
        let scale = |p: Point| Point::new(p.x / uv_size, p.y / uv_size);
        Self::new(name, scale(a_px), scale(b_px))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn dist(&self, x: Point) -> f64 {
        self.segment.dist(x)
    }
}

fn validate_bone_name(name: &str) -> WeightResult<()> {
    if name.trim().is_empty() {
        return Err(WeightError::invalid_bone("bone name must be non-empty"));
    }
    // Names end up in exported file names.
    if name.contains(['/', '\\']) {
        return Err(WeightError::invalid_bone(format!(
            "bone name '{name}' must not contain path separators"
        )));
    }
    Ok(())
}

/// Bones keyed by unique name, kept in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneSet {
    bones: Vec<Bone>,
    index: BTreeMap<String, usize>,
}

impl BoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bones(bones: impl IntoIterator<Item = Bone>) -> WeightResult<Self> {
        let mut set = Self::new();
        for bone in bones {
            set.insert(bone)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, bone: Bone) -> WeightResult<()> {
        if self.index.contains_key(bone.name()) {
            return Err(WeightError::duplicate_bone_name(bone.name()));
        }
        self.index.insert(bone.name().to_owned(), self.bones.len());
        self.bones.push(bone);
        Ok(())
    }

    pub fn with(mut self, bone: Bone) -> WeightResult<Self> {
        self.insert(bone)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Declaration index of `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.index_of(name).map(|i| &self.bones[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bone> {
        self.bones.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.bones.iter().map(Bone::name)
    }
}

impl<'a> IntoIterator for &'a BoneSet {
    type Item = &'a Bone;
    type IntoIter = std::slice::Iter<'a, Bone>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/bone.rs"]
mod tests;
