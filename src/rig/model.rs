use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::export::raster::ExportFormat;
use crate::foundation::core::{Point, Resolution};
use crate::foundation::error::{WeightError, WeightResult};
use crate::geometry::bone::{Bone, BoneSet};
use crate::geometry::segment::Segment;

/// A complete weight-painting job: bone sets, shaping steps and export settings.
///
/// A rig is plain data that can be built in code (see [`crate::presets`]) or loaded from JSON.
/// Maps are processed in declaration order; a `multiply` step may only reference a map declared
/// earlier in the list.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rig {
    /// Pixel resolution of every map and exported image.
    pub resolution: Resolution,
    /// When set, bone coordinates are pixels on a square UV map of this size. Otherwise they are UV.
    /// Smoothing guide lines are always UV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_size: Option<f64>,
    /// Image format of exported channels.
    #[serde(default)]
    pub format: ExportFormat,
    /// Weight maps, in processing order.
    pub maps: Vec<MapSpec>,
}

/// One weight map: its bone set and the shaping steps applied after distance initialization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapSpec {
    /// Map name, referenced by `multiply` steps.
    pub name: String,
    /// Bones of this map; names must be unique within the map.
    pub bones: Vec<BoneSpec>,
    /// Shaping steps, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Whether the map's channels are written out.
    #[serde(default = "default_export")]
    pub export: bool,
}

fn default_export() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoneSpec {
    pub name: String,
    pub a: [f64; 2],
    pub b: [f64; 2],
}

/// Guide line for edge smoothing, in UV coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineSpec {
    pub a: [f64; 2],
    pub b: [f64; 2],
}

/// A shaping operation applied to a map.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Keep the `count` strongest bones per cell and re-normalize.
    LimitWeightCount { count: usize },
    /// Fade `bone` to 0 along `line`.
    SmoothEdge {
        bone: String,
        line: LineSpec,
        strength: f64,
    },
    /// Restore the per-cell sum-to-1 invariant.
    Normalize,
    /// Scale the map by `bone`'s channel of the earlier map `map`.
    Multiply { map: String, bone: String },
}

/// Runtime view of the call-order states, used to check step sequences before running them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Normalized,
    Smoothed,
    Masked,
}

impl StageKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::Smoothed => "smoothed",
            Self::Masked => "masked",
        }
    }

    pub fn is_exportable(self) -> bool {
        !matches!(self, Self::Smoothed)
    }
}

impl Step {
    /// Name used in diagnostics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LimitWeightCount { .. } => "limit_weight_count",
            Self::SmoothEdge { .. } => "smooth_edge",
            Self::Normalize => "normalize",
            Self::Multiply { .. } => "multiply",
        }
    }

    /// State after applying this step to a map in state `from`, or `None` if the order is illegal.
    pub fn next_stage(&self, from: StageKind) -> Option<StageKind> {
        match (self, from) {
            (Self::LimitWeightCount { .. }, StageKind::Normalized | StageKind::Smoothed) => {
                Some(StageKind::Normalized)
            }
            (Self::LimitWeightCount { .. }, StageKind::Masked) => None,
            (Self::SmoothEdge { .. }, _) => Some(StageKind::Smoothed),
            (Self::Normalize, _) => Some(StageKind::Normalized),
            (Self::Multiply { .. }, StageKind::Normalized | StageKind::Masked) => {
                Some(StageKind::Masked)
            }
            (Self::Multiply { .. }, StageKind::Smoothed) => None,
        }
    }
}

impl LineSpec {
    pub fn to_segment(self) -> WeightResult<Segment> {
        Segment::new(point(self.a), point(self.b))
    }
}

fn point(p: [f64; 2]) -> Point {
    Point::new(p[0], p[1])
}

impl MapSpec {
    /// Build the validated bone set, converting pixel coordinates when `uv_size` is set.
    pub fn bone_set(&self, uv_size: Option<f64>) -> WeightResult<BoneSet> {
        let bones = self.bones.iter().map(|b| match uv_size {
            Some(size) => Bone::from_pixels(b.name.as_str(), point(b.a), point(b.b), size),
            None => Bone::new(b.name.as_str(), point(b.a), point(b.b)),
        });
        let mut set = BoneSet::new();
        for bone in bones {
            set.insert(bone?)?;
        }
        Ok(set)
    }
}

impl Rig {
    /// Parse a rig from a JSON reader. The result is not validated.
    pub fn from_reader<R: std::io::Read>(r: R) -> WeightResult<Self> {
        serde_json::from_reader(r).map_err(|e| WeightError::serde(format!("parse rig JSON: {e}")))
    }

    /// Parse a rig from a JSON string. The result is not validated.
    pub fn from_json_str(s: &str) -> WeightResult<Self> {
        serde_json::from_str(s).map_err(|e| WeightError::serde(format!("parse rig JSON: {e}")))
    }

    /// Parse and validate a rig from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WeightResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WeightError::validation(format!("open rig JSON '{}': {e}", path.display()))
        })?;
        let rig = Self::from_reader(BufReader::new(f))?;
        rig.validate()?;
        Ok(rig)
    }

    pub fn to_json_string(&self) -> WeightResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| WeightError::serde(format!("serialize rig JSON: {e}")))
    }

    pub fn map(&self, name: &str) -> Option<&MapSpec> {
        self.maps.iter().find(|m| m.name == name)
    }

    /// Check bones, step order and cross-map references without computing any weights.
    pub fn validate(&self) -> WeightResult<()> {
        self.resolution.validate()?;
        if let Some(size) = self.uv_size
            && (!size.is_finite() || size <= 0.0)
        {
            return Err(WeightError::validation(format!(
                "uv_size must be finite and > 0, got {size}"
            )));
        }
        if self.maps.is_empty() {
            return Err(WeightError::validation("rig must declare at least one map"));
        }

        // Final state and bone set of every map checked so far.
        let mut done: BTreeMap<&str, (StageKind, BoneSet)> = BTreeMap::new();
        // Exported bone name -> owning map.
        let mut exported: BTreeMap<&str, &str> = BTreeMap::new();

        for spec in &self.maps {
            if spec.name.trim().is_empty() {
                return Err(WeightError::validation("map name must be non-empty"));
            }
            if done.contains_key(spec.name.as_str()) {
                return Err(WeightError::validation(format!(
                    "duplicate map name '{}'",
                    spec.name
                )));
            }
            let bones = spec.bone_set(self.uv_size)?;
            if bones.is_empty() {
                return Err(WeightError::validation(format!(
                    "map '{}' must declare at least one bone",
                    spec.name
                )));
            }

            let mut stage = StageKind::Normalized;
            for (idx, step) in spec.steps.iter().enumerate() {
                let at = || format!("map '{}' step {idx} ({})", spec.name, step.kind());
                match step {
                    Step::LimitWeightCount { .. } | Step::Normalize => {}
                    Step::SmoothEdge {
                        bone,
                        line,
                        strength,
                    } => {
                        if !strength.is_finite() || *strength < 0.0 {
                            return Err(WeightError::validation(format!(
                                "{}: strength must be finite and >= 0",
                                at()
                            )));
                        }
                        line.to_segment()
                            .map_err(|e| WeightError::validation(format!("{}: {e}", at())))?;
                        if !bones.contains(bone) {
                            tracing::warn!(map = %spec.name, bone = %bone, "smooth_edge references an unknown bone");
                        }
                    }
                    Step::Multiply { map, bone } => {
                        let Some((source_stage, source_bones)) = done.get(map.as_str()) else {
                            return Err(WeightError::validation(format!(
                                "{}: map '{map}' must be declared earlier",
                                at()
                            )));
                        };
                        if *source_stage != StageKind::Normalized {
                            return Err(WeightError::validation(format!(
                                "{}: source map '{map}' ends {}, expected normalized",
                                at(),
                                source_stage.name()
                            )));
                        }
                        if !source_bones.contains(bone) {
                            tracing::warn!(map = %spec.name, source = %map, bone = %bone, "multiply references an unknown bone");
                        }
                    }
                }
                stage = step.next_stage(stage).ok_or_else(|| {
                    WeightError::validation(format!(
                        "{}: not allowed on a {} map",
                        at(),
                        stage.name()
                    ))
                })?;
            }

            if spec.export {
                if !stage.is_exportable() {
                    return Err(WeightError::validation(format!(
                        "map '{}' ends smoothed; add a normalize step before export",
                        spec.name
                    )));
                }
                for name in spec.bones.iter().map(|b| b.name.as_str()) {
                    if let Some(other) = exported.insert(name, spec.name.as_str()) {
                        return Err(WeightError::validation(format!(
                            "bone '{name}' is exported by both map '{other}' and map '{}'",
                            spec.name
                        )));
                    }
                }
            }
            done.insert(spec.name.as_str(), (stage, bones));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/model.rs"]
mod tests;
