use std::path::{Path, PathBuf};

use crate::export::raster::{ExportFormat, export_channels};
use crate::foundation::error::{WeightError, WeightResult};
use crate::geometry::bone::BoneSet;
use crate::rig::model::{MapSpec, Rig, StageKind, Step};
use crate::weights::grid::WeightMap;
use crate::weights::stage::{Masked, Normalized, Smoothed};

/// A weight map in whichever state its step sequence left it.
#[derive(Clone, Debug)]
pub enum StagedMap {
    Normalized(WeightMap<Normalized>),
    Smoothed(WeightMap<Smoothed>),
    Masked(WeightMap<Masked>),
}

impl StagedMap {
    pub fn stage(&self) -> StageKind {
        match self {
            Self::Normalized(_) => StageKind::Normalized,
            Self::Smoothed(_) => StageKind::Smoothed,
            Self::Masked(_) => StageKind::Masked,
        }
    }

    pub fn bones(&self) -> &BoneSet {
        match self {
            Self::Normalized(m) => m.bones(),
            Self::Smoothed(m) => m.bones(),
            Self::Masked(m) => m.bones(),
        }
    }

    pub fn weight(&self, i: u32, j: u32, bone: &str) -> f64 {
        match self {
            Self::Normalized(m) => m.weight(i, j, bone),
            Self::Smoothed(m) => m.weight(i, j, bone),
            Self::Masked(m) => m.weight(i, j, bone),
        }
    }

    pub fn as_normalized(&self) -> Option<&WeightMap<Normalized>> {
        match self {
            Self::Normalized(m) => Some(m),
            _ => None,
        }
    }

    /// Write every channel as `<base>_<bone>.<ext>`. Smoothed maps are refused.
    pub fn export(&self, base: &Path, format: ExportFormat) -> WeightResult<Vec<PathBuf>> {
        match self {
            Self::Normalized(m) => export_channels(m, base, format),
            Self::Masked(m) => export_channels(m, base, format),
            Self::Smoothed(_) => Err(WeightError::validation(
                "smoothed maps must be normalized before export",
            )),
        }
    }

    fn apply(self, step: &Step, earlier: &[RunMap]) -> WeightResult<Self> {
        let illegal = |stage: StageKind| {
            WeightError::validation(format!(
                "{} is not allowed on a {} map",
                step.kind(),
                stage.name()
            ))
        };
        Ok(match step {
            Step::LimitWeightCount { count } => match self {
                Self::Normalized(m) => Self::Normalized(m.limit_weight_count(*count)),
                Self::Smoothed(m) => Self::Normalized(m.limit_weight_count(*count)),
                Self::Masked(_) => return Err(illegal(StageKind::Masked)),
            },
            Step::SmoothEdge {
                bone,
                line,
                strength,
            } => {
                let guide = line.to_segment()?;
                Self::Smoothed(match self {
                    Self::Normalized(m) => m.smooth_edge(bone, &guide, *strength)?,
                    Self::Smoothed(m) => m.smooth_edge(bone, &guide, *strength)?,
                    Self::Masked(m) => m.smooth_edge(bone, &guide, *strength)?,
                })
            }
            Step::Normalize => Self::Normalized(match self {
                Self::Normalized(m) => m,
                Self::Smoothed(m) => m.normalize(),
                Self::Masked(m) => m.normalize(),
            }),
            Step::Multiply { map, bone } => {
                let source = earlier
                    .iter()
                    .find(|r| r.name == *map)
                    .ok_or_else(|| {
                        WeightError::validation(format!("map '{map}' must be declared earlier"))
                    })?
                    .map
                    .as_normalized()
                    .ok_or_else(|| {
                        WeightError::validation(format!("source map '{map}' is not normalized"))
                    })?;
                Self::Masked(match self {
                    Self::Normalized(m) => m.multiply(source, bone)?,
                    Self::Masked(m) => m.multiply(source, bone)?,
                    Self::Smoothed(_) => return Err(illegal(StageKind::Smoothed)),
                })
            }
        })
    }
}

/// Final state of one rig map.
#[derive(Clone, Debug)]
pub struct RunMap {
    pub name: String,
    pub export: bool,
    pub map: StagedMap,
}

/// Every map of a rig after its steps have run, in declaration order.
#[derive(Clone, Debug)]
pub struct RigOutput {
    pub format: ExportFormat,
    pub maps: Vec<RunMap>,
}

impl RigOutput {
    pub fn get(&self, name: &str) -> Option<&StagedMap> {
        self.maps.iter().find(|r| r.name == name).map(|r| &r.map)
    }

    /// Export all maps flagged for export under one base name. Returns the written paths.
    pub fn export(&self, base: &Path) -> WeightResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for run in self.maps.iter().filter(|r| r.export) {
            written.extend(run.map.export(base, self.format)?);
        }
        Ok(written)
    }
}

/// Validate `rig` and compute all of its maps.
#[tracing::instrument(skip(rig), fields(maps = rig.maps.len()))]
pub fn run_rig(rig: &Rig) -> WeightResult<RigOutput> {
    rig.validate()?;
    let mut maps: Vec<RunMap> = Vec::with_capacity(rig.maps.len());
    for spec in &rig.maps {
        let map = run_map(rig, spec, &maps)?;
        maps.push(RunMap {
            name: spec.name.clone(),
            export: spec.export,
            map,
        });
    }
    Ok(RigOutput {
        format: rig.format,
        maps,
    })
}

fn run_map(rig: &Rig, spec: &MapSpec, earlier: &[RunMap]) -> WeightResult<StagedMap> {
    let bones = spec.bone_set(rig.uv_size)?;
    let mut map = StagedMap::Normalized(WeightMap::from_distances(rig.resolution, &bones)?);
    for step in &spec.steps {
        map = map.apply(step, earlier)?;
        tracing::debug!(map = %spec.name, step = step.kind(), stage = map.stage().name(), "applied step");
    }
    Ok(map)
}

/// Run `rig` and write every exported channel as `<base>_<bone>.<ext>`.
pub fn export_rig(rig: &Rig, base: &Path) -> WeightResult<Vec<PathBuf>> {
    let output = run_rig(rig)?;
    output.export(base)
}

#[cfg(test)]
#[path = "../../tests/unit/rig/runner.rs"]
mod tests;
