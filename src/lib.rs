//! weightpaint computes per-pixel bone-influence weight maps over UV space and exports each bone's
//! influence as a grayscale image, ready to be imported as vertex-weight paint in a 3D package.
//!
//! # Pipeline overview
//!
//! 1. **Bones**: named line segments in UV space, collected in a [`BoneSet`] keyed by name.
//! 2. **Initialize**: [`WeightMap::from_distances`] fills every cell with normalized inverse-distance weights.
//! 3. **Shape**: prune to the strongest bones ([`WeightMap::limit_weight_count`]), soften the seams
//!    that leaves ([`WeightMap::smooth_edge`]), re-normalize, and mask by another map's channel
//!    ([`WeightMap::multiply`]).
//! 4. **Export**: one 8-bit grayscale image per bone ([`export_channels`]).
//!
//! The state of a map is part of its type (see [`stage`]): a smoothed map has to be normalized
//! before it can be exported or used as a mask.
//!
//! A whole job can also be described as data with a [`Rig`] (JSON or [`presets`]) and executed with
//! [`run_rig`].
#![forbid(unsafe_code)]

mod export;
mod foundation;
mod geometry;
mod rig;
mod weights;

pub use rig::presets;
pub use weights::stage;

pub use export::raster::{
    ExportFormat, channel_image, export_channels, export_file_name, weight_to_intensity,
};
pub use foundation::core::{Point, Resolution, Vec2};
pub use foundation::error::{WeightError, WeightResult};
pub use geometry::bone::{Bone, BoneSet};
pub use geometry::segment::Segment;
pub use rig::model::{BoneSpec, LineSpec, MapSpec, Rig, StageKind, Step};
pub use rig::runner::{RigOutput, RunMap, StagedMap, export_rig, run_rig};
pub use weights::grid::{MIN_DISTANCE, WeightMap};
pub use weights::stage::{Masked, Normalized, Smoothed};
