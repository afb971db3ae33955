//! Call-order states of a [`crate::WeightMap`].
//!
//! Every shaping operation consumes the map and returns it in the state it leaves the data in.
//! Operations that require the per-cell sum-to-1 invariant are only implemented for the states
//! that guarantee it, so forgetting to re-normalize after smoothing does not compile.

mod sealed {
    pub trait Sealed {}
}

/// Marker trait implemented by all weight-map states.
pub trait Stage: sealed::Sealed + std::fmt::Debug + Clone + Copy {
    /// Short human-readable state name.
    const NAME: &'static str;
}

/// States whose weights may be written out as images.
pub trait Exportable: Stage {}

/// States on which top-K pruning is meaningful.
pub trait Prunable: Stage {}

/// States that may be multiplied by another map's channel.
pub trait Maskable: Stage {}

/// Every populated cell sums to 1 over the active bone set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Normalized;

/// One or more channels were smoothed; per-cell sums are broken until [`crate::WeightMap::normalize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Smoothed;

/// Channels were scaled by another map's influence; sums are intentionally below 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Masked;

impl sealed::Sealed for Normalized {}
impl sealed::Sealed for Smoothed {}
impl sealed::Sealed for Masked {}

impl Stage for Normalized {
    const NAME: &'static str = "normalized";
}
impl Stage for Smoothed {
    const NAME: &'static str = "smoothed";
}
impl Stage for Masked {
    const NAME: &'static str = "masked";
}

impl Exportable for Normalized {}
impl Exportable for Masked {}

impl Prunable for Normalized {}
impl Prunable for Smoothed {}

impl Maskable for Normalized {}
impl Maskable for Masked {}
