pub(crate) mod model;
pub mod presets;
pub(crate) mod runner;
