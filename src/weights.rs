pub(crate) mod grid;
pub mod stage;
