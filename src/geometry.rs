pub(crate) mod bone;
pub(crate) mod segment;
