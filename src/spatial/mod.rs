//! Spatial indexing and per-zone tile grids

pub mod grid;
pub mod sparse_hash;

pub use grid::{Grid, ObstacleGrid};
pub use sparse_hash::SpatialIndex;
