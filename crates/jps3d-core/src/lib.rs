//! Core types for 3D voxel pathfinding.
//!
//! - [`Position`] and [`GridRect`]: integer voxel geometry
//! - [`Grid`]: dense walkability storage with bounds-safe queries
//! - [`DiagonalMovement`] and the [`movement`] predicates: which single
//!   steps are legal, shared by neighbour enumeration and the search
//! - [`GridError`]: setup errors (matrix size mismatch, endpoints out of bounds)

pub mod error;
pub mod geom;
pub mod grid;
pub mod movement;

pub use error::{GridError, Result};
pub use geom::{GridRect, Position};
pub use grid::{Grid, WalkableMatrix};
pub use movement::{DIRECTIONS, DiagonalMovement, Walkable, can_step};
