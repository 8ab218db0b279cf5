//! Jump Point Search for 3D voxel grids.
//!
//! This crate finds shortest paths between two cells of a
//! [`jps3d_core::Grid`] under any of the four [`DiagonalMovement`] policies:
//!
//! - **Search** ([`SearchParameters::find_path`]): A* over jump points,
//!   returning the turning points of an optimal path
//! - **Expansion** ([`expand_path`]): the full cell-by-cell path between
//!   jump points
//! - **Metrics** ([`Heuristic`]): Manhattan, Euclidean or Chebyshev, used
//!   both as the goal estimate and as the cost of a jump
//!
//! All per-search state lives in [`SearchParameters`], which borrows the
//! grid immutably and reuses its buffers across queries.
//!
//! ```
//! use jps3d_core::{Grid, Position};
//! use jps3d_paths::{SearchParameters, expand_path};
//!
//! let grid = Grid::new(10, 10, 10);
//! let mut params = SearchParameters::new(&grid, Position::ZERO, Position::new(9, 9, 9))?;
//! let path = params.find_path();
//! assert_eq!(path, vec![Position::ZERO, Position::new(9, 9, 9)]);
//! assert_eq!(expand_path(&path).len(), 10);
//! # Ok::<(), jps3d_core::GridError>(())
//! ```
//!
//! # Movement policies
//!
//! | Policy | Diagonal step allowed when |
//! |---|---|
//! | [`Always`](DiagonalMovement::Always) | always |
//! | [`IfAtLeastOneWalkable`](DiagonalMovement::IfAtLeastOneWalkable) | some corner cell is walkable |
//! | [`OnlyWhenNoObstacles`](DiagonalMovement::OnlyWhenNoObstacles) | every corner cell is walkable |
//! | [`Never`](DiagonalMovement::Never) | never |

mod heuristic;
mod jps;
mod jump;
mod node;
mod params;
mod prune;

pub use heuristic::{Heuristic, chebyshev, euclidean, manhattan};
pub use jps::{expand_path, find_path, find_path_cancellable, path_length};
pub use jump::JumpStrategy;
pub use node::{Node, NodeState};
pub use params::{SearchConfig, SearchParameters, SearchStats};

pub use jps3d_core::DiagonalMovement;
