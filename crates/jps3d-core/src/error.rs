use thiserror::Error;

use crate::Position;

/// Convenient result alias for grid and search setup.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised while building a grid or preparing a search on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A walkability matrix or buffer does not match the grid dimensions.
    #[error("walkability matrix has dimensions {found:?}, expected {expected:?}")]
    MatrixSize {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    /// The requested dimensions cannot be addressed: a side exceeds
    /// `i32::MAX` or the cell count overflows `usize`.
    #[error("grid dimensions {0:?} are too large")]
    TooLarge((usize, usize, usize)),

    /// A search endpoint lies outside the grid.
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),
}
