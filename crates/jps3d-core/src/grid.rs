//! Dense voxel walkability grid.
//!
//! [`Grid`] only stores permanent map data: one walkability flag per cell,
//! laid out as a flat `Vec<bool>` with `x` varying fastest. Per-search state
//! (costs, parents, open/closed flags) lives with the search, so a grid can
//! be shared by any number of searches at once.

use crate::error::{GridError, Result};
use crate::movement::{self, DiagonalMovement, Walkable};
use crate::{GridRect, Position};

/// A walkability matrix indexed `[x][y][z]`.
pub type WalkableMatrix = [Vec<Vec<bool>>];

/// A dense 3D grid of walkable / blocked cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    length: usize,
    height: usize,
    walkable: Vec<bool>,
}

impl Grid {
    /// Create a grid of the given size with every cell walkable.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are too large, see [`Grid::try_filled`].
    pub fn new(width: usize, length: usize, height: usize) -> Self {
        Self::filled(width, length, height, true)
    }

    /// Create a grid of the given size with every cell set to `walkable`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are too large, see [`Grid::try_filled`].
    pub fn filled(width: usize, length: usize, height: usize, walkable: bool) -> Self {
        Self::try_filled(width, length, height, walkable).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Fallible version of [`Grid::filled`].
    ///
    /// Fails with [`GridError::TooLarge`] if a side does not fit in a
    /// [`Position`] coordinate or the cell count overflows `usize`.
    pub fn try_filled(width: usize, length: usize, height: usize, walkable: bool) -> Result<Self> {
        let len = cell_count(width, length, height)?;
        Ok(Self {
            width,
            length,
            height,
            walkable: vec![walkable; len],
        })
    }

    /// Create a grid from a walkability matrix indexed `[x][y][z]`.
    ///
    /// Every row must have the same length as the first one; ragged input is
    /// rejected instead of being padded or truncated.
    pub fn from_matrix(matrix: &WalkableMatrix) -> Result<Self> {
        let (width, length, height) = matrix_dims(matrix)?;
        let mut grid = Self::try_filled(width, length, height, false)?;
        grid.apply_matrix(matrix);
        Ok(grid)
    }

    /// Create a grid from a flat buffer in the grid's own layout (`x`
    /// fastest, then `y`, then `z`).
    pub fn from_flat(
        width: usize,
        length: usize,
        height: usize,
        walkable: Vec<bool>,
    ) -> Result<Self> {
        if walkable.len() != cell_count(width, length, height)? {
            return Err(GridError::MatrixSize {
                expected: (width, length, height),
                found: (walkable.len(), 1, 1),
            });
        }
        Ok(Self {
            width,
            length,
            height,
            walkable,
        })
    }

    /// Extent along `x`.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Extent along `y`.
    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Extent along `z`.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The bounding box of the grid, anchored at the origin.
    #[inline]
    pub fn rect(&self) -> GridRect {
        GridRect::sized(self.width as i32, self.length as i32, self.height as i32)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.walkable.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.walkable.is_empty()
    }

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        p.x >= 0
            && p.y >= 0
            && p.z >= 0
            && (p.x as usize) < self.width
            && (p.y as usize) < self.length
            && (p.z as usize) < self.height
    }

    /// Flat index of an in-bounds position.
    ///
    /// Out-of-bounds positions are a caller bug: checked in debug builds
    /// only, since the search calls this in its inner loop after already
    /// establishing walkability.
    #[inline]
    pub fn index(&self, p: Position) -> usize {
        debug_assert!(self.contains(p), "position {p} outside grid");
        (p.z as usize * self.length + p.y as usize) * self.width + p.x as usize
    }

    /// Flat index of `p`, or `None` if it is out of bounds.
    #[inline]
    pub fn try_index(&self, p: Position) -> Option<usize> {
        self.contains(p).then(|| self.index(p))
    }

    /// Position of a flat index.
    #[inline]
    pub fn position(&self, idx: usize) -> Position {
        debug_assert!(idx < self.len());
        let x = idx % self.width;
        let rest = idx / self.width;
        Position::new(x as i32, (rest % self.length) as i32, (rest / self.length) as i32)
    }

    /// Whether `p` is inside the grid and walkable.
    #[inline]
    pub fn is_walkable(&self, p: Position) -> bool {
        self.try_index(p).is_some_and(|i| self.walkable[i])
    }

    /// Set the walkability of `p`. Returns `false`, changing nothing, when
    /// `p` is out of bounds.
    pub fn set_walkable(&mut self, p: Position, walkable: bool) -> bool {
        match self.try_index(p) {
            Some(i) => {
                self.walkable[i] = walkable;
                true
            }
            None => false,
        }
    }

    /// Number of walkable cells.
    pub fn walkable_count(&self) -> usize {
        self.walkable.iter().filter(|&&w| w).count()
    }

    /// Append the cells reachable from `p` in one step under `policy` into
    /// `buf` (up to 26: 6 faces, 12 edges, 8 corners). The caller clears
    /// `buf` before calling.
    pub fn neighbors(&self, p: Position, policy: DiagonalMovement, buf: &mut Vec<Position>) {
        movement::neighbors(self, p, policy, buf);
    }

    /// Reset the grid between map edits.
    ///
    /// With `Some(matrix)` every cell's walkability is reassigned from the
    /// matrix, which must match the grid dimensions exactly; on mismatch the
    /// grid is left untouched. With `None` walkability is kept. The grid
    /// holds no search state, so there is nothing else to clear.
    pub fn reset(&mut self, matrix: Option<&WalkableMatrix>) -> Result<()> {
        let Some(matrix) = matrix else {
            return Ok(());
        };
        let dims = matrix_dims(matrix)?;
        let expected = (self.width, self.length, self.height);
        if dims != expected {
            return Err(GridError::MatrixSize {
                expected,
                found: dims,
            });
        }
        self.apply_matrix(matrix);
        Ok(())
    }

    /// Raw walkability buffer in flat-index order.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.walkable
    }

    fn apply_matrix(&mut self, matrix: &WalkableMatrix) {
        for (x, plane) in matrix.iter().enumerate() {
            for (y, column) in plane.iter().enumerate() {
                for (z, &w) in column.iter().enumerate() {
                    let i = self.index(Position::new(x as i32, y as i32, z as i32));
                    self.walkable[i] = w;
                }
            }
        }
    }
}

impl Walkable for Grid {
    #[inline]
    fn is_walkable(&self, p: Position) -> bool {
        Grid::is_walkable(self, p)
    }
}

/// Dimensions of a rectangular `[x][y][z]` matrix.
/// Number of cells in a grid of the given size, if it is addressable.
fn cell_count(width: usize, length: usize, height: usize) -> Result<usize> {
    let side = i32::MAX as usize;
    let too_large = || GridError::TooLarge((width, length, height));
    if width > side || length > side || height > side {
        return Err(too_large());
    }
    width
        .checked_mul(length)
        .and_then(|n| n.checked_mul(height))
        .ok_or_else(too_large)
}

fn matrix_dims(matrix: &WalkableMatrix) -> Result<(usize, usize, usize)> {
    let width = matrix.len();
    let length = matrix.first().map_or(0, Vec::len);
    let height = matrix
        .first()
        .and_then(|plane| plane.first())
        .map_or(0, Vec::len);
    for plane in matrix {
        if plane.len() != length {
            return Err(GridError::MatrixSize {
                expected: (width, length, height),
                found: (width, plane.len(), height),
            });
        }
        for column in plane {
            if column.len() != height {
                return Err(GridError::MatrixSize {
                    expected: (width, length, height),
                    found: (width, length, column.len()),
                });
            }
        }
    }
    Ok((width, length, height))
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
struct GridReprRef<'a> {
    width: usize,
    length: usize,
    height: usize,
    walkable: &'a [bool],
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct GridRepr {
    width: usize,
    length: usize,
    height: usize,
    walkable: Vec<bool>,
}

#[cfg(feature = "serde")]
impl serde::Serialize for Grid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        GridReprRef {
            width: self.width,
            length: self.length,
            height: self.height,
            walkable: &self.walkable,
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Grid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = GridRepr::deserialize(deserializer)?;
        Grid::from_flat(repr.width, repr.length, repr.height, repr.walkable)
            .map_err(serde::de::Error::custom)
    }
}
