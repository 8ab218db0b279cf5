//! Geometry primitives: [`Position`] and [`GridRect`].

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A 3D integer voxel coordinate.
///
/// `x` runs along the grid width, `y` along its length and `z` along its
/// height. The same type doubles as a displacement, so a unit direction of
/// travel is just a `Position` whose components are in `{-1, 0, 1}`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    /// Origin (0, 0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Create a new position.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Return a position shifted by (dx, dy, dz).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Component-wise sign, i.e. the unit direction pointing the same way.
    #[inline]
    pub const fn signum(self) -> Self {
        Self::new(self.x.signum(), self.y.signum(), self.z.signum())
    }

    /// Component-wise absolute value.
    #[inline]
    pub const fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Number of non-zero components (0 to 3).
    ///
    /// For a unit direction this is 1 for a face move, 2 for an edge
    /// diagonal and 3 for a corner diagonal.
    #[inline]
    pub const fn axis_count(self) -> u32 {
        (self.x != 0) as u32 + (self.y != 0) as u32 + (self.z != 0) as u32
    }

    /// Whether every component is in `{-1, 0, 1}` and at least one is not zero.
    #[inline]
    pub const fn is_unit_direction(self) -> bool {
        self.x.abs() <= 1 && self.y.abs() <= 1 && self.z.abs() <= 1 && self.axis_count() > 0
    }

    /// Whether the point is inside the half-open box.
    #[inline]
    pub fn in_rect(self, r: &GridRect) -> bool {
        r.contains(self)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for Position {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for Position {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Position {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Position {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<i32> for Position {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

// ---------------------------------------------------------------------------
// GridRect
// ---------------------------------------------------------------------------

/// A half-open box \[min, max). `min` is inclusive, `max` is exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridRect {
    pub min: Position,
    pub max: Position,
}

impl GridRect {
    /// Create a new box from two corners, canonicalised so that
    /// `min` ≤ `max` on each axis.
    #[inline]
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: Position::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box anchored at the origin with the given extent.
    #[inline]
    pub fn sized(width: i32, length: i32, height: i32) -> Self {
        Self::new(
            Position::ZERO,
            Position::new(width.max(0), length.max(0), height.max(0)),
        )
    }

    /// Extent along each axis.
    #[inline]
    pub fn size(self) -> Position {
        self.max - self.min
    }

    /// Whether the box contains no cells.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    /// Number of cells in the box.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let s = self.size();
        s.x as usize * s.y as usize * s.z as usize
    }

    /// Whether `p` lies inside the box.
    #[inline]
    pub fn contains(self, p: Position) -> bool {
        p.x >= self.min.x
            && p.x < self.max.x
            && p.y >= self.min.y
            && p.y < self.max.y
            && p.z >= self.min.z
            && p.z < self.max.z
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}
