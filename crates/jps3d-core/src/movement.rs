//! Diagonal movement rules shared by neighbour enumeration and the search.
//!
//! A move from a cell along a unit direction `d` is legal when the target is
//! walkable and, for diagonal moves, when the [`DiagonalMovement`] policy
//! accepts the walkability of the *corner cells* the move sweeps past. The
//! corner cells of `d` are the cells reached by every proper, non-empty
//! subset of its non-zero axes:
//!
//! | move | axes | corner cells |
//! |---|---|---|
//! | face | 1 | none |
//! | edge diagonal | 2 | 2 face neighbours |
//! | corner diagonal | 3 | 3 face + 3 edge neighbours |
//!
//! Everything that needs to know whether a step is possible goes through
//! [`can_step`], so grid neighbour queries and jump point pruning can never
//! disagree about the movement graph.

use crate::Position;

/// Policy governing when a move that changes more than one coordinate is
/// permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagonalMovement {
    /// Diagonal moves are always allowed, even when every corner cell is
    /// blocked.
    #[default]
    Always,
    /// Only face moves (6-connectivity).
    Never,
    /// A diagonal move needs at least one walkable corner cell.
    IfAtLeastOneWalkable,
    /// A diagonal move needs every corner cell to be walkable.
    OnlyWhenNoObstacles,
}

impl DiagonalMovement {
    /// All policies, from most to least permissive.
    pub const ALL: [DiagonalMovement; 4] = [
        DiagonalMovement::Always,
        DiagonalMovement::IfAtLeastOneWalkable,
        DiagonalMovement::OnlyWhenNoObstacles,
        DiagonalMovement::Never,
    ];

    /// Translate the legacy pair of corner-crossing switches into a policy.
    ///
    /// `cross_corner` allows cutting past blocked corner cells at all;
    /// `cross_adjacent_point` additionally allows it when every corner cell
    /// is blocked. `cross_adjacent_point` only counts when `cross_corner` is
    /// set. Diagonal moves stay available for every pair, so no pair maps to
    /// [`DiagonalMovement::Never`].
    pub fn from_flags(cross_corner: bool, cross_adjacent_point: bool) -> Self {
        match (cross_corner, cross_adjacent_point) {
            (true, true) => Self::Always,
            (true, false) => Self::IfAtLeastOneWalkable,
            (false, _) => Self::OnlyWhenNoObstacles,
        }
    }
}

/// Read access to cell walkability.
///
/// Implementations must return `false` for positions outside their bounds.
pub trait Walkable {
    /// Whether `p` may be entered.
    fn is_walkable(&self, p: Position) -> bool;
}

impl<W: Walkable + ?Sized> Walkable for &W {
    #[inline]
    fn is_walkable(&self, p: Position) -> bool {
        (**self).is_walkable(p)
    }
}

/// The 26 unit directions: 6 faces, then 12 edge diagonals, then 8 corner
/// diagonals.
pub const DIRECTIONS: [Position; 26] = [
    Position::new(1, 0, 0),
    Position::new(-1, 0, 0),
    Position::new(0, 1, 0),
    Position::new(0, -1, 0),
    Position::new(0, 0, 1),
    Position::new(0, 0, -1),
    Position::new(1, 1, 0),
    Position::new(1, -1, 0),
    Position::new(-1, 1, 0),
    Position::new(-1, -1, 0),
    Position::new(1, 0, 1),
    Position::new(1, 0, -1),
    Position::new(-1, 0, 1),
    Position::new(-1, 0, -1),
    Position::new(0, 1, 1),
    Position::new(0, 1, -1),
    Position::new(0, -1, 1),
    Position::new(0, -1, -1),
    Position::new(1, 1, 1),
    Position::new(1, 1, -1),
    Position::new(1, -1, 1),
    Position::new(1, -1, -1),
    Position::new(-1, 1, 1),
    Position::new(-1, 1, -1),
    Position::new(-1, -1, 1),
    Position::new(-1, -1, -1),
];

/// Slot of the zero offset in the 3×3×3 neighbourhood numbering.
pub const CENTER_SLOT: usize = 13;

/// Number a neighbourhood offset (each component in `{-1, 0, 1}`) as
/// `0..27`, with the centre at [`CENTER_SLOT`].
#[inline]
pub const fn slot(offset: Position) -> usize {
    debug_assert!(offset.x.abs() <= 1 && offset.y.abs() <= 1 && offset.z.abs() <= 1);
    ((offset.x + 1) * 9 + (offset.y + 1) * 3 + (offset.z + 1)) as usize
}

/// Inverse of [`slot`].
#[inline]
pub const fn from_slot(slot: usize) -> Position {
    let s = slot as i32;
    Position::new(s / 9 - 1, (s / 3) % 3 - 1, s % 3 - 1)
}

/// Offsets of the corner cells swept by a move along `dir`: `dir` restricted
/// to each proper, non-empty subset of its non-zero axes.
#[inline]
fn corner_cells(dir: Position) -> impl Iterator<Item = Position> {
    let n = dir.axis_count();
    (1u8..7).filter_map(move |mask| {
        let c = Position::new(
            if mask & 4 != 0 { dir.x } else { 0 },
            if mask & 2 != 0 { dir.y } else { 0 },
            if mask & 1 != 0 { dir.z } else { 0 },
        );
        let k = c.axis_count();
        // skip masks selecting an axis `dir` does not move along
        let selected = (mask & 4 != 0) as u32 + (mask & 2 != 0) as u32 + (mask & 1 != 0) as u32;
        (k == selected && k > 0 && k < n).then_some(c)
    })
}

/// Two-axis (edge) diagonal test: the two face cells beside the move.
#[inline]
pub fn edge_diagonal_allowed<W: Walkable + ?Sized>(
    map: &W,
    from: Position,
    dir: Position,
    policy: DiagonalMovement,
) -> bool {
    debug_assert_eq!(dir.axis_count(), 2);
    corner_rule(map, from, dir, policy)
}

/// Three-axis (corner) diagonal test: the three face and three edge cells
/// around the move.
#[inline]
pub fn corner_diagonal_allowed<W: Walkable + ?Sized>(
    map: &W,
    from: Position,
    dir: Position,
    policy: DiagonalMovement,
) -> bool {
    debug_assert_eq!(dir.axis_count(), 3);
    corner_rule(map, from, dir, policy)
}

fn corner_rule<W: Walkable + ?Sized>(
    map: &W,
    from: Position,
    dir: Position,
    policy: DiagonalMovement,
) -> bool {
    match policy {
        DiagonalMovement::Always => true,
        DiagonalMovement::Never => false,
        DiagonalMovement::IfAtLeastOneWalkable => {
            corner_cells(dir).any(|c| map.is_walkable(from + c))
        }
        DiagonalMovement::OnlyWhenNoObstacles => {
            corner_cells(dir).all(|c| map.is_walkable(from + c))
        }
    }
}

/// Whether the policy lets a move along `dir` from `from` sweep past its
/// corner cells. Face moves are always allowed; the target cell itself is
/// not examined.
#[inline]
pub fn diagonal_allowed<W: Walkable + ?Sized>(
    map: &W,
    from: Position,
    dir: Position,
    policy: DiagonalMovement,
) -> bool {
    match dir.axis_count() {
        1 => true,
        2 => edge_diagonal_allowed(map, from, dir, policy),
        3 => corner_diagonal_allowed(map, from, dir, policy),
        _ => false,
    }
}

/// Whether a single step from `from` along the unit direction `dir` is legal.
#[inline]
pub fn can_step<W: Walkable + ?Sized>(
    map: &W,
    from: Position,
    dir: Position,
    policy: DiagonalMovement,
) -> bool {
    debug_assert!(dir.is_unit_direction());
    map.is_walkable(from + dir) && diagonal_allowed(map, from, dir, policy)
}

/// Append every cell reachable from `p` in one legal step into `buf`, in
/// [`DIRECTIONS`] order. The caller clears `buf` before calling.
pub fn neighbors<W: Walkable + ?Sized>(
    map: &W,
    p: Position,
    policy: DiagonalMovement,
    buf: &mut Vec<Position>,
) {
    for d in DIRECTIONS {
        if can_step(map, p, d, policy) {
            buf.push(p + d);
        }
    }
}
