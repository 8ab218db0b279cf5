//! Jump Point Search over 3D voxel grids.
//!
//! An A* search whose successors are *jump points*: instead of opening every
//! neighbour, each expansion scans along the unpruned directions and only
//! opens the cells where a scan had to stop. The resulting path lists those
//! jump points; [`expand_path`] fills in the cells between them.

use jps3d_core::{DIRECTIONS, Grid, Position, Walkable, can_step};

use crate::SearchParameters;
use crate::heuristic::Heuristic;
use crate::jump::Jumper;
use crate::node::{NO_PARENT, Node, NodeState};

/// The grid as a search sees it: the end cell may be opened without
/// touching the grid itself.
struct SearchView<'a> {
    grid: &'a Grid,
    end: Position,
    end_override: bool,
}

impl Walkable for SearchView<'_> {
    #[inline]
    fn is_walkable(&self, p: Position) -> bool {
        (self.end_override && p == self.end) || self.grid.is_walkable(p)
    }
}

impl SearchParameters<'_> {
    /// Find a path from the start to the end node.
    ///
    /// Returns the jump points of an optimal path, start and end included,
    /// or an empty vector when the end cannot be reached. When start and end
    /// coincide the path is that single cell.
    pub fn find_path(&mut self) -> Vec<Position> {
        self.search(&mut || false).unwrap_or_default()
    }

    /// Like [`find_path`](Self::find_path), but polls `is_cancelled` before
    /// each expansion and gives up with `None` once it returns `true`.
    pub fn find_path_cancellable(
        &mut self,
        mut is_cancelled: impl FnMut() -> bool,
    ) -> Option<Vec<Position>> {
        self.search(&mut is_cancelled)
    }

    fn search(&mut self, is_cancelled: &mut dyn FnMut() -> bool) -> Option<Vec<Position>> {
        self.invalidate();
        let cur_gen = self.generation;
        let grid = self.grid;
        let (start, end) = (self.start, self.end);
        let config = self.config;
        let view = SearchView {
            grid,
            end,
            end_override: config.allow_end_unwalkable,
        };
        if config.allow_end_unwalkable && !grid.is_walkable(end) {
            log::debug!("jps: treating blocked end {end} as walkable");
        }
        self.prune.configure(config.movement);

        let start_idx = grid.index(start);
        let end_idx = grid.index(end);
        self.nodes[start_idx] = Node {
            state: NodeState::Open,
            ..Node::fresh(cur_gen)
        };
        self.push_open(start_idx, 0.0);

        let mut dirs = std::mem::take(&mut self.dirs);
        let mut frames = std::mem::take(&mut self.frames);

        let outcome = 'search: loop {
            if is_cancelled() {
                break 'search None;
            }
            let Some(cur) = self.open.pop() else {
                break 'search Some(false);
            };
            let ci = cur.idx;
            let node = &mut self.nodes[ci];
            if node.generation != cur_gen || node.state != NodeState::Open {
                continue;
            }
            node.state = NodeState::Closed;
            let (cur_g, parent) = (node.g, node.parent);
            self.stats.expanded += 1;
            if ci == end_idx {
                break 'search Some(true);
            }

            let cp = grid.position(ci);
            log::trace!("jps: expanding {cp} (g = {cur_g:.3})");

            dirs.clear();
            if parent == NO_PARENT {
                dirs.extend(
                    DIRECTIONS
                        .iter()
                        .copied()
                        .filter(|&d| can_step(&view, cp, d, config.movement)),
                );
            } else {
                let d = (cp - grid.position(parent)).signum();
                self.prune.successor_dirs(&view, cp, d, &mut dirs);
            }

            for &dir in &dirs {
                let mut jumper = Jumper {
                    map: &view,
                    end,
                    policy: config.movement,
                    prune: &mut self.prune,
                    frames: &mut frames,
                };
                let Some(jp) = jumper.jump(cp, dir, config.strategy) else {
                    continue;
                };
                let ji = grid.index(jp);
                let jn = &mut self.nodes[ji];
                if jn.generation != cur_gen {
                    *jn = Node::fresh(cur_gen);
                }
                if jn.state == NodeState::Closed {
                    continue;
                }
                let ng = cur_g + config.heuristic.between(cp, jp);
                if jn.state == NodeState::Unvisited || ng < jn.g {
                    let h = *jn
                        .h
                        .get_or_insert_with(|| config.heuristic.between(jp, end));
                    jn.g = ng;
                    jn.f = ng + h;
                    jn.parent = ci;
                    jn.state = NodeState::Open;
                    let f = jn.f;
                    self.push_open(ji, f);
                }
            }
        };

        self.dirs = dirs;
        self.frames = frames;

        match outcome {
            None => {
                log::debug!("jps: search {start} -> {end} cancelled");
                None
            }
            Some(false) => {
                log::debug!(
                    "jps: no path {start} -> {end} ({} nodes expanded)",
                    self.stats.expanded
                );
                Some(Vec::new())
            }
            Some(true) => {
                let path = self.backtrace(end_idx);
                log::debug!(
                    "jps: path {start} -> {end}: {} jump points, {} nodes expanded",
                    path.len(),
                    self.stats.expanded
                );
                Some(path)
            }
        }
    }

    /// Follow parent links from `idx` back to the start.
    fn backtrace(&self, idx: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut ci = idx;
        while ci != NO_PARENT {
            debug_assert!(path.len() < self.nodes.len(), "parent links form a cycle");
            path.push(self.grid.position(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        path
    }
}

/// Find a path with `params`, as [`SearchParameters::find_path`].
pub fn find_path(params: &mut SearchParameters<'_>) -> Vec<Position> {
    params.find_path()
}

/// Find a path with `params`, as [`SearchParameters::find_path_cancellable`].
pub fn find_path_cancellable(
    params: &mut SearchParameters<'_>,
    is_cancelled: impl FnMut() -> bool,
) -> Option<Vec<Position>> {
    params.find_path_cancellable(is_cancelled)
}

/// Expand a jump point path into a cell-by-cell path.
///
/// Between consecutive waypoints each step moves every coordinate that still
/// differs by one towards the target, so a segment that is not a straight
/// line is walked diagonally first. Paths of fewer than two waypoints are
/// returned unchanged.
pub fn expand_path(path: &[Position]) -> Vec<Position> {
    if path.len() <= 1 {
        return path.to_vec();
    }
    let mut out = vec![path[0]];
    for w in path.windows(2) {
        let (mut c, b) = (w[0], w[1]);
        while c != b {
            c = c + (b - c).signum();
            out.push(c);
        }
    }
    out
}

/// Length of a path under `heuristic`: the sum of the distances between
/// consecutive waypoints.
pub fn path_length(path: &[Position], heuristic: Heuristic) -> f64 {
    path.windows(2).map(|w| heuristic.between(w[0], w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jps3d_core::DiagonalMovement;

    fn p(x: i32, y: i32, z: i32) -> Position {
        Position::new(x, y, z)
    }

    #[test]
    fn expand_straight_and_diagonal() {
        let path = [p(0, 0, 0), p(3, 0, 0), p(5, 2, 2)];
        assert_eq!(
            expand_path(&path),
            vec![
                p(0, 0, 0),
                p(1, 0, 0),
                p(2, 0, 0),
                p(3, 0, 0),
                p(4, 1, 1),
                p(5, 2, 2),
            ]
        );
    }

    #[test]
    fn expand_uneven_segment_goes_diagonal_first() {
        let path = [p(0, 0, 0), p(3, 1, 2)];
        assert_eq!(
            expand_path(&path),
            vec![p(0, 0, 0), p(1, 1, 1), p(2, 1, 2), p(3, 1, 2)]
        );
    }

    #[test]
    fn expand_degenerate() {
        assert!(expand_path(&[]).is_empty());
        assert_eq!(expand_path(&[p(1, 2, 3)]), vec![p(1, 2, 3)]);
        assert_eq!(expand_path(&[p(1, 2, 3), p(1, 2, 3)]), vec![p(1, 2, 3)]);
    }

    #[test]
    fn length_sums_segments() {
        let path = [p(0, 0, 0), p(3, 0, 0), p(3, 4, 0)];
        assert_eq!(path_length(&path, Heuristic::Euclidean), 7.0);
        assert_eq!(path_length(&path[..1], Heuristic::Euclidean), 0.0);
        let diag = [p(0, 0, 0), p(2, 2, 2)];
        assert_eq!(path_length(&diag, Heuristic::Chebyshev), 2.0);
        assert_eq!(path_length(&diag, Heuristic::Manhattan), 6.0);
    }

    #[test]
    fn start_equals_end() {
        let g = Grid::new(4, 4, 4);
        let mut params = SearchParameters::new(&g, p(1, 2, 3), p(1, 2, 3)).unwrap();
        assert_eq!(params.find_path(), vec![p(1, 2, 3)]);
        assert_eq!(params.stats().expanded, 1);
    }

    #[test]
    fn straight_corridor() {
        let g = Grid::new(6, 1, 1);
        let mut params = SearchParameters::new(&g, p(0, 0, 0), p(5, 0, 0)).unwrap();
        assert_eq!(params.find_path(), vec![p(0, 0, 0), p(5, 0, 0)]);
    }

    #[test]
    fn blocked_end_respects_option() {
        let mut g = Grid::new(5, 5, 5);
        g.set_walkable(p(4, 4, 4), false);
        let mut params = SearchParameters::new(&g, p(0, 0, 0), p(4, 4, 4)).unwrap();
        assert_eq!(params.find_path(), vec![p(0, 0, 0), p(4, 4, 4)]);
        assert!(!g.is_walkable(p(4, 4, 4)));

        let mut params = params.with_allow_end_unwalkable(false);
        assert!(params.find_path().is_empty());
    }

    #[test]
    fn parents_chain_back_to_start() {
        let mut g = Grid::new(6, 6, 1);
        for y in 0..5 {
            g.set_walkable(p(3, y, 0), false);
        }
        let mut params = SearchParameters::new(&g, p(0, 0, 0), p(5, 0, 0))
            .unwrap()
            .with_movement(DiagonalMovement::Never);
        let path = params.find_path();
        assert_eq!(path.first(), Some(&p(0, 0, 0)));
        assert_eq!(path.last(), Some(&p(5, 0, 0)));
        let end = params.node(p(5, 0, 0)).unwrap();
        assert!(end.is_closed());
        assert_eq!(end.cost(), 5.0 + 2.0 * 5.0);
        let start = params.node(p(0, 0, 0)).unwrap();
        assert_eq!(start.parent(), None);
        assert_eq!(start.cost(), 0.0);
    }

    #[test]
    fn cancellation_stops_search() {
        let g = Grid::new(8, 8, 8);
        let mut params = SearchParameters::new(&g, p(0, 0, 0), p(7, 7, 7)).unwrap();
        assert_eq!(params.find_path_cancellable(|| true), None);
        assert_eq!(params.stats().expanded, 0);

        let mut polls = 0;
        let found = find_path_cancellable(&mut params, || {
            polls += 1;
            false
        });
        assert_eq!(found, Some(vec![p(0, 0, 0), p(7, 7, 7)]));
        assert!(polls >= 2);
    }
}
