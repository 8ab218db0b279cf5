use std::collections::BinaryHeap;

use jps3d_core::{DiagonalMovement, Grid, GridError, Position, Result};

use crate::heuristic::Heuristic;
use crate::jump::{JumpFrame, JumpStrategy};
use crate::node::{Node, NodeRef};
use crate::prune::PruneTable;

/// Options of a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Which diagonal moves are legal.
    pub movement: DiagonalMovement,
    /// Goal estimate and jump cost metric.
    pub heuristic: Heuristic,
    /// Treat the end cell as walkable even when the grid blocks it.
    pub allow_end_unwalkable: bool,
    /// How jumps walk their sub-jumps.
    pub strategy: JumpStrategy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            movement: DiagonalMovement::Always,
            heuristic: Heuristic::Euclidean,
            allow_end_unwalkable: true,
            strategy: JumpStrategy::Recursive,
        }
    }
}

impl SearchConfig {
    pub fn with_movement(mut self, movement: DiagonalMovement) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_allow_end_unwalkable(mut self, allow: bool) -> Self {
        self.allow_end_unwalkable = allow;
        self
    }

    pub fn with_strategy(mut self, strategy: JumpStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Counters of the last search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped from the open set and closed.
    pub expanded: usize,
    /// Open-set insertions, including priority updates.
    pub opened: usize,
}

// ---------------------------------------------------------------------------
// SearchParameters
// ---------------------------------------------------------------------------

/// A search query on a borrowed grid: endpoints, options, and every piece of
/// per-search state.
///
/// The grid is only read. Node records, the open set and scratch buffers
/// are owned here and reused, so repeated searches allocate nothing once
/// warmed up, and several searches can share one grid.
pub struct SearchParameters<'g> {
    pub(crate) grid: &'g Grid,
    pub(crate) start: Position,
    pub(crate) end: Position,
    pub(crate) config: SearchConfig,
    pub(crate) nodes: Vec<Node>,
    pub(crate) generation: u32,
    pub(crate) open: BinaryHeap<NodeRef>,
    pub(crate) seq: u64,
    pub(crate) stats: SearchStats,
    pub(crate) prune: PruneTable,
    // scratch buffers
    pub(crate) dirs: Vec<Position>,
    pub(crate) frames: Vec<JumpFrame>,
}

impl<'g> SearchParameters<'g> {
    /// Prepare a search from `start` to `end` with default options.
    ///
    /// Fails with [`GridError::OutOfBounds`] if either endpoint lies outside
    /// the grid.
    pub fn new(grid: &'g Grid, start: Position, end: Position) -> Result<Self> {
        Self::with_config(grid, start, end, SearchConfig::default())
    }

    /// Prepare a search with explicit options.
    pub fn with_config(
        grid: &'g Grid,
        start: Position,
        end: Position,
        config: SearchConfig,
    ) -> Result<Self> {
        check_bounds(grid, start, end)?;
        Ok(Self {
            grid,
            start,
            end,
            config,
            nodes: vec![Node::default(); grid.len()],
            generation: 0,
            open: BinaryHeap::new(),
            seq: 0,
            stats: SearchStats::default(),
            prune: PruneTable::new(config.movement),
            dirs: Vec::with_capacity(26),
            frames: Vec::new(),
        })
    }

    pub fn with_movement(mut self, movement: DiagonalMovement) -> Self {
        self.config.movement = movement;
        self
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.config.heuristic = heuristic;
        self
    }

    pub fn with_allow_end_unwalkable(mut self, allow: bool) -> Self {
        self.config.allow_end_unwalkable = allow;
        self
    }

    pub fn with_strategy(mut self, strategy: JumpStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Point the search at new endpoints, discarding all search state.
    ///
    /// On error the parameters keep their previous endpoints.
    pub fn reset(&mut self, start: Position, end: Position) -> Result<()> {
        check_bounds(self.grid, start, end)?;
        self.start = start;
        self.end = end;
        self.invalidate();
        Ok(())
    }

    /// Search another grid with the same endpoints and options.
    ///
    /// If the new grid fits within the existing node capacity, the arena is
    /// kept and only invalidated. Otherwise it is reallocated. On error
    /// nothing changes.
    pub fn set_grid(&mut self, grid: &'g Grid) -> Result<()> {
        check_bounds(grid, self.start, self.end)?;
        self.grid = grid;
        if grid.len() <= self.nodes.len() {
            self.invalidate();
            return Ok(());
        }
        log::debug!(
            "jps: growing node arena from {} to {} cells",
            self.nodes.len(),
            grid.len()
        );
        self.nodes.clear();
        self.nodes.resize(grid.len(), Node::default());
        self.generation = 0;
        self.open.clear();
        self.stats = SearchStats::default();
        Ok(())
    }

    #[inline]
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Position {
        self.end
    }

    #[inline]
    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Mutable access to the options; changes apply from the next search.
    #[inline]
    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    #[inline]
    pub fn movement(&self) -> DiagonalMovement {
        self.config.movement
    }

    #[inline]
    pub fn heuristic(&self) -> Heuristic {
        self.config.heuristic
    }

    #[inline]
    pub fn allow_end_unwalkable(&self) -> bool {
        self.config.allow_end_unwalkable
    }

    #[inline]
    pub fn strategy(&self) -> JumpStrategy {
        self.config.strategy
    }

    /// Counters of the most recent search.
    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Search record of `p` from the most recent search. Cells the search
    /// never reached report as unvisited; positions outside the grid give
    /// `None`.
    pub fn node(&self, p: Position) -> Option<Node> {
        let i = self.grid.try_index(p)?;
        let n = self.nodes[i];
        Some(if n.generation == self.generation {
            n
        } else {
            Node::fresh(self.generation)
        })
    }

    /// Drop all search state. Node records go stale in O(1) by bumping the
    /// generation; on wrap-around the arena is wiped so no record from an
    /// old search can pass for current.
    pub(crate) fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.nodes.fill(Node::default());
            self.generation = 1;
        }
        self.open.clear();
        self.seq = 0;
        self.stats = SearchStats::default();
    }

    /// Insert or re-prioritise `idx` in the open set.
    #[inline]
    pub(crate) fn push_open(&mut self, idx: usize, f: f64) {
        self.open.push(NodeRef { idx, f, seq: self.seq });
        self.seq += 1;
        self.stats.opened += 1;
    }
}

fn check_bounds(grid: &Grid, start: Position, end: Position) -> Result<()> {
    for p in [start, end] {
        if !grid.contains(p) {
            return Err(GridError::OutOfBounds(p));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeState;

    #[test]
    fn default_config() {
        let c = SearchConfig::default();
        assert_eq!(c.movement, DiagonalMovement::Always);
        assert_eq!(c.heuristic, Heuristic::Euclidean);
        assert!(c.allow_end_unwalkable);
        assert_eq!(c.strategy, JumpStrategy::Recursive);
    }

    #[test]
    fn builders_set_options() {
        let g = Grid::new(3, 3, 3);
        let p = SearchParameters::new(&g, Position::ZERO, Position::new(2, 2, 2))
            .unwrap()
            .with_movement(DiagonalMovement::Never)
            .with_heuristic(Heuristic::Manhattan)
            .with_allow_end_unwalkable(false)
            .with_strategy(JumpStrategy::Iterative);
        assert_eq!(
            p.config(),
            SearchConfig::default()
                .with_movement(DiagonalMovement::Never)
                .with_heuristic(Heuristic::Manhattan)
                .with_allow_end_unwalkable(false)
                .with_strategy(JumpStrategy::Iterative)
        );
    }

    #[test]
    fn endpoints_must_be_in_bounds() {
        let g = Grid::new(3, 3, 3);
        let bad = Position::new(3, 0, 0);
        assert_eq!(
            SearchParameters::new(&g, Position::ZERO, bad).err(),
            Some(GridError::OutOfBounds(bad))
        );
        assert_eq!(
            SearchParameters::new(&g, Position::new(0, -1, 0), Position::ZERO).err(),
            Some(GridError::OutOfBounds(Position::new(0, -1, 0)))
        );
    }

    #[test]
    fn failed_reset_keeps_endpoints() {
        let g = Grid::new(3, 3, 3);
        let end = Position::new(2, 2, 2);
        let mut p = SearchParameters::new(&g, Position::ZERO, end).unwrap();
        assert!(p.reset(Position::ZERO, Position::new(0, 0, 9)).is_err());
        assert_eq!((p.start(), p.end()), (Position::ZERO, end));
        p.reset(end, Position::ZERO).unwrap();
        assert_eq!((p.start(), p.end()), (end, Position::ZERO));
    }

    #[test]
    fn reset_invalidates_nodes() {
        let g = Grid::new(3, 3, 3);
        let mut p = SearchParameters::new(&g, Position::ZERO, Position::new(2, 2, 2)).unwrap();
        p.invalidate();
        let gen_before = p.generation;
        p.nodes[0].generation = gen_before;
        p.nodes[0].state = NodeState::Closed;
        assert!(p.node(Position::ZERO).unwrap().is_closed());
        p.reset(Position::ZERO, Position::new(1, 1, 1)).unwrap();
        assert_eq!(p.node(Position::ZERO).unwrap().state(), NodeState::Unvisited);
        assert!(p.node(Position::new(5, 0, 0)).is_none());
    }

    #[test]
    fn generation_wrap_wipes_arena() {
        let g = Grid::new(2, 2, 2);
        let mut p = SearchParameters::new(&g, Position::ZERO, Position::new(1, 1, 1)).unwrap();
        p.generation = u32::MAX;
        p.nodes[3].generation = 1;
        p.nodes[3].state = NodeState::Closed;
        p.invalidate();
        assert_eq!(p.generation, 1);
        assert_eq!(p.nodes[3].state, NodeState::Unvisited);
    }

    #[test]
    fn set_grid_smaller_preserves_capacity() {
        let big = Grid::new(10, 10, 10);
        let small = Grid::new(3, 3, 3);
        let mut p = SearchParameters::new(&big, Position::ZERO, Position::new(2, 2, 2)).unwrap();
        let cap = p.nodes.len();
        p.set_grid(&small).unwrap();
        assert_eq!(p.nodes.len(), cap);
        assert_eq!(p.grid().len(), 27);
    }

    #[test]
    fn set_grid_larger_reallocates() {
        let big = Grid::new(10, 10, 10);
        let small = Grid::new(3, 3, 3);
        let mut p = SearchParameters::new(&small, Position::ZERO, Position::new(2, 2, 2)).unwrap();
        p.set_grid(&big).unwrap();
        assert_eq!(p.nodes.len(), 1000);
        assert_eq!(p.generation, 0);
    }

    #[test]
    fn set_grid_rejects_grid_without_endpoints() {
        let big = Grid::new(10, 10, 10);
        let small = Grid::new(3, 3, 3);
        let mut p = SearchParameters::new(&big, Position::ZERO, Position::new(9, 9, 9)).unwrap();
        assert_eq!(
            p.set_grid(&small),
            Err(GridError::OutOfBounds(Position::new(9, 9, 9)))
        );
        assert_eq!(p.grid().len(), 1000);
    }
}
