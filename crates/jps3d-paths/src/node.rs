// ---------------------------------------------------------------------------
// Per-search node records
// ---------------------------------------------------------------------------

/// Parent sentinel for nodes with no predecessor (the start node).
pub(crate) const NO_PARENT: usize = usize::MAX;

/// Search state of a node. Transitions are monotonic:
/// `Unvisited → Open → Closed`, and a closed node is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

/// Search record for one grid cell.
///
/// Records live in an arena owned by
/// [`SearchParameters`](crate::SearchParameters), one per cell, and are
/// invalidated wholesale by bumping a generation counter.
#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub(crate) g: f64,
    pub(crate) f: f64,
    // Cached once per search; `None` rather than 0.0 since 0 is a real estimate.
    pub(crate) h: Option<f64>,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) state: NodeState,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0.0,
            f: 0.0,
            h: None,
            parent: NO_PARENT,
            generation: 0,
            state: NodeState::Unvisited,
        }
    }
}

impl Node {
    pub(crate) fn fresh(generation: u32) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Cost from the start node (`g`).
    #[inline]
    pub fn cost(&self) -> f64 {
        self.g
    }

    /// Priority in the open set (`f = g + h`).
    #[inline]
    pub fn priority(&self) -> f64 {
        self.f
    }

    /// Cached heuristic estimate to the end node, if computed this search.
    #[inline]
    pub fn heuristic(&self) -> Option<f64> {
        self.h
    }

    /// Flat grid index of the parent node; [`Grid::position`] maps it back
    /// to a cell.
    ///
    /// [`Grid::position`]: jps3d_core::Grid::position
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        (self.parent != NO_PARENT).then_some(self.parent)
    }

    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == NodeState::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state == NodeState::Closed
    }
}

/// Open-set entry, ordered by `f` for use in `BinaryHeap`.
///
/// Entries are never updated in place: lowering a node's priority pushes a
/// new entry and the stale one is skipped when popped.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: f64,
    pub(crate) seq: u64,
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for NodeRef {}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first, and the
        // earliest insertion among equal f.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn heap_pops_lowest_priority_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(NodeRef { idx: 0, f: 3.0, seq: 0 });
        heap.push(NodeRef { idx: 1, f: 1.0, seq: 1 });
        heap.push(NodeRef { idx: 2, f: 1.0, seq: 2 });
        heap.push(NodeRef { idx: 3, f: 2.0, seq: 3 });
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|r| r.idx)).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn fresh_node_is_unvisited() {
        let n = Node::fresh(7);
        assert_eq!(n.generation, 7);
        assert_eq!(n.state(), NodeState::Unvisited);
        assert_eq!(n.parent(), None);
        assert_eq!(n.heuristic(), None);
        assert!(!n.is_open() && !n.is_closed());
    }
}
