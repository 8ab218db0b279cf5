#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use jps3d_core::{DiagonalMovement, Grid, Position, can_step};
use jps3d_paths::Heuristic;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const EPS: f64 = 1e-6;

/// A grid with each cell blocked with probability `density`.
pub fn random_grid(seed: u64, size: (usize, usize, usize), density: f64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    let (w, l, h) = size;
    let cells = (0..w * l * h).map(|_| !rng.random_bool(density)).collect();
    Grid::from_flat(w, l, h, cells).unwrap()
}

/// A random walkable cell.
pub fn random_walkable(rng: &mut StdRng, grid: &Grid) -> Position {
    loop {
        let p = Position::new(
            rng.random_range(0..grid.width() as i32),
            rng.random_range(0..grid.length() as i32),
            rng.random_range(0..grid.height() as i32),
        );
        if grid.is_walkable(p) {
            return p;
        }
    }
}

#[derive(PartialEq)]
struct Entry(f64, usize);

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.total_cmp(&self.0).then_with(|| other.1.cmp(&self.1))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plain Dijkstra over every legal single step, for cross-checking.
pub fn reference_cost(
    grid: &Grid,
    start: Position,
    end: Position,
    policy: DiagonalMovement,
    heuristic: Heuristic,
) -> Option<f64> {
    let mut dist = vec![f64::INFINITY; grid.len()];
    let mut heap = BinaryHeap::new();
    let s = grid.index(start);
    dist[s] = 0.0;
    heap.push(Entry(0.0, s));
    let mut buf = Vec::new();
    while let Some(Entry(c, i)) = heap.pop() {
        if c > dist[i] {
            continue;
        }
        let p = grid.position(i);
        if p == end {
            return Some(c);
        }
        buf.clear();
        grid.neighbors(p, policy, &mut buf);
        for &q in &buf {
            let nc = c + heuristic.between(p, q);
            let qi = grid.index(q);
            if nc < dist[qi] {
                dist[qi] = nc;
                heap.push(Entry(nc, qi));
            }
        }
    }
    None
}

/// Assert that an expanded path only takes legal single steps.
pub fn assert_walkable_steps(grid: &Grid, cells: &[Position], policy: DiagonalMovement) {
    for w in cells.windows(2) {
        let d = w[1] - w[0];
        assert!(d.is_unit_direction(), "{} -> {} is not a single step", w[0], w[1]);
        assert!(
            can_step(grid, w[0], d, policy),
            "{} -> {} is illegal under {policy:?}",
            w[0],
            w[1]
        );
    }
}
