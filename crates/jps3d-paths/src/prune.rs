//! Neighbour pruning and forced-neighbour detection.
//!
//! Both questions are answered by one local oracle. For a node `n` reached
//! along `d` from `p = n - d`, a neighbour `m = n + e` is *pruned* when some
//! path from `p` to `m` that avoids `n`, using only cells of the 3×3×3 cube
//! around `n`, either
//!
//! - is strictly shorter than `p → n → m`, or
//! - is equally long and starts with a move that ranks above `d`.
//!
//! Moves rank by the number of axes they change, then by which axes (`x`
//! over `y` over `z`). The ranking breaks ties between equally short paths
//! so that exactly one of them survives.
//!
//! The *natural* neighbours of `d` are the unpruned ones in an open
//! neighbourhood: the move itself plus each of its lower-axis components,
//! or under face-only movement `x → {x, ±y, ±z}`, `y → {y, ±z}`, `z → {z}`.
//! Any other unpruned neighbour is *forced*.
//!
//! Step lengths are always Euclidean here, whatever metric scores the
//! search, so the natural sets keep strictly descending ranks and sub-jumps
//! cannot cycle.

use std::collections::HashMap;
use std::f64::consts::SQRT_2;

use jps3d_core::movement::{CENTER_SLOT, from_slot, slot};
use jps3d_core::{DIRECTIONS, DiagonalMovement, Position, Walkable, can_step};

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const EPS: f64 = 1e-9;

/// Every slot of the neighbourhood walkable.
const OPEN: u32 = (1 << 27) - 1;

/// Cached neighbourhoods before the table is flushed.
const CACHE_LIMIT: usize = 1 << 20;

/// Walkability of a 3×3×3 neighbourhood, one bit per slot.
struct Local(u32);

impl Local {
    #[inline]
    fn in_cube(p: Position) -> bool {
        p.x.abs() <= 1 && p.y.abs() <= 1 && p.z.abs() <= 1
    }
}

impl Walkable for Local {
    #[inline]
    fn is_walkable(&self, p: Position) -> bool {
        Self::in_cube(p) && self.0 & (1 << slot(p)) != 0
    }
}

#[inline]
fn step_length(d: Position) -> f64 {
    match d.axis_count() {
        1 => 1.0,
        2 => SQRT_2,
        _ => SQRT_3,
    }
}

/// Tie-break order of moves; higher is preferred.
#[inline]
fn rank(d: Position) -> u8 {
    (d.axis_count() as u8) << 3
        | u8::from(d.x != 0) << 2
        | u8::from(d.y != 0) << 1
        | u8::from(d.z != 0)
}

/// Whether path label `a` beats `b`: shorter, or as short with a better
/// first move.
#[inline]
fn precedes(a: (f64, u8), b: (f64, u8)) -> bool {
    a.0 < b.0 - EPS || (a.0 <= b.0 + EPS && a.1 > b.1)
}

/// Walkability mask of the neighbourhood of `at`. The centre is always set.
pub(crate) fn neighbourhood<W: Walkable + ?Sized>(map: &W, at: Position) -> u32 {
    let mut mask = 1 << CENTER_SLOT;
    for d in DIRECTIONS {
        if map.is_walkable(at + d) {
            mask |= 1 << slot(d);
        }
    }
    mask
}

/// Unpruned successor slots of the centre, reached along `dir`, within the
/// neighbourhood `mask`.
fn canonical_successors(mask: u32, dir: Position, policy: DiagonalMovement) -> u32 {
    let local = Local(mask | 1 << CENTER_SLOT);
    let origin = slot(-dir);

    // Dijkstra from the predecessor over the cube minus the centre.
    let mut cost = [f64::INFINITY; 27];
    let mut first = [0u8; 27];
    let mut done = [false; 27];
    done[CENTER_SLOT] = true;
    cost[origin] = 0.0;

    loop {
        let mut best: Option<usize> = None;
        for s in 0..27 {
            if done[s] || cost[s].is_infinite() {
                continue;
            }
            if best.is_none_or(|b| precedes((cost[s], first[s]), (cost[b], first[b]))) {
                best = Some(s);
            }
        }
        let Some(u) = best else {
            break;
        };
        done[u] = true;

        let at = from_slot(u);
        for e in DIRECTIONS {
            let v = at + e;
            if !Local::in_cube(v) || v == Position::ZERO || !can_step(&local, at, e, policy) {
                continue;
            }
            let vs = slot(v);
            if done[vs] {
                continue;
            }
            let label = (
                cost[u] + step_length(e),
                if u == origin { rank(e) } else { first[u] },
            );
            if precedes(label, (cost[vs], first[vs])) {
                cost[vs] = label.0;
                first[vs] = label.1;
            }
        }
    }

    let through = step_length(dir);
    let own = rank(dir);
    let mut out = 0;
    for e in DIRECTIONS {
        if !can_step(&local, Position::ZERO, e, policy) {
            continue;
        }
        let s = slot(e);
        if !precedes((cost[s], first[s]), (through + step_length(e), own)) {
            out |= 1 << s;
        }
    }
    out
}

/// Pruning rules for one movement policy, with a cache of evaluated
/// neighbourhoods.
#[derive(Debug, Clone)]
pub(crate) struct PruneTable {
    policy: DiagonalMovement,
    natural: [u32; 27],
    // natural directions minus the arrival direction, in DIRECTIONS order
    sub_dirs: Vec<Vec<Position>>,
    cache: HashMap<u32, u32>,
}

impl PruneTable {
    pub(crate) fn new(policy: DiagonalMovement) -> Self {
        let mut natural = [0; 27];
        let mut sub_dirs = vec![Vec::new(); 27];
        for d in DIRECTIONS {
            let s = slot(d);
            natural[s] = canonical_successors(OPEN, d, policy);
            sub_dirs[s] = DIRECTIONS
                .iter()
                .copied()
                .filter(|&e| e != d && natural[s] & (1 << slot(e)) != 0)
                .collect();
            debug_assert!(sub_dirs[s].iter().all(|&e| rank(e) < rank(d)));
        }
        Self {
            policy,
            natural,
            sub_dirs,
            cache: HashMap::new(),
        }
    }

    #[cfg(test)]
    fn policy(&self) -> DiagonalMovement {
        self.policy
    }

    /// Switch to another policy, rebuilding the tables if it changed.
    pub(crate) fn configure(&mut self, policy: DiagonalMovement) {
        if policy != self.policy {
            *self = Self::new(policy);
        }
    }

    /// Unpruned successor slots of `at`, reached along `dir`.
    pub(crate) fn successors<W: Walkable + ?Sized>(
        &mut self,
        map: &W,
        at: Position,
        dir: Position,
    ) -> u32 {
        let mask = neighbourhood(map, at);
        let key = mask << 5 | slot(dir) as u32;
        if let Some(&s) = self.cache.get(&key) {
            return s;
        }
        if self.cache.len() >= CACHE_LIMIT {
            self.cache.clear();
        }
        let s = canonical_successors(mask, dir, self.policy);
        self.cache.insert(key, s);
        s
    }

    /// Append the unpruned successor directions of `at`, reached along
    /// `dir`, to `out` in [`DIRECTIONS`] order.
    pub(crate) fn successor_dirs<W: Walkable + ?Sized>(
        &mut self,
        map: &W,
        at: Position,
        dir: Position,
        out: &mut Vec<Position>,
    ) {
        let s = self.successors(map, at, dir);
        out.extend(DIRECTIONS.iter().copied().filter(|&e| s & (1 << slot(e)) != 0));
    }

    /// Whether `at`, reached along `dir`, has a forced neighbour.
    #[inline]
    pub(crate) fn has_forced<W: Walkable + ?Sized>(
        &mut self,
        map: &W,
        at: Position,
        dir: Position,
    ) -> bool {
        self.successors(map, at, dir) & !self.natural[slot(dir)] != 0
    }

    /// The `k`-th direction a jump along `dir` branches into at every cell.
    #[inline]
    pub(crate) fn sub_direction(&self, dir: Position, k: usize) -> Option<Position> {
        self.sub_dirs[slot(dir)].get(k).copied()
    }

    #[cfg(test)]
    fn natural_dirs(&self, dir: Position) -> Vec<Position> {
        let n = self.natural[slot(dir)];
        DIRECTIONS
            .iter()
            .copied()
            .filter(|&e| n & (1 << slot(e)) != 0)
            .collect()
    }
}
