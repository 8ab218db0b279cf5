//! The jump operation: scan along a direction for the next jump point.
//!
//! From a cell, a jump steps along `dir` and stops at the first cell that
//! is the end node, has a forced neighbour, or from which a jump along one
//! of `dir`'s natural sub-directions finds a jump point. Both strategies
//! evaluate these tests in the same order and return the same cell.

use jps3d_core::{DiagonalMovement, Position, Walkable, can_step};

use crate::prune::PruneTable;

/// How the jump operation walks nested sub-jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JumpStrategy {
    /// Native recursion for sub-jumps. Depth never exceeds the number of
    /// axes, since each sub-direction moves along fewer of them.
    #[default]
    Recursive,
    /// An explicit frame stack, with no recursion at all.
    Iterative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Step one cell and run the stop tests.
    Advance,
    /// Start the `k`-th sub-jump.
    Branch(usize),
    /// Wait for the `k`-th sub-jump to report back.
    Await(usize),
}

/// One pending jump in the iterative strategy.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JumpFrame {
    cur: Position,
    dir: Position,
    stage: Stage,
}

/// Everything a jump needs besides its origin and direction.
pub(crate) struct Jumper<'a, W: ?Sized> {
    pub(crate) map: &'a W,
    pub(crate) end: Position,
    pub(crate) policy: DiagonalMovement,
    pub(crate) prune: &'a mut PruneTable,
    pub(crate) frames: &'a mut Vec<JumpFrame>,
}

impl<W: Walkable + ?Sized> Jumper<'_, W> {
    /// Find the jump point reached from `from` along `dir`, if any.
    pub(crate) fn jump(
        &mut self,
        from: Position,
        dir: Position,
        strategy: JumpStrategy,
    ) -> Option<Position> {
        match strategy {
            JumpStrategy::Recursive => self.jump_recursive(from, dir),
            JumpStrategy::Iterative => self.jump_iterative(from, dir),
        }
    }

    /// Whether the search should stop at `cur`, reached along `dir`, before
    /// trying any sub-jump.
    #[inline]
    fn stops_at(&mut self, cur: Position, dir: Position) -> bool {
        cur == self.end || self.prune.has_forced(self.map, cur, dir)
    }

    fn jump_recursive(&mut self, from: Position, dir: Position) -> Option<Position> {
        let mut cur = from;
        loop {
            if !can_step(self.map, cur, dir, self.policy) {
                return None;
            }
            cur = cur + dir;
            if self.stops_at(cur, dir) {
                return Some(cur);
            }
            let mut k = 0;
            while let Some(sub) = self.prune.sub_direction(dir, k) {
                if self.jump_recursive(cur, sub).is_some() {
                    return Some(cur);
                }
                k += 1;
            }
        }
    }

    fn jump_iterative(&mut self, from: Position, dir: Position) -> Option<Position> {
        let mut frames = std::mem::take(&mut *self.frames);
        frames.clear();
        frames.push(JumpFrame {
            cur: from,
            dir,
            stage: Stage::Advance,
        });
        // result of the most recently finished frame
        let mut found = None;

        while let Some(top) = frames.last_mut() {
            match top.stage {
                Stage::Advance => {
                    if !can_step(self.map, top.cur, top.dir, self.policy) {
                        found = None;
                        frames.pop();
                        continue;
                    }
                    top.cur = top.cur + top.dir;
                    let (cur, dir) = (top.cur, top.dir);
                    if self.stops_at(cur, dir) {
                        found = Some(cur);
                        frames.pop();
                    } else {
                        top.stage = Stage::Branch(0);
                    }
                }
                Stage::Branch(k) => match self.prune.sub_direction(top.dir, k) {
                    Some(sub) => {
                        top.stage = Stage::Await(k);
                        let child = JumpFrame {
                            cur: top.cur,
                            dir: sub,
                            stage: Stage::Advance,
                        };
                        frames.push(child);
                    }
                    None => top.stage = Stage::Advance,
                },
                Stage::Await(k) => {
                    if found.is_some() {
                        found = Some(top.cur);
                        frames.pop();
                    } else {
                        top.stage = Stage::Branch(k + 1);
                    }
                }
            }
        }

        *self.frames = frames;
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jps3d_core::{DIRECTIONS, Grid};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn jump(
        grid: &Grid,
        from: Position,
        dir: Position,
        end: Position,
        s: JumpStrategy,
    ) -> Option<Position> {
        let policy = DiagonalMovement::Always;
        let mut prune = PruneTable::new(policy);
        let mut frames = Vec::new();
        let mut j = Jumper {
            map: grid,
            end,
            policy,
            prune: &mut prune,
            frames: &mut frames,
        };
        j.jump(from, dir, s)
    }

    const BOTH: [JumpStrategy; 2] = [JumpStrategy::Recursive, JumpStrategy::Iterative];

    #[test]
    fn blocked_first_step_finds_nothing() {
        let mut g = Grid::new(4, 4, 4);
        g.set_walkable(Position::new(1, 0, 0), false);
        for s in BOTH {
            let r = jump(&g, Position::ZERO, Position::new(1, 0, 0), Position::new(3, 3, 3), s);
            assert_eq!(r, None);
        }
    }

    #[test]
    fn stops_on_end() {
        let g = Grid::new(8, 1, 1);
        for s in BOTH {
            let r = jump(&g, Position::ZERO, Position::new(1, 0, 0), Position::new(5, 0, 0), s);
            assert_eq!(r, Some(Position::new(5, 0, 0)));
        }
    }

    #[test]
    fn straight_jump_runs_off_open_grid() {
        let g = Grid::new(8, 8, 8);
        for s in BOTH {
            let r = jump(&g, Position::ZERO, Position::new(1, 0, 0), Position::new(7, 7, 7), s);
            assert_eq!(r, None);
        }
    }

    #[test]
    fn diagonal_jump_stops_where_sub_jump_sees_end() {
        let g = Grid::new(8, 8, 8);
        let end = Position::new(6, 2, 0);
        for s in BOTH {
            let r = jump(&g, Position::ZERO, Position::new(1, 1, 0), end, s);
            assert_eq!(r, Some(Position::new(2, 2, 0)));
        }
    }

    #[test]
    fn corner_jump_nests_two_levels() {
        let g = Grid::new(8, 8, 8);
        // reached by (1,1,1) to (1,1,1), then (1,1,0) to (3,3,1), then +x
        let end = Position::new(5, 3, 1);
        for s in BOTH {
            let r = jump(&g, Position::ZERO, Position::new(1, 1, 1), end, s);
            assert_eq!(r, Some(Position::new(1, 1, 1)));
        }
    }

    #[test]
    fn wall_edge_makes_jump_point() {
        // A wall plane at y = 1 for x < 4 leaves a forced neighbour at x = 4.
        let mut g = Grid::new(8, 3, 1);
        for x in 0..4 {
            g.set_walkable(Position::new(x, 1, 0), false);
        }
        for s in BOTH {
            let r = jump(&g, Position::ZERO, Position::new(1, 0, 0), Position::new(7, 2, 0), s);
            assert_eq!(r, Some(Position::new(3, 0, 0)));
        }
    }

    #[test]
    fn strategies_agree_on_cluttered_grid() {
        let mut rng = StdRng::seed_from_u64(0x2545_f491);
        let cells = (0..125).map(|_| !rng.random_bool(0.25)).collect();
        let g = Grid::from_flat(5, 5, 5, cells).unwrap();
        let end = Position::new(4, 4, 4);
        for policy in DiagonalMovement::ALL {
            let mut prune = PruneTable::new(policy);
            let mut frames = Vec::new();
            let mut j = Jumper {
                map: &g,
                end,
                policy,
                prune: &mut prune,
                frames: &mut frames,
            };
            for i in 0..g.len() {
                let from = g.position(i);
                for d in DIRECTIONS {
                    let a = j.jump(from, d, JumpStrategy::Recursive);
                    let b = j.jump(from, d, JumpStrategy::Iterative);
                    assert_eq!(a, b, "{policy:?} from {from} along {d}");
                }
            }
        }
    }
}
