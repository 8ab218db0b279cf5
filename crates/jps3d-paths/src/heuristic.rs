use jps3d_core::Position;

/// Manhattan (L1) length of an absolute displacement.
#[inline]
pub fn manhattan(dx: i32, dy: i32, dz: i32) -> f64 {
    f64::from(dx) + f64::from(dy) + f64::from(dz)
}

/// Euclidean (L2) length of an absolute displacement.
#[inline]
pub fn euclidean(dx: i32, dy: i32, dz: i32) -> f64 {
    let (x, y, z) = (f64::from(dx), f64::from(dy), f64::from(dz));
    (x * x + y * y + z * z).sqrt()
}

/// Chebyshev (L∞) length of an absolute displacement.
#[inline]
pub fn chebyshev(dx: i32, dy: i32, dz: i32) -> f64 {
    f64::from(dx.max(dy).max(dz))
}

/// Distance metric used by a search, both as the goal estimate and as the
/// cost of a straight jump between two jump points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    Manhattan,
    #[default]
    Euclidean,
    Chebyshev,
}

impl Heuristic {
    /// Evaluate the metric on absolute per-axis displacements.
    #[inline]
    pub fn eval(self, dx: i32, dy: i32, dz: i32) -> f64 {
        match self {
            Heuristic::Manhattan => manhattan(dx, dy, dz),
            Heuristic::Euclidean => euclidean(dx, dy, dz),
            Heuristic::Chebyshev => chebyshev(dx, dy, dz),
        }
    }

    /// Distance between two positions.
    #[inline]
    pub fn between(self, a: Position, b: Position) -> f64 {
        let d = (b - a).abs();
        self.eval(d.x, d.y, d.z)
    }
}
