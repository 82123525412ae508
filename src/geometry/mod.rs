//! Geometric primitives: labeled regions, boundaries, point/segment
//! intersection, and uniform interior sampling.
//!
//! Box and ball predicates are hand-derived from the slab-clipping and
//! projected-scalar formulas used by the original `reactive-ltl` Python
//! implementation (`spaces/maps2d.py`); polygon predicates (ray-casting
//! containment, orientation-based segment intersection) are hand-rolled
//! the same way, under the simplifying assumption that labeled polygon
//! regions are convex — true of every region in the IJRR case study this
//! crate ports.

mod boundary;
mod region;

pub use boundary::{sample_ball, sample_box, Aabb};
pub use region::{expand_region, Region};

use nalgebra::Point2 as NaPoint2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A point in the planar configuration/workspace. Immutable once
/// constructed; equality and hashing are coordinate-wise so configurations
/// may key graph vertices by content rather than identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Point2 { x, y }
    }

    pub fn coords(&self) -> NaPoint2<f64> {
        NaPoint2::new(self.x, self.y)
    }

    pub fn dist(&self, other: &Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// A bit pattern suitable for exact hashing of planar coordinates.
    fn key(v: f64) -> u64 {
        // Canonicalize -0.0 to 0.0 so hash/eq agree with floating equality.
        (if v == 0.0 { 0.0 } else { v }).to_bits()
    }
}

impl PartialEq for Point2 {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}
impl Eq for Point2 {}

/// Total order over coordinates (NaN-free in practice), used only to break
/// ties deterministically when selecting among equally-good lassos.
impl PartialOrd for Point2 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Point2 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl std::hash::Hash for Point2 {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Point2::key(self.x).hash(state);
        Point2::key(self.y).hash(state);
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// Samples a point uniformly in `[lo, hi]` per axis.
pub(crate) fn sample_uniform_box<R: Rng + ?Sized>(rng: &mut R, lo: Point2, hi: Point2) -> Point2 {
    Point2::new(
        rng.gen_range(lo.x..=hi.x),
        rng.gen_range(lo.y..=hi.y),
    )
}
