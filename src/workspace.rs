//! Workspace: a bounded planar region with global (static) and local
//! (transient) labeled regions.

use crate::geometry::{expand_region, Point2, Region};
use rand::Rng;
use std::collections::HashSet;

/// A triple `(region, name, priority)` describing a transiently sensed
/// local request; lower `priority` means higher importance.
#[derive(Debug, Clone)]
pub struct Request {
    pub region: Region,
    pub name: String,
    pub priority: i32,
}

impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.priority == other.priority
    }
}

/// A bounded planar workspace with a boundary region and separate global
/// (fixed) and local (sensor-provided) region collections.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub boundary: Region,
    pub global_regions: Vec<Region>,
    pub local_regions: Vec<Region>,
}

impl Workspace {
    pub fn new(boundary: Region) -> Self {
        Workspace {
            boundary,
            global_regions: Vec::new(),
            local_regions: Vec::new(),
        }
    }

    pub fn add_region(&mut self, region: Region, local: bool) {
        if local {
            self.local_regions.push(region);
        } else {
            self.global_regions.push(region);
        }
    }

    /// Returns the union of symbols of all regions (global or local,
    /// per `local`) containing `position`.
    pub fn symbols_at(&self, position: Point2, local: bool) -> HashSet<String> {
        let regions = if local {
            &self.local_regions
        } else {
            &self.global_regions
        };
        let mut out = HashSet::new();
        for r in regions {
            if r.contains(position) {
                out.extend(r.symbols().iter().cloned());
            }
        }
        out
    }

    /// All global symbols known to the workspace, regardless of position.
    pub fn global_alphabet(&self) -> HashSet<String> {
        self.global_regions
            .iter()
            .flat_map(|r| r.symbols().iter().cloned())
            .collect()
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Point2 {
        self.boundary.sample(rng)
    }

    /// The regions (of the selected layer) intersecting the segment
    /// `(src, dest)`, or containing `src` alone when `dest` is `None`.
    pub fn intersecting_regions(
        &self,
        src: Point2,
        dest: Option<Point2>,
        local: bool,
    ) -> Vec<&Region> {
        let regions = if local {
            &self.local_regions
        } else {
            &self.global_regions
        };
        regions
            .iter()
            .filter(|r| r.intersects_segment(src, dest))
            .collect()
    }

    /// Builds the expanded workspace used by the planner: every global
    /// region (and the boundary) inflated by `epsilon` (half the robot
    /// diameter). Local regions are not known in advance so they are not
    /// carried over.
    pub fn expand(&self, epsilon: f64) -> Workspace {
        Workspace {
            boundary: expand_region(&self.boundary, -epsilon),
            global_regions: self
                .global_regions
                .iter()
                .map(|r| expand_region(r, epsilon))
                .collect(),
            local_regions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_at_union_across_overlapping_regions() {
        let mut ws = Workspace::new(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0), vec![]).unwrap(),
        );
        ws.add_region(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0), vec!["a".into()])
                .unwrap(),
            false,
        );
        ws.add_region(
            Region::new_ball(Point2::new(1.0, 1.0), 0.5, vec!["b".into()]).unwrap(),
            false,
        );
        let syms = ws.symbols_at(Point2::new(1.0, 1.0), false);
        assert!(syms.contains("a"));
        assert!(syms.contains("b"));
    }

    #[test]
    fn expand_grows_global_regions_not_local() {
        let mut ws = Workspace::new(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0), vec![]).unwrap(),
        );
        ws.add_region(
            Region::new_ball(Point2::new(5.0, 5.0), 1.0, vec!["r".into()]).unwrap(),
            false,
        );
        ws.add_region(
            Region::new_ball(Point2::new(1.0, 1.0), 0.1, vec!["fire".into()]).unwrap(),
            true,
        );
        let expanded = ws.expand(0.1);
        assert_eq!(expanded.global_regions.len(), 1);
        assert!(expanded.local_regions.is_empty());
    }
}
