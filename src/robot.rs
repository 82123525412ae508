//! Robot model: pure functions of the robot's configuration space and
//! workspace. The planners call only through this surface;
//! neither planner knows how samples are drawn or how symbols are derived.

use crate::geometry::Point2;
use crate::workspace::Workspace;
use rand::Rng;
use std::collections::HashSet;

pub struct Robot {
    pub name: String,
    /// The expanded workspace (obstacles inflated by robot radius); all
    /// global sampling/labeling/collision checks are against this one.
    pub workspace: Workspace,
    pub step_size: f64,
    pub diameter: f64,
    pub sensing_radius: f64,
    pub init_conf: Point2,
    pub current_conf: Point2,
}

impl Robot {
    /// `workspace` is the nominal (un-inflated) workspace; it is expanded by
    /// `diameter / 2` here so every later sampling/labeling/collision check
    /// runs against the inflated one.
    pub fn new(
        name: impl Into<String>,
        workspace: Workspace,
        init_conf: Point2,
        step_size: f64,
        diameter: f64,
        sensing_radius: f64,
    ) -> Self {
        Robot {
            name: name.into(),
            workspace: workspace.expand(diameter / 2.0),
            step_size,
            diameter,
            sensing_radius,
            init_conf,
            current_conf: init_conf,
        }
    }

    /// `local = false`: uniform sample over the expanded workspace
    /// boundary. `local = true`: uniform sample over the sensing disc
    /// centered at the current configuration.
    pub fn sample(&self, local: bool, rng: &mut impl Rng) -> Point2 {
        if local {
            crate::geometry::sample_ball(rng, self.current_conf, self.sensing_radius)
        } else {
            self.workspace.sample(rng)
        }
    }

    /// Point on `[source, target]` at distance `min(step_size, |target -
    /// source|)` from `source`.
    pub fn steer(&self, source: Point2, target: Point2) -> Point2 {
        let dist = source.dist(&target);
        if dist <= self.step_size || dist == 0.0 {
            return target;
        }
        let t = self.step_size / dist;
        Point2::new(
            source.x + t * (target.x - source.x),
            source.y + t * (target.y - source.y),
        )
    }

    /// True iff the open segment `(a, b)` crosses the boundary of at most
    /// one global labeled region, i.e. a region it does not fully contain
    /// at both endpoints. This is what lets a product edge be labeled by
    /// `sigma(b)` alone.
    pub fn is_simple_segment(&self, a: Point2, b: Point2) -> bool {
        let crossed = self
            .workspace
            .global_regions
            .iter()
            .filter(|r| r.intersects_segment(a, Some(b)) && !(r.contains(a) && r.contains(b)))
            .count();
        crossed <= 1
    }

    pub fn collision_free_segment(&self, a: Point2, b: Point2, obstacles: &[crate::Region]) -> bool {
        !obstacles.iter().any(|o| o.intersects_segment(a, Some(b)))
    }

    pub fn collision_free(&self, path: &[Point2], obstacles: &[crate::Region]) -> bool {
        path.windows(2)
            .all(|w| self.collision_free_segment(w[0], w[1], obstacles))
    }

    /// Union of symbols of regions (global unless `local`) containing
    /// `conf`.
    pub fn get_symbols(&self, conf: Point2, local: bool) -> HashSet<String> {
        self.workspace.symbols_at(conf, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Region;

    fn robot() -> Robot {
        let ws = Workspace::new(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0), vec![]).unwrap(),
        );
        Robot::new("r", ws, Point2::new(0.0, 0.0), 1.0, 0.1, 0.5)
    }

    #[test]
    fn steer_clamps_to_step_size() {
        let r = robot();
        let p = r.steer(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn steer_reaches_target_when_closer_than_step() {
        let r = robot();
        let p = r.steer(Point2::new(0.0, 0.0), Point2::new(0.5, 0.0));
        assert!((p.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn simple_segment_false_across_two_regions() {
        let mut ws = Workspace::new(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0), vec![]).unwrap(),
        );
        ws.add_region(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), vec!["a".into()])
                .unwrap(),
            false,
        );
        ws.add_region(
            Region::new_box(Point2::new(4.0, 0.0), Point2::new(5.0, 1.0), vec!["b".into()])
                .unwrap(),
            false,
        );
        let robot = Robot::new("r", ws, Point2::new(0.0, 0.0), 1.0, 0.1, 0.5);
        assert!(!robot.is_simple_segment(Point2::new(0.5, 0.5), Point2::new(4.5, 0.5)));
    }

    #[test]
    fn collision_free_detects_obstacle_on_path() {
        let r = robot();
        let obstacle =
            Region::new_box(Point2::new(0.4, -1.0), Point2::new(0.6, 1.0), vec!["o".into()])
                .unwrap();
        assert!(!r.collision_free_segment(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            &[obstacle]
        ));
    }
}
