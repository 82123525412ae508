//! Off-line global planner: an incremental RRG co-constructed with the
//! product automaton until a lasso is found.
//!
//! Forward extension samples, steers toward the sample, checks dispersion
//! and the simple-segment constraint, then asks the product automaton
//! whether the new edge has any consistent continuation at all before
//! committing it to the transition system. Backward extension then tries to
//! fold the new vertex back into existing nearby vertices, the same way the
//! teacher's `planner_basic` wires RRT extension and rewiring into one
//! iteration.

use crate::config::Eta;
use crate::buchi::Buchi;
use crate::error::{PlannerError, Result};
use crate::geometry::Point2;
use crate::instrumentation::{Event, EventSink};
use crate::product::IncrementalProduct;
use crate::robot::Robot;
use crate::ts::TransitionSystem;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct RrgPlanner {
    pub robot: Robot,
    pub ts: TransitionSystem,
    pub product: IncrementalProduct,
    eta: Eta,
    rng: ChaCha8Rng,
}

impl RrgPlanner {
    pub fn new(robot: Robot, buchi: Buchi, eta: Eta, seed: u64) -> Self {
        let mut ts = TransitionSystem::new();
        let mut product = IncrementalProduct::new(buchi);
        let sigma0 = robot.get_symbols(robot.init_conf, false);
        ts.add_state(robot.init_conf, sigma0.clone(), true);
        product.add_initial_state(robot.init_conf, &sigma0);
        RrgPlanner {
            robot,
            ts,
            product,
            eta,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn nearest(&self, x: Point2) -> Option<Point2> {
        self.ts
            .nodes()
            .min_by(|a, b| a.dist(&x).total_cmp(&b.dist(&x)))
    }

    /// One forward + backward RRG extension. A rejected sample (dispersion
    /// violation, non-simple segment, or an edge the product cannot accept)
    /// consumes the iteration without growing the graph, mirroring the
    /// teacher's RRT loop where failed extensions are silently retried.
    pub fn iterate(&mut self, sink: &mut dyn EventSink) {
        let x_rand = self.robot.sample(false, &mut self.rng);
        let Some(x_nearest) = self.nearest(x_rand) else {
            return;
        };
        let x_new = self.robot.steer(x_nearest, x_rand);

        let far: Vec<Point2> = self
            .ts
            .nodes()
            .filter(|v| v.dist(&x_new) < self.eta.hi)
            .collect();
        if far.iter().any(|v| v.dist(&x_new) <= self.eta.lo) {
            return;
        }

        let sigma_new = self.robot.get_symbols(x_new, false);
        let mut parents = Vec::new();
        let mut fwd_edges = Vec::new();
        for v in far {
            if !self.robot.is_simple_segment(v, x_new) {
                continue;
            }
            let edges = self.product.check(&self.ts, v, x_new, &sigma_new, true);
            if edges.is_empty() {
                continue;
            }
            parents.push(v);
            fwd_edges.extend(edges);
        }
        if fwd_edges.is_empty() {
            return;
        }

        self.ts.add_state(x_new, sigma_new, false);
        for v in parents {
            self.ts.add_transition(v, x_new);
        }
        self.product.update(fwd_edges);

        self.extend_backward(x_new);
    }

    /// Tries to connect `x_new` back to nearby existing vertices within
    /// `eta.hi`, provided the reverse hop is an exact, single `steer` step.
    fn extend_backward(&mut self, x_new: Point2) {
        let mut near: Vec<Point2> = self
            .ts
            .nodes()
            .filter(|&n| n != x_new && n.dist(&x_new) <= self.eta.hi)
            .collect();
        near.sort_by(|a, b| a.dist(&x_new).total_cmp(&b.dist(&x_new)));

        for x_near in near {
            if x_near.dist(&x_new) > self.robot.step_size {
                continue;
            }
            if !self.robot.is_simple_segment(x_new, x_near) {
                continue;
            }
            let Some(sigma_near) = self.ts.propositions_of(&x_near).cloned() else {
                continue;
            };
            let back_edges = self
                .product
                .check(&self.ts, x_new, x_near, &sigma_near, false);
            if back_edges.is_empty() {
                continue;
            }
            self.ts.add_transition(x_new, x_near);
            self.product.update(back_edges);
        }
    }

    /// Runs up to `max_iterations` RRG iterations, returning the first
    /// lasso found, or [`PlannerError::NoSolution`] once the budget is
    /// exhausted.
    pub fn solve(
        &mut self,
        max_iterations: u32,
        sink: &mut dyn EventSink,
    ) -> Result<(Vec<Point2>, Vec<Point2>)> {
        for i in 0..max_iterations {
            self.iterate(sink);
            let (ts_size, _) = self.ts.size();
            let (product_size, _) = self.product.size();
            sink.on_event(Event::RrgIteration {
                iteration: i,
                ts_size,
                product_size,
            });
            if self.product.found_policy() {
                sink.on_event(Event::PolicyFound { iteration: i });
                if !self.product.compute_potentials() {
                    return Err(PlannerError::NoPotential);
                }
                return self.product.global_policy().ok_or(PlannerError::NoPotential);
            }
        }
        sink.on_event(Event::NoSolution {
            iterations: max_iterations,
        });
        if let Some(props) = self.product.find_spec_mismatch(&self.ts) {
            return Err(PlannerError::SpecMismatch(props));
        }
        Err(PlannerError::NoSolution {
            iterations: max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buchi::{BuchiBuilder, Guard};
    use crate::geometry::Region;
    use crate::instrumentation::NoopSink;
    use crate::workspace::Workspace;

    fn single_region_buchi() -> Buchi {
        BuchiBuilder::new()
            .state(0, true, false)
            .state(1, false, true)
            .transition(0, Guard::new(["goal"], []), 1)
            .transition(1, Guard::any(), 1)
            .build()
    }

    #[test]
    fn solve_finds_lasso_when_goal_reachable() {
        let mut ws = Workspace::new(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(5.0, 5.0), vec![]).unwrap(),
        );
        ws.add_region(
            Region::new_ball(Point2::new(4.5, 4.5), 0.6, vec!["goal".into()]).unwrap(),
            false,
        );
        let robot = Robot::new("r", ws, Point2::new(0.1, 0.1), 0.3, 0.05, 1.0);
        let mut planner = RrgPlanner::new(robot, single_region_buchi(), Eta { lo: 0.01, hi: 0.5 }, 7);
        let mut sink = NoopSink;
        let result = planner.solve(4000, &mut sink);
        assert!(result.is_ok(), "expected a lasso to be found: {result:?}");
    }

    #[test]
    fn solve_reports_no_solution_when_goal_unreachable() {
        let ws = Workspace::new(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(5.0, 5.0), vec![]).unwrap(),
        );
        let robot = Robot::new("r", ws, Point2::new(0.1, 0.1), 0.3, 0.05, 1.0);
        let mut planner = RrgPlanner::new(robot, single_region_buchi(), Eta { lo: 0.01, hi: 0.5 }, 7);
        let mut sink = NoopSink;
        let result = planner.solve(200, &mut sink);
        assert!(matches!(result, Err(PlannerError::NoSolution { .. })));
    }
}
