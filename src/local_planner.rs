//! On-line local planner: short-horizon RRT inside the sensing disc, guarded
//! by a Büchi half-monitor so no detour can step outside the global mission.
//!
//! Holds read-only borrows of the frozen transition system, product
//! automaton and robot model — during on-line execution only the local
//! request/obstacle snapshot and the ephemeral local tree change.

use crate::buchi::BuchiState;
use crate::config::Eta;
use crate::error::{PlannerError, Result};
use crate::geometry::Point2;
use crate::instrumentation::{Event, EventSink, Timer};
use crate::product::IncrementalProduct;
use crate::robot::Robot;
use crate::ts::TransitionSystem;
use crate::workspace::Request;
use crate::Region;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet, VecDeque};

fn half_monitor(
    buchi: &crate::buchi::Buchi,
    b_prev: &HashSet<BuchiState>,
    sigma_prev: &HashSet<String>,
    sigma_next: &HashSet<String>,
) -> HashSet<BuchiState> {
    if sigma_prev == sigma_next {
        return b_prev.clone();
    }
    let mut out = HashSet::new();
    for &q in b_prev {
        out.extend(buchi.next_states(q, sigma_next));
    }
    out
}

struct LocalNode {
    conf: Point2,
    global_prop: HashSet<String>,
    buchi_states: HashSet<BuchiState>,
    hit: bool,
    parent: Option<usize>,
}

pub struct LocalPlanner<'a> {
    robot: &'a Robot,
    ts: &'a TransitionSystem,
    product: &'a IncrementalProduct,
    eta: Eta,
    local_spec: HashMap<String, i32>,
    local_plan_budget: usize,

    current: Point2,
    traj: Vec<Point2>,
    buchi_states: Vec<HashSet<BuchiState>>,
    global_target: Point2,
    tracking_req: Option<Request>,
    local_plan: VecDeque<Point2>,
    requests: Vec<Request>,
    obstacles: Vec<Region>,
    rng: ChaCha8Rng,
}

impl<'a> LocalPlanner<'a> {
    pub fn new(
        robot: &'a Robot,
        ts: &'a TransitionSystem,
        product: &'a IncrementalProduct,
        eta: Eta,
        local_spec: HashMap<String, i32>,
        seed: u64,
    ) -> Self {
        let init = robot.init_conf;
        let b0: HashSet<BuchiState> = product.buchi().initial_states().iter().copied().collect();
        LocalPlanner {
            robot,
            ts,
            product,
            eta,
            local_spec,
            local_plan_budget: 2000,
            current: init,
            traj: vec![init],
            buchi_states: vec![b0],
            global_target: init,
            tracking_req: None,
            local_plan: VecDeque::new(),
            requests: Vec::new(),
            obstacles: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn current(&self) -> Point2 {
        self.current
    }

    pub fn traj(&self) -> &[Point2] {
        &self.traj
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.local_plan_budget = budget;
        self
    }

    fn last_buchi_states(&self) -> HashSet<BuchiState> {
        self.buchi_states.last().cloned().unwrap_or_default()
    }

    /// `argmin_{x'} P.potential[(x', q')]` over product out-edges from any
    /// `(current, q)` with `q` in the current Büchi-state set, with a
    /// zero-potential livelock exclusion: among several equally-good
    /// zero-potential successors, prefer one other than the current vertex.
    fn min_potential_global_state(&self) -> Option<Point2> {
        let b_last = self.last_buchi_states();
        let current_potential = b_last
            .iter()
            .filter_map(|&q| self.product.potential((self.current, q)))
            .min();

        let mut candidates: Vec<(Point2, u32)> = Vec::new();
        for &q in &b_last {
            for (vertex, potential) in self.product.out_edges((self.current, q)) {
                if let Some(p) = potential {
                    candidates.push((vertex.0, p));
                }
            }
        }
        if candidates.is_empty() {
            return None;
        }
        let min_p = candidates.iter().map(|&(_, p)| p).min().unwrap();
        let mut at_min: Vec<Point2> = candidates
            .iter()
            .filter(|&&(_, p)| p == min_p)
            .map(|&(v, _)| v)
            .collect();

        if min_p == 0 && current_potential == Some(0) && at_min.len() > 1 {
            at_min.retain(|&v| v != self.current);
            if at_min.is_empty() {
                return candidates.into_iter().map(|(v, _)| v).next();
            }
        }
        at_min.sort();
        at_min.into_iter().next()
    }

    fn update_global_target(&mut self) {
        if let Some(v) = self.min_potential_global_state() {
            self.global_target = v;
        }
    }

    fn highest_priority_request(&self) -> Option<Request> {
        self.requests
            .iter()
            .min_by_key(|r| r.priority)
            .cloned()
    }

    /// Evaluates whether the queued `local_plan` is still valid given the
    /// current request/obstacle snapshot.
    fn check_local_plan(&mut self) -> bool {
        if !self.requests.is_empty() {
            let req = self.highest_priority_request();
            self.tracking_req = req;
            match &self.tracking_req {
                Some(req) => self
                    .local_plan
                    .iter()
                    .any(|&c| req.region.contains(c)),
                None => false,
            }
        } else {
            self.tracking_req = None;
            !self.local_plan.is_empty()
                && self.robot.collision_free(
                    &self.local_plan.iter().copied().collect::<Vec<_>>(),
                    &self.obstacles,
                )
        }
    }

    /// Straight chain from `from` to `to` at `eta.hi` spacing, used by both
    /// the fast path and the tail segment after a local detour.
    fn chain(&self, from: Point2, to: Point2) -> VecDeque<Point2> {
        let dist = from.dist(&to);
        if dist == 0.0 {
            return VecDeque::new();
        }
        let spacing = self.eta.hi.max(1e-6);
        let steps = (dist / spacing).ceil().max(1.0) as usize;
        let mut out = VecDeque::with_capacity(steps);
        for i in 1..=steps {
            let t = (i as f64 / steps as f64).min(1.0);
            out.push_back(Point2::new(
                from.x + t * (to.x - from.x),
                from.y + t * (to.y - from.y),
            ));
        }
        out
    }

    /// No requests and a direct, collision-free, simple segment to
    /// `global_target`: synthesize the straight chain and skip tree growth.
    fn free_movement(&self) -> Option<VecDeque<Point2>> {
        if !self.requests.is_empty() {
            return None;
        }
        if !self.robot.is_simple_segment(self.current, self.global_target) {
            return None;
        }
        if !self
            .robot
            .collision_free_segment(self.current, self.global_target, &self.obstacles)
        {
            return None;
        }
        Some(self.chain(self.current, self.global_target))
    }

    /// Builds an ephemeral local tree rooted at the current configuration
    /// and returns the plan to the first accepted detour vertex, spliced
    /// with the straight tail to `global_target`.
    fn generate_local_plan(&mut self) -> Result<()> {
        if let Some(plan) = self.free_movement() {
            self.local_plan = plan;
            return Ok(());
        }

        let sigma_root = self.robot.get_symbols(self.current, false);
        let mut arena = vec![LocalNode {
            conf: self.current,
            global_prop: sigma_root,
            buchi_states: self.last_buchi_states(),
            hit: false,
            parent: None,
        }];

        let mut budget = 0usize;
        loop {
            if budget >= self.local_plan_budget {
                let name = self
                    .tracking_req
                    .as_ref()
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| "<fast-path>".to_string());
                return Err(PlannerError::LocalUnreachable {
                    budget: self.local_plan_budget,
                    request: name,
                });
            }
            budget += 1;

            let rand = self.robot.sample(true, &mut self.rng);
            let src_idx = arena
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.conf.dist(&rand).total_cmp(&b.conf.dist(&rand)))
                .map(|(i, _)| i)
                .unwrap();
            let dst = self.robot.steer(arena[src_idx].conf, rand);

            if !self.robot.is_simple_segment(arena[src_idx].conf, dst) {
                continue;
            }
            let sigma_dst = self.robot.get_symbols(dst, false);
            let b_dst = half_monitor(
                self.product.buchi(),
                &arena[src_idx].buchi_states,
                &arena[src_idx].global_prop,
                &sigma_dst,
            );
            if b_dst.is_empty() {
                continue;
            }
            if !self
                .robot
                .collision_free_segment(arena[src_idx].conf, dst, &self.obstacles)
            {
                continue;
            }

            let hit = arena[src_idx].hit
                || self
                    .tracking_req
                    .as_ref()
                    .map_or(false, |r| r.region.contains(dst));
            arena.push(LocalNode {
                conf: dst,
                global_prop: sigma_dst,
                buchi_states: b_dst,
                hit,
                parent: Some(src_idx),
            });
            let dst_idx = arena.len() - 1;

            if self.ts.contains(&dst) {
                continue;
            }
            if self.tracking_req.is_some() && !arena[dst_idx].hit {
                continue;
            }
            if !self.robot.is_simple_segment(dst, self.global_target)
                || !self
                    .robot
                    .collision_free_segment(dst, self.global_target, &self.obstacles)
            {
                continue;
            }

            let mut path = Vec::new();
            let mut cur = Some(dst_idx);
            while let Some(i) = cur {
                path.push(arena[i].conf);
                cur = arena[i].parent;
            }
            path.reverse();

            let mut plan: VecDeque<Point2> = path.into_iter().skip(1).collect();
            plan.extend(self.chain(dst, self.global_target));
            self.local_plan = plan;
            return Ok(());
        }
    }

    /// One on-line planning tick: updates state from the new request/
    /// obstacle snapshot, (re)plans if needed, and returns the next
    /// configuration to move to.
    pub fn execute(
        &mut self,
        requests: Vec<Request>,
        obstacles: Vec<Region>,
        sink: &mut dyn EventSink,
    ) -> Result<Point2> {
        let timer = Timer::default();
        self.requests = requests;
        self.obstacles = obstacles;

        if self.ts.contains(&self.current) {
            self.update_global_target();
        }

        if !self.check_local_plan() {
            self.generate_local_plan()?;
        }

        // `generate_local_plan` can legitimately leave an empty plan (the fast
        // path collapses to nothing when `current == global_target`): stay
        // put for this tick rather than popping from an empty queue.
        let next = match self.local_plan.pop_front() {
            Some(n) => n,
            None => {
                sink.on_event(Event::LocalStep {
                    tracking: self.tracking_req.as_ref().map(|r| r.name.clone()),
                    local_tree_size: Some(0),
                    duration_ms: timer.dur_ms(),
                });
                return Ok(self.current);
            }
        };

        let sigma_prev = self.robot.get_symbols(self.current, false);
        let sigma_next = self.robot.get_symbols(next, false);
        let b_prev = self.last_buchi_states();
        let b_next = half_monitor(self.product.buchi(), &b_prev, &sigma_prev, &sigma_next);

        self.current = next;
        self.traj.push(next);
        self.buchi_states.push(b_next);

        sink.on_event(Event::LocalStep {
            tracking: self.tracking_req.as_ref().map(|r| r.name.clone()),
            local_tree_size: Some(self.local_plan.len()),
            duration_ms: timer.dur_ms(),
        });
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buchi::{BuchiBuilder, Guard};
    use crate::geometry::Region;
    use crate::instrumentation::NoopSink;
    use crate::workspace::Workspace;

    fn fixture() -> (Robot, TransitionSystem, IncrementalProduct) {
        let ws = Workspace::new(
            Region::new_box(Point2::new(0.0, 0.0), Point2::new(5.0, 5.0), vec![]).unwrap(),
        );
        let robot = Robot::new("r", ws, Point2::new(0.0, 0.0), 0.3, 0.05, 1.0);
        let mut ts = TransitionSystem::new();
        ts.add_state(Point2::new(0.0, 0.0), HashSet::new(), true);
        ts.add_state(Point2::new(2.0, 0.0), HashSet::new(), false);
        ts.add_transition(Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        ts.add_transition(Point2::new(2.0, 0.0), Point2::new(2.0, 0.0));

        let buchi = BuchiBuilder::new()
            .state(0, true, true)
            .transition(0, Guard::any(), 0)
            .build();
        let mut product = IncrementalProduct::new(buchi);
        product.add_initial_state(Point2::new(0.0, 0.0), &HashSet::new());
        let e1 = product.check(&ts, Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), &HashSet::new(), true);
        product.update(e1);
        // self-loop at (2.0, 0.0) closes an accepting cycle so potentials are finite.
        let e2 = product.check(&ts, Point2::new(2.0, 0.0), Point2::new(2.0, 0.0), &HashSet::new(), true);
        product.update(e2);
        product.compute_potentials();
        (robot, ts, product)
    }

    #[test]
    fn fast_path_moves_straight_toward_target_with_no_requests() {
        let (robot, ts, product) = fixture();
        let mut planner = LocalPlanner::new(
            &robot,
            &ts,
            &product,
            Eta { lo: 0.1, hi: 0.3 },
            HashMap::new(),
            3,
        );
        let mut sink = NoopSink;
        let next = planner
            .execute(Vec::new(), Vec::new(), &mut sink)
            .expect("fast path should succeed");
        assert!(next.x > 0.0 && next.x <= 0.31);
    }

    #[test]
    fn priority_request_is_tracked_over_lower_priority_one() {
        let (robot, ts, product) = fixture();
        let mut planner = LocalPlanner::new(
            &robot,
            &ts,
            &product,
            Eta { lo: 0.1, hi: 0.3 },
            HashMap::new(),
            3,
        );
        let survivor = Request {
            region: Region::new_ball(Point2::new(1.0, 0.0), 0.2, vec!["survivor".into()]).unwrap(),
            name: "survivor".into(),
            priority: 0,
        };
        let fire = Request {
            region: Region::new_ball(Point2::new(1.0, 1.0), 0.2, vec!["fire".into()]).unwrap(),
            name: "fire".into(),
            priority: 1,
        };
        // Drive request selection directly rather than through `execute`, so this
        // test doesn't depend on the tree-growth search in `generate_local_plan`
        // finding a path into the (small) survivor region within its budget.
        planner.requests = vec![survivor, fire];
        planner.check_local_plan();
        assert_eq!(
            planner.tracking_req.as_ref().map(|r| r.name.clone()),
            Some("survivor".into())
        );
    }
}
