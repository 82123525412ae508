//! Incremental product automaton: the synchronous composition of the
//! transition system being grown by the global planner with the (fixed,
//! read-only) Buchi automaton.
//!
//! The product only ever grows during RRG construction (no deletion), and
//! is kept in a state where every vertex is reachable from some initial
//! vertex — `check` only ever looks at existing vertices, so anything
//! `update` inserts is transitively reachable.

use crate::buchi::{Buchi, BuchiState};
use crate::geometry::Point2;
use crate::ts::TransitionSystem;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

pub type ProductVertex = (Point2, BuchiState);

#[derive(Debug, Clone, Copy)]
struct ProductNode {
    vertex: ProductVertex,
    is_init: bool,
    is_accepting: bool,
    /// `None` represents infinity.
    potential: Option<u32>,
}

/// A candidate product edge returned by [`IncrementalProduct::check`],
/// staged until [`IncrementalProduct::update`] commits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductEdge {
    pub from: ProductVertex,
    pub to: ProductVertex,
}

#[derive(Debug)]
pub struct IncrementalProduct {
    buchi: Buchi,
    graph: DiGraph<ProductNode, ()>,
    index: HashMap<ProductVertex, NodeIndex>,
}

impl IncrementalProduct {
    pub fn new(buchi: Buchi) -> Self {
        IncrementalProduct {
            buchi,
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    pub fn buchi(&self) -> &Buchi {
        &self.buchi
    }

    fn get_or_insert(&mut self, vertex: ProductVertex, is_init: bool) -> NodeIndex {
        if let Some(&idx) = self.index.get(&vertex) {
            if is_init {
                self.graph[idx].is_init = true;
            }
            return idx;
        }
        let is_accepting = self.buchi.is_accepting(vertex.1);
        let idx = self.graph.add_node(ProductNode {
            vertex,
            is_init,
            is_accepting,
            potential: None,
        });
        self.index.insert(vertex, idx);
        idx
    }

    /// Seeds the product with `(x, q)` for every initial state `q` of the
    /// Buchi automaton.
    pub fn add_initial_state(&mut self, x: Point2, _sigma_x: &HashSet<String>) {
        let initials: Vec<BuchiState> = self.buchi.initial_states().iter().copied().collect();
        for q in initials {
            self.get_or_insert((x, q), true);
        }
    }

    /// Returns candidate product edges induced by the prospective TS edge
    /// `(u, v)`. Never raises; inconsistent inputs simply yield an empty
    /// set.
    pub fn check(
        &self,
        _ts: &TransitionSystem,
        u: Point2,
        v: Point2,
        sigma_v: &HashSet<String>,
        forward: bool,
    ) -> Vec<ProductEdge> {
        let mut out = Vec::new();
        if forward {
            for (&(x, q), &idx) in &self.index {
                if x != u {
                    continue;
                }
                let _ = idx;
                for q_next in self.buchi.next_states(q, sigma_v) {
                    out.push(ProductEdge {
                        from: (u, q),
                        to: (v, q_next),
                    });
                }
            }
        } else {
            for (&(x_v, q_next), _) in &self.index {
                if x_v != v {
                    continue;
                }
                for &q in self.buchi.states() {
                    if !self.index.contains_key(&(u, q)) {
                        continue;
                    }
                    if self.buchi.next_states(q, sigma_v).contains(&q_next) {
                        out.push(ProductEdge {
                            from: (u, q),
                            to: (v, q_next),
                        });
                    }
                }
            }
        }
        out
    }

    /// Commits staged edges: inserts any new endpoints, then the edges.
    pub fn update(&mut self, edges: impl IntoIterator<Item = ProductEdge>) {
        for e in edges {
            let from = self.get_or_insert(e.from, false);
            let to = self.get_or_insert(e.to, false);
            if !self.graph.contains_edge(from, to) {
                self.graph.add_edge(from, to, ());
            }
        }
    }

    fn init_indices(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&i| self.graph[i].is_init)
            .collect()
    }

    fn reachable_from(&self, starts: &[NodeIndex]) -> HashSet<NodeIndex> {
        let mut seen = HashSet::new();
        for &s in starts {
            let mut dfs = Dfs::new(&self.graph, s);
            while let Some(n) = dfs.next(&self.graph) {
                seen.insert(n);
            }
        }
        seen
    }

    /// Vertices that lie on some cycle of the product graph (ignoring
    /// whether that cycle is reachable from an initial vertex).
    fn on_cycle(&self) -> HashSet<NodeIndex> {
        let sccs = petgraph::algo::tarjan_scc(&self.graph);
        let mut out = HashSet::new();
        for scc in sccs {
            if scc.len() > 1 {
                out.extend(scc);
            } else if let [only] = scc[..] {
                if self.graph.contains_edge(only, only) {
                    out.insert(only);
                }
            }
        }
        out
    }

    /// True once the product contains an initial-reachable accepting state
    /// that lies on an accepting cycle.
    pub fn found_policy(&self) -> bool {
        let inits = self.init_indices();
        if inits.is_empty() {
            return false;
        }
        let reachable = self.reachable_from(&inits);
        let cyclic = self.on_cycle();
        reachable
            .iter()
            .any(|i| self.graph[*i].is_accepting && cyclic.contains(i))
    }

    /// Scans `ts` for an edge `(u, v)` whose destination proposition set is
    /// accepted by none of the Buchi states reachable at `u`, i.e. a TS
    /// vertex the product can never be extended through. Returns the
    /// offending proposition set (sorted) if one exists.
    pub fn find_spec_mismatch(&self, ts: &TransitionSystem) -> Option<Vec<String>> {
        let inits = self.init_indices();
        if inits.is_empty() {
            return None;
        }
        let reachable = self.reachable_from(&inits);
        for (u, v) in ts.edges() {
            let qs_at_u: Vec<BuchiState> = reachable
                .iter()
                .filter(|&&i| self.graph[i].vertex.0 == u)
                .map(|&i| self.graph[i].vertex.1)
                .collect();
            if qs_at_u.is_empty() {
                continue;
            }
            let Some(sigma_v) = ts.propositions_of(&v) else {
                continue;
            };
            let accepted = qs_at_u
                .iter()
                .any(|&q| !self.buchi.next_states(q, sigma_v).is_empty());
            if !accepted {
                let mut props: Vec<String> = sigma_v.iter().cloned().collect();
                props.sort();
                return Some(props);
            }
        }
        None
    }

    /// Every vertex belonging to a cyclic SCC that contains at least one
    /// accepting vertex — the whole cycle gets potential 0, not just its
    /// accepting members.
    fn accepting_cycle_vertices(&self) -> HashSet<NodeIndex> {
        let sccs = petgraph::algo::tarjan_scc(&self.graph);
        let mut out = HashSet::new();
        for scc in sccs {
            let is_cycle = scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]);
            if is_cycle && scc.iter().any(|i| self.graph[*i].is_accepting) {
                out.extend(scc);
            }
        }
        out
    }

    /// Reverse BFS from every vertex lying on an accepting cycle, assigning
    /// integer potentials; unreachable vertices get infinite (`None`)
    /// potential. Returns `false` iff no accepting cycle exists.
    pub fn compute_potentials(&mut self) -> bool {
        let zero_sources: Vec<NodeIndex> = self.accepting_cycle_vertices().into_iter().collect();

        for i in self.graph.node_indices() {
            self.graph[i].potential = None;
        }
        if zero_sources.is_empty() {
            return false;
        }

        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        for &s in &zero_sources {
            self.graph[s].potential = Some(0);
            queue.push_back(s);
        }
        while let Some(n) = queue.pop_front() {
            let d = self.graph[n].potential.unwrap();
            let preds: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(n, Direction::Incoming)
                .collect();
            for p in preds {
                if self.graph[p].potential.is_none() {
                    self.graph[p].potential = Some(d + 1);
                    queue.push_back(p);
                }
            }
        }
        true
    }

    pub fn potential(&self, vertex: ProductVertex) -> Option<u32> {
        self.index.get(&vertex).and_then(|&i| self.graph[i].potential)
    }

    /// Out-edges of `vertex` as `(next_vertex, potential)` pairs, used by
    /// the local planner's tie-break rule.
    pub fn out_edges(&self, vertex: ProductVertex) -> Vec<(ProductVertex, Option<u32>)> {
        match self.index.get(&vertex) {
            None => Vec::new(),
            Some(&idx) => self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| {
                    let t = e.target();
                    (self.graph[t].vertex, self.graph[t].potential)
                })
                .collect(),
        }
    }

    pub fn contains(&self, vertex: ProductVertex) -> bool {
        self.index.contains_key(&vertex)
    }

    pub fn size(&self) -> (usize, usize) {
        (self.graph.node_count(), self.graph.edge_count())
    }

    pub fn edges(&self) -> impl Iterator<Item = (ProductVertex, ProductVertex)> + '_ {
        self.graph
            .edge_references()
            .map(move |e| (self.graph[e.source()].vertex, self.graph[e.target()].vertex))
    }

    /// Returns the lasso `(prefix, suffix)` minimizing `|prefix| +
    /// |suffix|` (ties broken by lexicographic vertex order), projected to
    /// bare configurations. `None` if [`Self::found_policy`] is false —
    /// callers must gate on it first.
    pub fn global_policy(&self) -> Option<(Vec<Point2>, Vec<Point2>)> {
        let inits = self.init_indices();
        if inits.is_empty() {
            return None;
        }
        let reachable = self.reachable_from(&inits);
        let cyclic = self.on_cycle();

        let mut candidates: Vec<NodeIndex> = reachable
            .iter()
            .copied()
            .filter(|i| self.graph[*i].is_accepting && cyclic.contains(i))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by_key(|i| self.graph[*i].vertex);

        let (dist_from_init, parent_from_init) = self.multi_source_bfs(&inits, Direction::Outgoing);

        let mut best: Option<(usize, Vec<NodeIndex>, Vec<NodeIndex>)> = None;
        for &cand in &candidates {
            let prefix_len = match dist_from_init.get(&cand) {
                Some(&d) => d,
                None => continue,
            };
            let mut prefix = Self::reconstruct(cand, &parent_from_init);
            prefix.push(cand);

            let successors: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(cand, Direction::Outgoing)
                .collect();
            if successors.is_empty() {
                continue;
            }
            let (dist_back, parent_back) = self.multi_source_bfs(&successors, Direction::Outgoing);
            let cycle_len = match dist_back.get(&cand) {
                Some(&d) => d + 1,
                None => continue,
            };
            let mut suffix = vec![cand];
            suffix.extend(Self::reconstruct(cand, &parent_back));
            suffix.push(cand);

            let total = prefix_len + cycle_len;
            let better = match &best {
                None => true,
                Some((best_total, best_prefix, best_suffix)) => {
                    total < *best_total
                        || (total == *best_total
                            && (&prefix, &suffix) < (best_prefix, best_suffix))
                }
            };
            if better {
                best = Some((total, prefix, suffix));
            }
        }

        best.map(|(_, prefix, suffix)| {
            let to_conf = |path: Vec<NodeIndex>| {
                path.into_iter().map(|i| self.graph[i].vertex.0).collect()
            };
            (to_conf(prefix), to_conf(suffix))
        })
    }

    fn multi_source_bfs(
        &self,
        sources: &[NodeIndex],
        dir: Direction,
    ) -> (HashMap<NodeIndex, usize>, HashMap<NodeIndex, NodeIndex>) {
        let mut dist = HashMap::new();
        let mut parent = HashMap::new();
        let mut queue = VecDeque::new();
        for &s in sources {
            dist.entry(s).or_insert(0);
            queue.push_back(s);
        }
        while let Some(n) = queue.pop_front() {
            let d = dist[&n];
            for next in self.graph.neighbors_directed(n, dir) {
                if !dist.contains_key(&next) {
                    dist.insert(next, d + 1);
                    parent.insert(next, n);
                    queue.push_back(next);
                }
            }
        }
        (dist, parent)
    }

    fn reconstruct(
        target: NodeIndex,
        parent: &HashMap<NodeIndex, NodeIndex>,
    ) -> Vec<NodeIndex> {
        let mut path = Vec::new();
        let mut cur = target;
        while let Some(&p) = parent.get(&cur) {
            path.push(p);
            cur = p;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buchi::{BuchiBuilder, Guard};

    fn simple_buchi() -> Buchi {
        // q0 --a--> q1 (accepting, self-loop on a)
        BuchiBuilder::new()
            .state(0, true, false)
            .state(1, false, true)
            .transition(0, Guard::new(["a"], []), 1)
            .transition(1, Guard::new(["a"], []), 1)
            .build()
    }

    #[test]
    fn found_policy_false_until_accepting_cycle_closed() {
        let mut p = IncrementalProduct::new(simple_buchi());
        let x0 = Point2::new(0.0, 0.0);
        let sigma0: HashSet<String> = HashSet::new();
        p.add_initial_state(x0, &sigma0);
        assert!(!p.found_policy());

        let ts = TransitionSystem::new();
        let x1 = Point2::new(1.0, 0.0);
        let sigma1: HashSet<String> = ["a".to_string()].into_iter().collect();
        let edges = p.check(&ts, x0, x1, &sigma1, true);
        assert_eq!(edges.len(), 1);
        p.update(edges);
        assert!(!p.found_policy()); // reached accepting state but no cycle yet

        let edges_self = p.check(&ts, x1, x1, &sigma1, true);
        p.update(edges_self);
        assert!(p.found_policy());
    }

    #[test]
    fn compute_potentials_zero_on_cycle() {
        let mut p = IncrementalProduct::new(simple_buchi());
        let x0 = Point2::new(0.0, 0.0);
        let x1 = Point2::new(1.0, 0.0);
        let sigma0: HashSet<String> = HashSet::new();
        let sigma1: HashSet<String> = ["a".to_string()].into_iter().collect();
        p.add_initial_state(x0, &sigma0);
        let ts = TransitionSystem::new();
        let e1 = p.check(&ts, x0, x1, &sigma1, true);
        p.update(e1);
        let e2 = p.check(&ts, x1, x1, &sigma1, true);
        p.update(e2);

        assert!(p.compute_potentials());
        assert_eq!(p.potential((x1, 1)), Some(0));
        assert_eq!(p.potential((x0, 0)), Some(1));
    }

    #[test]
    fn compute_potentials_zeroes_whole_cycle_not_just_accepting_member() {
        // q0 --a--> q1 (accepting) --b--> q2 (not accepting) --a--> q1: a
        // 2-vertex cycle where only one member is accepting. Both members
        // must get potential 0.
        let buchi = BuchiBuilder::new()
            .state(0, true, false)
            .state(1, false, true)
            .state(2, false, false)
            .transition(0, Guard::new(["a"], []), 1)
            .transition(1, Guard::new(["b"], []), 2)
            .transition(2, Guard::new(["a"], []), 1)
            .build();
        let mut p = IncrementalProduct::new(buchi);
        let x0 = Point2::new(0.0, 0.0);
        let x1 = Point2::new(1.0, 0.0);
        let x2 = Point2::new(2.0, 0.0);
        let sigma_a: HashSet<String> = ["a".to_string()].into_iter().collect();
        let sigma_b: HashSet<String> = ["b".to_string()].into_iter().collect();
        p.add_initial_state(x0, &HashSet::new());
        let ts = TransitionSystem::new();
        p.update(p.check(&ts, x0, x1, &sigma_a, true));
        p.update(p.check(&ts, x1, x2, &sigma_b, true));
        p.update(p.check(&ts, x2, x1, &sigma_a, true));

        assert!(p.compute_potentials());
        assert_eq!(p.potential((x1, 1)), Some(0));
        assert_eq!(p.potential((x2, 2)), Some(0));
        assert_eq!(p.potential((x0, 0)), Some(1));
    }

    #[test]
    fn global_policy_extracts_prefix_and_suffix() {
        let mut p = IncrementalProduct::new(simple_buchi());
        let x0 = Point2::new(0.0, 0.0);
        let x1 = Point2::new(1.0, 0.0);
        let sigma0: HashSet<String> = HashSet::new();
        let sigma1: HashSet<String> = ["a".to_string()].into_iter().collect();
        p.add_initial_state(x0, &sigma0);
        let ts = TransitionSystem::new();
        let e1 = p.check(&ts, x0, x1, &sigma1, true);
        p.update(e1);
        let e2 = p.check(&ts, x1, x1, &sigma1, true);
        p.update(e2);

        let (prefix, suffix) = p.global_policy().expect("policy found");
        // prefix ends at q*, suffix starts and ends at q* too: concatenating
        // as `prefix ++ suffix[1:]` yields the actual lasso trajectory.
        assert_eq!(prefix, vec![x0, x1]);
        assert_eq!(suffix, vec![x1, x1]);
    }

    #[test]
    fn find_spec_mismatch_flags_unacceptable_proposition() {
        let buchi = BuchiBuilder::new()
            .state(0, true, false)
            .transition(0, Guard::new(["a"], []), 0)
            .build();
        let mut p = IncrementalProduct::new(buchi);
        let x0 = Point2::new(0.0, 0.0);
        let x1 = Point2::new(1.0, 0.0);
        p.add_initial_state(x0, &HashSet::new());

        let mut ts = TransitionSystem::new();
        ts.add_state(x0, HashSet::new(), true);
        ts.add_state(x1, ["b".to_string()].into_iter().collect(), false);
        ts.add_transition(x0, x1);

        assert_eq!(
            p.find_spec_mismatch(&ts),
            Some(vec!["b".to_string()])
        );
    }
}
