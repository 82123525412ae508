//! Transition system (TS): a directed graph of configurations labeled by
//! the global propositions that hold there, keyed by content (coordinate)
//! rather than identity so both planners can re-discover the same
//! configuration via different paths.

use crate::geometry::Point2;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct TsNode {
    pub conf: Point2,
    pub propositions: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct TransitionSystem {
    graph: DiGraph<TsNode, ()>,
    index: HashMap<Point2, NodeIndex>,
    init: Option<NodeIndex>,
}

impl TransitionSystem {
    pub fn new() -> Self {
        TransitionSystem::default()
    }

    /// Adds `conf` with the given propositions if not already present;
    /// returns the (possibly pre-existing) node index. Idempotent.
    pub fn add_state(
        &mut self,
        conf: Point2,
        propositions: HashSet<String>,
        init: bool,
    ) -> NodeIndex {
        let idx = *self.index.entry(conf).or_insert_with(|| {
            self.graph.add_node(TsNode {
                conf,
                propositions: propositions.clone(),
            })
        });
        if init {
            self.init = Some(idx);
        }
        idx
    }

    pub fn add_states(&mut self, states: impl IntoIterator<Item = (Point2, HashSet<String>)>) {
        for (conf, props) in states {
            self.add_state(conf, props, false);
        }
    }

    /// Adds a directed edge `u -> v`; both endpoints must already exist.
    /// No-op if the edge is already present (TS only grows).
    pub fn add_transition(&mut self, u: Point2, v: Point2) {
        if let (Some(&ui), Some(&vi)) = (self.index.get(&u), self.index.get(&v)) {
            if !self.graph.contains_edge(ui, vi) {
                self.graph.add_edge(ui, vi, ());
            }
        }
    }

    pub fn add_transitions(&mut self, edges: impl IntoIterator<Item = (Point2, Point2)>) {
        for (u, v) in edges {
            self.add_transition(u, v);
        }
    }

    pub fn contains(&self, conf: &Point2) -> bool {
        self.index.contains_key(conf)
    }

    pub fn propositions_of(&self, conf: &Point2) -> Option<&HashSet<String>> {
        self.index
            .get(conf)
            .map(|&i| &self.graph[i].propositions)
    }

    pub fn init(&self) -> Option<Point2> {
        self.init.map(|i| self.graph[i].conf)
    }

    pub fn nodes(&self) -> impl Iterator<Item = Point2> + '_ {
        self.graph.node_indices().map(move |i| self.graph[i].conf)
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        self.graph
            .edge_references()
            .map(move |e| (self.graph[e.source()].conf, self.graph[e.target()].conf))
    }

    /// Out-neighbors of `conf` in the TS (empty if `conf` is absent).
    pub fn neighbors(&self, conf: &Point2) -> Vec<Point2> {
        match self.index.get(conf) {
            Some(&i) => self
                .graph
                .neighbors_directed(i, Direction::Outgoing)
                .map(|n| self.graph[n].conf)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.graph.node_count(), self.graph.edge_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_state_is_idempotent_by_coordinate() {
        let mut ts = TransitionSystem::new();
        let p = Point2::new(1.0, 2.0);
        ts.add_state(p, HashSet::new(), true);
        ts.add_state(p, HashSet::new(), false);
        assert_eq!(ts.size().0, 1);
        assert_eq!(ts.init(), Some(p));
    }

    #[test]
    fn add_transition_requires_both_endpoints() {
        let mut ts = TransitionSystem::new();
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        ts.add_transition(a, b); // neither exists yet: no-op
        assert_eq!(ts.size().1, 0);
        ts.add_state(a, HashSet::new(), true);
        ts.add_state(b, HashSet::new(), false);
        ts.add_transition(a, b);
        assert_eq!(ts.size().1, 1);
        assert_eq!(ts.neighbors(&a), vec![b]);
    }
}
