//! Buchi automaton input interface.
//!
//! The engine treats a [`Buchi`] automaton as read-only: states, initial
//! states, accepting states and `next_states` are all it needs. Compiling
//! an LTL formula string into one is explicitly out of scope — the Python
//! original relies on an external translator it does not itself implement,
//! and this crate mirrors that by only ever consuming a [`Buchi`] someone
//! else built. [`BuchiBuilder`] is
//! the fixture-construction helper used by the demo case study and the
//! tests; it is not an LTL compiler.

use std::collections::HashSet;

pub type BuchiState = u32;

/// A transition guard: a set of propositions that must all be present, and
/// a set that must all be absent, for the input symbol (the proposition
/// set at a TS vertex) to satisfy it.
#[derive(Debug, Clone, Default)]
pub struct Guard {
    pub must_have: Vec<String>,
    pub must_not_have: Vec<String>,
}

impl Guard {
    pub fn new(must_have: impl IntoIterator<Item = &'static str>, must_not_have: impl IntoIterator<Item = &'static str>) -> Self {
        Guard {
            must_have: must_have.into_iter().map(String::from).collect(),
            must_not_have: must_not_have.into_iter().map(String::from).collect(),
        }
    }

    /// Always matches, regardless of the input symbol.
    pub fn any() -> Self {
        Guard::default()
    }

    pub fn matches(&self, symbol: &HashSet<String>) -> bool {
        self.must_have.iter().all(|s| symbol.contains(s))
            && self.must_not_have.iter().all(|s| !symbol.contains(s))
    }
}

#[derive(Debug, Clone)]
struct Transition {
    from: BuchiState,
    guard: Guard,
    to: BuchiState,
}

/// A (possibly nondeterministic) Buchi automaton over the global
/// proposition alphabet.
#[derive(Debug, Clone, Default)]
pub struct Buchi {
    states: Vec<BuchiState>,
    initial: HashSet<BuchiState>,
    accepting: HashSet<BuchiState>,
    transitions: Vec<Transition>,
}

impl Buchi {
    pub fn states(&self) -> &[BuchiState] {
        &self.states
    }

    pub fn initial_states(&self) -> &HashSet<BuchiState> {
        &self.initial
    }

    pub fn accepting_states(&self) -> &HashSet<BuchiState> {
        &self.accepting
    }

    pub fn is_accepting(&self, q: BuchiState) -> bool {
        self.accepting.contains(&q)
    }

    /// The set of successors of `q` under input symbol `sigma`.
    pub fn next_states(&self, q: BuchiState, sigma: &HashSet<String>) -> HashSet<BuchiState> {
        self.transitions
            .iter()
            .filter(|t| t.from == q && t.guard.matches(sigma))
            .map(|t| t.to)
            .collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = (BuchiState, BuchiState)> + '_ {
        self.transitions.iter().map(|t| (t.from, t.to))
    }
}

/// Builds [`Buchi`] fixtures by hand, mirroring how the Python original
/// wires an externally-translated automaton into the planner.
#[derive(Default)]
pub struct BuchiBuilder {
    buchi: Buchi,
}

impl BuchiBuilder {
    pub fn new() -> Self {
        BuchiBuilder::default()
    }

    pub fn state(mut self, q: BuchiState, initial: bool, accepting: bool) -> Self {
        if !self.buchi.states.contains(&q) {
            self.buchi.states.push(q);
        }
        if initial {
            self.buchi.initial.insert(q);
        }
        if accepting {
            self.buchi.accepting.insert(q);
        }
        self
    }

    pub fn transition(mut self, from: BuchiState, guard: Guard, to: BuchiState) -> Self {
        self.buchi.transitions.push(Transition { from, guard, to });
        self
    }

    pub fn build(self) -> Buchi {
        self.buchi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_states_filters_by_guard() {
        let b = BuchiBuilder::new()
            .state(0, true, false)
            .state(1, false, true)
            .transition(0, Guard::new(["a"], []), 1)
            .transition(0, Guard::new([], ["a"]), 0)
            .build();
        let with_a: HashSet<String> = ["a".to_string()].into_iter().collect();
        let without_a: HashSet<String> = HashSet::new();
        assert_eq!(b.next_states(0, &with_a), [1].into_iter().collect());
        assert_eq!(b.next_states(0, &without_a), [0].into_iter().collect());
    }
}
