//! Timing helpers and structured progress events.
//!
//! The core does no presentation logging of its own: it emits
//! [`Event`] values through an [`EventSink`] for a host to render, while
//! still using `log` macros at `debug`/`info` granularity for free-text
//! diagnostics, matching how the teacher crate instruments its planner loop.

use std::time::Instant;

/// Measures elapsed wall-clock time since construction.
pub struct Timer {
    start: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Timer {
            start: Instant::now(),
        }
    }
}

impl Timer {
    pub fn dur_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Structured progress events a host can subscribe to instead of scraping
/// log output.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// One RRG iteration completed; `ts_size`/`product_size` are node counts.
    RrgIteration {
        iteration: u32,
        ts_size: usize,
        product_size: usize,
    },
    /// The RRG planner found an accepting lasso.
    PolicyFound { iteration: u32 },
    /// The RRG planner exhausted its iteration budget.
    NoSolution { iterations: u32 },
    /// One on-line `execute` call completed.
    LocalStep {
        tracking: Option<String>,
        local_tree_size: Option<usize>,
        duration_ms: f64,
    },
    /// Timing sample for an internal phase, kept for parity with the
    /// teacher's accumulated-duration statistics.
    Timing { phase: &'static str, ms: f64 },
}

/// Receives structured events. The default `NoopSink` discards everything;
/// hosts implement this to drive UIs, metrics, or persistence.
pub trait EventSink {
    fn on_event(&mut self, event: Event);
}

#[derive(Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn on_event(&mut self, _event: Event) {}
}

/// Collects every event in order; handy for tests and the CLI demo.
#[derive(Default)]
pub struct VecSink(pub Vec<Event>);

impl EventSink for VecSink {
    fn on_event(&mut self, event: Event) {
        self.0.push(event);
    }
}
