//! Error kinds returned by construction, planning and execution calls.
//!
//! The core never panics on a reachable error path; it returns one of these
//! variants and leaves whatever TS/product progress it had made intact and
//! re-queryable.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlannerError {
    /// The global RRG planner exhausted its iteration budget without
    /// `found_policy()` becoming true.
    #[error("RRG exhausted {iterations} iterations without finding an accepting lasso")]
    NoSolution { iterations: u32 },

    /// `global_policy` succeeded but `compute_potentials` found no accepting
    /// cycle. This should be unreachable given `found_policy`'s own
    /// definition; if observed it indicates a defect in the supplied Buchi
    /// automaton.
    #[error("no accepting cycle reachable from the computed lasso (Buchi input defect)")]
    NoPotential,

    /// The local planner exceeded a caller-imposed node budget while
    /// tracking a request. The caller may drop the request and resume the
    /// fast path on the next call.
    #[error("local planner exceeded budget of {budget} nodes while tracking {request}")]
    LocalUnreachable { budget: usize, request: String },

    /// A region construction received degenerate input.
    #[error("invalid geometry: {0}")]
    GeometryInvalid(String),

    /// A proposition appears on a TS vertex that no Buchi edge accepts from
    /// any reachable state, implying a disconnected product.
    #[error("proposition set {0:?} is not accepted by any reachable Buchi state")]
    SpecMismatch(Vec<String>),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
