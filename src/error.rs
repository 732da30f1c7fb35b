//! Error taxonomy. `OptimizerError` covers conditions rejected before a model
//! is ever built (or that prevent one from being built at all); everything a
//! MILP solver can report about the model itself — infeasible, unbounded,
//! timed out — is a *successful* result of the shape [`SolveOutcome`], not an
//! `Err`, mirroring how the teacher's `PlacementSolution` treats an
//! unschedulable placement as data rather than an exception.

use crate::domain::Plan;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OptimizerError {
    /// Malformed input caught before model build: unknown ids, negative
    /// rates/costs, a `sliceFactor` below 1, and similar.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No MILP backend available. Unreachable with the statically linked
    /// `good_lp`/`highs` backend used here; kept so the type mirrors what an
    /// externally-invoked solver backend would need to report.
    #[error("no MILP solver backend available: {0}")]
    SolverMissing(String),

    /// An external fetch (profile or distribution service) failed.
    #[error("external fetch failed: {0}")]
    Fetch(String),

    /// A feature of the external adapters that this crate does not
    /// implement at the wire level (no generated protobuf client is
    /// vendored; see the `grpc` feature).
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),
}

/// The classified outcome of a solve attempt. Only `Optimal` carries a usable
/// plan unconditionally; `FeasibleSuboptimal` carries a best-effort incumbent
/// found before a time limit. All other variants carry no plan.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Optimal(Plan),
    FeasibleSuboptimal(Plan),
    Infeasible { diagnostics: Vec<String> },
    Unbounded,
    ModelInvalid(String),
    Abnormal(String),
    NotSolved,
}

impl SolveOutcome {
    /// The contractual status name from §4.4 — used for CLI exit messages
    /// and logs, independent of the Rust variant name.
    pub fn status_name(&self) -> &'static str {
        match self {
            SolveOutcome::Optimal(_) => "OPTIMAL",
            SolveOutcome::FeasibleSuboptimal(_) => "FEASIBLE_SUBOPTIMAL",
            SolveOutcome::Infeasible { .. } => "INFEASIBLE",
            SolveOutcome::Unbounded => "UNBOUNDED",
            SolveOutcome::ModelInvalid(_) => "MODEL_INVALID",
            SolveOutcome::Abnormal(_) => "ABNORMAL",
            SolveOutcome::NotSolved => "NOT_SOLVED",
        }
    }

    pub fn plan(&self) -> Option<&Plan> {
        match self {
            SolveOutcome::Optimal(p) | SolveOutcome::FeasibleSuboptimal(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SolveOutcome::Optimal(_))
    }
}
