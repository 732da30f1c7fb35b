//! Extracts a [`Plan`] from a solved MILP: rounds instance counts and reads
//! off the unique assigned worker per slice, per §4.5.

use good_lp::Solution as GoodLpSolution;

use crate::domain::{Plan, Slice, WorkerConfig};
use crate::model::DecisionVariables;

/// Numeric-noise guard for rounding `B[w]` up to the nearest integer: a
/// solver value of `2.0000001` should round to `2`, not `3`.
const ROUNDING_EPSILON: f64 = 1e-6;
/// A binary variable is considered "set" above this value.
const BINARY_DECISION_CUTOFF: f64 = 0.5;

/// Builds the plan from a solved model, or an error message if the solution
/// is internally inconsistent (a slice with no assigned worker, or more than
/// one — which should not occur at the optimum of a correctly built integer
/// program, but is checked rather than assumed).
pub fn extract_plan(
    solution: &impl GoodLpSolution,
    workers: &[WorkerConfig],
    slices: &[Slice],
    dv: &DecisionVariables,
) -> Result<Plan, String> {
    let mut counts = std::collections::HashMap::with_capacity(workers.len());
    for (w, &b) in workers.iter().zip(&dv.counts) {
        let value = solution.value(b);
        let count = (value - ROUNDING_EPSILON).ceil();
        if count < 0.0 {
            return Err(format!("worker {} resolved to a negative count: {value}", w.id));
        }
        counts.insert(w.id.clone(), count as u64);
    }

    let mut assignments = std::collections::HashMap::with_capacity(slices.len());
    for (s, slice) in slices.iter().enumerate() {
        let assigned: Vec<usize> = dv.assignment[s]
            .iter()
            .enumerate()
            .filter_map(|(w, var)| {
                var.filter(|&v| solution.value(v) > BINARY_DECISION_CUTOFF)
                    .map(|_| w)
            })
            .collect();

        match assigned.as_slice() {
            [w] => {
                assignments.insert(slice.id, workers[*w].id.clone());
            }
            [] => {
                return Err(format!(
                    "slice {} has no assigned worker at solver optimum",
                    slice.id
                ));
            }
            _ => {
                return Err(format!(
                    "slice {} resolved to {} fractional/multiple assignments",
                    slice.id,
                    assigned.len()
                ));
            }
        }
    }

    Ok(Plan { counts, assignments })
}
