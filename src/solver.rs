//! Invokes the branch-and-cut MILP backend and classifies its outcome.
//!
//! The backend is `good_lp`'s `highs` solver — statically linked, so there is
//! no "solver missing at runtime" case in practice; [`OptimizerError::SolverMissing`]
//! is kept on the error type for API parity with a pluggable backend but this
//! driver never produces it.

use std::time::{Duration, Instant};

use good_lp::{variables, Solution, SolverModel};
use tracing::{debug, info, warn};

use crate::domain::{Slice, WorkerConfig};
use crate::error::{OptimizerError, SolveOutcome};
use crate::load::{self, LoadMatrix};
use crate::model::{self, DecisionVariables};
use crate::plan;

pub fn solve_model(
    workers: &[WorkerConfig],
    slices: &[Slice],
    load_matrix: &LoadMatrix,
    time_limit: Option<Duration>,
) -> Result<SolveOutcome, OptimizerError> {
    let unassignable = load::unassignable_slices(load_matrix);
    if !unassignable.is_empty() {
        let diagnostics: Vec<String> = unassignable
            .iter()
            .map(|&idx| slices[idx].request_type_id.clone())
            .collect();
        warn!(
            request_types = ?diagnostics,
            "slices with no finite-load candidate worker; model not built"
        );
        return Ok(SolveOutcome::Infeasible { diagnostics });
    }

    debug!(
        slices = slices.len(),
        workers = workers.len(),
        "building MILP"
    );

    let mut vars = variables!();
    let dv: DecisionVariables = model::create_decision_variables(&mut vars, workers, load_matrix);
    let objective = model::build_objective(workers, &dv);

    // HiGHS runs single-threaded branch-and-bound by default through this
    // backend, which makes its tie-breaking deterministic for a fixed model —
    // the §4.4 determinism requirement falls out of that default rather than
    // needing an explicit seed call.
    let mut problem = vars.minimise(objective).using(good_lp::solvers::highs::highs);
    if let Some(limit) = time_limit {
        problem = problem.set_time_limit(limit.as_secs_f64());
    }
    let problem = model::add_constraints(problem, workers, slices, load_matrix, &dv);

    let start = Instant::now();
    let result = problem.solve();
    let elapsed = start.elapsed();

    classify(result, workers, slices, &dv, time_limit, elapsed)
}

/// Maps a `good_lp` solve result (plus wall-clock timing against the
/// requested limit) onto the contractual status set from §4.4.
///
/// `good_lp`'s `ResolutionError` does not distinguish "ran out of time with a
/// usable incumbent" from "genuinely infeasible" — HiGHS reports both the
/// same way through this API. We approximate the distinction the spec asks
/// for by comparing elapsed wall-clock time to the requested limit: an
/// infeasible result reached at or after the limit is reported as
/// `NOT_SOLVED` (no incumbent ever existed to fall back to) rather than
/// `INFEASIBLE`.
fn classify(
    result: Result<impl Solution, good_lp::ResolutionError>,
    workers: &[WorkerConfig],
    slices: &[Slice],
    dv: &DecisionVariables,
    time_limit: Option<Duration>,
    elapsed: Duration,
) -> Result<SolveOutcome, OptimizerError> {
    let hit_time_limit = time_limit.is_some_and(|limit| elapsed >= limit);

    match result {
        Ok(solution) => match plan::extract_plan(&solution, workers, slices, dv) {
            Ok(plan) => {
                let outcome = if hit_time_limit {
                    info!(status = "FEASIBLE_SUBOPTIMAL", "solve stopped at time limit");
                    SolveOutcome::FeasibleSuboptimal(plan)
                } else {
                    info!(status = "OPTIMAL", total_cost = plan.total_cost(workers), "solve complete");
                    SolveOutcome::Optimal(plan)
                };
                Ok(outcome)
            }
            Err(message) => {
                warn!(%message, "solver returned a fractional assignment at optimum");
                Ok(SolveOutcome::ModelInvalid(message))
            }
        },
        Err(good_lp::ResolutionError::Infeasible) if hit_time_limit => {
            warn!("time limit reached with no incumbent solution");
            Ok(SolveOutcome::NotSolved)
        }
        Err(good_lp::ResolutionError::Infeasible) => {
            info!("solver reported infeasible");
            Ok(SolveOutcome::Infeasible {
                diagnostics: Vec::new(),
            })
        }
        Err(good_lp::ResolutionError::Unbounded) => {
            warn!("solver reported unbounded");
            Ok(SolveOutcome::Unbounded)
        }
        Err(good_lp::ResolutionError::Other(message)) => {
            warn!(message, "solver reported an abnormal status");
            Ok(SolveOutcome::Abnormal(message.to_string()))
        }
        Err(other) => {
            warn!(error = %other, "unrecognized solver error");
            Ok(SolveOutcome::Abnormal(other.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Profile, WorkerConfig};
    use crate::slicer;
    use std::collections::HashMap;

    fn worker(id: &str, cost: f64, max_limit: Option<u32>) -> WorkerConfig {
        WorkerConfig {
            id: id.into(),
            accelerator_type: "L4".into(),
            accelerator_count: 1,
            model_server_type: "VLLM".into(),
            cost,
            max_limit,
        }
    }

    #[test]
    fn s1_trivial_two_instances() {
        let workers = vec![worker("A", 1.0, None)];
        let demand = HashMap::from([("R1".to_string(), 10.0)]);
        let slices = slicer::slice_demand(&demand, 1).unwrap();
        let profile: Profile = HashMap::from([(("A".to_string(), "R1".to_string()), 5.0)]);
        let load = load::build_load_matrix(&slices, &workers, &profile);

        let outcome = solve_model(&workers, &slices, &load, None).unwrap();
        let plan = outcome.plan().expect("expected a plan");
        assert_eq!(plan.counts.get("A"), Some(&2));
        assert_eq!(plan.assignments.len(), 1);
    }

    #[test]
    fn s3_unassignable_slice_is_infeasible_without_building_solver() {
        let workers: Vec<WorkerConfig> = vec![];
        let demand = HashMap::from([("R1".to_string(), 1.0)]);
        let slices = slicer::slice_demand(&demand, 2).unwrap();
        let load = load::build_load_matrix(&slices, &workers, &Profile::new());

        let outcome = solve_model(&workers, &slices, &load, None).unwrap();
        match outcome {
            SolveOutcome::Infeasible { diagnostics } => {
                assert!(diagnostics.contains(&"R1".to_string()));
            }
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }

    #[test]
    fn s4_cap_driven_infeasibility() {
        let workers = vec![worker("A", 1.0, Some(1))];
        let demand = HashMap::from([("R1".to_string(), 5.0)]);
        let slices = slicer::slice_demand(&demand, 5).unwrap();
        let profile: Profile = HashMap::from([(("A".to_string(), "R1".to_string()), 1.0)]);
        let load = load::build_load_matrix(&slices, &workers, &profile);

        let outcome = solve_model(&workers, &slices, &load, None).unwrap();
        assert_eq!(outcome.status_name(), "INFEASIBLE");
    }

    #[test]
    fn determinism_across_repeated_runs() {
        let workers = vec![worker("L4", 1.0, None), worker("A100", 3.0, None)];
        let demand = HashMap::from([("R1".to_string(), 17.0)]);
        let slices = slicer::slice_demand(&demand, 4).unwrap();
        let profile: Profile = HashMap::from([
            (("L4".to_string(), "R1".to_string()), 3.0),
            (("A100".to_string(), "R1".to_string()), 9.0),
        ]);
        let load = load::build_load_matrix(&slices, &workers, &profile);

        let first = solve_model(&workers, &slices, &load, None).unwrap();
        let second = solve_model(&workers, &slices, &load, None).unwrap();
        assert_eq!(first, second);
    }
}
