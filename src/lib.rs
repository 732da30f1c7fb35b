//! Minimum-cost capacity planning for an inference-serving fleet: given a
//! worker catalog, a per-(worker, request-type) throughput profile, and a
//! demand distribution, `solve()` returns how many instances of each worker
//! to provision and which worker each slice of demand is assigned to.

pub mod bucketize;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
#[cfg(feature = "grpc")]
pub mod grpc;
pub mod load;
pub mod model;
pub mod plan;
pub mod slicer;
pub mod solver;

use std::time::Duration;

pub use config::OptimizerConfig;
pub use domain::{Demand, Plan, Profile, RequestType, Slice, WorkerConfig};
pub use error::{OptimizerError, SolveOutcome};

/// Solves one capacity-planning instance. See §6.1: empty demand is a valid
/// input and yields a zero plan, not an error.
pub fn solve(
    workers: &[WorkerConfig],
    profile: &Profile,
    demand: &Demand,
    slice_factor: u32,
    time_limit: Option<Duration>,
) -> Result<SolveOutcome, OptimizerError> {
    domain::validate_workers(workers)?;
    domain::validate_demand_and_profile(workers, profile, demand)?;

    let slices = slicer::slice_demand(demand, slice_factor)?;
    if slices.is_empty() {
        let counts = workers.iter().map(|w| (w.id.clone(), 0)).collect();
        return Ok(SolveOutcome::Optimal(Plan {
            counts,
            assignments: std::collections::HashMap::new(),
        }));
    }

    let load_matrix = load::build_load_matrix(&slices, workers, profile);
    solver::solve_model(workers, &slices, &load_matrix, time_limit)
}

/// Convenience wrapper over [`solve`] that additionally cross-references `D`
/// and `P` against a request-type catalog, per §3's global invariant.
/// Dangling ids are collected as warnings and logged, never rejected — the
/// optimizer only needs the ids it can resolve against the profile.
pub fn solve_with_catalog(
    workers: &[WorkerConfig],
    request_types: &[RequestType],
    profile: &Profile,
    demand: &Demand,
    config: &OptimizerConfig,
) -> Result<(SolveOutcome, Vec<String>), OptimizerError> {
    let warnings = fetch::dangling_request_type_ids(request_types, demand, profile);
    for message in &warnings {
        tracing::warn!(%message, "dangling request-type id");
    }
    let outcome = solve(workers, profile, demand, config.slice_factor, config.time_limit)?;
    Ok((outcome, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn worker(id: &str, cost: f64) -> WorkerConfig {
        WorkerConfig {
            id: id.into(),
            accelerator_type: "L4".into(),
            accelerator_count: 1,
            model_server_type: "VLLM".into(),
            cost,
            max_limit: None,
        }
    }

    #[test]
    fn empty_demand_yields_zero_plan_for_every_worker() {
        let workers = vec![worker("A", 1.0), worker("B", 2.0)];
        let outcome = solve(&workers, &Profile::new(), &Demand::new(), 2, None).unwrap();
        let plan = outcome.plan().expect("expected a plan");
        assert_eq!(plan.counts.get("A"), Some(&0));
        assert_eq!(plan.counts.get("B"), Some(&0));
        assert!(plan.assignments.is_empty());
    }

    #[test]
    fn rejects_invalid_input_before_building_a_model() {
        let workers = vec![worker("A", -1.0)];
        let err = solve(&workers, &Profile::new(), &Demand::new(), 2, None).unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidInput(_)));
    }

    #[test]
    fn end_to_end_solve_assigns_demand_to_cheapest_feasible_worker() {
        let workers = vec![worker("cheap", 1.0), worker("expensive", 5.0)];
        let demand: Demand = HashMap::from([("R1".to_string(), 10.0)]);
        let profile: Profile = HashMap::from([
            (("cheap".to_string(), "R1".to_string()), 5.0),
            (("expensive".to_string(), "R1".to_string()), 5.0),
        ]);
        let outcome = solve(&workers, &profile, &demand, 1, None).unwrap();
        let plan = outcome.plan().expect("expected a plan");
        assert_eq!(plan.counts.get("cheap"), Some(&2));
        assert_eq!(plan.counts.get("expensive"), Some(&0));
    }

    #[test]
    fn solve_with_catalog_warns_on_dangling_ids_but_still_solves() {
        let workers = vec![worker("A", 1.0)];
        let request_types = vec![RequestType {
            id: "R1".into(),
            input_size_bucket: "0-1".into(),
            output_size_bucket: "0-1".into(),
            slo_ms: 50,
        }];
        let demand: Demand =
            HashMap::from([("R1".to_string(), 5.0), ("RGHOST".to_string(), 1.0)]);
        let profile: Profile = HashMap::from([
            (("A".to_string(), "R1".to_string()), 5.0),
            (("A".to_string(), "RGHOST".to_string()), 5.0),
        ]);
        let config = OptimizerConfig::default();
        let (outcome, warnings) =
            solve_with_catalog(&workers, &request_types, &profile, &demand, &config).unwrap();
        assert!(outcome.is_success());
        assert_eq!(warnings, vec!["RGHOST".to_string()]);
    }
}
