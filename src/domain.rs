//! Core data model: worker catalog, request types, demand/profile maps, and
//! the generated `Slice`/`Plan` types that flow through the rest of the
//! optimizer.

use std::collections::{HashMap, HashSet};

use crate::error::OptimizerError;

/// A candidate worker configuration — accelerator type/count and model-server
/// software bundled with a unit cost. Input-only and immutable through a run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkerConfig {
    pub id: String,
    pub accelerator_type: String,
    pub accelerator_count: u32,
    pub model_server_type: String,
    pub cost: f64,
    /// Ceiling on how many instances may be provisioned. `None` means
    /// unconstrained — this must stay optional, not default to zero.
    pub max_limit: Option<u32>,
}

/// A category of inference requests, distinguished by input/output size
/// bucket and latency SLO. Opaque to the optimizer beyond its `id`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestType {
    pub id: String,
    pub input_size_bucket: String,
    pub output_size_bucket: String,
    pub slo_ms: u32,
}

/// Aggregate demand, in requests/second, per request-type id. Entries with
/// rate <= 0 contribute nothing and are dropped by the slicer.
pub type Demand = HashMap<String, f64>;

/// Maximum throughput a single instance of a worker sustains for a request
/// type. A missing `(worker_id, request_type_id)` entry means unsupported —
/// identical in effect to an entry with `maxRps <= 0`.
pub type Profile = HashMap<(String, String), f64>;

/// A discrete chunk of one request type's demand — the atomic unit of
/// assignment. Ids are a monotone counter assigned by the slicer and are
/// contractual: they appear in the plan's `assignments` and must never be
/// reordered or reindexed after emission.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Slice {
    pub id: u64,
    pub request_type_id: String,
    pub rate_portion: f64,
}

/// The output of a successful solve: how many instances of each worker to
/// provision, and which worker each slice was assigned to.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Plan {
    pub counts: HashMap<String, u64>,
    pub assignments: HashMap<u64, String>,
}

impl Plan {
    pub fn total_cost(&self, workers: &[WorkerConfig]) -> f64 {
        workers
            .iter()
            .map(|w| w.cost * *self.counts.get(&w.id).unwrap_or(&0) as f64)
            .sum()
    }
}

/// Validates the worker catalog in isolation: unique ids, sane bounds.
/// Rejected before any model is built — see the `InvalidInput` row of the
/// error taxonomy.
pub fn validate_workers(workers: &[WorkerConfig]) -> Result<(), OptimizerError> {
    let mut seen = HashSet::with_capacity(workers.len());
    for w in workers {
        if !seen.insert(w.id.as_str()) {
            return Err(OptimizerError::InvalidInput(format!(
                "duplicate worker id: {}",
                w.id
            )));
        }
        if w.accelerator_count < 1 {
            return Err(OptimizerError::InvalidInput(format!(
                "worker {} has acceleratorCount < 1",
                w.id
            )));
        }
        if w.cost < 0.0 {
            return Err(OptimizerError::InvalidInput(format!(
                "worker {} has negative cost",
                w.id
            )));
        }
    }
    Ok(())
}

/// Validates demand and profile against the worker catalog: negative rates,
/// unknown worker ids referenced by the profile. Unknown request-type ids are
/// not checked here — that cross-reference is only meaningful once a request
/// type catalog is available, see [`crate::fetch::dangling_request_type_ids`].
pub fn validate_demand_and_profile(
    workers: &[WorkerConfig],
    profile: &Profile,
    demand: &Demand,
) -> Result<(), OptimizerError> {
    for (req_id, &rate) in demand {
        if rate < 0.0 {
            return Err(OptimizerError::InvalidInput(format!(
                "negative demand rate for request type {req_id}"
            )));
        }
    }
    let worker_ids: HashSet<&str> = workers.iter().map(|w| w.id.as_str()).collect();
    for (worker_id, _) in profile.keys() {
        if !worker_ids.contains(worker_id.as_str()) {
            return Err(OptimizerError::InvalidInput(format!(
                "profile references unknown worker id: {worker_id}"
            )));
        }
    }
    Ok(())
}
