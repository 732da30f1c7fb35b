//! The inputs assembler (§4.6): capability traits for the two upstream
//! services plus the folding logic that turns their raw responses into the
//! `Demand`/`Profile` maps the core consumes.
//!
//! Modeled as small synchronous capability interfaces — `ProfileFetcher` and
//! `DistributionFetcher` — so the optimizer is testable end-to-end with
//! in-memory fakes, per §9's "external service clients" guidance, the same
//! way the teacher's `Provider` enum lets `optimiser::solve` be exercised
//! against `FakeProvider` instead of a live Kubernetes cluster.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{Demand, Profile, RequestType};
use crate::error::OptimizerError;

/// A single `(requestTypeId, rate)` pair from the distribution service.
#[derive(Debug, Clone, PartialEq)]
pub struct RateEntry {
    pub request_type_id: Option<String>,
    pub rate: Option<f64>,
}

/// Raw response shape of `GetCurrentDistribution` (§6.2).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionResponse {
    pub request_types: Vec<RequestType>,
    pub rate_distribution: Vec<RateEntry>,
}

/// Profiler entry status (§6.3). Only `Ok`/`OkUsingHighestRate` contribute a
/// finite throughput; everything else is treated as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    Ok,
    OkUsingHighestRate,
    StatusUnspecified,
    Other,
}

impl ProfileStatus {
    fn is_usable(self) -> bool {
        matches!(self, ProfileStatus::Ok | ProfileStatus::OkUsingHighestRate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    pub worker_type_id: Option<String>,
    pub request_type_id: Option<String>,
    pub max_throughput_rps: f64,
    pub status: ProfileStatus,
}

/// Raw response shape of `GenerateProfile` (§6.3).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileResponse {
    pub entries: Vec<ProfileEntry>,
}

/// What the profiler needs to know to score a workload: the worker and
/// request-type catalogs it should generate entries for.
#[derive(Debug, Clone, Default)]
pub struct ProfileRequest {
    pub worker_type_ids: Vec<String>,
    pub request_type_ids: Vec<String>,
}

/// Fetches the current demand distribution and request-type catalog.
pub trait DistributionFetcher {
    fn fetch(&self) -> Result<DistributionResponse, OptimizerError>;
}

/// Fetches the per-(worker, request-type) throughput profile.
pub trait ProfileFetcher {
    fn fetch(&self, request: &ProfileRequest) -> Result<ProfileResponse, OptimizerError>;
}

/// Folds a distribution response into `(request_types, demand, warnings)`.
/// Entries with a missing id or rate are dropped, each with a warning —
/// per §4.6/§7's soft-warning policy, this never fails the whole fetch.
pub fn fold_distribution(response: DistributionResponse) -> (Vec<RequestType>, Demand, Vec<String>) {
    let mut demand = HashMap::new();
    let mut warnings = Vec::new();

    for entry in response.rate_distribution {
        match (entry.request_type_id, entry.rate) {
            (Some(id), Some(rate)) => {
                demand.insert(id, rate);
            }
            (id, rate) => {
                let message = format!(
                    "dropping rate entry with missing field(s): id={id:?}, rate={rate:?}"
                );
                warn!(%message);
                warnings.push(message);
            }
        }
    }

    (response.request_types, demand, warnings)
}

/// Folds a profile response into a [`Profile`] map. Entries with a missing
/// worker or request-type id are dropped with a warning; entries with a
/// non-usable status are recorded as a warning but contribute no throughput
/// (equivalently: the pairing stays absent from the map, which the load
/// builder already treats as forbidden).
pub fn fold_profile(response: ProfileResponse) -> (Profile, Vec<String>) {
    let mut profile = HashMap::new();
    let mut warnings = Vec::new();

    for entry in response.entries {
        match (entry.worker_type_id, entry.request_type_id) {
            (Some(worker_id), Some(req_id)) => {
                if entry.status.is_usable() {
                    profile.insert((worker_id, req_id), entry.max_throughput_rps);
                } else {
                    let message = format!(
                        "throughput for ({worker_id}, {req_id}) ignored due to status {:?}",
                        entry.status
                    );
                    warn!(%message);
                    warnings.push(message);
                }
            }
            (worker_id, req_id) => {
                let message = format!(
                    "dropping profile entry with missing field(s): worker={worker_id:?}, request={req_id:?}"
                );
                warn!(%message);
                warnings.push(message);
            }
        }
    }

    (profile, warnings)
}

/// Cross-references `D`/`P` against the request-type catalog, per §3's
/// global invariant. Dangling ids are a warning, never fatal.
pub fn dangling_request_type_ids(
    request_types: &[RequestType],
    demand: &Demand,
    profile: &Profile,
) -> Vec<String> {
    let known: std::collections::HashSet<&str> =
        request_types.iter().map(|r| r.id.as_str()).collect();

    let mut dangling: Vec<String> = demand
        .keys()
        .filter(|id| !known.contains(id.as_str()))
        .chain(
            profile
                .keys()
                .map(|(_, req_id)| req_id)
                .filter(|id| !known.contains(id.as_str())),
        )
        .cloned()
        .collect();
    dangling.sort();
    dangling.dedup();
    dangling
}

/// An in-memory fake for tests — returns a fixed response, no I/O. Mirrors
/// the teacher's `FakeProvider`.
pub struct FakeDistributionFetcher(pub DistributionResponse);

impl DistributionFetcher for FakeDistributionFetcher {
    fn fetch(&self) -> Result<DistributionResponse, OptimizerError> {
        Ok(self.0.clone())
    }
}

pub struct FakeProfileFetcher(pub ProfileResponse);

impl ProfileFetcher for FakeProfileFetcher {
    fn fetch(&self, _request: &ProfileRequest) -> Result<ProfileResponse, OptimizerError> {
        Ok(self.0.clone())
    }
}
