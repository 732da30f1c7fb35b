//! Derives the per-(slice, worker) fractional load matrix. A `+inf` entry
//! marks a forbidden pairing (missing or non-positive throughput) and must
//! never become a model variable — see [`crate::model`].

use crate::domain::{Profile, Slice, WorkerConfig};

/// Dense `[slice_index][worker_index] -> load` matrix, in the same order as
/// the `slices`/`workers` slices it was built from.
pub type LoadMatrix = Vec<Vec<f64>>;

pub fn build_load_matrix(slices: &[Slice], workers: &[WorkerConfig], profile: &Profile) -> LoadMatrix {
    slices
        .iter()
        .map(|s| {
            workers
                .iter()
                .map(|w| {
                    let key = (w.id.clone(), s.request_type_id.clone());
                    match profile.get(&key) {
                        Some(&max_rps) if max_rps > 0.0 => s.rate_portion / max_rps,
                        _ => f64::INFINITY,
                    }
                })
                .collect()
        })
        .collect()
}

/// Slice indices with no finite-load candidate worker — these cannot be
/// assigned and make the model infeasible at build time, before a solver is
/// ever invoked.
pub fn unassignable_slices(load: &LoadMatrix) -> Vec<usize> {
    load.iter()
        .enumerate()
        .filter(|(_, row)| row.iter().all(|&l| l.is_infinite()))
        .map(|(idx, _)| idx)
        .collect()
}
