//! Slices continuous per-request-type demand into discrete chunks small
//! enough that pinning a whole chunk to one worker class (binary assignment,
//! see [`crate::model`]) is a meaningful approximation of splitting load
//! across worker classes.

use tracing::debug;

use crate::domain::{Demand, Slice};
use crate::error::OptimizerError;

/// Below this threshold a `totalRate / sliceFactor` portion is considered
/// numerically meaningless and the demand is coarsened into one slice instead.
const MIN_SLICE_PORTION: f64 = 1e-6;
/// Below this threshold total demand for a request type is treated as zero.
const ZERO_RATE_THRESHOLD: f64 = 1e-9;

/// Converts demand into an ordered, contiguously-id'd sequence of slices.
///
/// Request types are visited in sorted-id order so that slice ids are
/// reproducible across runs regardless of the caller's map implementation —
/// slice ids are part of the returned contract (they appear in
/// `Plan::assignments`) and must be deterministic on identical input.
pub fn slice_demand(demand: &Demand, slice_factor: u32) -> Result<Vec<Slice>, OptimizerError> {
    if slice_factor < 1 {
        return Err(OptimizerError::InvalidInput(
            "sliceFactor must be >= 1".to_string(),
        ));
    }

    let mut req_ids: Vec<&String> = demand.keys().collect();
    req_ids.sort();

    let mut slices = Vec::new();
    let mut next_id: u64 = 0;

    for req_id in req_ids {
        let total_rate = demand[req_id];
        if total_rate <= ZERO_RATE_THRESHOLD {
            debug!(request_type_id = %req_id, total_rate, "skipping zero-rate demand entry");
            continue;
        }

        let k = slice_factor.max(1);
        let portion = total_rate / k as f64;

        let (count, portion) = if portion < MIN_SLICE_PORTION {
            debug!(
                request_type_id = %req_id,
                total_rate,
                "portion below minimum slice threshold; coarsening to one slice"
            );
            (1u32, total_rate)
        } else {
            (k, portion)
        };

        for _ in 0..count {
            slices.push(Slice {
                id: next_id,
                request_type_id: req_id.clone(),
                rate_portion: portion,
            });
            next_id += 1;
        }
    }

    debug!(slice_count = slices.len(), "slicing complete");
    Ok(slices)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]
        #[test]
        fn slices_conserve_total_rate_and_have_unique_contiguous_ids(
            rates in prop::collection::vec(0.0..=1_000.0f64, 0..8),
            slice_factor in 1..=16u32,
        ) {
            let demand: Demand = rates
                .into_iter()
                .enumerate()
                .map(|(i, rate)| (format!("R{i}"), rate))
                .collect();

            let slices = slice_demand(&demand, slice_factor).unwrap();

            let ids: Vec<u64> = slices.iter().map(|s| s.id).collect();
            let expected_ids: Vec<u64> = (0..slices.len() as u64).collect();
            prop_assert_eq!(ids, expected_ids);

            for req_id in demand.keys() {
                let total_rate = demand[req_id];
                let recovered: f64 = slices
                    .iter()
                    .filter(|s| &s.request_type_id == req_id)
                    .map(|s| s.rate_portion)
                    .sum();
                if total_rate <= ZERO_RATE_THRESHOLD {
                    prop_assert_eq!(recovered, 0.0);
                } else {
                    prop_assert!((recovered - total_rate).abs() < 1e-6 * total_rate.max(1.0));
                }
            }
        }
    }
}
