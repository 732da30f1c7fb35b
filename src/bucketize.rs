//! Power-of-two token-count bucketing (§4.7), grounded in the distribution
//! service's dataset-analysis step: given raw (input, output) token counts
//! per sample, group them into the same size buckets used by request-type
//! ids and aggregate rates the same way. Dataset download and tokenization
//! stay out of scope — callers supply token counts already computed.

use std::collections::HashMap;

use crate::domain::RequestType;

/// Maps a token count to its power-of-two bucket string. `n <= 1` collapses
/// to `"0-1"`; otherwise the bucket is `[2^k, 2^(k+1) - 1]` for
/// `k = floor(log2(n))`.
pub fn power_of_two_bucket(n: u64) -> String {
    if n <= 1 {
        return "0-1".to_string();
    }
    let k = 63 - n.leading_zeros();
    let lower = 1u64 << k;
    let upper = (1u64 << (k + 1)) - 1;
    format!("{lower}-{upper}")
}

/// One observed (input, output) token-count sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSample {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Turns raw samples into request types and a rate distribution, the same
/// shape `process_dataset.py` emits: each distinct (input bucket, output
/// bucket) pair becomes one request type, its rate proportional to the
/// share of samples that landed in it.
pub fn bucketize_samples(
    samples: &[TokenSample],
    latency_slo_ms: u32,
    total_request_rate: f64,
) -> (Vec<RequestType>, HashMap<String, f64>) {
    if samples.is_empty() {
        return (Vec::new(), HashMap::new());
    }

    let mut counts: HashMap<(String, String), u64> = HashMap::new();
    for sample in samples {
        let key = (
            power_of_two_bucket(sample.input_tokens),
            power_of_two_bucket(sample.output_tokens),
        );
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut keys: Vec<(String, String)> = counts.keys().cloned().collect();
    keys.sort_by_key(|(in_bucket, out_bucket)| (bucket_lower(in_bucket), bucket_lower(out_bucket)));

    let total_samples = samples.len() as f64;
    let mut request_types = Vec::with_capacity(keys.len());
    let mut demand = HashMap::with_capacity(keys.len());

    for (in_bucket, out_bucket) in keys {
        let id = format!(
            "req_in_{}_out_{}_tpot_{latency_slo_ms}ms",
            in_bucket.replace('-', "_"),
            out_bucket.replace('-', "_"),
        );
        let count = counts[&(in_bucket.clone(), out_bucket.clone())];
        let rate = (count as f64 / total_samples) * total_request_rate;

        request_types.push(RequestType {
            id: id.clone(),
            input_size_bucket: in_bucket,
            output_size_bucket: out_bucket,
            slo_ms: latency_slo_ms,
        });
        demand.insert(id, rate);
    }

    (request_types, demand)
}

fn bucket_lower(bucket: &str) -> u64 {
    bucket
        .split('-')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
