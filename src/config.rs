//! Operator-facing configuration surface for the optimizer, mirroring the
//! teacher's `SizingPolicy`/`InstanceConfig` pattern of a small, `Default`-
//! implementing struct carrying the tunables a single tick/run needs.

use std::time::Duration;

/// Tunables for one `solve()` invocation. `slice_factor` is the operator's
/// knob on the tightness/model-size tradeoff described in §4.1;
/// `time_limit` bounds solver wall-clock time, per §5's cancellation model.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OptimizerConfig {
    pub slice_factor: u32,
    #[serde(with = "duration_secs_opt", default)]
    pub time_limit: Option<Duration>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            slice_factor: 2,
            time_limit: None,
        }
    }
}

mod duration_secs_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs: Option<f64> = Option::deserialize(d)?;
        Ok(secs.map(Duration::from_secs_f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slice_factor_is_two() {
        assert_eq!(OptimizerConfig::default().slice_factor, 2);
        assert_eq!(OptimizerConfig::default().time_limit, None);
    }

    #[test]
    fn roundtrips_through_json_with_time_limit() {
        let config = OptimizerConfig {
            slice_factor: 4,
            time_limit: Some(Duration::from_secs_f64(30.0)),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: OptimizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.slice_factor, 4);
        assert_eq!(back.time_limit, Some(Duration::from_secs_f64(30.0)));
    }

    #[test]
    fn roundtrips_through_json_without_time_limit() {
        let config = OptimizerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: OptimizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.time_limit, None);
    }
}
