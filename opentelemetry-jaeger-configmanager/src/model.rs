//! Payloads returned by a [`ClientConfigManager`].
//!
//! These mirror the Jaeger remote sampling and baggage restriction APIs. The
//! proxy never inspects them, it only hands them back to the caller.
//!
//! [`ClientConfigManager`]: crate::ClientConfigManager

use serde::{Deserialize, Serialize};

/// ProbabilisticSamplingStrategy samples traces with a fixed probability.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilisticSamplingStrategy {
    /// samplingRate is the sampling probability in the range [0.0, 1.0].
    pub sampling_rate: f64,
}

/// RateLimitingSamplingStrategy samples a fixed number of traces per time interval.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitingSamplingStrategy {
    /// Upper bound of traces sampled per second.
    pub max_traces_per_second: i32,
}

/// OperationSamplingStrategy is a sampling strategy for a given operation
/// (aka endpoint, span name). Only probabilistic sampling is supported.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationSamplingStrategy {
    /// Name of the operation the strategy applies to.
    pub operation: String,
    /// Probabilistic strategy used for this operation.
    pub probabilistic_sampling: ProbabilisticSamplingStrategy,
}

/// PerOperationSamplingStrategies is a combination of strategies for different endpoints
/// as well as some service-wide defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerOperationSamplingStrategies {
    /// Sampling probability for spans that do not match any of the per operation strategies.
    pub default_sampling_probability: f64,
    /// Lower-bound rate limit applied to every operation. The limit is local to a
    /// service instance.
    pub default_lower_bound_traces_per_second: f64,
    /// Strategies for individual operations within a given service.
    #[serde(default)]
    pub per_operation_strategies: Vec<OperationSamplingStrategy>,
    /// Upper bound rate limit. Almost no Jaeger SDKs support this parameter.
    #[serde(default)]
    pub default_upper_bound_traces_per_second: f64,
}

/// See description of the [`SamplingStrategyResponse::strategy_type`] field.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SamplingStrategyType {
    /// Sample with a fixed probability.
    #[default]
    Probabilistic,
    /// Sample a fixed number of traces per second.
    RateLimiting,
}

/// SamplingStrategyResponse contains an overall sampling strategy for a given service.
///
/// This type should be treated as a union where only one of the strategy fields is present.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SamplingStrategyResponse {
    /// Legacy field that was meant to indicate which one of the strategy fields
    /// below is present. Consumers should check the other fields instead,
    /// starting with `operation_sampling`.
    pub strategy_type: SamplingStrategyType,
    /// Present for probabilistic strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilistic_sampling: Option<ProbabilisticSamplingStrategy>,
    /// Present for rate limiting strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limiting_sampling: Option<RateLimitingSamplingStrategy>,
    /// Present for per operation strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_sampling: Option<PerOperationSamplingStrategies>,
}

impl SamplingStrategyResponse {
    /// A probabilistic strategy sampling with `sampling_rate`.
    pub fn probabilistic(sampling_rate: f64) -> Self {
        SamplingStrategyResponse {
            strategy_type: SamplingStrategyType::Probabilistic,
            probabilistic_sampling: Some(ProbabilisticSamplingStrategy { sampling_rate }),
            ..Default::default()
        }
    }

    /// A rate limiting strategy sampling at most `max_traces_per_second`.
    pub fn rate_limiting(max_traces_per_second: i32) -> Self {
        SamplingStrategyResponse {
            strategy_type: SamplingStrategyType::RateLimiting,
            rate_limiting_sampling: Some(RateLimitingSamplingStrategy {
                max_traces_per_second,
            }),
            ..Default::default()
        }
    }
}

/// BaggageRestriction limits a baggage key to values of at most `max_value_length` bytes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct BaggageRestriction {
    /// The restricted baggage key.
    pub baggage_key: String,
    /// Maximum length of the baggage value.
    pub max_value_length: i32,
}

impl BaggageRestriction {
    /// Create a restriction for `baggage_key`.
    pub fn new<K: Into<String>>(baggage_key: K, max_value_length: i32) -> Self {
        BaggageRestriction {
            baggage_key: baggage_key.into(),
            max_value_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_probabilistic_strategy() {
        let raw = r#"{"strategyType":"PROBABILISTIC","probabilisticSampling":{"samplingRate":0.25}}"#;
        let resp: SamplingStrategyResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp, SamplingStrategyResponse::probabilistic(0.25));
    }

    #[test]
    fn deserialize_per_operation_strategy() {
        let raw = r#"{
            "strategyType": "PROBABILISTIC",
            "operationSampling": {
                "defaultSamplingProbability": 0.1,
                "defaultLowerBoundTracesPerSecond": 2.0,
                "perOperationStrategies": [
                    {"operation": "GET /", "probabilisticSampling": {"samplingRate": 1.0}}
                ]
            }
        }"#;
        let resp: SamplingStrategyResponse = serde_json::from_str(raw).unwrap();
        let per_op = resp.operation_sampling.expect("per operation strategies");
        assert_eq!(per_op.per_operation_strategies.len(), 1);
        assert_eq!(per_op.per_operation_strategies[0].operation, "GET /");
        assert_eq!(per_op.default_upper_bound_traces_per_second, 0.0);
        assert!(resp.probabilistic_sampling.is_none());
    }

    #[test]
    fn rate_limiting_uses_screaming_case() {
        let json = serde_json::to_value(SamplingStrategyResponse::rate_limiting(10)).unwrap();
        assert_eq!(json["strategyType"], "RATE_LIMITING");
        assert_eq!(json["rateLimitingSampling"]["maxTracesPerSecond"], 10);
        assert!(json.get("probabilisticSampling").is_none());
    }

    #[test]
    fn baggage_restriction_field_names() {
        let json = serde_json::to_value(BaggageRestriction::new("user-id", 64)).unwrap();
        assert_eq!(json["baggageKey"], "user-id");
        assert_eq!(json["maxValueLength"], 64);
    }
}
