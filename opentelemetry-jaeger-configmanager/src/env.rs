//! Configuration of [`ManagerWithMetricsBuilder::from_env`] through
//! `OTEL_JAEGER_CONFIGMANAGER_*` environment variables.
use crate::client::ClientConfigManager;
use crate::metrics::is_valid_metric_name;
use crate::proxy::ManagerWithMetricsBuilder;
use opentelemetry::otel_warn;
use std::env;

/// Namespace prefixed to the outcome metric name.
/// e.g. "jaeger_agent"
pub(crate) const ENV_METRICS_NAMESPACE: &str = "OTEL_JAEGER_CONFIGMANAGER_METRICS_NAMESPACE";

/// Name of the outcome metric, "collector-proxy" when unset.
pub(crate) const ENV_METRIC_NAME: &str = "OTEL_JAEGER_CONFIGMANAGER_METRIC_NAME";

/// Assign builder attributes from env
pub(crate) fn assign_attrs<M: ClientConfigManager>(
    mut builder: ManagerWithMetricsBuilder<M>,
) -> ManagerWithMetricsBuilder<M> {
    if let Some(name) = valid_name_from_env(ENV_METRIC_NAME) {
        builder = builder.with_metric_name(name);
    }

    if let Some(namespace) = valid_name_from_env(ENV_METRICS_NAMESPACE) {
        builder = builder.with_namespace_name(namespace);
    }

    builder
}

// Unset and empty values are skipped, malformed ones are reported and skipped.
fn valid_name_from_env(key: &'static str) -> Option<String> {
    let value = env::var(key).ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if !is_valid_metric_name(value) {
        otel_warn!(
            name: "ManagerWithMetrics.MalformedEnvVar",
            env_var = key,
            value = value,
            message = "not a valid instrument name, ignoring"
        );
        return None;
    }
    Some(value.to_string())
}
