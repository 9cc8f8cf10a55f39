//! The metrics proxy.
//!
//! [`ManagerWithMetrics`] forwards calls to a wrapped [`ClientConfigManager`]
//! and counts how each one ended in the `collector-proxy` counters.
use crate::client::ClientConfigManager;
use crate::env;
use crate::error::{ConfigManagerError, Result};
use crate::metrics::{
    is_valid_metric_name, Counter, CounterOptions, MetricsFactory, Namespace, NamespacedFactory,
};
use crate::model::{BaggageRestriction, SamplingStrategyResponse};
use async_trait::async_trait;
use opentelemetry::{otel_debug, otel_warn, Context, KeyValue};
use std::borrow::Cow;

/// Metric name shared by every outcome counter.
pub const COLLECTOR_PROXY_METRIC: &str = "collector-proxy";

const COLLECTOR_PROXY_DESCRIPTION: &str =
    "Number of client configuration responses received from the collector";

const ENDPOINT_KEY: &str = "endpoint";
const RESULT_KEY: &str = "result";

/// Remote operation proxied to the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Sampling strategy requests.
    Sampling,
    /// Baggage restriction requests.
    Baggage,
}

impl Endpoint {
    /// Value of the `endpoint` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Sampling => "sampling",
            Endpoint::Baggage => "baggage",
        }
    }
}

/// How a proxied call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The wrapped manager returned a payload.
    Ok,
    /// The wrapped manager returned an error, or the call was cancelled.
    Err,
}

impl Outcome {
    /// Value of the `result` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Err => "err",
        }
    }
}

// One counter per (endpoint, outcome), laid out so that
// `endpoint as usize * 2 + outcome as usize` indexes it.
const OUTCOME_COUNTERS: [(Endpoint, Outcome); 4] = [
    (Endpoint::Sampling, Outcome::Ok),
    (Endpoint::Sampling, Outcome::Err),
    (Endpoint::Baggage, Outcome::Ok),
    (Endpoint::Baggage, Outcome::Err),
];

fn counter_index(endpoint: Endpoint, outcome: Outcome) -> usize {
    endpoint as usize * 2 + outcome as usize
}

/// The outcome counters of a [`ManagerWithMetrics`].
#[derive(Debug)]
pub struct ConfigManagerMetrics {
    counters: [Box<dyn Counter>; 4],
}

impl ConfigManagerMetrics {
    /// Create the four outcome counters of `metric_name` through `factory`.
    ///
    /// Use a [`NamespacedFactory`] to create them inside a namespace.
    pub fn new<F>(factory: &F, metric_name: Cow<'static, str>) -> Self
    where
        F: MetricsFactory + ?Sized,
    {
        let counters = OUTCOME_COUNTERS.map(|(endpoint, outcome)| {
            factory.counter(
                &CounterOptions::new(metric_name.clone())
                    .with_description(COLLECTOR_PROXY_DESCRIPTION)
                    .with_tags([
                        KeyValue::new(RESULT_KEY, outcome.as_str()),
                        KeyValue::new(ENDPOINT_KEY, endpoint.as_str()),
                    ]),
            )
        });
        ConfigManagerMetrics { counters }
    }

    fn record(&self, endpoint: Endpoint, outcome: Outcome) {
        self.counters[counter_index(endpoint, outcome)].inc(1);
    }

    fn start(&self, endpoint: Endpoint) -> PendingCall<'_> {
        PendingCall {
            metrics: self,
            endpoint,
            finished: false,
        }
    }
}

// Records a failure if dropped before `finish`, which happens when the
// caller drops the request future while the wrapped call is in flight.
struct PendingCall<'a> {
    metrics: &'a ConfigManagerMetrics,
    endpoint: Endpoint,
    finished: bool,
}

impl PendingCall<'_> {
    fn finish(mut self, outcome: Outcome) {
        self.finished = true;
        self.metrics.record(self.endpoint, outcome);
    }
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        if !self.finished {
            otel_debug!(
                name: "ManagerWithMetrics.CallCancelled",
                endpoint = self.endpoint.as_str()
            );
            self.metrics.record(self.endpoint, Outcome::Err);
        }
    }
}

/// Builder for [`ManagerWithMetrics`].
#[derive(Debug)]
pub struct ManagerWithMetricsBuilder<M> {
    manager: M,
    metric_name: Cow<'static, str>,
    namespace: Option<Namespace>,
}

impl<M: ClientConfigManager> ManagerWithMetricsBuilder<M> {
    /// Start building a proxy around `manager`.
    pub fn new(manager: M) -> Self {
        ManagerWithMetricsBuilder {
            manager,
            metric_name: Cow::Borrowed(COLLECTOR_PROXY_METRIC),
            namespace: None,
        }
    }

    /// Start building a proxy around `manager`, configured from the
    /// `OTEL_JAEGER_CONFIGMANAGER_*` environment variables.
    ///
    /// Options set afterwards take precedence.
    pub fn from_env(manager: M) -> Self {
        env::assign_attrs(Self::new(manager))
    }

    /// Use `name` instead of `collector-proxy` as the metric name.
    ///
    /// If the full metric name is not a valid instrument name, [`build`]
    /// falls back to `collector-proxy` outside of any namespace name.
    ///
    /// [`build`]: ManagerWithMetricsBuilder::build
    pub fn with_metric_name<N: Into<Cow<'static, str>>>(self, name: N) -> Self {
        ManagerWithMetricsBuilder {
            metric_name: name.into(),
            ..self
        }
    }

    /// Create the counters inside `namespace`, replacing any namespace set
    /// before.
    pub fn with_namespace(self, namespace: Namespace) -> Self {
        ManagerWithMetricsBuilder {
            namespace: Some(namespace),
            ..self
        }
    }

    /// Prefix the metric name with `name`. Tags of a namespace set before
    /// are kept.
    pub fn with_namespace_name<N: Into<Cow<'static, str>>>(mut self, name: N) -> Self {
        self.namespace.get_or_insert_with(Namespace::default).name = Some(name.into());
        self
    }

    /// Register the outcome counters with `factory` and wrap the manager.
    pub fn build<F>(self, factory: &F) -> ManagerWithMetrics<M>
    where
        F: MetricsFactory + ?Sized,
    {
        let full_name = match &self.namespace {
            Some(namespace) => {
                namespace
                    .apply(&CounterOptions::new(self.metric_name.clone()))
                    .name
            }
            None => self.metric_name.clone(),
        };

        let (metric_name, namespace) = if is_valid_metric_name(&full_name) {
            (self.metric_name, self.namespace)
        } else {
            otel_warn!(
                name: "ManagerWithMetrics.InvalidMetricName",
                metric_name = &*full_name,
                fallback = COLLECTOR_PROXY_METRIC
            );
            let namespace = self.namespace.map(|namespace| Namespace {
                name: None,
                tags: namespace.tags,
            });
            (Cow::Borrowed(COLLECTOR_PROXY_METRIC), namespace)
        };

        otel_debug!(
            name: "ManagerWithMetrics.Built",
            metric_name = &*metric_name,
            namespace = namespace
                .as_ref()
                .and_then(|namespace| namespace.name.as_deref())
                .unwrap_or_default()
        );
        let metrics = match namespace {
            Some(namespace) => {
                ConfigManagerMetrics::new(&NamespacedFactory::new(factory, namespace), metric_name)
            }
            None => ConfigManagerMetrics::new(factory, metric_name),
        };

        ManagerWithMetrics {
            wrapped: self.manager,
            metrics,
        }
    }
}

/// A [`ClientConfigManager`] counting the outcome of every call it forwards.
///
/// Each call increments exactly one `collector-proxy` counter, tagged with
/// `endpoint` (`sampling` or `baggage`) and `result` (`ok` or `err`), once the
/// wrapped call has completed. Results are returned untouched.
///
/// ## Examples
///
/// ```no_run
/// # use opentelemetry::{global, Context};
/// # use opentelemetry_jaeger_configmanager::{wrap_with_metrics, ClientConfigManager};
/// # async fn run<M: ClientConfigManager>(manager: M) {
/// let meter = global::meter("jaeger-agent");
/// let manager = wrap_with_metrics(manager, &meter);
///
/// let strategy = manager
///     .get_sampling_strategy(&Context::current(), "frontend")
///     .await;
/// # }
/// ```
#[derive(Debug)]
pub struct ManagerWithMetrics<M> {
    wrapped: M,
    metrics: ConfigManagerMetrics,
}

impl<M: ClientConfigManager> ManagerWithMetrics<M> {
    /// Create a [`ManagerWithMetricsBuilder`] around `manager`.
    pub fn builder(manager: M) -> ManagerWithMetricsBuilder<M> {
        ManagerWithMetricsBuilder::new(manager)
    }

    /// The wrapped manager.
    pub fn inner(&self) -> &M {
        &self.wrapped
    }
}

/// Wrap `manager` and register its outcome counters with `factory`.
pub fn wrap_with_metrics<M, F>(manager: M, factory: &F) -> ManagerWithMetrics<M>
where
    M: ClientConfigManager,
    F: MetricsFactory + ?Sized,
{
    ManagerWithMetricsBuilder::new(manager).build(factory)
}

#[cfg(feature = "internal-logs")]
fn log_failure(endpoint: Endpoint, service_name: &str, err: &ConfigManagerError) {
    let error = err.to_string();
    match endpoint {
        Endpoint::Sampling => {
            otel_debug!(
                name: "ManagerWithMetrics.SamplingStrategyFailed",
                service_name = service_name,
                error = error.as_str()
            );
        }
        Endpoint::Baggage => {
            otel_debug!(
                name: "ManagerWithMetrics.BaggageRestrictionsFailed",
                service_name = service_name,
                error = error.as_str()
            );
        }
    }
}

#[cfg(not(feature = "internal-logs"))]
fn log_failure(_endpoint: Endpoint, _service_name: &str, _err: &ConfigManagerError) {}

#[async_trait]
impl<M: ClientConfigManager> ClientConfigManager for ManagerWithMetrics<M> {
    async fn get_sampling_strategy(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<SamplingStrategyResponse> {
        let call = self.metrics.start(Endpoint::Sampling);
        let result = self.wrapped.get_sampling_strategy(cx, service_name).await;
        match &result {
            Ok(_) => call.finish(Outcome::Ok),
            Err(err) => {
                log_failure(Endpoint::Sampling, service_name, err);
                call.finish(Outcome::Err)
            }
        }
        result
    }

    async fn get_baggage_restrictions(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<Vec<BaggageRestriction>> {
        let call = self.metrics.start(Endpoint::Baggage);
        let result = self.wrapped.get_baggage_restrictions(cx, service_name).await;
        match &result {
            Ok(_) => call.finish(Outcome::Ok),
            Err(err) => {
                log_failure(Endpoint::Baggage, service_name, err);
                call.finish(Outcome::Err)
            }
        }
        result
    }
}
