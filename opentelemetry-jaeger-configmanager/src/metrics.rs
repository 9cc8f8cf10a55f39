//! Counter registry abstraction used by the metrics proxy.
//!
//! A [`MetricsFactory`] hands out bound [`Counter`]s: a metric name plus a
//! fixed set of tags. An OpenTelemetry [`Meter`] is a factory out of the box,
//! [`NoopMetricsFactory`] discards everything. [`MetricsFactory::namespace`]
//! scopes any factory under a [`Namespace`].
use opentelemetry::metrics::Meter;
use opentelemetry::KeyValue;
use std::borrow::Cow;
use std::fmt::Debug;

/// A monotonically increasing counter bound to its tags.
///
/// Implementations must not lose increments made concurrently from
/// multiple threads.
pub trait Counter: Debug + Send + Sync {
    /// Add `delta` to the counter.
    fn inc(&self, delta: u64);
}

/// Description of a counter requested from a [`MetricsFactory`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CounterOptions {
    /// Metric name. Counters sharing a name are told apart by their tags.
    pub name: Cow<'static, str>,
    /// Human readable description of the metric.
    pub description: Cow<'static, str>,
    /// Tags bound to every increment of the counter.
    pub tags: Vec<KeyValue>,
}

impl CounterOptions {
    /// Options for a counter called `name` without tags.
    pub fn new<N: Into<Cow<'static, str>>>(name: N) -> Self {
        CounterOptions {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description<D: Into<Cow<'static, str>>>(self, description: D) -> Self {
        CounterOptions {
            description: description.into(),
            ..self
        }
    }

    /// Append tags.
    pub fn with_tags<T: IntoIterator<Item = KeyValue>>(mut self, tags: T) -> Self {
        self.tags.extend(tags);
        self
    }
}

/// Scope applied to every counter created through it.
///
/// The namespace name prefixes metric names, joined with a `.`. Namespace
/// tags come before the counter's own tags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Namespace {
    /// Prefix for metric names. Empty names are ignored.
    pub name: Option<Cow<'static, str>>,
    /// Tags added to every counter.
    pub tags: Vec<KeyValue>,
}

impl Namespace {
    /// A namespace prefixing metric names with `name`.
    pub fn new<N: Into<Cow<'static, str>>>(name: N) -> Self {
        Namespace {
            name: Some(name.into()),
            tags: Vec::new(),
        }
    }

    /// Append tags.
    pub fn with_tags<T: IntoIterator<Item = KeyValue>>(mut self, tags: T) -> Self {
        self.tags.extend(tags);
        self
    }

    pub(crate) fn apply(&self, options: &CounterOptions) -> CounterOptions {
        let name = match self.name.as_deref() {
            Some(prefix) if !prefix.is_empty() => {
                Cow::Owned(format!("{}.{}", prefix, options.name))
            }
            _ => options.name.clone(),
        };

        CounterOptions {
            name,
            description: options.description.clone(),
            tags: self
                .tags
                .iter()
                .chain(options.tags.iter())
                .cloned()
                .collect(),
        }
    }
}

/// Creates named, tagged counters.
pub trait MetricsFactory: Debug + Send + Sync {
    /// Create a counter described by `options`.
    fn counter(&self, options: &CounterOptions) -> Box<dyn Counter>;

    /// A factory creating every counter inside `namespace`.
    fn namespace(&self, namespace: Namespace) -> NamespacedFactory<'_, Self>
    where
        Self: Sized,
    {
        NamespacedFactory::new(self, namespace)
    }
}

/// A [`MetricsFactory`] applying a [`Namespace`] before delegating to the
/// factory it was created from.
#[derive(Debug)]
pub struct NamespacedFactory<'a, F: ?Sized> {
    inner: &'a F,
    namespace: Namespace,
}

impl<'a, F: MetricsFactory + ?Sized> NamespacedFactory<'a, F> {
    /// Scope `inner` under `namespace`.
    pub fn new(inner: &'a F, namespace: Namespace) -> Self {
        NamespacedFactory { inner, namespace }
    }
}

impl<F: MetricsFactory + ?Sized> MetricsFactory for NamespacedFactory<'_, F> {
    fn counter(&self, options: &CounterOptions) -> Box<dyn Counter> {
        self.inner.counter(&self.namespace.apply(options))
    }
}

// maximum length of an instrument name
const METRIC_NAME_MAX_LENGTH: usize = 255;
const METRIC_NAME_ALLOWED_NON_ALPHANUMERIC_CHARS: [char; 4] = ['_', '.', '-', '/'];

/// Whether `name` is accepted as an OpenTelemetry instrument name.
///
/// Instruments with other names are dropped by the SDK.
pub(crate) fn is_valid_metric_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= METRIC_NAME_MAX_LENGTH
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && !name.contains(|c: char| {
            !c.is_ascii_alphanumeric() && !METRIC_NAME_ALLOWED_NON_ALPHANUMERIC_CHARS.contains(&c)
        })
}

/// Backs counters with an OpenTelemetry `u64` counter instrument.
impl MetricsFactory for Meter {
    fn counter(&self, options: &CounterOptions) -> Box<dyn Counter> {
        let mut builder = self.u64_counter(options.name.clone());
        if !options.description.is_empty() {
            builder = builder.with_description(options.description.clone());
        }
        Box::new(InstrumentCounter {
            counter: builder.build(),
            attributes: options.tags.clone(),
        })
    }
}

#[derive(Debug)]
struct InstrumentCounter {
    counter: opentelemetry::metrics::Counter<u64>,
    attributes: Vec<KeyValue>,
}

impl Counter for InstrumentCounter {
    fn inc(&self, delta: u64) {
        self.counter.add(delta, &self.attributes);
    }
}

/// A factory whose counters ignore every increment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetricsFactory {
    _private: (),
}

impl NoopMetricsFactory {
    /// Create a new no-op factory.
    pub fn new() -> Self {
        NoopMetricsFactory { _private: () }
    }
}

impl MetricsFactory for NoopMetricsFactory {
    fn counter(&self, _options: &CounterOptions) -> Box<dyn Counter> {
        Box::new(NoopCounter { _private: () })
    }
}

#[derive(Debug)]
struct NoopCounter {
    _private: (),
}

impl Counter for NoopCounter {
    fn inc(&self, _delta: u64) {
        // Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LocalMetricsFactory;

    #[test]
    fn namespace_prefixes_name_and_tags() {
        let options = CounterOptions::new("collector-proxy")
            .with_description("desc")
            .with_tags([KeyValue::new("result", "ok")]);
        let namespace = Namespace::new("jaeger_agent").with_tags([KeyValue::new("host", "a")]);

        let applied = namespace.apply(&options);
        assert_eq!(applied.name, "jaeger_agent.collector-proxy");
        assert_eq!(applied.description, "desc");
        assert_eq!(
            applied.tags,
            vec![KeyValue::new("host", "a"), KeyValue::new("result", "ok")]
        );
    }

    #[test]
    fn empty_namespace_keeps_name() {
        let options = CounterOptions::new("collector-proxy");
        assert_eq!(Namespace::new("").apply(&options).name, "collector-proxy");
        assert_eq!(Namespace::default().apply(&options), options);
    }

    #[test]
    fn namespaced_factory_applies_namespace() {
        let factory = LocalMetricsFactory::new();
        let namespaced =
            factory.namespace(Namespace::new("agent").with_tags([KeyValue::new("zone", "eu")]));

        namespaced
            .counter(&CounterOptions::new("calls").with_tags([KeyValue::new("result", "ok")]))
            .inc(2);

        assert_eq!(
            factory.counter_value("agent.calls", &[("zone", "eu"), ("result", "ok")]),
            2
        );
        assert_eq!(factory.counter_value("calls", &[("result", "ok")]), 0);
    }

    #[test]
    fn metric_name_validation() {
        for (name, valid) in [
            ("collector-proxy", true),
            ("jaeger_agent.collector-proxy", true),
            ("allow/slash", true),
            ("", false),
            ("jaeger agent.collector-proxy", false),
            ("_leading_underscore", false),
            ("9lives", false),
            ("utf8char锈", false),
        ] {
            assert_eq!(is_valid_metric_name(name), valid, "{}", name);
        }
        assert!(is_valid_metric_name(&"a".repeat(255)));
        assert!(!is_valid_metric_name(&"a".repeat(256)));
    }

    #[test]
    fn noop_counter_accepts_increments() {
        let counter = NoopMetricsFactory::new().counter(&CounterOptions::new("noop"));
        counter.inc(1);
        counter.inc(u64::MAX);
    }
}
