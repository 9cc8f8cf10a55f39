//! In-memory counter registry for tests.
use crate::metrics::{Counter, CounterOptions, MetricsFactory};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Tags = Vec<(String, String)>;
type Counters = BTreeMap<(String, Tags), Arc<AtomicU64>>;

/// A [`MetricsFactory`] keeping counter values in memory.
///
/// Counters created with the same name and tags share one value, so a value
/// can be looked up at any time with [`counter_value`]. Clones share the
/// registry; separately created factories never do.
///
/// [`counter_value`]: LocalMetricsFactory::counter_value
#[derive(Clone, Debug, Default)]
pub struct LocalMetricsFactory {
    counters: Arc<Mutex<Counters>>,
}

impl LocalMetricsFactory {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of the counter with `name` and `tags`, 0 if it was never created.
    ///
    /// Tag order does not matter.
    pub fn counter_value(&self, name: &str, tags: &[(&str, &str)]) -> u64 {
        let key = (
            name.to_string(),
            sorted(tags.iter().map(|(k, v)| (k.to_string(), v.to_string()))),
        );
        self.lock()
            .get(&key)
            .map(|value| value.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// All counters, keyed as `name|k1=v1|k2=v2` with tags sorted by key.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.lock()
            .iter()
            .map(|((name, tags), value)| {
                let mut key = name.clone();
                for (k, v) in tags {
                    key.push('|');
                    key.push_str(k);
                    key.push('=');
                    key.push_str(v);
                }
                (key, value.load(Ordering::SeqCst))
            })
            .collect()
    }

    /// Set every counter back to 0. Counters already handed out stay bound.
    pub fn reset(&self) {
        for value in self.lock().values() {
            value.store(0, Ordering::SeqCst);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricsFactory for LocalMetricsFactory {
    fn counter(&self, options: &CounterOptions) -> Box<dyn Counter> {
        let tags = sorted(
            options
                .tags
                .iter()
                .map(|kv| (kv.key.as_str().to_string(), kv.value.as_str().into_owned())),
        );
        let value = self
            .lock()
            .entry((options.name.to_string(), tags))
            .or_default()
            .clone();
        Box::new(LocalCounter { value })
    }
}

fn sorted<I: Iterator<Item = (String, String)>>(tags: I) -> Tags {
    let mut tags: Tags = tags.collect();
    tags.sort();
    tags
}

#[derive(Debug)]
struct LocalCounter {
    value: Arc<AtomicU64>,
}

impl Counter for LocalCounter {
    fn inc(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::KeyValue;
    use std::thread;

    #[test]
    fn same_name_and_tags_share_value() {
        let factory = LocalMetricsFactory::new();
        let options = CounterOptions::new("c")
            .with_tags([KeyValue::new("b", "2"), KeyValue::new("a", "1")]);
        factory.counter(&options).inc(1);
        factory.counter(&options).inc(2);

        assert_eq!(factory.counter_value("c", &[("a", "1"), ("b", "2")]), 3);
        assert_eq!(factory.counter_value("c", &[("a", "1")]), 0);
        assert_eq!(factory.counter_value("unknown", &[]), 0);
    }

    #[test]
    fn snapshot_and_reset() {
        let factory = LocalMetricsFactory::new();
        let counter = factory.counter(&CounterOptions::new("c").with_tags([KeyValue::new("k", "v")]));
        counter.inc(5);
        assert_eq!(factory.snapshot().get("c|k=v"), Some(&5));

        factory.reset();
        assert_eq!(factory.snapshot().get("c|k=v"), Some(&0));
        counter.inc(1);
        assert_eq!(factory.counter_value("c", &[("k", "v")]), 1);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let factory = LocalMetricsFactory::new();
        let counter: Arc<dyn Counter> = Arc::from(factory.counter(&CounterOptions::new("c")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.inc(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(factory.counter_value("c", &[]), 8000);
    }
}
