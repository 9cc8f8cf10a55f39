// Run this benchmark with:
// cargo bench --bench proxy
use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};
use futures_executor::block_on;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::Context;
use opentelemetry_jaeger_configmanager::metrics::NoopMetricsFactory;
use opentelemetry_jaeger_configmanager::{
    wrap_with_metrics, BaggageRestriction, ClientConfigManager, Result, SamplingStrategyResponse,
};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};

#[derive(Debug)]
struct ImmediateManager;

#[async_trait]
impl ClientConfigManager for ImmediateManager {
    async fn get_sampling_strategy(
        &self,
        _cx: &Context,
        _service_name: &str,
    ) -> Result<SamplingStrategyResponse> {
        Ok(SamplingStrategyResponse::probabilistic(1.0))
    }

    async fn get_baggage_restrictions(
        &self,
        _cx: &Context,
        _service_name: &str,
    ) -> Result<Vec<BaggageRestriction>> {
        Ok(Vec::new())
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let cx = Context::new();

    c.bench_function("SamplingStrategy_Direct", |b| {
        b.iter(|| block_on(ImmediateManager.get_sampling_strategy(&cx, "bench")))
    });

    let noop = wrap_with_metrics(ImmediateManager, &NoopMetricsFactory::new());
    c.bench_function("SamplingStrategy_NoopMetrics", |b| {
        b.iter(|| block_on(noop.get_sampling_strategy(&cx, "bench")))
    });

    let meter_provider = SdkMeterProvider::builder()
        .with_periodic_exporter(InMemoryMetricExporter::default())
        .build();
    let sdk = wrap_with_metrics(ImmediateManager, &meter_provider.meter("benchmarks"));
    c.bench_function("SamplingStrategy_SdkMetrics", |b| {
        b.iter(|| block_on(sdk.get_sampling_strategy(&cx, "bench")))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
