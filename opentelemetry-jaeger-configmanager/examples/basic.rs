//! run with `$ cargo run --example basic`
use async_trait::async_trait;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::Context;
use opentelemetry_jaeger_configmanager::{
    BaggageRestriction, ClientConfigManager, ConfigManagerError, ManagerWithMetrics, Result,
    SamplingStrategyResponse,
};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Stands in for a manager talking to a real collector.
#[derive(Debug)]
struct StaticManager;

#[async_trait]
impl ClientConfigManager for StaticManager {
    async fn get_sampling_strategy(
        &self,
        _cx: &Context,
        service_name: &str,
    ) -> Result<SamplingStrategyResponse> {
        match service_name {
            "frontend" => Ok(SamplingStrategyResponse::probabilistic(0.1)),
            "checkout" => Ok(SamplingStrategyResponse::rate_limiting(5)),
            _ => Err(ConfigManagerError::sampling_strategy(
                service_name,
                "no strategy configured",
            )),
        }
    }

    async fn get_baggage_restrictions(
        &self,
        _cx: &Context,
        _service_name: &str,
    ) -> Result<Vec<BaggageRestriction>> {
        Ok(vec![BaggageRestriction::new("user-id", 36)])
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        EnvFilter::new("info").add_directive("opentelemetry-jaeger-configmanager=debug".parse()?),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    let meter_provider = SdkMeterProvider::builder()
        .with_periodic_exporter(opentelemetry_stdout::MetricExporter::default())
        .build();
    let meter = meter_provider.meter("jaeger-agent");

    let manager = ManagerWithMetrics::builder(StaticManager)
        .with_namespace(opentelemetry_jaeger_configmanager::metrics::Namespace::new(
            "jaeger_agent",
        ))
        .build(&meter);

    let cx = Context::current();
    for service in ["frontend", "checkout", "unknown"] {
        match manager.get_sampling_strategy(&cx, service).await {
            Ok(strategy) => println!("{}: {:?}", service, strategy.strategy_type),
            Err(err) => println!("{}: {}", service, err),
        }
    }
    let restrictions = manager.get_baggage_restrictions(&cx, "frontend").await?;
    println!("frontend: {} baggage restrictions", restrictions.len());

    meter_provider.shutdown()?;
    Ok(())
}
