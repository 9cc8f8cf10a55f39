//! Outcome metrics for Jaeger client configuration managers.
//!
//! A Jaeger agent answers its clients' sampling strategy and baggage
//! restriction requests by asking the collector. This crate provides
//! [`ManagerWithMetrics`], a [`ClientConfigManager`] that forwards every call
//! to the manager it wraps and counts how each call ended.
//!
//! Every call increments one counter of the `collector-proxy` metric:
//!
//! | `endpoint` | `result` | incremented when |
//! |------------|----------|------------------|
//! | `sampling` | `ok`     | a sampling strategy was returned |
//! | `sampling` | `err`    | the sampling strategy request failed or was cancelled |
//! | `baggage`  | `ok`     | baggage restrictions were returned |
//! | `baggage`  | `err`    | the baggage restrictions request failed or was cancelled |
//!
//! The proxy does not retry, cache or rewrite anything: payloads and errors
//! reach the caller exactly as the wrapped manager produced them.
//!
//! Counters come from a [`MetricsFactory`]. Any OpenTelemetry
//! [`Meter`](opentelemetry::metrics::Meter) is one.
//!
//! ```no_run
//! use opentelemetry::{global, Context};
//! use opentelemetry_jaeger_configmanager::{
//!     wrap_with_metrics, ClientConfigManager, ManagerWithMetrics,
//! };
//!
//! # async fn fetch<M: ClientConfigManager>(grpc_manager: M) {
//! let meter = global::meter("jaeger-agent");
//! let manager: ManagerWithMetrics<M> = wrap_with_metrics(grpc_manager, &meter);
//!
//! match manager
//!     .get_baggage_restrictions(&Context::current(), "frontend")
//!     .await
//! {
//!     Ok(restrictions) => println!("{} restrictions", restrictions.len()),
//!     Err(err) => eprintln!("{}", err),
//! }
//! # }
//! ```
//!
//! # Configuration
//!
//! [`ManagerWithMetricsBuilder::from_env`] reads:
//!
//! * `OTEL_JAEGER_CONFIGMANAGER_METRICS_NAMESPACE`: prefix for the metric name.
//! * `OTEL_JAEGER_CONFIGMANAGER_METRIC_NAME`: replaces `collector-proxy`.
//!
//! Values that are not valid instrument names are ignored with a warning.
//! The other constructors never read the environment.
//!
//! # Crate Feature Flags
//!
//! * `internal-logs`: emit diagnostics through `tracing`. Enabled by default.
//! * `testing`: exposes [`testing::LocalMetricsFactory`], an in-memory counter registry.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/open-telemetry/opentelemetry-rust/main/assets/logo.svg"
)]
#![cfg_attr(test, deny(warnings))]

mod client;
mod env;
mod error;
pub mod metrics;
pub mod model;
mod proxy;

/// Utilities for testing code that records metrics through this crate.
#[cfg(any(feature = "testing", test))]
#[cfg_attr(docsrs, doc(cfg(any(feature = "testing", test))))]
pub mod testing;

pub use client::ClientConfigManager;
pub use error::{ConfigManagerError, Result};
pub use model::{BaggageRestriction, SamplingStrategyResponse};
pub use proxy::{
    wrap_with_metrics, ConfigManagerMetrics, Endpoint, ManagerWithMetrics,
    ManagerWithMetricsBuilder, Outcome, COLLECTOR_PROXY_METRIC,
};
