use crate::error::Result;
use crate::model::{BaggageRestriction, SamplingStrategyResponse};
use async_trait::async_trait;
use opentelemetry::Context;
use std::fmt::Debug;
use std::sync::Arc;

/// A minimal interface for retrieving client configuration from a collector.
///
/// Implementations own the transport. Users bring whichever client fits their
/// runtime, the same way [`HttpClient`] is brought to the remote sampler.
///
/// Implementations must be safe to call concurrently.
///
/// [`HttpClient`]: https://docs.rs/opentelemetry-http/latest/opentelemetry_http/trait.HttpClient.html
#[async_trait]
pub trait ClientConfigManager: Debug + Send + Sync {
    /// Fetch the sampling strategy for `service_name`.
    ///
    /// `cx` is the caller's context and is passed through untouched. Dropping
    /// the returned future cancels the request.
    async fn get_sampling_strategy(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<SamplingStrategyResponse>;

    /// Fetch the baggage restrictions for `service_name`, in the order the
    /// collector returned them.
    async fn get_baggage_restrictions(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<Vec<BaggageRestriction>>;
}

#[async_trait]
impl<T: ClientConfigManager + ?Sized> ClientConfigManager for Arc<T> {
    async fn get_sampling_strategy(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<SamplingStrategyResponse> {
        (**self).get_sampling_strategy(cx, service_name).await
    }

    async fn get_baggage_restrictions(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<Vec<BaggageRestriction>> {
        (**self).get_baggage_restrictions(cx, service_name).await
    }
}

#[async_trait]
impl<T: ClientConfigManager + ?Sized> ClientConfigManager for Box<T> {
    async fn get_sampling_strategy(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<SamplingStrategyResponse> {
        (**self).get_sampling_strategy(cx, service_name).await
    }

    async fn get_baggage_restrictions(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<Vec<BaggageRestriction>> {
        (**self).get_baggage_restrictions(cx, service_name).await
    }
}

#[async_trait]
impl<T: ClientConfigManager + ?Sized> ClientConfigManager for &T {
    async fn get_sampling_strategy(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<SamplingStrategyResponse> {
        (**self).get_sampling_strategy(cx, service_name).await
    }

    async fn get_baggage_restrictions(
        &self,
        cx: &Context,
        service_name: &str,
    ) -> Result<Vec<BaggageRestriction>> {
        (**self).get_baggage_restrictions(cx, service_name).await
    }
}
