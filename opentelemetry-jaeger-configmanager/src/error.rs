//! Errors surfaced by a [`ClientConfigManager`].
//!
//! [`ClientConfigManager`]: crate::ClientConfigManager

use thiserror::Error;

/// Failure to retrieve client configuration from the collector.
///
/// The metrics proxy hands these back exactly as the wrapped manager produced
/// them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigManagerError {
    /// The sampling strategy for a service could not be fetched.
    #[error("failed to fetch sampling strategy for service {service}: {reason}")]
    SamplingStrategy {
        /// Service the strategy was requested for.
        service: String,
        /// Cause reported by the transport.
        reason: String,
    },

    /// The baggage restrictions for a service could not be fetched.
    #[error("failed to fetch baggage restrictions for service {service}: {reason}")]
    BaggageRestrictions {
        /// Service the restrictions were requested for.
        service: String,
        /// Cause reported by the transport.
        reason: String,
    },
}

impl ConfigManagerError {
    /// Sampling strategy failure for `service`.
    pub fn sampling_strategy<S, R>(service: S, reason: R) -> Self
    where
        S: Into<String>,
        R: Into<String>,
    {
        ConfigManagerError::SamplingStrategy {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Baggage restrictions failure for `service`.
    pub fn baggage_restrictions<S, R>(service: S, reason: R) -> Self
    where
        S: Into<String>,
        R: Into<String>,
    {
        ConfigManagerError::BaggageRestrictions {
            service: service.into(),
            reason: reason.into(),
        }
    }
}

/// Result type returned by [`ClientConfigManager`] operations.
///
/// [`ClientConfigManager`]: crate::ClientConfigManager
pub type Result<T> = std::result::Result<T, ConfigManagerError>;
