//! Capability interfaces and supplier adapters
//!
//! This module provides:
//! - The `Provider` contract shared by every adapter (configure, credential checks, connection test)
//! - One search trait per capability type
//! - HTTP client shared foundation with timeouts and retries
//! - Hotelbeds (hotel), Duffel (flight) and Viator (activity) adapters

pub mod client;
mod duffel;
mod hotelbeds;
mod viator;

pub use client::HttpClient;
pub use duffel::DuffelAdapter;
pub use hotelbeds::HotelbedsAdapter;
pub use viator::ViatorAdapter;

use crate::domain::{
    ActivitySearchCriteria, FlightSearchCriteria, HotelSearchCriteria, ProviderConfig,
    ProviderResponse, StandardizedActivity, StandardizedFlight, StandardizedHotel,
};
use crate::error::{ConfigurationError, ProviderError};
use async_trait::async_trait;
use std::time::Duration;

/// Contract every adapter satisfies regardless of capability
///
/// Credential validation is permissive on purpose: a credential counts as
/// present when it is non-blank after trimming, and no format checks are
/// made. Configuration screens rely on this to show partial setup state.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Unique registry key of this adapter
    fn name(&self) -> &'static str;

    /// Store the config and derive internal state from it
    ///
    /// Must not perform I/O. Calling it again with the same config has no
    /// further effect.
    fn configure(&mut self, config: ProviderConfig);

    /// Currently applied config
    fn config(&self) -> Option<&ProviderConfig>;

    /// Credential keys that must be non-blank
    fn required_credentials(&self) -> &'static [&'static str];

    /// Required keys that are absent or blank, in declaration order
    fn missing_credentials(&self) -> Vec<String> {
        match self.config() {
            Some(config) => config.missing_credentials(self.required_credentials()),
            None => self
                .required_credentials()
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }

    /// True iff enabled and every required credential is present
    fn is_configured(&self) -> bool {
        self.config().is_some_and(|c| c.enabled) && self.missing_credentials().is_empty()
    }

    /// Fails with the configuration problem, if any
    ///
    /// Missing credentials are reported before the disabled flag.
    fn ensure_configured(&self) -> Result<(), ConfigurationError> {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            return Err(ConfigurationError::MissingCredentials {
                provider: self.name().to_string(),
                missing,
            });
        }
        if !self.config().is_some_and(|c| c.enabled) {
            return Err(ConfigurationError::Disabled {
                provider: self.name().to_string(),
            });
        }
        Ok(())
    }

    /// Lightweight reachability check that never fails
    ///
    /// Returns `false` on any transport failure or when not configured. When
    /// the supplier exposes no usable health endpoint this reports `true` for
    /// a configured adapter, i.e. "configured" rather than "reachable".
    async fn test_connection(&self) -> bool;
}

/// Hotel inventory supplier
#[async_trait]
pub trait HotelProvider: Provider {
    async fn search(
        &self,
        criteria: &HotelSearchCriteria,
    ) -> Result<ProviderResponse<StandardizedHotel>, ProviderError>;
}

/// Flight inventory supplier
#[async_trait]
pub trait FlightProvider: Provider {
    async fn search(
        &self,
        criteria: &FlightSearchCriteria,
    ) -> Result<ProviderResponse<StandardizedFlight>, ProviderError>;
}

/// Tours and activities supplier
#[async_trait]
pub trait ActivityProvider: Provider {
    async fn search(
        &self,
        criteria: &ActivitySearchCriteria,
    ) -> Result<ProviderResponse<StandardizedActivity>, ProviderError>;
}

/// Resolve the base URL from the `endpoint` credential or a default
pub(crate) fn resolve_endpoint(config: &ProviderConfig, default: &str) -> String {
    config
        .credential("endpoint")
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

/// Build the HTTP client an adapter uses for a given config
pub(crate) fn client_for(config: &ProviderConfig) -> HttpClient {
    let client = HttpClient::new().with_max_retries(config.settings.retry_attempts.unwrap_or(0));
    match config.settings.timeout_duration() {
        Some(timeout) => client.with_timeout(timeout),
        None => client,
    }
}

/// Render a supplier amount (string or number) verbatim
pub(crate) fn amount_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Timeout for connection tests, never longer than the health-check cap
pub(crate) fn health_timeout(client: &HttpClient) -> Duration {
    client.timeout().min(client::HEALTH_CHECK_TIMEOUT)
}
