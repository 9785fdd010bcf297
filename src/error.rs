//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ConfigurationError: provider disabled or missing credentials (raised before any I/O)
//! - ProviderError: provider lookup, criteria validation and upstream failures
//! - StoreError: configuration persistence failures
//! - SettingsError: application settings file issues

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::CapabilityType;

/// Longest upstream body excerpt kept in an error message
const MAX_BODY_EXCERPT: usize = 200;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Provider related errors
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration persistence errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Settings file errors
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Setup problems detected without contacting the supplier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Required credentials are absent or blank
    #[error("provider '{provider}' is missing required credentials: {}", .missing.join(", "))]
    MissingCredentials {
        provider: String,
        missing: Vec<String>,
    },

    /// The provider config has `enabled = false` or was never set
    #[error("provider '{provider}' is disabled")]
    Disabled { provider: String },
}

/// Errors raised while resolving or calling a provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Setup failure, always raised before any network call
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// No adapter registered under that name
    #[error("{capability} provider '{provider}' is not registered")]
    NotFound {
        capability: CapabilityType,
        provider: String,
    },

    /// No name given and no active provider selected
    #[error("no active {capability} provider selected")]
    NoActiveProvider { capability: CapabilityType },

    /// Search criteria failed business validation
    #[error("invalid search criteria for '{provider}': {message}")]
    InvalidCriteria { provider: String, message: String },

    /// Transport failure, upstream error status or malformed payload
    #[error("provider '{provider}' failed: {message}")]
    Operational {
        provider: String,
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Errors related to configuration persistence
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("store IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored blob is not valid configuration JSON
    #[error("invalid configuration JSON under key '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors related to the application settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse TOML in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl ConfigurationError {
    /// Name of the provider that is not configured
    pub fn provider(&self) -> &str {
        match self {
            ConfigurationError::MissingCredentials { provider, .. }
            | ConfigurationError::Disabled { provider } => provider,
        }
    }

    /// Missing credential keys (empty when only disabled)
    pub fn missing(&self) -> &[String] {
        match self {
            ConfigurationError::MissingCredentials { missing, .. } => missing,
            ConfigurationError::Disabled { .. } => &[],
        }
    }
}

impl ProviderError {
    /// Creates a new NotFound error
    pub fn not_found(capability: CapabilityType, provider: impl Into<String>) -> Self {
        ProviderError::NotFound {
            capability,
            provider: provider.into(),
        }
    }

    /// Creates a new InvalidCriteria error
    pub fn invalid_criteria(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::InvalidCriteria {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wraps a transport failure
    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        let message = if source.is_timeout() {
            "request timed out: check connectivity and credentials".to_string()
        } else {
            format!(
                "network error ({}): check connectivity and credentials",
                source
            )
        };
        ProviderError::Operational {
            provider: provider.into(),
            message,
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Translates a non-success HTTP status and its body
    pub fn from_status(provider: impl Into<String>, status: u16, body: &str) -> Self {
        let detail = upstream_message(body);
        let message = match status {
            401 | 403 => format!(
                "authentication rejected (HTTP {}): check API token. {}",
                status, detail
            ),
            400 | 422 => format!(
                "request rejected (HTTP {}): check search criteria. {}",
                status, detail
            ),
            404 => format!("resource not found (HTTP 404): {}", detail),
            429 => format!("rate limit exceeded (HTTP 429): {}", detail),
            _ => format!("upstream error (HTTP {}): {}", status, detail),
        };
        ProviderError::Operational {
            provider: provider.into(),
            message,
            status: Some(status),
            source: None,
        }
    }

    /// Wraps a payload that could not be mapped
    pub fn malformed(
        provider: impl Into<String>,
        context: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProviderError::Operational {
            provider: provider.into(),
            message: format!("malformed response ({}): {}", context, source),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Upstream HTTP status, when the failure came with one
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Operational { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this error was raised before any I/O
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProviderError::Configuration(_)
                | ProviderError::NotFound { .. }
                | ProviderError::NoActiveProvider { .. }
        )
    }
}

/// Extracts a human-readable message from an upstream error body
///
/// Understands the common JSON shapes (`errors[].message`, `error.message`,
/// `error`, `message`) and falls back to the trimmed text.
pub fn upstream_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let from_errors = json
            .get("errors")
            .and_then(|e| e.as_array())
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| {
                        e.get("message")
                            .or_else(|| e.get("title"))
                            .and_then(|m| m.as_str())
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .filter(|m| !m.is_empty());
        let found = from_errors
            .or_else(|| {
                json.get("error").and_then(|e| match e {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Object(o) => {
                        o.get("message").and_then(|m| m.as_str()).map(String::from)
                    }
                    _ => None,
                })
            })
            .or_else(|| {
                json.get("message")
                    .and_then(|m| m.as_str())
                    .map(String::from)
            });
        if let Some(message) = found {
            return message;
        }
    }

    if trimmed.chars().count() > MAX_BODY_EXCERPT {
        let excerpt: String = trimmed.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{}...", excerpt)
    } else {
        trimmed.to_string()
    }
}
