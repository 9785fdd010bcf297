//! Per-provider configuration and tenant scoping

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Settings and credentials for a single provider
///
/// Replaced as a whole record; the factory never mutates individual fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Provider name this record belongs to
    pub name: String,
    /// Whether the provider may be used at all
    #[serde(default)]
    pub enabled: bool,
    /// Credential key to secret value
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
    /// Operational settings
    #[serde(default)]
    pub settings: ProviderSettings,
}

/// Free-form operational settings with the commonly used keys typed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Adapter-internal retry attempts for transient failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,
    /// Cache lifetime in seconds (advisory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_duration: Option<u64>,
    /// Ordering hint for configuration screens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Any other setting, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProviderConfig {
    /// Creates an enabled config with no credentials
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            credentials: BTreeMap::new(),
            settings: ProviderSettings::default(),
        }
    }

    /// Adds a credential (builder pattern)
    pub fn with_credential(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.credentials.insert(key.into(), value.into());
        self
    }

    /// Sets the enabled flag (builder pattern)
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Replaces the settings (builder pattern)
    pub fn with_settings(mut self, settings: ProviderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns a credential value when present and non-blank
    pub fn credential(&self, key: &str) -> Option<&str> {
        self.credentials
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Returns the required keys that are absent or blank, in the given order
    pub fn missing_credentials(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|key| self.credential(key).is_none())
            .map(|key| key.to_string())
            .collect()
    }
}

impl ProviderSettings {
    /// Request timeout, if one was configured
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.filter(|t| *t > 0).map(Duration::from_secs)
    }

    /// Applies a `key=value` pair as given on the command line
    ///
    /// Known keys are parsed into their typed fields; anything else lands in
    /// `extra` as a JSON value when it parses as one, else as a string.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), String> {
        let parse_err = |e: std::num::ParseIntError| format!("invalid value for '{}': {}", key, e);
        match key {
            "timeout" => self.timeout = Some(value.parse().map_err(parse_err)?),
            "retryAttempts" | "retry_attempts" => {
                self.retry_attempts = Some(value.parse().map_err(parse_err)?)
            }
            "cacheDuration" | "cache_duration" => {
                self.cache_duration = Some(value.parse().map_err(parse_err)?)
            }
            "priority" => self.priority = Some(value.parse().map_err(parse_err)?),
            _ => {
                let parsed = serde_json::from_str(value)
                    .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
                self.extra.insert(key.to_string(), parsed);
            }
        }
        Ok(())
    }
}

/// Scope for active-provider selection and persisted configuration
///
/// Callers choose `Default` for single-tenant use or name the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tenant {
    /// Shared single-tenant scope
    Default,
    /// Scope owned by one user
    User(String),
}

impl Tenant {
    /// Creates a user tenant
    pub fn user(id: impl Into<String>) -> Self {
        Tenant::User(id.into())
    }

    /// Returns the display key for this tenant
    pub fn key(&self) -> &str {
        match self {
            Tenant::Default => "default",
            Tenant::User(id) => id,
        }
    }

    /// Returns the key this tenant's data is persisted under
    ///
    /// User ids live in their own namespace, so no user id can collide with
    /// the default tenant.
    pub fn storage_key(&self) -> String {
        match self {
            Tenant::Default => "default".to_string(),
            Tenant::User(id) => format!("user:{}", id),
        }
    }
}

impl From<Option<String>> for Tenant {
    fn from(user: Option<String>) -> Self {
        match user {
            Some(id) if !id.trim().is_empty() && id != "default" => Tenant::User(id),
            _ => Tenant::Default,
        }
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
