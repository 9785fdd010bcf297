//! Application settings read from a TOML file
//!
//! Example `travel-providers.toml`:
//!
//! ```toml
//! store_dir = "/var/lib/travel-providers"
//! log_level = "info"
//! default_user = "alice"
//!
//! [http]
//! timeout_secs = 20
//! retry_attempts = 1
//! ```

use crate::domain::ProviderSettings;
use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when none is given
pub const DEFAULT_SETTINGS_FILE: &str = "travel-providers.toml";

const DEFAULT_STORE_DIR: &str = ".travel-providers";

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory holding persisted provider configuration
    pub store_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Tenant used when `--user` is not given
    pub default_user: Option<String>,
    pub http: HttpSettings,
}

/// Fallback HTTP policy for providers whose config leaves it unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: Option<u64>,
    pub retry_attempts: Option<u32>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            log_level: "warn".to_string(),
            default_user: None,
            http: HttpSettings::default(),
        }
    }
}

impl AppSettings {
    /// Read settings from `path`, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(path, &content)
    }

    /// Parse settings from TOML text
    pub fn parse(path: &Path, content: &str) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Provider settings applied beneath every stored provider config
    pub fn provider_defaults(&self) -> ProviderSettings {
        ProviderSettings {
            timeout: self.http.timeout_secs,
            retry_attempts: self.http.retry_attempts,
            ..Default::default()
        }
    }
}
