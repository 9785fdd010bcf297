//! Output formatting for provider listings and search results
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::{
    CapabilityType, ProviderResponse, StandardizedActivity, StandardizedFlight, StandardizedHotel,
    Tenant,
};
use crate::factory::ProviderDescription;
use std::io::{IsTerminal, Write};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Whether to use colors (text output only)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    ///
    /// Colors are used only when stdout is a terminal.
    pub fn from_cli(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            color: std::io::stdout().is_terminal(),
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Listing of registered providers
    fn format_providers(
        &self,
        providers: &[ProviderDescription],
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// One provider after its configuration changed
    fn format_provider(
        &self,
        provider: &ProviderDescription,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Active provider selection
    fn format_activation(
        &self,
        capability: CapabilityType,
        name: &str,
        tenant: &Tenant,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Connection test outcome
    fn format_test(
        &self,
        capability: CapabilityType,
        name: &str,
        reachable: bool,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    fn format_hotels(
        &self,
        response: &ProviderResponse<StandardizedHotel>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    fn format_flights(
        &self,
        response: &ProviderResponse<StandardizedFlight>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    fn format_activities(
        &self,
        response: &ProviderResponse<StandardizedActivity>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.color);
    }

    #[test]
    fn test_output_config_from_cli_json() {
        assert_eq!(OutputConfig::from_cli(true).format, OutputFormat::Json);
        assert_eq!(OutputConfig::from_cli(false).format, OutputFormat::Text);
    }
}
