//! JSON output formatter for machine processing
//!
//! Search responses are written in their canonical camelCase shape; other
//! commands get a small status object.

use crate::domain::{
    CapabilityType, ProviderResponse, StandardizedActivity, StandardizedFlight, StandardizedHotel,
    Tenant,
};
use crate::factory::ProviderDescription;
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn write<T: Serialize + ?Sized>(&self, value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// JSON representation of an active provider selection
#[derive(Serialize)]
struct JsonActivation<'a> {
    capability: CapabilityType,
    provider: &'a str,
    tenant: &'a str,
}

/// JSON representation of a connection test
#[derive(Serialize)]
struct JsonTest<'a> {
    capability: CapabilityType,
    provider: &'a str,
    reachable: bool,
}

impl OutputFormatter for JsonFormatter {
    fn format_providers(
        &self,
        providers: &[ProviderDescription],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(providers, writer)
    }

    fn format_provider(
        &self,
        provider: &ProviderDescription,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(provider, writer)
    }

    fn format_activation(
        &self,
        capability: CapabilityType,
        name: &str,
        tenant: &Tenant,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(
            &JsonActivation {
                capability,
                provider: name,
                tenant: tenant.key(),
            },
            writer,
        )
    }

    fn format_test(
        &self,
        capability: CapabilityType,
        name: &str,
        reachable: bool,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(
            &JsonTest {
                capability,
                provider: name,
                reachable,
            },
            writer,
        )
    }

    fn format_hotels(
        &self,
        response: &ProviderResponse<StandardizedHotel>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(response, writer)
    }

    fn format_flights(
        &self,
        response: &ProviderResponse<StandardizedFlight>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(response, writer)
    }

    fn format_activities(
        &self,
        response: &ProviderResponse<StandardizedActivity>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write(response, writer)
    }
}
