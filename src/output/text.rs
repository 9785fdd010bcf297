//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Provider listings with their lifecycle state and missing credentials
//! - Compact one-line-per-result search output with colors
//! - Flight slices rendered as route, times, duration and stops

use crate::domain::{
    CapabilityType, FlightSlice, ProviderResponse, StandardizedActivity, StandardizedFlight,
    StandardizedHotel, Tenant,
};
use crate::factory::{ProviderDescription, ProviderState};
use crate::output::OutputFormatter;
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self { color: true }
    }

    /// Create a new text formatter with color option
    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn state_label(&self, state: ProviderState) -> String {
        if !self.color {
            return state.to_string();
        }
        match state {
            ProviderState::Verified => state.as_str().green().bold().to_string(),
            ProviderState::Configured => state.as_str().green().to_string(),
            ProviderState::Registered => state.as_str().yellow().to_string(),
            ProviderState::Unregistered => state.as_str().red().to_string(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// "120.50 EUR", "120.50" or "-"
    fn price(amount: Option<&str>, currency: Option<&str>) -> String {
        match (amount, currency) {
            (Some(amount), Some(currency)) => format!("{} {}", amount, currency),
            (Some(amount), None) => amount.to_string(),
            _ => "-".to_string(),
        }
    }

    /// Format minutes as "2h 05m" or "45m"
    fn duration(minutes: Option<u32>) -> String {
        match minutes {
            Some(m) if m >= 60 => format!("{}h {:02}m", m / 60, m % 60),
            Some(m) => format!("{}m", m),
            None => "-".to_string(),
        }
    }

    /// Time part of a supplier local timestamp ("2025-06-01T08:05:00" -> "08:05")
    fn clock(timestamp: Option<&str>) -> String {
        timestamp
            .and_then(|t| t.split_once('T'))
            .map(|(_, time)| time.chars().take(5).collect())
            .unwrap_or_else(|| "--:--".to_string())
    }

    fn format_slice(&self, slice: &FlightSlice) -> String {
        let stops = match slice.stops() {
            0 => "nonstop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        };
        let carriers: Vec<&str> = slice
            .segments
            .iter()
            .filter_map(|s| s.marketing_carrier_code.as_deref())
            .collect();
        format!(
            "{} -> {}  {}-{}  {}  {}{}",
            slice.origin.code,
            slice.destination.code,
            Self::clock(slice.departing_at.as_deref()),
            Self::clock(slice.arriving_at.as_deref()),
            Self::duration(slice.duration_minutes),
            stops,
            if carriers.is_empty() {
                String::new()
            } else {
                format!("  {}", self.dim(&carriers.join("/")))
            }
        )
    }

    fn header(
        &self,
        writer: &mut dyn Write,
        provider: &str,
        shown: usize,
        total: usize,
        noun: &str,
    ) -> std::io::Result<()> {
        if shown == 0 {
            return writeln!(writer, "{}: no {} found", self.bold(provider), noun);
        }
        if total > shown {
            writeln!(writer, "{}: {} of {} {}", self.bold(provider), shown, total, noun)
        } else {
            writeln!(writer, "{}: {} {}", self.bold(provider), shown, noun)
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TextFormatter {
    fn format_providers(
        &self,
        providers: &[ProviderDescription],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if providers.is_empty() {
            return writeln!(writer, "No providers registered.");
        }

        let mut current: Option<CapabilityType> = None;
        for provider in providers {
            if current != Some(provider.capability) {
                if current.is_some() {
                    writeln!(writer)?;
                }
                writeln!(writer, "{}:", self.bold(provider.capability.display_name()))?;
                current = Some(provider.capability);
            }
            self.format_provider(provider, writer)?;
        }
        Ok(())
    }

    fn format_provider(
        &self,
        provider: &ProviderDescription,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let display = provider
            .definition
            .as_ref()
            .map(|d| d.display_name)
            .unwrap_or(provider.name.as_str());
        write!(
            writer,
            "  {:<12} {:<12} {}",
            provider.name,
            self.state_label(provider.state),
            self.dim(display)
        )?;
        if !provider.enabled && provider.missing_credentials.is_empty() {
            write!(writer, "  (disabled)")?;
        }
        if !provider.missing_credentials.is_empty() {
            write!(
                writer,
                "  missing: {}",
                provider.missing_credentials.join(", ")
            )?;
        }
        writeln!(writer)
    }

    fn format_activation(
        &self,
        capability: CapabilityType,
        name: &str,
        tenant: &Tenant,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(
            writer,
            "Active {} provider for '{}' is now {}",
            capability,
            tenant,
            self.bold(name)
        )
    }

    fn format_test(
        &self,
        capability: CapabilityType,
        name: &str,
        reachable: bool,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let status = match (reachable, self.color) {
            (true, true) => "ok".green().bold().to_string(),
            (true, false) => "ok".to_string(),
            (false, true) => "unreachable".red().bold().to_string(),
            (false, false) => "unreachable".to_string(),
        };
        writeln!(writer, "{} provider {}: {}", capability, name, status)
    }

    fn format_hotels(
        &self,
        response: &ProviderResponse<StandardizedHotel>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.header(
            writer,
            &response.provider,
            response.len(),
            response.metadata.total_results,
            "hotels",
        )?;
        for hotel in &response.data {
            writeln!(
                writer,
                "  {}  {}  {}",
                self.bold(&hotel.name),
                Self::price(hotel.cost.as_deref(), hotel.currency.as_deref()),
                self.dim(&format!("[{}]", hotel.id))
            )?;
            if let Some(description) = &hotel.description {
                writeln!(writer, "    {}", self.dim(description))?;
            }
        }
        Ok(())
    }

    fn format_flights(
        &self,
        response: &ProviderResponse<StandardizedFlight>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.header(
            writer,
            &response.provider,
            response.len(),
            response.metadata.total_results,
            "offers",
        )?;
        for flight in &response.data {
            let availability = if flight.available_for_booking {
                String::new()
            } else if self.color {
                format!("  {}", "expired".red())
            } else {
                "  expired".to_string()
            };
            writeln!(
                writer,
                "  {}  {}{}",
                self.bold(&Self::price(
                    flight.total_amount.as_deref(),
                    flight.currency.as_deref()
                )),
                self.dim(&flight.id),
                availability
            )?;
            for slice in &flight.slices {
                writeln!(writer, "    {}", self.format_slice(slice))?;
            }
        }
        Ok(())
    }

    fn format_activities(
        &self,
        response: &ProviderResponse<StandardizedActivity>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.header(
            writer,
            &response.provider,
            response.len(),
            response.metadata.total_results,
            "activities",
        )?;
        for activity in &response.data {
            writeln!(
                writer,
                "  {}  from {}  {}  {}",
                self.bold(&activity.name),
                Self::price(activity.cost.as_deref(), activity.currency.as_deref()),
                Self::duration(activity.duration_minutes),
                self.dim(&format!("[{}]", activity.id))
            )?;
        }
        Ok(())
    }
}
