//! CLI argument parsing module for travel-providers

use crate::domain::{CabinClass, CapabilityType};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse a `KEY=VALUE` pair
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse a calendar date in `YYYY-MM-DD` form
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD", s))
}

/// Search and manage hotel, flight and activity suppliers
#[derive(Parser, Debug, Clone)]
#[command(name = "travel-providers", version, about = "Search and manage travel inventory suppliers")]
pub struct CliArgs {
    /// Settings file (default: ./travel-providers.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding stored provider configuration
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Tenant whose selection and configuration are used
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List registered providers and their state
    Providers {
        /// Only list providers of this capability type
        #[arg(long = "type", value_name = "TYPE")]
        capability: Option<CapabilityType>,
    },

    /// Store credentials and settings for a provider
    Configure(ConfigureArgs),

    /// Select the provider used when a search names none
    Activate {
        capability: CapabilityType,
        name: String,
    },

    /// Check that a provider is configured and reachable
    Test {
        capability: CapabilityType,
        name: String,
    },

    /// Search hotel availability
    SearchHotels(HotelSearchArgs),

    /// Search flight offers
    SearchFlights(FlightSearchArgs),

    /// Search tours and activities
    SearchActivities(ActivitySearchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConfigureArgs {
    /// Provider name
    pub name: String,

    /// Credential to set (can be specified multiple times)
    #[arg(long = "credential", value_name = "KEY=VALUE", value_parser = parse_key_value, action = ArgAction::Append)]
    pub credentials: Vec<(String, String)>,

    /// Setting to set, e.g. timeout=20 (can be specified multiple times)
    #[arg(long = "setting", value_name = "KEY=VALUE", value_parser = parse_key_value, action = ArgAction::Append)]
    pub settings: Vec<(String, String)>,

    /// Store the provider as disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Args, Debug, Clone)]
pub struct HotelSearchArgs {
    /// Supplier destination code
    #[arg(long)]
    pub destination: String,

    #[arg(long, value_parser = parse_date)]
    pub check_in: NaiveDate,

    #[arg(long, value_parser = parse_date)]
    pub check_out: NaiveDate,

    #[arg(long, default_value_t = 1)]
    pub rooms: u32,

    #[arg(long, default_value_t = 2)]
    pub adults: u32,

    #[arg(long, default_value_t = 0)]
    pub children: u32,

    /// Provider to use instead of the active one
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct FlightSearchArgs {
    /// Origin airport or city code
    #[arg(long)]
    pub origin: String,

    /// Destination airport or city code
    #[arg(long)]
    pub destination: String,

    #[arg(long, value_parser = parse_date)]
    pub departure: NaiveDate,

    /// Return date; makes the search a round trip
    #[arg(long = "return", value_parser = parse_date)]
    pub return_date: Option<NaiveDate>,

    #[arg(long, default_value_t = 1)]
    pub adults: u32,

    #[arg(long, default_value_t = 0)]
    pub children: u32,

    #[arg(long, default_value_t = 0)]
    pub seniors: u32,

    /// economy, premium_economy, business or first
    #[arg(long)]
    pub cabin: Option<CabinClass>,

    /// Provider to use instead of the active one
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ActivitySearchArgs {
    /// Supplier destination identifier
    #[arg(long)]
    pub destination: String,

    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Provider to use instead of the active one
    #[arg(long)]
    pub provider: Option<String>,
}
