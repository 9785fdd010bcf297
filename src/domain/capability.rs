//! Capability type definitions for supported inventory categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of external inventory a provider serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityType {
    /// Hotel accommodation suppliers
    Hotel,
    /// Flight aggregators
    Flight,
    /// Tours and activities marketplaces
    Activity,
}

impl CapabilityType {
    /// Returns the lowercase key used in persisted configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityType::Hotel => "hotel",
            CapabilityType::Flight => "flight",
            CapabilityType::Activity => "activity",
        }
    }

    /// Returns the display name for this capability
    pub fn display_name(&self) -> &'static str {
        match self {
            CapabilityType::Hotel => "Hotels",
            CapabilityType::Flight => "Flights",
            CapabilityType::Activity => "Activities",
        }
    }

    /// Returns all capability types
    pub fn all() -> &'static [CapabilityType] {
        &[
            CapabilityType::Hotel,
            CapabilityType::Flight,
            CapabilityType::Activity,
        ]
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CapabilityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hotel" | "hotels" => Ok(CapabilityType::Hotel),
            "flight" | "flights" => Ok(CapabilityType::Flight),
            "activity" | "activities" => Ok(CapabilityType::Activity),
            other => Err(format!(
                "invalid capability type '{}': expected 'hotel', 'flight' or 'activity'",
                other
            )),
        }
    }
}
