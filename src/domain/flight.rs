//! Canonical flight search types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested cabin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CabinClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "economy" => Ok(CabinClass::Economy),
            "premium_economy" | "premium" => Ok(CabinClass::PremiumEconomy),
            "business" => Ok(CabinClass::Business),
            "first" => Ok(CabinClass::First),
            other => Err(format!("invalid cabin class '{}'", other)),
        }
    }
}

/// Largest party a single flight search may request
pub const MAX_TRAVELERS: u32 = 9;

/// Flight search request in supplier-agnostic form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchCriteria {
    /// Origin airport or city code
    pub origin: String,
    /// Destination airport or city code
    pub destination: String,
    pub departure_date: Option<NaiveDate>,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub seniors: u32,
    #[serde(default)]
    pub is_return_flight: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabin_class: Option<CabinClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

/// Dates of a validated flight search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripDates {
    pub departure: NaiveDate,
    /// Present only for round trips
    pub return_date: Option<NaiveDate>,
}

impl FlightSearchCriteria {
    /// Creates a one-way search for a single adult
    pub fn one_way(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: NaiveDate,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: Some(departure),
            return_date: None,
            adults: 1,
            children: 0,
            seniors: 0,
            is_return_flight: false,
            cabin_class: None,
            max_results: None,
        }
    }

    /// Creates a round-trip search for a single adult
    pub fn round_trip(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure: NaiveDate,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            return_date: Some(return_date),
            is_return_flight: true,
            ..Self::one_way(origin, destination, departure)
        }
    }

    /// Everyone travelling, seniors included
    ///
    /// Saturates at `u32::MAX`.
    pub fn total_travelers(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.seniors)
    }

    /// Checks the fields every flight supplier needs
    pub fn validate(&self) -> Result<TripDates, String> {
        if self.origin.trim().is_empty() {
            return Err("origin is required".to_string());
        }
        if self.destination.trim().is_empty() {
            return Err("destination is required".to_string());
        }
        let departure = self.departure_date.ok_or("departure date is required")?;
        let return_date = if self.is_return_flight {
            let ret = self
                .return_date
                .ok_or("return date is required for a return flight")?;
            if ret < departure {
                return Err("return date must not be before departure date".to_string());
            }
            Some(ret)
        } else {
            None
        };
        if self.adults == 0 && self.seniors == 0 {
            return Err("at least one adult or senior traveler is required".to_string());
        }
        let travelers = self.total_travelers();
        if travelers > MAX_TRAVELERS {
            return Err(format!(
                "at most {} travelers per search, got {}",
                MAX_TRAVELERS, travelers
            ));
        }
        Ok(TripDates {
            departure,
            return_date,
        })
    }
}

/// Airport or city reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPlace {
    pub code: String,
    pub name: Option<String>,
}

/// One flown leg inside a slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub id: String,
    pub origin: FlightPlace,
    pub destination: FlightPlace,
    pub departing_at: Option<String>,
    pub arriving_at: Option<String>,
    /// ISO-8601 duration
    pub duration: Option<String>,
    pub duration_minutes: Option<u32>,
    pub marketing_carrier_code: Option<String>,
    pub marketing_carrier_name: Option<String>,
    pub flight_number: Option<String>,
    pub aircraft_name: Option<String>,
}

/// One directional journey (outbound or return)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSlice {
    pub origin: FlightPlace,
    pub destination: FlightPlace,
    pub departing_at: Option<String>,
    pub arriving_at: Option<String>,
    pub duration: Option<String>,
    pub duration_minutes: Option<u32>,
    pub segments: Vec<FlightSegment>,
}

impl FlightSlice {
    /// Number of stops between origin and destination
    pub fn stops(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

/// Priced flight offer in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizedFlight {
    pub id: String,
    pub provider: String,
    /// Total price, verbatim from the supplier
    pub total_amount: Option<String>,
    pub currency: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub available_for_booking: bool,
    /// Ordered outbound first
    pub slices: Vec<FlightSlice>,
    /// Supplier-specific fields
    pub details: serde_json::Map<String, serde_json::Value>,
}
