//! Canonical hotel search types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hotel search request in supplier-agnostic form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchCriteria {
    /// Destination code (supplier destination or IATA city code)
    pub destination: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub rooms: u32,
    pub adults: u32,
    pub children: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

impl HotelSearchCriteria {
    /// Creates criteria for one room with the given stay
    pub fn new(destination: impl Into<String>, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            destination: destination.into(),
            check_in: Some(check_in),
            check_out: Some(check_out),
            rooms: 1,
            adults: 2,
            children: 0,
            max_results: None,
        }
    }

    /// Checks the fields every hotel supplier needs
    ///
    /// Returns the stay window on success.
    pub fn validate(&self) -> Result<(NaiveDate, NaiveDate), String> {
        if self.destination.trim().is_empty() {
            return Err("destination is required".to_string());
        }
        let check_in = self.check_in.ok_or("check-in date is required")?;
        let check_out = self.check_out.ok_or("check-out date is required")?;
        if check_out <= check_in {
            return Err("check-out date must be after check-in date".to_string());
        }
        if self.rooms == 0 {
            return Err("at least one room is required".to_string());
        }
        if self.adults == 0 {
            return Err("at least one adult is required".to_string());
        }
        Ok((check_in, check_out))
    }
}

/// Hotel offer in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizedHotel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Lowest price, verbatim from the supplier
    pub cost: Option<String>,
    pub currency: Option<String>,
    pub provider: String,
    pub rate_type: Option<String>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    /// Supplier-specific fields
    pub details: serde_json::Map<String, serde_json::Value>,
}
