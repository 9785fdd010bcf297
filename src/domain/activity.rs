//! Canonical activity search types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Activity search request in supplier-agnostic form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySearchCriteria {
    /// Supplier destination identifier
    pub destination: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

impl ActivitySearchCriteria {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            start_date: None,
            end_date: None,
            currency: None,
            max_results: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.destination.trim().is_empty() {
            return Err("destination is required".to_string());
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err("end date must not be before start date".to_string());
            }
        }
        Ok(())
    }
}

/// Bookable activity in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizedActivity {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// "From" price, verbatim from the supplier
    pub cost: Option<String>,
    pub currency: Option<String>,
    pub provider: String,
    pub duration_minutes: Option<u32>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub details: serde_json::Map<String, serde_json::Value>,
}
