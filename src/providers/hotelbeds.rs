//! Hotelbeds hotel adapter
//!
//! Searches availability through the Hotelbeds Booking API.
//! API endpoint: {endpoint}/hotel-api/1.0/hotels
//!
//! Every request is signed with `X-Signature`, the hex SHA-256 of
//! api key + secret + current unix time in seconds.

use crate::domain::{HotelSearchCriteria, ProviderConfig, ProviderResponse, StandardizedHotel};
use crate::error::ProviderError;
use crate::providers::client::{header_map, join_url};
use crate::providers::{
    amount_text, client_for, health_timeout, resolve_endpoint, HotelProvider, HttpClient,
    Provider,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Hotelbeds API base URL
const HOTELBEDS_API_URL: &str = "https://api.hotelbeds.com";

const AVAILABILITY_PATH: &str = "/hotel-api/1.0/hotels";
const STATUS_PATH: &str = "/hotel-api/1.0/status";

const REQUIRED_CREDENTIALS: &[&str] = &["apiKey", "secret"];

/// Hotelbeds adapter
pub struct HotelbedsAdapter {
    config: Option<ProviderConfig>,
    base_url: String,
    client: HttpClient,
}

/// Availability response
#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    hotels: Option<HotelList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelList {
    #[serde(default)]
    hotels: Vec<HotelbedsHotel>,
    total: Option<usize>,
}

/// One hotel with its rooms; everything not named here goes to `details`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelbedsHotel {
    code: Value,
    name: String,
    min_rate: Option<Value>,
    currency: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl HotelbedsAdapter {
    /// Create an unconfigured Hotelbeds adapter
    pub fn new() -> Self {
        Self {
            config: None,
            base_url: HOTELBEDS_API_URL.to_string(),
            client: HttpClient::new(),
        }
    }

    /// Build the availability request payload
    fn build_request(
        criteria: &HotelSearchCriteria,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Value {
        let mut body = json!({
            "stay": {
                "checkIn": check_in.format("%Y-%m-%d").to_string(),
                "checkOut": check_out.format("%Y-%m-%d").to_string(),
            },
            "occupancies": [{
                "rooms": criteria.rooms,
                "adults": criteria.adults,
                "children": criteria.children,
            }],
            "destination": { "code": criteria.destination.trim() },
        });
        if let Some(max) = criteria.max_results {
            body["filter"] = json!({ "maxHotels": max });
        }
        body
    }

    fn auth_headers(&self) -> Result<HeaderMap, ProviderError> {
        let config = self.config.as_ref();
        let api_key = config.and_then(|c| c.credential("apiKey")).unwrap_or_default();
        let secret = config.and_then(|c| c.credential("secret")).unwrap_or_default();
        let signature = signature(api_key, secret, chrono::Utc::now().timestamp());

        header_map(
            self.name(),
            &[
                ("api-key", api_key),
                ("x-signature", signature.as_str()),
                ("accept", "application/json"),
            ],
        )
    }

    fn map_hotel(
        &self,
        hotel: HotelbedsHotel,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> StandardizedHotel {
        let id = match &hotel.code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let description = [
            hotel.extra.get("categoryName").and_then(Value::as_str),
            hotel.extra.get("destinationName").and_then(Value::as_str),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
        let rate_type = hotel.extra.get("rooms").and_then(cheapest_rate_type);

        StandardizedHotel {
            id,
            name: hotel.name,
            description: (!description.is_empty()).then_some(description),
            cost: hotel.min_rate.as_ref().and_then(amount_text),
            currency: hotel.currency,
            provider: self.name().to_string(),
            rate_type,
            valid_from: Some(check_in),
            valid_to: Some(check_out),
            details: hotel.extra,
        }
    }
}

impl Default for HotelbedsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Hex SHA-256 of key + secret + timestamp
fn signature(api_key: &str, secret: &str, timestamp: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Rate type of the lowest `net` rate across all rooms
fn cheapest_rate_type(rooms: &Value) -> Option<String> {
    rooms
        .as_array()?
        .iter()
        .filter_map(|room| room.get("rates").and_then(Value::as_array))
        .flatten()
        .filter_map(|rate| {
            let net = amount_text(rate.get("net")?)?.parse::<f64>().ok()?;
            let rate_type = rate.get("rateType")?.as_str()?;
            Some((net, rate_type))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, rate_type)| rate_type.to_string())
}

#[async_trait]
impl Provider for HotelbedsAdapter {
    fn name(&self) -> &'static str {
        "hotelbeds"
    }

    fn configure(&mut self, config: ProviderConfig) {
        self.base_url = resolve_endpoint(&config, HOTELBEDS_API_URL);
        self.client = client_for(&config);
        self.config = Some(config);
    }

    fn config(&self) -> Option<&ProviderConfig> {
        self.config.as_ref()
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        REQUIRED_CREDENTIALS
    }

    async fn test_connection(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        let Ok(headers) = self.auth_headers() else {
            return false;
        };

        let url = join_url(&self.base_url, STATUS_PATH);
        match self.client.probe(&url, &headers, health_timeout(&self.client)).await {
            Ok(status) if (200..300).contains(&status) => true,
            // No status endpoint on this deployment: fall back to "configured"
            Ok(404) => true,
            Ok(status) => {
                warn!(provider = self.name(), status, "connection test rejected");
                false
            }
            Err(e) => {
                warn!(provider = self.name(), error = %e, "connection test failed");
                false
            }
        }
    }
}

#[async_trait]
impl HotelProvider for HotelbedsAdapter {
    async fn search(
        &self,
        criteria: &HotelSearchCriteria,
    ) -> Result<ProviderResponse<StandardizedHotel>, ProviderError> {
        self.ensure_configured()?;
        let (check_in, check_out) = criteria
            .validate()
            .map_err(|message| ProviderError::invalid_criteria(self.name(), message))?;

        let url = join_url(&self.base_url, AVAILABILITY_PATH);
        let body = Self::build_request(criteria, check_in, check_out);
        debug!(provider = self.name(), destination = %criteria.destination, "searching hotels");

        let response: AvailabilityResponse = self
            .client
            .post_json(self.name(), &url, &self.auth_headers()?, &body)
            .await?;

        let list = response.hotels.unwrap_or(HotelList {
            hotels: Vec::new(),
            total: Some(0),
        });
        let total = list.total.unwrap_or(list.hotels.len());
        let hotels = list
            .hotels
            .into_iter()
            .map(|h| self.map_hotel(h, check_in, check_out))
            .collect();

        Ok(ProviderResponse::new(self.name(), hotels, total))
    }
}
