//! Viator activity adapter
//!
//! Searches bookable products through the Viator Partner API.
//! API endpoint: {endpoint}/partner/products/search
//!
//! Viator exposes no health endpoint, so a connection test only reports
//! whether the adapter is configured.

use crate::domain::{
    ActivitySearchCriteria, ProviderConfig, ProviderResponse, StandardizedActivity,
};
use crate::error::ProviderError;
use crate::providers::client::{header_map, join_url};
use crate::providers::{
    amount_text, client_for, resolve_endpoint, ActivityProvider, HttpClient, Provider,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Viator Partner API base URL
const VIATOR_API_URL: &str = "https://api.viator.com";

const SEARCH_PATH: &str = "/partner/products/search";

const DEFAULT_CURRENCY: &str = "USD";

/// Products fetched per search unless the criteria ask for fewer
const DEFAULT_PAGE_SIZE: u32 = 50;

const REQUIRED_CREDENTIALS: &[&str] = &["apiKey"];

/// Viator adapter
pub struct ViatorAdapter {
    config: Option<ProviderConfig>,
    base_url: String,
    client: HttpClient,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Value>,
    total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViatorProduct {
    product_code: String,
    title: String,
    description: Option<String>,
    duration: Option<ViatorDuration>,
    pricing: Option<ViatorPricing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViatorDuration {
    fixed_duration_in_minutes: Option<u32>,
    variable_duration_from_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ViatorPricing {
    summary: Option<Value>,
    currency: Option<String>,
}

impl ViatorAdapter {
    /// Create an unconfigured Viator adapter
    pub fn new() -> Self {
        Self {
            config: None,
            base_url: VIATOR_API_URL.to_string(),
            client: HttpClient::new(),
        }
    }

    fn build_request(criteria: &ActivitySearchCriteria) -> Value {
        let mut filtering = json!({ "destination": criteria.destination.trim() });
        if let Some(start) = criteria.start_date {
            filtering["startDate"] = json!(start.format("%Y-%m-%d").to_string());
        }
        if let Some(end) = criteria.end_date {
            filtering["endDate"] = json!(end.format("%Y-%m-%d").to_string());
        }

        json!({
            "filtering": filtering,
            "sorting": { "sort": "PRICE", "order": "ASCENDING" },
            "pagination": {
                "start": 1,
                "count": criteria.max_results.unwrap_or(DEFAULT_PAGE_SIZE),
            },
            "currency": criteria.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
        })
    }

    fn map_product(
        &self,
        raw: Value,
        criteria: &ActivitySearchCriteria,
    ) -> Result<StandardizedActivity, ProviderError> {
        let product: ViatorProduct = serde_json::from_value(raw.clone())
            .map_err(|e| ProviderError::malformed(self.name(), "product", e))?;

        let mut details = match raw {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for key in ["productCode", "title", "description"] {
            details.remove(key);
        }

        let (cost, currency) = match product.pricing {
            Some(pricing) => (
                pricing
                    .summary
                    .as_ref()
                    .and_then(|s| s.get("fromPrice"))
                    .and_then(amount_text),
                pricing.currency,
            ),
            None => (None, None),
        };

        Ok(StandardizedActivity {
            id: product.product_code,
            name: product.title,
            description: product.description,
            cost,
            currency,
            provider: self.name().to_string(),
            duration_minutes: product.duration.and_then(|d| {
                d.fixed_duration_in_minutes
                    .or(d.variable_duration_from_minutes)
            }),
            valid_from: criteria.start_date,
            valid_to: criteria.end_date,
            details,
        })
    }
}

impl Default for ViatorAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for ViatorAdapter {
    fn name(&self) -> &'static str {
        "viator"
    }

    fn configure(&mut self, config: ProviderConfig) {
        self.base_url = resolve_endpoint(&config, VIATOR_API_URL);
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
        self.is_configured()
    }
}

#[async_trait]
impl ActivityProvider for ViatorAdapter {
    async fn search(
        &self,
        criteria: &ActivitySearchCriteria,
    ) -> Result<ProviderResponse<StandardizedActivity>, ProviderError> {
        self.ensure_configured()?;
        criteria
            .validate()
            .map_err(|message| ProviderError::invalid_criteria(self.name(), message))?;

        let api_key = self
            .config
            .as_ref()
            .and_then(|c| c.credential("apiKey"))
            .unwrap_or_default();
        let headers = header_map(
            self.name(),
            &[
                ("exp-api-key", api_key),
                ("accept", "application/json;version=2.0"),
                ("accept-language", "en-US"),
            ],
        )?;

        let url = join_url(&self.base_url, SEARCH_PATH);
        debug!(provider = self.name(), destination = %criteria.destination, "searching activities");
        let response: SearchResponse = self
            .client
            .post_json(self.name(), &url, &headers, &Self::build_request(criteria))
            .await?;

        let total = response.total_count.unwrap_or(response.products.len());
        let activities = response
            .products
            .into_iter()
            .map(|raw| self.map_product(raw, criteria))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProviderResponse::new(self.name(), activities, total))
    }
}
