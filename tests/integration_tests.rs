//! Integration tests for travel-providers
//!
//! These tests verify:
//! - Factory resolution feeding real adapters
//! - Adapter wire formats against an in-process mock upstream
//! - Error translation for failing upstreams
//! - Configuration persistence through the file store

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use travel_providers::domain::{
    ActivitySearchCriteria, CapabilityType, FlightSearchCriteria, HotelSearchCriteria,
    ProviderConfig, ProviderSettings, Tenant,
};
use travel_providers::error::ProviderError;
use travel_providers::factory::ProviderFactory;
use travel_providers::registry::ProviderRegistry;
use travel_providers::store::{FileStore, MemoryStore};

/// Requests the mock upstream received, by route
#[derive(Clone, Default)]
struct Recorded {
    offer_requests: Arc<Mutex<Vec<Value>>>,
    offer_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    hotel_requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

fn segment(id: &str, from: &str, to: &str, departing: &str, arriving: &str) -> Value {
    json!({
        "id": id,
        "origin": {"iata_code": from},
        "destination": {"iata_code": to},
        "departing_at": departing,
        "arriving_at": arriving,
        "duration": "PT5H30M",
        "marketing_carrier": {"iata_code": "AA", "name": "American Airlines"},
        "marketing_carrier_flight_number": "100"
    })
}

/// Origin `ERR` fails the offer request; destinations `BAD` and `MAL`
/// make the offers fetch fail with a 500 or an unparsable body
async fn create_offer_request(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Response {
    let slice = body["data"]["slices"][0].clone();
    recorded.offer_requests.lock().push(body);
    if slice["origin"] == "ERR" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"errors": [{"message": "Offer request could not be created"}]})),
        )
            .into_response();
    }
    let id = match slice["destination"].as_str() {
        Some("BAD") => "orq_broken",
        Some("MAL") => "orq_malformed",
        _ => "orq_0001",
    };
    Json(json!({"data": {"id": id, "live_mode": false}})).into_response()
}

async fn list_offers(
    State(recorded): State<Recorded>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let id = query.get("offer_request_id").cloned().unwrap_or_default();
    recorded.offer_queries.lock().push(query);
    match id.as_str() {
        "orq_broken" => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"errors": [{"message": "Offers temporarily unavailable"}]})),
            )
                .into_response()
        }
        "orq_malformed" => return "<html>gateway</html>".into_response(),
        _ => {}
    }
    Json(json!({
        "data": [{
            "id": "off_0001",
            "total_amount": "412.80",
            "total_currency": "USD",
            "expires_at": "2999-01-01T00:00:00Z",
            "owner": {"iata_code": "AA"},
            "slices": [
                {
                    "origin": {"iata_code": "JFK"},
                    "destination": {"iata_code": "LAX"},
                    "duration": "PT5H30M",
                    "segments": [segment("seg_out", "JFK", "LAX", "2025-06-01T08:00:00", "2025-06-01T10:30:00")]
                },
                {
                    "origin": {"iata_code": "LAX"},
                    "destination": {"iata_code": "JFK"},
                    "duration": "PT5H30M",
                    "segments": [segment("seg_ret", "LAX", "JFK", "2025-06-10T09:00:00", "2025-06-10T17:30:00")]
                }
            ]
        }]
    }))
    .into_response()
}

async fn airlines() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"errors": [{"message": "invalid token"}]})),
    )
        .into_response()
}

async fn hotel_availability(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    recorded.hotel_requests.lock().push((headers, body.clone()));
    if body["destination"]["code"] == "FAIL" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"code": "SYSTEM_ERROR", "message": "Availability engine unavailable"}})),
        )
            .into_response();
    }
    Json(json!({
        "hotels": {
            "checkIn": "2025-06-01",
            "checkOut": "2025-06-05",
            "total": 37,
            "hotels": [{
                "code": 6613,
                "name": "Hotel Son Amoixa",
                "categoryName": "4 STARS",
                "destinationName": "Majorca",
                "minRate": "205.20",
                "currency": "EUR",
                "rooms": [{"code": "DBL.ST", "rates": [{"net": "205.20", "rateType": "BOOKABLE"}]}]
            }]
        }
    }))
    .into_response()
}

async fn hotel_status() -> Json<Value> {
    Json(json!({"status": "OK"}))
}

async fn product_search(Json(body): Json<Value>) -> Json<Value> {
    let destination = body["filtering"]["destination"].clone();
    Json(json!({
        "totalCount": 1,
        "products": [{
            "productCode": "5010SYDNEY",
            "title": format!("Harbour cruise in {}", destination.as_str().unwrap_or("?")),
            "duration": {"fixedDurationInMinutes": 90},
            "pricing": {"summary": {"fromPrice": 49.0}, "currency": "AUD"}
        }]
    }))
}

/// Start the mock upstream and return its base URL
async fn spawn_upstream() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/air/offer_requests", post(create_offer_request))
        .route("/air/offers", get(list_offers))
        .route("/air/airlines", get(airlines))
        .route("/hotel-api/1.0/hotels", post(hotel_availability))
        .route("/hotel-api/1.0/status", get(hotel_status))
        .route("/partner/products/search", post(product_search))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), recorded)
}

fn factory_for(base_url: &str) -> ProviderFactory {
    let factory = ProviderFactory::new(
        ProviderRegistry::with_defaults(),
        Arc::new(MemoryStore::new()),
    );
    factory.set_provider_config(
        "duffel",
        ProviderConfig::new("duffel")
            .with_credential("apiToken", "duffel_test_token")
            .with_credential("endpoint", base_url),
    );
    factory.set_provider_config(
        "hotelbeds",
        ProviderConfig::new("hotelbeds")
            .with_credential("apiKey", "hb-key")
            .with_credential("secret", "hb-secret")
            .with_credential("endpoint", format!("{}/", base_url)),
    );
    factory.set_provider_config(
        "viator",
        ProviderConfig::new("viator")
            .with_credential("apiKey", "viator-key")
            .with_credential("endpoint", base_url),
    );
    factory
}

fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

mod flight_search {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_sends_and_returns_two_slices() {
        let (base_url, recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let provider = factory
            .get_flight_provider(Some("duffel"), &Tenant::Default)
            .unwrap();

        let criteria = FlightSearchCriteria::round_trip("jfk", "lax", date("2025-06-01"), date("2025-06-10"));
        let response = provider.search(&criteria).await.unwrap();

        let sent = recorded.offer_requests.lock()[0].clone();
        let slices = sent["data"]["slices"].as_array().unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0]["origin"], "JFK");
        assert_eq!(slices[0]["departure_date"], "2025-06-01");
        assert_eq!(slices[1]["origin"], "LAX");
        assert_eq!(slices[1]["departure_date"], "2025-06-10");

        let query = recorded.offer_queries.lock()[0].clone();
        assert_eq!(query.get("offer_request_id").map(String::as_str), Some("orq_0001"));

        assert!(response.success);
        assert_eq!(response.provider, "duffel");
        assert_eq!(response.len(), 1);
        let offer = &response.data[0];
        assert_eq!(offer.total_amount.as_deref(), Some("412.80"));
        assert_eq!(offer.slices.len(), 2);
        assert_eq!(offer.slices[0].origin.code, "JFK");
        assert_eq!(offer.slices[1].origin.code, "LAX");
        assert_eq!(offer.slices[0].duration_minutes, Some(330));
        assert_eq!(offer.details["owner"]["iata_code"], "AA");
    }

    #[tokio::test]
    async fn test_one_way_with_senior_sends_four_passengers() {
        let (base_url, recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let provider = factory
            .get_flight_provider(Some("duffel"), &Tenant::Default)
            .unwrap();

        let mut criteria = FlightSearchCriteria::one_way("JFK", "LAX", date("2025-06-01"));
        criteria.adults = 2;
        criteria.children = 1;
        criteria.seniors = 1;
        provider.search(&criteria).await.unwrap();

        let sent = recorded.offer_requests.lock()[0].clone();
        let passengers = sent["data"]["passengers"].as_array().unwrap();
        assert_eq!(passengers.len(), 4);
        let adults = passengers.iter().filter(|p| p["type"] == "adult").count();
        let children = passengers.iter().filter(|p| p["type"] == "child").count();
        assert_eq!((adults, children), (3, 1));
        assert_eq!(sent["data"]["slices"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_offer_request_failure_skips_offer_fetch() {
        let (base_url, recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let provider = factory
            .get_flight_provider(Some("duffel"), &Tenant::Default)
            .unwrap();

        let criteria = FlightSearchCriteria::one_way("ERR", "LAX", date("2025-06-01"));
        let err = provider.search(&criteria).await.unwrap_err();

        assert!(matches!(err, ProviderError::Operational { .. }), "{}", err);
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Offer request could not be created"));
        assert_eq!(recorded.offer_requests.lock().len(), 1);
        assert!(recorded.offer_queries.lock().is_empty());
    }

    #[tokio::test]
    async fn test_offer_fetch_failure_is_single_error() {
        let (base_url, recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let provider = factory
            .get_flight_provider(Some("duffel"), &Tenant::Default)
            .unwrap();

        let criteria = FlightSearchCriteria::one_way("JFK", "BAD", date("2025-06-01"));
        let err = provider.search(&criteria).await.unwrap_err();

        assert!(matches!(err, ProviderError::Operational { .. }), "{}", err);
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Offers temporarily unavailable"));
        assert_eq!(recorded.offer_queries.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_offers_body_is_error() {
        let (base_url, _recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let provider = factory
            .get_flight_provider(Some("duffel"), &Tenant::Default)
            .unwrap();

        let criteria = FlightSearchCriteria::one_way("JFK", "MAL", date("2025-06-01"));
        let err = provider.search(&criteria).await.unwrap_err();

        assert!(matches!(err, ProviderError::Operational { status: None, .. }), "{}", err);
        assert!(err.to_string().contains("malformed response"));
    }

    #[tokio::test]
    async fn test_missing_origin_fails_before_io() {
        let (base_url, recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let provider = factory
            .get_flight_provider(Some("duffel"), &Tenant::Default)
            .unwrap();

        let criteria = FlightSearchCriteria::one_way("", "LAX", date("2025-06-01"));
        let err = provider.search(&criteria).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCriteria { .. }));
        assert!(recorded.offer_requests.lock().is_empty());
    }
}

mod hotel_search {
    use super::*;

    #[tokio::test]
    async fn test_search_maps_hotels_and_signs_request() {
        let (base_url, recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let provider = factory
            .get_hotel_provider(Some("hotelbeds"), &Tenant::Default)
            .unwrap();

        let mut criteria = HotelSearchCriteria::new("PMI", date("2025-06-01"), date("2025-06-05"));
        criteria.children = 1;
        let response = provider.search(&criteria).await.unwrap();

        assert_eq!(response.metadata.total_results, 37);
        let hotel = &response.data[0];
        assert_eq!(hotel.id, "6613");
        assert_eq!(hotel.cost.as_deref(), Some("205.20"));
        assert_eq!(hotel.rate_type.as_deref(), Some("BOOKABLE"));
        assert_eq!(hotel.valid_from, Some(date("2025-06-01")));
        assert_eq!(hotel.description.as_deref(), Some("4 STARS, Majorca"));

        let (headers, body) = recorded.hotel_requests.lock()[0].clone();
        assert_eq!(headers.get("api-key").unwrap(), "hb-key");
        assert_eq!(headers.get("x-signature").unwrap().len(), 64);
        assert_eq!(body["stay"]["checkIn"], "2025-06-01");
        assert_eq!(body["occupancies"][0]["children"], 1);
        assert_eq!(body["destination"]["code"], "PMI");
    }

    #[tokio::test]
    async fn test_upstream_500_message_comes_from_body() {
        let (base_url, _recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let provider = factory
            .get_hotel_provider(Some("hotelbeds"), &Tenant::Default)
            .unwrap();

        let criteria = HotelSearchCriteria::new("FAIL", date("2025-06-01"), date("2025-06-05"));
        let err = provider.search(&criteria).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(!err.is_configuration());
        let message = err.to_string();
        assert!(message.contains("Availability engine unavailable"), "{}", message);
        assert!(message.contains("hotelbeds"));
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (base_url, recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url).with_default_settings(ProviderSettings {
            retry_attempts: Some(2),
            ..Default::default()
        });
        let provider = factory
            .get_hotel_provider(Some("hotelbeds"), &Tenant::Default)
            .unwrap();

        let criteria = HotelSearchCriteria::new("FAIL", date("2025-06-01"), date("2025-06-05"));
        assert!(provider.search(&criteria).await.is_err());
        assert_eq!(recorded.hotel_requests.lock().len(), 3);
    }
}

mod activity_search {
    use super::*;

    #[tokio::test]
    async fn test_active_provider_per_tenant() {
        let (base_url, _recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);
        let alice = Tenant::user("alice");
        factory
            .set_active_provider(CapabilityType::Activity, "viator", &alice)
            .unwrap();

        assert!(factory.get_activity_provider(None, &Tenant::Default).is_err());

        let provider = factory.get_activity_provider(None, &alice).unwrap();
        let response = provider
            .search(&ActivitySearchCriteria::new("Sydney"))
            .await
            .unwrap();
        assert_eq!(response.data[0].name, "Harbour cruise in Sydney");
        assert_eq!(response.data[0].cost.as_deref(), Some("49.0"));
        assert_eq!(response.data[0].duration_minutes, Some(90));
    }
}

mod connection_tests {
    use super::*;

    #[tokio::test]
    async fn test_provider_never_fails() {
        let (base_url, _recorded) = spawn_upstream().await;
        let factory = factory_for(&base_url);

        assert!(factory.test_provider(CapabilityType::Hotel, "hotelbeds").await);
        // Upstream rejects the token
        assert!(!factory.test_provider(CapabilityType::Flight, "duffel").await);
        assert!(!factory.test_provider(CapabilityType::Flight, "hotelbeds").await);
        assert!(!factory.test_provider(CapabilityType::Activity, "nope").await);

        factory.remove_provider_config("viator");
        assert!(!factory.test_provider(CapabilityType::Activity, "viator").await);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_false() {
        let factory = factory_for("http://127.0.0.1:9");
        assert!(!factory.test_provider(CapabilityType::Hotel, "hotelbeds").await);
    }
}

mod persistence {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let temp = TempDir::new().unwrap();
        let alice = Tenant::user("alice");

        let factory = ProviderFactory::new(
            ProviderRegistry::with_defaults(),
            Arc::new(FileStore::new(temp.path().join("store"))),
        );
        let mut config = ProviderConfig::new("duffel").with_credential("apiToken", "t");
        config.settings.apply("timeout", "15").unwrap();
        config.settings.apply("region", "eu").unwrap();
        factory.set_provider_config("duffel", config);
        factory
            .set_active_provider(CapabilityType::Flight, "duffel", &alice)
            .unwrap();
        factory.save_configurations(&alice).await.unwrap();

        assert!(temp
            .path()
            .join("store")
            .join("provider-config%3Auser%3Aalice.json")
            .exists());

        let restored = ProviderFactory::new(
            ProviderRegistry::with_defaults(),
            Arc::new(FileStore::new(temp.path().join("store"))),
        );
        assert!(restored.load_configurations(&alice).await.unwrap());
        assert_eq!(restored.provider_config("duffel"), factory.provider_config("duffel"));
        assert_eq!(
            restored.active_provider(CapabilityType::Flight, &alice).as_deref(),
            Some("duffel")
        );
        assert!(!restored.load_configurations(&Tenant::Default).await.unwrap());
    }
}
