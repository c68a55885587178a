//! End-to-end tests for the Google Places adapter against a mock server

use address_autocomplete_rs::adapters::{Adapter, AdapterError, GooglePlaces};
use address_autocomplete_rs::session::{MemorySessionStore, SessionStore};
use address_autocomplete_rs::transport::HttpClient;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter(base_url: String, store: Arc<MemorySessionStore>) -> GooglePlaces {
    GooglePlaces::new("test-key", HttpClient::new().unwrap(), store).with_base_url(base_url)
}

fn suggest_response() -> serde_json::Value {
    json!({
        "suggestions": [
            {
                "placePrediction": {
                    "placeId": "place-a",
                    "text": { "text": "123 Main St, Springfield" }
                }
            },
            {
                "placePrediction": {
                    "placeId": "place-b",
                    "text": { "text": "123 Main Ave, Springfield" }
                }
            }
        ]
    })
}

fn details_response() -> serde_json::Value {
    json!({
        "id": "place-a",
        "addressComponents": [
            { "longText": "123", "shortText": "123", "types": ["street_number"] },
            { "longText": "Main Street", "shortText": "Main St", "types": ["route"] },
            { "longText": "Springfield", "types": ["locality", "political"] },
            { "longText": "Illinois", "shortText": "IL", "types": ["administrative_area_level_1", "political"] },
            { "longText": "62701", "types": ["postal_code"] },
            { "longText": "United States", "shortText": "US", "types": ["country", "political"] }
        ],
        "location": { "latitude": 39.8017, "longitude": -89.6437 }
    })
}

#[tokio::test]
async fn suggest_and_retrieve_roundtrip() {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::default());

    Mock::given(method("POST"))
        .and(path("/v1/places:autocomplete"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({ "input": "123 Main" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(suggest_response()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/places/place-a"))
        .and(query_param("key", "test-key"))
        .and(query_param("fields", "id,addressComponents,location"))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_response()))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(server.uri(), store);
    adapter.init().await.unwrap();

    let suggestions = adapter.suggest("123 Main").await.unwrap();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].id, "place-a");
    assert_eq!(suggestions[0].text, "123 Main St, Springfield");
    assert_eq!(suggestions[1].id, "place-b");

    let address = adapter.retrieve(&suggestions[0]).await.unwrap();
    assert_eq!(address.id, "place-a");
    assert_eq!(address.address1, "123 Main St");
    assert_eq!(address.address2, "");
    assert_eq!(address.city, "Springfield");
    assert_eq!(address.state, "IL");
    assert_eq!(address.postal_code, "62701");
    assert_eq!(address.country, "US");
    assert_eq!(address.location.latitude, 39.8017);
    assert_eq!(address.location.longitude, -89.6437);
}

#[tokio::test]
async fn init_reuses_stored_session_token() {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::default());
    store.set("google", "existing-token".to_string()).await;

    Mock::given(method("POST"))
        .and(path("/v1/places:autocomplete"))
        .and(body_partial_json(json!({ "sessionToken": "existing-token" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "suggestions": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(server.uri(), store.clone());
    adapter.init().await.unwrap();

    let suggestions = adapter.suggest("123 Main").await.unwrap();
    assert!(suggestions.is_empty());
    assert_eq!(store.get("google").await.as_deref(), Some("existing-token"));
}

#[tokio::test]
async fn init_generates_and_stores_token_when_absent() {
    let store = Arc::new(MemorySessionStore::default());
    assert_eq!(store.get("google").await, None);

    let adapter = adapter("http://unused.invalid".to_string(), store.clone());
    adapter.init().await.unwrap();

    let token = store.get("google").await.expect("token stored at init");
    assert!(!token.is_empty());
}

#[tokio::test]
async fn init_fails_without_credential() {
    let store = Arc::new(MemorySessionStore::default());
    let adapter = GooglePlaces::new("", HttpClient::new().unwrap(), store);

    let result = adapter.init().await;
    assert!(matches!(
        result,
        Err(AdapterError::MissingCredential { provider: "google" })
    ));
}

#[tokio::test]
async fn suggest_before_init_is_rejected() {
    let store = Arc::new(MemorySessionStore::default());
    let adapter = adapter("http://unused.invalid".to_string(), store);

    let result = adapter.suggest("123 Main").await;
    assert!(matches!(result, Err(AdapterError::Uninitialized { .. })));
}

#[tokio::test]
async fn suggest_surfaces_http_errors() {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::default());

    Mock::given(method("POST"))
        .and(path("/v1/places:autocomplete"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let adapter = adapter(server.uri(), store);
    adapter.init().await.unwrap();

    let result = adapter.suggest("123 Main").await;
    assert!(matches!(
        result,
        Err(AdapterError::Status { status: 429, .. })
    ));
}

#[tokio::test]
async fn retrieve_fails_when_location_missing() {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::default());

    Mock::given(method("GET"))
        .and(path("/v1/places/place-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "place-a",
            "addressComponents": [
                { "longText": "123", "types": ["street_number"] }
            ]
        })))
        .mount(&server)
        .await;

    let adapter = adapter(server.uri(), store);
    adapter.init().await.unwrap();

    let suggestion = address_autocomplete_rs::Suggestion::new("place-a", "123 Main St");
    let result = adapter.retrieve(&suggestion).await;
    assert!(matches!(
        result,
        Err(AdapterError::Schema {
            field: "location",
            ..
        })
    ));
}
