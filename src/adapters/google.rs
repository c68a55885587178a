//! Google Places adapter
//!
//! Speaks the Places API v1 autocomplete/details pair: suggestions via
//! `POST /v1/places:autocomplete`, resolution via `GET /v1/places/{id}`.
//! Both calls carry the session token established at `init()` so the
//! provider can bill them as one search session.

use super::traits::{Adapter, AdapterError};
use crate::address::{AddressComponents, ComponentKind, ComponentMap, Location, Suggestion};
use crate::config::GoogleSettings;
use crate::session::SessionStore;
use crate::transport::{HttpClient, ProviderRequest};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const PROVIDER: &str = "google";
const DEFAULT_BASE_URL: &str = "https://places.googleapis.com";

/// Fields requested from the details endpoint
const DETAILS_FIELDS: &str = "id,addressComponents,location";

/// Recognized autocomplete request options
///
/// Serializes directly into the suggest request body, so field names follow
/// the provider's camelCase taxonomy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleSuggestOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_region_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    /// Bias and restriction are mutually exclusive on the wire; the enum
    /// makes the invalid combination unrepresentable
    #[serde(flatten)]
    pub location_filter: Option<GoogleLocationFilter>,
}

/// Either-or location filter for suggest requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum GoogleLocationFilter {
    LocationBias(serde_json::Value),
    LocationRestriction(serde_json::Value),
}

/// Recognized place-details request options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceDetailsOptions {
    pub language_code: Option<String>,
    pub region_code: Option<String>,
}

/// Google Places adapter instance
pub struct GooglePlaces {
    api_key: String,
    base_url: String,
    client: HttpClient,
    store: Arc<dyn SessionStore>,
    suggest_options: GoogleSuggestOptions,
    details_options: PlaceDetailsOptions,
    session_token: OnceCell<String>,
}

impl GooglePlaces {
    /// Create an adapter with default options
    pub fn new(
        api_key: impl Into<String>,
        client: HttpClient,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
            store,
            suggest_options: GoogleSuggestOptions::default(),
            details_options: PlaceDetailsOptions::default(),
            session_token: OnceCell::new(),
        }
    }

    /// Create an adapter from provider settings
    pub fn from_settings(
        settings: &GoogleSettings,
        client: HttpClient,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self::new(settings.api_key.clone(), client, store)
            .with_options(settings.suggest.clone(), settings.place_details.clone())
    }

    /// Set suggest and place-details request options
    pub fn with_options(
        mut self,
        suggest: GoogleSuggestOptions,
        details: PlaceDetailsOptions,
    ) -> Self {
        self.suggest_options = suggest;
        self.details_options = details;
        self
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn token(&self) -> Result<&str, AdapterError> {
        self.session_token
            .get()
            .map(String::as_str)
            .ok_or(AdapterError::Uninitialized { provider: PROVIDER })
    }

    fn suggest_body(&self, query: &str, token: &str) -> serde_json::Value {
        let mut body = match serde_json::to_value(&self.suggest_options) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        body.insert("input".to_string(), json!(query));
        body.insert("sessionToken".to_string(), json!(token));
        serde_json::Value::Object(body)
    }

    fn normalize_details(details: PlaceDetailsResponse) -> Result<AddressComponents, AdapterError> {
        let location = details.location.ok_or(AdapterError::Schema {
            provider: PROVIDER,
            field: "location",
        })?;

        let mut map = ComponentMap::new();
        for component in &details.address_components {
            for kind in component.types.iter().filter_map(|t| component_kind(t)) {
                map.insert(
                    kind,
                    component.short_text.as_deref(),
                    component.long_text.as_deref(),
                );
            }
        }

        Ok(map.assemble(details.id, location))
    }
}

#[async_trait]
impl Adapter for GooglePlaces {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn init(&self) -> Result<(), AdapterError> {
        if self.api_key.is_empty() {
            return Err(AdapterError::MissingCredential { provider: PROVIDER });
        }

        // Reuse a token from an earlier run of this session if one survives,
        // otherwise open a new provider session
        let token = match self.store.get(PROVIDER).await {
            Some(existing) => existing,
            None => {
                let fresh = Uuid::new_v4().to_string();
                self.store.set(PROVIDER, fresh.clone()).await;
                fresh
            }
        };

        let _ = self.session_token.set(token);
        Ok(())
    }

    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, AdapterError> {
        let token = self.token()?.to_string();

        let request = ProviderRequest::post(format!("{}/v1/places:autocomplete", self.base_url))
            .param("key", &self.api_key)
            .json(self.suggest_body(query, &token));

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| AdapterError::transport(PROVIDER, e))?;

        if !response.is_success() {
            return Err(AdapterError::Status {
                provider: PROVIDER,
                status: response.status,
            });
        }

        let parsed: SuggestResponse = response.json().map_err(|_| AdapterError::Schema {
            provider: PROVIDER,
            field: "suggestions",
        })?;

        Ok(parsed
            .suggestions
            .into_iter()
            .map(|entry| {
                Suggestion::new(
                    entry.place_prediction.place_id,
                    entry.place_prediction.text.text,
                )
            })
            .collect())
    }

    async fn retrieve(
        &self,
        suggestion: &Suggestion,
    ) -> Result<AddressComponents, AdapterError> {
        let token = self.token()?.to_string();

        let mut request =
            ProviderRequest::get(format!("{}/v1/places/{}", self.base_url, suggestion.id))
                .param("fields", DETAILS_FIELDS)
                .param("key", &self.api_key)
                .param("sessionToken", token);

        if let Some(ref language_code) = self.details_options.language_code {
            request = request.param("languageCode", language_code);
        }
        if let Some(ref region_code) = self.details_options.region_code {
            request = request.param("regionCode", region_code);
        }

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| AdapterError::transport(PROVIDER, e))?;

        if !response.is_success() {
            return Err(AdapterError::Status {
                provider: PROVIDER,
                status: response.status,
            });
        }

        let details: PlaceDetailsResponse =
            response.json().map_err(|_| AdapterError::Schema {
                provider: PROVIDER,
                field: "addressComponents",
            })?;

        Self::normalize_details(details)
    }
}

/// Map the provider's component taxonomy onto the canonical kinds
fn component_kind(place_type: &str) -> Option<ComponentKind> {
    match place_type {
        "street_number" => Some(ComponentKind::StreetNumber),
        "route" => Some(ComponentKind::Route),
        "locality" => Some(ComponentKind::Locality),
        "administrative_area_level_1" => Some(ComponentKind::AdministrativeAreaLevel1),
        "postal_code" => Some(ComponentKind::PostalCode),
        "country" => Some(ComponentKind::Country),
        _ => None,
    }
}

// Response shapes, autocomplete endpoint:
// { "suggestions": [ { "placePrediction": { "placeId": ..., "text": { "text": ... } } } ] }
#[derive(Debug, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Vec<SuggestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestEntry {
    place_prediction: PlacePrediction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacePrediction {
    place_id: String,
    text: PredictionText,
}

#[derive(Debug, Deserialize)]
struct PredictionText {
    text: String,
}

// Details endpoint:
// { "id": ..., "addressComponents": [ { "longText", "shortText", "types" } ], "location": { "latitude", "longitude" } }
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceDetailsResponse {
    id: String,
    #[serde(default)]
    address_components: Vec<PlaceAddressComponent>,
    location: Option<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceAddressComponent {
    long_text: Option<String>,
    short_text: Option<String>,
    #[serde(default)]
    types: Vec<String>,
}
