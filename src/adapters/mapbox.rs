//! MapBox Search Box adapter
//!
//! Speaks the Search Box API v1 suggest/retrieve pair. Coordinates come back
//! as `[longitude, latitude]` arrays and are reversed into the canonical
//! (latitude, longitude) orientation here.

use super::traits::{Adapter, AdapterError};
use crate::address::{AddressComponents, ComponentKind, ComponentMap, Location, Suggestion};
use crate::config::MapBoxSettings;
use crate::session::SessionStore;
use crate::transport::{HttpClient, ProviderRequest};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const PROVIDER: &str = "mapbox";
const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/search/searchbox/v1";

/// Recognized suggest request options
///
/// Every field maps to one query parameter of the suggest endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapBoxSuggestOptions {
    pub bbox: Option<String>,
    pub country: Option<String>,
    pub eta_type: Option<String>,
    pub language: Option<String>,
    pub limit: Option<u8>,
    pub navigation_profile: Option<NavigationProfile>,
    pub origin: Option<String>,
    pub poi_category: Option<String>,
    pub poi_category_exclusions: Option<String>,
    pub proximity: Option<String>,
    pub route: Option<String>,
    pub route_geometry: Option<RouteGeometry>,
    pub time_deviation: Option<String>,
    pub types: Option<String>,
}

impl MapBoxSuggestOptions {
    /// Reject option combinations the provider would refuse
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(limit) = self.limit {
            if !(1..=10).contains(&limit) {
                anyhow::bail!("mapbox suggest limit must be between 1 and 10, got {limit}");
            }
        }
        if let Some(ref eta_type) = self.eta_type {
            if eta_type != "navigation" {
                anyhow::bail!("mapbox eta_type only accepts \"navigation\", got {eta_type:?}");
            }
        }
        Ok(())
    }

    fn apply(&self, mut request: ProviderRequest) -> ProviderRequest {
        let text_options = [
            ("bbox", &self.bbox),
            ("country", &self.country),
            ("eta_type", &self.eta_type),
            ("language", &self.language),
            ("origin", &self.origin),
            ("poi_category", &self.poi_category),
            ("poi_category_exclusions", &self.poi_category_exclusions),
            ("proximity", &self.proximity),
            ("route", &self.route),
            ("time_deviation", &self.time_deviation),
            ("types", &self.types),
        ];
        for (key, value) in text_options {
            if let Some(value) = value {
                request = request.param(key, value);
            }
        }
        if let Some(limit) = self.limit {
            request = request.param("limit", limit.to_string());
        }
        if let Some(profile) = self.navigation_profile {
            request = request.param("navigation_profile", profile.as_str());
        }
        if let Some(geometry) = self.route_geometry {
            request = request.param("route_geometry", geometry.as_str());
        }
        request
    }
}

/// Routing profile for ETA-aware suggestions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NavigationProfile {
    Driving,
    Walking,
    Cycling,
}

impl NavigationProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
        }
    }
}

/// Route encoding accepted by the suggest endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteGeometry {
    Polyline,
    Polyline6,
}

impl RouteGeometry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Polyline => "polyline",
            Self::Polyline6 => "polyline6",
        }
    }
}

/// Recognized retrieve request options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapBoxRetrieveOptions {
    pub attribute_sets: Option<String>,
    pub language: Option<String>,
}

impl MapBoxRetrieveOptions {
    fn apply(&self, mut request: ProviderRequest) -> ProviderRequest {
        if let Some(ref attribute_sets) = self.attribute_sets {
            request = request.param("attribute_sets", attribute_sets);
        }
        if let Some(ref language) = self.language {
            request = request.param("language", language);
        }
        request
    }
}

/// MapBox Search Box adapter instance
pub struct MapBoxSearch {
    access_token: String,
    base_url: String,
    client: HttpClient,
    store: Arc<dyn SessionStore>,
    suggest_options: MapBoxSuggestOptions,
    retrieve_options: MapBoxRetrieveOptions,
    session_token: OnceCell<String>,
}

impl MapBoxSearch {
    /// Create an adapter with default options
    pub fn new(
        access_token: impl Into<String>,
        client: HttpClient,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
            store,
            suggest_options: MapBoxSuggestOptions::default(),
            retrieve_options: MapBoxRetrieveOptions::default(),
            session_token: OnceCell::new(),
        }
    }

    /// Create an adapter from provider settings
    pub fn from_settings(
        settings: &MapBoxSettings,
        client: HttpClient,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self::new(settings.access_token.clone(), client, store)
            .with_options(settings.suggest.clone(), settings.retrieve.clone())
    }

    /// Set suggest and retrieve request options
    pub fn with_options(
        mut self,
        suggest: MapBoxSuggestOptions,
        retrieve: MapBoxRetrieveOptions,
    ) -> Self {
        self.suggest_options = suggest;
        self.retrieve_options = retrieve;
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

    fn normalize_feature(
        feature: &Feature,
        suggestion_id: &str,
    ) -> Result<AddressComponents, AdapterError> {
        if feature.geometry.coordinates.len() < 2 {
            return Err(AdapterError::Schema {
                provider: PROVIDER,
                field: "coordinates",
            });
        }
        // Native order is [longitude, latitude]
        let location = Location {
            latitude: feature.geometry.coordinates[1],
            longitude: feature.geometry.coordinates[0],
        };

        let context = &feature.properties.context;
        let mut map = ComponentMap::new();
        if let Some(ref address) = context.address {
            map.insert(ComponentKind::StreetNumber, None, Some(&address.address_number));
            map.insert(ComponentKind::Route, None, Some(&address.street_name));
        }
        if let Some(ref place) = context.place {
            map.insert(ComponentKind::Locality, None, Some(&place.name));
        }
        if let Some(ref region) = context.region {
            map.insert(
                ComponentKind::AdministrativeAreaLevel1,
                non_empty(&region.region_code),
                Some(&region.name),
            );
        }
        if let Some(ref postcode) = context.postcode {
            map.insert(ComponentKind::PostalCode, None, Some(&postcode.name));
        }
        if let Some(ref country) = context.country {
            map.insert(ComponentKind::Country, None, Some(&country.name));
        }

        Ok(map.assemble(suggestion_id, location))
    }
}

#[async_trait]
impl Adapter for MapBoxSearch {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn init(&self) -> Result<(), AdapterError> {
        if self.access_token.is_empty() {
            return Err(AdapterError::MissingCredential { provider: PROVIDER });
        }

        // Unlike the Google adapter, every init opens a fresh provider
        // session and replaces whatever the store held
        let fresh = Uuid::new_v4().to_string();
        self.store.set(PROVIDER, fresh.clone()).await;
        let _ = self.session_token.set(fresh);
        Ok(())
    }

    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, AdapterError> {
        let token = self.token()?.to_string();

        let request = ProviderRequest::get(format!("{}/suggest", self.base_url))
            .param("q", query)
            .param("access_token", &self.access_token)
            .param("session_token", token);
        let request = self.suggest_options.apply(request);

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
            .map(|entry| Suggestion::new(entry.mapbox_id, entry.full_address))
            .collect())
    }

    async fn retrieve(
        &self,
        suggestion: &Suggestion,
    ) -> Result<AddressComponents, AdapterError> {
        let token = self.token()?.to_string();

        let request = ProviderRequest::get(format!(
            "{}/retrieve/{}",
            self.base_url, suggestion.id
        ))
        .param("access_token", &self.access_token)
        .param("session_token", token);
        let request = self.retrieve_options.apply(request);

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

        let parsed: RetrieveResponse = response.json().map_err(|_| AdapterError::Schema {
            provider: PROVIDER,
            field: "features",
        })?;

        let feature = parsed.features.first().ok_or(AdapterError::Schema {
            provider: PROVIDER,
            field: "features",
        })?;

        Self::normalize_feature(feature, &suggestion.id)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

// Suggest endpoint:
// { "suggestions": [ { "mapbox_id": ..., "full_address": ..., ... } ] }
#[derive(Debug, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Vec<SuggestEntry>,
}

#[derive(Debug, Deserialize)]
struct SuggestEntry {
    mapbox_id: String,
    #[serde(default)]
    full_address: String,
}

// Retrieve endpoint: a GeoJSON feature collection whose first feature holds
// the typed context components and the [lon, lat] point
#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Geometry,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Default, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    context: Context,
}

#[derive(Debug, Default, Deserialize)]
struct Context {
    address: Option<ContextAddress>,
    place: Option<ContextEntry>,
    region: Option<ContextRegion>,
    postcode: Option<ContextEntry>,
    country: Option<ContextEntry>,
}

#[derive(Debug, Deserialize)]
struct ContextAddress {
    #[serde(default)]
    address_number: String,
    #[serde(default)]
    street_name: String,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ContextRegion {
    #[serde(default)]
    name: String,
    #[serde(default)]
    region_code: String,
}
