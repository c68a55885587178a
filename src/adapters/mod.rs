//! Provider adapter module
//!
//! Defines the Adapter trait and the supported place-search providers.

mod traits;

// Adapter implementations
pub mod google;
pub mod mapbox;

pub use google::{GoogleLocationFilter, GooglePlaces, GoogleSuggestOptions, PlaceDetailsOptions};
pub use mapbox::{
    MapBoxRetrieveOptions, MapBoxSearch, MapBoxSuggestOptions, NavigationProfile, RouteGeometry,
};
pub use traits::{Adapter, AdapterError};

use crate::config::Settings;
use crate::session::SessionStore;
use crate::transport::HttpClient;
use std::sync::Arc;

/// Build an adapter by provider name
pub fn create_adapter(
    name: &str,
    settings: &Settings,
    client: HttpClient,
    store: Arc<dyn SessionStore>,
) -> Option<Box<dyn Adapter>> {
    match name.to_lowercase().as_str() {
        "google" | "google_places" => Some(Box::new(GooglePlaces::from_settings(
            &settings.providers.google,
            client,
            store,
        ))),
        "mapbox" | "map_box" => Some(Box::new(MapBoxSearch::from_settings(
            &settings.providers.mapbox,
            client,
            store,
        ))),
        _ => None,
    }
}

/// List available providers
pub fn list_providers() -> Vec<&'static str> {
    vec!["google", "mapbox"]
}
