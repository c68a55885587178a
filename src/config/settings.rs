//! Settings structures for address-autocomplete-rs configuration

use crate::adapters::{
    GoogleSuggestOptions, MapBoxRetrieveOptions, MapBoxSuggestOptions, PlaceDetailsOptions,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autocomplete: AutocompleteSettings,
    pub outgoing: OutgoingSettings,
    pub providers: ProviderSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (AUTOCOMPLETE_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("AUTOCOMPLETE_PROVIDER") {
            self.autocomplete.provider = Some(val);
        }
        if let Ok(val) = std::env::var("AUTOCOMPLETE_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse() {
                self.autocomplete.debounce_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("AUTOCOMPLETE_REQUEST_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.outgoing.request_timeout = timeout;
            }
        }
        if let Ok(val) = std::env::var("AUTOCOMPLETE_GOOGLE_API_KEY") {
            self.providers.google.api_key = val;
        }
        if let Ok(val) = std::env::var("AUTOCOMPLETE_MAPBOX_ACCESS_TOKEN") {
            self.providers.mapbox.access_token = val;
        }
    }

    /// Reject configurations a provider or the transport would refuse
    pub fn validate(&self) -> Result<()> {
        self.providers.mapbox.suggest.validate()?;

        for proxy in [
            &self.outgoing.proxies.http,
            &self.outgoing.proxies.https,
            &self.outgoing.proxies.all,
        ]
        .into_iter()
        .flatten()
        {
            url::Url::parse(proxy).with_context(|| format!("invalid proxy URL: {proxy}"))?;
        }

        Ok(())
    }
}

/// Autocomplete behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocompleteSettings {
    /// Provider to build the adapter from (google, mapbox)
    pub provider: Option<String>,
    /// Idle gap before a suggestion fetch, in milliseconds
    pub debounce_ms: u64,
}

impl Default for AutocompleteSettings {
    fn default() -> Self {
        Self {
            provider: None,
            debounce_ms: 1000,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send with every provider request
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Per-provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub google: GoogleSettings,
    pub mapbox: MapBoxSettings,
}

/// Google Places provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// API key; empty means the adapter can never initialize
    pub api_key: String,
    /// Autocomplete request options
    pub suggest: GoogleSuggestOptions,
    /// Place-details request options
    pub place_details: PlaceDetailsOptions,
}

/// MapBox Search Box provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapBoxSettings {
    /// Access token; empty means the adapter can never initialize
    pub access_token: String,
    /// Suggest request options
    pub suggest: MapBoxSuggestOptions,
    /// Retrieve request options
    pub retrieve: MapBoxRetrieveOptions,
}
