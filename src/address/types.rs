//! Address type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A ranked candidate for a partial address query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    /// Opaque provider-specific handle, passed back on retrieval
    pub id: String,
    /// Human-readable label shown to the user
    pub text: String,
    /// Provider-specific passthrough fields
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Suggestion {
    /// Create a new suggestion
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            extra: HashMap::new(),
        }
    }

    /// Attach a provider-specific field
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Geographic coordinates in (latitude, longitude) order
///
/// Adapters must reorder provider-native pairs into this orientation before
/// constructing a `Location`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// The canonical normalized address record
///
/// String fields default to empty rather than being absent, so callers see a
/// uniform shape regardless of provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressComponents {
    /// Provider place identifier
    pub id: String,
    /// Street number and route
    pub address1: String,
    /// Secondary address line; no supported provider populates it
    pub address2: String,
    /// Locality
    pub city: String,
    /// First-level administrative area
    pub state: String,
    /// Postal code
    pub postal_code: String,
    /// Country
    pub country: String,
    /// Resolved coordinates
    pub location: Location,
    /// Provider-specific passthrough fields
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_extra_roundtrip() {
        let suggestion = Suggestion::new("a", "123 Main St, Springfield")
            .with_extra("feature_type", serde_json::json!("address"));

        let json = serde_json::to_string(&suggestion).unwrap();
        let back: Suggestion = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, "a");
        assert_eq!(back.extra["feature_type"], "address");
    }

    #[test]
    fn test_suggestion_extra_defaults_empty() {
        let back: Suggestion = serde_json::from_str(r#"{"id":"b","text":"x"}"#).unwrap();
        assert!(back.extra.is_empty());
    }
}
