//! Provider-agnostic component normalization
//!
//! Every provider returns a collection of typed address sub-components under
//! its own taxonomy. Adapters translate their native component types into
//! [`ComponentKind`] entries here, and the map assembles the canonical record
//! the same way for all of them.

use super::{AddressComponents, Location};
use std::collections::HashMap;

/// The typed sub-components the canonical schema is assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    StreetNumber,
    Route,
    Locality,
    AdministrativeAreaLevel1,
    PostalCode,
    Country,
}

/// Mapping from component kind to its preferred display text
///
/// The short/abbreviated form wins over the long form when both exist; a
/// later insert for the same kind overwrites an earlier one.
#[derive(Debug, Default)]
pub struct ComponentMap {
    texts: HashMap<ComponentKind, String>,
}

impl ComponentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a component, preferring its short form over its long form
    pub fn insert(&mut self, kind: ComponentKind, short: Option<&str>, long: Option<&str>) {
        let text = short.or(long).unwrap_or_default();
        self.texts.insert(kind, text.to_string());
    }

    /// Display text for a kind, empty when the provider never sent it
    pub fn text(&self, kind: ComponentKind) -> &str {
        self.texts.get(&kind).map(String::as_str).unwrap_or("")
    }

    /// Street number and route joined by a single space
    ///
    /// The space is emitted even when one side is empty; downstream consumers
    /// rely on that exact composition.
    pub fn address1(&self) -> String {
        format!(
            "{} {}",
            self.text(ComponentKind::StreetNumber),
            self.text(ComponentKind::Route)
        )
    }

    /// Assemble the canonical record from the collected components
    pub fn assemble(&self, id: impl Into<String>, location: Location) -> AddressComponents {
        AddressComponents {
            id: id.into(),
            address1: self.address1(),
            address2: String::new(),
            city: self.text(ComponentKind::Locality).to_string(),
            state: self.text(ComponentKind::AdministrativeAreaLevel1).to_string(),
            postal_code: self.text(ComponentKind::PostalCode).to_string(),
            country: self.text(ComponentKind::Country).to_string(),
            location,
            extra: HashMap::new(),
        }
    }
}
