//! address-autocomplete-rs: debounced address autocomplete over pluggable
//! place-search providers
//!
//! As a user types a partial address, the controller fetches ranked
//! suggestions from a provider adapter; selecting a suggestion resolves it
//! into a normalized, structured address with coordinates. Divergent
//! provider response shapes are normalized into one canonical schema.

pub mod adapters;
pub mod address;
pub mod config;
pub mod controller;
pub mod session;
pub mod transport;

pub use adapters::{create_adapter, Adapter, AdapterError, GooglePlaces, MapBoxSearch};
pub use address::{AddressComponents, Location, Suggestion};
pub use config::Settings;
pub use controller::{AutocompleteController, AutocompleteOptions, ControllerState};
pub use session::{MemorySessionStore, SessionStore};
pub use transport::HttpClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for provider requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 5;

/// Default debounce gap in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
