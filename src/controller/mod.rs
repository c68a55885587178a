//! Autocomplete controller
//!
//! Owns the UI-facing state and sequences adapter calls: one `init()` at
//! construction, debounced suggestion fetches on every keystroke, and
//! suggestion resolution on selection. Every adapter failure is converted
//! into a state change and a log event; nothing propagates to the caller.

use crate::adapters::Adapter;
use crate::address::{AddressComponents, Suggestion};
use crate::config::AutocompleteSettings;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Default idle gap before a suggestion fetch is issued
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Controller construction options
#[derive(Debug, Clone)]
pub struct AutocompleteOptions {
    /// Minimum idle gap since the last keystroke before fetching
    pub debounce: Duration,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl From<&AutocompleteSettings> for AutocompleteOptions {
    fn from(settings: &AutocompleteSettings) -> Self {
        Self {
            debounce: Duration::from_millis(settings.debounce_ms),
        }
    }
}

/// Observable controller state, exposed to callers as a snapshot
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    /// Current input text
    pub value: String,
    /// Whether the adapter finished `init()` successfully
    pub ready: bool,
    /// Whether a suggestion fetch is pending or in flight
    pub loading_suggestions: bool,
    /// Latest suggestion list, replaced wholesale per fetch
    pub suggestions: Vec<Suggestion>,
    /// Resolved address of the last successful selection
    pub selected_address: Option<AddressComponents>,
}

/// Debounced autocomplete state machine over one adapter instance
///
/// Must be created inside a tokio runtime; construction spawns the one-shot
/// adapter init task.
pub struct AutocompleteController {
    inner: Arc<Inner>,
}

struct Inner {
    adapter: Arc<dyn Adapter>,
    debounce: Duration,
    state: Mutex<ControllerState>,
    /// Monotonic fetch generation; replies from older generations are
    /// discarded so a slow stale response can never overwrite a newer list
    generation: AtomicU64,
    pending_timer: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().expect("controller state lock poisoned")
    }

    async fn fetch_suggestions(self: Arc<Self>, query: String, generation: u64) {
        debug!(provider = self.adapter.provider(), %query, "fetching suggestions");
        match self.adapter.suggest(&query).await {
            Ok(suggestions) => {
                let mut state = self.lock_state();
                if self.generation.load(Ordering::SeqCst) == generation {
                    state.suggestions = suggestions;
                    state.loading_suggestions = false;
                }
            }
            Err(e) => {
                warn!(provider = self.adapter.provider(), "suggestion fetch failed: {e}");
                let mut state = self.lock_state();
                if self.generation.load(Ordering::SeqCst) == generation {
                    state.loading_suggestions = false;
                }
            }
        }
    }
}

impl AutocompleteController {
    /// Create a controller and start the one-shot adapter init
    pub fn new(adapter: Arc<dyn Adapter>, options: AutocompleteOptions) -> Self {
        let inner = Arc::new(Inner {
            adapter,
            debounce: options.debounce,
            state: Mutex::new(ControllerState::default()),
            generation: AtomicU64::new(0),
            pending_timer: Mutex::new(None),
        });

        let init_inner = Arc::clone(&inner);
        tokio::spawn(async move {
            match init_inner.adapter.init().await {
                Ok(()) => {
                    init_inner.lock_state().ready = true;
                }
                // No retry: the instance stays not-ready for its lifetime
                Err(e) => {
                    error!(
                        provider = init_inner.adapter.provider(),
                        "adapter init failed: {e}"
                    );
                }
            }
        });

        Self { inner }
    }

    /// Update the input text and schedule a debounced suggestion fetch
    ///
    /// The visible text and the loading flag change synchronously. Within a
    /// debounce window only the last value ever reaches the adapter: each
    /// call supersedes the previous generation and aborts its un-fired
    /// timer. A fetch that is already in flight keeps running; its reply is
    /// discarded as stale.
    pub fn set_value(&self, new_value: impl Into<String>) {
        let new_value = new_value.into();

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.inner.lock_state();
            state.value = new_value.clone();
            state.loading_suggestions = true;
        }

        let timer_inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timer_inner.debounce).await;
            if timer_inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            // Detach the fetch so aborting a later timer never kills an
            // in-flight request
            let fetch_inner = Arc::clone(&timer_inner);
            tokio::spawn(fetch_inner.fetch_suggestions(new_value, generation));
        });

        let previous = self
            .inner
            .pending_timer
            .lock()
            .expect("controller timer lock poisoned")
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Resolve a suggestion into a normalized address
    ///
    /// On success the resolved address is stored, the input text becomes the
    /// suggestion's label, and the suggestion list is cleared. On failure
    /// the error is logged and state is left unchanged.
    pub async fn select_suggestion(&self, suggestion: &Suggestion) {
        match self.inner.adapter.retrieve(suggestion).await {
            Ok(address) => {
                let mut state = self.inner.lock_state();
                state.selected_address = Some(address);
                state.value = suggestion.text.clone();
                state.suggestions = Vec::new();
            }
            Err(e) => {
                error!(
                    provider = self.inner.adapter.provider(),
                    suggestion = %suggestion.id,
                    "failed to resolve suggestion: {e}"
                );
            }
        }
    }

    /// Snapshot of the full observable state
    pub fn state(&self) -> ControllerState {
        self.inner.lock_state().clone()
    }

    /// Current input text
    pub fn value(&self) -> String {
        self.inner.lock_state().value.clone()
    }

    /// Whether the adapter is initialized and the input should be enabled
    pub fn ready(&self) -> bool {
        self.inner.lock_state().ready
    }

    /// Whether a suggestion fetch is pending or in flight
    pub fn loading_suggestions(&self) -> bool {
        self.inner.lock_state().loading_suggestions
    }

    /// Latest suggestion list
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.inner.lock_state().suggestions.clone()
    }

    /// Resolved address of the last successful selection
    pub fn selected_address(&self) -> Option<AddressComponents> {
        self.inner.lock_state().selected_address.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::AdapterError;
    use crate::address::Location;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct StubAdapter {
        fail_init: bool,
        fail_suggest: bool,
        fail_retrieve: bool,
        /// Per-call artificial latency, popped front per suggest call
        delays: Mutex<VecDeque<Duration>>,
        /// Per-call canned results; falls back to one echo suggestion
        canned: Mutex<VecDeque<Vec<Suggestion>>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubAdapter {
        fn suggest_calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Adapter for StubAdapter {
        fn provider(&self) -> &str {
            "stub"
        }

        async fn init(&self) -> Result<(), AdapterError> {
            if self.fail_init {
                return Err(AdapterError::MissingCredential { provider: "stub" });
            }
            Ok(())
        }

        async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, AdapterError> {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = self.delays.lock().unwrap().pop_front();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_suggest {
                return Err(AdapterError::Status {
                    provider: "stub",
                    status: 500,
                });
            }
            let canned = self.canned.lock().unwrap().pop_front();
            Ok(canned.unwrap_or_else(|| vec![Suggestion::new(format!("id-{query}"), query)]))
        }

        async fn retrieve(
            &self,
            suggestion: &Suggestion,
        ) -> Result<AddressComponents, AdapterError> {
            if self.fail_retrieve {
                return Err(AdapterError::Status {
                    provider: "stub",
                    status: 500,
                });
            }
            Ok(AddressComponents {
                id: suggestion.id.clone(),
                address1: "123 Main St".to_string(),
                address2: String::new(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                postal_code: "62701".to_string(),
                country: "United States".to_string(),
                location: Location {
                    latitude: 39.8,
                    longitude: -89.5,
                },
                extra: Default::default(),
            })
        }
    }

    fn controller(adapter: StubAdapter, debounce: Duration) -> (AutocompleteController, Arc<StubAdapter>) {
        let adapter = Arc::new(adapter);
        let controller =
            AutocompleteController::new(adapter.clone(), AutocompleteOptions { debounce });
        (controller, adapter)
    }

    #[tokio::test]
    async fn test_ready_after_successful_init() {
        let (controller, _) = controller(StubAdapter::default(), DEFAULT_DEBOUNCE);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(controller.ready());

        // and stays ready
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(controller.ready());
    }

    #[tokio::test]
    async fn test_never_ready_after_failed_init() {
        let (controller, _) = controller(
            StubAdapter {
                fail_init: true,
                ..Default::default()
            },
            DEFAULT_DEBOUNCE,
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!controller.ready());
    }

    #[tokio::test]
    async fn test_burst_issues_single_fetch_with_last_value() {
        let (controller, adapter) = controller(StubAdapter::default(), Duration::from_millis(80));

        controller.set_value("1");
        controller.set_value("12");
        controller.set_value("123 Main");
        assert_eq!(controller.value(), "123 Main");
        assert!(controller.loading_suggestions());

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(adapter.suggest_calls(), vec!["123 Main".to_string()]);
        assert!(!controller.loading_suggestions());
        assert_eq!(controller.suggestions().len(), 1);
        assert_eq!(controller.suggestions()[0].text, "123 Main");
    }

    #[tokio::test]
    async fn test_spaced_calls_each_fetch() {
        let (controller, adapter) = controller(StubAdapter::default(), Duration::from_millis(30));

        controller.set_value("12");
        tokio::time::sleep(Duration::from_millis(120)).await;
        controller.set_value("123");
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(
            adapter.suggest_calls(),
            vec!["12".to_string(), "123".to_string()]
        );
    }

    #[tokio::test]
    async fn test_query_resolution_scenario() {
        let stub = StubAdapter::default();
        stub.canned.lock().unwrap().push_back(vec![
            Suggestion::new("a", "123 Main St, Springfield"),
            Suggestion::new("b", "123 Main Ave, Springfield"),
        ]);
        let (controller, _) = controller(stub, Duration::from_millis(30));

        controller.set_value("123 Main");
        tokio::time::sleep(Duration::from_millis(200)).await;

        let state = controller.state();
        assert!(!state.loading_suggestions);
        assert_eq!(state.suggestions.len(), 2);
        assert_eq!(state.suggestions[0].id, "a");
        assert_eq!(state.suggestions[1].id, "b");
    }

    #[tokio::test]
    async fn test_stale_reply_cannot_overwrite_newer_one() {
        let stub = StubAdapter::default();
        // First fetch is slow, second returns immediately
        stub.delays
            .lock()
            .unwrap()
            .push_back(Duration::from_millis(250));
        let (controller, adapter) = controller(stub, Duration::from_millis(20));

        controller.set_value("first");
        tokio::time::sleep(Duration::from_millis(80)).await; // timer fired, fetch in flight
        controller.set_value("second");
        tokio::time::sleep(Duration::from_millis(500)).await; // both fetches done

        assert_eq!(
            adapter.suggest_calls(),
            vec!["first".to_string(), "second".to_string()]
        );
        let state = controller.state();
        assert_eq!(state.suggestions.len(), 1);
        assert_eq!(state.suggestions[0].text, "second");
        assert!(!state.loading_suggestions);
    }

    #[tokio::test]
    async fn test_failed_fetch_clears_loading_flag() {
        let (controller, _) = controller(
            StubAdapter {
                fail_suggest: true,
                ..Default::default()
            },
            Duration::from_millis(30),
        );

        controller.set_value("123 Main");
        assert!(controller.loading_suggestions());

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!controller.loading_suggestions());
        assert!(controller.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_select_suggestion_resolves_and_collapses() {
        let (controller, _) = controller(StubAdapter::default(), Duration::from_millis(30));

        controller.set_value("123 Main");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!controller.suggestions().is_empty());

        let suggestion = Suggestion::new("a", "123 Main St, Springfield");
        controller.select_suggestion(&suggestion).await;

        let state = controller.state();
        assert!(state.suggestions.is_empty());
        assert_eq!(state.value, "123 Main St, Springfield");
        let address = state.selected_address.unwrap();
        assert_eq!(address.id, "a");
        assert_eq!(address.location.latitude, 39.8);
        assert_eq!(address.location.longitude, -89.5);
    }

    #[tokio::test]
    async fn test_failed_selection_leaves_state_unchanged() {
        let (controller, _) = controller(
            StubAdapter {
                fail_retrieve: true,
                ..Default::default()
            },
            Duration::from_millis(30),
        );

        controller.set_value("123 Main");
        tokio::time::sleep(Duration::from_millis(200)).await;
        let before = controller.state();
        assert!(!before.suggestions.is_empty());

        let suggestion = Suggestion::new("a", "123 Main St, Springfield");
        controller.select_suggestion(&suggestion).await;

        let after = controller.state();
        assert_eq!(after.value, before.value);
        assert_eq!(after.suggestions, before.suggestions);
        assert!(after.selected_address.is_none());
    }

    #[test]
    fn test_options_from_settings() {
        let settings = AutocompleteSettings {
            debounce_ms: 250,
            ..Default::default()
        };
        let options = AutocompleteOptions::from(&settings);
        assert_eq!(options.debounce, Duration::from_millis(250));
    }
}
