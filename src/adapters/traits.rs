//! Adapter trait and error types

use crate::address::{AddressComponents, Suggestion};
use async_trait::async_trait;
use thiserror::Error;

/// Failure taxonomy for adapter calls
///
/// Configuration failures are terminal for the instance; transport and
/// schema failures apply to the single call that produced them.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// No credential configured; `init()` can never succeed
    #[error("{provider}: missing API credential")]
    MissingCredential { provider: &'static str },

    /// A method was used before `init()` established a session token
    #[error("{provider}: adapter used before init() succeeded")]
    Uninitialized { provider: &'static str },

    /// Network-level failure reaching the provider
    #[error("{provider}: request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Provider answered with a non-success HTTP status
    #[error("{provider}: HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// Provider response is missing an expected field
    #[error("{provider}: response missing {field}")]
    Schema {
        provider: &'static str,
        field: &'static str,
    },
}

impl AdapterError {
    pub(crate) fn transport(provider: &'static str, source: anyhow::Error) -> Self {
        Self::Transport { provider, source }
    }

    /// Whether the failure is a configuration problem rather than a
    /// per-call one
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::Uninitialized { .. }
        )
    }
}

/// Capability set every place-search provider adapter must satisfy
///
/// Lifecycle: `init()` once per instance, then any number of `suggest`
/// calls, then `retrieve` with a suggestion produced by the *same*
/// instance. The session token established at `init()` travels, unmodified,
/// with every subsequent request.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Provider name; also the session-store key
    fn provider(&self) -> &str;

    /// Establish a fresh session token for this instance's lifetime
    async fn init(&self) -> Result<(), AdapterError>;

    /// Fetch ranked suggestions for raw user text
    ///
    /// Issues exactly one network call per invocation; debouncing belongs
    /// to the controller, not here.
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, AdapterError>;

    /// Resolve a suggestion into the canonical address record
    async fn retrieve(&self, suggestion: &Suggestion)
        -> Result<AddressComponents, AdapterError>;
}
