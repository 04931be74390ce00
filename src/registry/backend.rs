//! Registry backend trait definition

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::error::RegistryResult;

/// Stable storage for the set of known service identifiers
///
/// The registry always hands the backend the *full* set, so implementations
/// replace whatever they stored before instead of appending to it.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync`; the registry serializes calls to
/// `save` itself, so a backend never sees two concurrent writes.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Load the persisted set
    ///
    /// A backend that has never been written to returns an empty set rather
    /// than an error.
    async fn load(&self) -> RegistryResult<BTreeSet<String>>;

    /// Replace the persisted set with `services`
    ///
    /// Must either fully succeed or leave the previously persisted set intact.
    async fn save(&self, services: &BTreeSet<String>) -> RegistryResult<()>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}
