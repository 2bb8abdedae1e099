//! Single source of truth for the active wallet provider.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::provider::{null_provider, AccountProvider, ProviderKind};

/// Holds the one provider currently authorized to sign.
///
/// Writes are last-writer-wins with no merge semantics: installing a new
/// provider implicitly invalidates the previous one. Validation happens in
/// the login flows before they call [`ProviderRegistry::set_provider`];
/// the registry itself performs none.
pub struct ProviderRegistry {
    active: ArcSwap<Slot>,
}

/// Sized cell around the trait object so it can live in an `ArcSwap`.
struct Slot(Arc<dyn AccountProvider>);

impl ProviderRegistry {
    /// Create a registry holding the null sentinel.
    pub fn new() -> Self {
        Self {
            active: ArcSwap::from_pointee(Slot(null_provider())),
        }
    }

    /// Replace the active provider unconditionally.
    pub fn set_provider(&self, provider: Arc<dyn AccountProvider>) {
        tracing::debug!(kind = ?provider.kind(), "active provider replaced");
        self.active.store(Arc::new(Slot(provider)));
    }

    /// The currently active provider, or the null sentinel when nobody is
    /// logged in.
    pub fn get_provider(&self) -> Arc<dyn AccountProvider> {
        self.active.load().0.clone()
    }

    /// Reset back to the null sentinel (logout).
    pub fn clear(&self) {
        self.active.store(Arc::new(Slot(null_provider())));
    }

    /// Whether a real provider is installed.
    pub fn has_provider(&self) -> bool {
        self.get_provider().kind() != ProviderKind::Null
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
