//! Wallet provider abstraction.
//!
//! # Data Flow
//! ```text
//! login flow (extension / remote pairing)
//!     → negotiates with a concrete AccountProvider
//!     → on success, installs it into the ProviderRegistry
//!     → signing elsewhere in the host always reads the registry
//! ```
//!
//! # Design Decisions
//! - Providers are trait objects so flows and tests inject their own
//! - Exactly one provider is active at a time; installing a new one
//!   invalidates the previous one
//! - A null sentinel stands in for "not logged in" so readers never
//!   handle an Option

pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use registry::ProviderRegistry;

/// Errors surfaced by a concrete wallet provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No provider has been installed yet.
    #[error("no active wallet provider")]
    NoProvider,

    /// Provider initialization failed.
    #[error("provider init failed: {0}")]
    Init(String),

    /// The login call itself failed inside the provider.
    #[error("provider login failed: {0}")]
    Login(String),

    /// The logout call failed inside the provider.
    #[error("provider logout failed: {0}")]
    Logout(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Which connection mechanism a provider represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// The null sentinel: nothing is logged in.
    Null,
    /// Browser-injected wallet extension.
    Extension,
    /// Remotely paired wallet reached over a pairing channel.
    Remote,
}

/// The authenticated account held by a provider after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Chain account identifier.
    pub address: String,
    /// Signature over the login token, when one was requested.
    pub signature: Option<String>,
}

/// Options passed to a provider's login call.
#[derive(Debug, Clone)]
pub struct LoginOptions {
    /// Absolute URL the wallet should send the user back to.
    pub callback_url: String,
    /// Application-issued challenge the wallet should sign, if any.
    pub token: Option<String>,
}

/// Capability set of a concrete wallet connection.
///
/// Implementations live outside this crate (a browser bridge, a pairing
/// transport); the login flows only drive this interface.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Which mechanism this provider represents.
    fn kind(&self) -> ProviderKind;

    /// Prepare the provider. A `false` return is an expected, recoverable
    /// outcome (e.g. the extension refused to initialize), not an error.
    async fn init(&self) -> ProviderResult<bool>;

    /// Ask the provider to authenticate. On resolution the account is
    /// available through [`AccountProvider::account`].
    async fn login(&self, options: LoginOptions) -> ProviderResult<()>;

    /// Terminate the provider's session.
    async fn logout(&self) -> ProviderResult<()>;

    /// The authenticated account, once login resolved. `None` before login
    /// or when the user dismissed the prompt.
    fn account(&self) -> Option<Account>;
}

/// Null-object sentinel installed while nobody is logged in.
///
/// Every operation fails with [`ProviderError::NoProvider`] so misuse is
/// loud instead of silently signing with a stale provider.
#[derive(Debug, Default)]
pub struct NullProvider;

#[async_trait]
impl AccountProvider for NullProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Null
    }

    async fn init(&self) -> ProviderResult<bool> {
        Err(ProviderError::NoProvider)
    }

    async fn login(&self, _options: LoginOptions) -> ProviderResult<()> {
        Err(ProviderError::NoProvider)
    }

    async fn logout(&self) -> ProviderResult<()> {
        Ok(())
    }

    fn account(&self) -> Option<Account> {
        None
    }
}

/// Convenience constructor for the sentinel as a trait object.
pub fn null_provider() -> Arc<dyn AccountProvider> {
    Arc::new(NullProvider)
}
