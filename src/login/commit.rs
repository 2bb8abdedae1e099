//! Shared final step of every login flow.
//!
//! # Data Flow
//! ```text
//! flow (extension / remote) resolves {address, signature?}
//!     → optional caller-supplied signature verification
//!     → commit auth state (address + token login)
//!     → install provider in the registry
//!     → dispatch the login event
//!     → post-login redirect hook
//! ```
//!
//! A verifier rejection aborts before anything is committed: the provider
//! is not registered and no event is emitted.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::LoginConfig;
use crate::login::guard::{AttemptPermit, LoginGuard};
use crate::login::types::{
    LoginError, LoginEvent, LoginMethod, LoginResult, RedirectHook, SignatureVerifier, TokenLogin,
};
use crate::provider::{AccountProvider, ProviderRegistry};
use crate::session::SessionStore;

/// Collaborators shared by all login flows.
pub struct LoginContext {
    guard: Arc<LoginGuard>,
    registry: Arc<ProviderRegistry>,
    config: LoginConfig,
    events: broadcast::Sender<LoginEvent>,
    verifier: Option<Arc<dyn SignatureVerifier>>,
    redirect: Option<RedirectHook>,
}

impl LoginContext {
    pub fn new(config: LoginConfig) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            guard: Arc::new(LoginGuard::new()),
            registry: Arc::new(ProviderRegistry::new()),
            config,
            events,
            verifier: None,
            redirect: None,
        }
    }

    /// Attach a caller-supplied signature verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Attach a caller-supplied post-login navigation hook.
    pub fn with_redirect(mut self, redirect: RedirectHook) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn guard(&self) -> &Arc<LoginGuard> {
        &self.guard
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &LoginConfig {
        &self.config
    }

    /// Subscribe to login events.
    pub fn subscribe_logins(&self) -> broadcast::Receiver<LoginEvent> {
        self.events.subscribe()
    }

    /// Absolute callback URL for a route, built against the configured
    /// application origin.
    pub(crate) fn callback_url(&self, route: &str) -> Result<String, LoginError> {
        let origin: url::Url = self
            .config
            .app_origin
            .parse()
            .map_err(|e| LoginError::Callback(format!("origin '{}': {}", self.config.app_origin, e)))?;
        let url = origin
            .join(route)
            .map_err(|e| LoginError::Callback(format!("route '{}': {}", route, e)))?;
        Ok(url.to_string())
    }

    /// Log out: best-effort provider logout, registry reset, auth clear,
    /// and disposal of the tracked session set.
    pub async fn logout(&self, store: &SessionStore) {
        let provider = self.registry.get_provider();
        if let Err(e) = provider.logout().await {
            tracing::warn!(error = %e, "provider logout failed");
        }
        self.registry.clear();
        self.guard.logout();
        store.clear();
    }
}

/// Commit a resolved login: verify, store, register, dispatch, redirect.
pub(crate) async fn commit_login(
    ctx: &LoginContext,
    permit: AttemptPermit,
    provider: Arc<dyn AccountProvider>,
    method: LoginMethod,
    address: String,
    signature: Option<String>,
    token: Option<String>,
    callback_route: &str,
) -> Result<LoginResult, LoginError> {
    if let Some(signature) = &signature {
        if let Some(verifier) = &ctx.verifier {
            verifier
                .verify(&address, signature, token.as_deref().unwrap_or_default())
                .await
                .map_err(|e| LoginError::SignatureVerificationFailed(e.to_string()))?;
        }
    }

    let token_login = signature.as_ref().map(|signature| TokenLogin {
        login_token: token.clone().unwrap_or_default(),
        signature: signature.clone(),
    });

    permit.commit(address.clone(), token_login);
    ctx.registry.set_provider(provider);

    let _ = ctx.events.send(LoginEvent {
        address: address.clone(),
        method,
    });

    match &ctx.redirect {
        Some(redirect) => redirect(callback_route),
        None => tracing::info!(route = %callback_route, "post-login navigation"),
    }

    Ok(LoginResult {
        address,
        signature,
        login_token: token,
    })
}
