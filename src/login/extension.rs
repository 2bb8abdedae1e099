//! Login against a browser-injected wallet extension.
//!
//! # State Transitions
//! ```text
//! Idle → Initializing → AwaitingApproval → Success
//!                                        → Idle      (user dismissed)
//!                                        → Failed
//! ```
//!
//! # Design Decisions
//! - The "is the extension installed" probe is injected through
//!   [`ExtensionRuntime`] instead of an ambient global lookup, so the flow
//!   is testable without a real browser environment
//! - `init()` returning false is an expected, recoverable outcome handled
//!   as flow state; only unexpected provider errors carry a message

use std::sync::Arc;

use tokio::sync::watch;

use crate::login::commit::{commit_login, LoginContext};
use crate::login::types::{LoginError, LoginMethod, LoginOutcome, LoginRequest, LoginState};
use crate::provider::{AccountProvider, LoginOptions};

/// Host-environment capabilities the extension flow needs.
pub trait ExtensionRuntime: Send + Sync {
    /// Probe whether the wallet extension is present.
    fn is_installed(&self) -> bool;

    /// Handle to the injected wallet object.
    fn provider(&self) -> Arc<dyn AccountProvider>;
}

/// Negotiates a login with the browser-injected wallet.
pub struct ExtensionLoginFlow {
    ctx: Arc<LoginContext>,
    runtime: Arc<dyn ExtensionRuntime>,
    state: watch::Sender<LoginState>,
}

impl ExtensionLoginFlow {
    pub fn new(ctx: Arc<LoginContext>, runtime: Arc<dyn ExtensionRuntime>) -> Self {
        let (state, _) = watch::channel(LoginState::Idle);
        Self {
            ctx,
            runtime,
            state,
        }
    }

    /// Observe the flow's state transitions.
    pub fn state(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// Run one login attempt to completion.
    pub async fn initiate_login(&self, request: LoginRequest) -> Result<LoginOutcome, LoginError> {
        let permit = self.ctx.guard().begin_attempt()?;

        self.set_state(LoginState::Initializing);
        if !self.runtime.is_installed() {
            self.set_state(LoginState::Failed);
            return Err(LoginError::ProviderUnavailable);
        }

        let provider = self.runtime.provider();
        match provider.init().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("wallet extension refused to initialize");
                self.set_state(LoginState::Failed);
                return Err(LoginError::ProviderInit(
                    "extension refused to initialize".to_string(),
                ));
            }
            Err(e) => {
                self.set_state(LoginState::Failed);
                return Err(LoginError::ProviderInit(e.to_string()));
            }
        }

        let route = request
            .callback_route
            .clone()
            .unwrap_or_else(|| self.ctx.config().default_callback_route.clone());
        let callback_url = match self.ctx.callback_url(&route) {
            Ok(url) => url,
            Err(e) => {
                self.set_state(LoginState::Failed);
                return Err(e);
            }
        };

        self.set_state(LoginState::AwaitingApproval);
        if let Err(e) = provider
            .login(LoginOptions {
                callback_url,
                token: request.token.clone(),
            })
            .await
        {
            self.set_state(LoginState::Failed);
            return Err(e.into());
        }

        let account = match provider.account() {
            Some(account) => account,
            None => {
                tracing::info!("extension login cancelled");
                self.set_state(LoginState::Idle);
                return Ok(LoginOutcome::Cancelled);
            }
        };

        if account.address.is_empty() {
            if account.signature.is_some() {
                self.set_state(LoginState::Failed);
                return Err(LoginError::InvalidResult(
                    "signature present without an address".to_string(),
                ));
            }
            tracing::info!("extension login cancelled");
            self.set_state(LoginState::Idle);
            return Ok(LoginOutcome::Cancelled);
        }

        match commit_login(
            &self.ctx,
            permit,
            provider,
            LoginMethod::Extension,
            account.address,
            account.signature,
            request.token,
            &route,
        )
        .await
        {
            Ok(result) => {
                self.set_state(LoginState::Success);
                Ok(LoginOutcome::Success(result))
            }
            Err(e) => {
                self.set_state(LoginState::Failed);
                Err(e)
            }
        }
    }

    fn set_state(&self, state: LoginState) {
        self.state.send_replace(state);
    }
}
