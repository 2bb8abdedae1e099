//! Login flow types and error definitions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while negotiating a login.
///
/// User cancellation is deliberately *not* here: dismissing a prompt is a
/// normal outcome, reported through [`LoginOutcome::Cancelled`].
#[derive(Debug, Error)]
pub enum LoginError {
    /// A login attempt is already in flight, or a session is already
    /// authenticated. Retry after logout.
    #[error("a login attempt is already in progress or a session is already authenticated")]
    DuplicateLoginAttempt,

    /// The wallet extension is not installed in the host environment.
    #[error("wallet extension is not available")]
    ProviderUnavailable,

    /// The provider refused to initialize. Transient; re-initiating the
    /// flow may succeed.
    #[error("provider initialization failed: {0}")]
    ProviderInit(String),

    /// Unexpected provider error while negotiating.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider resolved with an inconsistent result, e.g. a signature
    /// without an address.
    #[error("invalid login result: {0}")]
    InvalidResult(String),

    /// The caller-supplied verifier rejected the signature. No partial
    /// login state is left behind.
    #[error("signature verification failed: {0}")]
    SignatureVerificationFailed(String),

    /// The pairing channel dropped before approval. A fresh pairing must
    /// be initiated explicitly.
    #[error("pairing channel lost: {0}")]
    ChannelLost(String),

    /// The callback route could not be combined with the configured
    /// application origin.
    #[error("invalid callback URL: {0}")]
    Callback(String),
}

impl From<crate::provider::ProviderError> for LoginError {
    fn from(e: crate::provider::ProviderError) -> Self {
        LoginError::Provider(e.to_string())
    }
}

/// How a successful login was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    Extension,
    Remote,
}

impl std::fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginMethod::Extension => write!(f, "extension"),
            LoginMethod::Remote => write!(f, "remote"),
        }
    }
}

/// Caller input for one login attempt.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    /// Route to navigate to after login; the configured default applies
    /// when absent.
    pub callback_route: Option<String>,

    /// Application-issued challenge the wallet should sign.
    pub token: Option<String>,
}

/// The data a successful login produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    /// Chain account identifier. Always present on success.
    pub address: String,

    /// Signature over the login token, when one was requested and the
    /// provider supports signing during login.
    pub signature: Option<String>,

    /// The token that was signed, if any. A signature is only meaningful
    /// paired with the exact token it was produced against.
    pub login_token: Option<String>,
}

/// How a login attempt ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Authenticated; the provider is registered and the event dispatched.
    Success(LoginResult),
    /// The user dismissed or rejected the prompt. Not an error.
    Cancelled,
}

/// Observable state of a login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Initializing,
    /// Waiting for the user to approve in the extension prompt.
    AwaitingApproval,
    /// Establishing the remote pairing session.
    Pairing,
    /// Paired; waiting for the remote wallet's decision.
    WaitingForApproval,
    Success,
    Cancelled,
    Failed,
}

/// A committed `{loginToken, signature}` pair, stored with the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLogin {
    pub login_token: String,
    pub signature: String,
}

/// Login event emitted to the surrounding application on every successful
/// login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEvent {
    pub address: String,
    #[serde(rename = "loginMethod")]
    pub method: LoginMethod,
}

/// Caller-supplied signature verification, awaited before a signed login
/// is committed. A rejection aborts the attempt.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify(
        &self,
        address: &str,
        signature: &str,
        login_token: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Caller-supplied post-login navigation. The default logs the intent;
/// hosts embed a real navigator.
pub type RedirectHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Receives the pairing connection URI/QR payload for out-of-band display.
pub type ConnectionUriHook = Arc<dyn Fn(&str) + Send + Sync>;
