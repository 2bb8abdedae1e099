//! Login against a remotely paired wallet over a session-based channel.
//!
//! # State Transitions
//! ```text
//! Idle → Pairing → WaitingForApproval → Success
//!                                     → Cancelled  (user, or remote reject)
//!                                     → Failed     (channel lost, verify)
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative: the caller flips a shared cell, the flow
//!   observes it at the next suspension-point checkpoint
//! - Teardown of the pairing session happens exactly once per attempt and
//!   is best-effort: a network error is logged, never propagated, so
//!   teardown failure cannot block a cancellation
//! - An unexpected disconnect surfaces as `ChannelLost`; the flow never
//!   reconnects on its own

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::login::commit::{commit_login, LoginContext};
use crate::login::types::{
    ConnectionUriHook, LoginError, LoginMethod, LoginOutcome, LoginRequest, LoginState,
};
use crate::provider::AccountProvider;

/// Transport failure on the pairing channel.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ChannelError(pub String);

/// Events emitted by the remote wallet over the pairing session.
#[derive(Debug, Clone)]
pub enum PairingEvent {
    /// The user approved on their device.
    Approved {
        address: String,
        signature: Option<String>,
    },
    /// The user rejected on their device.
    Rejected,
    /// The channel dropped before a decision.
    Disconnected,
}

/// An established pairing session.
pub struct PairingSession {
    /// URI/QR payload for out-of-band display. Handed to the caller, not
    /// rendered here.
    pub connection_uri: String,
    /// Session event stream.
    pub events: mpsc::UnboundedReceiver<PairingEvent>,
}

/// The out-of-band pairing transport.
///
/// `teardown` must release local session state unconditionally; notifying
/// the remote side is best-effort and must not block indefinitely.
#[async_trait]
pub trait PairingChannel: Send + Sync {
    /// Establish a session and start listening for its events.
    async fn connect(&self) -> Result<PairingSession, ChannelError>;

    /// Release the current session.
    async fn teardown(&self) -> Result<(), ChannelError>;

    /// Provider representing the paired wallet, registered on success.
    fn provider(&self) -> Arc<dyn AccountProvider>;
}

/// Shared cell the caller flips to abandon an in-flight remote login.
#[derive(Clone)]
pub struct CancelHandle {
    cell: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { cell: Arc::new(tx) }
    }

    /// Request cancellation of the current attempt.
    pub fn cancel(&self) {
        self.cell.send_replace(true);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.cell.borrow()
    }

    fn reset(&self) {
        self.cell.send_replace(false);
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.cell.subscribe()
    }
}

/// Negotiates a login with a remotely paired wallet.
pub struct RemoteLoginFlow {
    ctx: Arc<LoginContext>,
    channel: Arc<dyn PairingChannel>,
    on_connection_uri: Option<ConnectionUriHook>,
    cancel: CancelHandle,
    state: watch::Sender<LoginState>,
}

impl RemoteLoginFlow {
    pub fn new(ctx: Arc<LoginContext>, channel: Arc<dyn PairingChannel>) -> Self {
        let (state, _) = watch::channel(LoginState::Idle);
        Self {
            ctx,
            channel,
            on_connection_uri: None,
            cancel: CancelHandle::new(),
            state,
        }
    }

    /// Attach a hook receiving the connection URI for QR display.
    pub fn with_connection_uri_hook(mut self, hook: ConnectionUriHook) -> Self {
        self.on_connection_uri = Some(hook);
        self
    }

    /// Handle the caller can use to cancel the in-flight attempt.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Observe the flow's state transitions.
    pub fn state(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// Run one login attempt to completion.
    pub async fn initiate_login(&self, request: LoginRequest) -> Result<LoginOutcome, LoginError> {
        let permit = self.ctx.guard().begin_attempt()?;
        // Cancellation applies to this attempt only
        self.cancel.reset();
        let mut cancel = self.cancel.watch();

        self.set_state(LoginState::Pairing);
        let mut session = match self.channel.connect().await {
            Ok(session) => session,
            Err(e) => {
                self.set_state(LoginState::Failed);
                return Err(LoginError::ChannelLost(e.to_string()));
            }
        };

        if let Some(hook) = &self.on_connection_uri {
            hook(&session.connection_uri);
        }

        // Checkpoint: pairing was a suspension point, the caller may have
        // cancelled meanwhile
        if *cancel.borrow() {
            return self.cancelled(permit).await;
        }

        self.set_state(LoginState::WaitingForApproval);

        let route = request
            .callback_route
            .clone()
            .unwrap_or_else(|| self.ctx.config().default_callback_route.clone());

        tokio::select! {
            _ = async { let _ = cancel.wait_for(|cancelled| *cancelled).await; } => {
                self.cancelled(permit).await
            }
            event = session.events.recv() => match event {
                Some(PairingEvent::Approved { address, signature }) => {
                    if address.is_empty() {
                        if signature.is_some() {
                            self.teardown().await;
                            self.set_state(LoginState::Failed);
                            return Err(LoginError::InvalidResult(
                                "signature present without an address".to_string(),
                            ));
                        }
                        tracing::info!("remote login approved without an address, treated as cancelled");
                        self.teardown().await;
                        self.set_state(LoginState::Cancelled);
                        return Ok(LoginOutcome::Cancelled);
                    }

                    match commit_login(
                        &self.ctx,
                        permit,
                        self.channel.provider(),
                        LoginMethod::Remote,
                        address,
                        signature,
                        request.token.clone(),
                        &route,
                    )
                    .await
                    {
                        Ok(result) => {
                            self.set_state(LoginState::Success);
                            Ok(LoginOutcome::Success(result))
                        }
                        Err(e) => {
                            self.teardown().await;
                            self.set_state(LoginState::Failed);
                            Err(e)
                        }
                    }
                }
                Some(PairingEvent::Rejected) => {
                    tracing::info!("remote login rejected by the wallet");
                    self.teardown().await;
                    self.set_state(LoginState::Cancelled);
                    Ok(LoginOutcome::Cancelled)
                }
                Some(PairingEvent::Disconnected) | None => {
                    self.set_state(LoginState::Failed);
                    Err(LoginError::ChannelLost(
                        "pairing channel disconnected before approval".to_string(),
                    ))
                }
            }
        }
    }

    async fn cancelled(
        &self,
        permit: crate::login::guard::AttemptPermit,
    ) -> Result<LoginOutcome, LoginError> {
        tracing::info!("remote login cancelled");
        self.teardown().await;
        drop(permit);
        self.set_state(LoginState::Cancelled);
        Ok(LoginOutcome::Cancelled)
    }

    /// Release the pairing session. Failure is logged, never propagated:
    /// teardown errors must not block the outcome.
    async fn teardown(&self) {
        if let Err(e) = self.channel.teardown().await {
            tracing::warn!(error = %e, "pairing session teardown failed");
        }
    }

    fn set_state(&self, state: LoginState) {
        self.state.send_replace(state);
    }
}
