//! Login session state machine.
//!
//! # Data Flow
//! ```text
//! host selects a flow (extension.rs / remote.rs)
//!     → guard.rs claims the single system-wide attempt slot
//!     → flow negotiates with its provider / pairing channel
//!     → commit.rs verifies, stores auth state, installs the provider,
//!       dispatches the login event, runs the redirect hook
//! ```
//!
//! # Design Decisions
//! - Cancellation is an outcome, not an error
//! - Flow-local provider failures become flow state; nothing escapes as an
//!   unhandled async failure

pub mod commit;
pub mod extension;
pub mod guard;
pub mod remote;
pub mod types;

pub use commit::LoginContext;
pub use extension::{ExtensionLoginFlow, ExtensionRuntime};
pub use guard::{AttemptPermit, AuthState, LoginGuard};
pub use remote::{
    CancelHandle, ChannelError, PairingChannel, PairingEvent, PairingSession, RemoteLoginFlow,
};
pub use types::{
    ConnectionUriHook, LoginError, LoginEvent, LoginMethod, LoginOutcome, LoginRequest,
    LoginResult, LoginState, RedirectHook, SignatureVerifier, TokenLogin,
};
