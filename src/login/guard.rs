//! Single-attempt login guarding and committed auth state.
//!
//! # Invariants
//! - At most one login attempt is in flight system-wide
//! - Re-initiating a login against an authenticated session fails with
//!   `DuplicateLoginAttempt` instead of silently proceeding; a second
//!   login could desynchronize the active provider from the stored session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::login::types::{LoginError, TokenLogin};

/// The authenticated session, present after a committed login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    /// Chain account identifier of the logged-in user.
    pub address: String,
    /// Token/signature pair for signed logins.
    pub token_login: Option<TokenLogin>,
}

/// Gatekeeper for login attempts.
pub struct LoginGuard {
    in_flight: AtomicBool,
    auth: Mutex<Option<AuthState>>,
}

impl LoginGuard {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            auth: Mutex::new(None),
        }
    }

    /// Whether a session is already authenticated.
    pub fn is_logged_in(&self) -> bool {
        self.auth.lock().expect("auth lock poisoned").is_some()
    }

    /// Whether a new login attempt would be allowed.
    pub fn can_attempt_login(&self) -> bool {
        !self.is_logged_in() && !self.in_flight.load(Ordering::SeqCst)
    }

    /// Claim the right to run one login attempt.
    ///
    /// The returned permit releases the claim when dropped, so error paths
    /// in a flow cannot leak a stuck "in flight" flag.
    pub fn begin_attempt(self: &Arc<Self>) -> Result<AttemptPermit, LoginError> {
        if self.is_logged_in() {
            return Err(LoginError::DuplicateLoginAttempt);
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(LoginError::DuplicateLoginAttempt);
        }
        Ok(AttemptPermit {
            guard: Arc::clone(self),
        })
    }

    /// The committed auth state, if any.
    pub fn auth_state(&self) -> Option<AuthState> {
        self.auth.lock().expect("auth lock poisoned").clone()
    }

    /// Clear the authenticated session.
    pub fn logout(&self) {
        let mut auth = self.auth.lock().expect("auth lock poisoned");
        if auth.take().is_some() {
            tracing::info!("session logged out");
        }
    }

    fn commit(&self, state: AuthState) {
        *self.auth.lock().expect("auth lock poisoned") = Some(state);
    }
}

impl Default for LoginGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive claim on the system-wide login attempt slot.
pub struct AttemptPermit {
    guard: Arc<LoginGuard>,
}

impl AttemptPermit {
    /// Commit a successful login and release the attempt slot.
    pub fn commit(self, address: String, token_login: Option<TokenLogin>) {
        tracing::info!(address = %address, "login committed");
        self.guard.commit(AuthState {
            address,
            token_login,
        });
        // Drop releases the in-flight flag
    }
}

impl Drop for AttemptPermit {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_attempt_in_flight() {
        let guard = Arc::new(LoginGuard::new());

        let permit = guard.begin_attempt().unwrap();
        assert!(matches!(
            guard.begin_attempt(),
            Err(LoginError::DuplicateLoginAttempt)
        ));

        drop(permit);
        assert!(guard.begin_attempt().is_ok());
    }

    #[test]
    fn test_logged_in_blocks_attempts() {
        let guard = Arc::new(LoginGuard::new());

        let permit = guard.begin_attempt().unwrap();
        permit.commit("erd1alice".to_string(), None);

        assert!(guard.is_logged_in());
        assert!(!guard.can_attempt_login());
        assert!(matches!(
            guard.begin_attempt(),
            Err(LoginError::DuplicateLoginAttempt)
        ));

        guard.logout();
        assert!(guard.can_attempt_login());
        assert!(guard.begin_attempt().is_ok());
    }

    #[test]
    fn test_dropped_permit_leaves_no_auth() {
        let guard = Arc::new(LoginGuard::new());

        let permit = guard.begin_attempt().unwrap();
        drop(permit);

        assert!(!guard.is_logged_in());
        assert!(guard.auth_state().is_none());
    }

    #[test]
    fn test_commit_stores_token_login() {
        let guard = Arc::new(LoginGuard::new());
        let permit = guard.begin_attempt().unwrap();
        permit.commit(
            "erd1alice".to_string(),
            Some(TokenLogin {
                login_token: "challenge".to_string(),
                signature: "sig".to_string(),
            }),
        );

        let auth = guard.auth_state().unwrap();
        assert_eq!(auth.address, "erd1alice");
        assert_eq!(auth.token_login.unwrap().login_token, "challenge");
    }
}
