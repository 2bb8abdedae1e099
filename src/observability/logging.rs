//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Respect `RUST_LOG` when set, fall back to the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Initialization is idempotent: a second call is a logged no-op so test
//!   binaries and embedding hosts cannot panic on double-init

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_level` is used when the `RUST_LOG` environment variable is not
/// set, e.g. `"info"` or `"wallet_link=debug"`.
pub fn init(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already initialized");
    }
}
