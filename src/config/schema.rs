//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every section has a standalone `Default` so hosts can construct a working
//! configuration in code and override only what they need.

use serde::{Deserialize, Serialize};

/// Root configuration for the wallet link SDK.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletLinkConfig {
    /// Chain gateway settings (status API endpoint, timeouts).
    pub network: NetworkConfig,

    /// Login flow settings (application origin, callback route).
    pub login: LoginConfig,

    /// Transaction tracking settings (poll cadence, attempt budget).
    pub tracker: TrackerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base URL of the chain gateway REST API.
    pub gateway_url: String,

    /// Per-request timeout for gateway queries, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:7950".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Login flow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Origin of the host application, used to build provider callback URLs.
    pub app_origin: String,

    /// Route navigated to after a successful login when the caller does not
    /// supply one per attempt.
    pub default_callback_route: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            app_origin: "http://localhost:3000".to_string(),
            default_callback_route: "/".to_string(),
        }
    }
}

/// Transaction tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Delay between two polling cycles, in milliseconds.
    pub poll_interval_ms: u64,

    /// Number of poll attempts a batch is allowed before the tracker marks
    /// it timed out. Combined with `poll_interval_ms` this bounds how long
    /// a batch may stay pending.
    pub max_poll_attempts: u32,

    /// Whether the polling loop asks for an account balance refresh after a
    /// cycle that still had pending batches.
    pub refresh_balance: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            max_poll_attempts: 90,
            refresh_balance: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log level filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
