//! Chain status API.
//!
//! # Data Flow
//! ```text
//! tracker (batch poll cycle)
//!     → ChainStatusApi::transaction_statuses(hashes)
//!     → gateway.rs (HTTP REST query with timeout)
//!     → raw status string per hash
//! ```
//!
//! # Design Decisions
//! - The tracker depends on the trait, not the HTTP client, so tests
//!   script chain responses without a network
//! - One query per batch; the gateway accepts the whole hash set

pub mod gateway;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub use gateway::GatewayClient;

/// Errors from the chain status API.
#[derive(Debug, Error)]
pub enum ChainApiError {
    /// Request construction or transport failure.
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured gateway URL cannot be combined with the endpoint.
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// The gateway answered with something other than the expected shape.
    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

/// Chain-side view of submitted transactions.
#[async_trait]
pub trait ChainStatusApi: Send + Sync {
    /// Current raw status per hash. Hashes unknown to the chain may be
    /// absent from the result; callers keep their previous status.
    async fn transaction_statuses(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, String>, ChainApiError>;
}
