//! Transaction lifecycle tracking.
//!
//! # Data Flow
//! ```text
//! SessionStore (pending batches)
//!     → batch.rs (claim, one chain query per batch, atomic apply)
//!     → status.rs (raw status → lifecycle state, all-or-nothing reduce)
//!     → terminal BatchUpdate broadcast + optional balance refresh
//! ```
//!
//! # Design Decisions
//! - Batches are processed sequentially per cycle to keep ordering
//!   deterministic and avoid bursting the chain API
//! - A per-batch claim flag forbids overlapping polls; a per-batch poll
//!   sequence number drops stale out-of-order results
//! - Terminal classification is monotonic; a later response never revives
//!   a settled batch
//! - A per-batch query error is recorded on that batch and retried next
//!   cycle; it never aborts the cycle for other batches

pub mod batch;
pub mod status;

use async_trait::async_trait;
use thiserror::Error;

use crate::session::types::TransactionStatus;

pub use batch::BatchTracker;

/// Errors surfaced by the tracker for a single batch.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The chain status query for one batch failed.
    #[error("chain query failed for batch {session_id}: {message}")]
    ChainQuery { session_id: String, message: String },
}

/// Terminal transition of a tracked batch, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUpdate {
    /// The batch that settled.
    pub session_id: String,
    /// Its terminal state.
    pub status: TransactionStatus,
}

/// Account-refresh side effect, supplied by the host.
///
/// Fired at most once per tracking cycle, after all batches were checked,
/// when the caller opted in and at least one batch was still pending at
/// the start of the cycle.
#[async_trait]
pub trait AccountRefresher: Send + Sync {
    async fn refresh_account(&self);
}
