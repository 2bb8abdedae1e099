//! Session and transaction data model.
//!
//! Everything here is plain serializable data so the active session set can
//! be handed to an external key-value store and restored after a page
//! reload. Poll bookkeeping that must not survive a restore is marked
//! `#[serde(skip)]`.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a transaction or a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Not yet settled on chain; polling continues.
    Pending,
    /// Executed successfully. Terminal.
    Successful,
    /// Execution failed. Terminal.
    Failed,
    /// Rejected as invalid by the chain. Terminal, treated as a failure.
    Invalid,
    /// The tracker gave up after the configured attempt budget. Terminal,
    /// distinct from `Failed` so hosts can offer different next actions.
    TimedOut,
}

impl TransactionStatus {
    /// Whether no further polling occurs in this state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// One transaction inside a tracked batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTransaction {
    /// Unique identifier assigned at submission.
    pub hash: String,

    /// Raw status string as last reported by the chain API.
    pub status: String,

    /// Back-reference to the owning batch; lookup only, not ownership.
    pub session_id: String,
}

/// Structured metadata a caller may attach to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionInfo {
    /// Marks a session that only groups other batches. Grouped members are
    /// polled individually; the group itself never is, to avoid
    /// double-polling.
    pub grouping: bool,
}

/// One logical batch of transactions submitted together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique id for this batch.
    pub session_id: String,

    /// Batch lifecycle state, owned by the tracker.
    pub status: TransactionStatus,

    /// The transactions submitted in this batch.
    pub transactions: Vec<TrackedTransaction>,

    /// Optional caller-supplied metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_information: Option<SessionInfo>,

    /// Creation time in milliseconds since the epoch. Gives the
    /// deterministic order batches are visited in each poll cycle.
    pub created_at: u64,

    /// Poll attempts consumed so far, counted against the tracker's budget.
    #[serde(default)]
    pub poll_attempts: u32,

    /// Sequence number of the most recently issued poll for this batch.
    /// Results carrying an older number are stale and dropped.
    #[serde(default)]
    pub poll_seq: u64,

    /// Last per-batch tracking error, retried on the next cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Set while a poll for this batch is in flight. Never persisted.
    #[serde(skip)]
    pub(crate) in_flight: bool,
}

impl Session {
    /// Whether this session is a composite grouping of other batches.
    pub fn is_grouping(&self) -> bool {
        self.custom_information
            .as_ref()
            .map(|info| info.grouping)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Successful.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(TransactionStatus::Invalid.is_terminal());
        assert!(TransactionStatus::TimedOut.is_terminal());
    }

    #[test]
    fn test_session_roundtrip_drops_claim_flag() {
        let session = Session {
            session_id: "s1".to_string(),
            status: TransactionStatus::Pending,
            transactions: vec![TrackedTransaction {
                hash: "h1".to_string(),
                status: "pending".to_string(),
                session_id: "s1".to_string(),
            }],
            custom_information: None,
            created_at: 1,
            poll_attempts: 3,
            poll_seq: 3,
            last_error: None,
            in_flight: true,
        };

        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.poll_attempts, 3);
        assert!(!restored.in_flight, "claim flag must not survive a restore");
    }

    #[test]
    fn test_grouping_flag() {
        let mut session = Session {
            session_id: "s1".to_string(),
            status: TransactionStatus::Pending,
            transactions: Vec::new(),
            custom_information: None,
            created_at: 0,
            poll_attempts: 0,
            poll_seq: 0,
            last_error: None,
            in_flight: false,
        };
        assert!(!session.is_grouping());

        session.custom_information = Some(SessionInfo { grouping: true });
        assert!(session.is_grouping());
    }
}
