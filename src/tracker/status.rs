//! Raw chain status classification and batch reduction.
//!
//! # States
//! - Pending: keep polling
//! - Successful / Failed / Invalid / TimedOut: terminal
//!
//! # Design Decisions
//! - Unrecognized raw statuses stay Pending and are retried; the chain may
//!   report intermediate states this crate does not know about
//! - Batch outcome is all-or-nothing: one failed member fails the batch

use crate::session::types::TransactionStatus;

/// Classify a raw status string reported by the chain API.
pub fn classify_raw(raw: &str) -> TransactionStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "success" | "successful" | "executed" => TransactionStatus::Successful,
        "fail" | "failed" | "unsuccessful" => TransactionStatus::Failed,
        "invalid" => TransactionStatus::Invalid,
        _ => TransactionStatus::Pending,
    }
}

/// Reduce the statuses of a batch's transactions into the batch outcome.
///
/// Any `Failed` or `Invalid` member fails the whole batch even if siblings
/// succeeded; the batch only succeeds when every member did. Anything else
/// leaves the batch pending.
pub fn reduce_batch<I>(statuses: I) -> TransactionStatus
where
    I: IntoIterator<Item = TransactionStatus>,
{
    let mut all_successful = true;
    let mut any = false;

    for status in statuses {
        any = true;
        match status {
            TransactionStatus::Failed | TransactionStatus::TimedOut => {
                return TransactionStatus::Failed
            }
            TransactionStatus::Invalid => return TransactionStatus::Failed,
            TransactionStatus::Successful => {}
            TransactionStatus::Pending => all_successful = false,
        }
    }

    if any && all_successful {
        TransactionStatus::Successful
    } else {
        TransactionStatus::Pending
    }
}
