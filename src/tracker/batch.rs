//! Batched polling of pending transaction sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::chain::ChainStatusApi;
use crate::config::TrackerConfig;
use crate::lifecycle::ShutdownListener;
use crate::session::store::SessionStore;
use crate::session::types::TransactionStatus;
use crate::tracker::status::{classify_raw, reduce_batch};
use crate::tracker::{AccountRefresher, BatchUpdate, TrackerError};

/// Outcome of trying to claim a batch for one poll.
enum Claim {
    /// Nothing to do: missing, already claimed, terminal, or settled
    /// silently (empty / all members already terminal).
    Skip,
    /// The attempt budget ran out; the batch was marked timed out.
    TimedOut,
    /// Claimed. Query these hashes and apply under this sequence number.
    Poll { seq: u64, hashes: Vec<String> },
}

/// Polls each pending batch's transaction set for updated statuses.
#[derive(Clone)]
pub struct BatchTracker {
    store: SessionStore,
    api: Arc<dyn ChainStatusApi>,
    refresher: Option<Arc<dyn AccountRefresher>>,
    config: TrackerConfig,
    updates: broadcast::Sender<BatchUpdate>,
}

impl BatchTracker {
    /// Create a tracker over a session store and a chain status API.
    pub fn new(store: SessionStore, api: Arc<dyn ChainStatusApi>, config: TrackerConfig) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            store,
            api,
            refresher: None,
            config,
            updates,
        }
    }

    /// Attach the host's balance-refresh hook.
    pub fn with_refresher(mut self, refresher: Arc<dyn AccountRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Subscribe to terminal batch transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchUpdate> {
        self.updates.subscribe()
    }

    /// The store this tracker polls.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run the polling loop until shutdown.
    pub async fn run(self, mut shutdown: ShutdownListener) {
        tracing::info!(
            interval_ms = self.config.poll_interval_ms,
            max_poll_attempts = self.config.max_poll_attempts,
            "transaction tracker starting"
        );

        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_pending(self.config.refresh_balance).await;
                }
                _ = shutdown.requested() => {
                    tracing::info!("transaction tracker stopping");
                    break;
                }
            }
        }
    }

    /// Run one tracking cycle over the currently pending batches.
    ///
    /// Batches are visited sequentially in the store's deterministic
    /// order. A failing batch is logged and retried next cycle; it does
    /// not stop the others.
    pub async fn check_pending(&self, refresh_balance: bool) {
        let pending = self.store.pending_batches();
        if pending.is_empty() {
            return;
        }

        for session_id in &pending {
            if let Err(e) = self.check_batch(session_id).await {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "batch status check failed, retrying next cycle"
                );
            }
        }

        if refresh_balance {
            if let Some(refresher) = &self.refresher {
                refresher.refresh_account().await;
            }
        }
    }

    /// Poll a single batch once.
    pub async fn check_batch(&self, session_id: &str) -> Result<(), TrackerError> {
        let (seq, hashes) = match self.claim(session_id) {
            Claim::Skip => return Ok(()),
            Claim::TimedOut => {
                tracing::warn!(session_id = %session_id, "batch exceeded poll attempt budget");
                self.broadcast(session_id, TransactionStatus::TimedOut);
                return Ok(());
            }
            Claim::Poll { seq, hashes } => (seq, hashes),
        };

        match self.api.transaction_statuses(&hashes).await {
            Ok(statuses) => {
                if let Some(terminal) = self.apply(session_id, seq, &statuses) {
                    tracing::info!(session_id = %session_id, status = ?terminal, "batch settled");
                    self.broadcast(session_id, terminal);
                }
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.store.with_session_mut(session_id, |session| {
                    session.in_flight = false;
                    session.last_error = Some(message.clone());
                });
                Err(TrackerError::ChainQuery {
                    session_id: session_id.to_string(),
                    message,
                })
            }
        }
    }

    /// Claim a batch for one poll, under its entry lock.
    fn claim(&self, session_id: &str) -> Claim {
        let max_attempts = self.config.max_poll_attempts;
        self.store
            .with_session_mut(session_id, |session| {
                if session.in_flight || session.status.is_terminal() {
                    return Claim::Skip;
                }

                // Batches with nothing left to ask the chain about settle
                // silently and drop out of future cycles.
                if session.transactions.is_empty() {
                    session.status = TransactionStatus::Successful;
                    return Claim::Skip;
                }
                let members: Vec<TransactionStatus> = session
                    .transactions
                    .iter()
                    .map(|tx| classify_raw(&tx.status))
                    .collect();
                if members.iter().all(|status| status.is_terminal()) {
                    session.status = reduce_batch(members);
                    return Claim::Skip;
                }

                if session.poll_attempts >= max_attempts {
                    session.status = TransactionStatus::TimedOut;
                    return Claim::TimedOut;
                }

                session.poll_attempts += 1;
                session.poll_seq += 1;
                session.in_flight = true;
                session.last_error = None;
                Claim::Poll {
                    seq: session.poll_seq,
                    hashes: session
                        .transactions
                        .iter()
                        .map(|tx| tx.hash.clone())
                        .collect(),
                }
            })
            .unwrap_or(Claim::Skip)
    }

    /// Apply a poll result atomically: the batch status and its
    /// transactions' statuses change together or not at all.
    ///
    /// Returns the terminal state if this application settled the batch.
    fn apply(
        &self,
        session_id: &str,
        seq: u64,
        statuses: &std::collections::HashMap<String, String>,
    ) -> Option<TransactionStatus> {
        self.store
            .with_session_mut(session_id, |session| {
                session.in_flight = false;

                if session.poll_seq != seq {
                    tracing::debug!(session_id = %session_id, "dropping stale poll result");
                    return None;
                }
                if session.status.is_terminal() {
                    return None;
                }

                for tx in &mut session.transactions {
                    if let Some(raw) = statuses.get(&tx.hash) {
                        tx.status = raw.clone();
                    }
                }

                let reduced = reduce_batch(
                    session.transactions.iter().map(|tx| classify_raw(&tx.status)),
                );
                if reduced.is_terminal() {
                    session.status = reduced;
                    Some(reduced)
                } else {
                    None
                }
            })
            .flatten()
    }

    fn broadcast(&self, session_id: &str, status: TransactionStatus) {
        // No subscribers is fine; updates are advisory
        let _ = self.updates.send(BatchUpdate {
            session_id: session_id.to_string(),
            status,
        });
    }
}
