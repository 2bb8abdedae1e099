//! Concurrent store for tracked sessions, with snapshot persistence.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::session::types::{Session, SessionInfo, TrackedTransaction, TransactionStatus};

/// Thread-safe map of session id → session.
///
/// The store is deliberately dumb: it owns locking and persistence, while
/// the tracker owns all poll semantics through
/// [`SessionStore::with_session_mut`], which applies a batch's status and
/// its transactions' statuses together under one entry lock.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Session>>,
    persistence_path: Option<String>,
}

impl SessionStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<String>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
        }
    }

    /// Track a new batch under a freshly minted session id.
    pub fn track_batch(&self, hashes: Vec<String>, info: Option<SessionInfo>) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.track_batch_with_id(session_id.clone(), hashes, info);
        session_id
    }

    /// Track a new batch under a caller-supplied session id.
    pub fn track_batch_with_id(
        &self,
        session_id: String,
        hashes: Vec<String>,
        info: Option<SessionInfo>,
    ) {
        let transactions = hashes
            .into_iter()
            .map(|hash| TrackedTransaction {
                hash,
                status: "pending".to_string(),
                session_id: session_id.clone(),
            })
            .collect::<Vec<_>>();

        let session = Session {
            session_id: session_id.clone(),
            status: TransactionStatus::Pending,
            transactions,
            custom_information: info,
            created_at: now_millis(),
            poll_attempts: 0,
            poll_seq: 0,
            last_error: None,
            in_flight: false,
        };

        tracing::debug!(
            session_id = %session_id,
            transactions = session.transactions.len(),
            "tracking new batch"
        );
        self.inner.insert(session_id, session);
    }

    /// Clone of a session, if tracked.
    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.inner.get(session_id).map(|r| r.value().clone())
    }

    /// Ids of batches eligible for polling: non-terminal and not a
    /// composite grouping. Sorted by creation time (session id as
    /// tie-break) so every cycle visits batches in the same order.
    pub fn pending_batches(&self) -> Vec<String> {
        let mut pending = self
            .inner
            .iter()
            .filter(|r| !r.value().is_grouping() && !r.value().status.is_terminal())
            .map(|r| (r.value().created_at, r.key().clone()))
            .collect::<Vec<_>>();
        pending.sort();
        pending.into_iter().map(|(_, id)| id).collect()
    }

    /// Run `f` against a session under its entry lock.
    ///
    /// `f` must stay synchronous; the guard is released before this
    /// function returns, so nothing is held across an await point.
    pub fn with_session_mut<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        self.inner.get_mut(session_id).map(|mut r| f(r.value_mut()))
    }

    /// Remove a session whose terminal state the caller has consumed.
    ///
    /// Returns the removed session. Non-terminal sessions are left alone:
    /// disposal of live batches is not the store's call to make.
    pub fn acknowledge(&self, session_id: &str) -> Option<Session> {
        let terminal = self
            .inner
            .get(session_id)
            .map(|r| r.value().status.is_terminal())
            .unwrap_or(false);
        if !terminal {
            return None;
        }
        self.inner.remove(session_id).map(|(_, session)| session)
    }

    /// Drop every session (logout).
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Serializable snapshot of every session, in polling order.
    pub fn snapshot(&self) -> Vec<Session> {
        let mut sessions = self
            .inner
            .iter()
            .map(|r| r.value().clone())
            .collect::<Vec<_>>();
        sessions.sort_by(|a, b| {
            (a.created_at, &a.session_id).cmp(&(b.created_at, &b.session_id))
        });
        sessions
    }

    /// Replace the store contents with a previously taken snapshot.
    ///
    /// Transient claim flags are reset so tracking resumes cleanly.
    pub fn restore(&self, sessions: Vec<Session>) {
        self.inner.clear();
        for mut session in sessions {
            session.in_flight = false;
            self.inner.insert(session.session_id.clone(), session);
        }
    }

    /// Save a snapshot to the configured persistence path, if any.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.persistence_path {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            let snapshot = self.snapshot();
            serde_json::to_writer(writer, &snapshot)?;
            tracing::info!(sessions = snapshot.len(), "saved session snapshot");
        }
        Ok(())
    }

    /// Load a store from a snapshot file if it exists.
    pub fn load_from_file(path: &str) -> std::io::Result<Self> {
        let store = Self::new(Some(path.to_string()));
        if Path::new(path).exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            let sessions: Vec<Session> = serde_json::from_reader(reader)?;
            tracing::info!(sessions = sessions.len(), "restored session snapshot");
            store.restore(sessions);
        }
        Ok(store)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_and_get() {
        let store = SessionStore::new(None);
        let sid = store.track_batch(vec!["h1".into(), "h2".into()], None);

        let session = store.get(&sid).unwrap();
        assert_eq!(session.status, TransactionStatus::Pending);
        assert_eq!(session.transactions.len(), 2);
        assert_eq!(session.transactions[0].session_id, sid);
        assert_eq!(session.transactions[0].status, "pending");
    }

    #[test]
    fn test_pending_excludes_grouping_and_terminal() {
        let store = SessionStore::new(None);
        store.track_batch_with_id("plain".into(), vec!["h1".into()], None);
        store.track_batch_with_id(
            "group".into(),
            Vec::new(),
            Some(SessionInfo { grouping: true }),
        );
        store.track_batch_with_id("done".into(), vec!["h2".into()], None);
        store.with_session_mut("done", |s| s.status = TransactionStatus::Successful);

        let pending = store.pending_batches();
        assert_eq!(pending, vec!["plain".to_string()]);
    }

    #[test]
    fn test_pending_order_is_stable() {
        let store = SessionStore::new(None);
        for id in ["b", "a", "c"] {
            store.track_batch_with_id(id.into(), vec!["h".into()], None);
        }
        // Force identical timestamps so ordering falls back to ids
        for id in ["a", "b", "c"] {
            store.with_session_mut(id, |s| s.created_at = 42);
        }

        assert_eq!(store.pending_batches(), vec!["a", "b", "c"]);
        assert_eq!(store.pending_batches(), store.pending_batches());
    }

    #[test]
    fn test_acknowledge_only_removes_terminal() {
        let store = SessionStore::new(None);
        store.track_batch_with_id("s1".into(), vec!["h1".into()], None);

        assert!(store.acknowledge("s1").is_none());
        assert_eq!(store.len(), 1);

        store.with_session_mut("s1", |s| s.status = TransactionStatus::Failed);
        let removed = store.acknowledge("s1").unwrap();
        assert_eq!(removed.status, TransactionStatus::Failed);
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_restore_resets_claims() {
        let store = SessionStore::new(None);
        store.track_batch_with_id("s1".into(), vec!["h1".into()], None);
        store.with_session_mut("s1", |s| {
            s.in_flight = true;
            s.poll_attempts = 7;
        });

        let snapshot = store.snapshot();
        let restored = SessionStore::new(None);
        restored.restore(snapshot);

        let session = restored.get("s1").unwrap();
        assert_eq!(session.poll_attempts, 7);
        assert!(!session.in_flight);
    }

    #[test]
    fn test_file_persistence() {
        let path = "test_sessions_persistence.json";

        let store = SessionStore::new(Some(path.to_string()));
        store.track_batch_with_id("s1".into(), vec!["h1".into()], None);
        store.save_to_file().unwrap();

        let loaded = SessionStore::load_from_file(path).unwrap();
        assert!(loaded.get("s1").is_some());

        std::fs::remove_file(path).unwrap_or_default();
    }
}
