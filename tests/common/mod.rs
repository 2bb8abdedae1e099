//! Shared scripted collaborators for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};

use wallet_link::chain::{ChainApiError, ChainStatusApi};
use wallet_link::login::{
    ChannelError, PairingChannel, PairingEvent, PairingSession, SignatureVerifier,
};
use wallet_link::provider::{
    Account, AccountProvider, LoginOptions, ProviderError, ProviderKind, ProviderResult,
};
use wallet_link::tracker::AccountRefresher;

/// Wallet provider whose behavior is scripted by the test.
pub struct MockProvider {
    kind: ProviderKind,
    init_ok: AtomicBool,
    resolution: Mutex<Option<Account>>,
    login_error: Mutex<Option<String>>,
    login_gate: Mutex<Option<oneshot::Receiver<()>>>,
    last_options: Mutex<Option<LoginOptions>>,
    account: Mutex<Option<Account>>,
}

impl MockProvider {
    pub fn new(kind: ProviderKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            init_ok: AtomicBool::new(true),
            resolution: Mutex::new(None),
            login_error: Mutex::new(None),
            login_gate: Mutex::new(None),
            last_options: Mutex::new(None),
            account: Mutex::new(None),
        })
    }

    /// Script what `account()` yields once login resolves.
    pub fn resolve_with(&self, account: Option<Account>) {
        *self.resolution.lock().unwrap() = account;
    }

    /// Make `init()` report a refusal.
    pub fn refuse_init(&self) {
        self.init_ok.store(false, Ordering::SeqCst);
    }

    /// Make `login()` fail with the given message.
    pub fn fail_login(&self, message: &str) {
        *self.login_error.lock().unwrap() = Some(message.to_string());
    }

    /// Block `login()` until the returned sender fires.
    pub fn gate_login(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.login_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// The options the flow passed to the last `login()` call.
    pub fn last_login_options(&self) -> Option<LoginOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn init(&self) -> ProviderResult<bool> {
        Ok(self.init_ok.load(Ordering::SeqCst))
    }

    async fn login(&self, options: LoginOptions) -> ProviderResult<()> {
        *self.last_options.lock().unwrap() = Some(options);

        let gate = self.login_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let error = self.login_error.lock().unwrap().clone();
        if let Some(message) = error {
            return Err(ProviderError::Login(message));
        }

        let resolution = self.resolution.lock().unwrap().clone();
        *self.account.lock().unwrap() = resolution;
        Ok(())
    }

    async fn logout(&self) -> ProviderResult<()> {
        *self.account.lock().unwrap() = None;
        Ok(())
    }

    fn account(&self) -> Option<Account> {
        self.account.lock().unwrap().clone()
    }
}

/// Extension host environment with a controllable install probe.
pub struct MockRuntime {
    installed: AtomicBool,
    provider: Arc<MockProvider>,
}

impl MockRuntime {
    pub fn new(provider: Arc<MockProvider>) -> Arc<Self> {
        Arc::new(Self {
            installed: AtomicBool::new(true),
            provider,
        })
    }

    pub fn uninstall(&self) {
        self.installed.store(false, Ordering::SeqCst);
    }
}

impl wallet_link::login::ExtensionRuntime for MockRuntime {
    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn provider(&self) -> Arc<dyn AccountProvider> {
        self.provider.clone()
    }
}

/// Pairing channel whose session events are scripted by the test.
pub struct MockChannel {
    provider: Arc<MockProvider>,
    script: Mutex<Vec<PairingEvent>>,
    teardown_calls: AtomicU32,
    teardown_fails: AtomicBool,
    connect_fails: AtomicBool,
    connect_gate: Mutex<Option<oneshot::Receiver<()>>>,
    entered_connect: watch::Sender<bool>,
    // Kept alive so an eventless session waits instead of closing
    events_tx: Mutex<Option<mpsc::UnboundedSender<PairingEvent>>>,
}

impl MockChannel {
    pub fn new() -> Arc<Self> {
        let (entered_connect, _) = watch::channel(false);
        Arc::new(Self {
            provider: MockProvider::new(ProviderKind::Remote),
            script: Mutex::new(Vec::new()),
            teardown_calls: AtomicU32::new(0),
            teardown_fails: AtomicBool::new(false),
            connect_fails: AtomicBool::new(false),
            connect_gate: Mutex::new(None),
            entered_connect,
            events_tx: Mutex::new(None),
        })
    }

    /// Queue events delivered right after the session is established.
    pub fn script_events(&self, events: Vec<PairingEvent>) {
        *self.script.lock().unwrap() = events;
    }

    /// Make `teardown()` return an error.
    pub fn fail_teardown(&self) {
        self.teardown_fails.store(true, Ordering::SeqCst);
    }

    /// Make `connect()` fail.
    pub fn fail_connect(&self) {
        self.connect_fails.store(true, Ordering::SeqCst);
    }

    /// Block `connect()` until the returned sender fires.
    pub fn gate_connect(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.connect_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Resolve once a `connect()` call has started.
    pub async fn connect_entered(&self) {
        let mut rx = self.entered_connect.subscribe();
        let _ = rx.wait_for(|entered| *entered).await;
    }

    pub fn teardown_calls(&self) -> u32 {
        self.teardown_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PairingChannel for MockChannel {
    async fn connect(&self) -> Result<PairingSession, ChannelError> {
        self.entered_connect.send_replace(true);

        let gate = self.connect_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.connect_fails.load(Ordering::SeqCst) {
            return Err(ChannelError("relay refused the session".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        for event in self.script.lock().unwrap().drain(..) {
            let _ = tx.send(event);
        }
        *self.events_tx.lock().unwrap() = Some(tx);

        Ok(PairingSession {
            connection_uri: "wc:test-pairing-uri".to_string(),
            events: rx,
        })
    }

    async fn teardown(&self) -> Result<(), ChannelError> {
        self.teardown_calls.fetch_add(1, Ordering::SeqCst);
        if self.teardown_fails.load(Ordering::SeqCst) {
            return Err(ChannelError("teardown refused".to_string()));
        }
        Ok(())
    }

    fn provider(&self) -> Arc<dyn AccountProvider> {
        self.provider.clone()
    }
}

/// Verifier that counts calls and optionally rejects.
pub struct CountingVerifier {
    calls: AtomicU32,
    reject: bool,
}

impl CountingVerifier {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            reject: false,
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            reject: true,
        })
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureVerifier for CountingVerifier {
    async fn verify(
        &self,
        _address: &str,
        _signature: &str,
        _login_token: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            Err("signature rejected".into())
        } else {
            Ok(())
        }
    }
}

/// Chain status API answering from a queue of scripted responses.
///
/// When the queue runs dry every hash is reported as pending.
pub struct ScriptedChainApi {
    responses: Mutex<VecDeque<HashMap<String, String>>>,
    calls: AtomicU32,
}

impl ScriptedChainApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn push_response(&self, statuses: &[(&str, &str)]) {
        let map = statuses
            .iter()
            .map(|(hash, status)| (hash.to_string(), status.to_string()))
            .collect();
        self.responses.lock().unwrap().push_back(map);
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainStatusApi for ScriptedChainApi {
    async fn transaction_statuses(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, String>, ChainApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.responses.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| {
            hashes
                .iter()
                .map(|h| (h.clone(), "pending".to_string()))
                .collect()
        }))
    }
}

/// Balance refresher that counts invocations.
pub struct CountingRefresher {
    calls: AtomicU32,
}

impl CountingRefresher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
        })
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountRefresher for CountingRefresher {
    async fn refresh_account(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
