//! # Outbound Ports
//!
//! Traits for external dependencies: the wallet store, the connection
//! profile source and the gateway transport that reaches the ledger.

use crate::config::DiscoveryConfig;
use crate::domain::{
    AccessError, ConnectionProfile, ExecutionMode, Proposal, TransportError, X509Identity,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// An opened identity store - outbound port.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Look up the credential stored under `label`; `Ok(None)` if absent.
    async fn get(&self, label: &str) -> Result<Option<X509Identity>, AccessError>;
}

/// Opens identity stores by location - outbound port.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Open the wallet rooted at `wallet_dir`.
    async fn open(&self, wallet_dir: &Path) -> Result<Arc<dyn Wallet>, AccessError>;
}

/// Connection profile source - outbound port.
#[async_trait]
pub trait ProfileLoader: Send + Sync {
    /// Load and parse the profile at `path`.
    async fn load(&self, path: &Path) -> Result<ConnectionProfile, AccessError>;
}

/// Options handed to the transport when a client connects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Wallet label of the connecting identity.
    pub identity: String,
    /// Credential loaded from the wallet.
    pub credential: X509Identity,
    /// Discovery settings.
    pub discovery: DiscoveryConfig,
    /// How long to wait for commit events.
    pub commit_timeout: Duration,
}

/// Gateway transport - outbound port.
#[async_trait]
pub trait GatewayConnector: Send + Sync {
    /// Connect an identity using the given profile.
    async fn connect(
        &self,
        profile: &ConnectionProfile,
        options: &ConnectOptions,
    ) -> Result<Arc<dyn GatewayConnection>, TransportError>;
}

/// A connected gateway client.
#[async_trait]
pub trait GatewayConnection: Send + Sync {
    /// Open the network handle for `channel`.
    async fn get_network(&self, channel: &str) -> Result<Arc<dyn NetworkHandle>, TransportError>;

    /// Release the connection. Idempotent.
    fn close(&self);
}

/// Channel-scoped network handle.
pub trait NetworkHandle: Send + Sync {
    /// Channel this handle is bound to.
    fn channel_name(&self) -> &str;

    /// Contract handle for a chaincode on this channel.
    fn get_contract(&self, chaincode: &str) -> Arc<dyn ContractHandle>;
}

/// Chaincode contract handle.
#[async_trait]
pub trait ContractHandle: Send + Sync {
    /// Chaincode this handle calls.
    fn chaincode_name(&self) -> &str;

    /// Endorse, order and commit a proposal; returns the chaincode payload.
    async fn submit(&self, proposal: &Proposal) -> Result<Vec<u8>, TransportError>;

    /// Evaluate a proposal on a single peer; returns the chaincode payload.
    async fn evaluate(&self, proposal: &Proposal) -> Result<Vec<u8>, TransportError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-memory wallet for testing. Every opened location sees the same entries.
#[derive(Clone, Default)]
pub struct InMemoryWallet {
    entries: Arc<Mutex<HashMap<String, X509Identity>>>,
    opened: Arc<Mutex<Vec<PathBuf>>>,
}

impl InMemoryWallet {
    /// Empty wallet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wallet holding one identity.
    pub fn with_identity(label: impl Into<String>, identity: X509Identity) -> Self {
        let wallet = Self::new();
        wallet.put(label, identity);
        wallet
    }

    /// Store an identity under `label`.
    pub fn put(&self, label: impl Into<String>, identity: X509Identity) {
        self.entries.lock().insert(label.into(), identity);
    }

    /// Locations `open` was called with, in order.
    pub fn opened_locations(&self) -> Vec<PathBuf> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl Wallet for InMemoryWallet {
    async fn get(&self, label: &str) -> Result<Option<X509Identity>, AccessError> {
        Ok(self.entries.lock().get(label).cloned())
    }
}

#[async_trait]
impl WalletProvider for InMemoryWallet {
    async fn open(&self, wallet_dir: &Path) -> Result<Arc<dyn Wallet>, AccessError> {
        self.opened.lock().push(wallet_dir.to_path_buf());
        Ok(Arc::new(self.clone()))
    }
}

/// Profile loader returning a fixed profile for any path.
#[derive(Clone)]
pub struct StaticProfileLoader {
    profile: Option<ConnectionProfile>,
    loaded: Arc<Mutex<Vec<PathBuf>>>,
}

impl StaticProfileLoader {
    /// Loader that always yields `profile`.
    pub fn new(profile: ConnectionProfile) -> Self {
        Self {
            profile: Some(profile),
            loaded: Arc::default(),
        }
    }

    /// Loader that fails as if the profile file were missing.
    pub fn missing() -> Self {
        Self {
            profile: None,
            loaded: Arc::default(),
        }
    }

    /// Paths `load` was called with, in order.
    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        self.loaded.lock().clone()
    }
}

#[async_trait]
impl ProfileLoader for StaticProfileLoader {
    async fn load(&self, path: &Path) -> Result<ConnectionProfile, AccessError> {
        self.loaded.lock().push(path.to_path_buf());
        self.profile.clone().ok_or_else(|| AccessError::ProfileLoad {
            path: path.to_path_buf(),
            reason: "No such file or directory".to_string(),
        })
    }
}

/// Scripted result of a contract call on [`MockGateway`].
#[derive(Clone, Debug)]
pub enum MockOutcome {
    /// Return this payload.
    Payload(Vec<u8>),
    /// Fail with this error.
    Fail(TransportError),
}

/// A call observed by [`MockGateway`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    /// Connection (1-based connect order) the call went through.
    pub connection: usize,
    /// Channel of the network handle.
    pub channel: String,
    /// Chaincode of the contract handle.
    pub chaincode: String,
    /// Submit or evaluate.
    pub mode: ExecutionMode,
    /// Proposal as handed to the contract.
    pub proposal: Proposal,
}

struct MockState {
    outcome: Mutex<MockOutcome>,
    connect_error: Mutex<Option<TransportError>>,
    connect_delay: Mutex<Duration>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    options: Mutex<Vec<ConnectOptions>>,
    networks: Mutex<Vec<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Scripted gateway transport for testing.
///
/// Clones share state, so a test can keep one handle while the cache owns
/// another.
#[derive(Clone)]
pub struct MockGateway {
    state: Arc<MockState>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::succeeding(Vec::new())
    }
}

impl MockGateway {
    /// Gateway whose contract calls return `payload`.
    pub fn succeeding(payload: impl Into<Vec<u8>>) -> Self {
        Self::with_outcome(MockOutcome::Payload(payload.into()))
    }

    /// Gateway whose contract calls fail with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self::with_outcome(MockOutcome::Fail(error))
    }

    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            state: Arc::new(MockState {
                outcome: Mutex::new(outcome),
                connect_error: Mutex::new(None),
                connect_delay: Mutex::new(Duration::ZERO),
                connects: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
                options: Mutex::new(Vec::new()),
                networks: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Delay every connect by `delay`.
    pub fn with_connect_delay(self, delay: Duration) -> Self {
        *self.state.connect_delay.lock() = delay;
        self
    }

    /// Replace the scripted contract outcome.
    pub fn set_outcome(&self, outcome: MockOutcome) {
        *self.state.outcome.lock() = outcome;
    }

    /// Make subsequent connects fail (`None` to recover).
    pub fn set_connect_error(&self, error: Option<TransportError>) {
        *self.state.connect_error.lock() = error;
    }

    /// Number of successful connects.
    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Number of connections closed.
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Options of every successful connect, in order.
    pub fn connect_options(&self) -> Vec<ConnectOptions> {
        self.state.options.lock().clone()
    }

    /// Channels opened via `get_network`, in order.
    pub fn networks_opened(&self) -> Vec<String> {
        self.state.networks.lock().clone()
    }

    /// Contract calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().clone()
    }

    /// Most recent contract call.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.state.calls.lock().last().cloned()
    }
}

#[async_trait]
impl GatewayConnector for MockGateway {
    async fn connect(
        &self,
        _profile: &ConnectionProfile,
        options: &ConnectOptions,
    ) -> Result<Arc<dyn GatewayConnection>, TransportError> {
        let delay = *self.state.connect_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.state.connect_error.lock().clone() {
            return Err(err);
        }

        let id = self.state.connects.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.options.lock().push(options.clone());
        Ok(Arc::new(MockConnection {
            id,
            state: Arc::clone(&self.state),
            closed: AtomicUsize::new(0),
        }))
    }
}

struct MockConnection {
    id: usize,
    state: Arc<MockState>,
    closed: AtomicUsize,
}

#[async_trait]
impl GatewayConnection for MockConnection {
    async fn get_network(&self, channel: &str) -> Result<Arc<dyn NetworkHandle>, TransportError> {
        self.state.networks.lock().push(channel.to_string());
        Ok(Arc::new(MockNetwork {
            connection: self.id,
            channel: channel.to_string(),
            state: Arc::clone(&self.state),
        }))
    }

    fn close(&self) {
        if self.closed.fetch_add(1, Ordering::SeqCst) == 0 {
            self.state.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct MockNetwork {
    connection: usize,
    channel: String,
    state: Arc<MockState>,
}

impl NetworkHandle for MockNetwork {
    fn channel_name(&self) -> &str {
        &self.channel
    }

    fn get_contract(&self, chaincode: &str) -> Arc<dyn ContractHandle> {
        Arc::new(MockContract {
            connection: self.connection,
            channel: self.channel.clone(),
            chaincode: chaincode.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

struct MockContract {
    connection: usize,
    channel: String,
    chaincode: String,
    state: Arc<MockState>,
}

impl MockContract {
    fn call(&self, mode: ExecutionMode, proposal: &Proposal) -> Result<Vec<u8>, TransportError> {
        self.state.calls.lock().push(RecordedCall {
            connection: self.connection,
            channel: self.channel.clone(),
            chaincode: self.chaincode.clone(),
            mode,
            proposal: proposal.clone(),
        });
        match &*self.state.outcome.lock() {
            MockOutcome::Payload(payload) => Ok(payload.clone()),
            MockOutcome::Fail(err) => Err(err.clone()),
        }
    }
}

#[async_trait]
impl ContractHandle for MockContract {
    fn chaincode_name(&self) -> &str {
        &self.chaincode
    }

    async fn submit(&self, proposal: &Proposal) -> Result<Vec<u8>, TransportError> {
        self.call(ExecutionMode::Submit, proposal)
    }

    async fn evaluate(&self, proposal: &Proposal) -> Result<Vec<u8>, TransportError> {
        self.call(ExecutionMode::Evaluate, proposal)
    }
}
