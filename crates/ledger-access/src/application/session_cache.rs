//! # Session Cache
//!
//! Owns every connected client, channel handle and session in the process.
//!
//! Three tables:
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | clients | identity | connected [`ClientContext`] |
//! | channels | (identity, channel) | channel network handle |
//! | sessions | [`SessionKey`] | fully resolved [`Session`] |
//!
//! Establishment for one session key is single-flight: concurrent cold
//! resolutions of the same key wait for the first one and then reuse its
//! session. Entries are only replaced by a forced refresh or removed by an
//! explicit invalidation.

use access_telemetry::{time_histogram, SESSION_CACHE_LOOKUPS, SESSION_ESTABLISH_DURATION};
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adapters::{FileSystemWallets, YamlProfileLoader};
use crate::config::{AccessConfig, SessionKeying};
use crate::domain::{AccessError, ClientContext, Identity, Session, SessionKey};
use crate::ports::{ConnectOptions, GatewayConnector, NetworkHandle, ProfileLoader, WalletProvider};

/// Process-wide cache of gateway clients and channel sessions.
pub struct SessionCache {
    config: AccessConfig,
    wallets: Arc<dyn WalletProvider>,
    profiles: Arc<dyn ProfileLoader>,
    connector: Arc<dyn GatewayConnector>,
    clients: DashMap<Identity, Arc<ClientContext>>,
    channels: DashMap<(Identity, String), Arc<dyn NetworkHandle>>,
    sessions: DashMap<SessionKey, Arc<Session>>,
    inflight: DashMap<SessionKey, Arc<Mutex<()>>>,
}

impl SessionCache {
    /// Create a cache over the given collaborators.
    pub fn new(
        config: AccessConfig,
        wallets: Arc<dyn WalletProvider>,
        profiles: Arc<dyn ProfileLoader>,
        connector: Arc<dyn GatewayConnector>,
    ) -> Result<Self, AccessError> {
        config.validate()?;
        Ok(Self {
            config,
            wallets,
            profiles,
            connector,
            clients: DashMap::new(),
            channels: DashMap::new(),
            sessions: DashMap::new(),
            inflight: DashMap::new(),
        })
    }

    /// Cache reading wallets and profiles from disk.
    pub fn with_file_system(
        config: AccessConfig,
        connector: Arc<dyn GatewayConnector>,
    ) -> Result<Self, AccessError> {
        Self::new(
            config,
            Arc::new(FileSystemWallets),
            Arc::new(YamlProfileLoader),
            connector,
        )
    }

    /// Configuration in use.
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Session table key for `(channel, identity)` under the configured keying.
    pub fn session_key(&self, channel: &str, identity: &Identity) -> SessionKey {
        match self.config.session_keying {
            SessionKeying::PerIdentity => SessionKey::PerIdentity {
                identity: identity.clone(),
                channel: channel.to_string(),
            },
            SessionKeying::Channel => SessionKey::Channel(channel.to_string()),
        }
    }

    /// Return the session for `(channel, identity)`, establishing it if needed.
    ///
    /// Without `force_refresh` a cached session is returned as is, with no
    /// I/O and no reachability check. With it, the client is reconnected and
    /// the cached session replaced; callers still holding the old session
    /// keep using it until they drop it.
    pub async fn resolve(
        &self,
        channel: &str,
        identity: &Identity,
        artifact_location: &Path,
        force_refresh: bool,
    ) -> Result<Arc<Session>, AccessError> {
        let key = self.session_key(channel, identity);

        if !force_refresh {
            if let Some(session) = self.cached(&key) {
                SESSION_CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                debug!(session = %key, "session cache hit");
                return Ok(session);
            }
        }

        let gate = Arc::clone(self.inflight.entry(key.clone()).or_default().value());
        let guard = gate.lock().await;

        // Someone else may have finished establishing while we waited.
        let coalesced = if force_refresh {
            None
        } else {
            self.cached(&key)
        };
        let result = match coalesced {
            Some(session) => {
                SESSION_CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                debug!(session = %key, "session established by a concurrent caller");
                Ok(session)
            }
            None => {
                SESSION_CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
                debug!(session = %key, force_refresh, "session cache miss");
                self.establish(key.clone(), channel, identity, artifact_location, force_refresh)
                    .await
            }
        };

        drop(guard);
        drop(gate);
        // Only the map still holds the gate: nobody is waiting on it.
        self.inflight.remove_if(&key, |_, gate| Arc::strong_count(gate) == 1);

        result
    }

    async fn establish(
        &self,
        key: SessionKey,
        channel: &str,
        identity: &Identity,
        artifact_location: &Path,
        force_refresh: bool,
    ) -> Result<Arc<Session>, AccessError> {
        let _timer = time_histogram!(SESSION_ESTABLISH_DURATION);

        let client = self
            .client_for(identity, artifact_location, force_refresh)
            .await?;
        let network = client.connection().get_network(channel).await?;
        self.channels.insert(
            (identity.clone(), channel.to_string()),
            Arc::clone(&network),
        );

        let session = Arc::new(Session::new(
            key.clone(),
            identity.clone(),
            network,
            client,
            self.config.discovery.enabled,
        ));
        if self.sessions.insert(key, Arc::clone(&session)).is_some() {
            debug!(session = %session.key(), "replaced cached session");
        }

        info!(
            channel,
            identity = %identity,
            discovery = session.discovery_enabled(),
            "session established"
        );
        Ok(session)
    }

    /// Connected client for `identity` built from `artifact_location`.
    ///
    /// The profile and the wallet credential are always read, so a missing
    /// identity fails even when a client is cached. The cached client is
    /// reused only when it came from the same artifact location with the same
    /// credential and no refresh is forced.
    async fn client_for(
        &self,
        identity: &Identity,
        artifact_location: &Path,
        force_refresh: bool,
    ) -> Result<Arc<ClientContext>, AccessError> {
        let profile_path = self.config.profile_path(artifact_location);
        let profile = self.profiles.load(&profile_path).await?;

        let wallet_path = self.config.wallet_path(artifact_location);
        let wallet = self.wallets.open(&wallet_path).await?;
        let label = identity.wallet_label();
        let credential = match wallet.get(label).await? {
            Some(credential) => credential,
            None => {
                warn!(
                    identity = %identity,
                    wallet = %wallet_path.display(),
                    "identity not found in wallet"
                );
                return Err(AccessError::IdentityNotFound(label.to_string()));
            }
        };

        if !force_refresh {
            if let Some(client) = self.client(identity) {
                if client.artifact_location() == artifact_location
                    && client.credential() == &credential
                {
                    return Ok(client);
                }
                debug!(
                    identity = %identity,
                    from = %client.artifact_location().display(),
                    to = %artifact_location.display(),
                    "cached client does not match artifacts, reconnecting"
                );
            }
        }

        let options = ConnectOptions {
            identity: label.to_string(),
            credential: credential.clone(),
            discovery: self.config.discovery.clone(),
            commit_timeout: self.config.commit_timeout,
        };
        let connection = self.connector.connect(&profile, &options).await?;

        let client = Arc::new(ClientContext::new(
            identity.clone(),
            credential,
            artifact_location,
            Arc::new(profile),
            connection,
        ));
        self.clients.insert(identity.clone(), Arc::clone(&client));
        debug!(identity = %identity, msp_id = %client.credential().msp_id, "gateway client connected");
        Ok(client)
    }

    fn cached(&self, key: &SessionKey) -> Option<Arc<Session>> {
        self.sessions.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Cached session for `(channel, identity)`, without establishing one.
    pub fn session(&self, channel: &str, identity: &Identity) -> Option<Arc<Session>> {
        self.cached(&self.session_key(channel, identity))
    }

    /// Cached channel handle for `(channel, identity)`.
    pub fn channel(&self, channel: &str, identity: &Identity) -> Option<Arc<dyn NetworkHandle>> {
        self.channels
            .get(&(identity.clone(), channel.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Cached client for `identity`.
    pub fn client(&self, identity: &Identity) -> Option<Arc<ClientContext>> {
        self.clients
            .get(identity)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Drop the session for `(channel, identity)` and the channel handle it
    /// was built on.
    ///
    /// Under channel keying the handle removed is the one of the identity
    /// that established the session. Returns whether a session was cached.
    /// The client stays cached.
    pub fn invalidate(&self, channel: &str, identity: &Identity) -> bool {
        let Some((_, session)) = self.sessions.remove(&self.session_key(channel, identity)) else {
            return false;
        };
        self.channels.remove(&(session.identity().clone(), channel.to_string()));
        debug!(channel, identity = %session.identity(), "session invalidated");
        true
    }

    /// Drop the client, channel handles and sessions of `identity`.
    ///
    /// The connection closes once in-flight calls release their sessions.
    /// Returns the number of sessions removed.
    pub fn invalidate_identity(&self, identity: &Identity) -> usize {
        self.clients.remove(identity);
        self.channels.retain(|(owner, _), _| owner != identity);

        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.identity() != identity);
        let removed = before.saturating_sub(self.sessions.len());

        info!(identity = %identity, sessions = removed, "identity invalidated");
        removed
    }

    /// Number of cached sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of cached clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
