//! # Domain Entities
//!
//! Cached, long-lived objects: a connected client per identity and a
//! channel session built on top of it.

use super::policy::EndorsementPolicy;
use super::profile::ConnectionProfile;
use super::value_objects::{Identity, SessionKey, X509Identity};
use crate::ports::{ContractHandle, GatewayConnection, NetworkHandle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A connected gateway client for one identity.
///
/// The underlying connection is closed when the last reference is dropped,
/// i.e. once the client table and every session built on it let go.
pub struct ClientContext {
    identity: Identity,
    credential: X509Identity,
    artifact_location: PathBuf,
    profile: Arc<ConnectionProfile>,
    connection: Arc<dyn GatewayConnection>,
    created_at: Instant,
}

impl ClientContext {
    /// Wrap a client freshly connected from the artifacts at `artifact_location`.
    pub fn new(
        identity: Identity,
        credential: X509Identity,
        artifact_location: impl Into<PathBuf>,
        profile: Arc<ConnectionProfile>,
        connection: Arc<dyn GatewayConnection>,
    ) -> Self {
        Self {
            identity,
            credential,
            artifact_location: artifact_location.into(),
            profile,
            connection,
            created_at: Instant::now(),
        }
    }

    /// Identity the client is connected as.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Credential the client presented.
    pub fn credential(&self) -> &X509Identity {
        &self.credential
    }

    /// Artifact directory the profile and credential were read from.
    pub fn artifact_location(&self) -> &Path {
        &self.artifact_location
    }

    /// Profile the client was connected with.
    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// Transport connection.
    pub fn connection(&self) -> &Arc<dyn GatewayConnection> {
        &self.connection
    }

    /// When the client connected.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

impl Drop for ClientContext {
    fn drop(&mut self) {
        debug!(identity = %self.identity, "closing gateway connection");
        self.connection.close();
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("identity", &self.identity)
            .field("msp_id", &self.credential.msp_id)
            .finish_non_exhaustive()
    }
}

/// Channel-scoped session ready to produce contract handles.
///
/// Sessions are shared between concurrent calls and never change after
/// establishment. Per-call choices travel on the proposal instead.
pub struct Session {
    key: SessionKey,
    channel: String,
    identity: Identity,
    discovery_enabled: bool,
    network: Arc<dyn NetworkHandle>,
    client: Arc<ClientContext>,
}

impl Session {
    /// Build a session on top of a connected client.
    pub fn new(
        key: SessionKey,
        identity: Identity,
        network: Arc<dyn NetworkHandle>,
        client: Arc<ClientContext>,
        discovery_enabled: bool,
    ) -> Self {
        Self {
            key,
            channel: network.channel_name().to_string(),
            identity,
            discovery_enabled,
            network,
            client,
        }
    }

    /// Cache key this session is stored under.
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Channel name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Identity that established the session.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Client the session was built on.
    pub fn client(&self) -> &Arc<ClientContext> {
        &self.client
    }

    /// Channel network handle.
    pub fn network(&self) -> &Arc<dyn NetworkHandle> {
        &self.network
    }

    /// Contract handle for `chaincode`.
    pub fn contract(&self, chaincode: &str) -> Arc<dyn ContractHandle> {
        self.network.get_contract(chaincode)
    }

    /// Whether calls without explicit endorsers leave selection to the backend.
    pub fn discovery_enabled(&self) -> bool {
        self.discovery_enabled
    }

    /// Every-member-signs policy over the MSPs of this channel's peers.
    pub fn default_endorsement_policy(&self) -> EndorsementPolicy {
        EndorsementPolicy::member_of_all(self.client.profile().channel_msp_ids(&self.channel))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("channel", &self.channel)
            .field("identity", &self.identity)
            .field("discovery_enabled", &self.discovery_enabled)
            .finish()
    }
}
