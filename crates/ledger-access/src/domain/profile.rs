//! # Connection Profile
//!
//! Declarative network topology: channels, organizations, peers, orderers
//! and certificate authorities, in the common connection profile layout.
//! The access layer reads it to connect and to derive default endorsement
//! policies; it does not validate the topology.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parsed connection profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionProfile {
    /// Profile name.
    pub name: String,
    /// Profile format version.
    pub version: String,
    /// Client section (organization, timeouts, credential store).
    pub client: Option<ClientSection>,
    /// Channels by name.
    pub channels: BTreeMap<String, ChannelSection>,
    /// Organizations by name.
    pub organizations: BTreeMap<String, OrganizationSection>,
    /// Orderers by name.
    pub orderers: BTreeMap<String, NodeSection>,
    /// Peers by name.
    pub peers: BTreeMap<String, NodeSection>,
    /// Certificate authorities by name.
    pub certificate_authorities: BTreeMap<String, NodeSection>,
}

/// `client:` section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSection {
    /// Organization the client acts for.
    pub organization: Option<String>,
    /// Anything else (connection timeouts, credential store...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// `channels.<name>:` section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelSection {
    /// Orderer names serving the channel.
    pub orderers: Vec<String>,
    /// Peers joined to the channel, with their roles.
    pub peers: BTreeMap<String, PeerRoles>,
}

/// Roles a peer plays on a channel. Every role defaults to `true`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeerRoles {
    /// Peer may endorse proposals.
    pub endorsing_peer: bool,
    /// Peer may answer chaincode queries.
    pub chaincode_query: bool,
    /// Peer may answer ledger queries.
    pub ledger_query: bool,
    /// Peer emits block events.
    pub event_source: bool,
}

impl Default for PeerRoles {
    fn default() -> Self {
        Self {
            endorsing_peer: true,
            chaincode_query: true,
            ledger_query: true,
            event_source: true,
        }
    }
}

/// `organizations.<name>:` section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationSection {
    /// MSP identifier (`mspid` in the profile).
    #[serde(rename = "mspid")]
    pub msp_id: String,
    /// Peers owned by the organization.
    pub peers: Vec<String>,
    /// Certificate authorities of the organization.
    pub certificate_authorities: Vec<String>,
}

/// Peer, orderer or CA endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSection {
    /// Endpoint URL (`grpcs://host:port`, `https://host:port`).
    pub url: String,
    /// Transport options passed through untouched.
    pub grpc_options: BTreeMap<String, serde_yaml::Value>,
    /// TLS CA certificate (`pem` inline or `path`).
    #[serde(rename = "tlsCACerts")]
    pub tls_ca_certs: Option<TlsCaCerts>,
}

/// TLS CA certificate reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsCaCerts {
    /// Inline PEM.
    pub pem: Option<String>,
    /// Path to a PEM file.
    pub path: Option<String>,
}

impl ConnectionProfile {
    /// Parse a profile from YAML (JSON is accepted too, being a YAML subset).
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Channel section by name.
    pub fn channel(&self, name: &str) -> Option<&ChannelSection> {
        self.channels.get(name)
    }

    /// Names of the peers joined to `channel`.
    pub fn channel_peers(&self, channel: &str) -> Vec<&str> {
        self.channel(channel)
            .map(|c| c.peers.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Names of the peers that endorse on `channel`.
    pub fn endorsing_peers(&self, channel: &str) -> Vec<&str> {
        self.channel(channel)
            .map(|c| {
                c.peers
                    .iter()
                    .filter(|(_, roles)| roles.endorsing_peer)
                    .map(|(name, _)| name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// MSP id of the organization owning `peer`.
    pub fn msp_for_peer(&self, peer: &str) -> Option<&str> {
        self.organizations
            .values()
            .find(|org| org.peers.iter().any(|p| p == peer))
            .map(|org| org.msp_id.as_str())
    }

    /// Distinct MSP ids of the peers on `channel`, in first-seen order.
    pub fn channel_msp_ids(&self, channel: &str) -> Vec<String> {
        let mut msp_ids: Vec<String> = Vec::new();
        for peer in self.channel_peers(channel) {
            if let Some(msp) = self.msp_for_peer(peer) {
                if !msp_ids.iter().any(|m| m == msp) {
                    msp_ids.push(msp.to_string());
                }
            }
        }
        msp_ids
    }

    /// Organization the client section names, if any.
    pub fn client_organization(&self) -> Option<&str> {
        self.client.as_ref()?.organization.as_deref()
    }
}
