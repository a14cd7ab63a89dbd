//! # Value Objects
//!
//! Immutable values passed between the cache, the dispatcher and the
//! transport: identities, cache keys, execution modes and per-call requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Caller identity: a wallet user within an organization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Organization name (as used in the connection profile).
    pub org: String,
    /// User name; also the wallet label.
    pub user: String,
}

impl Identity {
    /// Create an identity.
    pub fn new(org: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            user: user.into(),
        }
    }

    /// Label under which the credential is stored in the wallet.
    pub fn wallet_label(&self) -> &str {
        &self.user
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.org)
    }
}

/// Key of the session table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// One session per (identity, channel).
    PerIdentity {
        /// Owning identity
        identity: Identity,
        /// Channel name
        channel: String,
    },
    /// One session per channel, shared by every identity.
    Channel(String),
}

impl SessionKey {
    /// Channel the key refers to.
    pub fn channel(&self) -> &str {
        match self {
            Self::PerIdentity { channel, .. } => channel,
            Self::Channel(channel) => channel,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerIdentity { identity, channel } => write!(f, "{identity}/{channel}"),
            Self::Channel(channel) => write!(f, "*/{channel}"),
        }
    }
}

/// How a transaction is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// State-changing: endorsed, ordered and committed.
    Submit,
    /// Read-only: evaluated on a single peer, never ordered.
    Evaluate,
}

impl ExecutionMode {
    /// Lowercase name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate and key of an X.509 identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// PEM encoded certificate.
    pub certificate: String,
    /// PEM encoded private key.
    pub private_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("certificate", &self.certificate)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Wallet entry for one identity, in the file-system wallet JSON layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509Identity {
    /// Certificate and private key.
    pub credentials: Credentials,
    /// MSP the identity belongs to.
    pub msp_id: String,
    /// Identity type, `X.509` for every identity this layer handles.
    #[serde(rename = "type")]
    pub kind: String,
    /// Wallet format version.
    #[serde(default = "default_identity_version")]
    pub version: u32,
}

fn default_identity_version() -> u32 {
    1
}

impl X509Identity {
    /// Identity type string for X.509 credentials.
    pub const TYPE: &'static str = "X.509";

    /// Create an X.509 wallet entry.
    pub fn new(
        msp_id: impl Into<String>,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Credentials {
                certificate: certificate.into(),
                private_key: private_key.into(),
            },
            msp_id: msp_id.into(),
            kind: Self::TYPE.to_string(),
            version: 1,
        }
    }
}

/// One chaincode call as seen by the dispatcher.
///
/// Created per call and discarded afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Chaincode (contract) name.
    pub chaincode: String,
    /// Function to call.
    pub function: String,
    /// Ordered string arguments.
    pub args: Vec<String>,
    /// Explicit endorsers; empty means "let discovery choose".
    pub endorsers: Vec<String>,
    /// Submit or evaluate.
    pub mode: ExecutionMode,
}

impl TransactionRequest {
    /// Request with no arguments and no explicit endorsers.
    pub fn new(
        chaincode: impl Into<String>,
        function: impl Into<String>,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            chaincode: chaincode.into(),
            function: function.into(),
            args: Vec::new(),
            endorsers: Vec::new(),
            mode,
        }
    }

    /// Set the arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the explicit endorsers.
    pub fn with_endorsers<I, S>(mut self, endorsers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endorsers = endorsers.into_iter().map(Into::into).collect();
        self
    }

    /// Explicit endorser set, or `None` when discovery should pick.
    pub fn explicit_endorsers(&self) -> Option<&[String]> {
        if self.endorsers.is_empty() {
            None
        } else {
            Some(&self.endorsers)
        }
    }
}

/// Per-call transaction object handed to a contract handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    /// Function to call.
    pub function: String,
    /// Ordered string arguments.
    pub args: Vec<String>,
    /// Peers endorsement is restricted to, if any.
    pub endorsing_peers: Option<Vec<String>>,
    /// Whether the backend selects endorsers for this call.
    pub discovery: bool,
}

impl Proposal {
    /// Proposal for `function` with `args`, endorsed via discovery.
    pub fn new(function: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            function: function.into(),
            args,
            endorsing_peers: None,
            discovery: true,
        }
    }

    /// Restrict endorsement to exactly `peers`. Turns discovery off.
    pub fn set_endorsing_peers(mut self, peers: Vec<String>) -> Self {
        self.endorsing_peers = Some(peers);
        self.discovery = false;
        self
    }

    /// Set backend endorser selection for this call.
    pub fn with_discovery(mut self, enabled: bool) -> Self {
        self.discovery = enabled;
        self
    }

    /// Whether the backend should select endorsers itself.
    pub fn uses_discovery(&self) -> bool {
        self.discovery
    }
}

/// Everything the invoke/query services need for one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChaincodeCall {
    /// Channel the chaincode is deployed on.
    pub channel: String,
    /// Explicit endorsers; empty means discovery.
    pub endorsers: Vec<String>,
    /// Chaincode name.
    pub chaincode: String,
    /// Function name.
    pub function: String,
    /// Ordered string arguments.
    pub args: Vec<String>,
    /// Calling identity.
    pub identity: Identity,
    /// Base directory holding the connection profile and the wallet.
    pub artifact_dir: PathBuf,
    /// Re-establish the session even if one is cached.
    pub refresh_session: bool,
}

impl ChaincodeCall {
    /// Call with no arguments, discovery endorsement and a cached session.
    pub fn new(
        channel: impl Into<String>,
        chaincode: impl Into<String>,
        function: impl Into<String>,
        identity: Identity,
        artifact_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            channel: channel.into(),
            endorsers: Vec::new(),
            chaincode: chaincode.into(),
            function: function.into(),
            args: Vec::new(),
            identity,
            artifact_dir: artifact_dir.as_ref().to_path_buf(),
            refresh_session: false,
        }
    }

    /// Set the arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set explicit endorsers.
    pub fn endorsers<I, S>(mut self, endorsers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endorsers = endorsers.into_iter().map(Into::into).collect();
        self
    }

    /// Force session re-establishment for this call.
    pub fn refresh_session(mut self, refresh: bool) -> Self {
        self.refresh_session = refresh;
        self
    }

    /// Dispatcher request for this call in the given mode.
    pub fn to_request(&self, mode: ExecutionMode) -> TransactionRequest {
        TransactionRequest {
            chaincode: self.chaincode.clone(),
            function: self.function.clone(),
            args: self.args.clone(),
            endorsers: self.endorsers.clone(),
            mode,
        }
    }
}
