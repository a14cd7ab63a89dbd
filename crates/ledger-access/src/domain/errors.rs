//! # Domain Errors
//!
//! Error types for the access layer.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while resolving a session or dispatching a call.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The requested identity is not in the wallet.
    ///
    /// A configuration error; callers must not retry automatically.
    #[error("An identity for the user {0} does not exist in the wallet")]
    IdentityNotFound(String),

    /// The connection profile could not be read or parsed.
    #[error("Failed to load connection profile {}: {reason}", .path.display())]
    ProfileLoad {
        /// Profile file that was attempted
        path: PathBuf,
        /// Underlying I/O or parse failure
        reason: String,
    },

    /// The wallet could not be opened or an identity file is corrupt.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The backend transport reported a failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Access layer configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Broad category of a transport failure, as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Endorsing peers rejected the proposal.
    Endorsement,
    /// The transaction was ordered but rejected at commit.
    Commit,
    /// The transport gave up waiting.
    Timeout,
    /// Connecting to or talking with a peer/orderer failed.
    Connection,
    /// Anything else (malformed response, unexpected state).
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Endorsement => "endorsement",
            Self::Commit => "commit",
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Failure reported by the backend transport.
///
/// `raw_message` is the multi-line text the backend produced, kept verbatim
/// so the error translator can scan it for embedded status payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure: {raw_message}")]
pub struct TransportError {
    /// Failure category.
    pub kind: TransportErrorKind,
    /// Verbatim backend message.
    pub raw_message: String,
}

impl TransportError {
    /// Create a transport error.
    pub fn new(kind: TransportErrorKind, raw_message: impl Into<String>) -> Self {
        Self {
            kind,
            raw_message: raw_message.into(),
        }
    }

    /// Endorsement failure with the given backend text.
    pub fn endorsement(raw_message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Endorsement, raw_message)
    }

    /// Connection failure with the given backend text.
    pub fn connection(raw_message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connection, raw_message)
    }

    /// Timeout with the given backend text.
    pub fn timeout(raw_message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, raw_message)
    }
}
