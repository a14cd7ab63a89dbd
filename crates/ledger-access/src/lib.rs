//! # Ledger Access
//!
//! Client-side access layer for a permissioned ledger network.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Let request handlers submit and evaluate chaincode transactions without
//! dealing with gateway connections, endorser selection or the backend's
//! error text:
//! - Connected clients and channel sessions are cached per identity
//! - Explicit endorser lists override backend discovery per call
//! - Failures are folded into one stable JSON result shape
//!
//! ## Result Shape
//!
//! ```text
//! { "Result": { "Status": 200, "Payload": "OK" }, "Message": "", "MessageDetail": "" }
//! ```
//!
//! | Outcome | Status | Message | MessageDetail |
//! |---------|--------|---------|---------------|
//! | Success | 200 | `""` | `""` |
//! | Endorsement failure | remote status | `""` | remote message |
//! | Other transport failure | 500 | `""` | JSON array of raw lines |
//! | Preflight failure | 500 | `Failed to submit transaction` | underlying error |
//!
//! ## Module Structure
//!
//! ```text
//! ledger-access/
//! ├── domain/          # Identities, sessions, profiles, results, errors
//! ├── algorithms/      # Transport error classification
//! ├── ports/           # API traits (inbound) + dependency traits (outbound)
//! ├── adapters/        # File-system wallet, YAML profile loader
//! ├── application/     # SessionCache, TransactionDispatcher, Invoke/Query services
//! └── config.rs        # AccessConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{FileSystemWallet, FileSystemWallets, YamlProfileLoader};
pub use algorithms::{parse_embedded_status, EmbeddedStatus, ErrorClass, ErrorTranslator};
pub use application::{InvokeService, QueryService, SessionCache, TransactionDispatcher};
pub use config::{AccessConfig, ConfigError, DiscoveryConfig, SessionKeying};
pub use domain::{
    AccessError, ChaincodeCall, ClientContext, ConnectionProfile, EndorsementPolicy,
    ExecutionMode, Identity, NormalizedResult, Proposal, ResultBody, Session, SessionKey,
    TransactionRequest, TransportError, TransportErrorKind, X509Identity,
    PREFLIGHT_FAILURE_MESSAGE, STATUS_INTERNAL, STATUS_OK,
};
pub use ports::{
    ChaincodeInvoker, ChaincodeQuerier, ConnectOptions, ContractHandle, GatewayConnection,
    GatewayConnector, InMemoryWallet, MockGateway, MockOutcome, NetworkHandle, ProfileLoader,
    RecordedCall, StaticProfileLoader, Wallet, WalletProvider,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
