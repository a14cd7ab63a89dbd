//! # Inbound Ports
//!
//! API the access layer exposes to request handlers.

use crate::domain::{ChaincodeCall, NormalizedResult};
use async_trait::async_trait;

/// Submit (state-changing) entry point - inbound port.
///
/// Never fails at the type level: preflight and transport failures are
/// folded into the returned [`NormalizedResult`].
#[async_trait]
pub trait ChaincodeInvoker: Send + Sync {
    /// Submit a chaincode transaction.
    async fn invoke(&self, call: &ChaincodeCall) -> NormalizedResult;
}

/// Evaluate (read-only) entry point - inbound port.
#[async_trait]
pub trait ChaincodeQuerier: Send + Sync {
    /// Evaluate a chaincode query.
    async fn query(&self, call: &ChaincodeCall) -> NormalizedResult;
}
