//! # Normalized Result
//!
//! The caller-facing outcome of an invoke or query. Serializes to
//! `{ "Result": { "Status": int, "Payload": string }, "Message": string, "MessageDetail": string }`.

use serde::{Deserialize, Serialize};

/// HTTP-style status reported on success.
pub const STATUS_OK: i32 = 200;

/// HTTP-style status reported when no better code is known.
pub const STATUS_INTERNAL: i32 = 500;

/// Message reported when a call fails before dispatch.
pub const PREFLIGHT_FAILURE_MESSAGE: &str = "Failed to submit transaction";

/// Status and payload part of a [`NormalizedResult`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultBody {
    /// HTTP-style status code.
    pub status: i32,
    /// Chaincode response; empty on failure.
    pub payload: String,
}

/// Uniform outcome shape for both success and failure.
///
/// Fields that do not apply to the branch taken stay empty, never absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NormalizedResult {
    /// Status and payload.
    pub result: ResultBody,
    /// Failure message; empty on success.
    pub message: String,
    /// Failure detail; empty on success.
    pub message_detail: String,
}

impl NormalizedResult {
    /// Build a result from its four parts.
    pub fn new(
        status: i32,
        payload: impl Into<String>,
        message: impl Into<String>,
        message_detail: impl Into<String>,
    ) -> Self {
        Self {
            result: ResultBody {
                status,
                payload: payload.into(),
            },
            message: message.into(),
            message_detail: message_detail.into(),
        }
    }

    /// `200` with the given payload.
    pub fn success(payload: impl Into<String>) -> Self {
        Self::new(STATUS_OK, payload, "", "")
    }

    /// Failure with an empty payload.
    pub fn failure(
        status: i32,
        message: impl Into<String>,
        message_detail: impl Into<String>,
    ) -> Self {
        Self::new(status, "", message, message_detail)
    }

    /// Failure that happened before a transaction was attempted.
    pub fn preflight(detail: impl Into<String>) -> Self {
        Self::failure(STATUS_INTERNAL, PREFLIGHT_FAILURE_MESSAGE, detail)
    }

    /// Status code.
    pub fn status(&self) -> i32 {
        self.result.status
    }

    /// Payload text.
    pub fn payload(&self) -> &str {
        &self.result.payload
    }

    /// Whether this is the success branch.
    pub fn is_success(&self) -> bool {
        self.result.status == STATUS_OK
    }
}
