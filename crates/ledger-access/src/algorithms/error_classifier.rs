//! # Error Classifier
//!
//! Turns the multi-line text of a failed dispatch into a normalized
//! `(code, message, detail)` triple.
//!
//! Line grammar, applied to the first line after the preamble only:
//!
//! ```text
//! line    := prefix "message=" payload
//! prefix  := any text not containing "message="
//! payload := ws* object any*
//! object  := JSON object with "status" (integer or numeric string)
//!            and optional "msg" (string, default "")
//! ```
//!
//! A line that does not match falls back to status 500 with the full line
//! array as detail. Classification never fails and never panics.

use crate::domain::{TransportError, STATUS_INTERNAL};
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Marker introducing an embedded status payload.
pub const PAYLOAD_MARKER: &str = "message=";

/// Status/message payload a remote endorser embeds in its error text.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct EmbeddedStatus {
    /// Remote status code.
    #[serde(deserialize_with = "deserialize_status")]
    pub status: i32,
    /// Remote message.
    #[serde(default)]
    pub msg: String,
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Number(i64),
        Text(String),
    }

    let value = match Status::deserialize(deserializer)? {
        Status::Number(n) => n,
        Status::Text(s) => s.trim().parse::<i64>().map_err(de::Error::custom)?,
    };
    i32::try_from(value).map_err(de::Error::custom)
}

/// Parse the embedded payload out of one line.
///
/// Returns `None` when the line has no marker or the text after the first
/// marker does not start with a well-formed payload object. Anything after
/// the object is ignored.
pub fn parse_embedded_status(line: &str) -> Option<EmbeddedStatus> {
    let (_, suffix) = line.split_once(PAYLOAD_MARKER)?;
    serde_json::Deserializer::from_str(suffix)
        .into_iter::<EmbeddedStatus>()
        .next()?
        .ok()
}

/// Outcome of classifying a transport failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// A remote endorser reported a status and message.
    Endorsement {
        /// Remote status code.
        status: i32,
        /// Remote message.
        message: String,
    },
    /// The first line after the preamble carried no payload.
    Unclassified {
        /// Every line of the raw message, preamble included.
        lines: Vec<String>,
    },
    /// Nothing followed the preamble.
    Empty,
}

impl ErrorClass {
    /// Status code to report.
    pub fn code(&self) -> i32 {
        match self {
            Self::Endorsement { status, .. } => *status,
            Self::Unclassified { .. } | Self::Empty => STATUS_INTERNAL,
        }
    }

    /// Caller-facing message; always empty for transport failures.
    pub fn message(&self) -> &str {
        ""
    }

    /// Caller-facing detail.
    ///
    /// For unclassified failures this is the JSON array of the raw lines.
    pub fn detail(&self) -> String {
        match self {
            Self::Endorsement { message, .. } => message.clone(),
            Self::Unclassified { lines } => serde_json::to_string(lines).unwrap_or_default(),
            Self::Empty => String::new(),
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Endorsement { .. } => "endorsement",
            Self::Unclassified { .. } => "unclassified",
            Self::Empty => "empty",
        }
    }
}

/// Classifies transport failures. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Classify a transport failure by its raw message.
    pub fn classify(&self, error: &TransportError) -> ErrorClass {
        self.classify_message(&error.raw_message)
    }

    /// Classify raw multi-line error text.
    pub fn classify_message(&self, raw: &str) -> ErrorClass {
        let lines: Vec<&str> = raw
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();

        // Line 0 is a generic preamble; only the next line is inspected.
        let Some(first) = lines.get(1) else {
            return ErrorClass::Empty;
        };

        match parse_embedded_status(first) {
            Some(EmbeddedStatus { status, msg }) => ErrorClass::Endorsement {
                status,
                message: msg,
            },
            None => ErrorClass::Unclassified {
                lines: lines.iter().map(|line| line.to_string()).collect(),
            },
        }
    }

    /// `(code, message, detail)` for a transport failure.
    pub fn translate(&self, error: &TransportError) -> (i32, String, String) {
        let class = self.classify(error);
        (class.code(), class.message().to_string(), class.detail())
    }
}
