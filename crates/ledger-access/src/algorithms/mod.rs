//! # Algorithms Module
//!
//! Classification of raw transport failures.

pub mod error_classifier;

pub use error_classifier::{parse_embedded_status, EmbeddedStatus, ErrorClass, ErrorTranslator};
