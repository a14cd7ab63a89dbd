//! # Ledger Access Test Suite
//!
//! Cross-module tests for the access layer.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Profiles, identities, on-disk artifact directories
//! └── integration/
//!     ├── flows.rs      # invoke/query end to end over mock collaborators
//!     └── on_disk.rs    # file-system wallet + YAML profile + telemetry
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ledger-access-tests
//! cargo test -p ledger-access-tests integration::flows::
//! ```

#[cfg(test)]
pub(crate) mod fixtures;
pub mod integration;
