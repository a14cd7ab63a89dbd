//! # Domain Layer
//!
//! Core types for the access layer: identities, sessions, normalized
//! results, connection profiles and errors.

pub mod entities;
pub mod errors;
pub mod policy;
pub mod profile;
pub mod result;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use policy::*;
pub use profile::*;
pub use result::*;
pub use value_objects::*;
