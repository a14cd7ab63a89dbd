//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod dispatcher;
pub mod service;
pub mod session_cache;

pub use dispatcher::TransactionDispatcher;
pub use service::{InvokeService, QueryService};
pub use session_cache::SessionCache;
