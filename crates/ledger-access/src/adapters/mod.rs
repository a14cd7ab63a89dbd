//! # Adapters
//!
//! File-system implementations of the wallet and profile ports.

pub mod profile_loader;
pub mod wallet;

pub use profile_loader::YamlProfileLoader;
pub use wallet::{FileSystemWallet, FileSystemWallets};
