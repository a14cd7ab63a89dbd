//! # Access Layer Configuration
//!
//! Where collaborators find their files under an artifact location, the
//! discovery defaults handed to the transport, and how sessions are keyed.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required file or directory name is empty.
    #[error("Invalid configuration: {0} cannot be empty")]
    EmptyName(&'static str),

    /// Commit timeout of zero.
    #[error("Invalid configuration: commit_timeout cannot be 0")]
    ZeroCommitTimeout,

    /// Unknown session keying name.
    #[error("Invalid configuration: unknown session keying '{0}'")]
    UnknownKeying(String),

    /// Config text could not be parsed.
    #[error("Invalid configuration: {0}")]
    Parse(String),
}

/// Discovery settings handed to the transport on connect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Let the backend pick endorsers for new sessions.
    pub enabled: bool,
    /// Rewrite discovered endpoints to localhost (local dev networks).
    pub as_localhost: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            as_localhost: false,
        }
    }
}

/// How the session table is keyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKeying {
    /// One session per (identity, channel).
    #[default]
    PerIdentity,
    /// One session per channel, whichever identity established it.
    Channel,
}

impl std::str::FromStr for SessionKeying {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_identity" | "per-identity" | "identity" => Ok(Self::PerIdentity),
            "channel" => Ok(Self::Channel),
            other => Err(ConfigError::UnknownKeying(other.to_string())),
        }
    }
}

/// Access layer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Sub-directory of the artifact location holding the profile.
    pub artifacts_dir: String,
    /// Connection profile file name.
    pub profile_file: String,
    /// Sub-directory of the artifact location holding the wallet.
    pub wallet_dir: String,
    /// Discovery defaults.
    pub discovery: DiscoveryConfig,
    /// Session table keying.
    pub session_keying: SessionKeying,
    /// Upper bound the transport waits for a commit event.
    #[serde(with = "humantime_serde")]
    pub commit_timeout: Duration,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: "artifacts".to_string(),
            profile_file: "network-config.yaml".to_string(),
            wallet_dir: "wallet".to_string(),
            discovery: DiscoveryConfig::default(),
            session_keying: SessionKeying::PerIdentity,
            commit_timeout: Duration::from_secs(300),
        }
    }
}

impl AccessConfig {
    /// Create a config for testing (short commit timeout).
    pub fn for_testing() -> Self {
        Self {
            commit_timeout: Duration::from_secs(5),
            ..Self::default()
        }
    }

    /// Load config from YAML text; missing fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LA_ARTIFACTS_DIR`: profile sub-directory (default: artifacts)
    /// - `LA_PROFILE_FILE`: profile file name (default: network-config.yaml)
    /// - `LA_WALLET_DIR`: wallet sub-directory (default: wallet)
    /// - `LA_DISCOVERY_ENABLED`: discovery default (default: true)
    /// - `LA_DISCOVERY_AS_LOCALHOST`: localhost rewriting (default: false)
    /// - `LA_SESSION_KEYING`: `per_identity` or `channel` (default: per_identity)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let session_keying = match env::var("LA_SESSION_KEYING") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.session_keying,
        };

        let config = Self {
            artifacts_dir: env::var("LA_ARTIFACTS_DIR").unwrap_or(defaults.artifacts_dir),
            profile_file: env::var("LA_PROFILE_FILE").unwrap_or(defaults.profile_file),
            wallet_dir: env::var("LA_WALLET_DIR").unwrap_or(defaults.wallet_dir),
            discovery: DiscoveryConfig {
                enabled: env_flag("LA_DISCOVERY_ENABLED", defaults.discovery.enabled),
                as_localhost: env_flag(
                    "LA_DISCOVERY_AS_LOCALHOST",
                    defaults.discovery.as_localhost,
                ),
            },
            session_keying,
            commit_timeout: defaults.commit_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.artifacts_dir.trim().is_empty() {
            return Err(ConfigError::EmptyName("artifacts_dir"));
        }
        if self.profile_file.trim().is_empty() {
            return Err(ConfigError::EmptyName("profile_file"));
        }
        if self.wallet_dir.trim().is_empty() {
            return Err(ConfigError::EmptyName("wallet_dir"));
        }
        if self.commit_timeout.is_zero() {
            return Err(ConfigError::ZeroCommitTimeout);
        }
        Ok(())
    }

    /// Connection profile path under `artifact_location`.
    pub fn profile_path(&self, artifact_location: &Path) -> PathBuf {
        artifact_location
            .join(&self.artifacts_dir)
            .join(&self.profile_file)
    }

    /// Wallet directory under `artifact_location`.
    pub fn wallet_path(&self, artifact_location: &Path) -> PathBuf {
        artifact_location.join(&self.wallet_dir)
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => default,
        })
        .unwrap_or(default)
}
