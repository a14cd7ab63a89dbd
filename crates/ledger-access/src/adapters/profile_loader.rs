//! Connection profile loader reading YAML (or JSON) from disk.

use crate::domain::{AccessError, ConnectionProfile};
use crate::ports::outbound::ProfileLoader;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Reads connection profiles from the file system.
///
/// YAML is a superset of JSON, so `.json` profiles parse too.
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlProfileLoader;

#[async_trait]
impl ProfileLoader for YamlProfileLoader {
    async fn load(&self, path: &Path) -> Result<ConnectionProfile, AccessError> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| AccessError::ProfileLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let profile = ConnectionProfile::from_yaml(&text).map_err(|e| AccessError::ProfileLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(
            path = %path.display(),
            channels = profile.channels.len(),
            peers = profile.peers.len(),
            "loaded connection profile"
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::fixtures::TWO_ORG_PROFILE;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_yaml_profile() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("network-config.yaml");
        std::fs::write(&path, TWO_ORG_PROFILE).unwrap();

        let profile = YamlProfileLoader.load(&path).await.unwrap();
        assert!(profile.channel("mychannel").is_some());
    }

    #[tokio::test]
    async fn test_load_json_profile() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("connection.json");
        std::fs::write(
            &path,
            r#"{"name":"json-net","version":"1.0.0","peers":{"peer0":{"url":"grpcs://localhost:7051"}}}"#,
        )
        .unwrap();

        let profile = YamlProfileLoader.load(&path).await.unwrap();
        assert_eq!(profile.name, "json-net");
        assert_eq!(profile.peers.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.yaml");

        let err = YamlProfileLoader.load(&path).await.unwrap_err();
        match err {
            AccessError::ProfileLoad { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_profile() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        std::fs::write(&path, "channels: [unterminated").unwrap();

        assert!(matches!(
            YamlProfileLoader.load(&path).await,
            Err(AccessError::ProfileLoad { .. })
        ));
    }
}
