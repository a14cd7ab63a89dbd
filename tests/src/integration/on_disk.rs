//! # On-Disk Collaborators
//!
//! Session establishment against a real artifact directory: the YAML
//! connection profile and the file-system wallet, with the transport still
//! scripted. Also checks the calls show up in the Prometheus registry.

#[cfg(test)]
mod tests {
    use crate::fixtures::{alice, credential, ArtifactDir};
    use access_telemetry::{encode_metrics, register_metrics};
    use ledger_access::{
        AccessConfig, AccessError, ChaincodeCall, ChaincodeInvoker, FileSystemWallet, Identity,
        InvokeService, MockGateway, NormalizedResult, SessionCache, STATUS_INTERNAL,
    };
    use std::sync::Arc;

    fn file_system_cache(gateway: &MockGateway) -> Arc<SessionCache> {
        Arc::new(
            SessionCache::with_file_system(AccessConfig::for_testing(), Arc::new(gateway.clone()))
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_invoke_with_artifact_directory() -> anyhow::Result<()> {
        let artifacts = ArtifactDir::create().await?;
        let gateway = MockGateway::succeeding("OK");
        let service = InvokeService::new(file_system_cache(&gateway));

        let call = ChaincodeCall::new("mychannel", "mycc", "transfer", alice(), artifacts.path())
            .args(["a", "b", "10"]);
        let result = service.invoke(&call).await;

        assert!(result.is_success(), "unexpected result: {result:?}");
        let options = gateway.connect_options();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].credential, credential());
        Ok(())
    }

    #[tokio::test]
    async fn test_identity_added_after_failure() -> anyhow::Result<()> {
        let artifacts = ArtifactDir::create().await?;
        let gateway = MockGateway::succeeding("OK");
        let cache = file_system_cache(&gateway);
        let dave = Identity::new("org1", "dave");

        let err = cache
            .resolve("mychannel", &dave, artifacts.path(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::IdentityNotFound(_)));

        FileSystemWallet::new(AccessConfig::default().wallet_path(artifacts.path()))
            .put("dave", &credential())
            .await?;
        let session = cache
            .resolve("mychannel", &dave, artifacts.path(), false)
            .await?;
        assert_eq!(session.identity(), &dave);
        Ok(())
    }

    #[tokio::test]
    async fn test_each_artifact_directory_checks_its_own_wallet() -> anyhow::Result<()> {
        let org_a = ArtifactDir::create().await?;
        let org_b = ArtifactDir::with_identities(&[]).await?;
        let gateway = MockGateway::succeeding("OK");
        let service = InvokeService::new(file_system_cache(&gateway));

        let on_a = ChaincodeCall::new("mychannel", "mycc", "transfer", alice(), org_a.path());
        let first = service.invoke(&on_a).await;
        assert!(first.is_success(), "unexpected result: {first:?}");

        let on_b = ChaincodeCall::new("otherchannel", "mycc", "transfer", alice(), org_b.path());
        let second = service.invoke(&on_b).await;
        assert_eq!(
            second,
            NormalizedResult::preflight(
                "An identity for the user alice does not exist in the wallet"
            )
        );
        assert_eq!(gateway.connect_count(), 1);
        assert_eq!(gateway.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_profile_is_preflight_failure() -> anyhow::Result<()> {
        let empty = tempfile::TempDir::new()?;
        let gateway = MockGateway::succeeding("OK");
        let service = InvokeService::new(file_system_cache(&gateway));

        let call = ChaincodeCall::new("mychannel", "mycc", "transfer", alice(), empty.path());
        let result = service.invoke(&call).await;

        assert_eq!(result.status(), STATUS_INTERNAL);
        assert!(result.message_detail.contains("network-config.yaml"));
        assert_eq!(gateway.connect_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_calls_are_counted() -> anyhow::Result<()> {
        // Registration is process-global; a repeat reports AlreadyReg.
        let _ = register_metrics();
        let artifacts = ArtifactDir::create().await?;
        let gateway = MockGateway::succeeding("OK");
        let service = InvokeService::new(file_system_cache(&gateway));

        service
            .invoke(&ChaincodeCall::new("mychannel", "mycc", "ping", alice(), artifacts.path()))
            .await;

        let text = encode_metrics()?;
        assert!(text.contains("ledger_access_requests_total"));
        assert!(text.contains("ledger_access_session_establish_duration_seconds"));
        assert!(text.contains("ledger_access_send_transaction_duration_seconds"));
        Ok(())
    }
}
