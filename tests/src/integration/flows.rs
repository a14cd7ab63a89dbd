//! # End-to-End Call Flows
//!
//! invoke/query through the session cache, dispatcher and error translator
//! with a scripted gateway transport.
//!
//! ## Flows Tested:
//!
//! 1. **Success**: payload wrapped as `{Result:{Status:200, Payload}, Message:"", MessageDetail:""}`
//! 2. **Endorsement failure**: embedded remote status/message surface as-is
//! 3. **Preflight failure**: missing identity never reaches the transport
//! 4. **Concurrency**: many callers share one established session

#[cfg(test)]
mod tests {
    use crate::fixtures::{alice, mock_cache};
    use ledger_access::{
        ChaincodeCall, ChaincodeInvoker, ChaincodeQuerier, ExecutionMode, Identity,
        InvokeService, MockGateway, MockOutcome, NormalizedResult, QueryService,
        TransportError,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn transfer() -> ChaincodeCall {
        ChaincodeCall::new("mychannel", "mycc", "transfer", alice(), "/artifacts")
            .args(["a", "b", "10"])
    }

    // =============================================================================
    // SUCCESS AND FAILURE SHAPES
    // =============================================================================

    #[tokio::test]
    async fn test_invoke_transfer_succeeds() {
        let gateway = MockGateway::succeeding("OK");
        let service = InvokeService::new(mock_cache(&gateway));

        let result = service.invoke(&transfer()).await;

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "Result": { "Status": 200, "Payload": "OK" },
                "Message": "",
                "MessageDetail": ""
            })
        );
        let call = gateway.last_call().unwrap();
        assert_eq!(call.channel, "mychannel");
        assert_eq!(call.chaincode, "mycc");
        assert_eq!(call.proposal.function, "transfer");
        assert_eq!(call.proposal.args, vec!["a", "b", "10"]);
        assert!(call.proposal.uses_discovery());
    }

    #[tokio::test]
    async fn test_invoke_transfer_double_spend() {
        let gateway = MockGateway::failing(TransportError::endorsement(
            "message=\n...message={\"status\":409,\"msg\":\"double spend\"}\n",
        ));
        let service = InvokeService::new(mock_cache(&gateway));

        let result = service.invoke(&transfer()).await;

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "Result": { "Status": 409, "Payload": "" },
                "Message": "",
                "MessageDetail": "double spend"
            })
        );
    }

    #[tokio::test]
    async fn test_connectivity_failure_reports_lines() {
        let gateway = MockGateway::failing(TransportError::connection(
            "Failed to connect before the deadline\nURL:grpcs://localhost:7051",
        ));
        let service = QueryService::new(mock_cache(&gateway));

        let result = service.query(&transfer()).await;

        assert_eq!(result.status(), 500);
        let lines: Vec<String> = serde_json::from_str(&result.message_detail).unwrap();
        assert_eq!(
            lines,
            vec![
                "Failed to connect before the deadline",
                "URL:grpcs://localhost:7051"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_identity_never_dispatches() {
        let gateway = MockGateway::succeeding("OK");
        let service = InvokeService::new(mock_cache(&gateway));
        let call = ChaincodeCall::new(
            "mychannel",
            "mycc",
            "transfer",
            Identity::new("org1", "carol"),
            "/artifacts",
        );

        let result = service.invoke(&call).await;

        assert_eq!(
            result,
            NormalizedResult::preflight(
                "An identity for the user carol does not exist in the wallet"
            )
        );
        assert_eq!(gateway.connect_count(), 0);
        assert!(gateway.calls().is_empty());
    }

    // =============================================================================
    // ENDORSER SELECTION AND SESSION REUSE
    // =============================================================================

    #[tokio::test]
    async fn test_endorser_override_then_discovery() {
        let gateway = MockGateway::succeeding("OK");
        let cache = mock_cache(&gateway);
        let service = InvokeService::new(Arc::clone(&cache));

        service
            .invoke(&transfer().endorsers(["peer0.org1.example.com"]))
            .await;
        let session = cache.session("mychannel", &alice()).unwrap();
        let restricted = gateway.last_call().unwrap().proposal;
        assert!(!restricted.uses_discovery());
        assert_eq!(
            restricted.endorsing_peers,
            Some(vec!["peer0.org1.example.com".to_string()])
        );
        assert!(session.discovery_enabled());

        service.invoke(&transfer()).await;
        assert!(gateway.last_call().unwrap().proposal.uses_discovery());
        assert_eq!(gateway.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_query_after_invoke_reuses_session() {
        let gateway = MockGateway::succeeding("OK");
        let cache = mock_cache(&gateway);
        let invoke = InvokeService::new(Arc::clone(&cache));
        let query = QueryService::new(Arc::clone(&cache));

        invoke.invoke(&transfer()).await;
        gateway.set_outcome(MockOutcome::Payload(br#"{"a":90,"b":110}"#.to_vec()));
        let result = query
            .query(&ChaincodeCall::new("mychannel", "mycc", "balances", alice(), "/artifacts"))
            .await;

        assert_eq!(result.payload(), r#"{"a":90,"b":110}"#);
        assert_eq!(gateway.connect_count(), 1);
        let modes: Vec<ExecutionMode> = gateway.calls().iter().map(|c| c.mode).collect();
        assert_eq!(modes, vec![ExecutionMode::Submit, ExecutionMode::Evaluate]);
    }

    #[tokio::test]
    async fn test_default_policy_from_session() {
        let gateway = MockGateway::succeeding("OK");
        let cache = mock_cache(&gateway);
        InvokeService::new(Arc::clone(&cache))
            .invoke(&transfer())
            .await;

        let policy = cache
            .session("mychannel", &alice())
            .unwrap()
            .default_endorsement_policy();

        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({
                "identities": [
                    { "role": { "name": "member", "mspId": "Org1MSP" } },
                    { "role": { "name": "member", "mspId": "Org2MSP" } }
                ],
                "policy": { "2-of": [ { "signed-by": 0 }, { "signed-by": 1 } ] }
            })
        );
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_invokes_share_one_session() {
        let gateway = MockGateway::succeeding("OK").with_connect_delay(Duration::from_millis(25));
        let service = InvokeService::new(mock_cache(&gateway));

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let call = transfer().args(vec!["a".to_string(), "b".to_string(), i.to_string()]);
                service.invoke(&call).await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_success());
        }
        assert_eq!(gateway.connect_count(), 1);
        assert_eq!(gateway.calls().len(), 16);
    }
}
