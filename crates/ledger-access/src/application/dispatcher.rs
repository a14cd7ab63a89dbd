//! # Transaction Dispatcher
//!
//! Runs one chaincode call on a resolved session. Applies the endorser
//! selection policy and hands failures back untouched.

use access_telemetry::{HistogramTimer, SEND_PROPOSAL_DURATION, SEND_TRANSACTION_DURATION};
use tracing::debug;

use crate::domain::{ExecutionMode, Proposal, Session, TransactionRequest, TransportError};

/// Executes transaction requests against sessions. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionDispatcher;

impl TransactionDispatcher {
    /// Execute `request` on `session` and return the raw chaincode payload.
    ///
    /// A non-empty endorser list turns discovery off for this call and
    /// restricts endorsement to exactly those peers. An empty list uses the
    /// session's discovery default. The session itself is never modified.
    /// No retry, no classification.
    pub async fn execute(
        &self,
        session: &Session,
        request: &TransactionRequest,
    ) -> Result<Vec<u8>, TransportError> {
        let contract = session.contract(&request.chaincode);
        let proposal = Proposal::new(&request.function, request.args.clone());
        let proposal = match request.explicit_endorsers() {
            Some(peers) => proposal.set_endorsing_peers(peers.to_vec()),
            None => proposal.with_discovery(session.discovery_enabled()),
        };

        debug!(
            chaincode = %request.chaincode,
            function = %request.function,
            mode = request.mode.as_str(),
            discovery = proposal.discovery,
            endorsers = ?proposal.endorsing_peers,
            "dispatching"
        );

        let labels = [
            session.channel(),
            request.chaincode.as_str(),
            request.function.as_str(),
        ];
        match request.mode {
            ExecutionMode::Submit => {
                let _timer =
                    HistogramTimer::new(&SEND_TRANSACTION_DURATION.with_label_values(&labels));
                contract.submit(&proposal).await
            }
            ExecutionMode::Evaluate => {
                let _timer =
                    HistogramTimer::new(&SEND_PROPOSAL_DURATION.with_label_values(&labels));
                contract.evaluate(&proposal).await
            }
        }
    }
}
