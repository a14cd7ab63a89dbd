//! # Invoke / Query Services
//!
//! Caller-facing façades: resolve the session, dispatch in submit or
//! evaluate mode, and fold every outcome into a [`NormalizedResult`].

use access_telemetry::{
    HistogramTimer, ERROR_REQUESTS, REQUESTS, SEND_TRANSACTION_TOTAL_DURATION,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

use super::dispatcher::TransactionDispatcher;
use super::session_cache::SessionCache;
use crate::algorithms::ErrorTranslator;
use crate::domain::{ChaincodeCall, ExecutionMode, NormalizedResult};
use crate::ports::{ChaincodeInvoker, ChaincodeQuerier};

/// Resolve, dispatch and translate one call.
async fn run_call(
    cache: &SessionCache,
    dispatcher: &TransactionDispatcher,
    translator: &ErrorTranslator,
    call: &ChaincodeCall,
    mode: ExecutionMode,
) -> NormalizedResult {
    let span = info_span!(
        "chaincode_call",
        mode = mode.as_str(),
        channel = %call.channel,
        chaincode = %call.chaincode,
        function = %call.function,
        identity = %call.identity,
    );

    async move {
        REQUESTS.with_label_values(&[mode.as_str()]).inc();
        let _timer = HistogramTimer::new(&SEND_TRANSACTION_TOTAL_DURATION.with_label_values(&[
            call.channel.as_str(),
            call.chaincode.as_str(),
            call.function.as_str(),
        ]));

        let session = match cache
            .resolve(
                &call.channel,
                &call.identity,
                &call.artifact_dir,
                call.refresh_session,
            )
            .await
        {
            Ok(session) => session,
            Err(err) => {
                error!(error = %err, "session resolution failed");
                ERROR_REQUESTS
                    .with_label_values(&[mode.as_str(), "preflight"])
                    .inc();
                return NormalizedResult::preflight(err.to_string());
            }
        };

        match dispatcher.execute(&session, &call.to_request(mode)).await {
            Ok(payload) => {
                info!(bytes = payload.len(), "chaincode call succeeded");
                NormalizedResult::success(String::from_utf8_lossy(&payload))
            }
            Err(err) => {
                let class = translator.classify(&err);
                warn!(
                    kind = %err.kind,
                    class = class.label(),
                    code = class.code(),
                    "chaincode call failed"
                );
                ERROR_REQUESTS
                    .with_label_values(&[mode.as_str(), class.label()])
                    .inc();
                NormalizedResult::failure(class.code(), class.message(), class.detail())
            }
        }
    }
    .instrument(span)
    .await
}

/// Submits state-changing transactions.
#[derive(Clone)]
pub struct InvokeService {
    cache: Arc<SessionCache>,
    dispatcher: TransactionDispatcher,
    translator: ErrorTranslator,
}

impl InvokeService {
    /// Service over a shared session cache.
    pub fn new(cache: Arc<SessionCache>) -> Self {
        Self {
            cache,
            dispatcher: TransactionDispatcher,
            translator: ErrorTranslator,
        }
    }

    /// Session cache in use.
    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }
}

#[async_trait]
impl ChaincodeInvoker for InvokeService {
    async fn invoke(&self, call: &ChaincodeCall) -> NormalizedResult {
        run_call(
            &self.cache,
            &self.dispatcher,
            &self.translator,
            call,
            ExecutionMode::Submit,
        )
        .await
    }
}

/// Evaluates read-only queries.
#[derive(Clone)]
pub struct QueryService {
    cache: Arc<SessionCache>,
    dispatcher: TransactionDispatcher,
    translator: ErrorTranslator,
}

impl QueryService {
    /// Service over a shared session cache.
    pub fn new(cache: Arc<SessionCache>) -> Self {
        Self {
            cache,
            dispatcher: TransactionDispatcher,
            translator: ErrorTranslator,
        }
    }

    /// Session cache in use.
    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }
}

#[async_trait]
impl ChaincodeQuerier for QueryService {
    async fn query(&self, call: &ChaincodeCall) -> NormalizedResult {
        run_call(
            &self.cache,
            &self.dispatcher,
            &self.translator,
            call,
            ExecutionMode::Evaluate,
        )
        .await
    }
}
