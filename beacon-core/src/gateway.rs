use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::{OperationReply, OperationRequest};
use crate::error::Result;

/// The external inference capability. One `invoke` is one LLM round trip:
/// the gateway renders nothing and parses nothing, it takes a request and
/// returns the raw model output. Any transport, rate-limit, or model failure
/// surfaces as [`BeaconError::Gateway`](crate::BeaconError::Gateway) and is
/// treated as opaque and terminal for that call; retries are the caller's
/// decision, never automatic.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    async fn invoke(&self, request: &OperationRequest) -> Result<String>;
}

/// Invoke an operation and parse its reply. The request itself decides which
/// [`OperationReply`] variant the raw output is parsed into.
pub async fn invoke_operation(
    gateway: &Arc<dyn InferenceGateway>,
    request: &OperationRequest,
) -> Result<OperationReply> {
    let raw = gateway.invoke(request).await?;
    request.parse_reply(&raw)
}
