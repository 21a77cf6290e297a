use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openrouter;
use tracing::{debug, error};

use beacon_core::{BeaconError, InferenceGateway, OperationRequest, Result};

const PREAMBLE: &str =
    "You are ClauseBeacon, an AI legal document assistant. Follow the instructions in each \
     request exactly and reply only in the requested JSON shape.";

const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// OpenRouter-backed gateway. One `invoke` renders the operation's prompt and
/// performs one model round trip; failures are surfaced opaquely as
/// `BeaconError::Gateway` with the raw cause going to the logs only.
pub struct RigGateway {
    model: String,
}

impl RigGateway {
    pub fn from_env() -> Self {
        let model = std::env::var("BEACON_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self { model }
    }
}

#[async_trait]
impl InferenceGateway for RigGateway {
    async fn invoke(&self, request: &OperationRequest) -> Result<String> {
        let operation = request.name();
        let api_key = std::env::var("OPENROUTER_API_KEY").map_err(|_| BeaconError::Gateway {
            operation,
            message: "OPENROUTER_API_KEY not set".into(),
        })?;

        let client = openrouter::Client::new(&api_key);
        let agent = client.agent(&self.model).preamble(PREAMBLE).build();

        let prompt = request.render();
        debug!(operation, chars = prompt.len(), "invoking inference gateway");

        agent.prompt(&prompt).await.map_err(|e| {
            error!(operation, error = %e, "inference gateway call failed");
            BeaconError::Gateway {
                operation,
                message: e.to_string(),
            }
        })
    }
}
