use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::catalog::{OperationReply, OperationRequest};
use crate::gateway::{InferenceGateway, invoke_operation};

/// Outcome of a speech-synthesis request. Speech is a supplementary feature:
/// this record is always returned, never an `Err`, so callers degrade to "no
/// audio" instead of aborting.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechResult {
    pub audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpeechResult {
    fn audio(audio: String) -> Self {
        Self {
            audio: Some(audio),
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            audio: None,
            error: Some(message.into()),
        }
    }
}

/// Synthesize speech for `text`, returning an audio data URI on success.
/// Empty text is rejected locally without a gateway call.
pub async fn synthesize_speech(gateway: &Arc<dyn InferenceGateway>, text: &str) -> SpeechResult {
    if text.trim().is_empty() {
        return SpeechResult::failed("Text cannot be empty.");
    }

    let request = OperationRequest::SynthesizeSpeech {
        text: text.to_string(),
    };

    match invoke_operation(gateway, &request).await {
        Ok(OperationReply::Audio(audio)) => {
            info!(chars = text.len(), "speech synthesis completed");
            SpeechResult::audio(audio)
        }
        Ok(_) => {
            error!("speech synthesis returned a mismatched reply");
            SpeechResult::failed("Failed to generate audio. Please try again.")
        }
        Err(e) => {
            error!(error = %e, "speech synthesis failed");
            SpeechResult::failed("Failed to generate audio. Please try again.")
        }
    }
}
