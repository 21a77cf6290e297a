//! Scripted gateway used by the orchestrator tests: records every call,
//! synthesizes schema-conformant replies from the request inputs, and injects
//! failures per operation or per translated text.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::catalog::OperationRequest;
use crate::error::{BeaconError, Result};
use crate::gateway::InferenceGateway;

#[derive(Default)]
pub struct ScriptedGateway {
    calls: Mutex<Vec<&'static str>>,
    fail_operations: Mutex<Vec<&'static str>>,
    fail_translate_containing: Mutex<Option<String>>,
    raw_reply: Mutex<Option<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call to `operation` fails with a gateway error.
    pub fn fail_on(&self, operation: &'static str) {
        self.fail_operations.lock().unwrap().push(operation);
    }

    /// Translate calls whose document text contains `needle` fail.
    pub fn fail_translate_containing(&self, needle: impl Into<String>) {
        *self.fail_translate_containing.lock().unwrap() = Some(needle.into());
    }

    /// Force the next replies to be this raw string, whatever the operation.
    pub fn reply_raw(&self, raw: impl Into<String>) {
        *self.raw_reply.lock().unwrap() = Some(raw.into());
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|name| **name == operation)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceGateway for ScriptedGateway {
    async fn invoke(&self, request: &OperationRequest) -> Result<String> {
        let name = request.name();
        self.calls.lock().unwrap().push(name);

        if self.fail_operations.lock().unwrap().contains(&name) {
            return Err(BeaconError::Gateway {
                operation: name,
                message: "scripted failure".into(),
            });
        }

        if let OperationRequest::Translate { document_text, .. } = request {
            let needle = self.fail_translate_containing.lock().unwrap().clone();
            if let Some(needle) = needle {
                if document_text.contains(&needle) {
                    return Err(BeaconError::Gateway {
                        operation: name,
                        message: format!("scripted failure for '{needle}'"),
                    });
                }
            }
        }

        if let Some(raw) = self.raw_reply.lock().unwrap().clone() {
            return Ok(raw);
        }

        let reply = match request {
            OperationRequest::Summarize { .. } => {
                json!({"summary": "## Overview\n- A plain-language summary."})
            }
            OperationRequest::IdentifyRisks { .. } => {
                json!({"riskFactors": ["Auto-renewal clause", "Broad indemnification"]})
            }
            OperationRequest::GenerateChecklist { .. } => {
                json!({"checklist": "- Review clause X\n- Sign by date Y"})
            }
            OperationRequest::ExplainClause { clause, .. } => {
                json!({"simplifiedExplanation": format!("In plain terms: {clause}")})
            }
            OperationRequest::AnswerQuestion { question, .. } => {
                json!({"answer": format!("Answer to: {question}")})
            }
            OperationRequest::Translate {
                document_text,
                target_language,
            } => {
                json!({"translatedText": format!("[{target_language}] {document_text}")})
            }
            OperationRequest::ExtractText { .. } => {
                json!({"extractedText": "Extracted contract text."})
            }
            OperationRequest::SynthesizeSpeech { .. } => {
                json!({"audio": "data:audio/wav;base64,UklGRg=="})
            }
        };
        Ok(reply.to_string())
    }
}
