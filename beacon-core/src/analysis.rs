use std::sync::Arc;

use tracing::{error, info};

use crate::catalog::{OperationReply, OperationRequest, reply_mismatch};
use crate::error::{BeaconError, Result};
use crate::gateway::{InferenceGateway, invoke_operation};
use crate::models::{AnalysisResult, validate_data_uri};

/// Fans out the per-document operations against the gateway and merges their
/// typed outputs. All aggregation is all-or-nothing: a partial result is
/// never surfaced as success.
pub struct AnalysisOrchestrator {
    gateway: Arc<dyn InferenceGateway>,
}

impl AnalysisOrchestrator {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { gateway }
    }

    /// Run Summarize, IdentifyRisks, and GenerateChecklist concurrently over
    /// the same document text and merge the three outputs positionally.
    ///
    /// Empty input is rejected before any gateway call. If any leg fails the
    /// whole call fails with `AnalysisFailed` wrapping the first error; field
    /// order and risk-factor order are exactly as the gateway returned them.
    pub async fn analyze(&self, document_text: &str) -> Result<AnalysisResult> {
        if document_text.trim().is_empty() {
            return Err(BeaconError::InvalidInput(
                "Document text cannot be empty.".into(),
            ));
        }

        info!(chars = document_text.len(), "analyzing document");

        let (summary, risk_factors, checklist) = tokio::try_join!(
            self.summarize(document_text),
            self.identify_risks(document_text),
            self.generate_checklist(document_text),
        )
        .map_err(|e| {
            error!(error = %e, "analysis fan-out failed");
            BeaconError::AnalysisFailed(Box::new(e))
        })?;

        info!(
            risk_factors = risk_factors.len(),
            "document analysis completed"
        );

        Ok(AnalysisResult {
            summary,
            risk_factors,
            checklist,
        })
    }

    async fn summarize(&self, document_text: &str) -> Result<String> {
        let request = OperationRequest::Summarize {
            document_text: document_text.to_string(),
        };
        match invoke_operation(&self.gateway, &request).await? {
            OperationReply::Summary(summary) => Ok(summary),
            _ => Err(reply_mismatch(request.name())),
        }
    }

    async fn identify_risks(&self, document_text: &str) -> Result<Vec<String>> {
        let request = OperationRequest::IdentifyRisks {
            document_text: document_text.to_string(),
        };
        match invoke_operation(&self.gateway, &request).await? {
            OperationReply::RiskFactors(risk_factors) => Ok(risk_factors),
            _ => Err(reply_mismatch(request.name())),
        }
    }

    async fn generate_checklist(&self, document_text: &str) -> Result<String> {
        let request = OperationRequest::GenerateChecklist {
            document_text: document_text.to_string(),
        };
        match invoke_operation(&self.gateway, &request).await? {
            OperationReply::Checklist(checklist) => Ok(checklist),
            _ => Err(reply_mismatch(request.name())),
        }
    }

    /// Explain one clause in plain language. Single gateway call.
    pub async fn explain_clause(&self, document_text: &str, clause: &str) -> Result<String> {
        if document_text.trim().is_empty() || clause.trim().is_empty() {
            return Err(BeaconError::InvalidInput(
                "Document text and clause cannot be empty.".into(),
            ));
        }

        let request = OperationRequest::ExplainClause {
            document_text: document_text.to_string(),
            clause: clause.to_string(),
        };

        let reply = invoke_operation(&self.gateway, &request)
            .await
            .map_err(|e| {
                error!(error = %e, "clause explanation failed");
                BeaconError::ExplainFailed(Box::new(e))
            })?;
        match reply {
            OperationReply::Explanation(explanation) => Ok(explanation),
            _ => Err(reply_mismatch(request.name())),
        }
    }

    /// Answer a question about the document. Stateless: prior chat turns are
    /// not sent, the document text alone is resent on every call.
    pub async fn answer_question(&self, document_text: &str, question: &str) -> Result<String> {
        if document_text.trim().is_empty() || question.trim().is_empty() {
            return Err(BeaconError::InvalidInput(
                "Document text and question cannot be empty.".into(),
            ));
        }

        let request = OperationRequest::AnswerQuestion {
            document_text: document_text.to_string(),
            question: question.to_string(),
        };

        let reply = invoke_operation(&self.gateway, &request)
            .await
            .map_err(|e| {
                error!(error = %e, "question answering failed");
                BeaconError::AnswerFailed(Box::new(e))
            })?;
        match reply {
            OperationReply::Answer(answer) => Ok(answer),
            _ => Err(reply_mismatch(request.name())),
        }
    }

    /// Extract text from an uploaded document supplied as a data URI. The
    /// URI shape is validated locally before any gateway call.
    pub async fn extract_text(&self, document_data_uri: &str) -> Result<String> {
        let mime_type = validate_data_uri(document_data_uri)?;
        info!(mime_type, "extracting text from uploaded document");

        let request = OperationRequest::ExtractText {
            document_data_uri: document_data_uri.to_string(),
        };

        let reply = invoke_operation(&self.gateway, &request)
            .await
            .map_err(|e| {
                error!(error = %e, "text extraction failed");
                BeaconError::Extraction(e.to_string())
            })?;
        match reply {
            OperationReply::ExtractedText(text) => Ok(text),
            _ => Err(reply_mismatch(request.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGateway;

    fn orchestrator() -> (Arc<ScriptedGateway>, AnalysisOrchestrator) {
        let gateway = Arc::new(ScriptedGateway::new());
        let orchestrator = AnalysisOrchestrator::new(gateway.clone());
        (gateway, orchestrator)
    }

    #[tokio::test]
    async fn analyze_merges_all_three_legs() {
        let (gateway, orchestrator) = orchestrator();
        let result = orchestrator.analyze("NDA text...").await.unwrap();

        assert!(!result.summary.is_empty());
        assert_eq!(
            result.risk_factors,
            vec!["Auto-renewal clause", "Broad indemnification"]
        );
        assert_eq!(result.checklist, "- Review clause X\n- Sign by date Y");

        let mut calls = gateway.calls();
        calls.sort_unstable();
        assert_eq!(calls, ["generate_checklist", "identify_risks", "summarize"]);
    }

    #[tokio::test]
    async fn analyze_rejects_whitespace_input_without_gateway_calls() {
        let (gateway, orchestrator) = orchestrator();
        let err = orchestrator.analyze("   \n\t ").await.unwrap_err();

        assert!(matches!(err, BeaconError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Document text cannot be empty.");
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn analyze_fails_whole_when_one_leg_fails() {
        let (gateway, orchestrator) = orchestrator();
        gateway.fail_on("identify_risks");

        let err = orchestrator.analyze("NDA text...").await.unwrap_err();
        assert!(matches!(err, BeaconError::AnalysisFailed(_)));
        assert_eq!(
            err.to_string(),
            "Failed to analyze the document. Please try again."
        );
    }

    #[tokio::test]
    async fn analyze_fails_on_schema_violation() {
        let (gateway, orchestrator) = orchestrator();
        gateway.reply_raw("not json at all");

        let err = orchestrator.analyze("NDA text...").await.unwrap_err();
        let BeaconError::AnalysisFailed(cause) = err else {
            panic!("expected AnalysisFailed");
        };
        assert!(matches!(*cause, BeaconError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn explain_clause_requires_both_inputs() {
        let (gateway, orchestrator) = orchestrator();
        let err = orchestrator.explain_clause("doc", "  ").await.unwrap_err();

        assert!(matches!(err, BeaconError::InvalidInput(_)));
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn explain_clause_returns_single_call_output() {
        let (gateway, orchestrator) = orchestrator();
        let explanation = orchestrator
            .explain_clause("doc", "Section 4.2")
            .await
            .unwrap();

        assert_eq!(explanation, "In plain terms: Section 4.2");
        assert_eq!(gateway.total_calls(), 1);
    }

    #[tokio::test]
    async fn answer_question_wraps_gateway_failure() {
        let (gateway, orchestrator) = orchestrator();
        gateway.fail_on("answer_question");

        let err = orchestrator
            .answer_question("doc", "what is the term?")
            .await
            .unwrap_err();
        assert!(matches!(err, BeaconError::AnswerFailed(_)));
    }

    #[tokio::test]
    async fn extract_text_rejects_malformed_uri_without_gateway_call() {
        let (gateway, orchestrator) = orchestrator();
        let err = orchestrator
            .extract_text("https://example.com/contract.pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, BeaconError::Extraction(_)));
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn extract_text_returns_extracted_text() {
        let (gateway, orchestrator) = orchestrator();
        let text = orchestrator
            .extract_text("data:application/pdf;base64,JVBERi0xLjQ=")
            .await
            .unwrap();

        assert_eq!(text, "Extracted contract text.");
        assert_eq!(gateway.call_count("extract_text"), 1);
    }
}
