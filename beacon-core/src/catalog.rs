//! The operation catalog: every named operation the orchestrators can send
//! through the inference gateway, with its prompt template and flat output
//! schema. Schema validation is deliberately close to a presence/type check.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{BeaconError, Result};

/// Canned reply the model must return for greeting questions. Encoded in the
/// AnswerQuestion prompt; the core only checks shape, not content.
pub const WELCOME_MESSAGE: &str = "Welcome to ClauseBeacon! I'm ready to help you analyze your \
legal document. How can I assist you today?";

/// Canned phrasing the model must use when a question is not answerable from
/// the document. Answers are never fabricated.
pub const NOT_FOUND_MESSAGE: &str =
    "I couldn't find the answer to your question in the provided document.";

/// A single request to the inference gateway. One variant per operation,
/// carrying its typed input; the catalog is closed, so an unhandled operation
/// is a compile error rather than a stringly-typed miss.
#[derive(Debug, Clone)]
pub enum OperationRequest {
    Summarize {
        document_text: String,
    },
    IdentifyRisks {
        document_text: String,
    },
    GenerateChecklist {
        document_text: String,
    },
    ExplainClause {
        document_text: String,
        clause: String,
    },
    AnswerQuestion {
        document_text: String,
        question: String,
    },
    Translate {
        document_text: String,
        target_language: String,
    },
    ExtractText {
        document_data_uri: String,
    },
    SynthesizeSpeech {
        text: String,
    },
}

/// A parsed model reply: one variant per operation, carrying that
/// operation's typed output. Produced only by
/// [`OperationRequest::parse_reply`], which chooses the variant from the
/// request — so a reply can never be interpreted against the wrong
/// operation's schema.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationReply {
    Summary(String),
    RiskFactors(Vec<String>),
    Checklist(String),
    Explanation(String),
    Answer(String),
    Translation(String),
    ExtractedText(String),
    Audio(String),
}

impl OperationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Summarize { .. } => "summarize",
            Self::IdentifyRisks { .. } => "identify_risks",
            Self::GenerateChecklist { .. } => "generate_checklist",
            Self::ExplainClause { .. } => "explain_clause",
            Self::AnswerQuestion { .. } => "answer_question",
            Self::Translate { .. } => "translate",
            Self::ExtractText { .. } => "extract_text",
            Self::SynthesizeSpeech { .. } => "synthesize_speech",
        }
    }

    /// Render the operation's prompt template with its input fields filled in.
    pub fn render(&self) -> String {
        match self {
            Self::Summarize { document_text } => format!(
                r#"Summarize the following legal document. Your summary should be easy for a layperson to understand.
Structure your summary with clear headings (using ## for titles) and bullet points (using -) to highlight the key points.
Respond **only** with JSON of the form {{"summary": "..."}}.

Document:
{document_text}"#
            ),
            Self::IdentifyRisks { document_text } => format!(
                r#"You are an expert legal assistant. Review the following legal document and identify clauses or terms that could be risky or unfavorable for the signing party.
State each risk factor as a short, plain-language sentence, in the order the risks appear in the document.
Respond **only** with JSON of the form {{"riskFactors": ["...", "..."]}}.

Document:
{document_text}"#
            ),
            Self::GenerateChecklist { document_text } => format!(
                r#"You are an AI assistant designed to generate actionable checklists from legal documents.
Based on the following legal document text, create a checklist of actions that the user should consider.
Format each item on its own line prefixed with "- ".
Respond **only** with JSON of the form {{"checklist": "..."}}.

Document Text:
{document_text}"#
            ),
            Self::ExplainClause {
                document_text,
                clause,
            } => format!(
                r#"You are ClauseBeacon, an expert legal assistant. Explain the following clause in simple, easy-to-understand language, as a helpful lawyer would to a client with no legal background. Use the surrounding document for context.
Respond **only** with JSON of the form {{"simplifiedExplanation": "..."}}.

Legal Document:
---
{document_text}
---

Clause:
"{clause}""#
            ),
            Self::AnswerQuestion {
                document_text,
                question,
            } => format!(
                r#"You are ClauseBeacon, an expert legal assistant. Your persona is that of a helpful and knowledgeable lawyer who explains things in simple, easy-to-understand language.

You will be given a legal document and a user's question. Your task is to answer the question based *only* on the information provided in the document.

- If the user asks a greeting like "hello", respond with: "{WELCOME_MESSAGE}"
- For any other question, analyze the document to find the answer.
- If the answer cannot be found in the document, state that clearly. For example: "{NOT_FOUND_MESSAGE}"
- Keep your answers concise and clear.

Respond **only** with JSON of the form {{"answer": "..."}}.

Legal Document:
---
{document_text}
---

User's Question:
"{question}""#
            ),
            Self::Translate {
                document_text,
                target_language,
            } => format!(
                r#"You are a professional translator specializing in legal documents. Translate the following legal document into {target_language}.
Respond **only** with JSON of the form {{"translatedText": "..."}}.

Document:
{document_text}"#
            ),
            Self::ExtractText { document_data_uri } => format!(
                r#"You are an expert at extracting text from documents. Extract all text content from the provided document. If the document appears to be a legal contract, preserve the formatting and structure as much as possible.
Respond **only** with JSON of the form {{"extractedText": "..."}}.

Document:
{document_data_uri}"#
            ),
            Self::SynthesizeSpeech { text } => format!(
                r#"Convert the following text to speech.
Respond **only** with JSON of the form {{"audio": "..."}} where audio is a base64-encoded WAV data URI.

Text:
{text}"#
            ),
        }
    }

    /// Parse a raw model reply into this operation's typed output, failing
    /// with `SchemaViolation` when the reply does not conform (missing
    /// field, wrong type, not JSON at all). The request picks the schema and
    /// the reply variant, so request/output pairing is fixed here and cannot
    /// be chosen (or mis-chosen) by the caller.
    pub fn parse_reply(&self, raw: &str) -> Result<OperationReply> {
        let operation = self.name();
        Ok(match self {
            Self::Summarize { .. } => {
                OperationReply::Summary(from_json::<SummarizeWire>(operation, raw)?.summary)
            }
            Self::IdentifyRisks { .. } => OperationReply::RiskFactors(
                from_json::<IdentifyRisksWire>(operation, raw)?.risk_factors,
            ),
            Self::GenerateChecklist { .. } => OperationReply::Checklist(
                from_json::<GenerateChecklistWire>(operation, raw)?.checklist,
            ),
            Self::ExplainClause { .. } => OperationReply::Explanation(
                from_json::<ExplainClauseWire>(operation, raw)?.simplified_explanation,
            ),
            Self::AnswerQuestion { .. } => {
                OperationReply::Answer(from_json::<AnswerQuestionWire>(operation, raw)?.answer)
            }
            Self::Translate { .. } => OperationReply::Translation(
                from_json::<TranslateWire>(operation, raw)?.translated_text,
            ),
            Self::ExtractText { .. } => OperationReply::ExtractedText(
                from_json::<ExtractTextWire>(operation, raw)?.extracted_text,
            ),
            Self::SynthesizeSpeech { .. } => {
                OperationReply::Audio(from_json::<SynthesizeSpeechWire>(operation, raw)?.audio)
            }
        })
    }
}

/// Diagnostic for a reply variant that does not match the operation the
/// caller dispatched. `parse_reply` makes this unreachable in practice; the
/// orchestrators surface it instead of panicking.
pub(crate) fn reply_mismatch(operation: &'static str) -> BeaconError {
    BeaconError::SchemaViolation {
        operation,
        detail: "reply variant does not match the operation".into(),
    }
}

// Wire shapes of the model replies. Private: everything outside the catalog
// works with OperationReply.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeWire {
    summary: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyRisksWire {
    risk_factors: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateChecklistWire {
    checklist: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplainClauseWire {
    simplified_explanation: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerQuestionWire {
    answer: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateWire {
    translated_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractTextWire {
    extracted_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeSpeechWire {
    audio: String,
}

fn from_json<T: DeserializeOwned>(operation: &'static str, raw: &str) -> Result<T> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).map_err(|e| BeaconError::SchemaViolation {
        operation,
        detail: e.to_string(),
    })
}

// Models frequently wrap JSON replies in markdown code fences.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("```").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}
