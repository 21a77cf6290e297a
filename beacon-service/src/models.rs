use serde::{Deserialize, Serialize};

/// Body for creating or replacing a document: pasted text, or an uploaded
/// file as a `data:<mime>;base64,<payload>` URI run through text extraction.
#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub text: Option<String>,
    pub document_data_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub clause: String,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub target_language: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub language: String,
    pub analyzed: bool,
    pub translated: bool,
    pub chat_messages: usize,
}
