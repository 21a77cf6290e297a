use serde::{Deserialize, Serialize};

use crate::error::{BeaconError, Result};

/// Merged output of one document analysis. Immutable once constructed; a new
/// analysis is a new value, never a patch of an old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub risk_factors: Vec<String>,
    pub checklist: String,
}

/// The original analysis plus an optional translated variant.
///
/// `translated`, when present, is always structurally isomorphic to
/// `original` (same number of risk factors, same order) and is always derived
/// from `original`, never from a previous translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysisResult {
    pub original: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated: Option<AnalysisResult>,
}

impl FullAnalysisResult {
    pub fn new(original: AnalysisResult) -> Self {
        Self {
            original,
            translated: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn in a document's chat session. The sequence is append-only and is
/// cleared whenever the document changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The document under analysis. Replaced wholesale on re-upload, never edited
/// in place; the orchestrators treat it as an opaque input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl Document {
    /// A document created from pasted text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data_uri: None,
            mime_type: None,
        }
    }

    /// A document whose text was extracted from an uploaded file. The data
    /// URI must already have been validated with [`validate_data_uri`].
    pub fn from_extracted(text: impl Into<String>, data_uri: impl Into<String>) -> Self {
        let data_uri = data_uri.into();
        let mime_type = validate_data_uri(&data_uri).ok().map(str::to_string);
        Self {
            text: text.into(),
            data_uri: Some(data_uri),
            mime_type,
        }
    }
}

/// Check that `uri` is a self-describing data URI of the form
/// `data:<mime>;base64,<payload>` and return the MIME type.
pub fn validate_data_uri(uri: &str) -> Result<&str> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| malformed_uri(uri))?;
    let (mime, payload) = rest.split_once(";base64,").ok_or_else(|| malformed_uri(uri))?;
    if mime.is_empty() || payload.is_empty() {
        return Err(malformed_uri(uri));
    }
    Ok(mime)
}

fn malformed_uri(uri: &str) -> BeaconError {
    let head: String = uri.chars().take(32).collect();
    BeaconError::Extraction(format!(
        "expected a data URI of the form data:<mime>;base64,<payload>, got '{head}…'"
    ))
}
