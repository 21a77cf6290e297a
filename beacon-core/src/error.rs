use thiserror::Error;

/// Error taxonomy for the orchestration core.
///
/// Display strings on the aggregate variants are user-facing; the underlying
/// cause is kept as a `#[source]` for logging and is not shown verbatim.
#[derive(Debug, Error)]
pub enum BeaconError {
    /// A precondition failed locally. No external call was made.
    #[error("{0}")]
    InvalidInput(String),

    /// The inference gateway failed for a single call: transport, rate limit,
    /// or model error. Opaque and terminal for that call.
    #[error("inference gateway call for '{operation}' failed: {message}")]
    Gateway {
        operation: &'static str,
        message: String,
    },

    /// The model replied, but the reply does not conform to the operation's
    /// declared output schema (missing field, wrong type, not JSON).
    #[error("reply for '{operation}' did not match its output schema: {detail}")]
    SchemaViolation {
        operation: &'static str,
        detail: String,
    },

    /// Text extraction failed: malformed data URI, unsupported format, or a
    /// gateway failure during extraction. The detail string is for logs.
    #[error("Failed to extract text from the document. Please try again.")]
    Extraction(String),

    /// One or more legs of the analysis fan-out failed; no partial result.
    #[error("Failed to analyze the document. Please try again.")]
    AnalysisFailed(#[source] Box<BeaconError>),

    #[error("Failed to explain the clause. Please try again.")]
    ExplainFailed(#[source] Box<BeaconError>),

    #[error("Failed to answer the question. Please try again.")]
    AnswerFailed(#[source] Box<BeaconError>),

    /// One or more legs of the translation fan-out failed; any previously
    /// accepted translation is left untouched.
    #[error("Failed to translate the analysis. Please try again.")]
    TranslationFailed(#[source] Box<BeaconError>),
}

pub type Result<T> = std::result::Result<T, BeaconError>;
