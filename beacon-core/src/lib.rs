pub mod analysis;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod models;
pub mod report;
pub mod session;
pub mod speech;
pub mod translation;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use analysis::AnalysisOrchestrator;
pub use catalog::{NOT_FOUND_MESSAGE, OperationReply, OperationRequest, WELCOME_MESSAGE};
pub use error::{BeaconError, Result};
pub use gateway::InferenceGateway;
pub use models::{
    AnalysisResult, ChatMessage, ChatRole, Document, FullAnalysisResult, validate_data_uri,
};
pub use report::render_report;
pub use session::{DocumentSession, SessionStore};
pub use speech::{SpeechResult, synthesize_speech};
pub use translation::{
    DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES, TranslationOrchestrator, is_supported_language,
};
