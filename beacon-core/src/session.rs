use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AnalysisResult, ChatMessage, Document, FullAnalysisResult};
use crate::translation::DEFAULT_LANGUAGE;

/// Explicit, versioned state for one document's session: the document, its
/// analysis (original plus optional translated variant), the chat history,
/// and the currently displayed language.
///
/// The `generation` counter resolves supersession: every orchestrated action
/// captures the generation before it starts, and its completion is accepted
/// only if the generation is still current. Replacing the document bumps the
/// generation, so a stale in-flight analysis can never corrupt newer state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSession {
    pub id: String,
    document: Document,
    analysis: Option<FullAnalysisResult>,
    chat: Vec<ChatMessage>,
    language: String,
    generation: u64,
}

impl DocumentSession {
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self {
            id: id.into(),
            document,
            analysis: None,
            chat: Vec::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            generation: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn analysis(&self) -> Option<&FullAnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    /// Replace the document wholesale. All derived state (analysis, chat,
    /// language) resets, and the generation advances so that completions of
    /// in-flight actions against the old document are discarded.
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
        self.analysis = None;
        self.chat.clear();
        self.language = DEFAULT_LANGUAGE.to_string();
        self.generation += 1;
    }

    /// Accept a completed analysis if it still belongs to the current
    /// generation. Returns false (and changes nothing) when superseded.
    /// A fresh analysis always starts with no translated variant.
    pub fn accept_analysis(&mut self, generation: u64, result: AnalysisResult) -> bool {
        if generation != self.generation {
            return false;
        }
        self.analysis = Some(FullAnalysisResult::new(result));
        self.language = DEFAULT_LANGUAGE.to_string();
        true
    }

    /// Accept a completed translation if the generation is still current and
    /// an original analysis exists. On failure paths this is never called, so
    /// a previously accepted translation stays untouched.
    ///
    /// A translation must mirror the original's shape: one translated risk
    /// factor per original risk factor. A result with a different count
    /// belongs to some other analysis and is rejected.
    pub fn accept_translation(
        &mut self,
        generation: u64,
        language: &str,
        translated: AnalysisResult,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        let Some(analysis) = self.analysis.as_mut() else {
            return false;
        };
        if translated.risk_factors.len() != analysis.original.risk_factors.len() {
            return false;
        }
        analysis.translated = Some(translated);
        self.language = language.to_string();
        true
    }

    /// Switch back to the default language. The cached translated variant is
    /// kept; it is simply not displayed.
    pub fn show_original(&mut self) {
        self.language = DEFAULT_LANGUAGE.to_string();
    }

    /// The analysis to present: the translated variant when a non-default
    /// language is selected and a translation exists, the original otherwise.
    pub fn display_analysis(&self) -> Option<&AnalysisResult> {
        let analysis = self.analysis.as_ref()?;
        if self.language != DEFAULT_LANGUAGE {
            if let Some(translated) = analysis.translated.as_ref() {
                return Some(translated);
            }
        }
        Some(&analysis.original)
    }

    pub fn push_user_message(&mut self, content: impl Into<String>) {
        self.chat.push(ChatMessage::user(content));
    }

    pub fn push_assistant_message(&mut self, content: impl Into<String>) {
        self.chat.push(ChatMessage::assistant(content));
    }
}

/// In-memory session store keyed by session id.
pub struct SessionStore {
    sessions: DashMap<String, DocumentSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn create(&self, document: Document) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .insert(id.clone(), DocumentSession::new(id.clone(), document));
        id
    }

    pub fn get(&self, id: &str) -> Option<DocumentSession> {
        self.sessions.get(id).map(|entry| entry.clone())
    }

    /// Run `f` against the stored session, if it exists, and persist the
    /// mutation. Returns `f`'s result.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut DocumentSession) -> R) -> Option<R> {
        self.sessions.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn delete(&self, id: &str) {
        self.sessions.remove(id);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            summary: "s".into(),
            risk_factors: vec!["r1".into(), "r2".into()],
            checklist: "c".into(),
        }
    }

    #[test]
    fn replacing_the_document_resets_derived_state() {
        let mut session = DocumentSession::new("s1", Document::from_text("old text"));
        let generation = session.generation();
        assert!(session.accept_analysis(generation, analysis()));
        session.push_user_message("hello");
        session.push_assistant_message("hi");

        session.set_document(Document::from_text("new text"));

        assert!(session.analysis().is_none());
        assert!(session.chat().is_empty());
        assert_eq!(session.language(), DEFAULT_LANGUAGE);
        assert_eq!(session.generation(), generation + 1);
    }

    #[test]
    fn stale_analysis_completion_is_discarded() {
        let mut session = DocumentSession::new("s1", Document::from_text("old text"));
        let stale = session.generation();

        session.set_document(Document::from_text("new text"));

        assert!(!session.accept_analysis(stale, analysis()));
        assert!(session.analysis().is_none());
    }

    #[test]
    fn stale_translation_completion_is_discarded() {
        let mut session = DocumentSession::new("s1", Document::from_text("text"));
        let generation = session.generation();
        assert!(session.accept_analysis(generation, analysis()));

        session.set_document(Document::from_text("newer text"));
        assert!(!session.accept_translation(generation, "Spanish", analysis()));
    }

    #[test]
    fn translation_with_mismatched_shape_is_rejected() {
        let mut session = DocumentSession::new("s1", Document::from_text("text"));
        let generation = session.generation();
        assert!(session.accept_analysis(generation, analysis()));

        let mut wrong_shape = analysis();
        wrong_shape.risk_factors.pop();
        assert!(!session.accept_translation(generation, "Spanish", wrong_shape));

        assert!(session.analysis().unwrap().translated.is_none());
        assert_eq!(session.language(), DEFAULT_LANGUAGE);
    }

    #[test]
    fn new_analysis_clears_the_translated_variant() {
        let mut session = DocumentSession::new("s1", Document::from_text("text"));
        let generation = session.generation();
        assert!(session.accept_analysis(generation, analysis()));
        assert!(session.accept_translation(generation, "Spanish", analysis()));

        assert!(session.accept_analysis(generation, analysis()));
        assert!(session.analysis().unwrap().translated.is_none());
        assert_eq!(session.language(), DEFAULT_LANGUAGE);
    }

    #[test]
    fn display_analysis_follows_the_selected_language() {
        let mut session = DocumentSession::new("s1", Document::from_text("text"));
        let generation = session.generation();
        let original = analysis();
        let mut translated = analysis();
        translated.summary = "resumen".into();

        assert!(session.accept_analysis(generation, original.clone()));
        assert_eq!(session.display_analysis(), Some(&original));

        assert!(session.accept_translation(generation, "Spanish", translated.clone()));
        assert_eq!(session.display_analysis(), Some(&translated));

        session.show_original();
        assert_eq!(session.display_analysis(), Some(&original));
        // switching back keeps the cached translated variant
        assert!(session.analysis().unwrap().translated.is_some());
    }

    #[test]
    fn store_round_trips_sessions() {
        let store = SessionStore::new();
        let id = store.create(Document::from_text("text"));

        assert!(store.get(&id).is_some());
        let pushed = store.update(&id, |s| {
            s.push_user_message("q");
            s.chat().len()
        });
        assert_eq!(pushed, Some(1));
        assert_eq!(store.get(&id).unwrap().chat().len(), 1);

        store.delete(&id);
        assert!(store.get(&id).is_none());
    }
}
