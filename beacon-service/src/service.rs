use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use beacon_core::{
    AnalysisOrchestrator, BeaconError, DEFAULT_LANGUAGE, Document, InferenceGateway, SessionStore,
    TranslationOrchestrator, is_supported_language, render_report, synthesize_speech,
};

use crate::{
    gateway::RigGateway,
    models::{
        ChatRequest, ChatResponse, DocumentRequest, ExplainRequest, ExplainResponse,
        SessionStatusResponse, SpeechRequest, TranslateRequest,
    },
};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn conflict_error(message: &str) -> ApiError {
    (StatusCode::CONFLICT, Json(json!({ "error": message })))
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

/// Map a core error to an HTTP response. Only the taxonomy's display message
/// is surfaced; the underlying cause was already logged by the orchestrators.
fn to_api_error(err: BeaconError) -> ApiError {
    match &err {
        BeaconError::InvalidInput(_) => bad_request_error(&err.to_string()),
        BeaconError::Extraction(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.to_string() })),
        ),
        _ => internal_error(&err.to_string()),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub analysis: Arc<AnalysisOrchestrator>,
    pub translation: Arc<TranslationOrchestrator>,
    pub gateway: Arc<dyn InferenceGateway>,
}

pub fn create_app() -> Router {
    let gateway: Arc<dyn InferenceGateway> = Arc::new(RigGateway::from_env());
    build_router(create_app_state(gateway))
}

fn create_app_state(gateway: Arc<dyn InferenceGateway>) -> AppState {
    AppState {
        store: Arc::new(SessionStore::new()),
        analysis: Arc::new(AnalysisOrchestrator::new(gateway.clone())),
        translation: Arc::new(TranslationOrchestrator::new(gateway.clone())),
        gateway,
    }
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/documents", post(create_document))
        .route("/documents/{id}", get(get_session_status).put(replace_document))
        .route("/documents/{id}/analyze", post(analyze_document))
        .route("/documents/{id}/explain", post(explain_clause))
        .route("/documents/{id}/chat", post(chat))
        .route("/documents/{id}/translate", post(translate_analysis))
        .route("/documents/{id}/report", get(download_report))
        .route("/documents/{id}/speech", post(text_to_speech))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "ClauseBeacon Analysis Service",
        "version": "1.0.0",
        "description": "AI-powered legal document analysis, translation, and Q&A",
        "endpoints": {
            "POST /documents": "Create a session from pasted text or an uploaded document",
            "PUT /documents/{id}": "Replace the session's document",
            "GET /documents/{id}": "Get session status",
            "POST /documents/{id}/analyze": "Summary, risk factors, and checklist",
            "POST /documents/{id}/explain": "Plain-language clause explanation",
            "POST /documents/{id}/chat": "Ask a question about the document",
            "POST /documents/{id}/translate": "Translate the analysis",
            "GET /documents/{id}/report": "Download the plain-text report",
            "POST /documents/{id}/speech": "Text-to-speech",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Build a `Document` from a request body: pasted text wins, otherwise the
/// data URI is run through text extraction.
async fn build_document(state: &AppState, request: DocumentRequest) -> Result<Document, ApiError> {
    if let Some(text) = request.text {
        if !text.trim().is_empty() {
            return Ok(Document::from_text(text));
        }
    }
    if let Some(data_uri) = request.document_data_uri {
        let extracted = state
            .analysis
            .extract_text(&data_uri)
            .await
            .map_err(to_api_error)?;
        return Ok(Document::from_extracted(extracted, data_uri));
    }
    Err(bad_request_error(
        "Either document text or a document data URI is required.",
    ))
}

async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> ApiResult<Value> {
    let document = build_document(&state, request).await?;
    let session_id = state.store.create(document);
    info!(session_id, "document session created");

    Ok(Json(json!({
        "session_id": session_id,
        "status": "created"
    })))
}

async fn replace_document(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<DocumentRequest>,
) -> ApiResult<Value> {
    let document = build_document(&state, request).await?;

    let replaced = state
        .store
        .update(&session_id, |session| session.set_document(document))
        .is_some();
    if !replaced {
        return Err(not_found_error("Session not found", &session_id));
    }

    // The old document's translation cache is stale now.
    state.translation.invalidate();
    info!(session_id, "document replaced");

    Ok(Json(json!({
        "session_id": session_id,
        "status": "replaced"
    })))
}

async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionStatusResponse> {
    let session = state
        .store
        .get(&session_id)
        .ok_or_else(|| not_found_error("Session not found", &session_id))?;

    Ok(Json(SessionStatusResponse {
        session_id: session.id.clone(),
        language: session.language().to_string(),
        analyzed: session.analysis().is_some(),
        translated: session
            .analysis()
            .is_some_and(|a| a.translated.is_some()),
        chat_messages: session.chat().len(),
    }))
}

async fn analyze_document(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<beacon_core::AnalysisResult> {
    let session = state
        .store
        .get(&session_id)
        .ok_or_else(|| not_found_error("Session not found", &session_id))?;
    let generation = session.generation();
    let text = session.document().text.clone();

    let result = state.analysis.analyze(&text).await.map_err(to_api_error)?;

    // A new original invalidates any cached translation of the old one.
    state.translation.invalidate();

    let accepted = state
        .store
        .update(&session_id, |s| s.accept_analysis(generation, result.clone()))
        .unwrap_or(false);
    if !accepted {
        error!(session_id, "analysis result superseded, discarding");
        return Err(conflict_error("Analysis superseded by a newer document."));
    }

    Ok(Json(result))
}

async fn explain_clause(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ExplainRequest>,
) -> ApiResult<ExplainResponse> {
    let session = state
        .store
        .get(&session_id)
        .ok_or_else(|| not_found_error("Session not found", &session_id))?;

    let explanation = state
        .analysis
        .explain_clause(&session.document().text, &request.clause)
        .await
        .map_err(to_api_error)?;

    Ok(Json(ExplainResponse { explanation }))
}

async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let session = state
        .store
        .get(&session_id)
        .ok_or_else(|| not_found_error("Session not found", &session_id))?;

    let answer = state
        .analysis
        .answer_question(&session.document().text, &request.question)
        .await
        .map_err(to_api_error)?;

    state.store.update(&session_id, |s| {
        s.push_user_message(&request.question);
        s.push_assistant_message(&answer);
    });

    Ok(Json(ChatResponse { answer }))
}

async fn translate_analysis(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<TranslateRequest>,
) -> ApiResult<beacon_core::AnalysisResult> {
    let session = state
        .store
        .get(&session_id)
        .ok_or_else(|| not_found_error("Session not found", &session_id))?;
    let original = session
        .analysis()
        .map(|a| a.original.clone())
        .ok_or_else(|| {
            bad_request_error("Analyze the document before requesting a translation.")
        })?;

    let target_language = request.target_language.trim().to_string();
    if target_language == DEFAULT_LANGUAGE {
        state.store.update(&session_id, |s| s.show_original());
        return Ok(Json(original));
    }
    if !is_supported_language(&target_language) {
        return Err(bad_request_error("Unsupported target language."));
    }

    let generation = session.generation();
    let translated = state
        .translation
        .translate(&original, &target_language)
        .await
        .map_err(to_api_error)?;

    let accepted = state
        .store
        .update(&session_id, |s| {
            s.accept_translation(generation, &target_language, translated.clone())
        })
        .unwrap_or(false);
    if !accepted {
        error!(session_id, "translation result superseded, discarding");
        return Err(conflict_error("Translation superseded by a newer document."));
    }

    Ok(Json(translated))
}

async fn download_report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .store
        .get(&session_id)
        .ok_or_else(|| not_found_error("Session not found", &session_id))?;
    let analysis = session.display_analysis().ok_or_else(|| {
        bad_request_error("Analyze the document before downloading a report.")
    })?;

    let report = render_report(analysis, session.language());
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"clause-beacon-report.txt\"",
            ),
        ],
        report,
    ))
}

/// Speech is non-critical: once the session resolves, this endpoint always
/// answers 200 with a result record, so a synthesis failure degrades to "no
/// audio" on the client.
async fn text_to_speech(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SpeechRequest>,
) -> ApiResult<beacon_core::SpeechResult> {
    if state.store.get(&session_id).is_none() {
        return Err(not_found_error("Session not found", &session_id));
    }
    Ok(Json(synthesize_speech(&state.gateway, &request.text).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use beacon_core::OperationRequest;

    struct StubGateway;

    #[async_trait]
    impl InferenceGateway for StubGateway {
        async fn invoke(&self, request: &OperationRequest) -> beacon_core::Result<String> {
            match request {
                OperationRequest::SynthesizeSpeech { .. } => {
                    Ok(json!({"audio": "data:audio/wav;base64,UklGRg=="}).to_string())
                }
                _ => Err(BeaconError::Gateway {
                    operation: request.name(),
                    message: "unscripted operation".into(),
                }),
            }
        }
    }

    fn state() -> AppState {
        create_app_state(Arc::new(StubGateway))
    }

    #[tokio::test]
    async fn speech_resolves_the_session_like_other_endpoints() {
        let state = state();
        let session_id = state.store.create(Document::from_text("NDA text..."));

        let Json(result) = text_to_speech(
            State(state),
            Path(session_id),
            Json(SpeechRequest {
                text: "read this".into(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.audio.as_deref(), Some("data:audio/wav;base64,UklGRg=="));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn speech_for_unknown_session_is_not_found() {
        let (status, _) = text_to_speech(
            State(state()),
            Path("missing".to_string()),
            Json(SpeechRequest {
                text: "read this".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
