use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::catalog::{OperationReply, OperationRequest, reply_mismatch};
use crate::error::{BeaconError, Result};
use crate::gateway::{InferenceGateway, invoke_operation};
use crate::models::AnalysisResult;

/// Translation targets offered to the user. "English" is reserved to mean
/// "show the original, do not translate".
pub const SUPPORTED_LANGUAGES: [&str; 13] = [
    "Spanish",
    "French",
    "German",
    "Japanese",
    "Mandarin Chinese",
    "Italian",
    "Portuguese",
    "Hindi",
    "Bengali",
    "Telugu",
    "Marathi",
    "Tamil",
    "Urdu",
];

pub const DEFAULT_LANGUAGE: &str = "English";

pub fn is_supported_language(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}

struct CachedTranslation {
    language: String,
    source: AnalysisResult,
    translated: AnalysisResult,
}

/// Translates an [`AnalysisResult`] field by field: one Translate call per
/// text position (summary, each risk factor, checklist), all concurrent, all
/// sharing the target language. Owns a single-slot cache so that repeating a
/// request for the currently cached language costs no gateway round trips;
/// only one active translation is shown at a time, so one slot is enough.
pub struct TranslationOrchestrator {
    gateway: Arc<dyn InferenceGateway>,
    cache: Mutex<Option<CachedTranslation>>,
}

impl TranslationOrchestrator {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self {
            gateway,
            cache: Mutex::new(None),
        }
    }

    /// Translate every text position of `analysis` into `target_language`.
    ///
    /// Empty fields short-circuit to empty output with no gateway call. Any
    /// leg failure fails the whole call with `TranslationFailed`; the cache
    /// is overwritten on success only, so a previously accepted translation
    /// survives a failed attempt. The result mirrors the input shape exactly:
    /// same number of risk factors, `translated[i]` from `risk_factors[i]`.
    pub async fn translate(
        &self,
        analysis: &AnalysisResult,
        target_language: &str,
    ) -> Result<AnalysisResult> {
        if target_language.trim().is_empty() {
            return Err(BeaconError::InvalidInput(
                "Analysis and target language are required.".into(),
            ));
        }

        if let Some(cached) = self.cached_for(analysis, target_language) {
            info!(target_language, "reusing cached translation");
            return Ok(cached);
        }

        info!(
            target_language,
            risk_factors = analysis.risk_factors.len(),
            "translating analysis"
        );

        // One position per text field: summary first, then each risk factor,
        // checklist last. The merge below relies on this order.
        let mut positions = Vec::with_capacity(analysis.risk_factors.len() + 2);
        positions.push(analysis.summary.clone());
        positions.extend(analysis.risk_factors.iter().cloned());
        positions.push(analysis.checklist.clone());

        let handles: Vec<_> = positions
            .into_iter()
            .map(|text| {
                let gateway = Arc::clone(&self.gateway);
                let language = target_language.to_string();
                tokio::spawn(translate_field(gateway, text, language))
            })
            .collect();

        // Join every leg before deciding the outcome, then surface the first
        // error in positional order. Completion order is irrelevant: leg i's
        // output goes back to position i.
        let mut joined = Vec::with_capacity(handles.len());
        for handle in handles {
            joined.push(handle.await.map_err(|e| {
                BeaconError::TranslationFailed(Box::new(BeaconError::Gateway {
                    operation: "translate",
                    message: e.to_string(),
                }))
            })?);
        }

        let mut translated = Vec::with_capacity(joined.len());
        for leg in joined {
            match leg {
                Ok(text) => translated.push(text),
                Err(e) => {
                    error!(error = %e, target_language, "translation fan-out failed");
                    return Err(BeaconError::TranslationFailed(Box::new(e)));
                }
            }
        }

        let mut fields = translated.into_iter();
        let result = AnalysisResult {
            summary: fields.next().unwrap_or_default(),
            risk_factors: fields.by_ref().take(analysis.risk_factors.len()).collect(),
            checklist: fields.next().unwrap_or_default(),
        };

        *self.cache.lock().unwrap() = Some(CachedTranslation {
            language: target_language.to_string(),
            source: analysis.clone(),
            translated: result.clone(),
        });

        Ok(result)
    }

    /// Drop the cached translation. Called when the document or the original
    /// analysis changes, since the cache is only valid for its source.
    pub fn invalidate(&self) {
        *self.cache.lock().unwrap() = None;
    }

    fn cached_for(&self, analysis: &AnalysisResult, target_language: &str) -> Option<AnalysisResult> {
        let cache = self.cache.lock().unwrap();
        cache
            .as_ref()
            .filter(|c| c.language == target_language && c.source == *analysis)
            .map(|c| c.translated.clone())
    }
}

async fn translate_field(
    gateway: Arc<dyn InferenceGateway>,
    text: String,
    target_language: String,
) -> Result<String> {
    // An empty field never produces a gateway call.
    if text.is_empty() {
        return Ok(String::new());
    }

    let request = OperationRequest::Translate {
        document_text: text,
        target_language,
    };
    match invoke_operation(&gateway, &request).await? {
        OperationReply::Translation(translated) => Ok(translated),
        _ => Err(reply_mismatch(request.name())),
    }
}
