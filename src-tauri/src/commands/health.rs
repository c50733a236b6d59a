use serde::Serialize;
use tracing::info;

use super::session::resolve_api_key;
use crate::generator::{MODEL_FAST, MODEL_QUALITY};

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// A usable Gemini API key exists (keychain or environment). Gates the
    /// start control in the frontend.
    pub gemini_api_key_set: bool,
    /// "keychain" or "environment" when a key was found.
    pub api_key_source: Option<String>,
    pub fast_model: String,
    pub quality_model: String,
}

#[tauri::command]
pub fn run_health_check() -> Result<HealthReport, String> {
    info!("Running health check");

    let resolved = resolve_api_key();
    let key_set = resolved.is_some();
    info!("Gemini API key set: {}", key_set);

    Ok(HealthReport {
        gemini_api_key_set: key_set,
        api_key_source: resolved.map(|(_, source)| source.as_str().to_string()),
        fast_model: MODEL_FAST.to_string(),
        quality_model: MODEL_QUALITY.to_string(),
    })
}
