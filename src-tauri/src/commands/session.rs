//! Tauri commands for the try-on session.
//!
//! The frontend uploads base64 image data, starts a run, then polls
//! `get_session` until the session reaches a terminal stage.

use std::sync::Arc;

use base64::Engine;
use keyring::Entry;
use tauri::State;
use tracing::{info, warn};

use crate::error::TryOnError;
use crate::generator::{prepare_upload, GeminiGenerator};
use crate::session::{PipelineStage, QualityMode, RunOutcome, SessionSnapshot, TryOnController};

/// Keychain service for the Gemini API key.
pub const KEYCHAIN_SERVICE: &str = "neuralfit-gemini-api";
const KEYCHAIN_USER: &str = "neuralfit";

/// Environment fallback when no keychain entry exists.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Managed state wrapping the one session controller.
pub struct SessionState(pub Arc<TryOnController>);

impl SessionState {
    pub fn new() -> Self {
        Self(Arc::new(TryOnController::new()))
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the active API key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keychain,
    Environment,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keychain => "keychain",
            Self::Environment => "environment",
        }
    }
}

/// Resolve the Gemini API key: keychain first, environment second.
///
/// Resolved per start rather than cached so a key added in Settings takes
/// effect without restarting the app.
pub fn resolve_api_key() -> Option<(String, KeySource)> {
    if let Ok(entry) = Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER) {
        match entry.get_password() {
            Ok(key) if !key.is_empty() => return Some((key, KeySource::Keychain)),
            Ok(_) | Err(keyring::Error::NoEntry) => {}
            Err(e) => warn!("Failed to read API key from keychain: {}", e),
        }
    }
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => Some((key, KeySource::Environment)),
        _ => None,
    }
}

fn decode_and_prepare(image_base64: &str) -> Result<crate::session::ImageAsset, String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(image_base64)
        .map_err(|e| format!("Invalid base64 image data: {}", e))?;
    prepare_upload(&bytes).map_err(String::from)
}

#[tauri::command]
pub async fn upload_person_image(
    state: State<'_, SessionState>,
    image_base64: String,
) -> Result<SessionSnapshot, String> {
    let asset = decode_and_prepare(&image_base64)?;
    if !state.0.set_person_image(Some(asset)) {
        return Err("A run is in progress; reset before changing inputs.".to_string());
    }
    Ok(state.0.snapshot())
}

#[tauri::command]
pub async fn upload_cloth_image(
    state: State<'_, SessionState>,
    image_base64: String,
) -> Result<SessionSnapshot, String> {
    let asset = decode_and_prepare(&image_base64)?;
    if !state.0.set_cloth_image(Some(asset)) {
        return Err("A run is in progress; reset before changing inputs.".to_string());
    }
    Ok(state.0.snapshot())
}

#[tauri::command]
pub fn clear_person_image(state: State<'_, SessionState>) -> Result<SessionSnapshot, String> {
    if !state.0.set_person_image(None) {
        return Err("A run is in progress; reset before changing inputs.".to_string());
    }
    Ok(state.0.snapshot())
}

#[tauri::command]
pub fn clear_cloth_image(state: State<'_, SessionState>) -> Result<SessionSnapshot, String> {
    if !state.0.set_cloth_image(None) {
        return Err("A run is in progress; reset before changing inputs.".to_string());
    }
    Ok(state.0.snapshot())
}

#[tauri::command]
pub fn set_quality_mode(
    state: State<'_, SessionState>,
    quality: QualityMode,
) -> Result<SessionSnapshot, String> {
    if !state.0.set_quality(quality) {
        return Err("A run is in progress; quality is locked.".to_string());
    }
    Ok(state.0.snapshot())
}

/// Kick off a run. Returns as soon as the run is sequenced onto the async
/// runtime; the frontend observes progress by polling [`get_session`].
#[tauri::command]
pub async fn start_try_on(state: State<'_, SessionState>) -> Result<SessionSnapshot, String> {
    let snapshot = state.0.snapshot();
    if snapshot.stage != PipelineStage::Idle {
        return Err("A run is already in progress.".to_string());
    }
    if !snapshot.has_person_image || !snapshot.has_cloth_image {
        return Err("Both a person image and a clothing image are required.".to_string());
    }

    let (api_key, source) = resolve_api_key().ok_or_else(|| {
        String::from(TryOnError::Credential(format!(
            "No Gemini API key configured. Add one in Settings or set {}.",
            API_KEY_ENV
        )))
    })?;
    info!("Starting try-on run (key source: {})", source.as_str());

    let generator = GeminiGenerator::new(api_key).map_err(String::from)?;
    let controller = state.0.clone();
    tauri::async_runtime::spawn(async move {
        match controller.run(&generator).await {
            RunOutcome::Completed => info!("Try-on run completed"),
            RunOutcome::Failed => warn!("Try-on run failed"),
            RunOutcome::NotStarted => warn!("Try-on run refused to start"),
            RunOutcome::Superseded => info!("Try-on run superseded by reset"),
        }
    });

    Ok(state.0.snapshot())
}

#[tauri::command]
pub fn get_session(state: State<'_, SessionState>) -> Result<SessionSnapshot, String> {
    Ok(state.0.snapshot())
}

#[tauri::command]
pub fn reset_session(state: State<'_, SessionState>) -> Result<SessionSnapshot, String> {
    Ok(state.0.reset())
}

#[tauri::command]
pub fn acknowledge_error(state: State<'_, SessionState>) -> Result<SessionSnapshot, String> {
    if !state.0.acknowledge_error() {
        return Err("No error to acknowledge.".to_string());
    }
    Ok(state.0.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_prepare_rejects_bad_base64() {
        let result = decode_and_prepare("!!not-base64!!");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid base64"));
    }

    #[test]
    fn test_decode_and_prepare_rejects_non_image_payload() {
        let payload = base64::engine::general_purpose::STANDARD.encode(b"plain text");
        let result = decode_and_prepare(&payload);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to load image"));
    }

    #[test]
    fn test_key_source_labels() {
        assert_eq!(KeySource::Keychain.as_str(), "keychain");
        assert_eq!(KeySource::Environment.as_str(), "environment");
    }
}
