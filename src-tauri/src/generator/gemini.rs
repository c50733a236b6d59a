//! Gemini image generation calls for the try-on pipeline.
//!
//! One request per run: both prepared images plus the try-on prompt go to
//! `generateContent`, and the first inline image part of the response is
//! the artifact.

use std::time::Duration;

use tracing::{error, info};

use super::prompts::{TRY_ON_SYSTEM, TRY_ON_USER};
use super::{GeneratedImage, GenerationRequest, Generator};
use crate::error::TryOnError;

/// Default model: fast, lower-fidelity output.
pub const MODEL_FAST: &str = "gemini-2.5-flash-image";

/// High-quality alternative selected by the quality toggle.
pub const MODEL_QUALITY: &str = "gemini-3-pro-image-preview";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Generation can take well over a minute on the quality model.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Gemini-backed [`Generator`]. Holds the resolved API key for the
/// duration of one run; the command layer constructs a fresh instance per
/// start so a key changed in Settings takes effect on the next run.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String) -> Result<Self, TryOnError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TryOnError::Api(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, api_key })
    }

    /// Model id for the given quality flag.
    pub fn model_for(high_quality: bool) -> &'static str {
        if high_quality {
            MODEL_QUALITY
        } else {
            MODEL_FAST
        }
    }
}

impl Generator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, TryOnError> {
        let model = Self::model_for(request.high_quality);
        info!("Calling Gemini model '{}' for try-on generation", model);

        let body = serde_json::json!({
            "systemInstruction": {
                "parts": [{"text": TRY_ON_SYSTEM}]
            },
            "contents": [{
                "role": "user",
                "parts": [
                    {"text": TRY_ON_USER},
                    {"inlineData": {
                        "mimeType": request.person.media_type,
                        "data": request.person.data_base64
                    }},
                    {"inlineData": {
                        "mimeType": request.cloth.media_type,
                        "data": request.cloth.data_base64
                    }}
                ]
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE"]
            }
        });

        let url = format!("{}/models/{}:generateContent", API_BASE, model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let msg = if e.is_timeout() {
                    format!("Gemini request timed out after {}s", REQUEST_TIMEOUT.as_secs())
                } else {
                    format!("Gemini request failed: {}", e)
                };
                error!("{}", msg);
                TryOnError::Api(msg)
            })?;

        let body_text = handle_api_response(response).await?;

        let resp_json: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
            let msg = format!("Failed to parse Gemini response wrapper: {}", e);
            error!("{}", msg);
            TryOnError::Api(msg)
        })?;

        let image = extract_inline_image(&resp_json, model)?;
        info!(
            "Gemini returned {} image ({} base64 chars)",
            image.media_type,
            image.data_base64.len()
        );
        Ok(image)
    }
}

/// Check status and extract body text.
async fn handle_api_response(response: reqwest::Response) -> Result<String, TryOnError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let truncated = if body.len() > 1024 {
            format!("{}...", &body[..1024])
        } else {
            body
        };
        let msg = format!("Gemini API error: {} - {}", status, truncated);
        error!("{}", msg);
        return Err(TryOnError::Api(msg));
    }
    response
        .text()
        .await
        .map_err(|e| TryOnError::Api(format!("Failed to read Gemini response body: {}", e)))
}

/// Pull the first inline image out of a `generateContent` response.
///
/// Response shape:
/// `{ "candidates": [{"content": {"parts": [{"inlineData": {"mimeType": ..., "data": ...}}]}}] }`.
/// A text-only response (e.g. a content-policy refusal) is surfaced as an
/// error carrying that text.
fn extract_inline_image(
    response: &serde_json::Value,
    model: &str,
) -> Result<GeneratedImage, TryOnError> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            TryOnError::Generation("No candidates in Gemini response".to_string())
        })?;

    for part in parts {
        // REST responses use camelCase; tolerate snake_case too.
        let inline = if part["inlineData"].is_object() {
            &part["inlineData"]
        } else {
            &part["inline_data"]
        };
        if let Some(data) = inline["data"].as_str() {
            let media_type = inline["mimeType"]
                .as_str()
                .or_else(|| inline["mime_type"].as_str())
                .unwrap_or("image/png")
                .to_string();
            return Ok(GeneratedImage {
                data_base64: data.to_string(),
                media_type,
                model: model.to_string(),
            });
        }
    }

    // No image part; if the model answered with text, report it verbatim.
    let refusal = parts
        .iter()
        .find_map(|p| p["text"].as_str())
        .unwrap_or("Gemini response contained no image data");
    Err(TryOnError::Generation(refusal.to_string()))
}
