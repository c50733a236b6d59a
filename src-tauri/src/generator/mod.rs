//! The external generation collaborator: the service that performs the
//! actual image synthesis.

pub mod gemini;
pub mod image_prep;
pub mod prompts;

use std::future::Future;

use crate::error::TryOnError;
use crate::session::types::ImageAsset;

pub use gemini::{GeminiGenerator, MODEL_FAST, MODEL_QUALITY};
pub use image_prep::prepare_upload;

/// Inputs for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub person: ImageAsset,
    pub cloth: ImageAsset,
    pub high_quality: bool,
}

/// A generated image as returned by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data_base64: String,
    pub media_type: String,
    /// Model id that produced the image.
    pub model: String,
}

/// Seam between the session controller and the image-synthesis service.
///
/// The controller calls `generate` exactly once per run and does not retry;
/// the production implementation is [`GeminiGenerator`], tests substitute a
/// scripted mock.
pub trait Generator: Send + Sync {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GeneratedImage, TryOnError>> + Send;
}
