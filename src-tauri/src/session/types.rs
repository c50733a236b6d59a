//! Type definitions for the try-on session.
//!
//! These types are the observable surface of the session controller and
//! are serialized as-is to the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stages a try-on run passes through, in display order.
///
/// `Error` is reachable from any of the three working stages; `Idle` is the
/// only stage from which a run may start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    #[default]
    Idle,
    Segmentation,
    Warping,
    Generation,
    Complete,
    Error,
}

impl PipelineStage {
    /// True while a run is actively sequencing (inputs are locked).
    pub fn is_working(&self) -> bool {
        matches!(self, Self::Segmentation | Self::Warping | Self::Generation)
    }

    /// Status line shown under the spinner while this stage is active.
    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            Self::Segmentation => Some("Extracting semantic map"),
            Self::Warping => Some("Calculating affine grid"),
            Self::Generation => Some("Synthesizing texture"),
            _ => None,
        }
    }
}

/// Which model variant the generation collaborator should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityMode {
    #[default]
    Standard,
    High,
}

impl QualityMode {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }

    /// Parse a stored preference value; anything unrecognized falls back
    /// to standard quality.
    pub fn from_preference(value: &str) -> Self {
        match value {
            "HIGH" => Self::High,
            _ => Self::Standard,
        }
    }
}

/// A validated, API-ready upload: JPEG payload encoded as base64.
///
/// Produced by `generator::image_prep` from arbitrary JPEG/PNG/WebP input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub data_base64: String,
    pub media_type: String,
}

/// The generated output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultArtifact {
    /// `data:` URL the frontend can render and download directly.
    pub data_url: String,
    /// Model id that produced the image.
    pub model: String,
    /// Wall-clock duration of the generation call.
    pub elapsed_ms: u64,
}

/// One entry of the session's processing log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    pub stage: PipelineStage,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Observable session state, polled by the frontend while a run is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub stage: PipelineStage,
    pub quality: QualityMode,
    pub has_person_image: bool,
    pub has_cloth_image: bool,
    pub result: Option<ResultArtifact>,
    pub error: Option<String>,
    pub log: Vec<StageEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serializes_screaming_snake() {
        let json = serde_json::to_string(&PipelineStage::Segmentation).unwrap();
        assert_eq!(json, "\"SEGMENTATION\"");
        let json = serde_json::to_string(&PipelineStage::Idle).unwrap();
        assert_eq!(json, "\"IDLE\"");
    }

    #[test]
    fn test_stage_deserializes() {
        let stage: PipelineStage = serde_json::from_str("\"WARPING\"").unwrap();
        assert_eq!(stage, PipelineStage::Warping);
    }

    #[test]
    fn test_is_working() {
        assert!(!PipelineStage::Idle.is_working());
        assert!(PipelineStage::Segmentation.is_working());
        assert!(PipelineStage::Warping.is_working());
        assert!(PipelineStage::Generation.is_working());
        assert!(!PipelineStage::Complete.is_working());
        assert!(!PipelineStage::Error.is_working());
    }

    #[test]
    fn test_quality_mode_from_preference() {
        assert_eq!(QualityMode::from_preference("HIGH"), QualityMode::High);
        assert_eq!(QualityMode::from_preference("STANDARD"), QualityMode::Standard);
        assert_eq!(QualityMode::from_preference("garbage"), QualityMode::Standard);
    }

    #[test]
    fn test_snapshot_serialize() {
        let snapshot = SessionSnapshot {
            stage: PipelineStage::Complete,
            quality: QualityMode::High,
            has_person_image: true,
            has_cloth_image: true,
            result: Some(ResultArtifact {
                data_url: "data:image/png;base64,AAAA".to_string(),
                model: "gemini-3-pro-image-preview".to_string(),
                elapsed_ms: 4200,
            }),
            error: None,
            log: vec![],
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"COMPLETE\""));
        assert!(json.contains("\"HIGH\""));
        assert!(json.contains("data:image/png;base64,AAAA"));
    }
}
