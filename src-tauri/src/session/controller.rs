//! The try-on session controller.
//!
//! Owns the single mutable session for the app and sequences one run at a
//! time: two fixed decorative delays, then exactly one generation call.
//! The visible stages do no image work; the generation collaborator does
//! all of it.

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::generator::{GeneratedImage, GenerationRequest, Generator};

use super::types::{
    ImageAsset, PipelineStage, QualityMode, ResultArtifact, SessionSnapshot, StageEvent,
};

/// Hold time for each of the two simulated stages. Decorative; independent
/// of input size.
pub const STAGE_DELAY: Duration = Duration::from_millis(1200);

/// How a call to [`TryOnController::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Artifact stored, session is `COMPLETE`.
    Completed,
    /// Generation failed, session is `ERROR`.
    Failed,
    /// A precondition was unmet; the session was not touched.
    NotStarted,
    /// The session was reset mid-run; every pending mutation was discarded.
    Superseded,
}

#[derive(Debug, Default)]
struct SessionInner {
    /// Bumped on every run start and every reset. A run captures the value
    /// at start and refuses to mutate the session once it has moved on.
    run_id: u64,
    stage: PipelineStage,
    quality: QualityMode,
    person_image: Option<ImageAsset>,
    cloth_image: Option<ImageAsset>,
    result: Option<ResultArtifact>,
    error: Option<String>,
    log: Vec<StageEvent>,
}

impl SessionInner {
    fn push_event(&mut self, stage: PipelineStage, message: String) {
        self.log.push(StageEvent {
            stage,
            message,
            timestamp: Utc::now(),
        });
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stage: self.stage,
            quality: self.quality,
            has_person_image: self.person_image.is_some(),
            has_cloth_image: self.cloth_image.is_some(),
            result: self.result.clone(),
            error: self.error.clone(),
            log: self.log.clone(),
        }
    }
}

/// State machine for one try-on attempt. Lives in Tauri managed state for
/// the whole app lifetime; a "new session" is this one reset to idle.
pub struct TryOnController {
    inner: Mutex<SessionInner>,
    stage_delay: Duration,
}

impl Default for TryOnController {
    fn default() -> Self {
        Self::new()
    }
}

impl TryOnController {
    pub fn new() -> Self {
        Self::with_stage_delay(STAGE_DELAY)
    }

    /// Tests pass `Duration::ZERO` so runs sequence instantly.
    pub fn with_stage_delay(stage_delay: Duration) -> Self {
        Self {
            inner: Mutex::new(SessionInner::default()),
            stage_delay,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionInner> {
        // The lock is only ever held for field updates, never across an
        // await, so poisoning means a bug rather than a recoverable state.
        self.inner.lock().expect("session state poisoned")
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Replace the person image. `None` clears it. Rejected (returns
    /// `false`, session untouched) unless the session is idle.
    pub fn set_person_image(&self, image: Option<ImageAsset>) -> bool {
        let mut inner = self.lock();
        if inner.stage != PipelineStage::Idle {
            warn!("Rejected person image change while {:?}", inner.stage);
            return false;
        }
        inner.person_image = image;
        true
    }

    /// Replace the clothing image. Same precondition as the person image.
    pub fn set_cloth_image(&self, image: Option<ImageAsset>) -> bool {
        let mut inner = self.lock();
        if inner.stage != PipelineStage::Idle {
            warn!("Rejected cloth image change while {:?}", inner.stage);
            return false;
        }
        inner.cloth_image = image;
        true
    }

    /// Switch quality mode. Rejected unless idle.
    pub fn set_quality(&self, quality: QualityMode) -> bool {
        let mut inner = self.lock();
        if inner.stage != PipelineStage::Idle {
            warn!("Rejected quality change while {:?}", inner.stage);
            return false;
        }
        inner.quality = quality;
        true
    }

    /// Return the session to a fresh idle state from any stage.
    ///
    /// Bumping `run_id` is what discards an in-flight run: when its pending
    /// generation call eventually settles, the stale completion no longer
    /// matches and is dropped.
    pub fn reset(&self) -> SessionSnapshot {
        let mut inner = self.lock();
        inner.run_id += 1;
        inner.stage = PipelineStage::Idle;
        inner.person_image = None;
        inner.cloth_image = None;
        inner.result = None;
        inner.error = None;
        inner.log.clear();
        info!("Session reset to idle");
        inner.snapshot()
    }

    /// Clear an error and return to idle. Valid only in the `ERROR` stage;
    /// converges to the same state as [`reset`](Self::reset).
    pub fn acknowledge_error(&self) -> bool {
        if self.lock().stage != PipelineStage::Error {
            return false;
        }
        self.reset();
        true
    }

    /// Sequence one run: `SEGMENTATION` → `WARPING` → `GENERATION`, then
    /// `COMPLETE` or `ERROR`. The caller spawns this on the async runtime;
    /// it never panics and never leaves the run unaccounted for.
    pub async fn run<G: Generator>(&self, generator: &G) -> RunOutcome {
        let (run_id, request) = match self.begin() {
            Some(started) => started,
            None => return RunOutcome::NotStarted,
        };

        sleep(self.stage_delay).await;
        if !self.advance(run_id, PipelineStage::Warping) {
            return RunOutcome::Superseded;
        }

        sleep(self.stage_delay).await;
        if !self.advance(run_id, PipelineStage::Generation) {
            return RunOutcome::Superseded;
        }

        let started_at = std::time::Instant::now();
        match generator.generate(&request).await {
            Ok(image) => {
                if self.complete(run_id, image, started_at.elapsed()) {
                    RunOutcome::Completed
                } else {
                    RunOutcome::Superseded
                }
            }
            Err(err) => {
                if self.fail(run_id, err.to_string()) {
                    RunOutcome::Failed
                } else {
                    RunOutcome::Superseded
                }
            }
        }
    }

    /// Check preconditions and enter `SEGMENTATION`. Returns the captured
    /// run id and the frozen generation inputs, or `None` when the run must
    /// not start (observable no-op).
    fn begin(&self) -> Option<(u64, GenerationRequest)> {
        let mut inner = self.lock();
        if inner.stage != PipelineStage::Idle {
            warn!("Start rejected: session is {:?}", inner.stage);
            return None;
        }
        let (person, cloth) = match (&inner.person_image, &inner.cloth_image) {
            (Some(p), Some(c)) => (p.clone(), c.clone()),
            _ => {
                warn!("Start rejected: both input images are required");
                return None;
            }
        };

        inner.run_id += 1;
        let run_id = inner.run_id;
        inner.stage = PipelineStage::Segmentation;
        inner.result = None;
        inner.error = None;
        inner.log.clear();
        inner.push_event(
            PipelineStage::Segmentation,
            "Extracting semantic map".to_string(),
        );
        let high_quality = inner.quality.is_high();
        info!("Run {} started (high_quality={})", run_id, high_quality);

        Some((
            run_id,
            GenerationRequest {
                person,
                cloth,
                high_quality,
            },
        ))
    }

    /// Move the current run to `stage`. Returns `false` (and leaves the
    /// session alone) when the run has been superseded by a reset.
    fn advance(&self, run_id: u64, stage: PipelineStage) -> bool {
        let mut inner = self.lock();
        if inner.run_id != run_id {
            info!("Run {} superseded before {:?}", run_id, stage);
            return false;
        }
        inner.stage = stage;
        if let Some(message) = stage.status_message() {
            inner.push_event(stage, message.to_string());
        }
        true
    }

    fn complete(&self, run_id: u64, image: GeneratedImage, elapsed: Duration) -> bool {
        let mut inner = self.lock();
        if inner.run_id != run_id {
            info!("Run {} superseded; discarding late result", run_id);
            return false;
        }
        let artifact = ResultArtifact {
            data_url: format!("data:{};base64,{}", image.media_type, image.data_base64),
            model: image.model,
            elapsed_ms: elapsed.as_millis() as u64,
        };
        inner.stage = PipelineStage::Complete;
        inner.push_event(
            PipelineStage::Complete,
            format!("Generation complete in {} ms", artifact.elapsed_ms),
        );
        inner.result = Some(artifact);
        inner.error = None;
        info!("Run {} complete", run_id);
        true
    }

    fn fail(&self, run_id: u64, message: String) -> bool {
        let mut inner = self.lock();
        if inner.run_id != run_id {
            info!("Run {} superseded; discarding late failure", run_id);
            return false;
        }
        inner.stage = PipelineStage::Error;
        inner.push_event(PipelineStage::Error, message.clone());
        inner.error = Some(message);
        inner.result = None;
        warn!("Run {} failed: {:?}", run_id, inner.error);
        true
    }
}
