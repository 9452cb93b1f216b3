//! Per-frame pipeline: filter, suppress, aggregate.
//!
//! `process_frame` is pure. It holds no state between calls and only reads
//! the thresholds, so frames can be processed concurrently with a shared
//! `&DetectionThresholds`.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use serde::Serialize;

use crate::config::DetectionThresholds;
use crate::detect::{CandidateBatch, FrameContext, SourceRegistry};
use crate::error::GeometryError;
use crate::filter::filter_candidates;
use crate::scene::{aggregate, SceneResult};
use crate::suppress::suppress_duplicates;

/// Run the full pipeline over one frame's candidates.
///
/// The batch's `person_count` is the crowd-size signal reported by the
/// candidate sources; a missing count is treated as 0.
pub fn process_frame(
    raw: CandidateBatch,
    frame: FrameContext,
    cfg: &DetectionThresholds,
) -> Result<SceneResult, GeometryError> {
    let filtered = filter_candidates(raw.detections, frame, cfg)?;
    let kept = suppress_duplicates(filtered, cfg.iou_threshold);
    let scene = aggregate(kept, raw.person_count.unwrap_or(0), frame, cfg);
    log::debug!(
        "frame {}x{}: {} detections, crowd={:?}, risk={:?}",
        frame.width,
        frame.height,
        scene.detections.len(),
        scene.crowd_density,
        scene.risk_level
    );
    Ok(scene)
}

/// A scene plus timing metadata, as handed to a transport layer.
#[derive(Clone, Debug, Serialize)]
pub struct FrameReport {
    #[serde(flatten)]
    pub scene: SceneResult,
    /// Wall-clock seconds spent collecting and processing the frame.
    pub processing_time: f64,
    /// Seconds since the unix epoch when processing finished.
    pub timestamp: f64,
}

/// Candidate sources bound to a shared threshold configuration.
pub struct Analyzer {
    registry: SourceRegistry,
    thresholds: Arc<DetectionThresholds>,
}

impl Analyzer {
    pub fn new(registry: SourceRegistry, thresholds: impl Into<Arc<DetectionThresholds>>) -> Self {
        Self {
            registry,
            thresholds: thresholds.into(),
        }
    }

    /// Collect candidates from every source and run the pipeline.
    ///
    /// Fails when a source fails or when the frame geometry is invalid.
    pub fn analyze(&self, pixels: &[u8], frame: FrameContext) -> Result<FrameReport> {
        let start = Instant::now();
        let batch = self.registry.collect(pixels, frame)?;
        let scene = process_frame(batch, frame, &self.thresholds)?;
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs_f64();
        Ok(FrameReport {
            scene,
            processing_time: start.elapsed().as_secs_f64(),
            timestamp,
        })
    }
}
