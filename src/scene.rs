//! Scene aggregation: crowd density, derived alerts and the risk level.

use serde::{Deserialize, Serialize};

use crate::config::DetectionThresholds;
use crate::detect::{Attribute, Detection, FrameContext, ObjectClass, Severity};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrowdDensity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Final per-frame result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneResult {
    /// Suppression survivors in confidence order, followed by any
    /// synthesized alerts.
    pub detections: Vec<Detection>,
    pub crowd_density: CrowdDensity,
    pub person_count: u32,
    pub risk_level: RiskLevel,
}

impl SceneResult {
    /// Result for a frame with nothing to report.
    pub fn empty() -> Self {
        Self {
            detections: Vec::new(),
            crowd_density: CrowdDensity::Low,
            person_count: 0,
            risk_level: RiskLevel::Low,
        }
    }
}

pub fn crowd_density(person_count: u32, cfg: &DetectionThresholds) -> CrowdDensity {
    if person_count > cfg.crowd_high_threshold {
        CrowdDensity::High
    } else if person_count > cfg.crowd_medium_threshold {
        CrowdDensity::Medium
    } else {
        CrowdDensity::Low
    }
}

pub fn risk_level(detection_count: usize, cfg: &DetectionThresholds) -> RiskLevel {
    if detection_count > cfg.risk_high_threshold {
        RiskLevel::High
    } else if detection_count > cfg.risk_medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Alert raised when the crowd is dense. Covers the whole frame since a
/// crowd has no single location.
pub fn crowd_surge_alert(
    person_count: u32,
    frame: FrameContext,
    cfg: &DetectionThresholds,
) -> Detection {
    Detection::new(
        ObjectClass::CrowdSurge,
        frame.full_frame(),
        cfg.crowd_surge_confidence,
    )
    .with_severity(Severity::Medium)
    .with_attribute(Attribute::PersonCount(person_count))
}

/// Assemble the scene from suppression survivors and the crowd count.
///
/// `person_count` is an independent signal from the candidate sources; it
/// is not derived from the number of `person` detections.
pub fn aggregate(
    mut detections: Vec<Detection>,
    person_count: u32,
    frame: FrameContext,
    cfg: &DetectionThresholds,
) -> SceneResult {
    let crowd_density = crowd_density(person_count, cfg);
    if crowd_density == CrowdDensity::High {
        detections.push(crowd_surge_alert(person_count, frame, cfg));
    }
    let risk_level = risk_level(detections.len(), cfg);

    SceneResult {
        detections,
        crowd_density,
        person_count,
        risk_level,
    }
}
