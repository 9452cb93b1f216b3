use serde::{Deserialize, Serialize};

use crate::geometry::BBox;

/// Class label of a detection.
///
/// Labels outside the known set deserialize as `Unknown`, which has no
/// confidence or geometry policy.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Person,
    Fire,
    Smoke,
    CrowdSurge,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Class-specific scalar carried alongside a detection.
///
/// Flattened into the detection, e.g. `"person_count": 21` next to `"type"`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Crowd size behind a `crowd_surge` alert.
    PersonCount(u32),
    /// Pixel area of a segmented region.
    Area(f32),
}

/// A single detection in absolute pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "type")]
    pub class: ObjectClass,
    pub bbox: BBox,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(flatten)]
    pub attributes: Option<Attribute>,
}

impl Detection {
    pub fn new(class: ObjectClass, bbox: BBox, confidence: f32) -> Self {
        Self {
            class,
            bbox,
            confidence,
            severity: None,
            attributes: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes = Some(attribute);
        self
    }

    /// Crowd size carried by this detection, if any.
    pub fn person_count(&self) -> Option<u32> {
        match self.attributes {
            Some(Attribute::PersonCount(n)) => Some(n),
            _ => None,
        }
    }
}

/// Dimensions of the frame a candidate list was produced from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameContext {
    pub width: u32,
    pub height: u32,
}

impl FrameContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Box covering the entire frame.
    pub fn full_frame(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

/// Raw output of one candidate source for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandidateBatch {
    pub detections: Vec<Detection>,
    /// Crowd size estimate, reported independently of `person` detections.
    pub person_count: Option<u32>,
}

impl CandidateBatch {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fold another batch into this one.
    ///
    /// Detections are appended; the larger of the two person counts wins.
    pub fn merge(&mut self, other: CandidateBatch) {
        self.detections.extend(other.detections);
        self.person_count = match (self.person_count, other.person_count) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

impl From<Vec<Detection>> for CandidateBatch {
    fn from(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            person_count: None,
        }
    }
}
