use thiserror::Error;

/// The frame cannot be interpreted; skip it rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("invalid frame dimensions {width}x{height}: both must be greater than zero")]
    InvalidFrame { width: u32, height: u32 },
}

/// Why a single candidate was excluded. Never fails the frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandidateError {
    #[error("malformed bounding box [{x1}, {y1}, {x2}, {y2}]")]
    MalformedBox { x1: f32, y1: f32, x2: f32, y2: f32 },
    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f32),
}
