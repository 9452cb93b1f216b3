//! Scene fusion
//!
//! Turns per-frame detection candidates from one or more upstream detectors
//! into a deduplicated, policy-filtered detection set and a coarse scene
//! risk assessment.
//!
//! # Pipeline
//!
//! 1. **Candidate sources** (`detect`): detectors, color heuristics or
//!    synthetic generators producing raw candidates.
//! 2. **Filter** (`filter`): per-class confidence floors and person
//!    geometry plausibility. Invalid frames are rejected here.
//! 3. **Suppression** (`suppress`): class-aware greedy NMS.
//! 4. **Aggregation** (`scene`): crowd density, crowd surge alert, risk level.
//!
//! Every stage is stateless. The only shared input is an immutable
//! `DetectionThresholds` built once at startup.

pub mod config;
pub mod detect;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod pipeline;
pub mod scene;
pub mod suppress;

pub use config::DetectionThresholds;
pub use detect::{
    Attribute, CandidateBatch, CandidateSource, ColorMaskSource, Detection, FrameContext,
    ObjectClass, Severity, SourceRegistry, StubSource, SyntheticSource,
};
pub use error::{CandidateError, GeometryError};
pub use geometry::BBox;
pub use pipeline::{process_frame, Analyzer, FrameReport};
pub use scene::{CrowdDensity, RiskLevel, SceneResult};
pub use suppress::suppress_duplicates;
