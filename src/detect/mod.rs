//! Candidate sources.
//!
//! Everything that turns a frame into raw, unvalidated detections lives
//! here. Sources never filter or deduplicate; that is the job of the
//! pipeline stages in `filter`, `suppress` and `scene`.

mod backend;
pub mod backends;
mod registry;
mod result;

pub use backend::CandidateSource;
pub use backends::{ColorMaskSource, StubSource, SyntheticSource};
pub use registry::SourceRegistry;
pub use result::{Attribute, CandidateBatch, Detection, FrameContext, ObjectClass, Severity};
