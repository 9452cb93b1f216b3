use anyhow::Result;

use crate::detect::backend::CandidateSource;
use crate::detect::result::{CandidateBatch, FrameContext};

/// Placeholder fire/smoke source. Never reports anything.
///
/// Stands in for a real model so that callers exercise the
/// zero-candidate path.
#[derive(Default)]
pub struct StubSource;

impl StubSource {
    pub fn new() -> Self {
        Self
    }
}

impl CandidateSource for StubSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn candidates(&mut self, _pixels: &[u8], _frame: FrameContext) -> Result<CandidateBatch> {
        Ok(CandidateBatch::empty())
    }
}
