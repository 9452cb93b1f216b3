use anyhow::Result;

use crate::detect::result::{CandidateBatch, FrameContext};

/// Producer of raw candidate detections for one frame.
///
/// Sources may be neural detectors, color heuristics or synthetic
/// generators. Their output is unfiltered: malformed or low-confidence
/// candidates are dealt with downstream, and an empty batch is a normal
/// result.
pub trait CandidateSource: Send {
    /// Source identifier.
    fn name(&self) -> &'static str;

    /// Produce candidates for a frame.
    ///
    /// `pixels` is packed RGB24 and is only borrowed for the duration of
    /// the call.
    fn candidates(&mut self, pixels: &[u8], frame: FrameContext) -> Result<CandidateBatch>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
