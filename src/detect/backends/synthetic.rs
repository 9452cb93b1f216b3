use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::detect::backend::CandidateSource;
use crate::detect::result::{CandidateBatch, Detection, FrameContext, ObjectClass};
use crate::geometry::BBox;

const DEFAULT_MAX_PERSON_COUNT: u32 = 15;
const MAX_PERSON_BOXES: u32 = 5;

/// Synthetic crowd simulator.
///
/// Reports a random crowd size and up to five person candidates per frame.
/// The crowd size is drawn independently of the boxes, the same way a
/// dedicated crowd-counting model would report it.
pub struct SyntheticSource {
    rng: StdRng,
    max_person_count: u32,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_person_count: DEFAULT_MAX_PERSON_COUNT,
        }
    }

    /// Deterministic generator for tests and reproducible demos.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_person_count: DEFAULT_MAX_PERSON_COUNT,
        }
    }

    pub fn with_max_person_count(mut self, max: u32) -> Self {
        self.max_person_count = max;
        self
    }

    fn person_box(&mut self, frame: FrameContext) -> BBox {
        let fw = frame.width as f32;
        let fh = frame.height as f32;
        let w = fw * self.rng.gen_range(0.05f32..0.2);
        let h = (w * self.rng.gen_range(1.5f32..3.0)).min(fh);
        let x1 = self.rng.gen_range(0.0..(fw - w).max(1.0));
        let y1 = self.rng.gen_range(0.0..(fh - h).max(1.0));
        BBox::new(x1, y1, (x1 + w).min(fw), (y1 + h).min(fh))
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn candidates(&mut self, _pixels: &[u8], frame: FrameContext) -> Result<CandidateBatch> {
        let person_count = self.rng.gen_range(0..=self.max_person_count);
        let mut detections = Vec::new();
        if frame.width > 0 && frame.height > 0 {
            for _ in 0..person_count.min(MAX_PERSON_BOXES) {
                let bbox = self.person_box(frame);
                let confidence: f32 = self.rng.gen_range(0.7..0.95);
                detections.push(Detection::new(ObjectClass::Person, bbox, confidence));
            }
        }
        Ok(CandidateBatch {
            detections,
            person_count: Some(person_count),
        })
    }
}
