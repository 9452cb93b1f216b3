use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};

use crate::detect::result::{CandidateBatch, FrameContext};

use super::backend::CandidateSource;

/// Thread-safe registry of candidate sources.
///
/// Sources are wrapped in `Mutex` because `CandidateSource::candidates` takes `&mut self`.
/// Registration order is preserved; it decides the order of fused candidates.
pub struct SourceRegistry {
    sources: Vec<(String, Arc<Mutex<dyn CandidateSource>>)>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Register a source.
    ///
    /// Registering a name twice replaces the earlier source in place.
    pub fn register<S: CandidateSource + 'static>(&mut self, source: S) {
        let name = source.name().to_string();
        let entry: Arc<Mutex<dyn CandidateSource>> = Arc::new(Mutex::new(source));
        match self.sources.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = entry,
            None => self.sources.push((name, entry)),
        }
    }

    /// List registered sources in registration order.
    pub fn list(&self) -> Vec<String> {
        self.sources.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Run every registered source's warm-up hook.
    pub fn warm_up(&self) -> Result<()> {
        for (name, source) in &self.sources {
            let mut guard = source
                .lock()
                .map_err(|_| anyhow!("source lock poisoned"))?;
            guard
                .warm_up()
                .with_context(|| format!("warm-up failed for source '{}'", name))?;
        }
        Ok(())
    }

    /// Run every registered source on a frame and fuse their batches.
    pub fn collect(&self, pixels: &[u8], frame: FrameContext) -> Result<CandidateBatch> {
        let mut fused = CandidateBatch::empty();
        for (name, source) in &self.sources {
            let mut guard = source
                .lock()
                .map_err(|_| anyhow!("source lock poisoned"))?;
            let batch = guard
                .candidates(pixels, frame)
                .with_context(|| format!("source '{}' failed", name))?;
            log::debug!(
                "source {} produced {} candidates (person_count={:?})",
                name,
                batch.detections.len(),
                batch.person_count
            );
            fused.merge(batch);
        }
        Ok(fused)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
