//! Class-aware greedy non-max suppression.

use crate::detect::Detection;

/// Remove same-class duplicates, keeping the most confident of each cluster.
///
/// Candidates are visited in descending confidence (stable, so equal
/// confidences keep input order). A candidate is dropped when its IoU with
/// any already kept detection of the same class is strictly greater than
/// `iou_threshold`. Detections of different classes never suppress each other.
///
/// The result is in visiting order. NaN confidences sort by IEEE total
/// order rather than panicking; `process_frame` never lets them through.
pub fn suppress_duplicates(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let duplicate = kept
            .iter()
            .filter(|k| k.class == candidate.class)
            .any(|k| k.bbox.iou(&candidate.bbox) > iou_threshold);
        if duplicate {
            log::trace!(
                "suppressed {:?} at {:?} (conf {:.2})",
                candidate.class,
                candidate.bbox,
                candidate.confidence
            );
        } else {
            kept.push(candidate);
        }
    }
    kept
}
