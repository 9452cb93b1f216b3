//! Confidence & geometry filter.
//!
//! First stage of the pipeline. Rejects the whole frame only when its
//! dimensions are unusable; individual bad candidates are dropped and
//! logged.

use crate::config::DetectionThresholds;
use crate::detect::{Detection, FrameContext, ObjectClass};
use crate::error::{CandidateError, GeometryError};

/// Check that a frame can anchor relative-size computations.
pub fn validate_frame(frame: FrameContext) -> Result<(), GeometryError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(GeometryError::InvalidFrame {
            width: frame.width,
            height: frame.height,
        });
    }
    Ok(())
}

/// Structural checks on a single candidate.
pub fn validate_candidate(det: &Detection) -> Result<(), CandidateError> {
    if !det.bbox.is_well_formed() {
        let b = det.bbox;
        return Err(CandidateError::MalformedBox {
            x1: b.x1,
            y1: b.y1,
            x2: b.x2,
            y2: b.y2,
        });
    }
    if !(0.0..=1.0).contains(&det.confidence) {
        return Err(CandidateError::ConfidenceOutOfRange(det.confidence));
    }
    Ok(())
}

/// Per-class confidence floor. Classes without a floor pass.
pub fn passes_confidence(det: &Detection, cfg: &DetectionThresholds) -> bool {
    cfg.min_confidence(det.class)
        .map_or(true, |min| det.confidence >= min)
}

/// Size and aspect plausibility. Only `person` has a geometry policy.
pub fn passes_geometry(det: &Detection, frame: FrameContext, cfg: &DetectionThresholds) -> bool {
    match det.class {
        ObjectClass::Person => {
            let width_px = det.bbox.width();
            let height_px = det.bbox.height();
            let rel_area = (width_px / frame.width as f32) * (height_px / frame.height as f32);
            rel_area >= cfg.min_person_size
                && rel_area <= cfg.max_person_size
                && height_px > width_px * cfg.person_aspect_factor
        }
        _ => true,
    }
}

/// Keep the candidates that are well formed and satisfy the confidence and
/// geometry policy. Input order is preserved.
pub fn filter_candidates(
    candidates: Vec<Detection>,
    frame: FrameContext,
    cfg: &DetectionThresholds,
) -> Result<Vec<Detection>, GeometryError> {
    validate_frame(frame)?;

    let total = candidates.len();
    let kept: Vec<Detection> = candidates
        .into_iter()
        .filter(|det| match validate_candidate(det) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("dropping {:?} candidate: {}", det.class, e);
                false
            }
        })
        .filter(|det| passes_confidence(det, cfg))
        .filter(|det| passes_geometry(det, frame, cfg))
        .collect();

    log::debug!("filter kept {} of {} candidates", kept.len(), total);
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn person(x1: f32, y1: f32, x2: f32, y2: f32, conf: f32) -> Detection {
        Detection::new(ObjectClass::Person, BBox::new(x1, y1, x2, y2), conf)
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        let cfg = DetectionThresholds::default();
        let err = filter_candidates(vec![], FrameContext::new(0, 480), &cfg).unwrap_err();
        assert_eq!(
            err,
            GeometryError::InvalidFrame {
                width: 0,
                height: 480
            }
        );
        assert!(filter_candidates(vec![], FrameContext::new(640, 0), &cfg).is_err());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let cfg = DetectionThresholds::default();
        let kept = filter_candidates(vec![], FrameContext::new(640, 480), &cfg).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn confidence_floor_is_per_class_and_inclusive() {
        let cfg = DetectionThresholds::default();
        let boxed = BBox::new(0.0, 0.0, 10.0, 10.0);
        let fire_ok = Detection::new(ObjectClass::Fire, boxed, 0.85);
        let fire_low = Detection::new(ObjectClass::Fire, boxed, 0.84);
        let smoke_low = Detection::new(ObjectClass::Smoke, boxed, 0.79);
        let unknown_low = Detection::new(ObjectClass::Unknown, boxed, 0.01);

        assert!(passes_confidence(&fire_ok, &cfg));
        assert!(!passes_confidence(&fire_low, &cfg));
        assert!(!passes_confidence(&smoke_low, &cfg));
        assert!(passes_confidence(&unknown_low, &cfg));
    }

    #[test]
    fn person_area_bounds_are_inclusive() {
        let cfg = DetectionThresholds {
            min_person_size: 0.25,
            max_person_size: 0.5,
            ..DetectionThresholds::default()
        };
        let frame = FrameContext::new(100, 100);

        // rel_area exactly 0.25 and 0.5, both tall enough.
        assert!(passes_geometry(&person(0.0, 0.0, 25.0, 100.0, 0.9), frame, &cfg));
        assert!(passes_geometry(&person(0.0, 0.0, 50.0, 100.0, 0.9), frame, &cfg));
        // Just outside each bound.
        assert!(!passes_geometry(&person(0.0, 0.0, 24.0, 100.0, 0.9), frame, &cfg));
        assert!(!passes_geometry(&person(0.0, 0.0, 51.0, 100.0, 0.9), frame, &cfg));
    }

    #[test]
    fn person_must_be_taller_than_wide_ish() {
        let cfg = DetectionThresholds::default();
        let frame = FrameContext::new(100, 100);
        // 20 wide: needs height > 16.
        assert!(passes_geometry(&person(0.0, 0.0, 20.0, 17.0, 0.9), frame, &cfg));
        assert!(!passes_geometry(&person(0.0, 0.0, 20.0, 16.0, 0.9), frame, &cfg));
        assert!(!passes_geometry(&person(0.0, 0.0, 40.0, 20.0, 0.9), frame, &cfg));
    }

    #[test]
    fn other_classes_skip_geometry() {
        let cfg = DetectionThresholds::default();
        let frame = FrameContext::new(100, 100);
        let wide_fire = Detection::new(ObjectClass::Fire, BBox::new(0.0, 0.0, 100.0, 10.0), 0.9);
        let whole_frame_smoke =
            Detection::new(ObjectClass::Smoke, BBox::new(0.0, 0.0, 100.0, 100.0), 0.9);
        assert!(passes_geometry(&wide_fire, frame, &cfg));
        assert!(passes_geometry(&whole_frame_smoke, frame, &cfg));
    }

    #[test]
    fn malformed_candidates_are_dropped_individually() {
        let cfg = DetectionThresholds::default();
        let frame = FrameContext::new(640, 480);
        let good = person(10.0, 10.0, 50.0, 90.0, 0.9);
        let candidates = vec![
            person(50.0, 10.0, 10.0, 90.0, 0.9),
            person(10.0, 90.0, 50.0, 90.0, 0.9),
            person(10.0, 10.0, 50.0, 90.0, 1.2),
            person(10.0, 10.0, 50.0, 90.0, f32::NAN),
            good.clone(),
        ];
        let kept = filter_candidates(candidates, frame, &cfg).unwrap();
        assert_eq!(kept, vec![good]);
    }

    #[test]
    fn candidate_errors_describe_the_problem() {
        let inverted = person(50.0, 10.0, 10.0, 90.0, 0.9);
        assert!(matches!(
            validate_candidate(&inverted),
            Err(CandidateError::MalformedBox { .. })
        ));
        let overconfident = person(10.0, 10.0, 50.0, 90.0, 1.5);
        assert_eq!(
            validate_candidate(&overconfident),
            Err(CandidateError::ConfidenceOutOfRange(1.5))
        );
    }
}
