use anyhow::{anyhow, Result};

use crate::detect::backend::CandidateSource;
use crate::detect::result::{Attribute, CandidateBatch, Detection, FrameContext, ObjectClass, Severity};
use crate::geometry::BBox;

const DEFAULT_MIN_REGION_AREA: u32 = 1000;
const FIRE_CONFIDENCE: f32 = 0.85;

/// Inclusive HSV window on the 8-bit scale (hue 0..=179).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    /// Orange/red flame colors.
    pub const FIRE: HsvRange = HsvRange {
        lower: [0, 50, 50],
        upper: [20, 255, 255],
    };

    fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

/// Color-segmentation fire heuristic.
///
/// Masks pixels inside an HSV window, groups them into 8-connected regions
/// and reports one `fire` candidate per region larger than the minimum area.
/// Confidence is fixed; the heuristic has no notion of certainty.
///
/// Region area is the count of masked pixels, not the area of a traced
/// outer contour. A solid 40x30 patch measures 1200 here where a polygon
/// through the boundary pixel centers gives 39 * 29 = 1131, and holes inside
/// a region are not counted. The cutoff therefore admits slightly smaller
/// patches than a contour-based measure would.
pub struct ColorMaskSource {
    range: HsvRange,
    min_region_area: u32,
}

impl ColorMaskSource {
    pub fn new() -> Self {
        Self {
            range: HsvRange::FIRE,
            min_region_area: DEFAULT_MIN_REGION_AREA,
        }
    }

    pub fn with_min_region_area(mut self, area: u32) -> Self {
        self.min_region_area = area;
        self
    }

    fn mask(&self, pixels: &[u8]) -> Vec<bool> {
        pixels
            .chunks_exact(3)
            .map(|px| self.range.contains(rgb_to_hsv(px[0], px[1], px[2])))
            .collect()
    }
}

impl Default for ColorMaskSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateSource for ColorMaskSource {
    fn name(&self) -> &'static str {
        "color_mask"
    }

    fn candidates(&mut self, pixels: &[u8], frame: FrameContext) -> Result<CandidateBatch> {
        let expected = (frame.width as usize)
            .checked_mul(frame.height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected,
                pixels.len()
            ));
        }

        let mask = self.mask(pixels);
        let regions = connected_regions(&mask, frame.width as usize, frame.height as usize);
        log::debug!("color mask found {} candidate regions", regions.len());

        let detections = regions
            .into_iter()
            .filter(|r| r.area > self.min_region_area)
            .map(|r| {
                Detection::new(ObjectClass::Fire, r.bbox(), FIRE_CONFIDENCE)
                    .with_severity(Severity::High)
                    .with_attribute(Attribute::Area(r.area as f32))
            })
            .collect();

        Ok(CandidateBatch {
            detections,
            person_count: None,
        })
    }
}

/// RGB to HSV on the 8-bit scale: hue halved into 0..=179, S and V in 0..=255.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = v - min;

    let s = if v > 0.0 { delta * 255.0 / v } else { 0.0 };
    let mut h = if delta == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / delta
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        (h / 2.0).round().min(179.0) as u8,
        s.round() as u8,
        v as u8,
    ]
}

#[derive(Debug)]
struct Region {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    area: u32,
}

impl Region {
    fn bbox(&self) -> BBox {
        BBox::new(
            self.min_x as f32,
            self.min_y as f32,
            (self.max_x + 1) as f32,
            (self.max_y + 1) as f32,
        )
    }
}

/// 8-connected components of the mask.
fn connected_regions(mask: &[bool], width: usize, height: usize) -> Vec<Region> {
    let mut visited = vec![false; mask.len()];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        stack.push(start);
        let mut region = Region {
            min_x: start % width,
            min_y: start / width,
            max_x: start % width,
            max_y: start / width,
            area: 0,
        };

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % width, idx / width);
            region.area += 1;
            region.min_x = region.min_x.min(x);
            region.max_x = region.max_x.max(x);
            region.min_y = region.min_y.min(y);
            region.max_y = region.max_y.max(y);

            for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                    let n = ny * width + nx;
                    if mask[n] && !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
        regions.push(region);
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORANGE: [u8; 3] = [255, 100, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    fn frame_with_patch(w: u32, h: u32, patch: (u32, u32, u32, u32)) -> Vec<u8> {
        let (px, py, pw, ph) = patch;
        let mut pixels = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let inside = x >= px && x < px + pw && y >= py && y < py + ph;
                pixels.extend_from_slice(if inside { &ORANGE } else { &BLUE });
            }
        }
        pixels
    }

    #[test]
    fn hsv_conversion_matches_8bit_scale() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
        assert!(HsvRange::FIRE.contains(rgb_to_hsv(ORANGE[0], ORANGE[1], ORANGE[2])));
        assert!(!HsvRange::FIRE.contains(rgb_to_hsv(BLUE[0], BLUE[1], BLUE[2])));
    }

    #[test]
    fn large_patch_becomes_fire_candidate() {
        let frame = FrameContext::new(100, 80);
        let pixels = frame_with_patch(100, 80, (10, 20, 40, 30));
        let mut source = ColorMaskSource::new();

        let batch = source.candidates(&pixels, frame).unwrap();
        assert_eq!(batch.detections.len(), 1);
        let det = &batch.detections[0];
        assert_eq!(det.class, ObjectClass::Fire);
        assert_eq!(det.bbox, BBox::new(10.0, 20.0, 50.0, 50.0));
        assert_eq!(det.confidence, FIRE_CONFIDENCE);
        assert_eq!(det.severity, Some(Severity::High));
        assert_eq!(det.attributes, Some(Attribute::Area(1200.0)));
    }

    #[test]
    fn area_is_pixel_count_and_excludes_holes() {
        // 34x34 ring with a 10x10 hole: 1156 - 100 = 1056 masked pixels.
        let (w, h) = (60u32, 60u32);
        let mut pixels = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let outer = (5..39).contains(&x) && (5..39).contains(&y);
                let hole = (17..27).contains(&x) && (17..27).contains(&y);
                pixels.extend_from_slice(if outer && !hole { &ORANGE } else { &BLUE });
            }
        }
        let batch = ColorMaskSource::new()
            .candidates(&pixels, FrameContext::new(w, h))
            .unwrap();
        assert_eq!(batch.detections.len(), 1);
        assert_eq!(batch.detections[0].attributes, Some(Attribute::Area(1056.0)));
        assert_eq!(batch.detections[0].bbox, BBox::new(5.0, 5.0, 39.0, 39.0));
    }

    #[test]
    fn small_patch_is_ignored() {
        let frame = FrameContext::new(100, 80);
        let pixels = frame_with_patch(100, 80, (0, 0, 10, 10));
        let mut source = ColorMaskSource::new();
        assert!(source.candidates(&pixels, frame).unwrap().detections.is_empty());

        let mut lenient = ColorMaskSource::new().with_min_region_area(50);
        assert_eq!(lenient.candidates(&pixels, frame).unwrap().detections.len(), 1);
    }

    #[test]
    fn diagonal_pixels_join_one_region() {
        let mask = vec![
            true, false, false, //
            false, true, false, //
            false, false, true,
        ];
        let regions = connected_regions(&mask, 3, 3);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 3);
        assert_eq!(regions[0].bbox(), BBox::new(0.0, 0.0, 3.0, 3.0));
    }

    #[test]
    fn rejects_short_pixel_buffer() {
        let mut source = ColorMaskSource::new();
        let err = source
            .candidates(&[0u8; 10], FrameContext::new(2, 2))
            .unwrap_err();
        assert!(err.to_string().contains("expected 12 RGB bytes"));
    }
}
