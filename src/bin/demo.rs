//! demo - synthetic end-to-end run of the scene pipeline
//!
//! Each frame gets a generated RGB image (with a flame-colored patch on
//! every `--fire-every` frame) and the sources picked with `--sources`.
//! Frames are split across worker threads that share one read-only
//! threshold set.

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::sync::Arc;

use scene_fusion::{
    Analyzer, ColorMaskSource, DetectionThresholds, FrameContext, FrameReport, RiskLevel,
    SourceRegistry, StubSource, SyntheticSource,
};

const BACKGROUND: [u8; 3] = [30, 60, 200];
const FLAME: [u8; 3] = [255, 110, 10];

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// HSV fire heuristic over the generated pixels.
    ColorMask,
    /// Seeded crowd simulator.
    Synthetic,
    /// Empty placeholder model.
    Stub,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of synthetic frames.
    #[arg(long, default_value_t = 20)]
    frames: u64,
    /// Frame width in pixels.
    #[arg(long, default_value_t = 320)]
    width: u32,
    /// Frame height in pixels.
    #[arg(long, default_value_t = 240)]
    height: u32,
    /// Worker threads.
    #[arg(long, default_value_t = 4)]
    workers: usize,
    /// Base seed; frame i uses seed + i.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Largest simulated crowd.
    #[arg(long, default_value_t = 30)]
    max_crowd: u32,
    /// Paint a flame patch on every Nth frame (0 disables).
    #[arg(long, default_value_t = 3)]
    fire_every: u64,
    /// Candidate sources, fused in the order given.
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [SourceKind::ColorMask, SourceKind::Synthetic]
    )]
    sources: Vec<SourceKind>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if args.workers == 0 {
        return Err(anyhow!("workers must be >= 1"));
    }
    if args.width == 0 || args.height == 0 {
        return Err(anyhow!("frame dimensions must be non-zero"));
    }
    if args.sources.is_empty() {
        return Err(anyhow!("at least one source is required"));
    }

    let thresholds = Arc::new(DetectionThresholds::load()?);
    log::info!("thresholds: {:?}", thresholds);
    log::info!("sources: {:?}", build_registry(&args, 0).list());

    let frame = FrameContext::new(args.width, args.height);
    let results: Vec<Result<(u64, FrameReport)>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..args.workers as u64)
            .map(|worker| {
                let thresholds = &thresholds;
                let args = &args;
                scope.spawn(move || {
                    (worker..args.frames)
                        .step_by(args.workers)
                        .map(|i| run_frame(i, frame, args, thresholds).map(|r| (i, r)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(reports) => reports,
                Err(_) => vec![Err(anyhow!("worker thread panicked"))],
            })
            .collect()
    });

    let mut reports = results.into_iter().collect::<Result<Vec<_>>>()?;
    reports.sort_by_key(|(i, _)| *i);

    let mut tally: BTreeMap<&'static str, u64> = BTreeMap::new();
    for (i, report) in &reports {
        let scene = &report.scene;
        log::info!(
            "frame {:>3}: {} detections, persons={:>2}, crowd={:?}, risk={:?} ({:.2}ms)",
            i,
            scene.detections.len(),
            scene.person_count,
            scene.crowd_density,
            scene.risk_level,
            report.processing_time * 1000.0
        );
        *tally.entry(risk_label(scene.risk_level)).or_default() += 1;
    }
    log::info!("risk summary over {} frames: {:?}", reports.len(), tally);
    Ok(())
}

fn run_frame(
    index: u64,
    frame: FrameContext,
    args: &Args,
    thresholds: &Arc<DetectionThresholds>,
) -> Result<FrameReport> {
    let with_fire = args.fire_every > 0 && index % args.fire_every == 0;
    let pixels = synthetic_pixels(frame, with_fire);

    let registry = build_registry(args, index);
    registry.warm_up()?;
    let analyzer = Analyzer::new(registry, Arc::clone(thresholds));
    analyzer.analyze(&pixels, frame)
}

fn build_registry(args: &Args, index: u64) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    for kind in &args.sources {
        match kind {
            SourceKind::ColorMask => registry.register(ColorMaskSource::new()),
            SourceKind::Synthetic => registry.register(
                SyntheticSource::with_seed(args.seed.wrapping_add(index))
                    .with_max_person_count(args.max_crowd),
            ),
            SourceKind::Stub => registry.register(StubSource::new()),
        }
    }
    registry
}

fn synthetic_pixels(frame: FrameContext, with_fire: bool) -> Vec<u8> {
    let (w, h) = (frame.width, frame.height);
    let (px, py, pw, ph) = (w / 4, h / 4, w / 4, h / 3);
    let mut pixels = Vec::with_capacity(w as usize * h as usize * 3);
    for y in 0..h {
        for x in 0..w {
            let flame = with_fire && x >= px && x < px + pw && y >= py && y < py + ph;
            pixels.extend_from_slice(if flame { &FLAME } else { &BACKGROUND });
        }
    }
    pixels
}

fn risk_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
    }
}
