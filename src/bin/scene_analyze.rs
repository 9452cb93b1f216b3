//! scene_analyze - run the detection pipeline over a candidate file

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

use scene_fusion::{process_frame, CandidateBatch, Detection, DetectionThresholds, FrameContext};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Candidate file (JSON). Reads stdin when omitted or "-".
    #[arg(long)]
    input: Option<String>,
    /// Threshold file (TOML or JSON). Without it, SCENE_CONFIG and SCENE_* variables apply.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the effective thresholds and exit.
    #[arg(long)]
    print_config: bool,
    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

/// One frame's worth of raw candidates as produced by an external detector.
#[derive(Debug, Deserialize)]
struct CandidateFile {
    width: u32,
    height: u32,
    #[serde(default)]
    person_count: Option<u32>,
    #[serde(default)]
    detections: Vec<Detection>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let thresholds = match &args.config {
        Some(path) => DetectionThresholds::from_path(path)?,
        None => DetectionThresholds::load()?,
    };

    if args.print_config {
        print_json(&thresholds, args.pretty)?;
        return Ok(());
    }

    let raw = read_input(args.input.as_deref())?;
    let file: CandidateFile =
        serde_json::from_str(&raw).context("candidate file is not valid JSON")?;
    let frame = FrameContext::new(file.width, file.height);
    log::info!(
        "analyzing {} candidates for {}x{} frame",
        file.detections.len(),
        frame.width,
        frame.height
    );

    let batch = CandidateBatch {
        detections: file.detections,
        person_count: file.person_count,
    };
    let scene = process_frame(batch, frame, &thresholds)?;
    log::info!(
        "{} detections, crowd={:?}, risk={:?}",
        scene.detections.len(),
        scene.crowd_density,
        scene.risk_level
    );
    print_json(&scene, args.pretty)
}

fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read candidate file {}", path)),
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
