use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::detect::ObjectClass;

const DEFAULT_PERSON_CONFIDENCE: f32 = 0.70;
const DEFAULT_FIRE_CONFIDENCE: f32 = 0.85;
const DEFAULT_SMOKE_CONFIDENCE: f32 = 0.80;
const DEFAULT_IOU_THRESHOLD: f32 = 0.3;
const DEFAULT_MIN_PERSON_SIZE: f32 = 0.01;
const DEFAULT_MAX_PERSON_SIZE: f32 = 0.8;
const DEFAULT_PERSON_ASPECT_FACTOR: f32 = 0.8;
const DEFAULT_CROWD_MEDIUM_THRESHOLD: u32 = 10;
const DEFAULT_CROWD_HIGH_THRESHOLD: u32 = 20;
const DEFAULT_CROWD_SURGE_CONFIDENCE: f32 = 0.75;
const DEFAULT_RISK_MEDIUM_THRESHOLD: usize = 2;
const DEFAULT_RISK_HIGH_THRESHOLD: usize = 5;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ThresholdsFile {
    confidence: Option<ConfidenceFile>,
    person: Option<PersonFile>,
    suppression: Option<SuppressionFile>,
    crowd: Option<CrowdFile>,
    risk: Option<RiskFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfidenceFile {
    person: Option<f32>,
    fire: Option<f32>,
    smoke: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PersonFile {
    min_size: Option<f32>,
    max_size: Option<f32>,
    aspect_factor: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SuppressionFile {
    iou_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CrowdFile {
    medium_threshold: Option<u32>,
    high_threshold: Option<u32>,
    surge_confidence: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RiskFile {
    medium_threshold: Option<usize>,
    high_threshold: Option<usize>,
}

/// Process-wide detection policy. Built once at startup, then only read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionThresholds {
    pub person_confidence: f32,
    pub fire_confidence: f32,
    pub smoke_confidence: f32,
    /// Same-class pairs overlapping strictly above this are duplicates.
    pub iou_threshold: f32,
    /// Inclusive bounds on a person box's area relative to the frame.
    pub min_person_size: f32,
    pub max_person_size: f32,
    /// A person box must be taller than `width * aspect_factor`.
    pub person_aspect_factor: f32,
    pub crowd_medium_threshold: u32,
    pub crowd_high_threshold: u32,
    pub crowd_surge_confidence: f32,
    pub risk_medium_threshold: usize,
    pub risk_high_threshold: usize,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            person_confidence: DEFAULT_PERSON_CONFIDENCE,
            fire_confidence: DEFAULT_FIRE_CONFIDENCE,
            smoke_confidence: DEFAULT_SMOKE_CONFIDENCE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            min_person_size: DEFAULT_MIN_PERSON_SIZE,
            max_person_size: DEFAULT_MAX_PERSON_SIZE,
            person_aspect_factor: DEFAULT_PERSON_ASPECT_FACTOR,
            crowd_medium_threshold: DEFAULT_CROWD_MEDIUM_THRESHOLD,
            crowd_high_threshold: DEFAULT_CROWD_HIGH_THRESHOLD,
            crowd_surge_confidence: DEFAULT_CROWD_SURGE_CONFIDENCE,
            risk_medium_threshold: DEFAULT_RISK_MEDIUM_THRESHOLD,
            risk_high_threshold: DEFAULT_RISK_HIGH_THRESHOLD,
        }
    }
}

impl DetectionThresholds {
    /// Defaults, then the file named by `SCENE_CONFIG`, then `SCENE_*` overrides.
    pub fn load() -> Result<Self> {
        let file_cfg = match std::env::var("SCENE_CONFIG").ok().as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit file without consulting the environment.
    pub fn from_path(path: &Path) -> Result<Self> {
        let cfg = Self::from_file(read_config_file(path)?);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Minimum confidence for a class, or `None` when the class is unfiltered.
    pub fn min_confidence(&self, class: ObjectClass) -> Option<f32> {
        match class {
            ObjectClass::Person => Some(self.person_confidence),
            ObjectClass::Fire => Some(self.fire_confidence),
            ObjectClass::Smoke => Some(self.smoke_confidence),
            _ => None,
        }
    }

    fn from_file(file: ThresholdsFile) -> Self {
        let d = Self::default();
        let confidence = file.confidence.unwrap_or_default();
        let person = file.person.unwrap_or_default();
        let suppression = file.suppression.unwrap_or_default();
        let crowd = file.crowd.unwrap_or_default();
        let risk = file.risk.unwrap_or_default();
        Self {
            person_confidence: confidence.person.unwrap_or(d.person_confidence),
            fire_confidence: confidence.fire.unwrap_or(d.fire_confidence),
            smoke_confidence: confidence.smoke.unwrap_or(d.smoke_confidence),
            iou_threshold: suppression.iou_threshold.unwrap_or(d.iou_threshold),
            min_person_size: person.min_size.unwrap_or(d.min_person_size),
            max_person_size: person.max_size.unwrap_or(d.max_person_size),
            person_aspect_factor: person.aspect_factor.unwrap_or(d.person_aspect_factor),
            crowd_medium_threshold: crowd.medium_threshold.unwrap_or(d.crowd_medium_threshold),
            crowd_high_threshold: crowd.high_threshold.unwrap_or(d.crowd_high_threshold),
            crowd_surge_confidence: crowd.surge_confidence.unwrap_or(d.crowd_surge_confidence),
            risk_medium_threshold: risk.medium_threshold.unwrap_or(d.risk_medium_threshold),
            risk_high_threshold: risk.high_threshold.unwrap_or(d.risk_high_threshold),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        env_override("SCENE_PERSON_CONFIDENCE", &mut self.person_confidence)?;
        env_override("SCENE_FIRE_CONFIDENCE", &mut self.fire_confidence)?;
        env_override("SCENE_SMOKE_CONFIDENCE", &mut self.smoke_confidence)?;
        env_override("SCENE_IOU_THRESHOLD", &mut self.iou_threshold)?;
        env_override("SCENE_MIN_PERSON_SIZE", &mut self.min_person_size)?;
        env_override("SCENE_MAX_PERSON_SIZE", &mut self.max_person_size)?;
        env_override("SCENE_PERSON_ASPECT_FACTOR", &mut self.person_aspect_factor)?;
        env_override("SCENE_CROWD_MEDIUM_THRESHOLD", &mut self.crowd_medium_threshold)?;
        env_override("SCENE_CROWD_HIGH_THRESHOLD", &mut self.crowd_high_threshold)?;
        env_override("SCENE_CROWD_SURGE_CONFIDENCE", &mut self.crowd_surge_confidence)?;
        env_override("SCENE_RISK_MEDIUM_THRESHOLD", &mut self.risk_medium_threshold)?;
        env_override("SCENE_RISK_HIGH_THRESHOLD", &mut self.risk_high_threshold)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("person_confidence", self.person_confidence),
            ("fire_confidence", self.fire_confidence),
            ("smoke_confidence", self.smoke_confidence),
            ("crowd_surge_confidence", self.crowd_surge_confidence),
            ("iou_threshold", self.iou_threshold),
            ("min_person_size", self.min_person_size),
            ("max_person_size", self.max_person_size),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be within [0, 1], got {}", name, value));
            }
        }
        if self.min_person_size > self.max_person_size {
            return Err(anyhow!(
                "min_person_size ({}) exceeds max_person_size ({})",
                self.min_person_size,
                self.max_person_size
            ));
        }
        if !self.person_aspect_factor.is_finite() || self.person_aspect_factor <= 0.0 {
            return Err(anyhow!("person_aspect_factor must be a positive number"));
        }
        if self.crowd_medium_threshold > self.crowd_high_threshold {
            return Err(anyhow!(
                "crowd medium threshold ({}) exceeds high threshold ({})",
                self.crowd_medium_threshold,
                self.crowd_high_threshold
            ));
        }
        if self.risk_medium_threshold > self.risk_high_threshold {
            return Err(anyhow!(
                "risk medium threshold ({}) exceeds high threshold ({})",
                self.risk_medium_threshold,
                self.risk_high_threshold
            ));
        }
        Ok(())
    }
}

fn env_override<T: FromStr>(key: &str, slot: &mut T) -> Result<()> {
    if let Ok(raw) = std::env::var(key) {
        let raw = raw.trim();
        if !raw.is_empty() {
            *slot = raw
                .parse()
                .map_err(|_| anyhow!("{} has an invalid value: {}", key, raw))?;
        }
    }
    Ok(())
}

fn read_config_file(path: &Path) -> Result<ThresholdsFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path.extension().and_then(|ext| ext.to_str()) == Some("toml");
    let cfg: ThresholdsFile = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
