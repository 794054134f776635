//! Detector configuration files.
//!
//! Both arrays are described in YAML (JSON is accepted too, being a subset).
//! The Microball file carries the ring geometry, per-ring thresholds and the
//! per-reaction setup; the HiRA file is optional and falls back to
//! [`HiraConfig::default`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use hs_core::{Error, Result};

/// Kinetic-energy threshold for one species.
///
/// `a: None` applies to every isotope of `z` that has no exact entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Proton number.
    pub z: u32,
    /// Mass number; omit for a Z-only threshold.
    #[serde(default)]
    pub a: Option<u32>,
    /// Minimum lab kinetic energy (MeV).
    pub kinergy: f64,
}

/// One Microball ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Ring number.
    pub id: u32,
    /// Lower polar-angle edge (deg).
    pub theta_min: f64,
    /// Upper polar-angle edge (deg).
    pub theta_max: f64,
    /// Number of detectors in the ring, numbered from 1.
    pub detectors: u32,
    /// Azimuth where detector 1 starts (deg).
    pub phi_start: f64,
    /// Azimuthal span covered by the ring (deg).
    #[serde(default = "default_phi_span")]
    pub phi_span: f64,
    /// Species thresholds for this ring.
    #[serde(default)]
    pub thresholds: Vec<ThresholdConfig>,
}

fn default_phi_span() -> f64 {
    360.0
}

/// A disabled `(ring, detector)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorId {
    /// Ring number.
    pub ring: u32,
    /// Detector number within the ring.
    pub detector: u32,
}

/// Which part of the array was installed for one reaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionSetup {
    /// Installed rings; empty means all rings.
    #[serde(default)]
    pub rings: Vec<u32>,
    /// Detectors that were off.
    #[serde(default)]
    pub disabled: Vec<DetectorId>,
}

/// Complete Microball description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroballConfig {
    /// Ring geometry and thresholds.
    pub rings: Vec<RingConfig>,
    /// Setup per reaction label. If empty, every reaction uses the full array.
    #[serde(default)]
    pub reactions: BTreeMap<String, ReactionSetup>,
}

impl MicroballConfig {
    /// Load from a YAML/JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Config(format!("reading Microball config {}: {e}", path.display()))
        })?;
        let cfg: Self = serde_yaml_ng::from_slice(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check ring geometry for obvious mistakes.
    pub fn validate(&self) -> Result<()> {
        for ring in &self.rings {
            if !(ring.theta_min < ring.theta_max) {
                return Err(Error::Config(format!(
                    "ring {}: theta_min {} >= theta_max {}",
                    ring.id, ring.theta_min, ring.theta_max
                )));
            }
            if ring.detectors == 0 || !(ring.phi_span > 0.0 && ring.phi_span <= 360.0) {
                return Err(Error::Config(format!(
                    "ring {}: need detectors > 0 and 0 < phi_span <= 360",
                    ring.id
                )));
            }
        }
        Ok(())
    }

    /// Setup for `reaction`.
    pub fn setup(&self, reaction: &str) -> Result<ReactionSetup> {
        if self.reactions.is_empty() {
            return Ok(ReactionSetup::default());
        }
        self.reactions.get(reaction).cloned().ok_or_else(|| {
            Error::Config(format!("reaction '{reaction}' not found in Microball config"))
        })
    }
}

/// HiRA threshold with an optional punch-through ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiraThreshold {
    /// Proton number.
    pub z: u32,
    /// Mass number.
    pub a: u32,
    /// Minimum lab kinetic energy (MeV).
    pub kinergy_min: f64,
    /// Maximum lab kinetic energy (MeV), if particles punch through.
    #[serde(default)]
    pub kinergy_max: Option<f64>,
}

/// HiRA angular window and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiraConfig {
    /// Lower polar-angle edge (deg).
    pub theta_min: f64,
    /// Upper polar-angle edge (deg).
    pub theta_max: f64,
    /// Lower azimuth edge (deg).
    pub phi_min: f64,
    /// Upper azimuth edge (deg).
    pub phi_max: f64,
    /// Species thresholds; species not listed are rejected.
    pub thresholds: Vec<HiraThreshold>,
}

impl HiraConfig {
    /// Load from a YAML/JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Config(format!("reading HiRA config {}: {e}", path.display()))
        })?;
        Ok(serde_yaml_ng::from_slice(&bytes)?)
    }
}

impl Default for HiraConfig {
    fn default() -> Self {
        let t = |z, a, lo, hi| HiraThreshold { z, a, kinergy_min: lo, kinergy_max: Some(hi) };
        Self {
            theta_min: 30.0,
            theta_max: 75.0,
            phi_min: -30.0,
            phi_max: 30.0,
            thresholds: vec![
                t(1, 1, 20.0, 198.0),
                t(1, 2, 30.0, 263.0),
                t(1, 3, 36.0, 312.0),
                t(2, 3, 60.0, 707.0),
                t(2, 4, 72.0, 790.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
rings:
  - id: 2
    theta_min: 14.0
    theta_max: 28.0
    detectors: 12
    phi_start: -165.0
    thresholds:
      - { z: 1, a: 1, kinergy: 8.0 }
      - { z: 2, kinergy: 30.0 }
reactions:
  Ca48Ni64E140:
    rings: [2]
    disabled:
      - { ring: 2, detector: 5 }
"#;

    #[test]
    fn parse_microball_yaml() {
        let cfg: MicroballConfig = serde_yaml_ng::from_str(YAML).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.rings[0].phi_span, 360.0);
        assert_eq!(cfg.rings[0].thresholds[1].a, None);
        let setup = cfg.setup("Ca48Ni64E140").unwrap();
        assert_eq!(setup.disabled, vec![DetectorId { ring: 2, detector: 5 }]);
        assert!(cfg.setup("Ca40Ni58E56").is_err());
    }

    #[test]
    fn validate_rejects_inverted_ring() {
        let mut cfg: MicroballConfig = serde_yaml_ng::from_str(YAML).unwrap();
        cfg.rings[0].theta_max = 10.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn hira_defaults_cover_light_charged_particles() {
        let cfg = HiraConfig::default();
        assert_eq!(cfg.thresholds.len(), 5);
        assert!(cfg.thresholds.iter().all(|t| t.z > 0));
    }
}
