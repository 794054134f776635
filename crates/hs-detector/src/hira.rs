//! HiRA: the forward high-resolution telescope array.

use hs_core::{Acceptance, Particle};

use crate::config::{HiraConfig, HiraThreshold};

/// HiRA acceptance with a per-event pass counter.
#[derive(Debug, Clone)]
pub struct Hira {
    config: HiraConfig,
    passed: usize,
}

impl Hira {
    /// Array described by `config`.
    pub fn new(config: HiraConfig) -> Self {
        Self { config, passed: 0 }
    }

    /// Whether `(theta, phi)` lies in the angular window (edges inclusive).
    pub fn in_window(&self, theta_deg: f64, phi_deg: f64) -> bool {
        let c = &self.config;
        (c.theta_min..=c.theta_max).contains(&theta_deg)
            && (c.phi_min..=c.phi_max).contains(&phi_deg)
    }

    fn threshold(&self, z: u32, a: u32) -> Option<&HiraThreshold> {
        self.config.thresholds.iter().find(|t| t.z == z && t.a == a)
    }

    /// Whether `kinergy` lies above the species floor and below its
    /// punch-through ceiling, if one is set. Unlisted species are rejected.
    pub fn passes_kinergy(&self, kinergy: f64, a: u32, z: u32) -> bool {
        self.threshold(z, a).is_some_and(|t| {
            kinergy > t.kinergy_min && t.kinergy_max.is_none_or(|max| kinergy < max)
        })
    }

    /// Clear the pass counter.
    pub fn reset_counter(&mut self) {
        self.passed = 0;
    }

    /// Count one accepted particle.
    pub fn count_pass(&mut self) {
        self.passed += 1;
    }

    /// Particles accepted since the last reset.
    pub fn passed(&self) -> usize {
        self.passed
    }
}

impl Default for Hira {
    fn default() -> Self {
        Self::new(HiraConfig::default())
    }
}

impl Acceptance for Hira {
    fn accepts(&self, particle: &Particle) -> bool {
        self.in_window(particle.theta_lab_deg(), particle.phi_deg())
            && particle.z > 0
            && self.passes_kinergy(particle.lab().kinergy, particle.a(), particle.z)
    }

    fn name(&self) -> &str {
        "hira"
    }
}
