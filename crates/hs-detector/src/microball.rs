//! Microball: the wide-coverage CsI(Tl) ring array.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use hs_core::{Acceptance, Particle, Result};

use crate::config::{MicroballConfig, RingConfig, ThresholdConfig};

/// One installed ring, detectors tiling `[phi_start, phi_start + phi_span)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    id: u32,
    theta_min: f64,
    theta_max: f64,
    detectors: u32,
    phi_start: f64,
    phi_span: f64,
    thresholds: Vec<ThresholdConfig>,
}

impl Ring {
    fn from_config(cfg: &RingConfig) -> Self {
        Self {
            id: cfg.id,
            theta_min: cfg.theta_min,
            theta_max: cfg.theta_max,
            detectors: cfg.detectors,
            phi_start: cfg.phi_start,
            phi_span: cfg.phi_span,
            thresholds: cfg.thresholds.clone(),
        }
    }

    /// Ring number.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether `theta_deg` falls in `[theta_min, theta_max)`.
    pub fn contains_theta(&self, theta_deg: f64) -> bool {
        theta_deg >= self.theta_min && theta_deg < self.theta_max
    }

    /// Azimuthal window `(phi_min, phi_max)` in degrees.
    pub fn phi_window(&self) -> (f64, f64) {
        (self.phi_start, self.phi_start + self.phi_span)
    }

    /// Detector number (from 1) covering `phi_deg`, if any.
    pub fn detector_at(&self, phi_deg: f64) -> Option<u32> {
        let (lo, hi) = self.phi_window();
        if !(phi_deg >= lo && phi_deg < hi) {
            return None;
        }
        let width = self.phi_span / self.detectors as f64;
        let idx = ((phi_deg - lo) / width) as u32;
        Some(idx.min(self.detectors.saturating_sub(1)) + 1)
    }

    /// Threshold for `(z, a)`: exact entry first, then a Z-only entry.
    pub fn threshold(&self, z: u32, a: u32) -> Option<f64> {
        self.thresholds
            .iter()
            .find(|t| t.z == z && t.a == Some(a))
            .or_else(|| self.thresholds.iter().find(|t| t.z == z && t.a.is_none()))
            .map(|t| t.kinergy)
    }
}

/// The Microball as installed for one reaction, with its per-event hit counter.
#[derive(Debug, Clone)]
pub struct Microball {
    rings: Vec<Ring>,
    disabled: BTreeSet<(u32, u32)>,
    hits: usize,
}

impl Microball {
    /// Build the array for `reaction` from `config`.
    ///
    /// Fails if the ring geometry is invalid, if the configuration lists
    /// reactions but not this one, or if it names an installed ring that has
    /// no geometry.
    pub fn new(config: &MicroballConfig, reaction: &str) -> Result<Self> {
        config.validate()?;
        let setup = config.setup(reaction)?;
        let rings: Vec<Ring> = if setup.rings.is_empty() {
            config.rings.iter().map(Ring::from_config).collect()
        } else {
            setup
                .rings
                .iter()
                .map(|id| {
                    config.rings.iter().find(|r| r.id == *id).map(Ring::from_config).ok_or_else(
                        || hs_core::Error::Config(format!("ring {id} has no geometry entry")),
                    )
                })
                .collect::<Result<_>>()?
        };
        let disabled = setup.disabled.iter().map(|d| (d.ring, d.detector)).collect();
        tracing::debug!(
            reaction,
            rings = rings.len(),
            disabled = setup.disabled.len(),
            "configured Microball"
        );
        Ok(Self { rings, disabled, hits: 0 })
    }

    /// Installed rings.
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Ring whose polar range contains `theta_deg`.
    pub fn ring_for_theta(&self, theta_deg: f64) -> Option<&Ring> {
        self.rings.iter().find(|r| r.contains_theta(theta_deg))
    }

    /// Whether `(theta, phi)` hits an enabled detector.
    pub fn is_covered(&self, theta_deg: f64, phi_deg: f64) -> bool {
        let Some(ring) = self.ring_for_theta(theta_deg) else {
            return false;
        };
        match ring.detector_at(phi_deg) {
            Some(det) => !self.disabled.contains(&(ring.id, det)),
            None => false,
        }
    }

    /// Whether a fragment `(z, a)` with lab kinetic energy `kinergy` clears
    /// the threshold of the ring at `theta_deg`. No threshold means rejected.
    pub fn passes_threshold(&self, kinergy: f64, theta_deg: f64, a: u32, z: u32) -> bool {
        self.ring_for_theta(theta_deg)
            .and_then(|ring| ring.threshold(z, a))
            .is_some_and(|thr| kinergy > thr)
    }

    /// Move `phi` into the window of the ring selected by the lab polar
    /// angle: below the window adds 2π, above it subtracts 2π. Outside
    /// every ring nothing changes.
    pub fn correct_phi(&self, particle: &mut Particle) {
        let Some(ring) = self.ring_for_theta(particle.theta_lab_deg()) else {
            return;
        };
        let (lo, hi) = ring.phi_window();
        let phi = particle.phi_deg();
        if phi < lo {
            particle.shift_phi(TAU);
        } else if phi > hi {
            particle.shift_phi(-TAU);
        }
    }

    /// Clear the hit counter.
    pub fn reset_hits(&mut self) {
        self.hits = 0;
    }

    /// Count one accepted particle.
    pub fn add_hit(&mut self) {
        self.hits += 1;
    }

    /// Hits since the last reset.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

impl Acceptance for Microball {
    fn accepts(&self, particle: &Particle) -> bool {
        let theta = particle.theta_lab_deg();
        particle.z > 0
            && self.is_covered(theta, particle.phi_deg())
            && self.passes_threshold(particle.lab().kinergy, theta, particle.a(), particle.z)
    }

    fn name(&self) -> &str {
        "microball"
    }
}
