//! Particle and event types.

use serde::{Deserialize, Serialize};

use crate::kinematics::{boostz, get_ekin, get_p, get_phi, get_pt, get_rapidity, get_theta};
use crate::traits::NuclideMasses;
use crate::{Error, Result};

/// Reference frame of a momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    /// Nucleus–nucleus center of mass.
    Cms,
    /// Laboratory (fixed target).
    Lab,
}

/// How momentum components in a table are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MomentumUnits {
    /// Total momentum of the fragment.
    #[default]
    Total,
    /// Momentum per nucleon; multiplied by `A` on construction.
    PerNucleon,
}

/// Longitudinal quantities of a particle in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameKinematics {
    /// Longitudinal momentum (MeV/c).
    pub pz: f64,
    /// Total momentum (MeV/c).
    pub p: f64,
    /// Kinetic energy (MeV).
    pub kinergy: f64,
    /// Rapidity. May be non-finite at the kinematic edge.
    pub rapidity: f64,
    /// Polar angle (rad).
    pub theta: f64,
}

impl FrameKinematics {
    fn new(mass: f64, pt: f64, pz: f64) -> Self {
        let p = get_p(pt, pz);
        let kinergy = get_ekin(mass, p);
        Self { pz, p, kinergy, rapidity: get_rapidity(kinergy, pz, mass), theta: get_theta(pt, pz) }
    }
}

/// A fragment with its kinematics in both frames.
///
/// Built once from the momentum in its source frame; the other frame is
/// derived by a z-boost with the reaction's `betacms`. Only the azimuth can
/// change afterwards (see [`Particle::shift_phi`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Neutron number.
    pub n: u32,
    /// Proton number.
    pub z: u32,
    mass: f64,
    px: f64,
    py: f64,
    pt: f64,
    phi: f64,
    origin: Frame,
    cms: FrameKinematics,
    lab: FrameKinematics,
}

fn mass_number(n: u32, z: u32) -> Result<u32> {
    n.checked_add(z)
        .ok_or_else(|| Error::InvalidParticle(format!("A = N + Z overflows for N={n}, Z={z}")))
}

impl Particle {
    /// Construct from total momentum `[px, py, pz]` given in `frame`.
    pub fn new(
        n: u32,
        z: u32,
        momentum: [f64; 3],
        frame: Frame,
        mass: f64,
        betacms: f64,
    ) -> Result<Self> {
        if mass_number(n, z)? == 0 {
            return Err(Error::InvalidParticle("A = N + Z must be positive".into()));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(Error::InvalidParticle(format!("bad mass {mass} for N={n}, Z={z}")));
        }
        if !(betacms.is_finite() && betacms.abs() < 1.0) {
            return Err(Error::InvalidParticle(format!("betacms {betacms} outside (-1, 1)")));
        }

        let [px, py, pz] = momentum;
        let pt = get_pt(px, py);
        let source = FrameKinematics::new(mass, pt, pz);
        let beta = match frame {
            Frame::Cms => betacms,
            Frame::Lab => -betacms,
        };
        let other = FrameKinematics::new(mass, pt, boostz(mass, pz, source.kinergy, beta));
        let (cms, lab) = match frame {
            Frame::Cms => (source, other),
            Frame::Lab => (other, source),
        };

        Ok(Self { n, z, mass, px, py, pt, phi: get_phi(px, py), origin: frame, cms, lab })
    }

    /// Construct from total cms momentum.
    pub fn from_cms(n: u32, z: u32, momentum: [f64; 3], mass: f64, betacms: f64) -> Result<Self> {
        Self::new(n, z, momentum, Frame::Cms, mass, betacms)
    }

    /// Construct from total lab momentum.
    pub fn from_lab(n: u32, z: u32, momentum: [f64; 3], mass: f64, betacms: f64) -> Result<Self> {
        Self::new(n, z, momentum, Frame::Lab, mass, betacms)
    }

    /// Construct from table values, looking the mass up in `masses`.
    pub fn from_table(
        n: u32,
        z: u32,
        momentum: [f64; 3],
        units: MomentumUnits,
        frame: Frame,
        masses: &dyn NuclideMasses,
        betacms: f64,
    ) -> Result<Self> {
        let a = mass_number(n, z)?;
        let mass = masses
            .mass(z, a)
            .ok_or_else(|| Error::InvalidParticle(format!("no mass for Z={z}, A={a}")))?;
        let momentum = match units {
            MomentumUnits::Total => momentum,
            MomentumUnits::PerNucleon => momentum.map(|c| c * a as f64),
        };
        Self::new(n, z, momentum, frame, mass, betacms)
    }

    /// Mass number. `N + Z` fits in `u32` for every constructed particle.
    #[inline]
    pub fn a(&self) -> u32 {
        self.n + self.z
    }

    /// Rest mass (MeV/c²).
    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// `px` (MeV/c), frame independent.
    #[inline]
    pub fn px(&self) -> f64 {
        self.px
    }

    /// `py` (MeV/c), frame independent.
    #[inline]
    pub fn py(&self) -> f64 {
        self.py
    }

    /// Transverse momentum (MeV/c).
    #[inline]
    pub fn pt(&self) -> f64 {
        self.pt
    }

    /// Azimuth (rad).
    #[inline]
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Frame the particle was constructed in.
    #[inline]
    pub fn origin(&self) -> Frame {
        self.origin
    }

    /// Center-of-mass kinematics.
    #[inline]
    pub fn cms(&self) -> &FrameKinematics {
        &self.cms
    }

    /// Lab kinematics.
    #[inline]
    pub fn lab(&self) -> &FrameKinematics {
        &self.lab
    }

    /// Lab polar angle in degrees.
    #[inline]
    pub fn theta_lab_deg(&self) -> f64 {
        self.lab.theta.to_degrees()
    }

    /// Azimuth in degrees.
    #[inline]
    pub fn phi_deg(&self) -> f64 {
        self.phi.to_degrees()
    }

    /// Shift the azimuth by `delta` radians. Used to unwrap `phi` into a
    /// detector's native window; `px`/`py` are left untouched.
    pub fn shift_phi(&mut self, delta: f64) {
        self.phi += delta;
    }
}

/// One collision event after decoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    /// Impact parameter (fm).
    pub impact_parameter: f64,
    /// Centrality proxy `Nc`, if the table carries one.
    pub centrality: Option<i32>,
    /// Fragments, in table order.
    pub particles: Vec<Particle>,
}

impl Event {
    /// Number of fragments.
    #[inline]
    pub fn multiplicity(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::gamma;
    use crate::masses::{MassTable, PROTON_MASS};
    use approx::assert_relative_eq;

    #[test]
    fn test_cms_to_lab() {
        let beta = 0.3;
        let p = Particle::new(0, 1, [0.0, 0.0, 0.0], Frame::Cms, PROTON_MASS, beta).unwrap();
        assert_relative_eq!(p.cms().kinergy, 0.0);
        assert_relative_eq!(p.lab().pz, gamma(beta) * beta * PROTON_MASS, epsilon = 1e-9);
        assert_relative_eq!(p.lab().rapidity, 0.5 * (1.3f64 / 0.7).ln(), epsilon = 1e-12);
        assert_eq!(p.origin(), Frame::Cms);
    }

    #[test]
    fn test_lab_and_cms_construction_agree() {
        let beta = 0.25;
        let from_cms =
            Particle::new(2, 2, [40.0, -30.0, 120.0], Frame::Cms, 3727.379, beta).unwrap();
        let from_lab = Particle::new(
            2,
            2,
            [40.0, -30.0, from_cms.lab().pz],
            Frame::Lab,
            3727.379,
            beta,
        )
        .unwrap();
        assert_relative_eq!(from_lab.cms().pz, 120.0, epsilon = 1e-8);
        assert_relative_eq!(from_lab.lab().kinergy, from_cms.lab().kinergy, epsilon = 1e-8);
        assert_relative_eq!(from_lab.pt(), 50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_per_nucleon_units_scale_by_a() {
        let masses = MassTable::builtin();
        let d = Particle::from_table(
            1,
            1,
            [10.0, 0.0, 20.0],
            MomentumUnits::PerNucleon,
            Frame::Cms,
            &masses,
            0.0,
        )
        .unwrap();
        assert_relative_eq!(d.px(), 20.0);
        assert_relative_eq!(d.cms().pz, 40.0);
        assert_eq!(d.a(), 2);
    }

    #[test]
    fn test_invalid_particles() {
        assert!(Particle::new(0, 0, [0.0; 3], Frame::Cms, 1.0, 0.0).is_err());
        assert!(Particle::new(0, 1, [0.0; 3], Frame::Cms, f64::NAN, 0.0).is_err());
        assert!(Particle::new(0, 1, [0.0; 3], Frame::Cms, 938.0, 1.0).is_err());
        assert!(Particle::new(u32::MAX, 1, [0.0; 3], Frame::Cms, 938.0, 0.0).is_err());
    }

    #[test]
    fn test_shift_phi_keeps_momentum() {
        let mut p = Particle::new(0, 1, [-1.0, -1.0, 5.0], Frame::Lab, PROTON_MASS, 0.1).unwrap();
        let before = p.phi();
        p.shift_phi(std::f64::consts::TAU);
        assert_relative_eq!(p.phi() - before, std::f64::consts::TAU);
        assert_relative_eq!(p.px(), -1.0);
    }
}
