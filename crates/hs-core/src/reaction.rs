//! Reaction labels and reaction-level kinematics.
//!
//! A label such as `Ca48Ni64E140` names beam `48Ca` on target `64Ni` at
//! 140 MeV/u. `betacms` and the beam rapidity are derived once per run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::traits::NuclideMasses;
use crate::{Error, Result};

const ELEMENTS: [&str; 92] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U",
];

/// Proton number for an element symbol (case sensitive, `"Ca"` → 20).
pub fn element_z(symbol: &str) -> Option<u32> {
    ELEMENTS.iter().position(|&s| s == symbol).map(|i| i as u32 + 1)
}

/// Element symbol for a proton number.
pub fn element_symbol(z: u32) -> Option<&'static str> {
    (z as usize).checked_sub(1).and_then(|i| ELEMENTS.get(i)).copied()
}

/// A nuclide `(Z, A)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nuclide {
    /// Proton number.
    pub z: u32,
    /// Mass number.
    pub a: u32,
}

impl fmt::Display for Nuclide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match element_symbol(self.z) {
            Some(sym) => write!(f, "{sym}{}", self.a),
            None => write!(f, "Z{}A{}", self.z, self.a),
        }
    }
}

/// Beam, target and beam energy of a fixed-target reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionSystem {
    /// Projectile.
    pub beam: Nuclide,
    /// Target.
    pub target: Nuclide,
    /// Beam kinetic energy per nucleon (MeV/u).
    pub beam_energy: f64,
}

/// Reaction constants shared by every event of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactionKinematics {
    /// Velocity of the center of mass in the lab (units of c).
    pub betacms: f64,
    /// Lab rapidity of the beam.
    pub beam_rapidity: f64,
}

impl ReactionSystem {
    /// Derive `betacms` and the beam rapidity from the nuclide masses.
    pub fn kinematics(&self, masses: &dyn NuclideMasses) -> Result<ReactionKinematics> {
        let m_beam = masses
            .mass(self.beam.z, self.beam.a)
            .ok_or_else(|| Error::Config(format!("no mass for beam {}", self.beam)))?;
        let m_target = masses
            .mass(self.target.z, self.target.a)
            .ok_or_else(|| Error::Config(format!("no mass for target {}", self.target)))?;

        let t_beam = self.beam_energy * self.beam.a as f64;
        let e_beam = t_beam + m_beam;
        let p_beam = (t_beam * t_beam + 2.0 * t_beam * m_beam).sqrt();

        Ok(ReactionKinematics {
            betacms: p_beam / (e_beam + m_target),
            beam_rapidity: 0.5 * ((e_beam + p_beam) / (e_beam - p_beam)).ln(),
        })
    }
}

impl fmt::Display for ReactionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}E{}", self.beam, self.target, self.beam_energy)
    }
}

/// Split `"Ca48"` off the front of `s`, returning the nuclide and the rest.
fn take_nuclide(s: &str) -> Option<(Nuclide, &str)> {
    let sym_len = s.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let symbol = &s[..sym_len];
    let rest = &s[sym_len..];
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if sym_len == 0 || digits == 0 {
        return None;
    }
    let z = element_z(symbol)?;
    let a: u32 = rest[..digits].parse().ok()?;
    (a >= z).then_some((Nuclide { z, a }, &rest[digits..]))
}

impl FromStr for ReactionSystem {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> {
        let bad = || {
            Error::Config(format!(
                "invalid reaction label '{label}': expected e.g. 'Ca48Ni64E140'"
            ))
        };
        let (beam, rest) = take_nuclide(label).ok_or_else(bad)?;
        let (target, rest) = take_nuclide(rest).ok_or_else(bad)?;
        let energy = rest.strip_prefix('E').ok_or_else(bad)?;
        let beam_energy: f64 = energy.parse().map_err(|_| bad())?;
        if !(beam_energy.is_finite() && beam_energy > 0.0) {
            return Err(bad());
        }
        Ok(Self { beam, target, beam_energy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masses::MassTable;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_label() {
        let r: ReactionSystem = "Ca48Ni64E140".parse().unwrap();
        assert_eq!(r.beam, Nuclide { z: 20, a: 48 });
        assert_eq!(r.target, Nuclide { z: 28, a: 64 });
        assert_relative_eq!(r.beam_energy, 140.0);
        assert_eq!(r.to_string(), "Ca48Ni64E140");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "Ca48", "Ca48Ni64", "Ca48Ni64E", "Xx48Ni64E140", "Ca48Ni64E-5", "Ca4Ni64E140"]
        {
            assert!(bad.parse::<ReactionSystem>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_symmetric_system_kinematics() {
        // For a symmetric system the cms rapidity is half the beam rapidity.
        let r: ReactionSystem = "Ca40Ca40E140".parse().unwrap();
        let k = r.kinematics(&MassTable::builtin()).unwrap();
        let y_cms = 0.5 * ((1.0 + k.betacms) / (1.0 - k.betacms)).ln();
        assert_relative_eq!(y_cms, 0.5 * k.beam_rapidity, epsilon = 1e-9);
        assert!(k.betacms > 0.0 && k.betacms < 1.0);
    }

    #[test]
    fn test_element_symbols() {
        assert_eq!(element_z("H"), Some(1));
        assert_eq!(element_z("U"), Some(92));
        assert_eq!(element_symbol(28), Some("Ni"));
        assert_eq!(element_symbol(0), None);
    }
}
