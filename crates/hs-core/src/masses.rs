//! Nuclide mass lookup.
//!
//! The built-in table covers the light fragments that dominate the spectra;
//! everything else falls back to the Bethe–Weizsäcker binding energy, which is
//! good to a few MeV and more than adequate for kinematics.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::Result;
use crate::traits::NuclideMasses;

/// Neutron mass (MeV/c²).
pub const NEUTRON_MASS: f64 = 939.565_42;
/// Proton mass (MeV/c²).
pub const PROTON_MASS: f64 = 938.272_09;

/// `(Z, A, mass)` for the nuclides carried by [`MassTable::builtin`].
const LIGHT_NUCLEI: &[(u32, u32, f64)] = &[
    (0, 1, NEUTRON_MASS),
    (1, 1, PROTON_MASS),
    (1, 2, 1875.612_94),
    (1, 3, 2808.921_13),
    (2, 3, 2808.391_61),
    (2, 4, 3727.379_41),
    (2, 6, 5605.534_4),
    (3, 6, 5601.518_1),
    (3, 7, 6533.832_8),
    (4, 7, 6534.183_6),
    (4, 8, 7454.850_0),
    (4, 9, 8392.750_0),
    (5, 10, 9324.436_0),
    (5, 11, 10252.547_0),
    (6, 12, 11174.862_0),
];

/// One entry of a user-supplied mass table file.
#[derive(Debug, Clone, Deserialize)]
pub struct MassEntry {
    /// Proton number.
    pub z: u32,
    /// Mass number.
    pub a: u32,
    /// Nuclear mass (MeV/c²).
    pub mass: f64,
}

/// Mass table: explicit entries first, semi-empirical formula otherwise.
#[derive(Debug, Clone)]
pub struct MassTable {
    entries: HashMap<(u32, u32), f64>,
}

impl MassTable {
    /// Table pre-filled with the light nuclei.
    pub fn builtin() -> Self {
        let entries = LIGHT_NUCLEI.iter().map(|&(z, a, m)| ((z, a), m)).collect();
        Self { entries }
    }

    /// Add or override entries.
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = MassEntry>) -> Self {
        for e in entries {
            self.entries.insert((e.z, e.a), e.mass);
        }
        self
    }

    /// Extend the built-in table from a YAML (or JSON) list of `{z, a, mass}`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let entries: Vec<MassEntry> = serde_yaml_ng::from_slice(&bytes)?;
        Ok(Self::builtin().with_entries(entries))
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MassTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NuclideMasses for MassTable {
    fn mass(&self, z: u32, a: u32) -> Option<f64> {
        if a == 0 || z > a {
            return None;
        }
        self.entries.get(&(z, a)).copied().or_else(|| Some(semi_empirical_mass(z, a)))
    }
}

/// Bethe–Weizsäcker binding energy (MeV).
pub fn binding_energy(z: u32, a: u32) -> f64 {
    const A_V: f64 = 15.75;
    const A_S: f64 = 17.8;
    const A_C: f64 = 0.711;
    const A_A: f64 = 23.7;
    const A_P: f64 = 11.18;

    let af = a as f64;
    let zf = z as f64;
    let n = a - z;
    let pairing = match (z % 2, n % 2) {
        (0, 0) => A_P / af.sqrt(),
        (1, 1) => -A_P / af.sqrt(),
        _ => 0.0,
    };
    A_V * af - A_S * af.powf(2.0 / 3.0) - A_C * zf * (zf - 1.0) / af.cbrt()
        - A_A * (af - 2.0 * zf).powi(2) / af
        + pairing
}

/// Nuclear mass from the liquid-drop binding energy.
pub fn semi_empirical_mass(z: u32, a: u32) -> f64 {
    let n = a - z;
    z as f64 * PROTON_MASS + n as f64 * NEUTRON_MASS - binding_energy(z, a)
}
