//! Particle species labels used to key spectra.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Histogrammed species, including the two coalescence proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    /// Neutron.
    #[serde(rename = "n")]
    Neutron,
    /// Proton.
    #[serde(rename = "p")]
    Proton,
    /// Deuteron.
    #[serde(rename = "d")]
    Deuteron,
    /// Triton.
    #[serde(rename = "t")]
    Triton,
    /// Helium-3.
    #[serde(rename = "3He")]
    Helium3,
    /// Helium-4.
    #[serde(rename = "4He")]
    Helium4,
    /// Coalescence neutrons: every fragment weighted by `N`.
    #[serde(rename = "coal_n")]
    CoalescenceNeutron,
    /// Coalescence protons: every fragment weighted by `Z`.
    #[serde(rename = "coal_p")]
    CoalescenceProton,
}

impl Species {
    /// All species, in output order.
    pub const ALL: [Species; 8] = [
        Species::Neutron,
        Species::Proton,
        Species::Deuteron,
        Species::Triton,
        Species::Helium3,
        Species::Helium4,
        Species::CoalescenceNeutron,
        Species::CoalescenceProton,
    ];

    /// Species of a fragment with `(Z, A)`. Heavier fragments have no label.
    pub fn from_za(z: u32, a: u32) -> Option<Species> {
        match (z, a) {
            (0, 1) => Some(Species::Neutron),
            (1, 1) => Some(Species::Proton),
            (1, 2) => Some(Species::Deuteron),
            (1, 3) => Some(Species::Triton),
            (2, 3) => Some(Species::Helium3),
            (2, 4) => Some(Species::Helium4),
            _ => None,
        }
    }

    /// Short label (`"n"`, `"3He"`, `"coal_p"`, ...).
    pub fn label(self) -> &'static str {
        match self {
            Species::Neutron => "n",
            Species::Proton => "p",
            Species::Deuteron => "d",
            Species::Triton => "t",
            Species::Helium3 => "3He",
            Species::Helium4 => "4He",
            Species::CoalescenceNeutron => "coal_n",
            Species::CoalescenceProton => "coal_p",
        }
    }

    /// Whether this is one of the coalescence proxies.
    pub fn is_coalescence(self) -> bool {
        matches!(self, Species::CoalescenceNeutron | Species::CoalescenceProton)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .into_iter()
            .find(|sp| sp.label() == s)
            .ok_or_else(|| format!("unknown species '{s}'"))
    }
}
