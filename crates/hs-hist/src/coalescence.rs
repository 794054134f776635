//! Yield ratios and coalescence sums built from per-species pt spectra.
//!
//! All spectra are rebinned onto one common pt binning when added, so every
//! derived quantity is a point-wise combination on that binning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{HistError, Result};
use crate::histogram::Histogram2D;
use crate::species::Species;
use crate::spectrum::Spectrum1D;

/// Scale of the Albergo double-ratio temperature, `T = 14.3 / ln R` (MeV).
pub const CHEMICAL_TEMPERATURE_SCALE: f64 = 14.3;

/// Where the neutron spectrum comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeutronSource {
    /// The neutron spectrum itself.
    Measured,
    /// `p · t / ³He`.
    #[default]
    Pseudo,
}

/// Per-species pt spectra on a common binning.
#[derive(Debug, Clone)]
pub struct Coalescence {
    range: (f64, f64),
    bins: usize,
    spectra: BTreeMap<Species, Spectrum1D>,
}

impl Coalescence {
    /// Empty analysis rebinning onto `bins` bins over `range` (MeV/c).
    pub fn new(range: (f64, f64), bins: usize) -> Result<Self> {
        let (lo, hi) = range;
        if bins == 0 || !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(HistError::InvalidBinning(format!(
                "{bins} bins over [{lo}, {hi}]"
            )));
        }
        Ok(Self { range, bins, spectra: BTreeMap::new() })
    }

    /// Project every labeled species of `histograms` over the rapidity window.
    /// The two coalescence proxies are skipped.
    pub fn from_histograms<'a>(
        histograms: impl IntoIterator<Item = (Species, &'a Histogram2D)>,
        rapidity: (f64, f64),
        range: (f64, f64),
        bins: usize,
    ) -> Result<Self> {
        let mut out = Self::new(range, bins)?;
        for (sp, h) in histograms {
            if !sp.is_coalescence() {
                out.add_spectrum(sp, &h.project_y(rapidity, sp.label()))?;
            }
        }
        Ok(out)
    }

    /// Add (or replace) the spectrum of `species`, rebinned.
    pub fn add_spectrum(&mut self, species: Species, spectrum: &Spectrum1D) -> Result<()> {
        let rebinned = spectrum.rebin(self.range, self.bins)?;
        self.spectra.insert(species, rebinned);
        Ok(())
    }

    /// Rebinned spectrum of `species`.
    pub fn get(&self, species: Species) -> Option<&Spectrum1D> {
        self.spectra.get(&species)
    }

    fn require(&self, species: Species) -> Result<&Spectrum1D> {
        self.spectra.get(&species).ok_or_else(|| HistError::MissingSpecies {
            set: "coalescence".into(),
            species: species.to_string(),
        })
    }

    /// Pseudo-neutron spectrum `p · t / ³He`.
    pub fn pseudo_neutron(&self) -> Result<Spectrum1D> {
        let p = self.require(Species::Proton)?;
        let t = self.require(Species::Triton)?;
        let he3 = self.require(Species::Helium3)?;
        p.product(t, "p*t")?.ratio(he3, "pseudo_n")
    }

    fn neutrons(&self, source: NeutronSource) -> Result<Spectrum1D> {
        match source {
            NeutronSource::Measured => self.require(Species::Neutron).cloned(),
            NeutronSource::Pseudo => self.pseudo_neutron(),
        }
    }

    /// Neutron-to-proton yield ratio.
    pub fn np_ratio(&self, source: NeutronSource) -> Result<Spectrum1D> {
        let p = self.require(Species::Proton)?;
        self.neutrons(source)?.ratio(p, "n/p")
    }

    /// Chemical temperature from `R = (d · ⁴He) / (t · ³He)`.
    ///
    /// Points where `R` is zero, negative or exactly one have `T = 0`.
    pub fn chemical_temperature(&self) -> Result<Spectrum1D> {
        let d = self.require(Species::Deuteron)?;
        let he4 = self.require(Species::Helium4)?;
        let t = self.require(Species::Triton)?;
        let he3 = self.require(Species::Helium3)?;

        let n = d.len();
        let mut y = vec![0.0; n];
        let mut y_err = vec![0.0; n];
        for i in 0..n {
            let num = d.y[i] * he4.y[i];
            let den = t.y[i] * he3.y[i];
            if num == 0.0 || den == 0.0 {
                continue;
            }
            let log_r = (num / den).ln();
            if !(log_r.is_finite() && log_r != 0.0) {
                continue;
            }
            let ferr = [d, he4, t, he3].iter().map(|s| s.ferr(i).powi(2)).sum::<f64>().sqrt();
            y[i] = CHEMICAL_TEMPERATURE_SCALE / log_r;
            y_err[i] = CHEMICAL_TEMPERATURE_SCALE * ferr / (log_r * log_r);
        }
        Spectrum1D::new("T_chem", d.x.clone(), y, y_err)
    }

    /// Nucleons bound in light fragments, counted by neutron number:
    /// `n + d + 2t + ³He + 2⁴He`.
    pub fn coalescence_neutron(&self, source: NeutronSource) -> Result<Spectrum1D> {
        let n = self.neutrons(source)?;
        weighted_sum(
            "coal_n",
            &[
                (&n, 1.0),
                (self.require(Species::Deuteron)?, 1.0),
                (self.require(Species::Triton)?, 2.0),
                (self.require(Species::Helium3)?, 1.0),
                (self.require(Species::Helium4)?, 2.0),
            ],
        )
    }

    /// Nucleons bound in light fragments, counted by proton number:
    /// `p + d + t + 2³He + 2⁴He`.
    pub fn coalescence_proton(&self) -> Result<Spectrum1D> {
        weighted_sum(
            "coal_p",
            &[
                (self.require(Species::Proton)?, 1.0),
                (self.require(Species::Deuteron)?, 1.0),
                (self.require(Species::Triton)?, 1.0),
                (self.require(Species::Helium3)?, 2.0),
                (self.require(Species::Helium4)?, 2.0),
            ],
        )
    }
}

fn weighted_sum(name: &str, terms: &[(&Spectrum1D, f64)]) -> Result<Spectrum1D> {
    let x = terms[0].0.x.clone();
    let mut y = vec![0.0; x.len()];
    let mut err2 = vec![0.0; x.len()];
    for (s, k) in terms {
        if s.x != x {
            return Err(HistError::BinningMismatch {
                left: name.to_string(),
                right: s.name.clone(),
            });
        }
        for ((acc, acc2), (v, e)) in y.iter_mut().zip(&mut err2).zip(s.y.iter().zip(&s.y_err)) {
            *acc += k * v;
            *acc2 += k * k * e * e;
        }
    }
    Spectrum1D::new(name, x, y, err2.into_iter().map(f64::sqrt).collect())
}
