//! Yield ratios, chemical temperature and coalescence sums from a written
//! spectra artifact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use hs_core::{Error, Result};
use hs_hist::{Coalescence, Histogram2D, NeutronSource, Species, Spectrum1D};

use crate::artifact::SpectraArtifact;
use crate::correlation::PRIMARY_SET;

/// What to project and how to bin it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldOptions {
    /// Set to analyse.
    pub set: String,
    /// Normalized-rapidity window, bins selected by center.
    pub rapidity: (f64, f64),
    /// pt range in MeV/c.
    pub pt_range: (f64, f64),
    /// Number of pt bins.
    pub bins: usize,
    /// Measured or pseudo neutrons for `n/p` and `coal_n`.
    pub neutrons: NeutronSource,
}

impl Default for YieldOptions {
    fn default() -> Self {
        Self {
            set: PRIMARY_SET.to_string(),
            rapidity: (0.4, 0.6),
            pt_range: (0.0, 600.0),
            bins: 30,
            neutrons: NeutronSource::Pseudo,
        }
    }
}

/// Derived 1D spectra of one set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldReport {
    /// Reaction label.
    pub reaction: String,
    /// Options used.
    pub options: YieldOptions,
    /// Per-species pt spectra, then `pseudo_n`, `n/p`, `T_chem`, `coal_n` and `coal_p`.
    pub spectra: Vec<Spectrum1D>,
}

impl YieldReport {
    /// Project the chosen set of `artifact` and derive every quantity.
    pub fn from_artifact(artifact: &SpectraArtifact, options: &YieldOptions) -> Result<Self> {
        let set = artifact.set(&options.set).ok_or_else(|| {
            Error::Config(format!("set '{}' not in artifact for {}", options.set, artifact.reaction))
        })?;
        let histograms: Vec<(Species, Histogram2D)> = set
            .histograms
            .iter()
            .map(|h| -> Result<(Species, Histogram2D)> { Ok((h.species, h.to_histogram()?)) })
            .collect::<Result<_>>()?;
        let analysis = Coalescence::from_histograms(
            histograms.iter().map(|(sp, h)| (*sp, h)),
            options.rapidity,
            options.pt_range,
            options.bins,
        )?;

        let mut spectra: Vec<Spectrum1D> = Species::ALL
            .iter()
            .filter_map(|sp| analysis.get(*sp).cloned())
            .collect();
        spectra.push(analysis.pseudo_neutron()?);
        spectra.push(analysis.np_ratio(options.neutrons)?);
        spectra.push(analysis.chemical_temperature()?);
        spectra.push(analysis.coalescence_neutron(options.neutrons)?);
        spectra.push(analysis.coalescence_proton()?);
        tracing::debug!(set = %options.set, spectra = spectra.len(), "derived yields");

        Ok(Self { reaction: artifact.reaction.clone(), options: options.clone(), spectra })
    }

    /// Spectrum called `name`.
    pub fn spectrum(&self, name: &str) -> Option<&Spectrum1D> {
        self.spectra.iter().find(|s| s.name == name)
    }

    /// Write pretty JSON to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| Error::Config(format!("creating {}: {e}", path.display())))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, self)?;
        w.write_all(b"\n")?;
        w.flush()?;
        tracing::info!(path = %path.display(), spectra = self.spectra.len(), "wrote yields");
        Ok(())
    }

    /// Read a report back.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::Config(format!("opening {}: {e}", path.display())))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
