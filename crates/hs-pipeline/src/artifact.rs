//! JSON output of a spectra run.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use hs_core::{Error, Result};
use hs_hist::{Axis, Histogram2D, HistogramSet, Species};

use crate::cut::EventCut;
use crate::spectra::SpectraRun;

/// One histogram: grid plus row-major contents and errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramRecord {
    /// `h2_pt_rapidity_{set}_{species}`.
    pub name: String,
    /// Species label.
    pub species: Species,
    /// Normalized-rapidity axis.
    pub x: Axis,
    /// Transverse-momentum axis.
    pub y: Axis,
    /// Bin contents, `iy * nx + ix`.
    pub content: Vec<f64>,
    /// Bin errors, same layout.
    pub error: Vec<f64>,
}

impl HistogramRecord {
    fn from_histogram(species: Species, h: &Histogram2D) -> Self {
        Self {
            name: h.name.clone(),
            species,
            x: *h.x_axis(),
            y: *h.y_axis(),
            content: h.contents().to_vec(),
            error: h.errors(),
        }
    }

    /// Rebuild the histogram this record was written from.
    pub fn to_histogram(&self) -> Result<Histogram2D> {
        Ok(Histogram2D::from_parts(&self.name, self.x, self.y, self.content.clone(), &self.error)?)
    }

    /// Content of bin `(ix, iy)`.
    pub fn content_at(&self, ix: usize, iy: usize) -> f64 {
        self.content[iy * self.x.n_bins + ix]
    }

    /// Error of bin `(ix, iy)`.
    pub fn error_at(&self, ix: usize, iy: usize) -> f64 {
        self.error[iy * self.x.n_bins + ix]
    }
}

/// One histogram set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    /// Set name.
    pub name: String,
    /// Normalization denominator.
    pub effective_weight: f64,
    /// Events that contributed.
    pub events: u64,
    /// One histogram per species.
    pub histograms: Vec<HistogramRecord>,
}

impl SetRecord {
    fn from_set(set: &HistogramSet) -> Self {
        Self {
            name: set.name().to_string(),
            effective_weight: set.effective_weight(),
            events: set.events(),
            histograms: set.iter().map(|(sp, h)| HistogramRecord::from_histogram(sp, h)).collect(),
        }
    }

    /// Histogram of `species`.
    pub fn histogram(&self, species: Species) -> Option<&HistogramRecord> {
        self.histograms.iter().find(|h| h.species == species)
    }
}

/// Everything a run writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectraArtifact {
    /// Reaction label.
    pub reaction: String,
    /// Center-of-mass velocity.
    pub betacms: f64,
    /// Beam rapidity used for normalization of `y`.
    pub beam_rapidity: f64,
    /// Decay samplings per primary event.
    pub n_decays: usize,
    /// Event cut.
    pub cut: EventCut,
    /// Rows skipped for read errors.
    pub skipped_rows: u64,
    /// Primary, decay-averaged and first-decay sets.
    pub sets: Vec<SetRecord>,
}

impl SpectraArtifact {
    /// Snapshot a finished run.
    pub fn from_run(run: &SpectraRun) -> Self {
        Self {
            reaction: run.reaction.to_string(),
            betacms: run.kinematics.betacms,
            beam_rapidity: run.kinematics.beam_rapidity,
            n_decays: run.spectra.n_decays,
            cut: run.cut,
            skipped_rows: run.spectra.skipped_rows,
            sets: run.spectra.sets().into_iter().map(SetRecord::from_set).collect(),
        }
    }

    /// Set called `name`.
    pub fn set(&self, name: &str) -> Option<&SetRecord> {
        self.sets.iter().find(|s| s.name == name)
    }

    /// Write compact JSON to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| Error::Config(format!("creating {}: {e}", path.display())))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer(&mut w, self)?;
        w.write_all(b"\n")?;
        w.flush()?;
        tracing::info!(path = %path.display(), sets = self.sets.len(), "wrote spectra");
        Ok(())
    }

    /// Read an artifact back.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::Config(format!("opening {}: {e}", path.display())))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::Spectra;
    use hs_core::ReactionSystem;

    #[test]
    fn artifact_layout() {
        let mut spectra = Spectra::new(3);
        spectra.primary.fill(Species::Deuteron, 0.305, 42.5, 2.0);
        spectra.primary.add_event_weight(2.0);
        spectra.finalize().unwrap();
        let reaction: ReactionSystem = "Ca40Ni58E56".parse().unwrap();
        let run = SpectraRun {
            kinematics: hs_core::ReactionKinematics { betacms: 0.1, beam_rapidity: 0.35 },
            reaction,
            cut: EventCut::default(),
            spectra,
        };
        let art = SpectraArtifact::from_run(&run);
        assert_eq!(art.reaction, "Ca40Ni58E56");
        assert_eq!(art.sets.len(), 3);

        let prim = art.set("prim").unwrap();
        assert_eq!(prim.histograms.len(), Species::ALL.len());
        let d = prim.histogram(Species::Deuteron).unwrap();
        assert_eq!(d.name, "h2_pt_rapidity_prim_d");
        assert_eq!(d.content.len(), 100 * 600);
        assert_eq!(d.content_at(30, 42), 1.0);
        assert!((d.error_at(30, 42) - 1.0).abs() < 1e-12);

        let json = serde_json::to_value(&art).unwrap();
        assert_eq!(json["sets"][2]["name"], "seq1");
        assert_eq!(json["sets"][0]["histograms"][0]["species"], "n");
        assert_eq!(json["cut"]["nc"][1], 25);
    }
}
