//! Per-species spectra: filling from particles, normalization and error
//! substitution.

use std::collections::BTreeMap;

use hs_core::Particle;

use crate::error::{HistError, Result};
use crate::histogram::Histogram2D;
use crate::species::Species;

/// One histogram per species on the shared spectra grid, plus the running
/// effective-weight total used as the normalization denominator.
#[derive(Debug, Clone)]
pub struct HistogramSet {
    name: String,
    histograms: BTreeMap<Species, Histogram2D>,
    effective_weight: f64,
    events: u64,
    normalized: bool,
}

impl HistogramSet {
    /// Set carrying every species in [`Species::ALL`].
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_species(name, &Species::ALL)
    }

    /// Set restricted to `species`; fills for any other label are no-ops.
    pub fn with_species(name: impl Into<String>, species: &[Species]) -> Self {
        let name = name.into();
        let histograms = species
            .iter()
            .map(|&sp| (sp, Histogram2D::spectra(format!("h2_pt_rapidity_{name}_{sp}"))))
            .collect();
        Self { name, histograms, effective_weight: 0.0, events: 0, normalized: false }
    }

    /// Set name (e.g. `"primary"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Histogram for `species`, if carried.
    pub fn get(&self, species: Species) -> Option<&Histogram2D> {
        self.histograms.get(&species)
    }

    /// `(species, histogram)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (Species, &Histogram2D)> {
        self.histograms.iter().map(|(&sp, h)| (sp, h))
    }

    /// Sum of event weights recorded with [`HistogramSet::add_event_weight`].
    pub fn effective_weight(&self) -> f64 {
        self.effective_weight
    }

    /// Number of events recorded.
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Whether [`HistogramSet::normalize`] has run.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Fill `species` at `(x, y)`. Unknown species and out-of-range points are dropped.
    pub fn fill(&mut self, species: Species, x: f64, y: f64, weight: f64) -> bool {
        match self.histograms.get_mut(&species) {
            Some(h) => h.fill(x, y, weight),
            None => false,
        }
    }

    /// Fill one particle at `(y_lab / beam_rapidity, pt)`.
    ///
    /// The particle's own species gets `weight`; `coal_p` and `coal_n` get
    /// `weight * Z` and `weight * N` whatever the species.
    pub fn fill_particle(&mut self, particle: &Particle, beam_rapidity: f64, weight: f64) {
        let x = particle.lab().rapidity / beam_rapidity;
        let y = particle.pt();
        if let Some(sp) = Species::from_za(particle.z, particle.a()) {
            self.fill(sp, x, y, weight);
        }
        self.fill(Species::CoalescenceProton, x, y, weight * particle.z as f64);
        self.fill(Species::CoalescenceNeutron, x, y, weight * particle.n as f64);
    }

    /// Record one contributing event of weight `weight`.
    pub fn add_event_weight(&mut self, weight: f64) {
        self.effective_weight += weight;
        self.events += 1;
    }

    /// Divide every histogram by the effective-weight total. Must be called
    /// once, after all fills.
    ///
    /// A set that received no events is left empty (and flagged normalized).
    pub fn normalize(&mut self) -> Result<()> {
        if self.normalized {
            return Err(HistError::AlreadyNormalized(self.name.clone()));
        }
        if self.effective_weight == 0.0 {
            tracing::warn!(set = %self.name, "no events passed; skipping normalization");
        } else {
            for h in self.histograms.values_mut() {
                h.normalize(self.effective_weight)?;
            }
        }
        self.normalized = true;
        Ok(())
    }

    /// Substitute every histogram's errors with those of `source`.
    pub fn replace_errors(&mut self, source: &HistogramSet) -> Result<()> {
        for (&sp, h) in self.histograms.iter_mut() {
            let src = source.histograms.get(&sp).ok_or_else(|| HistError::MissingSpecies {
                set: source.name.clone(),
                species: sp.to_string(),
            })?;
            h.replace_errors(src)?;
        }
        Ok(())
    }

    /// Bin-wise sum of `other` (histograms, weight totals and event counts).
    pub fn merge(&mut self, other: &HistogramSet) -> Result<()> {
        for (&sp, h) in self.histograms.iter_mut() {
            let src = other.histograms.get(&sp).ok_or_else(|| HistError::MissingSpecies {
                set: other.name.clone(),
                species: sp.to_string(),
            })?;
            h.merge(src)?;
        }
        self.effective_weight += other.effective_weight;
        self.events += other.events;
        Ok(())
    }
}

/// Decay-averaged spectra paired with the first-decay-only spectra that
/// supply their statistical errors.
///
/// Decay samples of one primary event are correlated, so `sqrt(Σw²)` of the
/// averaged histogram understates the uncertainty; the independent
/// single-decay sample gives the right one.
#[derive(Debug, Clone)]
pub struct PairedSpectra {
    /// Decay-averaged spectra (weight `1/NDECAYS` per event).
    pub value: HistogramSet,
    /// First-decay-only spectra (weight 1 per event).
    pub error_source: HistogramSet,
}

impl PairedSpectra {
    /// Fresh pair with the given set names.
    pub fn new(value: impl Into<String>, error_source: impl Into<String>) -> Self {
        Self { value: HistogramSet::new(value), error_source: HistogramSet::new(error_source) }
    }

    /// Whether `value` has weight but `error_source` has none, so the
    /// substituted errors are all zero.
    pub fn errors_missing(&self) -> bool {
        self.value.effective_weight() > 0.0 && self.error_source.effective_weight() == 0.0
    }

    /// Normalize both sets, then copy errors from `error_source` into `value`.
    pub fn finalize(&mut self) -> Result<()> {
        if self.errors_missing() {
            tracing::warn!(
                set = %self.value.name(),
                error_source = %self.error_source.name(),
                weight = self.value.effective_weight(),
                "no first-decay event passed; decay-averaged errors will be zero"
            );
        }
        self.value.normalize()?;
        self.error_source.normalize()?;
        self.value.replace_errors(&self.error_source)
    }

    /// Bin-wise sum of another pair.
    pub fn merge(&mut self, other: &PairedSpectra) -> Result<()> {
        self.value.merge(&other.value)?;
        self.error_source.merge(&other.error_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hs_core::Frame;

    const BETA: f64 = 0.2;
    const Y_BEAM: f64 = 0.8;

    fn lab_particle(n: u32, z: u32, mass: f64) -> Particle {
        // pt = 100 MeV/c, forward lab momentum
        Particle::new(n, z, [100.0, 0.0, 150.0 * (n + z) as f64], Frame::Lab, mass, BETA).unwrap()
    }

    fn bin_of(p: &Particle) -> (usize, usize) {
        let x = crate::histogram::RAPIDITY_AXIS.find_bin(p.lab().rapidity / Y_BEAM).unwrap();
        let y = crate::histogram::PT_AXIS.find_bin(p.pt()).unwrap();
        (x, y)
    }

    #[test]
    fn neutron_feeds_coal_n_only() {
        let mut set = HistogramSet::new("primary");
        let n = lab_particle(1, 0, 939.565);
        set.fill_particle(&n, Y_BEAM, 0.5);
        let (ix, iy) = bin_of(&n);
        assert_relative_eq!(set.get(Species::Neutron).unwrap().content(ix, iy), 0.5);
        assert_relative_eq!(set.get(Species::CoalescenceNeutron).unwrap().content(ix, iy), 0.5);
        assert_eq!(set.get(Species::CoalescenceProton).unwrap().integral(), 0.0);
    }

    #[test]
    fn alpha_weights_coalescence_by_z_and_n() {
        let mut set = HistogramSet::new("primary");
        let alpha = lab_particle(2, 2, 3727.379);
        set.fill_particle(&alpha, Y_BEAM, 1.5);
        assert_relative_eq!(set.get(Species::Helium4).unwrap().integral(), 1.5);
        assert_relative_eq!(set.get(Species::CoalescenceProton).unwrap().integral(), 3.0);
        assert_relative_eq!(set.get(Species::CoalescenceNeutron).unwrap().integral(), 3.0);
    }

    #[test]
    fn unlabeled_species_only_feed_coalescence() {
        let mut set = HistogramSet::new("primary");
        let li7 = lab_particle(4, 3, 6533.833);
        set.fill_particle(&li7, Y_BEAM, 1.0);
        let labeled: f64 = set
            .iter()
            .filter(|(sp, _)| !sp.is_coalescence())
            .map(|(_, h)| h.integral())
            .sum();
        assert_eq!(labeled, 0.0);
        assert_relative_eq!(set.get(Species::CoalescenceProton).unwrap().integral(), 3.0);
    }

    #[test]
    fn restricted_set_ignores_missing_species() {
        let mut set = HistogramSet::with_species("p_only", &[Species::Proton]);
        assert!(!set.fill(Species::Deuteron, 0.5, 100.0, 1.0));
        assert!(set.fill(Species::Proton, 0.5, 100.0, 1.0));
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn normalize_uses_effective_weight_once() {
        let mut set = HistogramSet::new("seq");
        set.fill(Species::Proton, 0.5, 100.0, 2.0);
        set.add_event_weight(0.5);
        set.add_event_weight(0.5);
        set.normalize().unwrap();
        assert_relative_eq!(set.get(Species::Proton).unwrap().integral(), 2.0);
        assert!(matches!(set.normalize(), Err(HistError::AlreadyNormalized(_))));
    }

    #[test]
    fn empty_set_normalizes_to_zero() {
        let mut set = HistogramSet::new("empty");
        set.normalize().unwrap();
        assert!(set.is_normalized());
        assert_eq!(set.get(Species::Proton).unwrap().integral(), 0.0);
    }

    #[test]
    fn paired_spectra_take_errors_from_first_decay() {
        let mut pair = PairedSpectra::new("seq", "seq1");
        // Three decays of one event land in the same bin.
        for k in 0..3 {
            pair.value.fill(Species::Proton, 0.505, 100.5, 1.0 / 3.0);
            if k == 0 {
                pair.error_source.fill(Species::Proton, 0.505, 100.5, 1.0);
            }
        }
        for _ in 0..3 {
            pair.value.add_event_weight(1.0 / 3.0);
        }
        pair.error_source.add_event_weight(1.0);
        pair.finalize().unwrap();

        let v = pair.value.get(Species::Proton).unwrap();
        let e = pair.error_source.get(Species::Proton).unwrap();
        assert_relative_eq!(v.content(50, 100), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.error(50, 100), e.error(50, 100));
        assert_relative_eq!(v.error(50, 100), 1.0);
    }

    #[test]
    fn paired_spectra_flag_missing_error_source() {
        let mut pair = PairedSpectra::new("seq", "seq1");
        assert!(!pair.errors_missing());

        // Only a later decay passed: the first-decay set stays empty.
        pair.value.fill(Species::Proton, 0.505, 100.5, 0.5);
        pair.value.add_event_weight(0.5);
        assert!(pair.errors_missing());

        pair.finalize().unwrap();
        let v = pair.value.get(Species::Proton).unwrap();
        assert_relative_eq!(v.content(50, 100), 1.0, epsilon = 1e-12);
        assert_eq!(v.error(50, 100), 0.0);
    }

    #[test]
    fn merge_sums_weights_and_events() {
        let mut a = HistogramSet::new("a");
        let mut b = HistogramSet::new("b");
        a.fill(Species::Triton, 0.2, 50.0, 1.0);
        a.add_event_weight(1.0);
        b.fill(Species::Triton, 0.2, 50.0, 2.0);
        b.add_event_weight(0.5);
        a.merge(&b).unwrap();
        assert_relative_eq!(a.get(Species::Triton).unwrap().integral(), 3.0);
        assert_relative_eq!(a.effective_weight(), 1.5);
        assert_eq!(a.events(), 2);

        let narrow = HistogramSet::with_species("narrow", &[Species::Proton]);
        assert!(matches!(a.merge(&narrow), Err(HistError::MissingSpecies { .. })));
    }
}
