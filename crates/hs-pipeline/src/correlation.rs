//! Pairing of the primary stream with its decay-sampled stream.
//!
//! The decay-sampled stream holds `NDECAYS` independent decay samplings of
//! every primary event. Primary event `i` maps to decay-sampled rows
//! `i + k * nPrimary` for `k` in `0..NDECAYS`. Each pass of a decay-sampled
//! event adds `1/NDECAYS` to the decay-averaged spectra; only `k == 0` feeds
//! the first-decay spectra used for errors; and the primary event is weighted
//! by the fraction of its decay samplings that passed the cut.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hs_core::{Error, Event, EventSource, Result};
use hs_hist::{HistogramSet, PairedSpectra};

use crate::cut::EventCut;

/// Name of the primary set.
pub const PRIMARY_SET: &str = "prim";
/// Name of the decay-averaged set.
pub const DECAYED_SET: &str = "seq";
/// Name of the first-decay-only set.
pub const FIRST_DECAY_SET: &str = "seq1";

/// What to do with a row that cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldErrorPolicy {
    /// Abort the run.
    #[default]
    Fail,
    /// Log, then treat the event as failing the cut.
    Skip,
}

impl fmt::Display for FieldErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldErrorPolicy::Fail => "fail",
            FieldErrorPolicy::Skip => "skip",
        })
    }
}

impl FromStr for FieldErrorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fail" => Ok(FieldErrorPolicy::Fail),
            "skip" => Ok(FieldErrorPolicy::Skip),
            other => Err(Error::Config(format!("unknown field-error policy '{other}'"))),
        }
    }
}

/// Index mapping between the two streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationPlan {
    n_primary: usize,
    n_decays: usize,
}

impl CorrelationPlan {
    /// Plan for streams of `n_primary` and `n_decayed` events.
    ///
    /// Both must be non-empty and `n_decayed` must be a multiple of `n_primary`.
    pub fn new(n_primary: usize, n_decayed: usize) -> Result<Self> {
        if n_primary == 0 {
            return Err(Error::Config("primary stream is empty".into()));
        }
        if n_decayed == 0 {
            return Err(Error::Config("decay-sampled stream is empty".into()));
        }
        if n_decayed % n_primary != 0 {
            return Err(Error::Config(format!(
                "decay-sampled events ({n_decayed}) are not a multiple of primary events ({n_primary})"
            )));
        }
        Ok(Self { n_primary, n_decays: n_decayed / n_primary })
    }

    /// Number of primary events.
    pub fn n_primary(&self) -> usize {
        self.n_primary
    }

    /// Decay samplings per primary event (`NDECAYS`).
    pub fn n_decays(&self) -> usize {
        self.n_decays
    }

    /// Decay-sampled row of sampling `k` of primary event `i`.
    #[inline]
    pub fn decay_index(&self, i: usize, k: usize) -> usize {
        i + k * self.n_primary
    }

    /// All decay-sampled rows of primary event `i`, in `k` order.
    pub fn decay_indices(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_decays).map(move |k| self.decay_index(i, k))
    }
}

/// The three spectra sets of a run, before or after normalization.
#[derive(Debug, Clone)]
pub struct Spectra {
    /// Primary fragments, weighted by decay survival.
    pub primary: HistogramSet,
    /// Decay-averaged spectra with first-decay errors.
    pub decayed: PairedSpectra,
    /// `NDECAYS` of the streams that produced these spectra.
    pub n_decays: usize,
    /// Rows skipped under [`FieldErrorPolicy::Skip`].
    pub skipped_rows: u64,
}

impl Spectra {
    /// Empty sets.
    pub fn new(n_decays: usize) -> Self {
        Self {
            primary: HistogramSet::new(PRIMARY_SET),
            decayed: PairedSpectra::new(DECAYED_SET, FIRST_DECAY_SET),
            n_decays,
            skipped_rows: 0,
        }
    }

    /// Bin-wise sum of another partition. Both must share `NDECAYS`.
    pub fn merge(&mut self, other: &Spectra) -> Result<()> {
        if self.n_decays != other.n_decays {
            return Err(Error::Config(format!(
                "cannot merge partitions with NDECAYS {} and {}",
                self.n_decays, other.n_decays
            )));
        }
        self.primary.merge(&other.primary)?;
        self.decayed.merge(&other.decayed)?;
        self.skipped_rows += other.skipped_rows;
        Ok(())
    }

    /// Normalize every set by its effective weight and substitute the
    /// decay-averaged errors.
    pub fn finalize(&mut self) -> Result<()> {
        self.primary.normalize()?;
        self.decayed.finalize()?;
        Ok(())
    }

    /// Sets in output order: primary, decay-averaged, first-decay.
    pub fn sets(&self) -> [&HistogramSet; 3] {
        [&self.primary, &self.decayed.value, &self.decayed.error_source]
    }
}

/// Runs the correlation over one primary/decay-sampled stream pair.
#[derive(Debug, Clone)]
pub struct Correlator {
    beam_rapidity: f64,
    cut: EventCut,
    policy: FieldErrorPolicy,
}

impl Correlator {
    /// Correlator filling at `y_lab / beam_rapidity`, with the default cut.
    pub fn new(beam_rapidity: f64) -> Self {
        Self { beam_rapidity, cut: EventCut::default(), policy: FieldErrorPolicy::default() }
    }

    /// Set the event cut.
    pub fn cut(mut self, cut: EventCut) -> Self {
        self.cut = cut;
        self
    }

    /// Set the field-read error policy.
    pub fn policy(mut self, policy: FieldErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Correlate `primary` with `decayed` into unnormalized spectra.
    pub fn run(
        &self,
        primary: &mut dyn EventSource,
        decayed: &mut dyn EventSource,
    ) -> Result<Spectra> {
        let plan = CorrelationPlan::new(primary.len(), decayed.len())?;
        let n_decays = plan.n_decays();
        let inv = 1.0 / n_decays as f64;
        let mut out = Spectra::new(n_decays);

        for i in 0..plan.n_primary() {
            let mut passed = 0usize;
            for (k, idx) in plan.decay_indices(i).enumerate() {
                let Some(event) = self.fetch(decayed, idx, "decayed", &mut out.skipped_rows)?
                else {
                    continue;
                };
                if !self.cut.passes(&event) {
                    continue;
                }
                passed += 1;
                fill_event(&mut out.decayed.value, &event, self.beam_rapidity, inv);
                if k == 0 {
                    fill_event(&mut out.decayed.error_source, &event, self.beam_rapidity, 1.0);
                }
            }

            let weight = passed as f64 * inv;
            let Some(event) = self.fetch(primary, i, "primary", &mut out.skipped_rows)? else {
                continue;
            };
            if self.cut.passes(&event) {
                fill_event(&mut out.primary, &event, self.beam_rapidity, weight);
            }
        }

        tracing::debug!(
            n_primary = plan.n_primary(),
            n_decays,
            primary_weight = out.primary.effective_weight(),
            decayed_weight = out.decayed.value.effective_weight(),
            skipped = out.skipped_rows,
            "correlated stream pair"
        );
        Ok(out)
    }

    fn fetch(
        &self,
        source: &mut dyn EventSource,
        index: usize,
        stream: &str,
        skipped: &mut u64,
    ) -> Result<Option<Event>> {
        match source.event(index) {
            Ok(event) => Ok(Some(event)),
            Err(err @ Error::FieldRead { .. }) if self.policy == FieldErrorPolicy::Skip => {
                tracing::warn!(stream, row = index, error = %err, "skipping unreadable event");
                *skipped += 1;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Fill every particle of `event` with `weight` and record the event weight.
fn fill_event(set: &mut HistogramSet, event: &Event, beam_rapidity: f64, weight: f64) {
    for particle in &event.particles {
        set.fill_particle(particle, beam_rapidity, weight);
    }
    set.add_event_weight(weight);
}
