//! Entry point: reaction + file pairs → finalized spectra.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hs_core::{
    Error, MassTable, NuclideMasses, ReactionKinematics, ReactionSystem, Result,
};

use crate::aggregate::{FilePair, aggregate};
use crate::correlation::{Correlator, FieldErrorPolicy, Spectra};
use crate::cut::EventCut;
use crate::layout::{EventReader, RowLayout};
use crate::table::TableChain;

/// Builder for a spectra run over one or more primary/decay-sampled pairs.
///
/// # Example
///
/// ```no_run
/// use hs_pipeline::{EventCut, SpectraBuilder};
///
/// let run = SpectraBuilder::new("Ca48Ni64E140".parse().unwrap())
///     .cut(EventCut::default().nc_range(1, 25).b_range(0.0, 3.0))
///     .add_pair("amd_primary.jsonl", "amd_decayed.jsonl")
///     .run()
///     .unwrap();
/// println!("primary weight {}", run.spectra.primary.effective_weight());
/// ```
#[derive(Debug, Clone)]
pub struct SpectraBuilder {
    reaction: ReactionSystem,
    masses: Arc<MassTable>,
    cut: EventCut,
    policy: FieldErrorPolicy,
    primary_layout: RowLayout,
    decayed_layout: RowLayout,
    pairs: Vec<FilePair>,
    threads: usize,
}

/// Finalized spectra plus the run constants needed to interpret them.
#[derive(Debug, Clone)]
pub struct SpectraRun {
    /// Reaction.
    pub reaction: ReactionSystem,
    /// `betacms` and beam rapidity.
    pub kinematics: ReactionKinematics,
    /// Event cut applied to both streams.
    pub cut: EventCut,
    /// Normalized sets.
    pub spectra: Spectra,
}

impl SpectraBuilder {
    /// Builder for `reaction` with generator layout on both streams and the default cut.
    pub fn new(reaction: ReactionSystem) -> Self {
        Self {
            reaction,
            masses: Arc::new(MassTable::builtin()),
            cut: EventCut::default(),
            policy: FieldErrorPolicy::default(),
            primary_layout: RowLayout::GENERATOR,
            decayed_layout: RowLayout::GENERATOR,
            pairs: Vec::new(),
            threads: 1,
        }
    }

    /// Replace the mass table.
    pub fn masses(mut self, masses: MassTable) -> Self {
        self.masses = Arc::new(masses);
        self
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

    /// Use `layout` for both streams.
    pub fn layout(mut self, layout: RowLayout) -> Self {
        self.primary_layout = layout;
        self.decayed_layout = layout;
        self
    }

    /// Layout of the primary stream.
    pub fn primary_layout(mut self, layout: RowLayout) -> Self {
        self.primary_layout = layout;
        self
    }

    /// Layout of the decay-sampled stream.
    pub fn decayed_layout(mut self, layout: RowLayout) -> Self {
        self.decayed_layout = layout;
        self
    }

    /// Add one primary/decay-sampled file pair.
    pub fn add_pair(mut self, primary: impl Into<PathBuf>, decayed: impl Into<PathBuf>) -> Self {
        self.pairs.push(FilePair::new(primary, decayed));
        self
    }

    /// Add several pairs.
    pub fn add_pairs(mut self, pairs: impl IntoIterator<Item = FilePair>) -> Self {
        self.pairs.extend(pairs);
        self
    }

    /// Worker threads for the per-pair partitions (0 = rayon default).
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Correlate every pair, merge, and normalize.
    pub fn run(&self) -> Result<SpectraRun> {
        self.cut.validate()?;
        for pair in &self.pairs {
            require_file(&pair.primary)?;
            require_file(&pair.decayed)?;
        }
        let kinematics = self.reaction.kinematics(self.masses.as_ref())?;
        tracing::info!(
            reaction = %self.reaction,
            betacms = kinematics.betacms,
            beam_rapidity = kinematics.beam_rapidity,
            pairs = self.pairs.len(),
            "starting spectra run"
        );

        let correlator = Correlator::new(kinematics.beam_rapidity).cut(self.cut).policy(self.policy);
        let mut spectra = aggregate(&self.pairs, self.threads, |i, pair| {
            tracing::debug!(
                index = i,
                primary = %pair.primary.display(),
                decayed = %pair.decayed.display(),
                "correlating pair"
            );
            let mut primary = self.reader(&pair.primary, self.primary_layout, kinematics.betacms)?;
            let mut decayed = self.reader(&pair.decayed, self.decayed_layout, kinematics.betacms)?;
            correlator.run(&mut primary, &mut decayed).map_err(|e| match e {
                Error::Config(msg) => Error::Config(format!(
                    "{msg} ({} / {})",
                    pair.primary.display(),
                    pair.decayed.display()
                )),
                other => other,
            })
        })?;
        spectra.finalize()?;

        tracing::info!(
            n_decays = spectra.n_decays,
            primary_events = spectra.primary.events(),
            decayed_events = spectra.decayed.value.events(),
            skipped = spectra.skipped_rows,
            "spectra finalized"
        );
        Ok(SpectraRun { reaction: self.reaction.clone(), kinematics, cut: self.cut, spectra })
    }

    fn reader(&self, path: &Path, layout: RowLayout, betacms: f64) -> Result<EventReader> {
        let chain = TableChain::open(&[path.to_path_buf()])?;
        let masses: Arc<dyn NuclideMasses> = self.masses.clone();
        Ok(EventReader::new(chain, layout, masses, betacms))
    }
}

/// Fail with a configuration error unless `path` is an existing file.
pub fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::Config(format!("input file {} does not exist", path.display())))
    }
}
