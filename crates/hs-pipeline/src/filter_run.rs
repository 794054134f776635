//! Raw generator tables → detector-filtered table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hs_core::{Error, MassTable, NuclideMasses, ReactionSystem, Result};
use hs_detector::{DetectorFilter, Hira, HiraConfig, Microball, MicroballConfig};

use crate::correlation::FieldErrorPolicy;
use crate::layout::{EventReader, RowLayout};
use crate::spectra::require_file;
use crate::table::TableChain;

/// Totals of one filter run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// Events written.
    pub events: usize,
    /// Events skipped for read errors.
    pub skipped: usize,
    /// Particles registered by Microball.
    pub uball_hits: usize,
    /// Particles registered by HiRA.
    pub hira_hits: usize,
}

/// Builder for a filter run.
#[derive(Debug, Clone)]
pub struct FilterRun {
    reaction: ReactionSystem,
    masses: Arc<MassTable>,
    microball: MicroballConfig,
    hira: HiraConfig,
    inputs: Vec<PathBuf>,
    layout: RowLayout,
    policy: FieldErrorPolicy,
}

impl FilterRun {
    /// Filter run for `reaction` with the given Microball description.
    pub fn new(reaction: ReactionSystem, microball: MicroballConfig) -> Self {
        Self {
            reaction,
            masses: Arc::new(MassTable::builtin()),
            microball,
            hira: HiraConfig::default(),
            inputs: Vec::new(),
            layout: RowLayout::GENERATOR,
            policy: FieldErrorPolicy::Fail,
        }
    }

    /// Replace the mass table.
    pub fn masses(mut self, masses: MassTable) -> Self {
        self.masses = Arc::new(masses);
        self
    }

    /// Replace the HiRA description.
    pub fn hira(mut self, hira: HiraConfig) -> Self {
        self.hira = hira;
        self
    }

    /// Append input tables; they are read as one chain.
    pub fn inputs(mut self, inputs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Layout of the input rows.
    pub fn layout(mut self, layout: RowLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Field-read error policy.
    pub fn policy(mut self, policy: FieldErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Filter every input event and write one JSON line per event to `output`.
    pub fn run(&self, output: &Path) -> Result<FilterSummary> {
        if self.inputs.is_empty() {
            return Err(Error::Config("no input tables".into()));
        }
        for path in &self.inputs {
            require_file(path)?;
        }
        let kinematics = self.reaction.kinematics(self.masses.as_ref())?;
        let reaction = self.reaction.to_string();
        let mut filter = DetectorFilter::new(
            Microball::new(&self.microball, &reaction)?,
            Hira::new(self.hira.clone()),
        );

        let masses: Arc<dyn NuclideMasses> = self.masses.clone();
        let mut reader =
            EventReader::new(TableChain::open(&self.inputs)?, self.layout, masses, kinematics.betacms);
        tracing::info!(reaction = %reaction, events = reader.len(), "filtering events");

        let file = File::create(output)
            .map_err(|e| Error::Config(format!("creating {}: {e}", output.display())))?;
        let mut out = BufWriter::new(file);
        let mut summary = FilterSummary::default();
        for index in 0..reader.len() {
            let event = match reader.event(index) {
                Ok(event) => event,
                Err(err @ Error::FieldRead { .. }) if self.policy == FieldErrorPolicy::Skip => {
                    tracing::warn!(row = index, error = %err, "skipping unreadable event");
                    summary.skipped += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };
            let filtered = filter.filter_event(event);
            summary.events += 1;
            summary.uball_hits += filtered.uball.multi;
            summary.hira_hits += filtered.hira.multi;
            serde_json::to_writer(&mut out, &filtered)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        tracing::info!(
            path = %output.display(),
            events = summary.events,
            uball_hits = summary.uball_hits,
            hira_hits = summary.hira_hits,
            "wrote filtered table"
        );
        Ok(summary)
    }
}
