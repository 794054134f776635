//! # hs-pipeline
//!
//! From event tables to normalized spectra.
//!
//! - [`table`]: NDJSON tables with random row access, chained like a TChain.
//! - [`layout`]: typed rows and how they become events.
//! - [`cut`]: the `Nc` / impact-parameter selection.
//! - [`correlation`]: pairing each primary event with its decay samplings.
//! - [`aggregate`]: per-file-pair partitions on a rayon pool, merged in order.
//! - [`spectra`] and [`filter_run`]: the two entry points.
//! - [`artifact`]: the JSON output.
//! - [`yields`]: pt spectra, yield ratios and coalescence sums from an artifact.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod artifact;
pub mod correlation;
pub mod cut;
pub mod filter_run;
pub mod layout;
pub mod spectra;
pub mod table;
pub mod yields;

pub use aggregate::{FilePair, pair_files};
pub use artifact::{HistogramRecord, SetRecord, SpectraArtifact};
pub use correlation::{
    CorrelationPlan, Correlator, DECAYED_SET, FIRST_DECAY_SET, FieldErrorPolicy, PRIMARY_SET,
    Spectra,
};
pub use cut::EventCut;
pub use filter_run::{FilterRun, FilterSummary};
pub use layout::{DetectorArray, EventReader, RawRow, RowLayout};
pub use spectra::{SpectraBuilder, SpectraRun};
pub use table::{JsonlTable, MemoryTable, Table, TableChain};
pub use yields::{YieldOptions, YieldReport};
