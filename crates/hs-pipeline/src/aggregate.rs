//! Multi-file aggregation.
//!
//! Each primary/decay-sampled file pair is correlated on its own into
//! unnormalized [`Spectra`]. Partitions run on a rayon pool and are merged
//! in input order, so the result does not depend on scheduling.

use std::path::PathBuf;

use rayon::prelude::*;

use hs_core::{Error, Result};

use crate::correlation::Spectra;

/// One primary table and the decay-sampled table produced from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// Primary table.
    pub primary: PathBuf,
    /// Decay-sampled table.
    pub decayed: PathBuf,
}

impl FilePair {
    /// Pair two paths.
    pub fn new(primary: impl Into<PathBuf>, decayed: impl Into<PathBuf>) -> Self {
        Self { primary: primary.into(), decayed: decayed.into() }
    }
}

/// Zip two equally long path lists into pairs.
pub fn pair_files(primary: &[PathBuf], decayed: &[PathBuf]) -> Result<Vec<FilePair>> {
    if primary.len() != decayed.len() {
        return Err(Error::Config(format!(
            "got {} primary files but {} decay-sampled files",
            primary.len(),
            decayed.len()
        )));
    }
    Ok(primary.iter().zip(decayed).map(|(p, d)| FilePair::new(p, d)).collect())
}

/// Run `correlate` on every pair and merge the partitions in order.
///
/// `threads == 0` uses the global rayon pool.
pub fn aggregate<F>(pairs: &[FilePair], threads: usize, correlate: F) -> Result<Spectra>
where
    F: Fn(usize, &FilePair) -> Result<Spectra> + Sync,
{
    if pairs.is_empty() {
        return Err(Error::Config("no input file pairs".into()));
    }

    let run_all = || -> Result<Vec<Spectra>> {
        pairs.par_iter().enumerate().map(|(i, pair)| correlate(i, pair)).collect()
    };
    let partitions = if threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| Error::Computation(format!("failed to create thread pool: {e}")))?;
        pool.install(run_all)?
    } else {
        run_all()?
    };
    reduce(partitions)
}

/// Merge partitions left to right.
pub fn reduce(partitions: Vec<Spectra>) -> Result<Spectra> {
    let mut iter = partitions.into_iter();
    let mut total = iter.next().ok_or_else(|| Error::Config("nothing to merge".into()))?;
    for part in iter {
        total.merge(&part)?;
    }
    Ok(total)
}
