//! Error types for histogram accumulation.

use thiserror::Error;

/// Histogram error type.
#[derive(Error, Debug)]
pub enum HistError {
    /// Two histograms that must share a grid do not.
    #[error("binning mismatch between '{left}' and '{right}'")]
    BinningMismatch {
        /// Receiving histogram.
        left: String,
        /// Other histogram.
        right: String,
    },

    /// Scale factor is zero or not finite.
    #[error("invalid normalization for '{name}': {scale}")]
    InvalidScale {
        /// Histogram or set name.
        name: String,
        /// Offending scale.
        scale: f64,
    },

    /// `normalize` called on an already normalized set.
    #[error("'{0}' is already normalized")]
    AlreadyNormalized(String),

    /// Bad axis, range or column layout.
    #[error("invalid binning: {0}")]
    InvalidBinning(String),

    /// Sets being merged or paired carry different species.
    #[error("species '{species}' missing from '{set}'")]
    MissingSpecies {
        /// Set name.
        set: String,
        /// Species label.
        species: String,
    },
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, HistError>;

impl From<HistError> for hs_core::Error {
    fn from(e: HistError) -> Self {
        hs_core::Error::Histogram(e.to_string())
    }
}
