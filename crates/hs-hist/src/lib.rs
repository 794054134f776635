//! # hs-hist
//!
//! Weighted 2D histograms of transverse momentum vs. normalized lab rapidity,
//! one per particle species.
//!
//! Every histogram of a run shares the grid of [`RAPIDITY_AXIS`] ×
//! [`PT_AXIS`], so sets can be merged or cross-referenced bin for bin.
//!
//! Finalized sets project to 1D pt spectra ([`Spectrum1D`]) over a rapidity
//! window; [`Coalescence`] derives yield ratios, the chemical temperature and
//! coalescence sums from them.
//!
//! ## Example
//!
//! ```
//! use hs_hist::{HistogramSet, Species};
//!
//! let mut set = HistogramSet::new("primary");
//! set.fill(Species::Proton, 0.45, 120.0, 0.5);
//! set.add_event_weight(0.5);
//! set.normalize().unwrap();
//! assert_eq!(set.get(Species::Proton).unwrap().integral(), 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coalescence;
pub mod error;
pub mod filler;
pub mod histogram;
pub mod species;
pub mod spectrum;

pub use coalescence::{CHEMICAL_TEMPERATURE_SCALE, Coalescence, NeutronSource};
pub use error::{HistError, Result};
pub use filler::{HistogramSet, PairedSpectra};
pub use histogram::{Axis, Histogram2D, PT_AXIS, RAPIDITY_AXIS};
pub use species::Species;
pub use spectrum::Spectrum1D;
