//! # hs-detector
//!
//! Acceptance filters for the E15190 setup: the Microball ring array and the
//! HiRA telescopes. [`DetectorFilter`] runs a full event through both and
//! produces a [`FilteredEvent`] with one [`DetectorRecord`] per array.
//!
//! ## Example
//!
//! ```
//! use hs_core::{Event, Particle};
//! use hs_detector::{DetectorFilter, Hira, Microball, MicroballConfig};
//!
//! let cfg: MicroballConfig = serde_yaml_ng::from_str(
//!     "rings: [{ id: 4, theta_min: 40, theta_max: 60, detectors: 12, phi_start: -180,
//!               thresholds: [{ z: 1, kinergy: 10 }] }]",
//! )
//! .unwrap();
//! let mut filter = DetectorFilter::new(Microball::new(&cfg, "Ca48Ni64E140").unwrap(), Hira::default());
//!
//! let p = Particle::from_lab(0, 1, [306.4, 0.0, 257.1], 938.272, 0.2).unwrap();
//! let out = filter.filter_event(Event { impact_parameter: 1.0, centrality: None, particles: vec![p] });
//! assert_eq!(out.uball.multi, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod filter;
pub mod hira;
pub mod microball;

pub use config::{HiraConfig, MicroballConfig};
pub use filter::{DetectorFilter, DetectorRecord, FilteredEvent};
pub use hira::Hira;
pub use microball::Microball;
