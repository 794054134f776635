//! Core traits for hicspec
//!
//! Lookup tables and detector models sit behind these traits so the
//! correlation and histogramming code never depends on where masses come
//! from or which array is being simulated.

use crate::Result;
use crate::types::{Event, Particle};

/// Nuclide mass lookup keyed by `(Z, A)`.
pub trait NuclideMasses: Send + Sync {
    /// Nuclear mass in MeV/c², or `None` if the nuclide is not defined.
    fn mass(&self, z: u32, a: u32) -> Option<f64>;
}

/// Per-particle detector acceptance.
pub trait Acceptance {
    /// Whether the particle would have been registered by this detector.
    fn accepts(&self, particle: &Particle) -> bool;

    /// Detector name (e.g. "microball", "hira")
    fn name(&self) -> &str;
}

/// Random-access stream of decoded events.
pub trait EventSource {
    /// Number of events.
    fn len(&self) -> usize;

    /// Whether the stream has no events.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode event `index`.
    fn event(&mut self, index: usize) -> Result<Event>;
}

impl EventSource for Vec<Event> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn event(&mut self, index: usize) -> Result<Event> {
        self.get(index).cloned().ok_or_else(|| {
            crate::Error::Config(format!("event {index} out of range ({} events)", self.as_slice().len()))
        })
    }
}
