//! Event selection on centrality proxy and impact parameter.

use serde::{Deserialize, Serialize};

use hs_core::{Error, Event, Result};

/// Inclusive `Nc` and `b` windows. Either window may be disabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventCut {
    /// `[Ncmin, Ncmax]`, inclusive.
    pub nc: Option<(i32, i32)>,
    /// `[bmin, bmax]` in fm, inclusive.
    pub b: Option<(f64, f64)>,
}

impl Default for EventCut {
    fn default() -> Self {
        Self { nc: Some((1, 25)), b: Some((0.0, 3.0)) }
    }
}

impl EventCut {
    /// Cut that accepts every event.
    pub fn none() -> Self {
        Self { nc: None, b: None }
    }

    /// Set the `Nc` window.
    pub fn nc_range(mut self, min: i32, max: i32) -> Self {
        self.nc = Some((min, max));
        self
    }

    /// Set the impact-parameter window.
    pub fn b_range(mut self, min: f64, max: f64) -> Self {
        self.b = Some((min, max));
        self
    }

    /// Drop the `Nc` window.
    pub fn without_nc(mut self) -> Self {
        self.nc = None;
        self
    }

    /// Drop the impact-parameter window.
    pub fn without_b(mut self) -> Self {
        self.b = None;
        self
    }

    /// Reject inverted or non-finite windows.
    pub fn validate(&self) -> Result<()> {
        if let Some((lo, hi)) = self.nc {
            if lo > hi {
                return Err(Error::Config(format!("Nc window [{lo}, {hi}] is inverted")));
            }
        }
        if let Some((lo, hi)) = self.b {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(Error::Config(format!("b window [{lo}, {hi}] is invalid")));
            }
        }
        Ok(())
    }

    /// Whether `event` passes. A missing `Nc` fails any `Nc` window.
    pub fn passes(&self, event: &Event) -> bool {
        let nc_ok = match (self.nc, event.centrality) {
            (None, _) => true,
            (Some((lo, hi)), Some(nc)) => (lo..=hi).contains(&nc),
            (Some(_), None) => false,
        };
        let b_ok = match self.b {
            None => true,
            Some((lo, hi)) => (lo..=hi).contains(&event.impact_parameter),
        };
        nc_ok && b_ok
    }
}
