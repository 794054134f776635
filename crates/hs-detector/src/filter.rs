//! Per-event detector filtering.

use serde::{Deserialize, Serialize};

use hs_core::{Acceptance, Event, Particle};

use crate::hira::Hira;
use crate::microball::Microball;

/// Particles registered by one array in one event, stored column-wise with
/// lab-frame momenta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorRecord {
    /// Number of registered particles.
    pub multi: usize,
    /// Neutron numbers.
    #[serde(rename = "N")]
    pub n: Vec<u32>,
    /// Proton numbers.
    #[serde(rename = "Z")]
    pub z: Vec<u32>,
    /// Lab `px` (MeV/c).
    pub px: Vec<f64>,
    /// Lab `py` (MeV/c).
    pub py: Vec<f64>,
    /// Lab `pz` (MeV/c).
    pub pz: Vec<f64>,
}

impl DetectorRecord {
    /// Store `particle` at fill index `index`, which must equal the current
    /// multiplicity.
    fn record(&mut self, index: usize, particle: &Particle) {
        debug_assert_eq!(index, self.multi);
        self.n.push(particle.n);
        self.z.push(particle.z);
        self.px.push(particle.px());
        self.py.push(particle.py());
        self.pz.push(particle.lab().pz);
        self.multi = index + 1;
    }
}

/// One event as seen by Microball and HiRA.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredEvent {
    /// Impact parameter (fm), copied from the input event.
    pub b: f64,
    /// Microball record.
    pub uball: DetectorRecord,
    /// HiRA record.
    pub hira: DetectorRecord,
}

/// Both arrays together.
#[derive(Debug, Clone)]
pub struct DetectorFilter {
    microball: Microball,
    hira: Hira,
}

impl DetectorFilter {
    /// Combine the two arrays.
    pub fn new(microball: Microball, hira: Hira) -> Self {
        Self { microball, hira }
    }

    /// Microball part.
    pub fn microball(&self) -> &Microball {
        &self.microball
    }

    /// HiRA part.
    pub fn hira(&self) -> &Hira {
        &self.hira
    }

    /// Run every particle of `event` through phi correction and both arrays.
    ///
    /// Counters restart at zero for each event and give the fill index of
    /// the next accepted particle.
    pub fn filter_event(&mut self, event: Event) -> FilteredEvent {
        self.microball.reset_hits();
        self.hira.reset_counter();

        let mut out = FilteredEvent { b: event.impact_parameter, ..Default::default() };
        for mut particle in event.particles {
            self.microball.correct_phi(&mut particle);

            if self.microball.accepts(&particle) {
                out.uball.record(self.microball.hits(), &particle);
                self.microball.add_hit();
            }
            if self.hira.accepts(&particle) {
                out.hira.record(self.hira.passed(), &particle);
                self.hira.count_pass();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MicroballConfig, RingConfig, ThresholdConfig};
    use approx::assert_relative_eq;
    use hs_core::masses::PROTON_MASS;

    fn filter() -> DetectorFilter {
        let cfg = MicroballConfig {
            rings: vec![RingConfig {
                id: 4,
                theta_min: 40.0,
                theta_max: 60.0,
                detectors: 12,
                phi_start: -180.0,
                phi_span: 360.0,
                thresholds: vec![ThresholdConfig { z: 1, a: None, kinergy: 10.0 }],
            }],
            reactions: Default::default(),
        };
        DetectorFilter::new(Microball::new(&cfg, "Ca40Ni58E140").unwrap(), Hira::default())
    }

    fn lab_proton(theta_deg: f64, phi_deg: f64, p: f64) -> Particle {
        let (t, f) = (theta_deg.to_radians(), phi_deg.to_radians());
        let mom = [p * t.sin() * f.cos(), p * t.sin() * f.sin(), p * t.cos()];
        Particle::from_lab(0, 1, mom, PROTON_MASS, 0.2).unwrap()
    }

    #[test]
    fn records_both_arrays() {
        let mut f = filter();
        let event = Event {
            impact_parameter: 2.5,
            centrality: None,
            particles: vec![
                // Microball and HiRA.
                lab_proton(50.0, 0.0, 400.0),
                // Microball only (outside HiRA phi).
                lab_proton(50.0, 120.0, 400.0),
                // Neither.
                lab_proton(20.0, 0.0, 400.0),
                Particle::from_lab(1, 0, [50.0, 0.0, 300.0], 939.565, 0.2).unwrap(),
            ],
        };
        let out = f.filter_event(event.clone());
        assert_eq!(out.b, 2.5);
        assert_eq!(out.uball.multi, 2);
        assert_eq!(out.uball.z, vec![1, 1]);
        assert_eq!(out.hira.multi, 1);
        assert_relative_eq!(out.hira.pz[0], event.particles[0].lab().pz);
        assert_eq!(f.microball().hits(), 2);

        // Counters restart with every event.
        let again = f.filter_event(event);
        assert_eq!(again.uball.multi, 2);
        assert_eq!(again.hira.multi, 1);
    }

    #[test]
    fn empty_event_is_kept() {
        let mut f = filter();
        let out = f.filter_event(Event { impact_parameter: 7.0, ..Default::default() });
        assert_eq!(out.uball.multi, 0);
        assert_eq!(out.hira, DetectorRecord::default());
    }

    #[test]
    fn record_serializes_with_table_field_names() {
        let mut f = filter();
        let out = f.filter_event(Event {
            impact_parameter: 1.0,
            centrality: None,
            particles: vec![lab_proton(50.0, 0.0, 400.0)],
        });
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["uball"]["multi"], 1);
        assert_eq!(json["uball"]["Z"][0], 1);
        assert!(json["hira"]["N"].is_array());
    }
}
