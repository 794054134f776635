//! Typed rows and their conversion into [`Event`]s.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use hs_core::{Error, Event, EventSource, Frame, MomentumUnits, NuclideMasses, Particle, Result};
use hs_detector::{DetectorRecord, FilteredEvent};

use crate::table::TableChain;

/// One event as written by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Multiplicity.
    pub multi: usize,
    /// Impact parameter (fm).
    pub b: f64,
    /// Centrality proxy, if the generator stored one.
    #[serde(rename = "Nc", default, skip_serializing_if = "Option::is_none")]
    pub nc: Option<i32>,
    /// Neutron numbers.
    #[serde(rename = "N")]
    pub n: Vec<u32>,
    /// Proton numbers.
    #[serde(rename = "Z")]
    pub z: Vec<u32>,
    /// Momentum x components.
    pub px: Vec<f64>,
    /// Momentum y components.
    pub py: Vec<f64>,
    /// Momentum z components.
    pub pz: Vec<f64>,
}

/// Check that each particle column holds exactly `multi` entries.
fn check_columns(row: usize, prefix: &str, multi: usize, cols: [(&str, usize); 5]) -> Result<()> {
    for (field, len) in cols {
        if len != multi {
            return Err(Error::FieldRead {
                row,
                field: format!("{prefix}{field}"),
                reason: format!("length {len} != multi {multi}"),
            });
        }
    }
    Ok(())
}

impl RawRow {
    /// Column-length validation.
    pub fn validate(&self, row: usize) -> Result<()> {
        check_columns(
            row,
            "",
            self.multi,
            [
                ("N", self.n.len()),
                ("Z", self.z.len()),
                ("px", self.px.len()),
                ("py", self.py.len()),
                ("pz", self.pz.len()),
            ],
        )
    }
}

fn validate_record(row: usize, prefix: &str, rec: &DetectorRecord) -> Result<()> {
    check_columns(
        row,
        prefix,
        rec.multi,
        [
            ("N", rec.n.len()),
            ("Z", rec.z.len()),
            ("px", rec.px.len()),
            ("py", rec.py.len()),
            ("pz", rec.pz.len()),
        ],
    )
}

/// Which array of a filtered row to read particles from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorArray {
    /// Microball.
    Uball,
    /// HiRA.
    Hira,
}

/// How a table row becomes an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RowLayout {
    /// Generator rows: `Nc` taken from the row, momenta in `units`/`frame`.
    Raw {
        /// Momentum units.
        units: MomentumUnits,
        /// Momentum frame.
        frame: Frame,
    },
    /// Detector-filtered rows: `Nc` is the Microball multiplicity and the
    /// particles of `array` carry total lab momenta.
    Filtered {
        /// Array whose particles are histogrammed.
        array: DetectorArray,
    },
}

impl RowLayout {
    /// Generator tables as written: per-nucleon cms momenta.
    pub const GENERATOR: RowLayout =
        RowLayout::Raw { units: MomentumUnits::PerNucleon, frame: Frame::Cms };

    /// Decode row `row` from its JSON text.
    pub fn decode(
        &self,
        line: &str,
        row: usize,
        masses: &dyn NuclideMasses,
        betacms: f64,
    ) -> Result<Event> {
        match *self {
            RowLayout::Raw { units, frame } => {
                let raw: RawRow = parse(line, row)?;
                raw.validate(row)?;
                let particles = build_particles(
                    row,
                    Columns { n: &raw.n, z: &raw.z, px: &raw.px, py: &raw.py, pz: &raw.pz },
                    units,
                    frame,
                    masses,
                    betacms,
                )?;
                Ok(Event { impact_parameter: raw.b, centrality: raw.nc, particles })
            }
            RowLayout::Filtered { array } => {
                let filtered: FilteredEvent = parse(line, row)?;
                validate_record(row, "uball.", &filtered.uball)?;
                validate_record(row, "hira.", &filtered.hira)?;
                let rec = match array {
                    DetectorArray::Uball => &filtered.uball,
                    DetectorArray::Hira => &filtered.hira,
                };
                let particles = build_particles(
                    row,
                    Columns { n: &rec.n, z: &rec.z, px: &rec.px, py: &rec.py, pz: &rec.pz },
                    MomentumUnits::Total,
                    Frame::Lab,
                    masses,
                    betacms,
                )?;
                let nc = i32::try_from(filtered.uball.multi).map_err(|_| Error::FieldRead {
                    row,
                    field: "uball.multi".into(),
                    reason: "does not fit in i32".into(),
                })?;
                Ok(Event { impact_parameter: filtered.b, centrality: Some(nc), particles })
            }
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(line: &str, row: usize) -> Result<T> {
    serde_json::from_str(line).map_err(|e| Error::FieldRead {
        row,
        field: "row".into(),
        reason: e.to_string(),
    })
}

struct Columns<'a> {
    n: &'a [u32],
    z: &'a [u32],
    px: &'a [f64],
    py: &'a [f64],
    pz: &'a [f64],
}

fn build_particles(
    row: usize,
    cols: Columns<'_>,
    units: MomentumUnits,
    frame: Frame,
    masses: &dyn NuclideMasses,
    betacms: f64,
) -> Result<Vec<Particle>> {
    (0..cols.n.len())
        .map(|i| {
            Particle::from_table(
                cols.n[i],
                cols.z[i],
                [cols.px[i], cols.py[i], cols.pz[i]],
                units,
                frame,
                masses,
                betacms,
            )
            .map_err(|e| Error::FieldRead {
                row,
                field: format!("particle[{i}]"),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Random-access event stream over a [`TableChain`].
pub struct EventReader {
    chain: TableChain,
    layout: RowLayout,
    masses: Arc<dyn NuclideMasses>,
    betacms: f64,
}

impl EventReader {
    /// Reader decoding `chain` with `layout`.
    pub fn new(
        chain: TableChain,
        layout: RowLayout,
        masses: Arc<dyn NuclideMasses>,
        betacms: f64,
    ) -> Self {
        Self { chain, layout, masses, betacms }
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the stream is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Row layout in use.
    pub fn layout(&self) -> RowLayout {
        self.layout
    }

    /// Decode event `index`.
    pub fn event(&mut self, index: usize) -> Result<Event> {
        let line = self.chain.line(index)?;
        self.layout.decode(&line, index, self.masses.as_ref(), self.betacms)
    }
}

impl EventSource for EventReader {
    fn len(&self) -> usize {
        EventReader::len(self)
    }

    fn event(&mut self, index: usize) -> Result<Event> {
        EventReader::event(self, index)
    }
}

impl std::fmt::Debug for EventReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReader")
            .field("chain", &self.chain)
            .field("layout", &self.layout)
            .field("betacms", &self.betacms)
            .finish()
    }
}
