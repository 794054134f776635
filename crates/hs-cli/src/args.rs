//! Argument groups shared by several subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use hs_core::{Frame, MassTable, MomentumUnits};
use hs_pipeline::{DetectorArray, EventCut, FieldErrorPolicy, RowLayout};

/// Event-cut windows.
#[derive(Debug, Clone, Args)]
pub struct CutArgs {
    /// Lower edge of the Nc window (inclusive)
    #[arg(long, default_value = "1")]
    pub nc_min: i32,

    /// Upper edge of the Nc window (inclusive)
    #[arg(long, default_value = "25")]
    pub nc_max: i32,

    /// Lower edge of the impact-parameter window in fm (inclusive)
    #[arg(long, default_value = "0.0")]
    pub b_min: f64,

    /// Upper edge of the impact-parameter window in fm (inclusive)
    #[arg(long, default_value = "3.0")]
    pub b_max: f64,

    /// Disable the Nc window (tables without Nc)
    #[arg(long)]
    pub no_nc_cut: bool,
}

impl CutArgs {
    pub fn to_cut(&self) -> EventCut {
        let cut = EventCut::none().nc_range(self.nc_min, self.nc_max).b_range(self.b_min, self.b_max);
        if self.no_nc_cut { cut.without_nc() } else { cut }
    }
}

/// Options common to `spectra` and `anal`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// What to do with unreadable rows
    #[arg(long, value_enum, default_value = "fail")]
    pub on_field_error: OnFieldError,

    /// Extra nuclide masses (YAML/JSON list of {z, a, mass})
    #[arg(long)]
    pub mass_table: Option<PathBuf>,
}

impl RunArgs {
    pub fn masses(&self) -> Result<MassTable> {
        load_masses(self.mass_table.as_ref())
    }
}

pub fn load_masses(path: Option<&PathBuf>) -> Result<MassTable> {
    match path {
        Some(p) => MassTable::from_path(p)
            .with_context(|| format!("failed to load mass table {}", p.display())),
        None => Ok(MassTable::builtin()),
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OnFieldError {
    /// Abort on the first unreadable row
    Fail,
    /// Log and drop unreadable rows
    Skip,
}

impl From<OnFieldError> for FieldErrorPolicy {
    fn from(v: OnFieldError) -> Self {
        match v {
            OnFieldError::Fail => FieldErrorPolicy::Fail,
            OnFieldError::Skip => FieldErrorPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Units {
    /// Total momentum
    Total,
    /// Momentum per nucleon
    PerNucleon,
}

impl Units {
    /// Generator layout in the cms with these units.
    pub fn cms_layout(self) -> RowLayout {
        let units = match self {
            Units::Total => MomentumUnits::Total,
            Units::PerNucleon => MomentumUnits::PerNucleon,
        };
        RowLayout::Raw { units, frame: Frame::Cms }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Layout {
    /// Generator rows (per-nucleon cms momenta)
    Raw,
    /// Filtered rows, Microball particles
    Uball,
    /// Filtered rows, HiRA particles
    Hira,
}

impl From<Layout> for RowLayout {
    fn from(v: Layout) -> Self {
        match v {
            Layout::Raw => RowLayout::GENERATOR,
            Layout::Uball => RowLayout::Filtered { array: DetectorArray::Uball },
            Layout::Hira => RowLayout::Filtered { array: DetectorArray::Hira },
        }
    }
}
