//! hicspec CLI

mod args;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use hs_core::ReactionSystem;
use hs_detector::{HiraConfig, MicroballConfig};
use hs_hist::NeutronSource;
use hs_pipeline::{
    FilterRun, SpectraArtifact, SpectraBuilder, SpectraRun, YieldOptions, YieldReport, pair_files,
};

use args::{CutArgs, Layout, RunArgs, Units, load_masses};

#[derive(Parser)]
#[command(name = "hicspec")]
#[command(about = "hicspec - transport-model spectra for heavy-ion collisions")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run generator events through the Microball and HiRA acceptance
    Filter {
        /// Reaction label, e.g. Ca48Ni64E140
        #[arg(short, long)]
        reaction: String,

        /// Raw generator tables (NDJSON), read as one chain
        #[arg(short, long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,

        /// Output filtered table (NDJSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Microball geometry, thresholds and per-reaction setup (YAML/JSON)
        #[arg(long, default_value = "config/microball_e15190.yaml")]
        microball_config: PathBuf,

        /// HiRA window and thresholds (YAML/JSON). Defaults to the built-in setup.
        #[arg(long)]
        hira_config: Option<PathBuf>,

        /// Momentum units of the input rows
        #[arg(long, value_enum, default_value = "per-nucleon")]
        units: Units,

        /// Extra nuclide masses (YAML/JSON list of {z, a, mass})
        #[arg(long)]
        mass_table: Option<PathBuf>,
    },

    /// Spectra from one primary table and its decay-sampled table
    Spectra {
        /// Reaction label, e.g. Ca48Ni64E140
        #[arg(short, long)]
        reaction: String,

        /// Primary table (NDJSON)
        #[arg(long)]
        primary: PathBuf,

        /// Decay-sampled table (NDJSON)
        #[arg(long)]
        decayed: PathBuf,

        /// Output spectra (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Momentum units of the primary table
        #[arg(long, value_enum, default_value = "per-nucleon")]
        primary_units: Units,

        /// Momentum units of the decay-sampled table
        #[arg(long, value_enum, default_value = "per-nucleon")]
        decayed_units: Units,

        #[command(flatten)]
        cut: CutArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Spectra aggregated over several primary/decay-sampled file pairs
    Anal {
        /// Reaction label, e.g. Ca48Ni64E140
        #[arg(short, long)]
        reaction: String,

        /// Primary tables
        #[arg(long, num_args = 1.., required = true)]
        primary: Vec<PathBuf>,

        /// Decay-sampled tables, one per primary table
        #[arg(long, num_args = 1.., required = true)]
        decayed: Vec<PathBuf>,

        /// Output spectra (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Row layout of every input table
        #[arg(long, value_enum, default_value = "raw")]
        layout: Layout,

        /// Threads (0 = auto). Use 1 for deterministic output.
        #[arg(long, default_value = "1")]
        threads: usize,

        #[command(flatten)]
        cut: CutArgs,

        #[command(flatten)]
        run: RunArgs,
    },

    /// pt spectra, n/p ratio, chemical temperature and coalescence sums from a spectra file
    Yields {
        /// Spectra file written by `spectra` or `anal`
        #[arg(short, long)]
        input: PathBuf,

        /// Output report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Set to analyse (prim, seq or seq1)
        #[arg(long, default_value = "prim")]
        set: String,

        /// Normalized-rapidity window, lower edge
        #[arg(long, default_value = "0.4")]
        y_min: f64,

        /// Normalized-rapidity window, upper edge
        #[arg(long, default_value = "0.6")]
        y_max: f64,

        /// pt range lower edge (MeV/c)
        #[arg(long, default_value = "0.0")]
        pt_min: f64,

        /// pt range upper edge (MeV/c)
        #[arg(long, default_value = "600.0")]
        pt_max: f64,

        /// Number of pt bins
        #[arg(long, default_value = "30")]
        bins: usize,

        /// Use the simulated neutron spectrum instead of p*t/3He
        #[arg(long)]
        measured_neutrons: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Filter {
            reaction,
            input,
            output,
            microball_config,
            hira_config,
            units,
            mass_table,
        } => cmd_filter(
            &reaction,
            &input,
            &output,
            &microball_config,
            hira_config.as_ref(),
            units,
            mass_table.as_ref(),
        ),
        Commands::Spectra {
            reaction,
            primary,
            decayed,
            output,
            primary_units,
            decayed_units,
            cut,
            run,
        } => cmd_spectra(
            &reaction,
            &primary,
            &decayed,
            &output,
            primary_units,
            decayed_units,
            &cut,
            &run,
        ),
        Commands::Anal { reaction, primary, decayed, output, layout, threads, cut, run } => {
            cmd_anal(&reaction, &primary, &decayed, &output, layout, threads, &cut, &run)
        }
        Commands::Yields {
            input,
            output,
            set,
            y_min,
            y_max,
            pt_min,
            pt_max,
            bins,
            measured_neutrons,
        } => {
            let options = YieldOptions {
                set,
                rapidity: (y_min, y_max),
                pt_range: (pt_min, pt_max),
                bins,
                neutrons: if measured_neutrons {
                    NeutronSource::Measured
                } else {
                    NeutronSource::Pseudo
                },
            };
            cmd_yields(&input, &output, &options)
        }
    }
}

fn parse_reaction(label: &str) -> Result<ReactionSystem> {
    label.parse().with_context(|| format!("bad reaction label '{label}'"))
}

fn require_inputs<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Result<()> {
    for path in paths {
        if !path.is_file() {
            bail!("input file {} does not exist", path.display());
        }
    }
    Ok(())
}

fn cmd_filter(
    reaction: &str,
    inputs: &[PathBuf],
    output: &Path,
    microball_config: &Path,
    hira_config: Option<&PathBuf>,
    units: Units,
    mass_table: Option<&PathBuf>,
) -> Result<()> {
    let reaction = parse_reaction(reaction)?;
    require_inputs(inputs)?;

    let microball = MicroballConfig::from_path(microball_config)
        .with_context(|| format!("failed to load {}", microball_config.display()))?;
    let hira = match hira_config {
        Some(p) => HiraConfig::from_path(p)
            .with_context(|| format!("failed to load {}", p.display()))?,
        None => HiraConfig::default(),
    };

    let summary = FilterRun::new(reaction, microball)
        .masses(load_masses(mass_table)?)
        .hira(hira)
        .layout(units.cms_layout())
        .inputs(inputs.iter().cloned())
        .run(output)
        .context("filter run failed")?;
    tracing::info!(
        events = summary.events,
        skipped = summary.skipped,
        uball_hits = summary.uball_hits,
        hira_hits = summary.hira_hits,
        "filter done"
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_spectra(
    reaction: &str,
    primary: &PathBuf,
    decayed: &PathBuf,
    output: &Path,
    primary_units: Units,
    decayed_units: Units,
    cut: &CutArgs,
    run: &RunArgs,
) -> Result<()> {
    let reaction = parse_reaction(reaction)?;
    require_inputs([primary, decayed])?;

    let result = SpectraBuilder::new(reaction)
        .masses(run.masses()?)
        .cut(cut.to_cut())
        .policy(run.on_field_error.into())
        .primary_layout(primary_units.cms_layout())
        .decayed_layout(decayed_units.cms_layout())
        .add_pair(primary, decayed)
        .run()
        .context("spectra run failed")?;
    write_artifact(&result, output)
}

#[allow(clippy::too_many_arguments)]
fn cmd_anal(
    reaction: &str,
    primary: &[PathBuf],
    decayed: &[PathBuf],
    output: &Path,
    layout: Layout,
    threads: usize,
    cut: &CutArgs,
    run: &RunArgs,
) -> Result<()> {
    let reaction = parse_reaction(reaction)?;
    let pairs = pair_files(primary, decayed)?;
    require_inputs(primary.iter().chain(decayed))?;

    let result = SpectraBuilder::new(reaction)
        .masses(run.masses()?)
        .cut(cut.to_cut())
        .policy(run.on_field_error.into())
        .layout(layout.into())
        .add_pairs(pairs)
        .threads(threads)
        .run()
        .context("analysis run failed")?;
    write_artifact(&result, output)
}

fn cmd_yields(input: &PathBuf, output: &Path, options: &YieldOptions) -> Result<()> {
    require_inputs([input])?;
    let artifact = SpectraArtifact::read(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let report = YieldReport::from_artifact(&artifact, options)
        .with_context(|| format!("yields for set '{}' failed", options.set))?;
    report.write(output).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

fn write_artifact(run: &SpectraRun, output: &Path) -> Result<()> {
    SpectraArtifact::from_run(run)
        .write(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}
