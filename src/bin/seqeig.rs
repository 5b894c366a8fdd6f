//! Command-line driver for sequences of dense Hermitian eigenproblems.
//!
//! Reads one matrix per problem index from a directory of raw binary files,
//! solves each problem with the built-in dense reference solver, validates
//! every solution, and records the per-problem metrics into a testing
//! profile, or compares them against a previously recorded one.

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use eigenseq::utils::perf;
use eigenseq::{
    DenseSolver, DriverConfig, InitMode, ReportMode, RunProfile, SequenceDriver, SolverConfig,
};

/// Source of the initial guess for the first (or every non-sequence) problem.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// Fresh standard-normal eigenvectors, zero eigenvalues.
    Random,
    /// Approximate eigenpairs read from `--path-eigp`.
    Approximate,
}

impl From<Mode> for InitMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Random => InitMode::Random,
            Mode::Approximate => InitMode::Approximate,
        }
    }
}

/// Command-line arguments for one validation run.
#[derive(Parser, Debug)]
#[clap(
    name = "seqeig",
    about = "Drives a sequence of dense Hermitian eigenproblems and validates every solution."
)]
struct DriverArgs {
    /// Size of the input matrix.
    #[clap(long)]
    n: usize,

    /// Wanted number of eigenpairs.
    #[clap(long)]
    nev: usize,

    /// Extra search dimensions.
    #[clap(long, default_value_t = 25)]
    nex: usize,

    /// Initial filtering degree handed to the solver.
    #[clap(long, default_value_t = 20)]
    deg: usize,

    /// First problem index of the sequence.
    #[clap(long, default_value_t = 2)]
    bgn: usize,

    /// Last problem index of the sequence (inclusive).
    #[clap(long, default_value_t = 2)]
    end: usize,

    /// Spin label used by the modern file naming scheme.
    #[clap(long, default_value = "d")]
    spin: String,

    /// K-point index used by the modern file naming scheme.
    #[clap(long, default_value_t = 0)]
    kpoint: usize,

    /// Tolerance for eigenpair convergence.
    #[clap(long, default_value_t = 1e-10)]
    tol: f64,

    /// Directory of the input matrices, trailing separator included.
    #[clap(long)]
    path_in: String,

    /// Initial guess mode.
    #[clap(long, value_enum, default_value_t = Mode::Approximate)]
    mode: Mode,

    /// Directory of approximate eigenpairs; required in approximate mode.
    #[clap(long)]
    path_eigp: Option<String>,

    /// Treat the indices as a sequence: each solution seeds the next problem.
    #[clap(long)]
    sequence: bool,

    /// Use the legacy file naming scheme.
    #[clap(long)]
    legacy: bool,

    /// Path of the testing profile to record or compare against.
    #[clap(long)]
    name: PathBuf,

    /// Record a new profile instead of comparing against a stored one.
    #[clap(long)]
    write: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let args = DriverArgs::parse();
    let config = DriverConfig {
        n: args.n,
        nev: args.nev,
        nex: args.nex,
        bgn: args.bgn,
        end: args.end,
        spin: args.spin,
        kpoint: args.kpoint,
        path_in: args.path_in,
        path_eigp: args.path_eigp,
        mode: args.mode.into(),
        sequence: args.sequence,
        legacy: args.legacy,
        solver: SolverConfig {
            tol: args.tol,
            deg: args.deg,
        },
    };

    let report_mode = if args.write {
        ReportMode::Record
    } else {
        ReportMode::Compare
    };
    let mut profile = RunProfile::new(&args.name, report_mode);

    let mut driver = SequenceDriver::new(config, DenseSolver)?;
    driver.run(&mut profile)?;

    let stats = perf::memory_stats();
    log::info!(
        "run complete; resident memory {} KB (peak {} KB)",
        stats.current_kb,
        stats.peak_kb
    );

    let summary = profile.finish()?;
    match report_mode {
        ReportMode::Record => {
            log::info!("profile recorded to {}", args.name.display());
        }
        ReportMode::Compare if summary.is_clean() => {
            log::info!(
                "all {} metrics match the stored profile {}",
                summary.compared,
                args.name.display()
            );
        }
        ReportMode::Compare => {
            for miss in &summary.mismatches {
                match miss.expected {
                    Some(expected) => log::warn!(
                        "problem {} {}: expected {:e}, got {:e}",
                        miss.index,
                        miss.metric,
                        expected,
                        miss.actual
                    ),
                    None => log::warn!(
                        "problem {} {}: not present in the stored profile",
                        miss.index,
                        miss.metric
                    ),
                }
            }
            return Err(anyhow!(
                "{} of {} metrics deviate from the stored profile",
                summary.mismatches.len(),
                summary.compared
            ));
        }
    }
    Ok(())
}
