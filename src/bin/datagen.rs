//! A data generation utility for creating on-disk eigenproblem sequences.
//!
//! Produces one Hermitian matrix file per problem index in `[bgn, end]`,
//! drifting slowly from a random base matrix so that consecutive problems
//! have nearby spectra (the situation sequence mode exploits), plus the
//! `.vct`/`.vls` approximate-eigenpair files for index `bgn - 1` that an
//! approximate-mode run reads to seed the first problem. The output is
//! directly consumable by `seqeig`:
//!
//! ```text
//! datagen --n 64 --nev 8 --output-dir data
//! seqeig --n 64 --nev 8 --nex 4 --bgn 2 --end 4 --path-in data/ \
//!        --path-eigp data/ --sequence --name data/profile.csv --write
//! ```

use anyhow::{ensure, Context, Result, anyhow};
use clap::Parser;
use faer::{c64, Mat, MatRef};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::path::PathBuf;

use eigenseq::driver::{MATRIX_SUFFIX, VALUE_SUFFIX, VECTOR_SUFFIX};
use eigenseq::io::{self, FileNaming};
use eigenseq::solver::{DenseSolver, EigenSolver, SolverConfig};

/// Relative magnitude of the per-index drift away from the base matrix.
const DRIFT: f64 = 0.01;

/// Command-line interface for the sequence generator.
#[derive(Parser, Debug)]
#[clap(
    name = "datagen",
    about = "Generates a reproducible sequence of Hermitian eigenproblem files."
)]
struct DataGenArgs {
    /// Matrix dimension.
    #[clap(long, default_value_t = 64)]
    n: usize,

    /// Wanted eigenpairs of the consuming run.
    #[clap(long, default_value_t = 8)]
    nev: usize,

    /// Extra search dimensions of the consuming run.
    #[clap(long, default_value_t = 4)]
    nex: usize,

    /// First problem index to generate.
    #[clap(long, default_value_t = 2)]
    bgn: usize,

    /// Last problem index to generate (inclusive).
    #[clap(long, default_value_t = 4)]
    end: usize,

    /// Spin label for the modern naming scheme.
    #[clap(long, default_value = "d")]
    spin: String,

    /// K-point index for the modern naming scheme.
    #[clap(long, default_value_t = 0)]
    kpoint: usize,

    /// Use the legacy naming scheme.
    #[clap(long)]
    legacy: bool,

    /// Seed for the matrix generator, so instances are reproducible.
    #[clap(long, default_value_t = 1)]
    seed: u64,

    /// The directory where the instance files will be saved.
    #[clap(long)]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let args = DataGenArgs::parse();
    ensure!(args.bgn <= args.end, "begin index must not exceed end index");
    ensure!(
        args.bgn >= 1,
        "begin index must be at least 1 so the seed eigenpair files have an index"
    );
    ensure!(
        args.nev + args.nex <= args.n,
        "nev + nex must not exceed the matrix dimension"
    );
    log::info!("generating problem sequence with parameters: {:?}", &args);

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", &args.output_dir))?;
    let naming = FileNaming {
        dir: format!("{}{}", args.output_dir.display(), std::path::MAIN_SEPARATOR),
        spin: args.spin.clone(),
        kpoint: args.kpoint,
        legacy: args.legacy,
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let base = random_hermitian(args.n, &mut rng);
    let perturbation = random_hermitian(args.n, &mut rng);

    // One matrix per index, drifting linearly away from the base.
    for index in args.bgn..=args.end {
        let step = (index - args.bgn) as f64 * DRIFT;
        let h = Mat::from_fn(args.n, args.n, |i, j| {
            base[(i, j)] + perturbation[(i, j)] * step
        });
        let path = naming.resolve(index, MATRIX_SUFFIX);
        io::write_block(&path, &flatten(h.as_ref()))?;
        log::info!("wrote {}", path.display());
    }

    // Exact eigenpairs of the first problem, stored under index bgn - 1 as
    // the approximate seed for the consuming run.
    let block = args.nev + args.nex;
    let mut vectors = Mat::<c64>::zeros(args.n, block);
    let mut values = vec![0.0f64; block];
    DenseSolver.solve(
        base.as_ref(),
        vectors.as_mut(),
        &mut values,
        1.0,
        &SolverConfig::default(),
    )?;

    let vct_path = naming.resolve(args.bgn - 1, VECTOR_SUFFIX);
    io::write_block(&vct_path, &flatten(vectors.as_ref()))?;
    log::info!("wrote {}", vct_path.display());

    let vls_path = naming.resolve(args.bgn - 1, VALUE_SUFFIX);
    io::write_block(&vls_path, &values)?;
    log::info!("wrote {}", vls_path.display());

    log::info!("sequence generation completed successfully");
    Ok(())
}

/// Dense Hermitian matrix with standard-normal entries: `(M + Mᴴ) / 2`.
fn random_hermitian(n: usize, rng: &mut StdRng) -> Mat<c64> {
    let m = Mat::from_fn(n, n, |_, _| {
        let re: f64 = rng.sample(StandardNormal);
        let im: f64 = rng.sample(StandardNormal);
        c64::new(re, im)
    });
    Mat::from_fn(n, n, |i, j| (m[(i, j)] + m[(j, i)].conj()) * 0.5)
}

/// Column-major element order, the layout of every file in the protocol.
fn flatten(m: MatRef<'_, c64>) -> Vec<c64> {
    let mut out = Vec::with_capacity(m.nrows() * m.ncols());
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            out.push(m[(i, j)]);
        }
    }
    out
}
