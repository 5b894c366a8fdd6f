//! The sequence driver: iterates problem indices, prepares each problem's
//! initial guess, delegates solving, and validates and reports every result.
//!
//! A run processes the indices `bgn..=end` in ascending order. For each one
//! the driver picks an initialization strategy, loads the problem matrix,
//! hands everything to the [`EigenSolver`] collaborator, and registers the
//! validation metrics and solver counters with the [`RunProfile`]. Validation
//! never terminates the loop: every requested index runs, and out-of-range
//! metrics surface in the report.
//!
//! In sequence mode each problem's converged `(V, Λ)` seeds the next
//! problem's initial guess without touching the disk: the driver owns the
//! buffers for the lifetime of the run, and a carried-over iteration simply
//! leaves them as the previous solve wrote them.
//!
//! All buffers (`H`, `V`, `Λ`, and the storage-precision read scratch) are
//! allocated once in [`SequenceDriver::new`] and reused for every iteration.

use faer::{c64, Mat};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{
    error::{DriverError, DriverErrorKind},
    io::{FileNaming, FromStored},
    report::RunProfile,
    solver::{EigenSolver, SolverConfig},
    validation,
};

/// Fixed seed for the random initialization path, keeping random-mode runs
/// reproducible across invocations.
pub const RANDOM_SEED: u64 = 2342;

/// Suffix of problem matrix files.
pub const MATRIX_SUFFIX: &str = ".bin";
/// Suffix of approximate eigenvector files.
pub const VECTOR_SUFFIX: &str = ".vct";
/// Suffix of approximate eigenvalue files.
pub const VALUE_SUFFIX: &str = ".vls";

/// How the first (or every non-sequence) problem derives its initial guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    /// Standard-normal random eigenvectors, zero eigenvalues.
    Random,
    /// Approximate eigenpairs read from disk.
    Approximate,
}

/// The per-iteration initialization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStrategy {
    /// Fill `V` with fresh random draws and zero `Λ`.
    Random,
    /// Read `(V, Λ)` approximations from the eigenpair files of the
    /// preceding problem index.
    Approximate,
    /// Reuse `(V, Λ)` exactly as the previous iteration's solve left them.
    CarriedOver,
}

impl InitStrategy {
    /// Selects the strategy for one problem index.
    ///
    /// The first index of a run, and every index of a non-sequence run,
    /// re-derives its guess from the configured mode; all later indices of a
    /// sequence run carry the previous solution over.
    pub fn select(index: usize, bgn: usize, sequence: bool, mode: InitMode) -> Self {
        if index == bgn || !sequence {
            match mode {
                InitMode::Random => Self::Random,
                InitMode::Approximate => Self::Approximate,
            }
        } else {
            Self::CarriedOver
        }
    }
}

/// Configuration for one sequence run.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Problem dimension: matrices are `n × n`.
    pub n: usize,
    /// Wanted number of eigenpairs; only these are validated.
    pub nev: usize,
    /// Extra search dimensions carried alongside the wanted eigenpairs.
    pub nex: usize,
    /// First problem index (inclusive).
    pub bgn: usize,
    /// Last problem index (inclusive).
    pub end: usize,
    /// Spin label for the modern naming scheme.
    pub spin: String,
    /// K-point index for the modern naming scheme.
    pub kpoint: usize,
    /// Directory of the problem matrices, trailing separator included.
    pub path_in: String,
    /// Directory of the approximate eigenpair files; required in approximate mode.
    pub path_eigp: Option<String>,
    /// Initial guess mode for non-carried-over iterations.
    pub mode: InitMode,
    /// Seed each problem with the previous problem's solution.
    pub sequence: bool,
    /// Use the legacy file naming scheme.
    pub legacy: bool,
    /// Forwarded to the solver collaborator.
    pub solver: SolverConfig,
}

impl DriverConfig {
    /// Number of eigenvector columns and eigenvalues carried through a run.
    pub fn block_size(&self) -> usize {
        self.nev + self.nex
    }

    /// Cross-field validation, run before any allocation or I/O.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.bgn > self.end {
            return Err(DriverErrorKind::IndexRange {
                bgn: self.bgn,
                end: self.end,
            }
            .into());
        }
        if self.mode == InitMode::Approximate {
            if self.path_eigp.is_none() {
                return Err(DriverErrorKind::MissingEigenpairPath.into());
            }
            if self.bgn == 0 {
                return Err(DriverErrorKind::ApproximateWithoutPredecessor.into());
            }
        }
        Ok(())
    }
}

/// Drives a sequence of eigenproblems through one solver collaborator.
pub struct SequenceDriver<S> {
    config: DriverConfig,
    solver: S,
    matrices: FileNaming,
    eigenpairs: Option<FileNaming>,
    h: Mat<c64>,
    v: Mat<c64>,
    lambda: Vec<f64>,
    /// Storage-precision scratch for file reads, sized for the matrix block.
    stored: Vec<c64>,
    rng: StdRng,
}

impl<S: EigenSolver> SequenceDriver<S> {
    /// Validates the configuration and allocates all run-lifetime buffers.
    pub fn new(config: DriverConfig, solver: S) -> Result<Self, DriverError> {
        config.validate()?;
        let n = config.n;
        let block = config.block_size();
        let matrices = FileNaming {
            dir: config.path_in.clone(),
            spin: config.spin.clone(),
            kpoint: config.kpoint,
            legacy: config.legacy,
        };
        let eigenpairs = config.path_eigp.clone().map(|dir| FileNaming {
            dir,
            spin: config.spin.clone(),
            kpoint: config.kpoint,
            legacy: config.legacy,
        });
        Ok(Self {
            solver,
            matrices,
            eigenpairs,
            h: Mat::zeros(n, n),
            v: Mat::zeros(n, block),
            lambda: vec![0.0; block],
            // Large enough for both the matrix and the eigenvector block.
            stored: vec![c64::new(0.0, 0.0); n * n.max(block)],
            rng: StdRng::seed_from_u64(RANDOM_SEED),
            config,
        })
    }

    /// Runs the whole sequence, registering four metrics per problem index.
    pub fn run(&mut self, profile: &mut RunProfile) -> Result<(), DriverError> {
        for index in self.config.bgn..=self.config.end {
            self.step(index, profile)?;
        }
        Ok(())
    }

    /// Processes a single problem index.
    fn step(&mut self, index: usize, profile: &mut RunProfile) -> Result<(), DriverError> {
        let strategy =
            InitStrategy::select(index, self.config.bgn, self.config.sequence, self.config.mode);
        self.prepare_guess(index, strategy)?;
        self.load_matrix(index)?;

        let scale = validation::scale_hint(self.h.as_ref());
        let counters = self
            .solver
            .solve(
                self.h.as_ref(),
                self.v.as_mut(),
                &mut self.lambda,
                scale,
                &self.config.solver,
            )
            .map_err(|e| {
                DriverError::from(DriverErrorKind::Solver {
                    index,
                    message: e.to_string(),
                })
            })?;

        let metrics =
            validation::validate(self.h.as_ref(), self.v.as_ref(), &self.lambda, self.config.nev);
        log::info!(
            "problem {index}: resd: {:.3e}\torth: {:.3e}",
            metrics.residual,
            metrics.orthogonality
        );

        profile.register(index, "filteredVecs", counters.filtered_vecs as f64);
        profile.register(index, "iterations", counters.iterations as f64);
        profile.register(index, "resd", metrics.residual);
        profile.register(index, "orth", metrics.orthogonality);
        Ok(())
    }

    /// Applies the initialization strategy to the `(V, Λ)` buffers.
    fn prepare_guess(&mut self, index: usize, strategy: InitStrategy) -> Result<(), DriverError> {
        let n = self.config.n;
        let block = self.config.block_size();
        match strategy {
            InitStrategy::Approximate => {
                let Some(naming) = self.eigenpairs.as_ref() else {
                    return Err(DriverErrorKind::MissingEigenpairPath.into());
                };
                // The eigenpair files of problem `index - 1` approximate the
                // solution of problem `index`. `validate()` rejects bgn == 0.
                let predecessor = index.saturating_sub(1);
                let guess = &mut self.stored[..n * block];
                naming.read_into(predecessor, VECTOR_SUFFIX, guess)?;
                for j in 0..block {
                    for i in 0..n {
                        self.v[(i, j)] = guess[j * n + i];
                    }
                }
                naming.read_into(predecessor, VALUE_SUFFIX, &mut self.lambda)?;
            }
            InitStrategy::Random => {
                for j in 0..block {
                    for i in 0..n {
                        let re: f64 = self.rng.sample(StandardNormal);
                        let im: f64 = self.rng.sample(StandardNormal);
                        self.v[(i, j)] = c64::new(re, im);
                    }
                }
                self.lambda.fill(0.0);
            }
            // The buffers already hold the previous iteration's solution.
            InitStrategy::CarriedOver => {}
        }
        Ok(())
    }

    /// Loads `H` for one index, casting storage precision to working precision.
    fn load_matrix(&mut self, index: usize) -> Result<(), DriverError> {
        let n = self.config.n;
        self.matrices
            .read_into(index, MATRIX_SUFFIX, &mut self.stored[..n * n])?;
        for j in 0..n {
            for i in 0..n {
                self.h[(i, j)] = c64::from_stored(self.stored[j * n + i]);
            }
        }
        Ok(())
    }
}
