//! Sequential Hermitian eigenproblem driver with independent solution validation.
//!
//! This crate processes an ordered sequence of dense Hermitian eigenproblems
//! stored as raw binary files. For each problem index it selects an
//! initialization strategy (fresh random eigenvectors, approximate
//! eigenpairs read from disk, or the carried-over solution of the previous
//! problem), delegates the solve to an external collaborator behind the
//! [`EigenSolver`] trait, and then independently verifies the returned
//! solution through two numerical invariants:
//!
//! - the **residual norm** `‖H·V − V·Λ‖`, and
//! - the **orthogonality deviation** `‖VᴴV − I‖`,
//!
//! both as max-absolute-entry norms over the wanted eigenpairs. The metrics,
//! together with the solver's performance counters, go to a run profile that
//! can either record a new baseline or compare the run against a stored one.
//!
//! Built on the [`faer`] linear algebra framework; matrices are column-major
//! [`faer::Mat`] buffers allocated once per run and reused across iterations.
//!
//! ## Validating a solution
//!
//! The validation engine is usable on its own. Exact eigenpairs drive both
//! metrics to the noise floor:
//!
//! ```rust
//! use eigenseq::validation::{orthogonality_norm, residual_norm};
//! use faer::{c64, Mat};
//!
//! // Two exact eigenpairs of the 4x4 identity: standard basis columns with
//! // eigenvalue 1.
//! let zero = c64::new(0.0, 0.0);
//! let one = c64::new(1.0, 0.0);
//! let h = Mat::from_fn(4, 4, |i, j| if i == j { one } else { zero });
//! let v = Mat::from_fn(4, 2, |i, j| if i == j { one } else { zero });
//! let lambda = [1.0, 1.0];
//!
//! assert!(residual_norm(h.as_ref(), v.as_ref(), &lambda, 2) < 1e-14);
//! assert!(orthogonality_norm(v.as_ref(), 2) < 1e-14);
//! ```
//!
//! ## Driving a sequence
//!
//! A full run wires a [`DriverConfig`], a solver, and a [`RunProfile`]
//! together; see the `seqeig` binary for the complete command-line surface.
//! Matrix, eigenvector, and eigenvalue files follow the naming protocol in
//! [`io`], reproduced byte for byte from the historical data sets this crate
//! consumes.

// Declare the modules that form the crate's API structure.
pub mod driver;
pub mod error;
pub mod io;
pub mod report;
pub mod solver;
pub mod utils;
pub mod validation;

// Re-export the main API for convenient access.
pub use driver::{DriverConfig, InitMode, InitStrategy, SequenceDriver, RANDOM_SEED};
pub use error::DriverError;
pub use report::{ReportMode, ReportSummary, RunProfile};
pub use solver::{DenseSolver, EigenSolver, PerfCounters, SolverConfig};
pub use validation::ValidationMetrics;
