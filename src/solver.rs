//! The contract between the sequence driver and the external eigensolver.
//!
//! The driver does not know how eigenproblems are solved. It hands the
//! collaborator a loaded matrix, the buffers holding the initial guess, a
//! numerical scale reference, and a small configuration, and expects refined
//! eigenpairs plus performance counters back. Anything behind that boundary
//! (spectral filtering, subspace iteration, convergence control) is the
//! collaborator's business.
//!
//! [`DenseSolver`] is the reference implementation used by the test suite and
//! the demo binary: a direct self-adjoint decomposition of the full matrix.
//! It exercises the contract, not the iterative algorithm production runs
//! would plug in.

use anyhow::anyhow;
use faer::{c64, MatMut, MatRef, Side};

/// Solver configuration forwarded verbatim to the collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Tolerance for eigenpair convergence.
    pub tol: f64,
    /// Initial filtering degree.
    pub deg: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tol: 1e-10,
            deg: 20,
        }
    }
}

/// Performance counters a solver reports for one solve call, passed through
/// to the reporting collaborator unmodified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerfCounters {
    /// Outer iterations performed.
    pub iterations: usize,
    /// Total vectors run through the filter.
    pub filtered_vecs: usize,
}

/// A blocking eigensolver for dense Hermitian problems.
///
/// # Aliasing contract
///
/// `v` and `lambda` hold the initial guess on entry and the refined solution
/// on return. For the duration of one `solve` call the solver exclusively
/// owns write access to both buffers; the driver neither reads nor aliases
/// them until the call returns. `h` is read-only and must not be modified.
pub trait EigenSolver {
    /// Solves `H·v = λ·v` for the leading eigenpairs, refining the guess in
    /// `(v, lambda)` in place.
    ///
    /// `scale` is a norm-based magnitude reference for `h`, always ≥ 1.
    fn solve(
        &mut self,
        h: MatRef<'_, c64>,
        v: MatMut<'_, c64>,
        lambda: &mut [f64],
        scale: f64,
        config: &SolverConfig,
    ) -> anyhow::Result<PerfCounters>;
}

/// Direct dense reference solver.
///
/// Ignores the initial guess and the filtering degree: a full self-adjoint
/// eigendecomposition is computed and the lowest `lambda.len()` eigenpairs
/// are written back in ascending order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenseSolver;

impl EigenSolver for DenseSolver {
    fn solve(
        &mut self,
        h: MatRef<'_, c64>,
        mut v: MatMut<'_, c64>,
        lambda: &mut [f64],
        _scale: f64,
        _config: &SolverConfig,
    ) -> anyhow::Result<PerfCounters> {
        let n = h.nrows();
        let eig = h
            .self_adjoint_eigen(Side::Lower)
            .map_err(|e| anyhow!("dense eigendecomposition failed: {e:?}"))?;
        let basis = eig.U();
        let values = eig.S();

        // Ascending order, independent of what the decomposition returns.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| values[a].re.total_cmp(&values[b].re));

        let wanted = lambda.len().min(n);
        for (dst, &src) in order.iter().take(wanted).enumerate() {
            lambda[dst] = values[src].re;
            for i in 0..n {
                v[(i, dst)] = basis[(i, src)];
            }
        }

        Ok(PerfCounters {
            iterations: 1,
            filtered_vecs: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation;
    use faer::Mat;

    #[test]
    fn test_dense_solver_recovers_a_diagonal_spectrum() -> anyhow::Result<()> {
        let n = 6;
        let nev = 3;
        // Diagonal Hermitian matrix with a known ascending spectrum.
        let h = Mat::from_fn(n, n, |i, j| {
            if i == j {
                c64::new(i as f64 + 1.0, 0.0)
            } else {
                c64::new(0.0, 0.0)
            }
        });
        let mut v = Mat::from_fn(n, nev, |_, _| c64::new(0.0, 0.0));
        let mut lambda = vec![0.0; nev];

        let counters = DenseSolver.solve(
            h.as_ref(),
            v.as_mut(),
            &mut lambda,
            1.0,
            &SolverConfig::default(),
        )?;
        assert_eq!(counters.iterations, 1);

        for (k, &value) in lambda.iter().enumerate() {
            assert!(
                (value - (k as f64 + 1.0)).abs() < 1e-12,
                "eigenvalue {k}: {value}"
            );
        }
        let metrics = validation::validate(h.as_ref(), v.as_ref(), &lambda, nev);
        assert!(metrics.residual < 1e-12, "residual: {}", metrics.residual);
        assert!(
            metrics.orthogonality < 1e-12,
            "orthogonality: {}",
            metrics.orthogonality
        );
        Ok(())
    }
}
