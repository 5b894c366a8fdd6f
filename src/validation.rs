//! Independent quality checks on a solved eigenpair set.
//!
//! After each problem in a sequence is solved, the driver verifies the
//! returned `(V, Λ)` against two numerical invariants, computed without
//! trusting anything the solver reports about itself:
//!
//! - **Residual norm** `‖H·V − V·Λ‖`: how far the candidate eigenpairs are
//!   from exactly satisfying the eigenproblem.
//! - **Orthogonality deviation** `‖VᴴV − I‖`: how far the eigenvectors are
//!   from mutual orthonormality.
//!
//! Both are max-absolute-entry norms over complex moduli (the LAPACK `'M'`
//! convention), restricted to the first `nev` columns of `V`, which hold the
//! wanted eigenpairs rather than the extra search directions. A converged orthonormal
//! solution drives both values toward the noise floor for the problem size
//! and working precision; the checks are observational and never abort a run.
//!
//! All functions here are pure readers of `H`, `V`, and `Λ`. Scratch
//! buffers are private to each call.

use faer::{c64, linalg::matmul::matmul, Accum, Mat, MatRef, Par};

/// The two per-problem quality metrics handed to the reporting collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationMetrics {
    pub residual: f64,
    pub orthogonality: f64,
}

/// Computes both quality metrics for one solved problem.
pub fn validate(h: MatRef<'_, c64>, v: MatRef<'_, c64>, lambda: &[f64], nev: usize) -> ValidationMetrics {
    ValidationMetrics {
        residual: residual_norm(h, v, lambda, nev),
        orthogonality: orthogonality_norm(v, nev),
    }
}

/// Residual norm `‖H·V − V·Λ‖` over the first `nev` columns of `V`.
///
/// The scratch matrix starts as the wanted columns of `V` with column `k`
/// scaled by `−Λ[k]`, then accumulates `H·V` on top, so the max-entry norm of
/// the result is exactly the max-entry norm of `H·V − V·diag(Λ)`.
pub fn residual_norm(h: MatRef<'_, c64>, v: MatRef<'_, c64>, lambda: &[f64], nev: usize) -> f64 {
    let n = h.nrows();
    debug_assert_eq!(h.ncols(), n, "H must be square");
    debug_assert!(nev <= v.ncols() && nev <= lambda.len());

    let v_nev = v.subcols(0, nev);
    let mut w = Mat::from_fn(n, nev, |i, j| v_nev[(i, j)] * -lambda[j]);
    matmul(
        w.as_mut(),
        Accum::Add,
        h,
        v_nev,
        c64::new(1.0, 0.0),
        Par::Seq,
    );
    max_abs_entry(w.as_ref())
}

/// Orthogonality deviation `‖VᴴV − I‖` over the first `nev` columns of `V`.
pub fn orthogonality_norm(v: MatRef<'_, c64>, nev: usize) -> f64 {
    debug_assert!(nev <= v.ncols());

    let v_nev = v.subcols(0, nev);
    // U starts as -I and accumulates the Gram matrix on top.
    let mut u = Mat::from_fn(nev, nev, |i, j| {
        if i == j {
            c64::new(-1.0, 0.0)
        } else {
            c64::new(0.0, 0.0)
        }
    });
    matmul(
        u.as_mut(),
        Accum::Add,
        v_nev.adjoint(),
        v_nev,
        c64::new(1.0, 0.0),
        Par::Seq,
    );
    max_abs_entry(u.as_ref())
}

/// Induced 1-norm: the maximum absolute column sum.
pub fn one_norm(m: MatRef<'_, c64>) -> f64 {
    let mut max = 0.0f64;
    for j in 0..m.ncols() {
        let mut sum = 0.0;
        for i in 0..m.nrows() {
            sum += m[(i, j)].norm();
        }
        if sum > max {
            max = sum;
        }
    }
    max
}

/// Norm-based scale estimate handed to the solver, floored at 1.0 so a
/// near-zero matrix never produces a degenerate scaling reference.
pub fn scale_hint(m: MatRef<'_, c64>) -> f64 {
    one_norm(m).max(1.0)
}

/// Max-absolute-entry norm over complex moduli, LAPACK `'M'` style.
fn max_abs_entry(m: MatRef<'_, c64>) -> f64 {
    let mut max = 0.0f64;
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            let a = m[(i, j)].norm();
            if a > max {
                max = a;
            }
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(n: usize) -> Mat<c64> {
        Mat::from_fn(n, n, |i, j| {
            if i == j {
                c64::new(1.0, 0.0)
            } else {
                c64::new(0.0, 0.0)
            }
        })
    }

    /// First `ncols` standard basis vectors as columns.
    fn basis_columns(n: usize, ncols: usize) -> Mat<c64> {
        Mat::from_fn(n, ncols, |i, j| {
            if i == j {
                c64::new(1.0, 0.0)
            } else {
                c64::new(0.0, 0.0)
            }
        })
    }

    #[test]
    fn test_exact_eigenpairs_of_the_identity() {
        let h = identity(4);
        let v = basis_columns(4, 2);
        let metrics = validate(h.as_ref(), v.as_ref(), &[1.0, 1.0], 2);
        assert!(metrics.residual < 1e-15, "residual: {}", metrics.residual);
        assert!(
            metrics.orthogonality < 1e-15,
            "orthogonality: {}",
            metrics.orthogonality
        );
    }

    #[test]
    fn test_residual_equals_the_eigenvalue_error_magnitude() {
        let h = identity(4);
        let v = basis_columns(4, 2);
        // Exact eigenvectors with wrong eigenvalues: the residual column is
        // (1 - lambda) * e_k, so the max entry is exactly |1 - lambda|.
        let resd = residual_norm(h.as_ref(), v.as_ref(), &[2.0, 2.0], 2);
        assert!((resd - 1.0).abs() < 1e-15, "resd: {resd}");
        let resd = residual_norm(h.as_ref(), v.as_ref(), &[3.0, 3.0], 2);
        assert!((resd - 2.0).abs() < 1e-15, "resd: {resd}");
        // The orthogonality check does not look at the eigenvalues at all.
        let orth = orthogonality_norm(v.as_ref(), 2);
        assert!(orth < 1e-15, "orth: {orth}");
    }

    #[test]
    fn test_residual_is_sensitive_to_every_input_entry() {
        let h = identity(4);
        let v = basis_columns(4, 2);
        let baseline = residual_norm(h.as_ref(), v.as_ref(), &[1.0, 1.0], 2);

        let mut v_perturbed = v.clone();
        v_perturbed[(3, 1)] = c64::new(0.0, 0.5);
        let bumped = residual_norm(h.as_ref(), v_perturbed.as_ref(), &[1.0, 1.0], 2);
        assert!(bumped > baseline, "perturbing V must move the residual");

        let bumped = residual_norm(h.as_ref(), v.as_ref(), &[1.0, 1.0 + 1e-6], 2);
        assert!(bumped > baseline, "perturbing lambda must move the residual");
    }

    #[test]
    fn test_residual_ignores_the_extra_search_columns() {
        let h = identity(4);
        // Garbage in column nev..: must not affect the metric.
        let mut v = basis_columns(4, 3);
        v[(0, 2)] = c64::new(7.0, -7.0);
        let resd = residual_norm(h.as_ref(), v.as_ref(), &[1.0, 1.0, 0.0], 2);
        assert!(resd < 1e-15, "resd: {resd}");
    }

    #[test]
    fn test_orthogonality_flags_duplicated_columns() {
        let n = 4;
        let mut v = basis_columns(n, 2);
        for i in 0..n {
            v[(i, 1)] = v[(i, 0)];
        }
        let orth = orthogonality_norm(v.as_ref(), 2);
        // The off-diagonal Gram entry of two equal unit columns is 1.
        assert!((orth - 1.0).abs() < 1e-15, "orth: {orth}");
    }

    #[test]
    fn test_orthogonality_sees_complex_phases() {
        // Columns (e1, i*e1) are unit length but far from orthogonal.
        let mut v = Mat::from_fn(3, 2, |_, _| c64::new(0.0, 0.0));
        v[(0, 0)] = c64::new(1.0, 0.0);
        v[(0, 1)] = c64::new(0.0, 1.0);
        let orth = orthogonality_norm(v.as_ref(), 2);
        assert!((orth - 1.0).abs() < 1e-15, "orth: {orth}");
    }

    #[test]
    fn test_one_norm_takes_the_worst_column() {
        let mut m = Mat::from_fn(2, 2, |_, _| c64::new(0.0, 0.0));
        m[(0, 0)] = c64::new(1.0, 0.0);
        m[(1, 0)] = c64::new(-2.0, 0.0);
        m[(0, 1)] = c64::new(0.0, 0.5);
        assert!((one_norm(m.as_ref()) - 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_scale_hint_never_degenerates() {
        let zero = Mat::from_fn(3, 3, |_, _| c64::new(0.0, 0.0));
        assert_eq!(scale_hint(zero.as_ref()), 1.0);

        let mut big = Mat::from_fn(3, 3, |_, _| c64::new(0.0, 0.0));
        big[(0, 0)] = c64::new(5.0, 0.0);
        assert_eq!(scale_hint(big.as_ref()), 5.0);
    }
}
