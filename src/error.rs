//! This module defines the custom error types for the library.
//!
//! It centralizes the error conditions a sequence run can hit into a single
//! enum behind the public [`DriverError`] type. Configuration and I/O
//! problems abort a run before or during the loop; out-of-range validation
//! metrics are deliberately *not* represented here, since the driver reports
//! them as data rather than raising them.
//!
//! Using the [`thiserror`] crate allows us to create idiomatic error types
//! with minimal boilerplate.

use thiserror::Error;

use crate::io::ReadError;
use crate::report::ProfileError;

/// Represents all possible errors that can occur while driving a problem sequence.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct DriverError(#[from] DriverErrorKind);

/// Private enum containing the distinct kinds of errors.
/// This separation allows for a clean `Display` implementation via [`thiserror`]
/// while keeping the set of variants free to evolve.
#[derive(Error, Debug)]
pub(crate) enum DriverErrorKind {
    /// The configured index range is empty the wrong way around.
    #[error("invalid configuration: begin index {bgn} exceeds end index {end}")]
    IndexRange { bgn: usize, end: usize },

    /// Approximate initialization was requested without a directory to read
    /// the eigenpair files from.
    #[error("invalid configuration: approximate initialization requires an eigenpair path")]
    MissingEigenpairPath,

    /// Approximate initialization reads the eigenpairs of the preceding
    /// problem, which problem 0 does not have.
    #[error("invalid configuration: approximate initialization at problem 0 has no predecessor")]
    ApproximateWithoutPredecessor,

    /// A matrix, eigenvector, or eigenvalue file could not be read.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The external solver reported a failure for one problem index.
    #[error("eigensolver failed on problem {index}: {message}")]
    Solver { index: usize, message: String },

    /// The run profile could not be persisted or the baseline could not be loaded.
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl From<ReadError> for DriverError {
    fn from(err: ReadError) -> Self {
        DriverError(DriverErrorKind::Read(err))
    }
}

impl From<ProfileError> for DriverError {
    fn from(err: ProfileError) -> Self {
        DriverError(DriverErrorKind::Profile(err))
    }
}

// Unit tests to ensure error messages are formatted correctly.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_range_message() {
        let error = DriverError(DriverErrorKind::IndexRange { bgn: 7, end: 2 });
        assert_eq!(
            error.to_string(),
            "invalid configuration: begin index 7 exceeds end index 2"
        );
    }

    #[test]
    fn test_missing_eigenpair_path_message() {
        let error = DriverError(DriverErrorKind::MissingEigenpairPath);
        assert_eq!(
            error.to_string(),
            "invalid configuration: approximate initialization requires an eigenpair path"
        );
    }

    #[test]
    fn test_solver_failure_message() {
        let error = DriverError(DriverErrorKind::Solver {
            index: 3,
            message: "did not converge".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "eigensolver failed on problem 3: did not converge"
        );
    }

    #[test]
    fn test_read_error_is_transparent() {
        let inner = ReadError::Truncated {
            path: "/data/mat_d_00_02.bin".into(),
            expected: 1024,
        };
        let expected_message = inner.to_string();
        let error = DriverError::from(inner);
        assert_eq!(error.to_string(), expected_message);
    }
}
