//! Run profile accumulation, persistence, and baseline comparison.
//!
//! The driver hands this collaborator one `(problem index, metric name,
//! value)` triple per registered metric. A profile operates in one of two
//! modes, chosen once for the whole run:
//!
//! - [`ReportMode::Record`]: on [`RunProfile::finish`], all rows are written
//!   out as CSV and become the stored baseline for later runs.
//! - [`ReportMode::Compare`]: on finish, the stored baseline is loaded and
//!   each registered value is checked against it. Deviations come back as
//!   data in the [`ReportSummary`]: a metric outside its expected range is
//!   an observation, not an error. Only unreadable or malformed baselines
//!   error.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Absolute slack for baseline comparison, covering metrics at the noise floor.
const ABS_SLACK: f64 = 1e-9;
/// Relative slack for baseline comparison. Generous on purpose: residual and
/// orthogonality values jitter across BLAS backends and thread counts, and a
/// regression worth flagging moves them by orders of magnitude.
const REL_SLACK: f64 = 0.5;

/// Errors from profile persistence. Metric deviations are never errors.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The stored baseline could not be read or parsed.
    #[error("cannot load baseline profile {}: {}", .path.display(), .source)]
    Baseline {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The recorded profile could not be written.
    #[error("cannot write profile {}: {}", .path.display(), .source)]
    Persist {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Whether this run records a new baseline or compares against a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Record,
    Compare,
}

/// One registered metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub index: usize,
    pub metric: String,
    pub value: f64,
}

/// A registered value that deviates from the stored baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub index: usize,
    pub metric: String,
    /// The stored value, or `None` if the baseline has no such row.
    pub expected: Option<f64>,
    pub actual: f64,
}

/// Outcome of [`RunProfile::finish`].
#[derive(Debug, Default)]
pub struct ReportSummary {
    /// Number of values checked against the baseline (0 in record mode).
    pub compared: usize,
    pub mismatches: Vec<Mismatch>,
}

impl ReportSummary {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Accumulates per-problem metrics for one run.
pub struct RunProfile {
    path: PathBuf,
    mode: ReportMode,
    rows: Vec<ProfileRow>,
}

impl RunProfile {
    pub fn new(path: impl Into<PathBuf>, mode: ReportMode) -> Self {
        Self {
            path: path.into(),
            mode,
            rows: Vec::new(),
        }
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Registers one `(index, metric, value)` triple.
    pub fn register(&mut self, index: usize, metric: &str, value: f64) {
        self.rows.push(ProfileRow {
            index,
            metric: metric.to_string(),
            value,
        });
    }

    /// All rows registered so far, in registration order.
    pub fn rows(&self) -> &[ProfileRow] {
        &self.rows
    }

    /// Persists (record mode) or checks (compare mode) the accumulated rows.
    pub fn finish(self) -> Result<ReportSummary, ProfileError> {
        match self.mode {
            ReportMode::Record => {
                write_rows(&self.path, &self.rows)?;
                Ok(ReportSummary::default())
            }
            ReportMode::Compare => {
                let baseline = load_baseline(&self.path)?;
                let mut summary = ReportSummary {
                    compared: self.rows.len(),
                    ..ReportSummary::default()
                };
                for row in &self.rows {
                    let expected = baseline.get(&(row.index, row.metric.clone())).copied();
                    let ok = expected.is_some_and(|e| within_slack(e, row.value));
                    if !ok {
                        summary.mismatches.push(Mismatch {
                            index: row.index,
                            metric: row.metric.clone(),
                            expected,
                            actual: row.value,
                        });
                    }
                }
                Ok(summary)
            }
        }
    }
}

fn within_slack(expected: f64, actual: f64) -> bool {
    (actual - expected).abs() <= ABS_SLACK + REL_SLACK * expected.abs()
}

fn write_rows(path: &Path, rows: &[ProfileRow]) -> Result<(), ProfileError> {
    let persist_err = |source: csv::Error| ProfileError::Persist {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(persist_err)?;
    for row in rows {
        writer.serialize(row).map_err(persist_err)?;
    }
    writer.flush().map_err(|e| persist_err(csv::Error::from(e)))
}

fn load_baseline(path: &Path) -> Result<HashMap<(usize, String), f64>, ProfileError> {
    let baseline_err = |source: csv::Error| ProfileError::Baseline {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(baseline_err)?;
    let mut baseline = HashMap::new();
    for record in reader.deserialize() {
        let row: ProfileRow = record.map_err(baseline_err)?;
        baseline.insert((row.index, row.metric), row.value);
    }
    Ok(baseline)
}
