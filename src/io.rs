//! Binary file protocol for matrices, eigenvectors, and eigenvalues.
//!
//! Problem data lives on disk as headerless, native-endian binary blocks of
//! column-major elements. This module owns the two halves of that contract:
//!
//! - **Naming**: [`FileNaming::resolve`] maps a `(index, suffix)` pair to a
//!   deterministic file name. Two schemes exist, and both must be reproduced
//!   byte for byte for compatibility with existing data sets:
//!   - modern: `<dir>mat_<spin>_<kk>_<ii><suffix>` with zero-padded width-2
//!     k-point and problem indices;
//!   - legacy: `<dir>gmat  1 <ii><suffix>` with the literal `"gmat  1 "`
//!     substring and a space-padded width-2 problem index.
//!
//! - **Transfer**: [`read_block`] and [`write_block`] move exactly
//!   `len * size_of::<T>()` bytes between a file and a typed element buffer,
//!   with no endianness conversion and no framing. A file shorter than the
//!   requested byte count is a hard [`ReadError::Truncated`] error, never a
//!   silent zero-fill.
//!
//! Storage precision and working precision may differ: files always hold
//! double-precision complex elements, and [`convert_block`] performs the
//! explicit element-by-element cast into the working type. Bytes are never
//! reinterpreted across differing element widths.

use std::{
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use bytemuck::Pod;
use faer::{c32, c64};
use thiserror::Error;

/// Errors produced by the binary file protocol. Each variant carries the
/// offending path so an aborted run can report it.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The file could not be opened (missing, permissions, ...).
    #[error("error reading file {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is smaller than the requested element count.
    #[error("truncated read from {}: file holds fewer than the {expected} requested bytes", .path.display())]
    Truncated { path: PathBuf, expected: usize },

    /// An I/O failure occurred mid-read.
    #[error("error reading file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file could not be created or written.
    #[error("error writing file {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Naming context for one directory of problem files.
///
/// The `dir` prefix is concatenated as a string, not joined as a path: the
/// protocol expects the caller to include the trailing separator, and some
/// data sets use bare prefixes rather than directories.
#[derive(Debug, Clone)]
pub struct FileNaming {
    /// Directory (or bare prefix) the files live under, trailing separator included.
    pub dir: String,
    /// Spin label, used by the modern scheme only.
    pub spin: String,
    /// K-point index, used by the modern scheme only.
    pub kpoint: usize,
    /// Select the legacy naming scheme.
    pub legacy: bool,
}

impl FileNaming {
    /// Resolves the file name for one problem index and suffix.
    pub fn resolve(&self, index: usize, suffix: &str) -> PathBuf {
        let name = if self.legacy {
            format!("{}gmat  1 {:>2}{}", self.dir, index, suffix)
        } else {
            format!(
                "{}mat_{}_{:02}_{:02}{}",
                self.dir, self.spin, self.kpoint, index, suffix
            )
        };
        PathBuf::from(name)
    }

    /// Resolves the file for `(index, suffix)` and fills `buf` from it.
    pub fn read_into<T: Pod>(
        &self,
        index: usize,
        suffix: &str,
        buf: &mut [T],
    ) -> Result<(), ReadError> {
        let path = self.resolve(index, suffix);
        log::debug!("reading {}", path.display());
        read_block(&path, buf)
    }
}

/// Reads exactly `buf.len()` elements of raw binary data from `path`.
///
/// The element type only determines the byte count; no conversion of any
/// kind is applied. Oversized files are accepted and only the requested
/// prefix is consumed, matching the historical reader.
pub fn read_block<T: Pod>(path: &Path, buf: &mut [T]) -> Result<(), ReadError> {
    let expected = std::mem::size_of_val(buf);
    let mut file = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    file.read_exact(bytemuck::cast_slice_mut(buf))
        .map_err(|source| match source.kind() {
            io::ErrorKind::UnexpectedEof => ReadError::Truncated {
                path: path.to_path_buf(),
                expected,
            },
            _ => ReadError::Read {
                path: path.to_path_buf(),
                source,
            },
        })
}

/// Writes `buf` to `path` as raw binary, the exact inverse of [`read_block`].
pub fn write_block<T: Pod>(path: &Path, buf: &[T]) -> Result<(), ReadError> {
    let mut file = File::create(path).map_err(|source| ReadError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(bytemuck::cast_slice(buf))
        .map_err(|source| ReadError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Working-precision element types a stored double-precision complex value
/// can be cast into.
pub trait FromStored: Copy {
    fn from_stored(value: c64) -> Self;
}

impl FromStored for c64 {
    #[inline]
    fn from_stored(value: c64) -> Self {
        value
    }
}

impl FromStored for c32 {
    #[inline]
    fn from_stored(value: c64) -> Self {
        c32::new(value.re as f32, value.im as f32)
    }
}

/// Casts a stored block into the working element type, one element at a time.
///
/// # Panics
///
/// Panics if the two slices differ in length; the caller sizes both from the
/// same element count.
pub fn convert_block<T: FromStored>(stored: &[c64], working: &mut [T]) {
    assert_eq!(
        stored.len(),
        working.len(),
        "storage and working buffers must hold the same element count"
    );
    for (dst, src) in working.iter_mut().zip(stored) {
        *dst = T::from_stored(*src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn modern_naming(dir: &str) -> FileNaming {
        FileNaming {
            dir: dir.to_string(),
            spin: "d".to_string(),
            kpoint: 0,
            legacy: false,
        }
    }

    #[test]
    fn test_modern_naming_zero_pads_both_indices() {
        let naming = FileNaming {
            dir: "/data/".to_string(),
            spin: "u".to_string(),
            kpoint: 3,
            legacy: false,
        };
        assert_eq!(
            naming.resolve(7, ".bin"),
            PathBuf::from("/data/mat_u_03_07.bin")
        );
        assert_eq!(
            naming.resolve(42, ".vct"),
            PathBuf::from("/data/mat_u_03_42.vct")
        );
    }

    #[test]
    fn test_legacy_naming_space_pads_the_index() {
        let naming = FileNaming {
            dir: "/data/".to_string(),
            spin: "d".to_string(),
            kpoint: 0,
            legacy: true,
        };
        // Width-2 space padding after the fixed "gmat  1 " literal.
        assert_eq!(
            naming.resolve(3, ".bin"),
            PathBuf::from("/data/gmat  1  3.bin")
        );
        assert_eq!(
            naming.resolve(12, ".vls"),
            PathBuf::from("/data/gmat  1 12.vls")
        );
    }

    #[test]
    fn test_round_trip_is_bit_identical() {
        let dir = tempfile::tempdir().unwrap();
        let naming = modern_naming(&format!("{}/", dir.path().display()));

        let block: Vec<c64> = (0..16)
            .map(|k| c64::new(k as f64 * 0.25 - 1.0, -(k as f64) * 1e-3))
            .collect();
        let path = naming.resolve(5, ".bin");
        write_block(&path, &block).unwrap();

        let mut readback = vec![c64::new(0.0, 0.0); block.len()];
        naming.read_into(5, ".bin", &mut readback).unwrap();
        assert_eq!(readback, block);
    }

    #[test]
    fn test_oversized_file_yields_the_requested_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("block.bin");
        let block: Vec<f64> = (0..8).map(|k| k as f64).collect();
        write_block(&path, &block).unwrap();

        let mut prefix = vec![0.0f64; 4];
        read_block(&path, &mut prefix).unwrap();
        assert_eq!(prefix, &block[..4]);
    }

    #[test]
    fn test_short_file_is_a_truncated_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0u8; 24]).unwrap();
        drop(file);

        let mut buf = vec![c64::new(0.0, 0.0); 4];
        let err = read_block(&path, &mut buf).unwrap_err();
        match err {
            ReadError::Truncated { expected, .. } => assert_eq!(expected, 64),
            other => panic!("expected a truncated read, got: {other}"),
        }
    }

    #[test]
    fn test_missing_file_reports_the_path() {
        let mut buf = [0.0f64; 2];
        let err = read_block(Path::new("/no/such/dir/mat_d_00_01.bin"), &mut buf).unwrap_err();
        assert!(err.to_string().contains("/no/such/dir/mat_d_00_01.bin"));
    }

    #[test]
    fn test_convert_block_narrows_element_by_element() {
        let stored = [c64::new(1.5, -2.5), c64::new(0.0, 4.0)];
        let mut working = [c32::new(0.0, 0.0); 2];
        convert_block(&stored, &mut working);
        assert_eq!(working[0], c32::new(1.5, -2.5));
        assert_eq!(working[1], c32::new(0.0, 4.0));
    }

    #[test]
    fn test_convert_block_is_identity_at_storage_precision() {
        let stored = [c64::new(-0.125, 3.0)];
        let mut working = [c64::new(0.0, 0.0)];
        convert_block(&stored, &mut working);
        assert_eq!(working, stored);
    }
}
