//! CSV file discovery and decoding.
//!
//! Lists the `.csv` files of the input directory and turns each one into a
//! [`RawTable`] for the aggregator.

use std::io::Read;
use std::path::{Path, PathBuf};

use peer_core::error::{PeerError, Result};
use peer_core::models::RawTable;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find the `.csv` files directly inside `input_dir`, sorted by path.
///
/// Sub-directories are not descended into and the suffix match is
/// case-sensitive. Failing to list `input_dir` itself is fatal; an unreadable
/// individual entry is logged and skipped.
pub fn find_csv_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    // WalkDir reports nothing for a plain file once the root is skipped.
    let list_err = |source: std::io::Error| PeerError::ListDir {
        path: input_dir.to_path_buf(),
        source,
    };
    let metadata = std::fs::metadata(input_dir).map_err(list_err)?;
    if !metadata.is_dir() {
        return Err(list_err(std::io::Error::other("not a directory")));
    }

    let mut files: Vec<PathBuf> = Vec::new();

    for entry in walkdir::WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => return Err(list_err(err.into())),
            Err(err) => {
                warn!("Skipping unreadable entry in {}: {}", input_dir.display(), err);
                continue;
            }
        };

        if entry.file_type().is_dir() || !is_csv_name(entry.file_name()) {
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    debug!("Found {} CSV files in {}", files.len(), input_dir.display());
    Ok(files)
}

/// Read and decode one CSV file.
pub fn read_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| PeerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    decode_table(file).map_err(|source| PeerError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode comma-separated text into a [`RawTable`].
///
/// Every record is kept, the header included. Quotes are handled leniently:
/// a stray quote inside an unquoted field is taken literally. Rows of
/// differing length are passed through so the aggregator can report them
/// with their row number.
pub fn decode_table<R: Read>(input: R) -> std::result::Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(rows))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_csv_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|n| n.ends_with(".csv")).unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
