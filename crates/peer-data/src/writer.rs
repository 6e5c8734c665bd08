//! CSV output for the compiled grid.

use std::io::Write;
use std::path::Path;

use peer_core::error::{PeerError, Result};
use peer_core::models::OutputGrid;
use tracing::debug;

/// Write `grid` to `path`, replacing any existing file.
///
/// Missing parent directories are created. A failure part-way through may
/// leave a truncated file behind.
pub fn write_csv(grid: &OutputGrid, path: &Path) -> Result<()> {
    let write_err = |source: std::io::Error| PeerError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file = std::fs::File::create(path).map_err(write_err)?;
    encode_grid(grid, file).map_err(|source| PeerError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Wrote {} rows to {}", grid.rows().len(), path.display());
    Ok(())
}

/// Encode `grid` as comma-separated records, one per row.
pub fn encode_grid<W: Write>(grid: &OutputGrid, output: W) -> std::result::Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(output);
    for row in grid.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
