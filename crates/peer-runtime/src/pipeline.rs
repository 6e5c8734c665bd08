//! Synchronous compile pipeline.
//!
//! Enumerates the input directory, merges every decodable CSV file into one
//! [`PeerStore`], filters it to the configured month, zero-fills it and
//! writes the resulting matrix. Per-file failures are logged and skipped;
//! enumeration and output failures abort the run.

use std::path::PathBuf;

use peer_core::error::Result;
use peer_core::models::{OutputGrid, PeerStore};
use peer_core::settings::PipelineConfig;
use peer_data::aggregator::PeerAggregator;
use peer_data::analysis::{fill_missing, filter_by_period};
use peer_data::matrix::serialize;
use peer_data::reader::{find_csv_files, read_csv};
use peer_data::writer::write_csv;
use serde::Serialize;
use tracing::{debug, info, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// An input file that contributed nothing to the result.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// `.csv` files found in the input directory.
    pub files_discovered: usize,
    /// Files merged into the store.
    pub files_merged: usize,
    /// Files skipped because they could not be read or decoded.
    pub skipped: Vec<SkippedFile>,
    /// Cells written by the merges.
    pub cells_inserted: usize,
    /// Cells dropped because an earlier file already had them.
    pub cells_discarded: usize,
    /// Cells set to `"0"` by the densifier.
    pub cells_filled: usize,
    /// Hosts in the final grid.
    pub hosts: usize,
    /// Dates in the final grid.
    pub dates: usize,
    /// Where the grid was written, once it has been.
    pub output_path: Option<PathBuf>,
}

// ── PeerPipeline ──────────────────────────────────────────────────────────────

/// Runs the whole merge → filter → fill → serialize → write chain.
pub struct PeerPipeline {
    config: PipelineConfig,
}

impl PeerPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compile the grid and write it to the configured output path.
    pub fn run(&self) -> Result<RunReport> {
        let (grid, mut report) = self.compile()?;

        write_csv(&grid, &self.config.output_path)?;
        report.output_path = Some(self.config.output_path.clone());

        info!(
            "Wrote {} hosts x {} dates to {}",
            report.hosts,
            report.dates,
            self.config.output_path.display()
        );
        match serde_json::to_string(&report) {
            Ok(json) => debug!("Run report: {}", json),
            Err(e) => debug!("Run report could not be serialized: {}", e),
        }
        Ok(report)
    }

    /// Build the output grid without writing it.
    pub fn compile(&self) -> Result<(OutputGrid, RunReport)> {
        let mut report = RunReport::default();

        let merged = self.collect(&mut report)?;

        let mut filtered = filter_by_period(&merged, &self.config.month);
        report.cells_filled = fill_missing(&mut filtered);
        report.hosts = filtered.len();
        report.dates = filtered.dates().len();

        debug!(
            "Month {}: {} hosts, {} dates, {} cells zero-filled",
            self.config.month, report.hosts, report.dates, report.cells_filled
        );

        Ok((serialize(&filtered, self.config.layout), report))
    }

    /// Merge every readable input file into a fresh store.
    ///
    /// Files are merged in sorted path order, so on conflicting readings the
    /// file that sorts first wins.
    pub fn collect(&self, report: &mut RunReport) -> Result<PeerStore> {
        let files = find_csv_files(&self.config.input_dir)?;
        report.files_discovered = files.len();

        if files.is_empty() {
            warn!("No CSV files found in {}", self.config.input_dir.display());
        }

        let mut store = PeerStore::new();
        for path in files {
            let merged = read_csv(&path).and_then(|table| PeerAggregator::merge(&mut store, &table));
            match merged {
                Ok(stats) => {
                    debug!(
                        "File {}: {} inserted, {} discarded",
                        path.display(),
                        stats.inserted,
                        stats.discarded
                    );
                    report.files_merged += 1;
                    report.cells_inserted += stats.inserted;
                    report.cells_discarded += stats.discarded;
                }
                Err(e) if !e.is_fatal() => {
                    warn!("Failed to read from {}: {}", path.display(), e);
                    report.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Merged {} of {} files ({} hosts)",
            report.files_merged,
            report.files_discovered,
            store.len()
        );
        Ok(store)
    }
}

/// Run the pipeline once for `config`.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    PeerPipeline::new(config.clone()).run()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
