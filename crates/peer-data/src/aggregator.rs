//! Merging decoded tables into the running peer store.
//!
//! The store keeps the first value seen for every (host, date) pair: later
//! rows and later files never overwrite it.

use peer_core::error::{PeerError, Result};
use peer_core::models::{PeerStore, RawTable};

// ── MergeStats ────────────────────────────────────────────────────────────────

/// What one merge did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Cells newly written.
    pub inserted: usize,
    /// Cells dropped because the store already had a value.
    pub discarded: usize,
}

// ── PeerAggregator ────────────────────────────────────────────────────────────

/// Stateless helper that folds raw tables into a [`PeerStore`].
pub struct PeerAggregator;

impl PeerAggregator {
    /// Build a store from a single table.
    ///
    /// Inside the table the first occurrence of a (host, date) pair wins,
    /// whether it repeats through a duplicated host row or a duplicated date
    /// column. A row whose field count differs from the header's is rejected
    /// with [`PeerError::ShapeMismatch`].
    pub fn process_peers(table: &RawTable) -> Result<PeerStore> {
        let mut store = PeerStore::new();

        let Some(header) = table.header() else {
            return Ok(store);
        };

        for (index, row) in table.data_rows() {
            if row.len() != header.len() {
                return Err(PeerError::ShapeMismatch {
                    row: index,
                    expected: header.len(),
                    found: row.len(),
                });
            }

            let Some((host, readings)) = row.split_first() else {
                continue;
            };

            store.ensure_host(host);
            for (date, value) in header[1..].iter().zip(readings) {
                store.insert_if_absent(host, date, value);
            }
        }

        Ok(store)
    }

    /// Merge `table` into `store`.
    ///
    /// The table is validated as a whole before anything is written, so a
    /// rejected table leaves `store` untouched.
    pub fn merge(store: &mut PeerStore, table: &RawTable) -> Result<MergeStats> {
        let incoming = Self::process_peers(table)?;
        Ok(Self::merge_store(store, incoming))
    }

    /// Fold an already-built store into `store`, first value wins.
    pub fn merge_store(store: &mut PeerStore, incoming: PeerStore) -> MergeStats {
        let mut stats = MergeStats::default();

        for (host, dates) in incoming {
            store.ensure_host(&host);
            for (date, value) in dates {
                if store.insert_if_absent(&host, &date, &value) {
                    stats.inserted += 1;
                } else {
                    stats.discarded += 1;
                }
            }
        }

        stats
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
