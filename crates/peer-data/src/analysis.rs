//! Month filtering and zero-filling of the peer store.

use peer_core::models::{PeerStore, Period, ZERO_FILL};
use tracing::debug;

/// Keep only the readings whose date label starts with `period`.
///
/// This is a plain string prefix test, not a calendar comparison: `"2023-1"`
/// also matches `"2023-10-01"`. Use [`filter_by_period`] for a validated
/// month. Hosts left without any reading are dropped from the result.
pub fn filter_by_month(store: &PeerStore, period: &str) -> PeerStore {
    let mut filtered = PeerStore::new();

    for (host, dates) in store.iter() {
        for (date, value) in dates {
            if date.starts_with(period) {
                filtered.insert_if_absent(host, date, value);
            }
        }
    }

    debug!(
        "Month filter {:?}: kept {} of {} cells across {} hosts",
        period,
        filtered.cell_count(),
        store.cell_count(),
        filtered.len()
    );

    filtered
}

/// [`filter_by_month`] for a validated `YYYY-MM` [`Period`].
pub fn filter_by_period(store: &PeerStore, period: &Period) -> PeerStore {
    filter_by_month(store, period.as_str())
}

/// Give every host a value for every date present anywhere in the store.
///
/// Missing and empty cells become `"0"`. Hosts are never added and the set
/// of dates is never widened. Returns the number of cells written.
pub fn fill_missing(store: &mut PeerStore) -> usize {
    let all_dates = store.dates();
    let mut filled = 0;

    for (_, dates) in store.iter_mut() {
        for date in &all_dates {
            let cell = dates.entry(date.clone()).or_default();
            if cell.is_empty() {
                *cell = ZERO_FILL.to_string();
                filled += 1;
            }
        }
    }

    filled
}

// ── Tests ─────────────────────────────────────────────────────────────────────
