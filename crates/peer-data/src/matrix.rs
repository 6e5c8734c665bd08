//! Conversion of a peer store into a sorted rectangular grid.
//!
//! Hosts and dates are both emitted in ascending order, so the same store
//! always serializes to the same grid.

use peer_core::models::{
    Layout, OutputGrid, PeerStore, DATE_AXIS_LABEL, HOST_AXIS_LABEL, ZERO_FILL,
};

/// Serialize `store` in the requested layout.
pub fn serialize(store: &PeerStore, layout: Layout) -> OutputGrid {
    match layout {
        Layout::HostsByDate => to_grid(store),
        Layout::DatesByHost => to_grid_transposed(store),
    }
}

/// One row per host, one column per date.
///
/// Header: `["Relay/Date", date_1, ..., date_n]`.
pub fn to_grid(store: &PeerStore) -> OutputGrid {
    let columns: Vec<String> = store.dates().into_iter().collect();
    to_grid_with_columns(store, &columns)
}

/// Host rows against an explicit list of date columns.
///
/// Columns are emitted in the order given; a cell the store does not have
/// is written as `"0"`.
pub fn to_grid_with_columns(store: &PeerStore, columns: &[String]) -> OutputGrid {
    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(HOST_AXIS_LABEL.to_string());
    header.extend(columns.iter().cloned());

    let mut grid = OutputGrid::new(header);
    for (host, dates) in store.iter() {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(host.clone());
        row.extend(columns.iter().map(|date| {
            dates
                .get(date)
                .cloned()
                .unwrap_or_else(|| ZERO_FILL.to_string())
        }));
        grid.push_row(row);
    }

    grid
}

/// One row per date, one column per host.
///
/// Header: `["Date", host_1, ..., host_m]`.
pub fn to_grid_transposed(store: &PeerStore) -> OutputGrid {
    let hosts: Vec<&str> = store.hosts().collect();

    let mut header = Vec::with_capacity(hosts.len() + 1);
    header.push(DATE_AXIS_LABEL.to_string());
    header.extend(hosts.iter().map(|h| h.to_string()));

    let mut grid = OutputGrid::new(header);
    for date in store.dates() {
        let mut row = Vec::with_capacity(hosts.len() + 1);
        row.push(date.clone());
        row.extend(
            hosts
                .iter()
                .map(|host| store.get(host, &date).unwrap_or(ZERO_FILL).to_string()),
        );
        grid.push_row(row);
    }

    grid
}

// ── Tests ─────────────────────────────────────────────────────────────────────
