use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{PeerError, Result};

/// Sentinel written into every cell that has no reading.
pub const ZERO_FILL: &str = "0";

/// Label of the top-left header cell when hosts are rows.
pub const HOST_AXIS_LABEL: &str = "Relay/Date";

/// Label of the top-left header cell when dates are rows.
pub const DATE_AXIS_LABEL: &str = "Date";

// ── RawTable ──────────────────────────────────────────────────────────────────

/// A decoded input table, exactly as the CSV reader produced it.
///
/// Row 0 is the header: its fields from index 1 onward are date labels.
/// In every other row field 0 is the host identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Non-header rows paired with their row index in the table.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, row)| (i, row.as_slice()))
    }
}

impl From<Vec<Vec<String>>> for RawTable {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

// ── PeerStore ─────────────────────────────────────────────────────────────────

/// Readings for one host, keyed by date label.
pub type DateValues = BTreeMap<String, String>;

/// The host → date → value aggregate.
///
/// Both levels are ordered maps, so iteration is always sorted by host and
/// then by date. Values are opaque strings and are never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerStore {
    hosts: BTreeMap<String, DateValues>,
}

impl PeerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Number of hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Total number of (host, date) cells present.
    pub fn cell_count(&self) -> usize {
        self.hosts.values().map(BTreeMap::len).sum()
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }

    pub fn get(&self, host: &str, date: &str) -> Option<&str> {
        self.hosts
            .get(host)
            .and_then(|dates| dates.get(date))
            .map(String::as_str)
    }

    pub fn host(&self, host: &str) -> Option<&DateValues> {
        self.hosts.get(host)
    }

    /// Smallest host key, or `None` for an empty store.
    pub fn first_host(&self) -> Option<&str> {
        self.hosts.keys().next().map(String::as_str)
    }

    /// Host keys in ascending order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    /// The column universe: every distinct date under any host, ascending.
    pub fn dates(&self) -> BTreeSet<String> {
        self.hosts
            .values()
            .flat_map(|dates| dates.keys().cloned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DateValues)> {
        self.hosts.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut DateValues)> {
        self.hosts.iter_mut()
    }

    /// Make sure `host` has an entry, even with no readings yet.
    pub fn ensure_host(&mut self, host: &str) -> &mut DateValues {
        self.hosts.entry(host.to_string()).or_default()
    }

    /// Store `value` for (`host`, `date`) unless a value is already present.
    ///
    /// Returns `true` when the value was stored.
    pub fn insert_if_absent(&mut self, host: &str, date: &str, value: &str) -> bool {
        let dates = self.ensure_host(host);
        if dates.contains_key(date) {
            return false;
        }
        dates.insert(date.to_string(), value.to_string());
        true
    }
}

impl IntoIterator for PeerStore {
    type Item = (String, DateValues);
    type IntoIter = std::collections::btree_map::IntoIter<String, DateValues>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.into_iter()
    }
}

// ── OutputGrid ────────────────────────────────────────────────────────────────

/// A rectangular table of strings ready for the CSV writer.
///
/// Row 0 is the header (axis label followed by the sorted column values).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputGrid {
    rows: Vec<Vec<String>>,
}

impl OutputGrid {
    pub fn new(header: Vec<String>) -> Self {
        Self { rows: vec![header] }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// All rows, header first.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Cells per row, as defined by the header.
    pub fn width(&self) -> usize {
        self.header().len()
    }

    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|row| row.len() == width)
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

// ── Period ────────────────────────────────────────────────────────────────────

/// A validated `YYYY-MM` month used to filter date keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Period(String);

impl Period {
    /// Parse a `YYYY-MM` string, rejecting anything that is not a real month.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let well_formed = s.len() == 7
            && s.as_bytes()[..4].iter().all(u8::is_ascii_digit)
            && s.as_bytes()[4] == b'-'
            && NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").is_ok();
        if !well_formed {
            return Err(PeerError::InvalidPeriod(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Plain prefix match of a date label against this month.
    pub fn contains(&self, date: &str) -> bool {
        date.starts_with(self.0.as_str())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Period {
    type Err = PeerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = PeerError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Which axis of the output grid carries the hosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum Layout {
    /// One row per host, one column per date.
    #[default]
    #[value(name = "hosts")]
    #[serde(rename = "hosts")]
    HostsByDate,
    /// One row per date, one column per host.
    #[value(name = "dates")]
    #[serde(rename = "dates")]
    DatesByHost,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::HostsByDate => f.write_str("hosts"),
            Layout::DatesByHost => f.write_str("dates"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    // ── RawTable ──────────────────────────────────────────────────────────────

    #[test]
    fn test_raw_table_header_and_data_rows() {
        let table = RawTable::new(rows(&[
            &["Relay/Date", "2023-12-01"],
            &["hostA", "1"],
            &["hostB", "2"],
        ]));
        assert_eq!(table.len(), 3);
        assert_eq!(table.header().unwrap()[1], "2023-12-01");
        let indices: Vec<usize> = table.data_rows().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_raw_table_empty() {
        let table = RawTable::default();
        assert!(table.is_empty());
        assert!(table.header().is_none());
        assert_eq!(table.data_rows().count(), 0);
    }

    // ── PeerStore ─────────────────────────────────────────────────────────────

    #[test]
    fn test_insert_if_absent_keeps_first_value() {
        let mut store = PeerStore::new();
        assert!(store.insert_if_absent("hostA", "2023-12-01", "5"));
        assert!(!store.insert_if_absent("hostA", "2023-12-01", "9"));
        assert_eq!(store.get("hostA", "2023-12-01"), Some("5"));
    }

    #[test]
    fn test_insert_if_absent_keeps_empty_string() {
        let mut store = PeerStore::new();
        assert!(store.insert_if_absent("hostA", "2023-12-01", ""));
        assert!(!store.insert_if_absent("hostA", "2023-12-01", "3"));
        assert_eq!(store.get("hostA", "2023-12-01"), Some(""));
    }

    #[test]
    fn test_hosts_are_case_sensitive() {
        let mut store = PeerStore::new();
        store.insert_if_absent("host", "2023-12-01", "1");
        store.insert_if_absent("HOST", "2023-12-01", "2");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_dates_is_sorted_union() {
        let mut store = PeerStore::new();
        store.insert_if_absent("b", "2023-12-03", "1");
        store.insert_if_absent("a", "2023-12-01", "1");
        store.insert_if_absent("a", "2023-12-03", "1");
        let dates: Vec<String> = store.dates().into_iter().collect();
        assert_eq!(dates, vec!["2023-12-01", "2023-12-03"]);
        assert_eq!(store.cell_count(), 3);
    }

    #[test]
    fn test_first_host_is_smallest_key() {
        let mut store = PeerStore::new();
        assert!(store.first_host().is_none());
        store.ensure_host("zeta");
        store.ensure_host("alpha");
        assert_eq!(store.first_host(), Some("alpha"));
        assert!(store.contains_host("zeta"));
    }

    // ── OutputGrid ────────────────────────────────────────────────────────────

    #[test]
    fn test_output_grid_rectangularity() {
        let mut grid = OutputGrid::new(vec!["Relay/Date".into(), "2023-12-01".into()]);
        grid.push_row(vec!["hostA".into(), "1".into()]);
        assert!(grid.is_rectangular());
        assert_eq!(grid.data_rows().len(), 1);
        grid.push_row(vec!["hostB".into()]);
        assert!(!grid.is_rectangular());
    }

    // ── Period ────────────────────────────────────────────────────────────────

    #[test]
    fn test_period_parse_valid() {
        let p = Period::parse("2023-12").unwrap();
        assert_eq!(p.as_str(), "2023-12");
        assert!(p.contains("2023-12-01"));
        assert!(!p.contains("2023-11-30"));
    }

    #[test]
    fn test_period_parse_rejects_ambiguous_prefix() {
        assert!(matches!(
            Period::parse("2023-1"),
            Err(PeerError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_period_parse_rejects_bad_month() {
        assert!(Period::parse("2023-13").is_err());
        assert!(Period::parse("2023/12").is_err());
        assert!(Period::parse("december").is_err());
    }

    #[test]
    fn test_period_deserialize_validates() {
        let p: Period = serde_json::from_str("\"2024-02\"").unwrap();
        assert_eq!(p.to_string(), "2024-02");
        assert!(serde_json::from_str::<Period>("\"2024-2\"").is_err());
    }

    // ── Layout ────────────────────────────────────────────────────────────────

    #[test]
    fn test_layout_serde_names() {
        let layout: Layout = serde_json::from_str("\"dates\"").unwrap();
        assert_eq!(layout, Layout::DatesByHost);
        assert_eq!(Layout::default().to_string(), "hosts");
    }
}
