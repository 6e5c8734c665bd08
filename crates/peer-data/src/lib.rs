//! Data layer for the relay peer calculator.
//!
//! Discovers and decodes the input CSV files, folds them into a
//! [`PeerStore`](peer_core::PeerStore), filters and zero-fills the result and
//! writes it back out as a sorted matrix.

pub mod aggregator;
pub mod analysis;
pub mod matrix;
pub mod reader;
pub mod writer;

pub use peer_core as core;
