//! Shared types for the relay peer calculator.
//!
//! Holds the data model (raw tables, the peer store, output grids), the
//! error taxonomy and the command-line / file configuration.

pub mod error;
pub mod models;
pub mod settings;

pub use error::{PeerError, Result};
pub use models::{OutputGrid, PeerStore, Period, RawTable};
