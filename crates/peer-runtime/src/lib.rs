//! Run-time wiring for the relay peer calculator.
//!
//! Exposes the synchronous [`pipeline`] that turns a directory of per-host
//! peer-count CSV files into one compiled monthly matrix.

pub mod pipeline;

pub use pipeline::{run, PeerPipeline, RunReport, SkippedFile};
