//! Output module for run reporting
//!
//! Mirrored pages themselves are written by the storage module; this module
//! only reports what a run did.

mod stats;

pub use stats::{log_summary, RunSummary};
