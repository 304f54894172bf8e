//! State tracking module
//!
//! This module holds the shared visited-URL set and the per-page outcome
//! reported by the crawl pipeline.

mod page_state;
mod visited;

pub use page_state::PageOutcome;
pub use visited::VisitedSet;
