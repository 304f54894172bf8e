//! Storage module for persisting mirrored pages
//!
//! This module handles everything that touches the destination directory:
//! - The filesystem capability trait and its disk implementation
//! - The existence check that makes runs resumable
//! - Writing each page exactly once

mod disk;
mod gate;
mod traits;


pub use disk::DiskStore;
pub use gate::{ensure_persisted, load_saved};
pub use traits::PageStore;
