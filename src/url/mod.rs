//! URL handling module for Sumi-Mirror
//!
//! This module maps URLs onto the on-disk mirror layout and decides which
//! discovered links belong to the mirrored site.

mod local_path;
mod scope;

pub use local_path::url_to_local_path;
pub use scope::{is_in_scope, resolve};
