//! URL handling module for linkrank
//!
//! This module resolves references found in pages to absolute URLs and
//! classifies URLs into site partitions.

mod matcher;
mod resolve;

// Re-export main functions
pub use matcher::{classify_partition, matches_any};
pub use resolve::{is_followable, parse_http_url, resolve};
