//! Output writers for aggregated collections.
//!
//! This module handles writing data to disk and to the terminal:
//! - JSON collection documents
//! - Text yield summaries

pub mod json;
pub mod summary;

// Re-export main functions
pub use json::{collections_to_string, read_collections, write_collections};
pub use summary::{collection_yield, generate_text_summary};
