//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod process;
pub mod utils;

// Re-export main command functions
pub use process::{
    book_collections, execute_process, validate_args, ProcessArgs, ALL_EVENTS_KEY,
    EVENT_SELECTION_KEY,
};
pub use utils::{display_schema, display_version, validate_collections_file};
