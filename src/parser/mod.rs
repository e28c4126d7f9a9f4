//! Event input parsing and schema definitions.
//!
//! This module handles:
//! - Deserializing raw detector-level events
//! - Resolving and streaming event files
//! - Defining output schema

pub mod delphes;
pub mod event_stream;
pub mod schema;

// Re-export main types
pub use delphes::{RawEvent, RawJet, RawLepton, RawMissingEt};
pub use event_stream::{read_events, resolve_inputs, EventReader};
pub use schema::CollectionsFile;
