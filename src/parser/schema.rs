//! Output JSON schema definitions for aggregated collections.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::aggregator::GroupSnapshot;
use serde::{Deserialize, Serialize};

/// Top-level document written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsFile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Target integrated luminosity (pb^-1)
    pub luminosity: f64,

    /// Target cross-section (pb), if events were reweighted to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_section: Option<f64>,

    /// Scale applied to every generator weight
    pub weight_scale: f64,

    /// Events read from the input
    pub events_processed: u64,

    /// Events that entered the `event_selection` collection
    pub events_selected: u64,

    /// The finalized collection tree
    pub collections: GroupSnapshot,

    /// Timestamp when the file was generated
    pub generated_at: String,
}
