//! Weighted aggregation of selected events into collections.
//!
//! This module turns normalized events into:
//! - Weighted histograms with sums of squared weights (`histogram`)
//! - Per-event flat records (`record`)
//! - Collections, groups and jet-multiplicity categories (`collection`, `group`, `category`)
//! - b-jet pairing results (`pairing`)

pub mod category;
pub mod collection;
pub mod group;
pub mod histogram;
pub mod pairing;
pub mod record;
pub mod tree;

// Re-export main types
pub use category::CategoryIndex;
pub use collection::{Aggregator, CollectionSnapshot};
pub use group::AggregatorGroup;
pub use histogram::Histogram;
pub use pairing::{BestPair, PairAssignment, PairAssignmentSolver, PairingResult};
pub use record::{EventRecord, JetSlot, LeptonSlot};
pub use tree::{Aggregatable, GroupKind, GroupSnapshot, Node, Snapshot};
