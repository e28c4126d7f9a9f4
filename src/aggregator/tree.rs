//! Nodes of the collection tree and their snapshots.

use super::category::CategoryIndex;
use super::collection::{Aggregator, CollectionSnapshot};
use super::group::AggregatorGroup;
use crate::selection::NormalizedEvent;
use crate::utils::error::AggregationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Operations shared by every node of a collection tree
pub trait Aggregatable {
    /// Account one event in this node (and its children)
    fn fill(&mut self, event: &NormalizedEvent, weight: f64) -> Result<(), AggregationError>;

    /// Add another node of the same shape into this one
    fn merge(&mut self, other: &Self) -> Result<(), AggregationError>;

    /// Derive end-of-stream quantities
    fn finalize(&mut self) -> Result<(), AggregationError> {
        Ok(())
    }

    /// Return to the freshly booked state
    fn reset(&mut self);

    /// Move per-event rows of `other` after ours, key by key
    fn append_rows(&mut self, other: &mut Self);

    /// Self-contained copy of the current state
    fn write(&self) -> Snapshot;
}

/// A child of an [`AggregatorGroup`]
#[derive(Debug, Clone)]
pub enum Node {
    Collection(Aggregator),
    Group(AggregatorGroup),
    Categories(CategoryIndex),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Collection(agg) => agg.tag(),
            Node::Group(group) => group.name(),
            Node::Categories(index) => index.name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Collection(_) => "collection",
            Node::Group(_) => "group",
            Node::Categories(_) => "category index",
        }
    }

    pub fn as_collection(&self) -> Option<&Aggregator> {
        match self {
            Node::Collection(agg) => Some(agg),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&AggregatorGroup> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_categories(&self) -> Option<&CategoryIndex> {
        match self {
            Node::Categories(index) => Some(index),
            _ => None,
        }
    }

    fn mismatch(&self, other: &Node) -> AggregationError {
        AggregationError::StructureMismatch {
            key: self.name().to_string(),
            expected: self.kind(),
            found: other.kind(),
        }
    }
}

impl From<Aggregator> for Node {
    fn from(agg: Aggregator) -> Self {
        Node::Collection(agg)
    }
}

impl From<AggregatorGroup> for Node {
    fn from(group: AggregatorGroup) -> Self {
        Node::Group(group)
    }
}

impl From<CategoryIndex> for Node {
    fn from(index: CategoryIndex) -> Self {
        Node::Categories(index)
    }
}

impl Aggregatable for Node {
    fn fill(&mut self, event: &NormalizedEvent, weight: f64) -> Result<(), AggregationError> {
        match self {
            Node::Collection(agg) => Ok(agg.fill(event, weight)?),
            Node::Group(group) => group.fill(event, weight),
            Node::Categories(index) => index.fill(event, weight),
        }
    }

    fn merge(&mut self, other: &Self) -> Result<(), AggregationError> {
        if self.kind() != other.kind() {
            return Err(self.mismatch(other));
        }
        match (self, other) {
            (Node::Collection(a), Node::Collection(b)) => a.merge(b),
            (Node::Group(a), Node::Group(b)) => a.merge(b),
            (Node::Categories(a), Node::Categories(b)) => a.merge(b),
            _ => Ok(()),
        }
    }

    fn finalize(&mut self) -> Result<(), AggregationError> {
        match self {
            Node::Collection(_) => Ok(()),
            Node::Group(group) => group.finalize(),
            Node::Categories(index) => index.finalize(),
        }
    }

    fn reset(&mut self) {
        match self {
            Node::Collection(agg) => agg.reset(),
            Node::Group(group) => group.reset(),
            Node::Categories(index) => index.reset(),
        }
    }

    fn append_rows(&mut self, other: &mut Self) {
        match (self, other) {
            (Node::Collection(a), Node::Collection(b)) => a.append_rows(b),
            (Node::Group(a), Node::Group(b)) => a.append_rows(b),
            (Node::Categories(a), Node::Categories(b)) => a.append_rows(b),
            _ => {}
        }
    }

    fn write(&self) -> Snapshot {
        match self {
            Node::Collection(agg) => Snapshot::Collection(agg.write()),
            Node::Group(group) => group.write(),
            Node::Categories(index) => index.write(),
        }
    }
}

/// Which kind of node produced a [`GroupSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Group,
    Categories,
}

/// Snapshot of a group or category index, children in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub name: String,
    pub kind: GroupKind,
    pub children: IndexMap<String, Snapshot>,
}

impl GroupSnapshot {
    /// Collection under a `/`-separated key path, e.g. `"all_events/inclusive"`
    pub fn find(&self, path: &str) -> Option<&CollectionSnapshot> {
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        match (self.children.get(head)?, rest) {
            (Snapshot::Collection(c), None) => Some(c),
            (Snapshot::Group(g), Some(rest)) => g.find(rest),
            _ => None,
        }
    }

    /// Every collection in the tree with its key path, depth-first
    pub fn collections(&self) -> Vec<(String, &CollectionSnapshot)> {
        let mut out = Vec::new();
        self.collect_into("", &mut out);
        out
    }

    fn collect_into<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a CollectionSnapshot)>) {
        for (key, child) in &self.children {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}/{}", prefix, key)
            };
            match child {
                Snapshot::Collection(c) => out.push((path, c)),
                Snapshot::Group(g) => g.collect_into(&path, out),
            }
        }
    }
}

/// Serialized form of any [`Node`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Snapshot {
    Collection(CollectionSnapshot),
    Group(GroupSnapshot),
}

impl Snapshot {
    pub fn as_group(&self) -> Option<&GroupSnapshot> {
        match self {
            Snapshot::Group(g) => Some(g),
            Snapshot::Collection(_) => None,
        }
    }
}
