//! Insertion-ordered tree of collections.

use super::tree::{Aggregatable, GroupKind, GroupSnapshot, Node, Snapshot};
use crate::selection::NormalizedEvent;
use crate::utils::error::AggregationError;
use indexmap::IndexMap;
use log::{debug, warn};

/// Named children, filled together or by key
///
/// Children are registered once; registration order is the order of
/// broadcast fills, merges and written output.
#[derive(Debug, Clone)]
pub struct AggregatorGroup {
    name: String,
    children: IndexMap<String, Node>,
    strict_routing: bool,
}

impl AggregatorGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: IndexMap::new(),
            strict_routing: false,
        }
    }

    /// Make [`tag_fill`](Self::tag_fill) fail on unknown keys instead of
    /// ignoring them
    pub fn with_strict_routing(mut self, strict: bool) -> Self {
        self.strict_routing = strict;
        self
    }

    /// Add a child under `key`
    ///
    /// # Errors
    /// * `AggregationError::DuplicateKey` - `key` is already taken
    pub fn register(&mut self, key: impl Into<String>, node: impl Into<Node>) -> Result<(), AggregationError> {
        let key = key.into();
        if self.children.contains_key(&key) {
            return Err(AggregationError::DuplicateKey(key));
        }
        debug!("Registered '{}' in group '{}'", key, self.name);
        self.children.insert(key, node.into());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.children.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.children.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Fill only the child registered under `tag`
    ///
    /// Returns whether the event was routed. An unknown tag is a silent
    /// no-op unless strict routing is on.
    ///
    /// # Errors
    /// * `AggregationError::UnregisteredRouteKey` - Unknown tag in strict mode
    /// * Any error of the child's fill
    pub fn tag_fill(
        &mut self,
        event: &NormalizedEvent,
        tag: &str,
        weight: f64,
    ) -> Result<bool, AggregationError> {
        match self.children.get_mut(tag) {
            Some(child) => {
                child.fill(event, weight)?;
                Ok(true)
            }
            None if self.strict_routing => Err(AggregationError::UnregisteredRouteKey(tag.to_string())),
            None => Ok(false),
        }
    }
}

impl Aggregatable for AggregatorGroup {
    /// Broadcast to every child in registration order
    fn fill(&mut self, event: &NormalizedEvent, weight: f64) -> Result<(), AggregationError> {
        for child in self.children.values_mut() {
            child.fill(event, weight)?;
        }
        Ok(())
    }

    /// Key-wise merge; keys only present in `other` are ignored
    ///
    /// # Errors
    /// * `AggregationError::StructureMismatch` - Children under one key differ in kind
    /// * `AggregationError::BinningMismatch` - From a histogram merge
    fn merge(&mut self, other: &Self) -> Result<(), AggregationError> {
        for (key, child) in self.children.iter_mut() {
            let Some(theirs) = other.children.get(key) else {
                continue;
            };
            if child.kind() != theirs.kind() {
                return Err(AggregationError::StructureMismatch {
                    key: key.clone(),
                    expected: child.kind(),
                    found: theirs.kind(),
                });
            }
            child.merge(theirs)?;
        }

        for key in other.children.keys().filter(|k| !self.children.contains_key(*k)) {
            warn!("Ignoring '{}' while merging into group '{}': no such key", key, self.name);
        }

        Ok(())
    }

    fn finalize(&mut self) -> Result<(), AggregationError> {
        for child in self.children.values_mut() {
            child.finalize()?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.children.values_mut().for_each(Node::reset);
    }

    fn append_rows(&mut self, other: &mut Self) {
        for (key, child) in self.children.iter_mut() {
            if let Some(theirs) = other.children.get_mut(key) {
                child.append_rows(theirs);
            }
        }
    }

    fn write(&self) -> Snapshot {
        Snapshot::Group(GroupSnapshot {
            name: self.name.clone(),
            kind: GroupKind::Group,
            children: self
                .children
                .iter()
                .map(|(key, child)| (key.clone(), child.write()))
                .collect(),
        })
    }
}
