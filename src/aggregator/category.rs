//! Collections keyed by jet multiplicity.

use super::collection::Aggregator;
use super::tree::{Aggregatable, GroupKind, GroupSnapshot, Snapshot};
use crate::selection::NormalizedEvent;
use crate::utils::config::INCLUSIVE_KEY;
use crate::utils::error::AggregationError;
use log::debug;

/// One collection per jet multiplicity `0..=max`, plus `"inclusive"`
///
/// Events with more than `max` jets land in the `max` bin. The inclusive
/// collection is never filled per event; [`finalize`](Aggregatable::finalize)
/// rebuilds its histograms from the multiplicity bins. Rows and the last
/// record are per-bin only.
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    name: String,
    bins: Vec<Aggregator>,
    inclusive: Aggregator,
    strict_routing: bool,
}

impl CategoryIndex {
    /// Book `max + 1` multiplicity collections and the inclusive one
    ///
    /// **Public** - `make` receives the tag (`<name>_<key>`) of each
    /// collection, so every bin can be booked identically
    pub fn new(name: impl Into<String>, max: usize, make: impl Fn(&str) -> Aggregator) -> Self {
        let name = name.into();
        let bins = (0..=max).map(|k| make(&format!("{}_{}", name, k))).collect();
        let inclusive = make(&format!("{}_{}", name, INCLUSIVE_KEY));

        Self {
            name,
            bins,
            inclusive,
            strict_routing: false,
        }
    }

    pub fn with_strict_routing(mut self, strict: bool) -> Self {
        self.strict_routing = strict;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Highest multiplicity with its own bin
    pub fn max(&self) -> usize {
        self.bins.len() - 1
    }

    /// Multiplicity label of an event: `min(jets, max)`
    pub fn classify(&self, event: &NormalizedEvent) -> String {
        event.jets().len().min(self.max()).to_string()
    }

    /// Keys in output order: `"0"..="max"`, then `"inclusive"`
    pub fn keys(&self) -> Vec<String> {
        (0..self.bins.len())
            .map(|k| k.to_string())
            .chain(std::iter::once(INCLUSIVE_KEY.to_string()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Aggregator> {
        if key == INCLUSIVE_KEY {
            return Some(&self.inclusive);
        }
        self.bin_index(key).map(|k| &self.bins[k])
    }

    /// Position of a canonical multiplicity label; `"06"` or `"+3"` are not labels
    fn bin_index(&self, key: &str) -> Option<usize> {
        key.parse::<usize>()
            .ok()
            .filter(|&k| k < self.bins.len() && k.to_string() == key)
    }

    pub fn inclusive(&self) -> &Aggregator {
        &self.inclusive
    }

    /// Fill the multiplicity bin named `tag`
    ///
    /// # Errors
    /// * `AggregationError::ReservedKey` - `tag` is `"inclusive"`
    /// * `AggregationError::UnregisteredRouteKey` - Unknown tag in strict mode
    /// * `AggregationError::Event` - From the collection fill
    pub fn tag_fill(
        &mut self,
        event: &NormalizedEvent,
        tag: &str,
        weight: f64,
    ) -> Result<bool, AggregationError> {
        if tag == INCLUSIVE_KEY {
            return Err(AggregationError::ReservedKey(tag.to_string()));
        }

        match self.bin_index(tag).map(|k| &mut self.bins[k]) {
            Some(bin) => {
                bin.fill(event, weight)?;
                Ok(true)
            }
            None if self.strict_routing => Err(AggregationError::UnregisteredRouteKey(tag.to_string())),
            None => Ok(false),
        }
    }
}

impl Aggregatable for CategoryIndex {
    /// Route the event to its multiplicity bin
    fn fill(&mut self, event: &NormalizedEvent, weight: f64) -> Result<(), AggregationError> {
        let k = event.jets().len().min(self.max());
        self.bins[k].fill(event, weight)?;
        Ok(())
    }

    /// Bin-wise merge over the multiplicities both sides book
    fn merge(&mut self, other: &Self) -> Result<(), AggregationError> {
        if self.bins.len() != other.bins.len() {
            return Err(AggregationError::StructureMismatch {
                key: self.name.clone(),
                expected: "category index of the same depth",
                found: "category index of another depth",
            });
        }
        for (bin, theirs) in self.bins.iter_mut().zip(&other.bins) {
            bin.merge(theirs)?;
        }
        self.inclusive.merge(&other.inclusive)
    }

    /// Rebuild `"inclusive"` as the sum of bins `0..=max`, in that order
    ///
    /// Idempotent: the inclusive histograms are zeroed first.
    fn finalize(&mut self) -> Result<(), AggregationError> {
        self.inclusive.reset();
        for bin in &self.bins {
            self.inclusive.merge(bin)?;
        }
        debug!(
            "Finalized '{}': {} events in {} bins",
            self.name,
            self.inclusive.events(),
            self.bins.len()
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.bins.iter_mut().for_each(Aggregator::reset);
        self.inclusive.reset();
    }

    fn append_rows(&mut self, other: &mut Self) {
        for (bin, theirs) in self.bins.iter_mut().zip(other.bins.iter_mut()) {
            bin.append_rows(theirs);
        }
    }

    fn write(&self) -> Snapshot {
        let children = self
            .bins
            .iter()
            .enumerate()
            .map(|(k, bin)| (k.to_string(), Snapshot::Collection(bin.write())))
            .chain(std::iter::once((
                INCLUSIVE_KEY.to_string(),
                Snapshot::Collection(self.inclusive.write()),
            )))
            .collect();

        Snapshot::Group(GroupSnapshot {
            name: self.name.clone(),
            kind: GroupKind::Categories,
            children,
        })
    }
}
