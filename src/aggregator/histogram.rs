//! Weighted one-dimensional histogram.
//!
//! Mirrors a ROOT TH1 with `Sumw2` enabled: per-bin sums of weights and of
//! squared weights, plus separate underflow/overflow accumulators that are
//! never folded into the visible bins.

use crate::utils::config::HistDef;
use crate::utils::error::AggregationError;
use serde::{Deserialize, Serialize};

/// A 1D histogram with weighted sums and sums of squared weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Histogram name (e.g. "h_all_events_nElec")
    pub name: String,
    /// ROOT-style title "title;x-axis;y-axis"
    pub title: String,
    /// Bin edges (length = n_bins + 1)
    pub bin_edges: Vec<f64>,
    /// Sum of weights per bin
    pub bin_content: Vec<f64>,
    /// Sum of squared weights per bin
    pub sumw2: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    pub underflow_sumw2: f64,
    pub overflow_sumw2: f64,
    /// Number of fill calls, including under/overflow
    pub entries: u64,
}

impl Histogram {
    /// Histogram with `bins` equal-width bins over `[low, high)`
    pub fn regular(
        name: impl Into<String>,
        title: impl Into<String>,
        bins: usize,
        low: f64,
        high: f64,
    ) -> Self {
        let bins = bins.max(1);
        let width = (high - low) / bins as f64;
        let bin_edges = (0..=bins).map(|i| low + width * i as f64).collect();
        Self::with_edges(name, title, bin_edges)
    }

    /// Histogram over explicit, increasing bin edges
    pub fn with_edges(name: impl Into<String>, title: impl Into<String>, bin_edges: Vec<f64>) -> Self {
        let n_bins = bin_edges.len().saturating_sub(1);
        Self {
            name: name.into(),
            title: title.into(),
            bin_edges,
            bin_content: vec![0.0; n_bins],
            sumw2: vec![0.0; n_bins],
            underflow: 0.0,
            overflow: 0.0,
            underflow_sumw2: 0.0,
            overflow_sumw2: 0.0,
            entries: 0,
        }
    }

    /// Book the histogram described by a [`HistDef`] for collection `tag`
    ///
    /// **Public** - keeps the `h_<tag>_<key>` naming of the output files
    pub fn from_def(tag: &str, def: &HistDef) -> Self {
        Self::regular(
            format!("h_{}_{}", tag, def.key),
            format!("{}_{};{}", tag, def.key, def.axis),
            def.bins,
            def.low,
            def.high,
        )
    }

    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }

    /// Add `weight` at `value`
    pub fn fill(&mut self, value: f64, weight: f64) {
        let w2 = weight * weight;
        self.entries += 1;

        match self.find_bin(value) {
            BinLookup::Bin(bin) => {
                self.bin_content[bin] += weight;
                self.sumw2[bin] += w2;
            }
            BinLookup::Underflow => {
                self.underflow += weight;
                self.underflow_sumw2 += w2;
            }
            BinLookup::Overflow => {
                self.overflow += weight;
                self.overflow_sumw2 += w2;
            }
        }
    }

    /// Locate the bin holding `value`; NaN counts as overflow
    fn find_bin(&self, value: f64) -> BinLookup {
        let n_edges = self.bin_edges.len();
        if n_edges < 2 {
            return BinLookup::Overflow;
        }
        if value < self.bin_edges[0] {
            return BinLookup::Underflow;
        }
        if value.is_nan() || value >= self.bin_edges[n_edges - 1] {
            return BinLookup::Overflow;
        }

        // First edge strictly greater than value, minus one
        let upper = self.bin_edges.partition_point(|edge| *edge <= value);
        BinLookup::Bin(upper - 1)
    }

    /// Bin-wise add another histogram with identical binning
    ///
    /// # Errors
    /// * `AggregationError::BinningMismatch` - Bin edges differ
    pub fn merge(&mut self, other: &Histogram) -> Result<(), AggregationError> {
        if self.bin_edges != other.bin_edges {
            return Err(AggregationError::BinningMismatch(self.name.clone()));
        }

        for (sum, add) in self.bin_content.iter_mut().zip(&other.bin_content) {
            *sum += add;
        }
        for (sum, add) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *sum += add;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.underflow_sumw2 += other.underflow_sumw2;
        self.overflow_sumw2 += other.overflow_sumw2;
        self.entries += other.entries;

        Ok(())
    }

    /// Zero every accumulator, keeping the binning
    pub fn reset(&mut self) {
        self.bin_content.iter_mut().for_each(|v| *v = 0.0);
        self.sumw2.iter_mut().for_each(|v| *v = 0.0);
        self.underflow = 0.0;
        self.overflow = 0.0;
        self.underflow_sumw2 = 0.0;
        self.overflow_sumw2 = 0.0;
        self.entries = 0;
    }

    /// Sum of weights over the visible bins
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Sum of weights including under/overflow
    pub fn total_weight(&self) -> f64 {
        self.integral() + self.underflow + self.overflow
    }

    /// Statistical uncertainty of one bin, `sqrt(sumw2)`
    pub fn bin_error(&self, bin: usize) -> Option<f64> {
        self.sumw2.get(bin).map(|w2| w2.sqrt())
    }

    /// Content of the bin containing `value`, if in range
    pub fn content_at(&self, value: f64) -> Option<f64> {
        match self.find_bin(value) {
            BinLookup::Bin(bin) => Some(self.bin_content[bin]),
            _ => None,
        }
    }
}

enum BinLookup {
    Bin(usize),
    Underflow,
    Overflow,
}
