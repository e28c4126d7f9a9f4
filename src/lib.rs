//! Delphes Hists
//!
//! Event selection and weighted histogram collections for simulated
//! collision events in the Delphes detector-level format.
//!
//! This crate provides the core implementation for the
//! `delphes-hists` CLI tool:
//!
//! - [`selection`]: kinematic cuts and the normalized per-event view
//! - [`aggregator`]: weighted histograms, flat records, collection trees
//!   with jet-multiplicity categories, and b-jet pairing
//! - [`parser`] / [`output`]: JSON-lines event input and JSON collection output
//!
//! ## Getting Started
//!
//! ```bash
//! delphes-hists process --input ttbar.jsonl --output ttbar_hists.json --summary
//! ```

pub mod aggregator;
pub mod commands;
pub mod kinematics;
pub mod output;
pub mod parser;
pub mod selection;
pub mod utils;
