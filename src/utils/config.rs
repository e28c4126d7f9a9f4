//! Configuration and constants for the analysis.

use crate::utils::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Value written to every record field whose defining object is absent
pub const SENTINEL: f64 = -999.0;

/// Integer flavour of [`SENTINEL`] for count/PID fields
pub const SENTINEL_INT: i32 = -999;

/// Default target luminosity in pb^-1 (1 fb^-1)
pub const DEFAULT_LUMINOSITY: f64 = 1000.0;

/// Target resonance mass for the b-jet pairing search (GeV)
pub const DEFAULT_PAIR_TARGET_MASS: f64 = 120.0;

/// b-jet |eta| acceptance when the high-luminosity detector is selected
pub const HIGH_LUMI_BJET_ETA: f64 = 4.0;

/// Highest jet multiplicity with its own category; more jets saturate into it
pub const DEFAULT_MAX_JET_MULTIPLICITY: usize = 6;

/// Minimum number of selected leptons for the `event_selection` collection
pub const DEFAULT_MIN_LEPTONS: usize = 2;

/// Reserved category key holding the merge of all multiplicity bins
pub const INCLUSIVE_KEY: &str = "inclusive";

/// Events between two progress log lines
pub const PROGRESS_INTERVAL: usize = 10_000;

/// Binning of one booked histogram
#[derive(Debug, Clone, Copy)]
pub struct HistDef {
    /// Short key used inside a collection (e.g. "lePT")
    pub key: &'static str,
    /// Axis title, ROOT-style "title;x-axis;y-axis" minus the tag prefix
    pub axis: &'static str,
    pub bins: usize,
    pub low: f64,
    pub high: f64,
}

const fn def(key: &'static str, axis: &'static str, bins: usize, low: f64, high: f64) -> HistDef {
    HistDef { key, axis, bins, low, high }
}

/// Every histogram booked by a collection, in booking order
pub const HIST_DEFS: &[HistDef] = &[
    // Basics
    def("nElec", "Number of Electrons;Events", 10, 0.0, 10.0),
    def("nMuon", "Number of Muons;Events", 10, 0.0, 10.0),
    def("nTau", "Number of Taus;Events", 10, 0.0, 10.0),
    def("nbjet", "Number of b-jets;Events", 10, 0.0, 10.0),
    def("njet", "Number of jets;Events", 10, 0.0, 10.0),
    def("nLep", "Number of Leptons (e/#mu);Events", 10, 0.0, 10.0),
    // B-jets
    def("bPT", "p_{T,b-jets};Events/(10GeV)", 50, 0.0, 500.0),
    def("bPhi", "#phi(b-jets);Events/(0.4)", 20, -4.0, 4.0),
    def("bEta", "#eta(b-jets);Events/(0.5)", 20, -5.0, 5.0),
    // Jets
    def("jPT", "p_{T,jets};Events/(10GeV)", 50, 0.0, 500.0),
    def("jPhi", "#phi(jets);Events/(0.4)", 20, -4.0, 4.0),
    def("jEta", "#eta(jets);Events/(0.5)", 20, -5.0, 5.0),
    def("mjj", "m(jj);Events/(100 GeV)", 100, 0.0, 10000.0),
    // Electrons
    def("ePT", "p^{e}_{T};Events/(10GeV)", 50, 0.0, 500.0),
    def("ePhi", "#phi(elecs);Events/(0.4)", 20, -4.0, 4.0),
    def("eEta", "#eta(elecs);Events/(0.5)", 20, -5.0, 5.0),
    def("lePT", "p^{lead-e}_{T};Events/(10GeV)", 50, 0.0, 500.0),
    def("lePhi", "#phi(leading-e);Events/(0.4)", 20, -4.0, 4.0),
    def("leEta", "#eta(leading-e);Events/(0.5)", 20, -5.0, 5.0),
    // Muons
    def("mPT", "p^{#mu}_{T};Events/(10GeV)", 50, 0.0, 500.0),
    def("mPhi", "#phi(muons);Events/(0.4)", 20, -4.0, 4.0),
    def("mEta", "#eta(muons);Events/(0.5)", 20, -5.0, 5.0),
    def("lmPT", "p^{lead-#mu}_{T};Events/(10GeV)", 50, 0.0, 500.0),
    def("lmPhi", "#phi(leading-#mu);Events/(0.4)", 20, -4.0, 4.0),
    def("lmEta", "#eta(leading-#mu);Events/(0.5)", 20, -5.0, 5.0),
    // Taus
    def("tPT", "p^{#tau}_{T};Events/(10GeV)", 50, 0.0, 500.0),
    def("tPhi", "#phi(taus);Events/(0.4)", 20, -4.0, 4.0),
    def("tEta", "#eta(taus);Events/(0.5)", 20, -5.0, 5.0),
    def("ltPT", "p^{lead-#tau}_{T};Events/(10GeV)", 50, 0.0, 500.0),
    def("ltPhi", "#phi(leading-#tau);Events/(0.4)", 20, -4.0, 4.0),
    def("ltEta", "#eta(leading-#tau);Events/(0.5)", 20, -5.0, 5.0),
    // MET
    def("MET", "E_{T}^{miss} [GeV];Events/(10 GeV)", 100, 0.0, 1000.0),
    def("MET_invismu", "E_{T}^{miss} [GeV];Events/(10 GeV)", 100, 0.0, 1000.0),
    def("mT", "m_{T}(lead-l, E_{T}^{miss}) [GeV];Events/(10 GeV)", 100, 0.0, 1000.0),
    // b-jet pairing
    def("chi2_hh", "#chi^{2}(bb,bb) [GeV^{2}];Events", 100, 0.0, 20000.0),
    def("m_bb", "m(bb) [GeV];Events/(10 GeV)", 100, 0.0, 1000.0),
    def("H_b", "H_{T}(bb) [GeV];Events/(10 GeV)", 100, 0.0, 1000.0),
];

/// Kinematic cut thresholds as written in the `[cuts]` table
///
/// Absent fields fall back to the selection defaults (see
/// [`crate::selection::SelectionProfile::from_cuts`]).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CutConfig {
    pub e_pt_cut: Option<f64>,
    pub e_eta_cut: Option<f64>,
    pub mu_pt_cut: Option<f64>,
    pub mu_eta_cut: Option<f64>,
    pub jet_pt_cut: Option<f64>,
    pub jet_eta_cut: Option<f64>,
    pub bjet_eta_cut: Option<f64>,
    #[serde(default)]
    pub high_lumi: bool,
}

impl CutConfig {
    /// Cuts used by the standard dilepton preprocessing
    ///
    /// **Public** - applied when no config file is given
    pub fn standard() -> Self {
        Self {
            e_pt_cut: Some(25.0),
            e_eta_cut: Some(2.5),
            mu_pt_cut: Some(25.0),
            mu_eta_cut: Some(2.5),
            jet_pt_cut: Some(25.0),
            jet_eta_cut: Some(4.5),
            bjet_eta_cut: Some(4.0),
            high_lumi: false,
        }
    }
}

/// Complete analysis configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Object selection thresholds
    #[serde(default = "CutConfig::standard")]
    pub cuts: CutConfig,

    /// Highest jet multiplicity category
    #[serde(default = "default_max_jet_multiplicity")]
    pub max_jet_multiplicity: usize,

    /// Minimum selected leptons for `event_selection`
    #[serde(default = "default_min_leptons")]
    pub min_leptons: usize,

    /// Target mass of the b-jet pairing chi-square
    #[serde(default = "default_pair_target_mass")]
    pub pair_target_mass: f64,

    /// Keep one record row per filled event
    #[serde(default = "default_store_rows")]
    pub store_rows: bool,
}

fn default_max_jet_multiplicity() -> usize {
    DEFAULT_MAX_JET_MULTIPLICITY
}

fn default_min_leptons() -> usize {
    DEFAULT_MIN_LEPTONS
}

fn default_pair_target_mass() -> f64 {
    DEFAULT_PAIR_TARGET_MASS
}

fn default_store_rows() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cuts: CutConfig::standard(),
            max_jet_multiplicity: DEFAULT_MAX_JET_MULTIPLICITY,
            min_leptons: DEFAULT_MIN_LEPTONS,
            pair_target_mass: DEFAULT_PAIR_TARGET_MASS,
            store_rows: true,
        }
    }
}

impl AnalysisConfig {
    /// Reject values no analysis can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cuts = [
            ("e_pt_cut", self.cuts.e_pt_cut),
            ("e_eta_cut", self.cuts.e_eta_cut),
            ("mu_pt_cut", self.cuts.mu_pt_cut),
            ("mu_eta_cut", self.cuts.mu_eta_cut),
            ("jet_pt_cut", self.cuts.jet_pt_cut),
            ("jet_eta_cut", self.cuts.jet_eta_cut),
            ("bjet_eta_cut", self.cuts.bjet_eta_cut),
        ];
        for (name, value) in cuts {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ConfigError::InvalidValue(format!(
                        "{} must be a non-negative number, got {}",
                        name, v
                    )));
                }
            }
        }

        if !self.pair_target_mass.is_finite() || self.pair_target_mass <= 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "pair_target_mass must be positive, got {}",
                self.pair_target_mass
            )));
        }

        Ok(())
    }
}

/// Load an analysis config from a TOML file
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::Toml` - If TOML is invalid
/// * `ConfigError::InvalidValue` - If a threshold is negative or not finite
///
/// # Example
/// ```ignore
/// let config = load_config("cuts.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let path = path.as_ref();
    debug!("Loading analysis config from: {}", path.display());

    let contents = fs::read_to_string(path)?;
    let config: AnalysisConfig = toml::from_str(&contents)?;
    config.validate()?;

    Ok(config)
}
