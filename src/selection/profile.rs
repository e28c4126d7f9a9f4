//! Kinematic thresholds used to classify raw objects.

use crate::utils::config::{CutConfig, HIGH_LUMI_BJET_ETA};

/// Object selection thresholds
///
/// A threshold of 0 disables the cut. A pT cut `c` keeps `pt > c`, an
/// |eta| cut `c` keeps `|eta| < c`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionProfile {
    pub electron_pt: f64,
    pub electron_eta: f64,
    pub muon_pt: f64,
    pub muon_eta: f64,
    pub jet_pt: f64,
    pub jet_eta: f64,
    /// Explicit b-jet |eta| cut; `None` follows the jet |eta| cut
    pub bjet_eta: Option<f64>,
    pub high_lumi: bool,
}

impl SelectionProfile {
    /// Profile with every cut disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a profile from the `[cuts]` config table
    ///
    /// **Public** - muon cuts default to the electron cuts when unset
    pub fn from_cuts(cuts: &CutConfig) -> Self {
        let electron_pt = cuts.e_pt_cut.unwrap_or(0.0);
        let electron_eta = cuts.e_eta_cut.unwrap_or(0.0);
        Self {
            electron_pt,
            electron_eta,
            muon_pt: cuts.mu_pt_cut.unwrap_or(electron_pt),
            muon_eta: cuts.mu_eta_cut.unwrap_or(electron_eta),
            jet_pt: cuts.jet_pt_cut.unwrap_or(0.0),
            jet_eta: cuts.jet_eta_cut.unwrap_or(0.0),
            bjet_eta: cuts.bjet_eta_cut,
            high_lumi: cuts.high_lumi,
        }
    }

    pub fn with_electron_cuts(mut self, pt: f64, eta: f64) -> Self {
        self.electron_pt = pt;
        self.electron_eta = eta;
        self
    }

    pub fn with_muon_cuts(mut self, pt: f64, eta: f64) -> Self {
        self.muon_pt = pt;
        self.muon_eta = eta;
        self
    }

    pub fn with_jet_cuts(mut self, pt: f64, eta: f64) -> Self {
        self.jet_pt = pt;
        self.jet_eta = eta;
        self
    }

    pub fn with_bjet_eta(mut self, eta: f64) -> Self {
        self.bjet_eta = Some(eta);
        self
    }

    pub fn with_high_lumi(mut self, high_lumi: bool) -> Self {
        self.high_lumi = high_lumi;
        self
    }

    /// The b-jet |eta| cut in force
    ///
    /// Fixed at 4.0 for the high-luminosity detector, otherwise the
    /// explicit b-jet cut or, failing that, the jet cut.
    pub fn active_bjet_eta(&self) -> f64 {
        if self.high_lumi {
            HIGH_LUMI_BJET_ETA
        } else {
            self.bjet_eta.unwrap_or(self.jet_eta)
        }
    }

    pub fn accepts_electron(&self, pt: f64, eta: f64) -> bool {
        passes_pt(pt, self.electron_pt) && passes_eta(eta, self.electron_eta)
    }

    pub fn accepts_muon(&self, pt: f64, eta: f64) -> bool {
        passes_pt(pt, self.muon_pt) && passes_eta(eta, self.muon_eta)
    }

    pub fn accepts_jet(&self, pt: f64, eta: f64) -> bool {
        passes_pt(pt, self.jet_pt) && passes_eta(eta, self.jet_eta)
    }

    pub fn accepts_bjet_eta(&self, eta: f64) -> bool {
        passes_eta(eta, self.active_bjet_eta())
    }
}

fn passes_pt(pt: f64, cut: f64) -> bool {
    cut <= 0.0 || pt > cut
}

fn passes_eta(eta: f64, cut: f64) -> bool {
    cut <= 0.0 || eta.abs() < cut
}
