//! Canonical selected-object view of one raw event.

use super::objects::{met_p4, sorted_by_pt, Flavor, Jet, Lepton};
use super::profile::SelectionProfile;
use crate::kinematics::FourMomentum;
use crate::parser::RawEvent;
use crate::utils::error::EventError;

/// One raw event after object selection
///
/// Built once per raw event and never mutated afterwards.
///
/// Jets are classified in priority order: tau-tagged jets go to `taus`
/// and nowhere else; the remaining jets go to `b_tags` (b flag and b-jet
/// |eta| cut) and, independently, to `jets` (generic cut). `excl_jets` is
/// the part of `jets` carrying neither flag. A jet therefore appears in at
/// most one of `taus`, `b_tags`, `excl_jets`.
#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    weight: f64,
    missing_energy: Option<FourMomentum>,
    electrons: Vec<Lepton>,
    muons: Vec<Lepton>,
    leptons: Vec<Lepton>,
    sorted_leptons: Vec<Lepton>,
    taus: Vec<Jet>,
    b_tags: Vec<Jet>,
    jets: Vec<Jet>,
    excl_jets: Vec<Jet>,
    sorted_jets: Vec<Jet>,
}

impl NormalizedEvent {
    /// Apply a selection profile to a raw event
    ///
    /// **Public** - main entry point for object selection
    ///
    /// A missing generator weight becomes 0; a missing MET source stays
    /// absent and is only reported when a quantity needs it.
    pub fn new(raw: &RawEvent, profile: &SelectionProfile) -> Self {
        let weight = raw.weight.unwrap_or(0.0);
        let missing_energy = raw.missing_et.as_ref().map(met_p4);

        let electrons: Vec<Lepton> = raw
            .electrons
            .iter()
            .filter(|e| profile.accepts_electron(e.pt, e.eta))
            .map(|e| Lepton::from_raw(e, Flavor::Electron))
            .collect();

        let muons: Vec<Lepton> = raw
            .muons
            .iter()
            .filter(|m| profile.accepts_muon(m.pt, m.eta))
            .map(|m| Lepton::from_raw(m, Flavor::Muon))
            .collect();

        let leptons: Vec<Lepton> = electrons.iter().chain(muons.iter()).cloned().collect();
        let sorted_leptons = sorted_by_pt(&leptons);

        let mut taus = Vec::new();
        let mut b_tags = Vec::new();
        let mut jets = Vec::new();
        let mut excl_jets = Vec::new();

        for (index, raw_jet) in raw.jets.iter().enumerate() {
            let jet = Jet::from_raw(index, raw_jet);

            if jet.tau_tag {
                taus.push(jet);
                continue;
            }

            if jet.btag && profile.accepts_bjet_eta(jet.eta) {
                b_tags.push(jet.clone());
            }

            if profile.accepts_jet(jet.pt, jet.eta) {
                if !jet.btag {
                    excl_jets.push(jet.clone());
                }
                jets.push(jet);
            }
        }

        let sorted_jets = sorted_by_pt(&jets);

        Self {
            weight,
            missing_energy,
            electrons,
            muons,
            leptons,
            sorted_leptons,
            taus,
            b_tags,
            jets,
            excl_jets,
            sorted_jets,
        }
    }

    /// Generator weight, 0 when the input carried none
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn missing_energy(&self) -> Option<&FourMomentum> {
        self.missing_energy.as_ref()
    }

    /// Missing energy for a quantity that cannot be computed without it
    ///
    /// # Errors
    /// * `EventError::MissingMet` - The event has no MET source
    pub fn require_met(&self, quantity: &'static str) -> Result<FourMomentum, EventError> {
        self.missing_energy.ok_or(EventError::MissingMet(quantity))
    }

    pub fn electrons(&self) -> &[Lepton] {
        &self.electrons
    }

    pub fn muons(&self) -> &[Lepton] {
        &self.muons
    }

    /// Electrons then muons, in encounter order
    pub fn leptons(&self) -> &[Lepton] {
        &self.leptons
    }

    /// Leptons by descending pT
    pub fn sorted_leptons(&self) -> &[Lepton] {
        &self.sorted_leptons
    }

    pub fn taus(&self) -> &[Jet] {
        &self.taus
    }

    pub fn b_tags(&self) -> &[Jet] {
        &self.b_tags
    }

    pub fn jets(&self) -> &[Jet] {
        &self.jets
    }

    pub fn excl_jets(&self) -> &[Jet] {
        &self.excl_jets
    }

    pub fn sorted_jets(&self) -> &[Jet] {
        &self.sorted_jets
    }
}
