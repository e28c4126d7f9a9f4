//! Selected physics objects.
//!
//! Raw records are converted once into these types, with the
//! four-momentum precomputed, so that every downstream quantity reads
//! the same numbers.

use crate::kinematics::FourMomentum;
use crate::parser::{RawJet, RawLepton, RawMissingEt};
use serde::{Deserialize, Serialize};

/// Common read-only view of a reconstructed object
pub trait PhysicsObject {
    fn pt(&self) -> f64;
    fn eta(&self) -> f64;
    fn phi(&self) -> f64;
    fn p4(&self) -> FourMomentum;
}

/// Lepton flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    Electron,
    Muon,
}

impl Flavor {
    /// PDG code of the negatively charged lepton
    pub fn pdg_code(self) -> i32 {
        match self {
            Flavor::Electron => 11,
            Flavor::Muon => 13,
        }
    }
}

/// A selected electron or muon
#[derive(Debug, Clone, PartialEq)]
pub struct Lepton {
    pub flavor: Flavor,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub charge: i32,
    /// Particle ID, taken from the truth link or derived from the charge
    pub pid: i32,
    p4: FourMomentum,
}

impl Lepton {
    /// Convert a raw lepton (massless, as Delphes builds lepton P4)
    pub fn from_raw(raw: &RawLepton, flavor: Flavor) -> Self {
        let pid = raw.pid.unwrap_or(-flavor.pdg_code() * raw.charge);
        Self {
            flavor,
            pt: raw.pt,
            eta: raw.eta,
            phi: raw.phi,
            charge: raw.charge,
            pid,
            p4: FourMomentum::from_pt_eta_phi_m(raw.pt, raw.eta, raw.phi, 0.0),
        }
    }
}

impl PhysicsObject for Lepton {
    fn pt(&self) -> f64 {
        self.pt
    }
    fn eta(&self) -> f64 {
        self.eta
    }
    fn phi(&self) -> f64 {
        self.phi
    }
    fn p4(&self) -> FourMomentum {
        self.p4
    }
}

/// A jet, with its position in the raw jet collection
#[derive(Debug, Clone, PartialEq)]
pub struct Jet {
    /// Index into the raw event's jet list
    pub index: usize,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub btag: bool,
    pub tau_tag: bool,
    p4: FourMomentum,
}

impl Jet {
    pub fn from_raw(index: usize, raw: &RawJet) -> Self {
        Self {
            index,
            pt: raw.pt,
            eta: raw.eta,
            phi: raw.phi,
            mass: raw.mass,
            btag: raw.btag,
            tau_tag: raw.tau_tag,
            p4: FourMomentum::from_pt_eta_phi_m(raw.pt, raw.eta, raw.phi, raw.mass),
        }
    }
}

impl PhysicsObject for Jet {
    fn pt(&self) -> f64 {
        self.pt
    }
    fn eta(&self) -> f64 {
        self.eta
    }
    fn phi(&self) -> f64 {
        self.phi
    }
    fn p4(&self) -> FourMomentum {
        self.p4
    }
}

/// Missing-energy four-vector (massless)
pub fn met_p4(raw: &RawMissingEt) -> FourMomentum {
    FourMomentum::from_pt_eta_phi_m(raw.met, raw.eta, raw.phi, 0.0)
}

/// Copy of `objects` sorted by descending pT; ties keep encounter order
pub fn sorted_by_pt<T: PhysicsObject + Clone>(objects: &[T]) -> Vec<T> {
    let mut sorted = objects.to_vec();
    sorted.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
    sorted
}
