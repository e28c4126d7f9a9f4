//! Flat per-event output record.
//!
//! One row of the collection's event table. Every field whose defining
//! object is absent holds [`SENTINEL`]; the `*_present` flags say so
//! explicitly for the lepton slots.

use crate::selection::{Jet, Lepton, PhysicsObject};
use crate::utils::config::{SENTINEL, SENTINEL_INT};
use serde::{Deserialize, Serialize};

/// Kinematics of one lepton slot (leading or subleading)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeptonSlot {
    pub present: bool,
    #[serde(rename = "PID")]
    pub pid: i32,
    #[serde(rename = "Pt")]
    pub pt: f64,
    #[serde(rename = "Eta")]
    pub eta: f64,
    #[serde(rename = "Phi")]
    pub phi: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "Px")]
    pub px: f64,
    #[serde(rename = "Py")]
    pub py: f64,
    #[serde(rename = "Pz")]
    pub pz: f64,
    #[serde(rename = "E")]
    pub e: f64,
}

impl LeptonSlot {
    pub fn absent() -> Self {
        Self {
            present: false,
            pid: SENTINEL_INT,
            pt: SENTINEL,
            eta: SENTINEL,
            phi: SENTINEL,
            m: SENTINEL,
            px: SENTINEL,
            py: SENTINEL,
            pz: SENTINEL,
            e: SENTINEL,
        }
    }

    pub fn from_lepton(lepton: Option<&Lepton>) -> Self {
        let Some(lepton) = lepton else {
            return Self::absent();
        };
        let p4 = lepton.p4();
        Self {
            present: true,
            pid: lepton.pid,
            pt: p4.pt(),
            eta: p4.eta(),
            phi: p4.phi(),
            m: p4.m(),
            px: p4.px,
            py: p4.py,
            pz: p4.pz,
            e: p4.e,
        }
    }
}

/// pT / eta / phi of one "leading"-style jet slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JetSlot {
    #[serde(rename = "PT")]
    pub pt: f64,
    #[serde(rename = "Eta")]
    pub eta: f64,
    #[serde(rename = "Phi")]
    pub phi: f64,
}

impl JetSlot {
    pub fn absent() -> Self {
        Self {
            pt: SENTINEL,
            eta: SENTINEL,
            phi: SENTINEL,
        }
    }

    pub fn from_jet(jet: Option<&Jet>) -> Self {
        match jet {
            Some(jet) => {
                let p4 = jet.p4();
                Self {
                    pt: p4.pt(),
                    eta: p4.eta(),
                    phi: p4.phi(),
                }
            }
            None => Self::absent(),
        }
    }
}

/// One event as seen by a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "MET")]
    pub met: f64,
    #[serde(rename = "METPhi")]
    pub met_phi: f64,
    #[serde(rename = "MET_invismu")]
    pub met_invismu: f64,
    #[serde(rename = "METPhi_invismu")]
    pub met_phi_invismu: f64,

    #[serde(rename = "nElec")]
    pub n_elec: i32,
    #[serde(rename = "nMuon")]
    pub n_muon: i32,
    #[serde(rename = "nTau")]
    pub n_tau: i32,
    #[serde(rename = "nbjet")]
    pub n_bjet: i32,
    #[serde(rename = "njet")]
    pub n_jet: i32,
    #[serde(rename = "nLep")]
    pub n_lep: i32,

    pub lep1: LeptonSlot,
    pub lep2: LeptonSlot,

    pub tau1: JetSlot,
    pub j1: JetSlot,
    pub j2: JetSlot,
    pub mjj: f64,
    pub bj1: JetSlot,
    pub bj2: JetSlot,

    /// Transverse mass of the leading lepton and MET
    #[serde(rename = "mT")]
    pub mt: f64,
    /// Best chi-square of the b-jet pairing
    pub chi2_hh: f64,
    /// Mass of the highest summed-pT b-jet pair
    pub m_bb: f64,
    /// Summed pT of that pair
    #[serde(rename = "H_b")]
    pub h_b: f64,

    pub weight: f64,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            met: SENTINEL,
            met_phi: SENTINEL,
            met_invismu: SENTINEL,
            met_phi_invismu: SENTINEL,
            n_elec: 0,
            n_muon: 0,
            n_tau: 0,
            n_bjet: 0,
            n_jet: 0,
            n_lep: 0,
            lep1: LeptonSlot::absent(),
            lep2: LeptonSlot::absent(),
            tau1: JetSlot::absent(),
            j1: JetSlot::absent(),
            j2: JetSlot::absent(),
            mjj: SENTINEL,
            bj1: JetSlot::absent(),
            bj2: JetSlot::absent(),
            mt: SENTINEL,
            chi2_hh: SENTINEL,
            m_bb: SENTINEL,
            h_b: SENTINEL,
            weight: 0.0,
        }
    }
}

/// Value or sentinel
pub fn or_sentinel(value: Option<f64>) -> f64 {
    value.unwrap_or(SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_uses_sentinels() {
        let record = EventRecord::default();
        assert_eq!(record.lep1.pt, SENTINEL);
        assert_eq!(record.lep1.pid, SENTINEL_INT);
        assert!(!record.lep1.present);
        assert_eq!(record.mjj, SENTINEL);
        assert_eq!(record.chi2_hh, SENTINEL);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(EventRecord::default()).unwrap();
        assert!(value.get("MET_invismu").is_some());
        assert!(value.get("nbjet").is_some());
        assert!(value["lep1"].get("PID").is_some());
        assert!(value["bj2"].get("PT").is_some());
    }
}
