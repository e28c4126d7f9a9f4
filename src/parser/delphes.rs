//! Raw detector-level event records.
//!
//! One JSON object per event, with collections named after the Delphes
//! tree branches. Both the snake_case names and the Delphes branch names
//! (`Electron`, `PT`, `BTag`, ...) are accepted.

use serde::{Deserialize, Deserializer, Serialize};

/// A reconstructed electron or muon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLepton {
    #[serde(alias = "PT")]
    pub pt: f64,

    #[serde(alias = "Eta")]
    pub eta: f64,

    #[serde(alias = "Phi")]
    pub phi: f64,

    #[serde(default, alias = "Charge")]
    pub charge: i32,

    /// Generator particle ID, when the truth link was kept
    #[serde(default, alias = "PID", skip_serializing_if = "Option::is_none")]
    pub pid: Option<i32>,
}

/// A reconstructed jet with its tagging flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawJet {
    #[serde(alias = "PT")]
    pub pt: f64,

    #[serde(alias = "Eta")]
    pub eta: f64,

    #[serde(alias = "Phi")]
    pub phi: f64,

    #[serde(default, alias = "Mass")]
    pub mass: f64,

    /// b-tag flag (Delphes stores a bitmask; any non-zero value counts)
    #[serde(default, alias = "BTag", deserialize_with = "deserialize_flag")]
    pub btag: bool,

    #[serde(default, alias = "TauTag", deserialize_with = "deserialize_flag")]
    pub tau_tag: bool,
}

/// The missing transverse energy of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMissingEt {
    #[serde(alias = "MET")]
    pub met: f64,

    #[serde(default, alias = "Eta")]
    pub eta: f64,

    #[serde(alias = "Phi")]
    pub phi: f64,
}

/// One detector-level event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Generator weight (`Event.Weight`); absent for unweighted samples
    #[serde(default, alias = "Weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    #[serde(default, alias = "Electron")]
    pub electrons: Vec<RawLepton>,

    #[serde(default, alias = "Muon")]
    pub muons: Vec<RawLepton>,

    #[serde(default, alias = "Jet")]
    pub jets: Vec<RawJet>,

    #[serde(
        default,
        alias = "MissingET",
        skip_serializing_if = "Option::is_none"
    )]
    pub missing_et: Option<RawMissingEt>,
}

/// Accept `true`/`false` as well as integer bitmasks for tag flags
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}
