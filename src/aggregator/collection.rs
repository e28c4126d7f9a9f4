//! A single histogram collection.
//!
//! An [`Aggregator`] books the full histogram set of [`HIST_DEFS`] under a
//! tag, fills it once per event, and keeps the flat record of the last
//! event plus (optionally) one record row per fill.

use super::histogram::Histogram;
use super::pairing::{PairAssignmentSolver, PairingResult};
use super::record::{or_sentinel, EventRecord, JetSlot, LeptonSlot};
use crate::kinematics::{pair_mass, transverse_mass, FourMomentum};
use crate::selection::{sorted_by_pt, Jet, Lepton, NormalizedEvent, PhysicsObject};
use crate::utils::config::HIST_DEFS;
use crate::utils::error::{AggregationError, EventError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serializable state of one collection at write time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub tag: String,
    /// Number of fill calls (unweighted)
    pub events: u64,
    /// Histograms by short key, in booking order
    pub histograms: IndexMap<String, Histogram>,
    /// Record of the most recently filled event
    pub record: EventRecord,
    /// One record per filled event, in fill order
    pub rows: Vec<EventRecord>,
}

/// Histogram bundle plus flat event record
#[derive(Debug, Clone)]
pub struct Aggregator {
    tag: String,
    hists: IndexMap<&'static str, Histogram>,
    record: EventRecord,
    rows: Vec<EventRecord>,
    store_rows: bool,
    events: u64,
    solver: PairAssignmentSolver,
}

/// Every composite quantity of one event, computed once
///
/// Shared by the histogram fill and the record so the two never disagree.
struct Derived {
    met: FourMomentum,
    met_invismu: FourMomentum,
    lep1: Option<Lepton>,
    lep2: Option<Lepton>,
    leading_electron: Option<Lepton>,
    leading_muon: Option<Lepton>,
    leading_tau: Option<Jet>,
    j1: Option<Jet>,
    j2: Option<Jet>,
    bj1: Option<Jet>,
    bj2: Option<Jet>,
    mjj: Option<f64>,
    mt: Option<f64>,
    pairing: PairingResult,
}

impl Derived {
    fn compute(event: &NormalizedEvent, solver: &PairAssignmentSolver) -> Result<Self, EventError> {
        let met = event.require_met("MET")?;
        let muons_p4: FourMomentum = event.muons().iter().map(|m| m.p4()).sum();
        let met_invismu = met + muons_p4;

        let leptons = event.sorted_leptons();
        let lep1 = leptons.first().cloned();
        let lep2 = leptons.get(1).cloned();

        let excl = sorted_by_pt(event.excl_jets());
        let bjets = sorted_by_pt(event.b_tags());

        let mjj = match (excl.first(), excl.get(1)) {
            (Some(a), Some(b)) => Some(pair_mass(&a.p4(), &b.p4())),
            _ => None,
        };
        let mt = lep1.as_ref().map(|l| transverse_mass(&l.p4(), &met));

        Ok(Self {
            met,
            met_invismu,
            lep1,
            lep2,
            leading_electron: sorted_by_pt(event.electrons()).into_iter().next(),
            leading_muon: sorted_by_pt(event.muons()).into_iter().next(),
            leading_tau: sorted_by_pt(event.taus()).into_iter().next(),
            j1: excl.first().cloned(),
            j2: excl.get(1).cloned(),
            bj1: bjets.first().cloned(),
            bj2: bjets.get(1).cloned(),
            mjj,
            mt,
            pairing: solver.solve(event.b_tags()),
        })
    }
}

impl Aggregator {
    /// Book every histogram under `tag`
    ///
    /// **Public** - rows are stored and the default 120 GeV pairing target is used
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let hists = HIST_DEFS
            .iter()
            .map(|def| (def.key, Histogram::from_def(&tag, def)))
            .collect();

        Self {
            tag,
            hists,
            record: EventRecord::default(),
            rows: Vec::new(),
            store_rows: true,
            events: 0,
            solver: PairAssignmentSolver::default(),
        }
    }

    /// Keep (or drop) one record row per fill
    pub fn with_rows(mut self, store_rows: bool) -> Self {
        self.store_rows = store_rows;
        self
    }

    pub fn with_solver(mut self, solver: PairAssignmentSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn histogram(&self, key: &str) -> Option<&Histogram> {
        self.hists.get(key)
    }

    pub fn histograms(&self) -> impl Iterator<Item = (&'static str, &Histogram)> {
        self.hists.iter().map(|(k, h)| (*k, h))
    }

    /// Record of the last filled event (sentinels before the first fill)
    pub fn record(&self) -> &EventRecord {
        &self.record
    }

    pub fn rows(&self) -> &[EventRecord] {
        &self.rows
    }

    /// Number of fill calls since construction or reset
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Account one event with `weight`
    ///
    /// `weight` is independent of the event's generator weight; the caller
    /// decides what to pass. Nothing is mutated when the event is rejected.
    ///
    /// # Errors
    /// * `EventError::MissingMet` - The event has no MET source
    pub fn fill(&mut self, event: &NormalizedEvent, weight: f64) -> Result<(), EventError> {
        let derived = Derived::compute(event, &self.solver)?;

        self.fill_histograms(event, &derived, weight);
        self.record = build_record(event, &derived, weight);
        if self.store_rows {
            self.rows.push(self.record.clone());
        }
        self.events += 1;

        Ok(())
    }

    fn fill_histograms(&mut self, event: &NormalizedEvent, d: &Derived, weight: f64) {
        let n_elec = event.electrons().len();
        let n_muon = event.muons().len();

        self.fill_one("nElec", n_elec as f64, weight);
        self.fill_one("nMuon", n_muon as f64, weight);
        self.fill_one("nTau", event.taus().len() as f64, weight);
        self.fill_one("nbjet", event.b_tags().len() as f64, weight);
        self.fill_one("njet", event.jets().len() as f64, weight);
        self.fill_one("nLep", (n_elec + n_muon) as f64, weight);
        self.fill_one("MET", d.met.pt(), weight);
        self.fill_one("MET_invismu", d.met_invismu.pt(), weight);

        self.fill_each(["bPT", "bEta", "bPhi"], event.b_tags(), weight);
        self.fill_each(["jPT", "jEta", "jPhi"], event.excl_jets(), weight);
        self.fill_each(["ePT", "eEta", "ePhi"], event.electrons(), weight);
        self.fill_each(["mPT", "mEta", "mPhi"], event.muons(), weight);
        self.fill_each(["tPT", "tEta", "tPhi"], event.taus(), weight);

        self.fill_each(["lePT", "leEta", "lePhi"], d.leading_electron.as_slice(), weight);
        self.fill_each(["lmPT", "lmEta", "lmPhi"], d.leading_muon.as_slice(), weight);
        self.fill_each(["ltPT", "ltEta", "ltPhi"], d.leading_tau.as_slice(), weight);

        if let Some(mjj) = d.mjj {
            self.fill_one("mjj", mjj, weight);
        }
        if let Some(mt) = d.mt {
            self.fill_one("mT", mt, weight);
        }
        if let Some(assignment) = &d.pairing.assignment {
            self.fill_one("chi2_hh", assignment.chi2, weight);
        }
        if let Some(pair) = &d.pairing.best_pair {
            self.fill_one("m_bb", pair.mass, weight);
            self.fill_one("H_b", pair.ht, weight);
        }
    }

    fn fill_one(&mut self, key: &str, value: f64, weight: f64) {
        if let Some(hist) = self.hists.get_mut(key) {
            hist.fill(value, weight);
        }
    }

    /// Fill pT / eta / phi histograms once per object
    fn fill_each<T: PhysicsObject>(&mut self, keys: [&str; 3], objects: &[T], weight: f64) {
        for object in objects {
            self.fill_one(keys[0], object.pt(), weight);
            self.fill_one(keys[1], object.eta(), weight);
            self.fill_one(keys[2], object.phi(), weight);
        }
    }

    /// Add another collection's histograms and event count
    ///
    /// Records and rows only describe individual events and are left
    /// untouched. Histograms the other side lacks are skipped.
    ///
    /// # Errors
    /// * `AggregationError::BinningMismatch` - A histogram's edges differ
    pub fn merge(&mut self, other: &Aggregator) -> Result<(), AggregationError> {
        for (key, hist) in self.hists.iter_mut() {
            if let Some(theirs) = other.hists.get(key) {
                hist.merge(theirs)?;
            }
        }
        self.events += other.events;
        Ok(())
    }

    /// Move the other collection's rows after ours
    pub fn append_rows(&mut self, other: &mut Aggregator) {
        self.rows.append(&mut other.rows);
        if other.events > 0 {
            self.record = other.record.clone();
        }
    }

    /// Zero histograms, drop rows, forget the last record
    pub fn reset(&mut self) {
        self.hists.values_mut().for_each(Histogram::reset);
        self.rows.clear();
        self.record = EventRecord::default();
        self.events = 0;
    }

    /// Self-contained copy of the current state
    pub fn write(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            tag: self.tag.clone(),
            events: self.events,
            histograms: self
                .hists
                .iter()
                .map(|(k, h)| (k.to_string(), h.clone()))
                .collect(),
            record: self.record.clone(),
            rows: self.rows.clone(),
        }
    }
}

fn build_record(event: &NormalizedEvent, d: &Derived, weight: f64) -> EventRecord {
    let n_elec = event.electrons().len() as i32;
    let n_muon = event.muons().len() as i32;

    EventRecord {
        met: d.met.pt(),
        met_phi: d.met.phi(),
        met_invismu: d.met_invismu.pt(),
        met_phi_invismu: d.met_invismu.phi(),
        n_elec,
        n_muon,
        n_tau: event.taus().len() as i32,
        n_bjet: event.b_tags().len() as i32,
        n_jet: event.jets().len() as i32,
        n_lep: n_elec + n_muon,
        lep1: LeptonSlot::from_lepton(d.lep1.as_ref()),
        lep2: LeptonSlot::from_lepton(d.lep2.as_ref()),
        tau1: JetSlot::from_jet(d.leading_tau.as_ref()),
        j1: JetSlot::from_jet(d.j1.as_ref()),
        j2: JetSlot::from_jet(d.j2.as_ref()),
        mjj: or_sentinel(d.mjj),
        bj1: JetSlot::from_jet(d.bj1.as_ref()),
        bj2: JetSlot::from_jet(d.bj2.as_ref()),
        mt: or_sentinel(d.mt),
        chi2_hh: or_sentinel(d.pairing.assignment.as_ref().map(|a| a.chi2)),
        m_bb: or_sentinel(d.pairing.best_pair.as_ref().map(|p| p.mass)),
        h_b: or_sentinel(d.pairing.best_pair.as_ref().map(|p| p.ht)),
        weight,
    }
}
