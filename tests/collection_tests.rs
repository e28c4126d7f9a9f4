use delphes_hists::aggregator::{Aggregatable, Aggregator, AggregatorGroup, CategoryIndex, Snapshot};
use delphes_hists::parser::{RawEvent, RawJet, RawLepton, RawMissingEt};
use delphes_hists::selection::{NormalizedEvent, SelectionProfile};
use delphes_hists::utils::config::{CutConfig, SENTINEL, SENTINEL_INT};
use delphes_hists::utils::error::{AggregationError, EventError};
use pretty_assertions::assert_eq;

fn electron(pt: f64, eta: f64, charge: i32) -> RawLepton {
    RawLepton {
        pt,
        eta,
        phi: 0.4,
        charge,
        pid: None,
    }
}

fn jet(pt: f64, eta: f64, phi: f64, btag: bool) -> RawJet {
    RawJet {
        pt,
        eta,
        phi,
        mass: 4.0,
        btag,
        tau_tag: false,
    }
}

fn met(value: f64, phi: f64) -> Option<RawMissingEt> {
    Some(RawMissingEt {
        met: value,
        eta: 0.0,
        phi,
    })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn standard_profile() -> SelectionProfile {
    SelectionProfile::from_cuts(&CutConfig::standard())
}

/// Small varied sample; weights are powers of two so sums are order-independent
fn sample_events() -> Vec<RawEvent> {
    (0..24)
        .map(|i| {
            let n_jets = i % 9;
            RawEvent {
                weight: Some([0.5, 1.0, 2.0][i % 3]),
                electrons: (0..i % 3)
                    .map(|k| electron(30.0 + 10.0 * k as f64 + i as f64, 0.1 * k as f64, -1))
                    .collect(),
                muons: (0..i % 2).map(|_| electron(45.0, -0.7, 1)).collect(),
                jets: (0..n_jets)
                    .map(|k| jet(30.0 + 5.0 * k as f64, 0.3 * k as f64 - 1.0, 0.7 * k as f64 - 2.0, k % 3 == 0))
                    .collect(),
                missing_et: met(15.0 + 3.0 * i as f64, 0.2 * i as f64 - 2.0),
            }
        })
        .collect()
}

fn categories() -> CategoryIndex {
    CategoryIndex::new("all_events", 6, |tag| Aggregator::new(tag))
}

#[test]
fn test_two_electron_event_end_to_end() {
    let raw = RawEvent {
        weight: Some(2.0),
        electrons: vec![electron(40.0, -0.5, 1), electron(60.0, 1.2, -1)],
        muons: vec![],
        jets: vec![
            jet(80.0, 0.5, 1.0, true),
            jet(55.0, -1.0, -2.0, false),
            jet(35.0, 2.0, 2.5, false),
        ],
        missing_et: met(42.0, -1.5),
    };
    let event = NormalizedEvent::new(&raw, &standard_profile());

    assert_eq!(event.sorted_leptons()[0].pt, 60.0);
    assert_eq!(event.b_tags().len(), 1);
    assert_eq!(event.excl_jets().len(), 2);
    assert_eq!(event.jets().len(), 3);

    let mut agg = Aggregator::new("test");
    agg.fill(&event, event.weight()).unwrap();

    let n_elec = agg.histogram("nElec").unwrap();
    assert_eq!(n_elec.content_at(2.0), Some(2.0));
    assert_eq!(n_elec.integral(), 2.0);

    let record = agg.record();
    assert!(record.lep1.present);
    assert!(close(record.lep1.pt, 60.0));
    assert_eq!(record.lep1.pid, 11);
    assert!(close(record.lep1.eta, 1.2));
    assert!(close(record.lep1.phi, 0.4));
    assert!(record.lep1.m.abs() < 1e-6);
    assert!(close(record.lep2.pt, 40.0));
    assert_eq!(record.lep2.pid, -11);
    assert_eq!(record.n_lep, 2);
    assert_eq!(record.n_bjet, 1);
    assert_eq!(record.n_jet, 3);
    assert!(close(record.j1.pt, 55.0));
    assert!(close(record.j2.pt, 35.0));
    assert!(close(record.bj1.pt, 80.0));
    assert_eq!(record.bj2.pt, SENTINEL);
    assert!(record.mjj > 0.0);
    assert_eq!(record.chi2_hh, SENTINEL);
    assert_eq!(record.m_bb, SENTINEL);
    assert_eq!(record.weight, 2.0);

    assert_eq!(agg.histogram("jPT").unwrap().entries, 2);
    assert_eq!(agg.histogram("bPT").unwrap().entries, 1);
    assert_eq!(agg.histogram("lePT").unwrap().content_at(60.0), Some(2.0));
}

#[test]
fn test_single_lepton_sentinels() {
    let raw = RawEvent {
        weight: Some(1.0),
        electrons: vec![electron(50.0, 0.0, -1)],
        missing_et: met(30.0, 0.0),
        ..Default::default()
    };
    let event = NormalizedEvent::new(&raw, &standard_profile());

    let mut agg = Aggregator::new("test");
    agg.fill(&event, 1.0).unwrap();
    let record = agg.record();

    assert!(record.lep1.present);
    assert!(!record.lep2.present);
    assert_eq!(record.lep2.pid, SENTINEL_INT);
    for value in [
        record.lep2.pt,
        record.lep2.eta,
        record.lep2.phi,
        record.lep2.m,
        record.lep2.px,
        record.lep2.py,
        record.lep2.pz,
        record.lep2.e,
        record.tau1.pt,
        record.j1.pt,
        record.mjj,
    ] {
        assert_eq!(value, SENTINEL);
    }
    assert_eq!(agg.histogram("lmPT").unwrap().entries, 0);
}

#[test]
fn test_missing_met_aborts_fill() {
    let raw = RawEvent {
        weight: Some(1.0),
        electrons: vec![electron(50.0, 0.0, -1)],
        ..Default::default()
    };
    let event = NormalizedEvent::new(&raw, &standard_profile());

    let mut index = categories();
    assert_eq!(
        index.fill(&event, 1.0),
        Err(AggregationError::Event(EventError::MissingMet("MET")))
    );
    assert_eq!(index.get("0").unwrap().events(), 0);
}

#[test]
fn test_shard_merge_equals_sequential() {
    let profile = standard_profile();
    let events: Vec<NormalizedEvent> = sample_events()
        .iter()
        .map(|raw| NormalizedEvent::new(raw, &profile))
        .collect();

    let mut sequential = categories();
    for event in &events {
        sequential.fill(event, event.weight()).unwrap();
    }
    sequential.finalize().unwrap();

    let (left, right) = events.split_at(10);
    let mut a = categories();
    let mut b = categories();
    for event in left {
        a.fill(event, event.weight()).unwrap();
    }
    for event in right {
        b.fill(event, event.weight()).unwrap();
    }
    a.merge(&b).unwrap();
    a.append_rows(&mut b);
    a.finalize().unwrap();

    for key in sequential.keys() {
        let expected = sequential.get(&key).unwrap();
        let merged = a.get(&key).unwrap();
        assert_eq!(merged.events(), expected.events(), "events in {}", key);
        for (name, hist) in expected.histograms() {
            let other = merged.histogram(name).unwrap();
            assert_eq!(other.bin_content, hist.bin_content, "{} in {}", name, key);
            assert_eq!(other.sumw2, hist.sumw2, "{} in {}", name, key);
            assert_eq!(other.overflow, hist.overflow, "{} in {}", name, key);
        }
        assert_eq!(merged.rows(), expected.rows(), "rows in {}", key);
    }
}

#[test]
fn test_inclusive_equals_sum_of_bins() {
    let profile = standard_profile();
    let mut index = categories();
    for raw in sample_events() {
        let event = NormalizedEvent::new(&raw, &profile);
        index.fill(&event, event.weight()).unwrap();
    }
    index.finalize().unwrap();

    let inclusive = index.inclusive();
    let bins: Vec<&Aggregator> = (0..=6).map(|k| index.get(&k.to_string()).unwrap()).collect();

    for (name, hist) in inclusive.histograms() {
        let summed: Vec<f64> = (0..hist.n_bins())
            .map(|i| bins.iter().map(|b| b.histogram(name).unwrap().bin_content[i]).sum())
            .collect();
        assert_eq!(hist.bin_content, summed, "{}", name);
    }
    assert_eq!(inclusive.events(), 24);
}

#[test]
fn test_nested_groups_write_depth_first() {
    let mut root = AggregatorGroup::new("collections");
    root.register("all_events", categories()).unwrap();
    let mut channels = AggregatorGroup::new("channels");
    channels.register("ee", Aggregator::new("ee")).unwrap();
    root.register("channels", channels).unwrap();

    let raw = &sample_events()[4];
    let event = NormalizedEvent::new(raw, &standard_profile());
    root.fill(&event, 1.0).unwrap();
    root.finalize().unwrap();

    let Snapshot::Group(snapshot) = root.write() else {
        panic!("group writes a group snapshot");
    };
    let paths: Vec<String> = snapshot.collections().into_iter().map(|(p, _)| p).collect();
    assert_eq!(paths.len(), 9);
    assert_eq!(paths[0], "all_events/0");
    assert_eq!(paths[7], "all_events/inclusive");
    assert_eq!(paths[8], "channels/ee");
    assert_eq!(snapshot.find("channels/ee").unwrap().events, 1);
    assert_eq!(snapshot.find("all_events/inclusive").unwrap().events, 1);
}
