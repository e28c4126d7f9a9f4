use delphes_hists::commands::{execute_process, ProcessArgs};
use delphes_hists::output::read_collections;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Three events: a dielectron event with three jets, a single-muon event,
/// and an event with four b-jets and two muons
const EVENTS: &str = r#"{"Weight": 1.0, "Electron": [{"PT": 60.0, "Eta": 0.3, "Phi": 1.0, "Charge": -1}, {"PT": 40.0, "Eta": -0.8, "Phi": -2.0, "Charge": 1}], "Jet": [{"PT": 70.0, "Eta": 0.1, "Phi": 0.5, "Mass": 8.0, "BTag": 1, "TauTag": 0}, {"PT": 50.0, "Eta": 1.1, "Phi": 2.0, "Mass": 6.0, "BTag": 0, "TauTag": 0}, {"PT": 30.0, "Eta": -2.0, "Phi": -1.0, "Mass": 4.0, "BTag": 0, "TauTag": 0}], "MissingET": {"MET": 35.0, "Phi": -0.5}}

{"weight": 1.0, "muons": [{"pt": 33.0, "eta": 1.5, "phi": 0.2, "charge": 1}], "missing_et": {"met": 80.0, "phi": 3.0}}
{"weight": 2.0, "muons": [{"pt": 45.0, "eta": 0.5, "phi": 0.0, "charge": 1}, {"pt": 28.0, "eta": -0.5, "phi": 3.0, "charge": -1}], "jets": [{"pt": 90.0, "eta": 0.2, "phi": 0.0, "btag": true}, {"pt": 80.0, "eta": -0.4, "phi": 1.5, "btag": true}, {"pt": 60.0, "eta": 1.0, "phi": 3.0, "btag": true}, {"pt": 40.0, "eta": -1.2, "phi": -1.5, "btag": true}], "missing_et": {"met": 20.0, "phi": 1.0}}
"#;

fn write_events(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn args(input: &Path, output: PathBuf) -> ProcessArgs {
    ProcessArgs {
        input: input.to_path_buf(),
        output,
        ..Default::default()
    }
}

#[test]
fn test_process_single_file() {
    let dir = tempdir().unwrap();
    let input = write_events(&dir, "events.jsonl", EVENTS);
    let output = dir.path().join("out/hists.json");

    let document = execute_process(args(&input, output.clone())).unwrap();
    assert_eq!(document.events_processed, 3);
    assert_eq!(document.events_selected, 2);
    assert_eq!(document.weight_scale, 1000.0);
    assert_eq!(document.cross_section, None);

    let loaded = read_collections(&output).unwrap();
    assert_eq!(loaded.events_processed, 3);

    let all = loaded.collections.find("all_events/inclusive").unwrap();
    assert_eq!(all.events, 3);
    let n_lep = &all.histograms["nLep"];
    assert_eq!(n_lep.content_at(1.0), Some(1000.0));
    assert_eq!(n_lep.content_at(2.0), Some(3000.0));

    // Jet multiplicity routing: 3, 0 and 4 selected jets
    assert_eq!(loaded.collections.find("all_events/3").unwrap().events, 1);
    assert_eq!(loaded.collections.find("all_events/0").unwrap().events, 1);
    assert_eq!(loaded.collections.find("all_events/4").unwrap().events, 1);
    assert_eq!(loaded.collections.find("event_selection/0").unwrap().events, 0);

    let four_b = loaded.collections.find("event_selection/4").unwrap();
    assert_eq!(four_b.rows.len(), 1);
    assert!(four_b.record.chi2_hh >= 0.0);
    assert!(four_b.record.m_bb > 0.0);
    assert!((four_b.record.h_b - 170.0).abs() < 1e-9);
    assert_eq!(four_b.record.weight, 2000.0);
}

#[test]
fn test_process_list_file_and_cross_section() {
    let dir = tempdir().unwrap();
    let first = write_events(&dir, "a.jsonl", EVENTS);
    let second = write_events(&dir, "b.jsonl", EVENTS);
    let list = write_events(
        &dir,
        "inputs.txt",
        &format!("# samples\n{}\n\n{}\n", first.display(), second.display()),
    );

    let process_args = ProcessArgs {
        cross_section: 8.0,
        ..args(&list, dir.path().join("hists.json"))
    };
    let document = execute_process(process_args).unwrap();

    // lumi / files * xs / sum(w) = 1000 / 2 * 8 / 8
    assert_eq!(document.weight_scale, 500.0);
    assert_eq!(document.cross_section, Some(8.0));
    assert_eq!(document.events_processed, 6);
}

#[test]
fn test_process_zero_sum_of_weights() {
    let dir = tempdir().unwrap();
    let input = write_events(
        &dir,
        "unweighted.jsonl",
        "{\"missing_et\": {\"met\": 10.0, \"phi\": 0.0}}\n",
    );

    let process_args = ProcessArgs {
        cross_section: 1.0,
        ..args(&input, dir.path().join("hists.json"))
    };
    assert!(execute_process(process_args).is_err());
}

#[test]
fn test_process_missing_met_aborts() {
    let dir = tempdir().unwrap();
    let input = write_events(
        &dir,
        "nomet.jsonl",
        "{\"weight\": 1.0, \"electrons\": [{\"pt\": 50.0, \"eta\": 0.0, \"phi\": 0.0}]}\n",
    );
    let output = dir.path().join("hists.json");

    let err = execute_process(args(&input, output.clone())).unwrap_err();
    assert!(format!("{:#}", err).contains("MET"));
    assert!(!output.exists());
}

#[test]
fn test_sharded_process_matches_sequential() {
    let dir = tempdir().unwrap();
    let repeated = EVENTS.repeat(5);
    let input = write_events(&dir, "events.jsonl", &repeated);

    let sequential = execute_process(args(&input, dir.path().join("seq.json"))).unwrap();
    let sharded = execute_process(ProcessArgs {
        jobs: 4,
        ..args(&input, dir.path().join("par.json"))
    })
    .unwrap();

    assert_eq!(sharded.events_processed, sequential.events_processed);
    assert_eq!(sharded.events_selected, sequential.events_selected);

    let seq = sequential.collections.collections();
    let par = sharded.collections.collections();
    assert_eq!(seq.len(), par.len());
    for ((seq_path, seq_c), (par_path, par_c)) in seq.iter().zip(par.iter()) {
        assert_eq!(seq_path, par_path);
        assert_eq!(seq_c.events, par_c.events, "{}", seq_path);
        assert_eq!(seq_c.rows, par_c.rows, "{}", seq_path);
        for (key, hist) in &seq_c.histograms {
            assert_eq!(hist.bin_content, par_c.histograms[key].bin_content, "{} {}", seq_path, key);
        }
    }
}

#[test]
fn test_process_with_config() {
    let dir = tempdir().unwrap();
    let input = write_events(&dir, "events.jsonl", EVENTS);
    let config = write_events(
        &dir,
        "cuts.toml",
        "max_jet_multiplicity = 2\nmin_leptons = 1\nstore_rows = false\n\n[cuts]\ne_pt_cut = 50.0\nmu_pt_cut = 25.0\n",
    );

    let document = execute_process(ProcessArgs {
        config: Some(config),
        ..args(&input, dir.path().join("hists.json"))
    })
    .unwrap();

    // Second electron fails the raised cut; every event keeps one lepton
    assert_eq!(document.events_selected, 3);
    let saturated = document.collections.find("all_events/2").unwrap();
    assert_eq!(saturated.events, 2);
    assert!(saturated.rows.is_empty());
    assert!(document.collections.find("all_events/3").is_none());
}
