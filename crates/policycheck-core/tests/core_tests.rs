use std::fs;
use std::io::Write;
use tempfile::TempDir;

use figment::providers::{Format, Toml};
use figment::Figment;
use policycheck_core::config::{ChunkingSettings, Config, JudgeProvider, Settings};
use policycheck_core::data_processor::DataProcessor;
use policycheck_core::rules::{all_keywords, all_rules, rule};
use policycheck_core::samples::SampleContracts;
use policycheck_core::traits::DocumentProvisioner;
use policycheck_core::Error;

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let processor = DataProcessor::default();
    let chunks = processor.process_directory(dir).expect("process");

    assert_eq!(chunks.len(), 1, "one small document becomes one chunk");
    assert_eq!(chunks[0].text, "Short text");
    assert_eq!(chunks[0].source_document, "a.txt");
    assert_eq!(chunks[0].sequence_index, 0);
    assert_eq!(chunks[0].total_chunks_in_document, 1);
}

#[test]
fn process_directory_windows_and_positions() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let body: Vec<String> = (0..25).map(|i| format!("word{}", i)).collect();
    fs::write(dir.join("b.txt"), body.join(" ")).unwrap();
    fs::write(dir.join("a.pdf"), "alpha bravo").unwrap();
    fs::write(dir.join("notes.md"), "ignored").unwrap();

    let processor = DataProcessor::new(ChunkingSettings { window_size: 10, overlap: 2 });
    let chunks = processor.process_directory(dir).expect("process");

    let docs: Vec<&str> = chunks.iter().map(|c| c.source_document.as_str()).collect();
    assert_eq!(docs, vec!["a.pdf", "b.txt", "b.txt", "b.txt", "b.txt"], "sorted files, markdown skipped");
    for c in chunks.iter().filter(|c| c.source_document == "b.txt") {
        assert_eq!(c.total_chunks_in_document, 4);
        assert!(c.sequence_index < c.total_chunks_in_document);
    }
    assert!(chunks[1].text.starts_with("word0 "));
    assert!(chunks[2].text.starts_with("word8 "), "second window starts window - overlap words later");
    assert!(chunks[3].text.starts_with("word16 "));
    assert_eq!(chunks[4].text, "word24", "trailing partial window is kept");
    assert_eq!(chunks[4].sequence_index, 3);
}

#[test]
fn process_missing_directory_is_empty() {
    let tmp = TempDir::new().unwrap();
    let chunks = DataProcessor::default().process_directory(&tmp.path().join("nope")).expect("process");
    assert!(chunks.is_empty());
}

#[test]
fn settings_layer_over_defaults() {
    let figment = Figment::new().merge(Toml::string(
        r#"
        [chunking]
        window_size = 400
        overlap = 50

        [judge]
        provider = "offline"
        api_key = "k"
        "#,
    ));
    let settings = Config::from_figment(figment).settings().expect("settings");
    assert_eq!(settings.chunking.window_size, 400);
    assert_eq!(settings.chunking.overlap, 50);
    assert_eq!(settings.judge.provider, JudgeProvider::Offline);
    assert_eq!(settings.search.top_k_default, 3, "untouched sections keep defaults");
    assert_eq!(settings.index.max_vocabulary_size, 5000);
}

#[test]
fn settings_reject_overlap_not_smaller_than_window() {
    let figment = Figment::new().merge(Toml::string("[chunking]\nwindow_size = 100\noverlap = 100\n"));
    let err = Config::from_figment(figment).settings().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));

    let mut settings = Settings::default();
    settings.index.max_document_fraction = 1.5;
    assert!(settings.validate().is_err());
}

#[test]
fn config_get_reads_nested_keys() {
    let figment = Figment::new().merge(Toml::string("[data]\nreport_path = \"out/report.json\"\n"));
    let config = Config::from_figment(figment);
    let path: String = config.get("data.report_path").expect("get");
    assert_eq!(path, "out/report.json");
    let dir: String = config.get("data.document_directory").expect("default");
    assert_eq!(dir, "data/pdfs");
}

#[test]
fn catalog_is_ordered_and_complete() {
    let rules = all_rules();
    assert_eq!(rules.len(), 15);
    assert_eq!(rules.get_index(0).map(|(id, _)| id.as_str()), Some("liability_limitation"));
    assert_eq!(rules.get_index(14).map(|(id, _)| id.as_str()), Some("survival_provisions"));
    for (id, r) in &rules {
        assert_eq!(id, &r.id);
        assert!(!r.keywords.is_empty());
    }
    assert_eq!(rule("force_majeure").map(|r| r.title), Some("Force Majeure Provisions".to_string()));
    assert!(rule("unknown").is_none());

    let keywords = all_keywords();
    let mut sorted = keywords.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(keywords, sorted);
}

#[test]
fn sample_contracts_fill_an_empty_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("docs");
    let written = SampleContracts.provision(&dir).expect("provision");
    assert_eq!(written, SampleContracts::file_names().count());

    let chunks = DataProcessor::default().process_directory(&dir).expect("process");
    let mut docs: Vec<String> = chunks.iter().map(|c| c.source_document.clone()).collect();
    docs.dedup();
    assert_eq!(docs.len(), written);
}
