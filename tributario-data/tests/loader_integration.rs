//! Integration tests for table loading from on-disk bundles.

use std::io::Write;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tributario_core::calculations::{ScenarioComparator, sweep_all_annexes};
use tributario_core::store::DEFAULT_TABLE_SET;
use tributario_core::{
    ActivityContext, Annex, Bracket, CnaeRule, ServiceAnnex, SourceError, TableSource, TableStore,
};
use tributario_data::{FileSource, TableFormat, TableLoader};

const SAMPLE_JSON: &str = include_str!("../test-data/sample_tables.json");
const SAMPLE_CSV: &str = include_str!("../test-data/sample_tables.csv");

fn fixture(name: &str) -> String {
    format!("{}/test-data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn test_json_and_csv_bundles_agree_on_brackets() {
    let from_json = TableLoader::parse(SAMPLE_JSON.as_bytes(), TableFormat::Json)
        .expect("Failed to parse JSON bundle");
    let from_csv = TableLoader::parse(SAMPLE_CSV.as_bytes(), TableFormat::Csv)
        .expect("Failed to parse CSV bundle");

    for annex in Annex::ALL {
        assert_eq!(from_json.annex(annex), from_csv.annex(annex), "{annex}");
    }
    assert_eq!(from_json.irrf_table, from_csv.irrf_table);
    assert!(from_csv.cnae_rules.is_empty());
    assert!(!from_json.cnae_rules.is_empty());
}

#[test]
fn test_sample_bundle_has_every_table() {
    let tables = TableLoader::parse_json(SAMPLE_JSON.as_bytes()).expect("Failed to parse JSON");

    assert_eq!(tables.annexes().count(), 5);
    for (_, table) in tables.annexes() {
        assert_eq!(table.len(), 6);
        assert_eq!(table.top_bound(), Some(dec!(4800000)));
    }
    assert_eq!(
        tables.annex(Annex::III).expect("anexo_III").brackets()[2],
        Bracket::new(dec!(720000), dec!(0.135), dec!(17640))
    );
    assert_eq!(tables.irrf_table.as_ref().map(|t| t.len()), Some(5));
    assert_eq!(
        tables.cnae_rule("6911-7/01"),
        Some(CnaeRule::Fixed(ServiceAnnex::III))
    );
}

#[tokio::test]
async fn test_file_source_reads_json_fixture() {
    let source = FileSource::new(fixture("sample_tables.json"));

    let tables = source.load().await.expect("Failed to load JSON fixture");

    assert_eq!(tables.annexes().count(), 5);
    assert!(tables.irrf_table.is_some());
}

#[tokio::test]
async fn test_file_source_picks_csv_by_extension() {
    let source = FileSource::new(fixture("sample_tables.csv"));

    let tables = source.load().await.expect("Failed to load CSV fixture");

    assert_eq!(tables.annexes().count(), 5);
    assert!(tables.cnae_rules.is_empty());
}

#[tokio::test]
async fn test_file_source_reports_invalid_bundle() {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp file");
    writeln!(file, "table,upper_bound,rate,deduction\nanexo_IX,1,0.1,0").expect("write");

    let result = FileSource::new(file.path()).load().await;

    match result {
        Err(SourceError::Invalid(msg)) => assert!(msg.contains("anexo_IX"), "got: {msg}"),
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn test_store_load_records_file_metadata() {
    let mut store = TableStore::new();
    let path = fixture("sample_tables.json");

    let meta = store
        .load_into(DEFAULT_TABLE_SET, &FileSource::new(&path))
        .await
        .expect("Failed to load into store");

    assert_eq!(meta.source, path);
    assert_eq!(store.status().len(), 1);
    assert!(store.get(DEFAULT_TABLE_SET).is_some());
}

#[test]
fn test_loaded_bundle_drives_calculations() {
    let tables = TableLoader::parse_json(SAMPLE_JSON.as_bytes()).expect("Failed to parse JSON");
    let ctx = ActivityContext::new(dec!(600000), dec!(180000));

    let comparison = ScenarioComparator::new(&tables)
        .compare(&ctx)
        .expect("Failed to compare scenarios");
    let sweep = sweep_all_annexes(&tables, dec!(600000), None);

    assert_eq!(comparison.chosen.annex, ServiceAnnex::III);
    assert_eq!(comparison.chosen.tax_annual, dec!(63360.00));
    assert_eq!(comparison.without_factor_r.tax_annual, dec!(107100.00));
    assert_eq!(sweep.len(), 5);
    // 600000 × 0.095 − 13860
    assert_eq!(sweep[&Annex::I].tax_annual, dec!(43140.00));
}
