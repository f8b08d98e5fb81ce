//! Integration tests for imputation and injection.
//!
//! These tests go through the public API: CSV fixtures are loaded with polars,
//! converted to datasets, transformed and written back.

use lex_imputation::{
    Algorithm, AllWithinRange, AttributeRange, ClassOnly, Dataset, ImputationConfig,
    InjectionConfig, Irmi, LabelMasking, MajorityLearner, MeanLearner, MeansAndModes,
    NearestNeighbor, Processor, RandomPercentage, Sequence, Value,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn weather() -> Dataset {
    Dataset::from_dataframe(&load_csv("weather.csv"), Some("play")).unwrap()
}

fn total_missing(data: &Dataset) -> usize {
    (0..data.num_attributes()).map(|i| data.missing_count(i)).sum()
}

/// Numeric-only dataset with `rows` complete rows.
fn synthetic(rows: usize) -> Dataset {
    let x: Vec<f64> = (0..rows).map(|i| i as f64).collect();
    let y: Vec<f64> = (0..rows).map(|i| (i % 7) as f64).collect();
    let df = DataFrame::new(vec![
        Series::new("x".into(), x).into(),
        Series::new("y".into(), y).into(),
    ])
    .unwrap();
    Dataset::from_dataframe(&df, None).unwrap()
}

// ============================================================================
// Polars Bridge
// ============================================================================

#[test]
fn test_weather_loads() {
    let data = weather();

    assert_eq!(data.len(), 14);
    assert_eq!(data.num_attributes(), 5);
    assert_eq!(data.target(), Some(4));
    assert_eq!(data.missing_count(0), 1);
    assert_eq!(data.missing_count(1), 1);
    assert_eq!(data.missing_count(2), 1);
    assert_eq!(
        data.attribute(0).unwrap().labels(),
        &["sunny".to_string(), "overcast".to_string(), "rainy".to_string()]
    );
    assert_eq!(data.text(1, 3), Some("true"));
}

#[test]
fn test_dataframe_round_trip_keeps_text_and_nulls() {
    let data = weather();
    let df = data.to_dataframe().unwrap();

    assert_eq!(df.shape(), (14, 5));
    assert_eq!(df.column("outlook").unwrap().null_count(), 1);
    let back = Dataset::from_dataframe(&df, Some("play")).unwrap();
    assert_eq!(back.text(2, 0), Some("overcast"));
    assert_eq!(back.row(0).unwrap().value(1), Value::Number(85.0));
}

// ============================================================================
// Imputation
// ============================================================================

#[test]
fn test_means_and_modes_on_weather() {
    let data = weather();
    let filled = MeansAndModes::new().build(&data).unwrap().apply(&data).unwrap();

    assert_eq!(total_missing(&filled), 0);
    // sunny occurs five times, overcast and rainy four times each
    assert_eq!(filled.text(9, 0), Some("sunny"));
    let temperature = filled.row(6).unwrap().value(1).as_f64().unwrap();
    assert!((temperature - 966.0 / 13.0).abs() < 1e-9);

    let df = filled.to_dataframe().unwrap();
    let outlook = df.column("outlook").unwrap().as_materialized_series().clone();
    assert_eq!(outlook.str().unwrap().get(9), Some("sunny"));
}

#[test]
fn test_nearest_neighbor_on_weather() {
    let data = weather();
    let filled = NearestNeighbor::new()
        .with_num_neighbors(3)
        .build(&data)
        .unwrap()
        .apply(&data)
        .unwrap();
    assert_eq!(total_missing(&filled), 0);
    // complete rows are untouched
    assert_eq!(filled.row(0), data.row(0));
}

#[test]
fn test_irmi_is_deterministic_on_weather() {
    let data = weather();
    let first = Irmi::new().build(&data).unwrap().apply(&data).unwrap();
    let second = Irmi::new().build(&data).unwrap().apply(&data).unwrap();

    assert_eq!(first, second);
    assert_eq!(total_missing(&first), 0);
    assert_eq!(data.missing_count(0), 1, "input must not be mutated");
}

#[test]
fn test_irmi_with_constant_learners() {
    let data = weather();
    let state = Irmi::new()
        .with_nominal_learner(Box::new(MajorityLearner))
        .with_numeric_learner(Box::new(MeanLearner))
        .fit_state(&data)
        .unwrap();

    assert_eq!(state.modeled_attributes(), vec![0, 1, 2]);
    assert!(state.epochs() <= 100);
}

// ============================================================================
// Processor Lifecycle
// ============================================================================

#[test]
fn test_processor_lifecycle() {
    let data = weather();
    let mut processor = Processor::new(Box::new(MeansAndModes::new()));

    let err = processor.apply(&data).unwrap_err();
    assert!(err.is_uninitialized());
    assert_eq!(err.error_code(), "UNINITIALIZED");

    let schema = processor.build(&data).unwrap();
    assert_eq!(&schema, data.schema());
    assert!(processor.is_built());

    let row = processor.apply_row(data.row(9).unwrap()).unwrap();
    assert_eq!(row.value(0), Value::Index(0));
}

#[test]
fn test_failed_build_keeps_previous_state() {
    let data = weather();
    let mut processor = Processor::new(Box::new(AllWithinRange::new(
        AttributeRange::new("2").unwrap(),
    )));
    processor.build(&data).unwrap();

    let narrow = Dataset::from_dataframe(&load_csv("weather.csv").select(["outlook"]).unwrap(), None)
        .unwrap();
    assert!(processor.build(&narrow).is_err());
    assert!(processor.is_built());
    assert_eq!(processor.apply(&data).unwrap().missing_count(1), 14);
}

// ============================================================================
// Injection
// ============================================================================

#[test]
fn test_random_percentage_reproducible_and_converges() {
    let data = synthetic(5000);
    let built = RandomPercentage::new()
        .with_seed(7)
        .with_percentage(0.25)
        .build(&data)
        .unwrap();

    let first = built.apply(&data).unwrap();
    let second = built.apply(&data).unwrap();
    assert_eq!(first, second);

    for column in 0..2 {
        let fraction = first.missing_count(column) as f64 / data.len() as f64;
        assert!((fraction - 0.25).abs() < 0.03, "column {}: {}", column, fraction);
    }
    // columns use decorrelated streams
    let same = first
        .rows()
        .iter()
        .all(|r| r.is_missing(0) == r.is_missing(1));
    assert!(!same);
}

#[test]
fn test_sequence_masks_range_then_target() {
    let data = weather();
    let sequence = Sequence::injection(vec![
        Box::new(AllWithinRange::new(AttributeRange::new("1,3").unwrap())),
        Box::new(ClassOnly),
    ])
    .unwrap();

    let built = sequence.build(&data).unwrap();
    let row = built.apply_row(data.row(0).unwrap()).unwrap();
    assert_eq!(row.missing_indices(), vec![0, 2, 4]);
}

#[test]
fn test_sequence_reports_failing_stage() {
    let data = weather();
    let sequence = Sequence::injection(vec![
        Box::new(ClassOnly),
        Box::new(AllWithinRange::new(AttributeRange::new("9").unwrap())),
    ])
    .unwrap();

    let err = sequence.build(&data).unwrap_err();
    assert_eq!(err.stage(), Some(2));
    assert_eq!(err.root_cause().error_code(), "INVALID_RANGE");
}

#[test]
fn test_header_rewrite_round_trip() {
    let df = load_csv("survey.csv");
    let data = Dataset::from_dataframe(&df, None).unwrap();
    let built = LabelMasking::values("? unknown")
        .with_update_header(true)
        .build(&data)
        .unwrap();
    let out = built.apply(&data).unwrap();

    assert_eq!(
        out.attribute(1).unwrap().labels(),
        &["yes".to_string(), "no".to_string()]
    );
    for (i, row) in data.rows().iter().enumerate() {
        let before = data.text(i, 1);
        if matches!(before, Some("?") | Some("unknown")) {
            assert!(out.row(i).unwrap().is_missing(1));
        } else {
            assert_eq!(out.text(i, 1), before);
        }
        assert_eq!(out.row(i).unwrap().value(2), row.value(2));
    }

    // the rewritten header survives a trip through polars
    let written = out.to_dataframe().unwrap();
    let answer = written.column("answer").unwrap().as_materialized_series().clone();
    assert_eq!(answer.null_count(), 3);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_inject_then_impute() {
    let data = weather();

    let inject = InjectionConfig::from_json(
        r#"{
            "algorithm": "sequence",
            "stages": [
                { "algorithm": "random_percentage", "percentage": 0.3, "seed": 3,
                  "range": { "range": "last", "invert": true } },
                { "algorithm": "regex", "expression": "over.*" }
            ]
        }"#,
    )
    .unwrap()
    .into_algorithm()
    .unwrap();
    let masked = inject.build(&data).unwrap().apply(&data).unwrap();
    assert!(total_missing(&masked) > total_missing(&data));
    assert_eq!(masked.missing_count(4), 0);
    assert!((0..masked.len()).all(|i| masked.text(i, 0) != Some("overcast")));

    let impute = ImputationConfig::from_json(
        r#"{ "algorithm": "sequence", "stages": [
                { "algorithm": "means_and_modes" },
                { "algorithm": "null" }
            ] }"#,
    )
    .unwrap()
    .into_algorithm()
    .unwrap();
    let filled = impute.build(&masked).unwrap().apply(&masked).unwrap();
    assert_eq!(total_missing(&filled), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = ImputationConfig::from_json(r#"{ "algorithm": "irmi", "epochs": 0 }"#)
        .unwrap()
        .into_algorithm()
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CONFIG");
}
