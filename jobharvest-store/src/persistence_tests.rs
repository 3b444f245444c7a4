//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, record output and configuration files.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tempfile::TempDir;

use jobharvest_core::Record;

use crate::config::{HarvestConfig, SourceOverride};
use crate::output::{OutputFormat, output_path, write_records};
use crate::persistence::{ensure_dir, save_json, write_atomic};

async fn read_json<T: DeserializeOwned>(path: &Path) -> T {
    let content = tokio::fs::read_to_string(path).await.unwrap();
    serde_json::from_str(&content).unwrap()
}

fn records() -> Vec<Record> {
    vec![
        Record::from_value(json!({ "jobId": "1594338", "title": "Software Engineer" })).unwrap(),
        Record::from_value(json!({ "jobId": "1600001", "title": "PM", "remote": true })).unwrap(),
    ]
}

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    let data = json!({ "key": "value" });

    save_json(&nested_path, &data).await.unwrap();
    assert!(nested_path.exists());

    let loaded: Value = read_json(&nested_path).await;
    assert_eq!(loaded, data);
}

#[tokio::test]
async fn test_write_into_file_path_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    write_atomic(&blocker, b"x").await.unwrap();

    let result = save_json(&blocker.join("filters.json"), &json!({})).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("data");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

// ============================================================================
// Record Output Tests
// ============================================================================

#[tokio::test]
async fn test_write_json_records() {
    let temp_dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let path = output_path(temp_dir.path(), "microsoft", date, 1, OutputFormat::Json);

    write_records(&path, &records(), OutputFormat::Json).await.unwrap();

    assert!(path.ends_with("microsoft-2024-05-01-run1.json"));
    let content = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(content.contains("\n  {"), "output should be pretty-printed");

    let loaded: Vec<Record> = read_json(&path).await;
    assert_eq!(loaded, records());
}

#[tokio::test]
async fn test_write_csv_records() {
    let temp_dir = TempDir::new().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let path = output_path(temp_dir.path(), "microsoft", date, 2, OutputFormat::Csv);

    write_records(&path, &records(), OutputFormat::Csv).await.unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["jobId", "title", "remote"]);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][2], "");
    assert_eq!(&rows[1][2], "true");
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_missing_config_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = HarvestConfig::load_from(&temp_dir.path().join("config.json")).unwrap();
    assert_eq!(config, HarvestConfig::default());
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut config = HarvestConfig {
        output_dir: PathBuf::from("/srv/jobs"),
        format: OutputFormat::Json,
        ..HarvestConfig::default()
    };
    config.sources.insert(
        "amazon".to_string(),
        SourceOverride {
            concurrency_limit: Some(5),
            ..SourceOverride::default()
        },
    );

    config.save_to(&path).unwrap();
    let loaded = HarvestConfig::load_from(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_config_with_custom_source() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(
        &path,
        json!({
            "output_dir": "out",
            "custom_sources": [{
                "id": "startup",
                "display_name": "Startup Inc",
                "aliases": ["su"],
                "config": { "page_size": 50 },
                "listing": {
                    "url": "https://startup.test/jobs?page={page}",
                    "total_pointer": "/total",
                    "items_pointer": "/jobs"
                }
            }]
        })
        .to_string(),
    )
    .unwrap();

    let config = HarvestConfig::load_from(&path).unwrap();
    let registry = config.registry().unwrap();
    let adapter = config.adapter(&registry, "su").unwrap();

    assert_eq!(config.output_dir, PathBuf::from("out"));
    assert_eq!(adapter.descriptor().id, "startup");
    assert_eq!(registry.count(), 5);
}

#[test]
fn test_malformed_config_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(HarvestConfig::load_from(&path).is_err());
}
