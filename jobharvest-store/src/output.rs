//! Harvest output files.
//!
//! Records are written as a pretty JSON array or as CSV. CSV columns are
//! the union of every record's top-level fields in first-seen order;
//! nested values are written as JSON text and absent fields stay empty.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use jobharvest_core::Record;

use crate::error::StoreError;
use crate::persistence::{save_json, write_atomic};

// ============================================================================
// Output Format
// ============================================================================

/// File format of harvested records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma separated values.
    #[default]
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl OutputFormat {
    /// Returns the file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(StoreError::Config(format!(
                "unknown output format {other:?} (expected csv or json)"
            ))),
        }
    }
}

// ============================================================================
// File Names
// ============================================================================

/// Returns `{source}-{YYYY-MM-DD}-run{run}.{ext}`.
///
/// Run 1 holds listing records, run 2 detail records.
pub fn output_file_name(source: &str, date: NaiveDate, run: u32, format: OutputFormat) -> String {
    format!(
        "{source}-{}-run{run}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Returns `{source}-filter-{YYYY-MM-DD}.json`.
pub fn filter_file_name(source: &str, date: NaiveDate) -> String {
    format!("{source}-filter-{}.json", date.format("%Y-%m-%d"))
}

/// Joins the output directory and [`output_file_name`].
pub fn output_path(
    dir: &Path,
    source: &str,
    date: NaiveDate,
    run: u32,
    format: OutputFormat,
) -> PathBuf {
    dir.join(output_file_name(source, date, run, format))
}

// ============================================================================
// Writers
// ============================================================================

/// Writes records in the given format.
pub async fn write_records(
    path: &Path,
    records: &[Record],
    format: OutputFormat,
) -> Result<(), StoreError> {
    match format {
        OutputFormat::Csv => write_csv(path, records).await?,
        OutputFormat::Json => save_json(path, &records).await?,
    }
    info!(path = %path.display(), records = records.len(), %format, "Wrote records");
    Ok(())
}

/// Writes records as CSV.
pub async fn write_csv(path: &Path, records: &[Record]) -> Result<(), StoreError> {
    let bytes = records_to_csv(records)?;
    write_atomic(path, &bytes).await
}

/// Encodes records as CSV.
///
/// An empty record set yields an empty document.
pub fn records_to_csv(records: &[Record]) -> Result<Vec<u8>, StoreError> {
    let columns = columns(records);
    let mut writer = csv::Writer::from_writer(Vec::new());

    if !columns.is_empty() {
        writer.write_record(&columns)?;
        for record in records {
            writer.write_record(
                columns
                    .iter()
                    .map(|column| record.get(column).map(cell).unwrap_or_default()),
            )?;
        }
    }

    writer.into_inner().map_err(|e| StoreError::Io(e.into_error()))
}

/// Union of top-level fields in first-seen order.
fn columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for (field, _) in record.fields() {
            if !columns.iter().any(|c| c == field) {
                columns.push(field.clone());
            }
        }
    }
    columns
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            output_file_name("microsoft", date, 2, OutputFormat::Csv),
            "microsoft-2024-03-07-run2.csv"
        );
        assert_eq!(filter_file_name("amazon", date), "amazon-filter-2024-03-07.json");
        assert_eq!(
            output_path(Path::new("data"), "google", date, 1, OutputFormat::Json),
            PathBuf::from("data/google-2024-03-07-run1.json")
        );
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_csv_union_of_columns() {
        let records = vec![
            record(json!({ "jobId": "1", "title": "SWE, Backend" })),
            record(json!({ "jobId": "2", "postingDate": "2024-03-01", "title": null })),
            record(json!({ "jobId": 3, "properties": { "locations": ["Redmond", "Dublin"] } })),
        ];

        let csv = String::from_utf8(records_to_csv(&records).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "jobId,title,postingDate,properties");
        assert_eq!(lines[1], "1,\"SWE, Backend\",,");
        assert_eq!(lines[2], "2,,2024-03-01,");
        assert_eq!(
            lines[3],
            r#"3,,,"{""locations"":[""Redmond"",""Dublin""]}""#
        );
    }

    #[test]
    fn test_csv_empty() {
        assert!(records_to_csv(&[]).unwrap().is_empty());
    }
}
