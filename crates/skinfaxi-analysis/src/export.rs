//! CSV and ZIP export.
//!
//! The per-file analysis CSV keeps the header layout the downstream
//! spreadsheets were built around: the group-count and percentage figures
//! ride inside the header names, averages are rounded to two decimals,
//! and the activity flags are `1`/`0`.

use std::io::Write;

use chrono::Local;

use crate::error::AnalysisResult;
use crate::metadata::{FileToken, MetadataRow};
use crate::stats::FileReport;

/// Render the per-file analysis table.
pub fn analysis_csv(report: &FileReport) -> AnalysisResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        format!("Measurement Number ({})", report.groups()),
        "Total Samples".to_string(),
        format!("Pin44 Active ({})", round4(report.pin44_pct())),
        format!("Pin45 Active({})", round4(report.pin45_pct())),
        "Avg Pin44".to_string(),
        "Avg Pin45".to_string(),
        format!("Out of Normal Range ({}%)", round4(report.out_pct())),
    ])?;
    for row in &report.rows {
        writer.write_record([
            row.group.clone(),
            row.total_samples.to_string(),
            flag(row.pin44_active),
            flag(row.pin45_active),
            format!("{}", round2(row.avg_pin44)),
            format!("{}", round2(row.avg_pin45)),
            flag(row.out_of_range),
        ])?;
    }
    Ok(finish(writer))
}

/// Name for a per-file analysis CSV: the source file's timestamp token
/// when it has one, the current local time otherwise, with an `_SM`
/// marker in simulate mode.
pub fn analysis_file_name(source_name: &str, simulate_mode: bool) -> String {
    let stamp = FileToken::parse(source_name)
        .map(|t| t.stamp)
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
    let suffix = if simulate_mode { "_SM" } else { "" };
    format!("{stamp}_analysis{suffix}.csv")
}

/// One file's line in the aggregate conclusions table.
#[derive(Debug, Clone)]
pub struct ConclusionRow {
    /// Source file name.
    pub file: String,
    /// Number of measurement groups analyzed.
    pub measurements: usize,
    /// pin44-active count.
    pub pin44_count: usize,
    /// pin44-active percentage.
    pub pin44_pct: f64,
    /// pin45-active count.
    pub pin45_count: usize,
    /// pin45-active percentage.
    pub pin45_pct: f64,
    /// Out-of-range count.
    pub out_count: usize,
    /// Out-of-range percentage.
    pub out_pct: f64,
    /// Matched setup-table columns, when any.
    pub setup: Option<MetadataRow>,
    /// Matched environment-log columns, when any.
    pub environment: Option<MetadataRow>,
}

impl ConclusionRow {
    /// Build a conclusion line from a file's report and metadata matches.
    pub fn new(
        file: impl Into<String>,
        report: &FileReport,
        setup: Option<MetadataRow>,
        environment: Option<MetadataRow>,
    ) -> Self {
        Self {
            file: file.into(),
            measurements: report.groups(),
            pin44_count: report.pin44_count,
            pin44_pct: report.pin44_pct(),
            pin45_count: report.pin45_count,
            pin45_pct: report.pin45_pct(),
            out_count: report.out_count,
            out_pct: report.out_pct(),
            setup,
            environment,
        }
    }

    fn metadata_value(&self, key: &str) -> Option<&str> {
        self.setup
            .as_ref()
            .and_then(|m| m.get(key))
            .or_else(|| self.environment.as_ref().and_then(|m| m.get(key)))
            .map(String::as_str)
    }
}

/// Render the aggregate conclusions table.
///
/// Metadata columns are the union across all rows (sorted by name); rows
/// without a given column leave it blank.
pub fn conclusions_csv(rows: &[ConclusionRow]) -> AnalysisResult<String> {
    let mut metadata_keys: Vec<String> = Vec::new();
    for row in rows {
        for map in [&row.setup, &row.environment].into_iter().flatten() {
            for key in map.keys() {
                if !metadata_keys.contains(key) {
                    metadata_keys.push(key.clone());
                }
            }
        }
    }
    metadata_keys.sort();

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec![
        "File name".to_string(),
        "Number of measurements".to_string(),
        "Pin44 Active (count)".to_string(),
        "Pin44 Active (%)".to_string(),
        "Pin45 Active (count)".to_string(),
        "Pin45 Active (%)".to_string(),
        "Out of Range (count)".to_string(),
        "Out of Range (%)".to_string(),
    ];
    header.extend(metadata_keys.iter().cloned());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.file.clone(),
            row.measurements.to_string(),
            row.pin44_count.to_string(),
            format!("{}", round2(row.pin44_pct)),
            row.pin45_count.to_string(),
            format!("{}", round2(row.pin45_pct)),
            row.out_count.to_string(),
            format!("{}", round2(row.out_pct)),
        ];
        for key in &metadata_keys {
            record.push(row.metadata_value(key).unwrap_or("").to_string());
        }
        writer.write_record(&record)?;
    }
    Ok(finish(writer))
}

/// Bundle named CSV payloads into one ZIP archive.
pub fn bundle_zip(entries: &[(String, Vec<u8>)]) -> AnalysisResult<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(data)?;
    }
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> String {
    // Writing to a Vec never fails and the payload is valid UTF-8.
    String::from_utf8(writer.into_inner().unwrap_or_default()).unwrap_or_default()
}

fn flag(active: bool) -> String {
    if active { "1" } else { "0" }.to_string()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnMapping;
    use crate::stats::GroupStats;

    fn report_with_rows(rows: Vec<GroupStats>) -> FileReport {
        let pin44_count = rows.iter().filter(|r| r.pin44_active).count();
        let pin45_count = rows.iter().filter(|r| r.pin45_active).count();
        let out_count = rows.len() - pin44_count - pin45_count;
        FileReport {
            rows,
            mapping: ColumnMapping::Positional,
            skipped_rows: 0,
            pin44_count,
            pin45_count,
            out_count,
        }
    }

    fn active_row(group: &str) -> GroupStats {
        GroupStats {
            group: group.to_string(),
            total_samples: 4,
            pin44_active: true,
            pin45_active: false,
            avg_pin44: 3100.456,
            avg_pin45: 3200.0,
            out_of_range: false,
            insufficient: false,
        }
    }

    #[test]
    fn analysis_header_carries_percentages() {
        let report = report_with_rows(vec![active_row("1")]);
        let csv = analysis_csv(&report).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.contains("Measurement Number (1)"));
        assert!(header.contains("Pin44 Active (100)"));
        assert!(header.contains("Out of Normal Range (0%)"));
        assert!(csv.lines().nth(1).unwrap().contains("3100.46"));
    }

    #[test]
    fn file_name_prefers_the_source_token() {
        assert_eq!(
            analysis_file_name("2025-09-15_14-20-12_meas_10000.csv", false),
            "2025-09-15_14-20-12_analysis.csv"
        );
        assert_eq!(
            analysis_file_name("2025-09-15_14-20-12_meas_10000.csv", true),
            "2025-09-15_14-20-12_analysis_SM.csv"
        );
        // Foreign names fall back to a current timestamp.
        let name = analysis_file_name("readings.csv", false);
        assert!(name.ends_with("_analysis.csv"));
    }

    #[test]
    fn conclusions_union_metadata_columns() {
        let report = report_with_rows(vec![active_row("1")]);
        let with_setup = ConclusionRow::new(
            "a.csv",
            &report,
            Some(MetadataRow::from([(
                "LASER_POWER".to_string(),
                "1.5".to_string(),
            )])),
            None,
        );
        let bare = ConclusionRow::new("b.csv", &report, None, None);
        let csv = conclusions_csv(&[with_setup, bare]).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().ends_with("LASER_POWER"));
        assert!(lines.next().unwrap().contains("1.5"));
        assert!(lines.next().unwrap().ends_with(','));
    }

    #[test]
    fn zip_bundle_contains_all_entries() {
        let entries = vec![
            ("one.csv".to_string(), b"a,b\n1,2\n".to_vec()),
            ("two.csv".to_string(), b"c,d\n3,4\n".to_vec()),
        ];
        let bytes = bundle_zip(&entries).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("one.csv").is_ok());
    }
}
