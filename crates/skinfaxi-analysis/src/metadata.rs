//! Setup and environment metadata joins.
//!
//! Measurement files are named `YYYY-MM-DD_HH-MM-SS_meas_<N>.csv`. That
//! token links a file to the row describing the run in the setup table and
//! to the closest entry of the lab's environment logger. Both joins are
//! best-effort: a missing table, a foreign file name, or no matching row
//! simply yields nothing.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::AnalysisResult;
use crate::ingest;

/// Metadata columns attached to a conclusion row, keyed by header.
pub type MetadataRow = BTreeMap<String, String>;

/// The timestamp token parsed from a measurement file's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileToken {
    /// `YYYY-MM-DD_HH-MM-SS` as it appears in the name.
    pub stamp: String,
    /// The `<N>` of `_meas_<N>`, when present.
    pub measurements: Option<u64>,
}

impl FileToken {
    /// Parse the token from a file name (not a path).
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
        let (stamp, count) = match stem.split_once("_meas_") {
            Some((stamp, count)) => (stamp, count.parse::<u64>().ok()),
            None => (stem, None),
        };
        if !is_stamp(stamp) {
            return None;
        }
        Some(Self {
            stamp: stamp.to_string(),
            measurements: count,
        })
    }

    /// The stamp's date as the environment logger writes it: `dd.mm.yyyy`.
    pub fn logger_date(&self) -> Option<String> {
        let date = self.stamp.split('_').next()?;
        let mut parts = date.split('-');
        let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
        Some(format!(
            "{:02}.{:02}.{}",
            day.parse::<u8>().ok()?,
            month.parse::<u8>().ok()?,
            year
        ))
    }

    /// The stamp's time to minute precision: `HH:MM`.
    pub fn logger_time(&self) -> Option<String> {
        let time = self.stamp.split('_').nth(1)?;
        let hhmm = time.replace('-', ":");
        Some(hhmm.get(..5)?.to_string())
    }
}

/// `YYYY-MM-DD_HH-MM-SS` shape check.
fn is_stamp(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 19 {
        return false;
    }
    for (i, &b) in bytes.iter().enumerate() {
        let ok = match i {
            4 | 7 => b == b'-',
            10 => b == b'_',
            13 | 16 => b == b'-',
            _ => b.is_ascii_digit(),
        };
        if !ok {
            return false;
        }
    }
    true
}

/// The run-parameters table (`measurements_setup.csv`).
#[derive(Debug, Clone, Default)]
pub struct SetupTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SetupTable {
    /// Load the table; delimiter and encoding are sniffed like any other
    /// measurement file.
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let bytes = std::fs::read(path)?;
        let (headers, rows) = read_table(&bytes, 0)?;
        Ok(Self { headers, rows })
    }

    /// Setup row for a file token: equality on start datetime and, when
    /// the token carries one, on the measurement count.
    pub fn find(&self, token: &FileToken) -> Option<MetadataRow> {
        let dt_col = self.column("MEASUREMENT_START_DATETIME")?;
        let n_col = self.column("NUMBER_OF_MEASUREMENTS");
        let row = self.rows.iter().find(|row| {
            let dt_ok = row.get(dt_col).is_some_and(|v| v == &token.stamp);
            let n_ok = match (token.measurements, n_col) {
                (Some(n), Some(col)) => row
                    .get(col)
                    .and_then(|v| v.parse::<u64>().ok())
                    .is_some_and(|v| v == n),
                _ => true,
            };
            dt_ok && n_ok
        })?;
        Some(zip_row(&self.headers, row))
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }
}

/// Fixed column names the environment logger writes after its preamble.
const ENVIRONMENT_HEADERS: [&str; 6] = [
    "DATE",
    "TIME",
    "HUMIDITY_BOX",
    "TEMPERATURE_BOX",
    "HUMIDITY_ROOM",
    "TEMPERATURE_ROOM",
];

/// Rows the environment logger writes before the data: device banner,
/// calibration block, units line.
const ENVIRONMENT_PREAMBLE_ROWS: usize = 6;

/// One environment logger export.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentTable {
    rows: Vec<Vec<String>>,
}

impl EnvironmentTable {
    /// Load a logger export, dropping the preamble.
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let bytes = std::fs::read(path)?;
        let (_, rows) = read_table(&bytes, ENVIRONMENT_PREAMBLE_ROWS)?;
        Ok(Self { rows })
    }

    /// Logger row whose date contains the token's date and whose time
    /// equals the token's `HH:MM`.
    pub fn find(&self, token: &FileToken) -> Option<MetadataRow> {
        let date = token.logger_date()?;
        let time = token.logger_time()?;
        let row = self.rows.iter().find(|row| {
            let date_ok = row.first().is_some_and(|v| v.contains(&date));
            let time_ok = row
                .get(1)
                .is_some_and(|v| v.get(..5).unwrap_or(v.as_str()) == time);
            date_ok && time_ok
        })?;
        let headers: Vec<String> = ENVIRONMENT_HEADERS
            .iter()
            .take(row.len())
            .map(|s| s.to_string())
            .collect();
        Some(zip_row(&headers, row))
    }
}

/// Look up metadata for one file across the setup table and any number of
/// environment logs. First environment match wins.
pub fn lookup(
    file_name: &str,
    setup: Option<&SetupTable>,
    environments: &[EnvironmentTable],
) -> (Option<MetadataRow>, Option<MetadataRow>) {
    let Some(token) = FileToken::parse(file_name) else {
        debug!(file_name, "no timestamp token — skipping metadata joins");
        return (None, None);
    };
    let setup_row = setup.and_then(|t| t.find(&token));
    let env_row = environments.iter().find_map(|t| t.find(&token));
    (setup_row, env_row)
}

fn read_table(bytes: &[u8], skip_rows: usize) -> AnalysisResult<(Vec<String>, Vec<Vec<String>>)> {
    // Reuse the measurement decoder and sniffer; metadata tables come off
    // the same instruments.
    let (text, _) = ingest::decode(bytes);
    let delimiter = ingest::sniff_delimiter(&text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut all: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        all.push(record.iter().map(|f| f.trim().to_string()).collect());
    }
    let mut remaining = all.into_iter().skip(skip_rows);
    let headers = remaining.next().unwrap_or_default();
    Ok((headers, remaining.collect()))
}

fn zip_row(headers: &[String], row: &[String]) -> MetadataRow {
    headers
        .iter()
        .zip(row)
        .map(|(h, v)| (h.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_parses_full_measurement_names() {
        let token = FileToken::parse("2025-09-15_14-20-12_meas_10000.csv").unwrap();
        assert_eq!(token.stamp, "2025-09-15_14-20-12");
        assert_eq!(token.measurements, Some(10000));
        assert_eq!(token.logger_date().unwrap(), "15.09.2025");
        assert_eq!(token.logger_time().unwrap(), "14:20");
    }

    #[test]
    fn token_accepts_stamp_only_names() {
        let token = FileToken::parse("2025-07-23_14-22-52.csv").unwrap();
        assert_eq!(token.measurements, None);
    }

    #[test]
    fn foreign_names_have_no_token() {
        assert_eq!(FileToken::parse("readings_final.csv"), None);
        assert_eq!(FileToken::parse("2025-09-15.csv"), None);
    }

    #[test]
    fn setup_join_matches_datetime_and_count() {
        let table = SetupTable {
            headers: vec![
                "MEASUREMENT_START_DATETIME".into(),
                "NUMBER_OF_MEASUREMENTS".into(),
                "LASER_POWER".into(),
            ],
            rows: vec![
                vec!["2025-09-15_14-20-12".into(), "10000".into(), "1.5".into()],
                vec!["2025-09-15_14-20-12".into(), "500".into(), "2.0".into()],
            ],
        };
        let token = FileToken::parse("2025-09-15_14-20-12_meas_500.csv").unwrap();
        let row = table.find(&token).unwrap();
        assert_eq!(row["LASER_POWER"], "2.0");
    }

    #[test]
    fn environment_join_matches_date_and_minute() {
        let table = EnvironmentTable {
            rows: vec![
                vec!["15.09.2025".into(), "14:19:59".into(), "45".into(), "22.1".into()],
                vec!["15.09.2025".into(), "14:20:01".into(), "46".into(), "22.3".into()],
            ],
        };
        let token = FileToken::parse("2025-09-15_14-20-12_meas_10.csv").unwrap();
        let row = table.find(&token).unwrap();
        assert_eq!(row["HUMIDITY_BOX"], "46");
    }

    #[test]
    fn missing_matches_are_silent() {
        let (setup, env) = lookup("whatever.csv", None, &[]);
        assert!(setup.is_none() && env.is_none());
    }
}
