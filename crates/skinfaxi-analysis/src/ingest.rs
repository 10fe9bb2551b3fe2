//! Tolerant measurement-file ingestion.
//!
//! Lab exports arrive as CSV/TSV/TXT with unannounced delimiters, mixed
//! text encodings, and sometimes no header row. Ingestion sniffs all
//! three, then parses rows individually — a row that fails to parse is
//! counted and skipped, never fatal.

use std::path::Path;

use tracing::debug;

use crate::columns::{self, ColumnMapping, FALLBACK_INDEXES, NamedColumns};
use crate::error::{AnalysisError, AnalysisResult};

/// One parsed measurement row.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Measurement-group identifier, kept verbatim.
    pub group: String,
    /// pin44 detector reading.
    pub pin44: f64,
    /// pin45 detector reading.
    pub pin45: f64,
}

/// The result of ingesting one file.
#[derive(Debug, Clone)]
pub struct Ingest {
    /// Parsed rows in file order.
    pub samples: Vec<Sample>,
    /// How the columns were located.
    pub mapping: ColumnMapping,
    /// Rows dropped because a field failed to parse.
    pub skipped_rows: usize,
    /// Sniffed field delimiter.
    pub delimiter: u8,
    /// Name of the encoding that decoded the bytes.
    pub encoding: &'static str,
}

/// Ingest a measurement file from disk.
pub fn ingest_path(path: &Path) -> AnalysisResult<Ingest> {
    let bytes = std::fs::read(path)?;
    ingest_bytes(&bytes)
}

/// Ingest measurement bytes.
pub fn ingest_bytes(bytes: &[u8]) -> AnalysisResult<Ingest> {
    let (text, encoding) = decode(bytes);
    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|f| f.trim().to_string()).collect());
    }
    if rows.is_empty() {
        return Err(AnalysisError::NoRows);
    }

    let (samples, mapping, skipped_rows) = parse_rows(&rows)?;
    debug!(
        rows = samples.len(),
        skipped = skipped_rows,
        encoding,
        mapping = %mapping.describe(),
        "ingested measurement file"
    );

    if samples.is_empty() {
        return Err(AnalysisError::NoRows);
    }
    Ok(Ingest {
        samples,
        mapping,
        skipped_rows,
        delimiter,
        encoding,
    })
}

/// Decode file bytes: strict UTF-8 first, then Windows-1250 (the local lab
/// PCs' legacy code page), then Latin-1 as the infallible last resort.
pub(crate) fn decode(bytes: &[u8]) -> (String, &'static str) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), "utf-8");
    }
    let (text, _, had_errors) = encoding_rs::WINDOWS_1250.decode(bytes);
    if !had_errors {
        return (text.into_owned(), "windows-1250");
    }
    (
        encoding_rs::mem::decode_latin1(bytes).into_owned(),
        "latin1",
    )
}

/// Pick the delimiter by frequency over the leading lines.
pub(crate) fn sniff_delimiter(text: &str) -> u8 {
    let mut counts = [0usize; 3]; // comma, semicolon, tab
    for line in text.lines().take(8) {
        counts[0] += line.matches(',').count();
        counts[1] += line.matches(';').count();
        counts[2] += line.matches('\t').count();
    }
    const CANDIDATES: [u8; 3] = [b',', b';', b'\t'];
    let best = (0..CANDIDATES.len()).max_by_key(|&i| counts[i]).unwrap_or(0);
    if counts[best] == 0 {
        b','
    } else {
        CANDIDATES[best]
    }
}

fn parse_rows(rows: &[Vec<String>]) -> AnalysisResult<(Vec<Sample>, ColumnMapping, usize)> {
    let first = &rows[0];

    if let Some(named) = columns::detect(first) {
        let mapping = ColumnMapping::Named {
            group: first[named.group].clone(),
            pin44: first[named.pin44].clone(),
            pin45: first[named.pin45].clone(),
        };
        let (samples, skipped) = collect_samples(&rows[1..], named);
        return Ok((samples, mapping, skipped));
    }

    // Positional fallback. When the first row's value columns already hold
    // numbers the file is headerless and the first row is data; otherwise
    // the unrecognized header row is dropped.
    let (g, p44, p45) = FALLBACK_INDEXES;
    let positional = NamedColumns {
        group: g,
        pin44: p44,
        pin45: p45,
    };
    if first.len() <= p45 {
        return Err(AnalysisError::NoColumns);
    }
    let headerless = parse_sample(first, positional).is_some();
    let data = if headerless { rows } else { &rows[1..] };
    let (samples, skipped) = collect_samples(data, positional);
    Ok((samples, ColumnMapping::Positional, skipped))
}

fn collect_samples(rows: &[Vec<String>], cols: NamedColumns) -> (Vec<Sample>, usize) {
    let mut samples = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match parse_sample(row, cols) {
            Some(sample) => samples.push(sample),
            None => skipped += 1,
        }
    }
    (samples, skipped)
}

fn parse_sample(row: &[String], cols: NamedColumns) -> Option<Sample> {
    let group = row.get(cols.group)?;
    if group.is_empty() {
        return None;
    }
    let pin44: f64 = row.get(cols.pin44)?.parse().ok()?;
    let pin45: f64 = row.get(cols.pin45)?.parse().ok()?;
    Some(Sample {
        group: group.clone(),
        pin44,
        pin45,
    })
}
