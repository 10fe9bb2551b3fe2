//! Batch processing over many measurement files.
//!
//! Mirrors the lab workflow: analyze each file, emit its analysis CSV,
//! collect one conclusion line per file, and optionally bundle everything
//! into a ZIP. A file that fails to ingest is reported and the batch moves
//! on.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{AnalysisError, AnalysisResult};
use crate::export::{ConclusionRow, analysis_csv, analysis_file_name};
use crate::ingest::ingest_path;
use crate::metadata::{EnvironmentTable, SetupTable, lookup};
use crate::stats::FileReport;

/// Batch-level inputs besides the measurement files themselves.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Setup-parameters table to join against, when available.
    pub setup: Option<PathBuf>,
    /// Environment logger exports to join against.
    pub environments: Vec<PathBuf>,
    /// Mark output names with the simulate-mode suffix.
    pub simulate_mode: bool,
}

/// One analyzed file: output name, rendered CSV, and the report behind it.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Source file name.
    pub source: String,
    /// Output CSV name.
    pub output_name: String,
    /// Rendered analysis CSV.
    pub csv: String,
    /// The underlying report.
    pub report: FileReport,
}

/// Everything a batch produced.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Per-file analyses, in input order.
    pub entries: Vec<BatchEntry>,
    /// One conclusion line per analyzed file.
    pub conclusions: Vec<ConclusionRow>,
    /// Files that could not be analyzed, with the failure text.
    pub failures: Vec<(String, String)>,
}

impl BatchOutcome {
    /// ZIP payload entries for [`crate::export::bundle_zip`].
    pub fn zip_entries(&self) -> Vec<(String, Vec<u8>)> {
        self.entries
            .iter()
            .map(|e| (e.output_name.clone(), e.csv.clone().into_bytes()))
            .collect()
    }
}

/// Analyze a batch of measurement files.
///
/// Metadata tables that fail to load are treated as absent — the
/// measurements still analyze without their joins.
pub fn analyze_batch(files: &[PathBuf], options: &BatchOptions) -> BatchOutcome {
    let setup = options.setup.as_deref().and_then(load_setup);
    let environments: Vec<EnvironmentTable> = options
        .environments
        .iter()
        .filter_map(|p| load_environment(p))
        .collect();

    let mut outcome = BatchOutcome::default();
    for path in files {
        let source = file_name(path);
        match analyze_one(path, &source, setup.as_ref(), &environments, options) {
            Ok((entry, conclusion)) => {
                outcome.entries.push(entry);
                outcome.conclusions.push(conclusion);
            }
            Err(e) => {
                warn!(file = source, error = %e, "skipping file");
                outcome.failures.push((source, e.to_string()));
            }
        }
    }
    outcome
}

fn analyze_one(
    path: &Path,
    source: &str,
    setup: Option<&SetupTable>,
    environments: &[EnvironmentTable],
    options: &BatchOptions,
) -> AnalysisResult<(BatchEntry, ConclusionRow)> {
    let ingest = ingest_path(path)?;
    let report = FileReport::from_ingest(&ingest);
    if report.rows.is_empty() {
        return Err(AnalysisError::NoRows);
    }

    let csv = analysis_csv(&report)?;
    let output_name = analysis_file_name(source, options.simulate_mode);
    let (setup_row, env_row) = lookup(source, setup, environments);
    let conclusion = ConclusionRow::new(source, &report, setup_row, env_row);

    Ok((
        BatchEntry {
            source: source.to_string(),
            output_name,
            csv,
            report,
        },
        conclusion,
    ))
}

fn load_setup(path: &Path) -> Option<SetupTable> {
    match SetupTable::load(path) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "setup table unavailable");
            None
        }
    }
}

fn load_environment(path: &Path) -> Option<EnvironmentTable> {
    match EnvironmentTable::load(path) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "environment log unavailable");
            None
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
