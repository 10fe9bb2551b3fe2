//! `skinfaxi-analysis` — measurement-file ingestion and statistics.
//!
//! Turns lab measurement exports (CSV/TSV/TXT, mixed encodings, with or
//! without headers) into per-group detector statistics and batch-level
//! conclusion tables:
//!
//! - **Ingest** — encoding fallback, delimiter sniffing, synonym-driven
//!   column detection with a positional fallback
//! - **Stats** — grouping by measurement number, the fixed
//!   activity-classification rule, placeholder rows for short groups
//! - **Metadata** — joining setup-parameter and environment-log tables
//!   against the timestamp token in a measurement file's name
//! - **Export** — per-file analysis CSVs, an aggregate conclusions CSV,
//!   optional ZIP bundling
//!
//! One malformed row never aborts a file, and one malformed file never
//! aborts a batch.

pub mod batch;
pub mod columns;
pub mod error;
pub mod export;
pub mod ingest;
pub mod metadata;
pub mod stats;

pub use batch::{BatchOptions, BatchOutcome, analyze_batch};
pub use columns::ColumnMapping;
pub use error::{AnalysisError, AnalysisResult};
pub use export::{ConclusionRow, analysis_csv, analysis_file_name, bundle_zip, conclusions_csv};
pub use ingest::{Ingest, Sample, ingest_bytes, ingest_path};
pub use metadata::{EnvironmentTable, FileToken, SetupTable};
pub use stats::{Activity, FileReport, GroupStats, classify};
