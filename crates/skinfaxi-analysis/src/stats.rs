//! Per-group detector statistics and activity classification.
//!
//! Rows are grouped by measurement number; each group's activity is judged
//! from the averages of its 3rd and 4th samples only (the settled middle
//! of the pulse — the leading samples still carry the switching
//! transient). The thresholds are the empirically calibrated constants the
//! downstream consumers of these CSVs expect; do not tune them here.

use serde::Serialize;

use crate::columns::ColumnMapping;
use crate::ingest::{Ingest, Sample};

/// pin44 is active above this average (exclusive) on both detectors.
pub const PIN44_ACTIVE_MIN: f64 = 3000.0;

/// pin44 must idle below this average (exclusive) for a pin45 verdict.
pub const PIN44_IDLE_MAX: f64 = 40.0;

/// pin45 is active above this average (exclusive) when pin44 idles.
pub const PIN45_ACTIVE_MIN: f64 = 180.0;

/// Groups need this many samples for a verdict.
pub const MIN_SAMPLES: usize = 4;

/// Activity verdict for one measurement group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Both detector averages sit in the pin44-active band.
    Pin44,
    /// pin44 idles while pin45 reads above its floor.
    Pin45,
    /// Neither band matched — noise or an out-of-range pulse.
    OutOfRange,
}

/// Classify a group from its mid-pulse averages.
///
/// Boundaries are exclusive: an average of exactly 3000 does not count as
/// active.
pub fn classify(avg_pin44: f64, avg_pin45: f64) -> Activity {
    if avg_pin44 > PIN44_ACTIVE_MIN && avg_pin45 > PIN44_ACTIVE_MIN {
        Activity::Pin44
    } else if avg_pin44 < PIN44_IDLE_MAX && avg_pin45 > PIN45_ACTIVE_MIN {
        Activity::Pin45
    } else {
        Activity::OutOfRange
    }
}

/// Statistics row for one measurement group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    /// Group identifier, verbatim from the file.
    pub group: String,
    /// Samples seen for this group.
    pub total_samples: usize,
    /// pin44-active flag.
    pub pin44_active: bool,
    /// pin45-active flag.
    pub pin45_active: bool,
    /// Mid-pulse pin44 average (0 for short groups).
    pub avg_pin44: f64,
    /// Mid-pulse pin45 average (0 for short groups).
    pub avg_pin45: f64,
    /// Out-of-range flag.
    pub out_of_range: bool,
    /// Group had fewer than [`MIN_SAMPLES`] samples; all figures are
    /// placeholders.
    pub insufficient: bool,
}

impl GroupStats {
    fn placeholder(group: String, total_samples: usize) -> Self {
        Self {
            group,
            total_samples,
            pin44_active: false,
            pin45_active: false,
            avg_pin44: 0.0,
            avg_pin45: 0.0,
            out_of_range: false,
            insufficient: true,
        }
    }
}

/// Per-file report: group rows plus batch-level tallies.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// One row per group, sorted by group id.
    pub rows: Vec<GroupStats>,
    /// How the source columns were located.
    pub mapping: ColumnMapping,
    /// Source rows dropped during ingestion.
    pub skipped_rows: usize,
    /// pin44-active group count.
    pub pin44_count: usize,
    /// pin45-active group count.
    pub pin45_count: usize,
    /// Groups in neither band (includes placeholders).
    pub out_count: usize,
}

impl FileReport {
    /// Build the report for one ingested file.
    pub fn from_ingest(ingest: &Ingest) -> Self {
        let rows = group_stats(&ingest.samples);
        let pin44_count = rows.iter().filter(|r| r.pin44_active).count();
        let pin45_count = rows.iter().filter(|r| r.pin45_active).count();
        let out_count = rows.len() - pin44_count - pin45_count;
        Self {
            rows,
            mapping: ingest.mapping.clone(),
            skipped_rows: ingest.skipped_rows,
            pin44_count,
            pin45_count,
            out_count,
        }
    }

    /// Number of analyzed groups.
    pub fn groups(&self) -> usize {
        self.rows.len()
    }

    /// pin44-active percentage of all groups.
    pub fn pin44_pct(&self) -> f64 {
        percentage(self.pin44_count, self.groups())
    }

    /// pin45-active percentage of all groups.
    pub fn pin45_pct(&self) -> f64 {
        percentage(self.pin45_count, self.groups())
    }

    /// Out-of-range percentage, as the complement so the three figures
    /// total 100.
    pub fn out_pct(&self) -> f64 {
        if self.groups() == 0 {
            0.0
        } else {
            100.0 - self.pin44_pct() - self.pin45_pct()
        }
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Group samples by measurement id and compute each group's row.
pub fn group_stats(samples: &[Sample]) -> Vec<GroupStats> {
    use rustc_hash::FxHashMap;

    let mut order: Vec<&str> = Vec::new();
    let mut groups: FxHashMap<&str, Vec<&Sample>> = FxHashMap::default();
    for sample in samples {
        groups
            .entry(sample.group.as_str())
            .or_insert_with(|| {
                order.push(sample.group.as_str());
                Vec::new()
            })
            .push(sample);
    }

    let mut rows: Vec<GroupStats> = order
        .into_iter()
        .map(|group| {
            let members = &groups[group];
            if members.len() < MIN_SAMPLES {
                return GroupStats::placeholder(group.to_string(), members.len());
            }
            // 3rd and 4th samples carry the verdict.
            let (third, fourth) = (members[2], members[3]);
            let avg_pin44 = (third.pin44 + fourth.pin44) / 2.0;
            let avg_pin45 = (third.pin45 + fourth.pin45) / 2.0;
            let activity = classify(avg_pin44, avg_pin45);
            GroupStats {
                group: group.to_string(),
                total_samples: members.len(),
                pin44_active: activity == Activity::Pin44,
                pin45_active: activity == Activity::Pin45,
                avg_pin44,
                avg_pin45,
                out_of_range: activity == Activity::OutOfRange,
                insufficient: false,
            }
        })
        .collect();

    sort_rows(&mut rows);
    rows
}

/// Sort group rows numerically when every id parses as a number, else
/// lexicographically.
fn sort_rows(rows: &mut [GroupStats]) {
    let all_numeric = rows.iter().all(|r| r.group.parse::<f64>().is_ok());
    if all_numeric {
        rows.sort_by(|a, b| {
            let (x, y) = (
                a.group.parse::<f64>().unwrap_or(f64::MAX),
                b.group.parse::<f64>().unwrap_or(f64::MAX),
            );
            x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
        });
    } else {
        rows.sort_by(|a, b| a.group.cmp(&b.group));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(group: &str, pin44: f64, pin45: f64) -> Sample {
        Sample {
            group: group.to_string(),
            pin44,
            pin45,
        }
    }

    #[test]
    fn boundary_3000_is_not_active() {
        assert_eq!(classify(3000.0, 3200.0), Activity::OutOfRange);
        assert_eq!(classify(3001.0, 3001.0), Activity::Pin44);
    }

    #[test]
    fn pin45_band_needs_idle_pin44() {
        assert_eq!(classify(39.9, 181.0), Activity::Pin45);
        assert_eq!(classify(40.0, 181.0), Activity::OutOfRange);
        assert_eq!(classify(39.9, 180.0), Activity::OutOfRange);
    }

    #[test]
    fn short_group_gets_placeholder_row() {
        let samples = vec![
            sample("7", 3100.0, 3100.0),
            sample("7", 3100.0, 3100.0),
            sample("7", 3100.0, 3100.0),
        ];
        let rows = group_stats(&samples);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!(row.insufficient);
        assert_eq!(row.total_samples, 3);
        assert_eq!(row.avg_pin44, 0.0);
        assert!(!row.pin44_active && !row.pin45_active && !row.out_of_range);
    }

    #[test]
    fn verdict_uses_only_third_and_fourth_samples() {
        let samples = vec![
            sample("1", 0.0, 0.0),
            sample("1", 0.0, 0.0),
            sample("1", 3200.0, 3300.0),
            sample("1", 3400.0, 3100.0),
            sample("1", 0.0, 0.0),
        ];
        let rows = group_stats(&samples);
        assert_eq!(rows[0].avg_pin44, 3300.0);
        assert_eq!(rows[0].avg_pin45, 3200.0);
        assert!(rows[0].pin44_active);
        assert_eq!(rows[0].total_samples, 5);
    }

    #[test]
    fn rows_sort_numerically_when_possible() {
        let samples = vec![
            sample("10", 1.0, 1.0),
            sample("2", 1.0, 1.0),
            sample("1", 1.0, 1.0),
        ];
        let rows = group_stats(&samples);
        let ids: Vec<&str> = rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(ids, ["1", "2", "10"]);
    }

    #[test]
    fn report_percentages_total_one_hundred() {
        let mut samples = Vec::new();
        for g in ["1", "2", "3"] {
            for _ in 0..4 {
                samples.push(sample(g, 3100.0, 3100.0));
            }
        }
        samples.push(sample("4", 1.0, 1.0)); // short group → out bucket
        let ingest = crate::ingest::Ingest {
            samples,
            mapping: ColumnMapping::Positional,
            skipped_rows: 0,
            delimiter: b',',
            encoding: "utf-8",
        };
        let report = FileReport::from_ingest(&ingest);
        assert_eq!(report.pin44_count, 3);
        assert_eq!(report.out_count, 1);
        let total = report.pin44_pct() + report.pin45_pct() + report.out_pct();
        assert!((total - 100.0).abs() < 1e-9);
    }
}
