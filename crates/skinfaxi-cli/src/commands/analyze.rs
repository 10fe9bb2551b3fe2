//! Analyze command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use skinfaxi_analysis::{
    BatchOptions, BatchOutcome, analyze_batch, bundle_zip, conclusions_csv,
};

/// Arguments of one `analyze` invocation.
pub struct AnalyzeOpts {
    pub files: Vec<PathBuf>,
    pub setup: Option<PathBuf>,
    pub environments: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub zip: bool,
    pub conclusions: String,
    pub simulate_mode: bool,
    pub json: bool,
}

/// Execute the analyze command.
pub fn execute(opts: AnalyzeOpts) -> Result<()> {
    if !opts.json {
        println!(
            "{} Analyzing {} measurement file(s)",
            style("→").cyan().bold(),
            style(opts.files.len()).green()
        );
    }

    let spinner = (!opts.json && opts.files.len() > 1).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        bar.set_message("Analyzing...");
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar
    });

    let batch_options = BatchOptions {
        setup: opts.setup.clone(),
        environments: opts.environments.clone(),
        simulate_mode: opts.simulate_mode,
    };
    let outcome = analyze_batch(&opts.files, &batch_options);

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if opts.json {
        print_json(&outcome)?;
    } else {
        print_reports(&outcome);
    }

    if outcome.entries.is_empty() {
        anyhow::bail!("no file produced any analyzable measurements");
    }

    std::fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("Failed to create {}", opts.out_dir.display()))?;

    for entry in &outcome.entries {
        let path = opts.out_dir.join(&entry.output_name);
        std::fs::write(&path, &entry.csv)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !opts.json {
            println!("  Saved {}", style(path.display()).cyan());
        }
    }

    let conclusions = conclusions_csv(&outcome.conclusions)?;
    let conclusions_path = opts.out_dir.join(&opts.conclusions);
    std::fs::write(&conclusions_path, conclusions)
        .with_context(|| format!("Failed to write {}", conclusions_path.display()))?;
    if !opts.json {
        println!("  Saved {}", style(conclusions_path.display()).cyan());
    }

    // The batch tool only bundles when there is more than one analysis.
    if opts.zip && outcome.entries.len() > 1 {
        let bytes = bundle_zip(&outcome.zip_entries())?;
        let zip_path = opts.out_dir.join("all_analyses.zip");
        std::fs::write(&zip_path, bytes)
            .with_context(|| format!("Failed to write {}", zip_path.display()))?;
        if !opts.json {
            println!("  Saved {}", style(zip_path.display()).cyan());
        }
    }

    Ok(())
}

fn print_reports(outcome: &BatchOutcome) {
    for entry in &outcome.entries {
        let report = &entry.report;
        println!(
            "\n{} {}",
            style("✓").green().bold(),
            style(&entry.source).green()
        );
        println!("  Columns:        {}", report.mapping.describe());
        if report.skipped_rows > 0 {
            println!(
                "  Skipped rows:   {}",
                style(report.skipped_rows).yellow()
            );
        }
        println!("  Measurements:   {}", report.groups());
        println!(
            "  Pin44 active:   {} ({:.2}%)",
            report.pin44_count,
            report.pin44_pct()
        );
        println!(
            "  Pin45 active:   {} ({:.2}%)",
            report.pin45_count,
            report.pin45_pct()
        );
        println!(
            "  Out of range:   {} ({:.2}%)",
            report.out_count,
            report.out_pct()
        );
        let short = report.rows.iter().filter(|r| r.insufficient).count();
        if short > 0 {
            println!(
                "  {} group(s) had fewer than 4 samples — placeholder rows emitted",
                style(short).yellow()
            );
        }
    }

    for (file, error) in &outcome.failures {
        println!(
            "\n{} {} — {}",
            style("✗").red().bold(),
            style(file).red(),
            error
        );
    }
}

fn print_json(outcome: &BatchOutcome) -> Result<()> {
    let reports: Vec<serde_json::Value> = outcome
        .entries
        .iter()
        .map(|e| {
            Ok(serde_json::json!({
                "source": e.source,
                "output": e.output_name,
                "report": serde_json::to_value(&e.report)?,
            }))
        })
        .collect::<Result<_>>()?;
    let failures: Vec<serde_json::Value> = outcome
        .failures
        .iter()
        .map(|(file, error)| serde_json::json!({ "source": file, "error": error }))
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "analyses": reports,
            "failures": failures,
        }))?
    );
    Ok(())
}
