//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use skinfaxi_bb84::{DetectionPolicy, Exchange, SiftedKey, Verdict, XorTranscript};

/// Parse the `--policy` argument.
pub fn parse_policy(policy: &str) -> Result<DetectionPolicy> {
    match policy.to_lowercase().as_str() {
        "fixed" => Ok(DetectionPolicy::default()),
        "relative" | "noise-relative" => Ok(DetectionPolicy::noise_relative()),
        other => {
            anyhow::bail!("Unknown policy: '{other}'. Available: fixed, relative");
        }
    }
}

/// Load a key from an inline argument or a key file.
///
/// Returns `None` (after printing a warning) when no key was supplied or
/// the supplied text holds no bits — user-input problems are warnings, not
/// failures.
pub fn load_key(key: Option<&str>, key_file: Option<&Path>) -> Result<Option<SiftedKey>> {
    let text = match (key, key_file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read key file: {}", path.display()))?,
        (None, None) => {
            warn("no key given — run `skinfaxi simulate --key-out <file>` first, or pass --key");
            return Ok(None);
        }
    };
    match SiftedKey::parse(&text) {
        Ok(key) => Ok(Some(key)),
        Err(e) => {
            warn(&e.to_string());
            Ok(None)
        }
    }
}

/// Print a styled, non-fatal warning.
pub fn warn(message: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), message);
}

/// Print the exchange summary block.
pub fn print_summary(exchange: &Exchange) {
    let s = &exchange.summary;
    println!("\n{} Exchange summary:", style("✓").green().bold());
    println!("  Photons sent:     {}", s.photons);
    println!("  Basis matches:    {} / {}", s.matches, s.photons);
    println!("  Agreements:       {} / {}", s.agreements, s.matches);
    println!("  Disagreements:    {} / {}", s.disagreements, s.matches);
    match s.qber {
        Some(qber) => println!("  QBER:             {:.2}%", qber * 100.0),
        None => println!("  QBER:             n/a"),
    }

    let verdict = match s.verdict {
        Verdict::Secure => style(s.verdict.describe()).green(),
        Verdict::Elevated => style(s.verdict.describe()).yellow(),
        Verdict::EveLikely => style(s.verdict.describe()).red().bold(),
        Verdict::InsufficientData => style(s.verdict.describe()).dim(),
    };
    println!("  Verdict:          {verdict}");
}

/// Print the leading rows of the event table.
pub fn print_event_table(exchange: &Exchange, limit: usize) {
    if limit == 0 || exchange.events.is_empty() {
        return;
    }

    println!(
        "\n  {:>4}  {:>6}  {:>5}  {:>9}  {:>6}  {:>5}  {:>5}  note",
        "#", "A pol", "A bit", "Eve", "B ana", "match", "B bit"
    );
    for (i, event) in exchange.events.iter().take(limit).enumerate() {
        let eve = match event.intercept {
            Some(ic) => format!("{}°/{}", ic.angle, ic.bit as u8),
            None => "-".to_string(),
        };
        let matched = if event.bases_match {
            style("yes").green()
        } else {
            style("no").dim()
        };
        println!(
            "  {:>4}  {:>5}°  {:>5}  {:>9}  {:>5}°  {:>5}  {:>5}  {}",
            i + 1,
            event.sender_angle,
            event.sender_bit as u8,
            eve,
            event.receiver_angle,
            matched,
            event.receiver_bit as u8,
            style(event.measurement.describe()).dim()
        );
    }
    if exchange.events.len() > limit {
        println!("  ... and {} more photons", exchange.events.len() - limit);
    }
}

/// Print the ciphertext and, on request, the bit-by-bit table.
pub fn print_transcript(transcript: &XorTranscript, explain: bool) {
    println!("\n{} Encrypted message:", style("✓").green().bold());
    println!("  {}", style(&transcript.ciphertext).cyan());
    println!(
        "  cipher bits: {}",
        transcript
            .cipher_bits
            .iter()
            .map(|&b| if b { '1' } else { '0' })
            .collect::<String>()
    );

    if explain {
        println!("\n  {:>4}  {:>7}  {:>3}  {:>3}  explanation", "pos", "msg", "key", "xor");
        for row in transcript.trace() {
            println!(
                "  {:>4}  {:>7}  {:>3}  {:>3}  {}",
                row.position,
                row.message_bit,
                row.key_bit,
                row.cipher_bit,
                style(row.note()).dim()
            );
        }
    }
}
