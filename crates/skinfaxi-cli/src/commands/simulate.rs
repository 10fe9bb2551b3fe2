//! Simulate command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use skinfaxi_bb84::{BitPool, Exchange, ExchangeConfig};
use skinfaxi_entropy::{EntropySource, QrngClient};

use super::common::{parse_policy, print_event_table, print_summary};

/// Arguments of one `simulate` invocation.
pub struct SimulateOpts {
    pub photons: usize,
    pub eve: bool,
    pub noise: f64,
    pub policy: String,
    pub seed: Option<u64>,
    pub qrng: bool,
    pub qrng_url: Option<String>,
    pub table: usize,
    pub export: Option<PathBuf>,
    pub key_out: Option<PathBuf>,
    pub json: bool,
}

/// Execute the simulate command.
pub async fn execute(opts: SimulateOpts) -> Result<()> {
    let config = ExchangeConfig {
        photons: opts.photons,
        eavesdropper: opts.eve,
        noise: opts.noise,
        policy: parse_policy(&opts.policy)?,
    };

    if !opts.json {
        println!(
            "{} Simulating {} photons (Eve {}, noise {:.0}%)",
            style("→").cyan().bold(),
            style(opts.photons).green(),
            if opts.eve {
                style("on").red()
            } else {
                style("off").green()
            },
            opts.noise * 100.0
        );
    }

    // Uninformative outcomes: roughly half the photons hit a mismatched
    // basis, so fetch a full pool and let the RNG cover any shortfall.
    let source = entropy_source(opts.qrng, opts.qrng_url)?;
    let mut pool = if source.has_remote() {
        BitPool::new(source.bits(opts.photons).await)
    } else {
        BitPool::empty()
    };

    let mut rng = match opts.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let exchange = Exchange::run_with_rng(&config, &mut rng, &mut pool)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&exchange.summary)?);
    } else {
        print_event_table(&exchange, opts.table);
        print_summary(&exchange);
    }

    if let Some(path) = &opts.export {
        let json = serde_json::to_string_pretty(&exchange)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !opts.json {
            println!("  Exported exchange to {}", style(path.display()).cyan());
        }
    }

    match (&exchange.key, &opts.key_out) {
        (Some(key), Some(path)) => {
            std::fs::write(path, key.to_string())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !opts.json {
                println!(
                    "\n{} Sifted key ({} bits) written to {}",
                    style("✓").green().bold(),
                    key.len(),
                    style(path.display()).cyan()
                );
            }
        }
        (Some(key), None) => {
            if !opts.json {
                println!("\n{} Sifted key ({} bits):", style("✓").green().bold(), key.len());
                println!("  {key}");
            }
        }
        (None, _) => {
            if !opts.json {
                println!(
                    "\n{} Eve was enabled — the key is not retained.",
                    style("!").yellow().bold()
                );
            }
        }
    }

    Ok(())
}

fn entropy_source(qrng: bool, qrng_url: Option<String>) -> Result<EntropySource> {
    if !qrng {
        return Ok(EntropySource::local());
    }
    let client = match qrng_url {
        Some(url) => QrngClient::new(url),
        None => QrngClient::new(skinfaxi_entropy::client::DEFAULT_BASE_URL),
    }?;
    Ok(EntropySource::with_remote(client))
}
