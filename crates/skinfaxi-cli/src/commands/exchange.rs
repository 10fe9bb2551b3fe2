//! Exchange command implementation: simulate, then encrypt with the key.
//!
//! The sifted key travels from the simulation to the encryption step as a
//! plain return value — there is no shared key store.

use anyhow::Result;
use console::style;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use skinfaxi_bb84::{BitPool, Exchange, ExchangeConfig, Verdict, xor_encrypt};

use super::common::{parse_policy, print_summary, print_transcript, warn};

/// Execute the exchange command.
pub fn execute(
    message: &str,
    photons: usize,
    eve: bool,
    noise: f64,
    policy: &str,
    seed: Option<u64>,
    explain: bool,
) -> Result<()> {
    let config = ExchangeConfig {
        photons,
        eavesdropper: eve,
        noise,
        policy: parse_policy(policy)?,
    };

    println!(
        "{} Exchanging a key over {} photons",
        style("→").cyan().bold(),
        style(photons).green()
    );

    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let exchange = Exchange::run_with_rng(&config, &mut rng, &mut BitPool::empty())?;
    print_summary(&exchange);

    let Some(key) = &exchange.key else {
        warn("Eve was enabled — no key was retained, nothing to encrypt");
        return Ok(());
    };
    if exchange.summary.verdict == Verdict::EveLikely {
        warn("error rate points at eavesdropping — refusing to use this key");
        return Ok(());
    }
    if key.is_empty() {
        warn("no basis matches — the sifted key is empty, try more photons");
        return Ok(());
    }

    println!("\n  Sifted key ({} bits): {}", key.len(), style(key).cyan());

    match xor_encrypt(key, message) {
        Ok(transcript) => print_transcript(&transcript, explain),
        Err(e) => warn(&e.to_string()),
    }
    Ok(())
}
