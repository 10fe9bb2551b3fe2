//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - BB84 demonstrator and polarisation-lab analysis",
        style("Skinfaxi").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  skinfaxi-bb84      Photon-exchange simulation and keystream cipher");
    println!("  skinfaxi-entropy   Quantum-randomness client with local fallback");
    println!("  skinfaxi-analysis  Measurement ingestion and statistics export");
    println!("  skinfaxi-cli       Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/hiq-lab/skinfaxi").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
