//! Skinfaxi Command-Line Interface
//!
//! The main entry point for the Skinfaxi CLI tool.
//!
//! ```text
//!              S K I N F A X I
//!      BB84 key exchange, demonstrated
//!        and polarisation-lab analysis
//!
//!   "The shining mane pulls the day along"
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{analyze, encrypt, exchange, practice, simulate, version};

/// Skinfaxi - BB84 demonstrator and measurement analysis for the polarisation lab
#[derive(Parser)]
#[command(name = "skinfaxi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a BB84 photon exchange
    Simulate {
        /// Number of photons to transmit
        #[arg(short = 'n', long, default_value = "100")]
        photons: usize,

        /// Enable the intercept-resend eavesdropper
        #[arg(long)]
        eve: bool,

        /// Channel-noise probability (0.0 - 0.1)
        #[arg(long, default_value = "0.02")]
        noise: f64,

        /// Eavesdropper-detection policy (fixed, relative)
        #[arg(long, default_value = "fixed")]
        policy: String,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Draw uninformative outcomes from the remote QRNG service
        #[arg(long)]
        qrng: bool,

        /// QRNG service base URL
        #[arg(long, env = "SKINFAXI_QRNG_URL")]
        qrng_url: Option<String>,

        /// Number of event rows to print (0 = none)
        #[arg(long, default_value = "16")]
        table: usize,

        /// Write the full exchange as JSON
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Write the sifted key to a file (skipped when Eve is on)
        #[arg(short, long)]
        key_out: Option<PathBuf>,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Encrypt a message with a sifted key via XOR
    Encrypt {
        /// Message to encrypt (ASCII / Latin-1)
        message: String,

        /// Key bits as a 0/1 string
        #[arg(short, long)]
        key: Option<String>,

        /// Read the key from a file written by `simulate --key-out`
        #[arg(long)]
        key_file: Option<PathBuf>,

        /// Print the bit-by-bit explanation table
        #[arg(long)]
        explain: bool,

        /// Print the transcript as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run a simulation and encrypt a message with the fresh key
    Exchange {
        /// Message to encrypt with the sifted key
        message: String,

        /// Number of photons to transmit
        #[arg(short = 'n', long, default_value = "256")]
        photons: usize,

        /// Enable the eavesdropper (the encryption step will refuse)
        #[arg(long)]
        eve: bool,

        /// Channel-noise probability (0.0 - 0.1)
        #[arg(long, default_value = "0.0")]
        noise: f64,

        /// Eavesdropper-detection policy (fixed, relative)
        #[arg(long, default_value = "fixed")]
        policy: String,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Print the bit-by-bit explanation table
        #[arg(long)]
        explain: bool,
    },

    /// Generate (and grade) a basis-matching drill sheet
    Practice {
        /// Number of drill rows
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,

        /// Seed for a reproducible sheet
        #[arg(long)]
        seed: Option<u64>,

        /// Comma-separated answers (0, 1 or r) to grade
        #[arg(short, long)]
        answers: Option<String>,

        /// Print the expected column alongside the sheet
        #[arg(long)]
        reveal: bool,
    },

    /// Analyze measurement files and export statistics CSVs
    Analyze {
        /// Measurement files (CSV/TSV/TXT)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Setup-parameters table to join against
        #[arg(long)]
        setup: Option<PathBuf>,

        /// Environment logger exports to join against
        #[arg(long = "environment")]
        environments: Vec<PathBuf>,

        /// Directory for the generated CSVs
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Bundle the per-file CSVs into a ZIP archive
        #[arg(long)]
        zip: bool,

        /// File name for the aggregate conclusions CSV
        #[arg(long, default_value = "all_conclusions.csv")]
        conclusions: String,

        /// Mark outputs as produced in simulate mode
        #[arg(long)]
        simulate_mode: bool,

        /// Print per-file reports as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Simulate {
            photons,
            eve,
            noise,
            policy,
            seed,
            qrng,
            qrng_url,
            table,
            export,
            key_out,
            json,
        } => {
            simulate::execute(simulate::SimulateOpts {
                photons,
                eve,
                noise,
                policy,
                seed,
                qrng,
                qrng_url,
                table,
                export,
                key_out,
                json,
            })
            .await
        }

        Commands::Encrypt {
            message,
            key,
            key_file,
            explain,
            json,
        } => encrypt::execute(key.as_deref(), key_file.as_deref(), &message, explain, json),

        Commands::Exchange {
            message,
            photons,
            eve,
            noise,
            policy,
            seed,
            explain,
        } => exchange::execute(&message, photons, eve, noise, &policy, seed, explain),

        Commands::Practice {
            rows,
            seed,
            answers,
            reveal,
        } => practice::execute(rows, seed, answers.as_deref(), reveal),

        Commands::Analyze {
            files,
            setup,
            environments,
            out_dir,
            zip,
            conclusions,
            simulate_mode,
            json,
        } => analyze::execute(analyze::AnalyzeOpts {
            files,
            setup,
            environments,
            out_dir,
            zip,
            conclusions,
            simulate_mode,
            json,
        }),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
