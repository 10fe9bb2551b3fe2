//! Encrypt command implementation.

use std::path::Path;

use anyhow::Result;

use skinfaxi_bb84::xor_encrypt;

use super::common::{load_key, print_transcript, warn};

/// Execute the encrypt command.
pub fn execute(
    key: Option<&str>,
    key_file: Option<&Path>,
    message: &str,
    explain: bool,
    json: bool,
) -> Result<()> {
    let Some(key) = load_key(key, key_file)? else {
        // Missing or empty key is a user-input problem, already warned.
        return Ok(());
    };

    let transcript = match xor_encrypt(&key, message) {
        Ok(t) => t,
        Err(e) => {
            warn(&e.to_string());
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
    } else {
        print_transcript(&transcript, explain);
    }
    Ok(())
}
