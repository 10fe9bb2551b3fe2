//! HTTP client for the ANU-style QRNG JSON endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{EntropyError, EntropyResult};

/// Public endpoint serving measured vacuum-fluctuation randomness.
pub const DEFAULT_BASE_URL: &str = "https://qrng.anu.edu.au";

/// Default bound on one fetch, matching the service's own guidance.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct QrngResponse {
    success: bool,
    #[serde(default)]
    data: Vec<u8>,
}

/// Client for a QRNG service returning JSON arrays of `uint8` values.
///
/// Only the parity of each value is consumed, so a byte stream yields one
/// bit per byte.
#[derive(Debug, Clone)]
pub struct QrngClient {
    client: Client,
    base_url: String,
}

impl QrngClient {
    /// Create a client for the given service base URL.
    pub fn new(base_url: impl Into<String>) -> EntropyResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> EntropyResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EntropyError::Http)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch `n` random bits (the parity of `n` service bytes).
    pub async fn fetch_bits(&self, n: usize) -> EntropyResult<Vec<bool>> {
        let url = format!("{}/API/jsonI.php?length={}&type=uint8", self.base_url, n);
        debug!("fetching {n} quantum bits from {url}");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(EntropyError::Status(response.status().as_u16()));
        }

        let payload: QrngResponse = response.json().await?;
        if !payload.success {
            return Err(EntropyError::Unsuccessful);
        }
        if payload.data.len() < n {
            return Err(EntropyError::ShortPayload {
                got: payload.data.len(),
                requested: n,
            });
        }

        Ok(payload.data.into_iter().take(n).map(|x| x % 2 == 1).collect())
    }

    /// The configured service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
