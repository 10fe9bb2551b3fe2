//! Infallible bit source: remote when possible, local otherwise.

use rand::Rng;
use tracing::debug;

use crate::client::QrngClient;

/// Produces random bits, preferring the remote service when one is
/// configured and silently falling back to the local generator.
///
/// The fallback contract is absolute: no remote failure — timeout, refused
/// connection, bad status, malformed payload — escapes this type.
#[derive(Debug, Clone, Default)]
pub struct EntropySource {
    remote: Option<QrngClient>,
}

impl EntropySource {
    /// Purely local source.
    pub fn local() -> Self {
        Self { remote: None }
    }

    /// Source that tries `client` first.
    pub fn with_remote(client: QrngClient) -> Self {
        Self {
            remote: Some(client),
        }
    }

    /// Whether a remote client is configured.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Produce `n` bits. Never fails.
    pub async fn bits(&self, n: usize) -> Vec<bool> {
        if let Some(client) = &self.remote {
            match client.fetch_bits(n).await {
                Ok(bits) => return bits,
                Err(e) => {
                    // Transient service problems are recovered locally and
                    // never surfaced to the caller.
                    debug!("remote entropy unavailable ({e}); using local generator");
                }
            }
        }
        local_bits(n)
    }
}

fn local_bits(n: usize) -> Vec<bool> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.gen_bool(0.5)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_source_yields_requested_count() {
        let source = EntropySource::local();
        assert_eq!(source.bits(64).await.len(), 64);
        assert!(source.bits(0).await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_remote_falls_back_silently() {
        // Reserved TEST-NET-1 address — connection refused or timed out.
        let client = QrngClient::with_timeout(
            "http://192.0.2.1:9",
            std::time::Duration::from_millis(200),
        )
        .unwrap();
        let source = EntropySource::with_remote(client);
        assert_eq!(source.bits(16).await.len(), 16);
    }
}
