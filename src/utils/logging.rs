/// Logging setup and the signing observer that reports through `tracing`
use tracing_subscriber::EnvFilter;

use crate::signing::SignObserver;

/// Characters of the signature shown in debug output
const PREVIEW_LEN: usize = 16;

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr so the
/// signed request on stdout stays clean.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be set (tests, embedding hosts)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Shortened signature for logs, e.g. `e8dd201559dd7151...`
pub fn signature_preview(signature: &str) -> String {
    match signature.get(..PREVIEW_LEN) {
        Some(prefix) if signature.len() > PREVIEW_LEN => format!("{}...", prefix),
        _ => signature.to_string(),
    }
}

/// Emits a debug event for every signed request
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SignObserver for TracingObserver {
    fn signed(&self, canonical: &str, signature: &str) {
        tracing::debug!(
            canonical,
            signature = %signature_preview(signature),
            "🔐 Signed request"
        );
    }
}
