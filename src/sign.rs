//! `catalog-sync sign`: compute the webhook signature of a file.
//!
//! Useful for replaying a captured payload against a running server:
//!
//! ```bash
//! curl -X POST localhost:5000/webhooks/products/update \
//!   -H "x-shopify-hmac-sha256: $(catalog-sync sign product.json)" \
//!   --data-binary @product.json
//! ```

use anyhow::{Context, Result};
use catalog_sync_core::signature::sign;
use std::path::Path;

use crate::config::Config;

/// Base64 HMAC-SHA256 of the file's exact bytes under the configured secret.
pub fn sign_file(config: &Config, path: &Path) -> Result<String> {
    let body = std::fs::read(path)
        .with_context(|| format!("Failed to read payload file: {}", path.display()))?;
    Ok(sign(&body, config.webhook.secret_bytes()))
}

pub fn run_sign(config: &Config, path: &Path) -> Result<()> {
    if config.webhook.secret_bytes().is_empty() {
        eprintln!(
            "warning: no webhook secret configured (set {}); signing with an empty key",
            config.webhook.secret_env
        );
    }
    println!("{}", sign_file(config, path)?);
    Ok(())
}
