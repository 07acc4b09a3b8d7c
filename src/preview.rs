//! `catalog-sync preview`: show the index request for a payload.
//!
//! Runs the same parsing and request building as a live delivery, then
//! prints the result instead of sending it. Nothing contacts the index.

use anyhow::{Context, Result};
use catalog_sync_core::transform::{parse_product, parse_product_id};
use serde_json::Value;
use std::path::Path;

use crate::config::Config;
use crate::index_client::IndexRequest;
use crate::webhook::Topic;

/// Render the request a delivery of `body` on `topic` would produce.
pub fn render_preview(config: &Config, topic: Topic, body: &[u8]) -> Result<String> {
    let body: Value = serde_json::from_slice(body).with_context(|| "Payload is not valid JSON")?;

    let request = match topic {
        Topic::ProductCreate | Topic::ProductUpdate => {
            let product = parse_product(body)?;
            IndexRequest::upsert(&config.index.name, &product, &config.index.settings)
        }
        Topic::ProductDelete => {
            let id = parse_product_id(&body)?;
            IndexRequest::delete(&config.index.name, &id)
        }
    };

    Ok(format!(
        "# {}\nPOST {}\n{}\n\n# Equivalent command\n{}",
        topic,
        request.url(&config.index.url),
        serde_json::to_string_pretty(&request.body)?,
        request.curl_command(&config.index.url, config.index.api_key.as_deref()),
    ))
}

pub fn run_preview(config: &Config, topic: Topic, path: &Path) -> Result<()> {
    let body = std::fs::read(path)
        .with_context(|| format!("Failed to read payload file: {}", path.display()))?;
    println!("{}", render_preview(config, topic, &body)?);
    Ok(())
}
