//! Webhook gateway.
//!
//! Authenticates product webhooks and turns every delivery into exactly one
//! of two acknowledgments:
//!
//! | Outcome | Response |
//! |---------|----------|
//! | signature missing or wrong | `401 Unauthorized`, nothing else happens |
//! | signature valid | `200 OK`, whatever the sync did |
//!
//! # Failures
//!
//! The platform redelivers anything that is not 2xx, so sync failures are
//! reported through logs only. Each verified delivery emits one
//! structured event with an `outcome` field (`synced` or `sync_failed`);
//! rejections emit `outcome = "rejected"`. Alert on those, not on HTTP
//! status codes.
//!
//! # Request lifecycle
//!
//! ```text
//! Received ─▶ Verifying ─┬─▶ Rejected (401)
//!                        └─▶ Verified ─▶ Dispatching ─▶ Acknowledged (200)
//! ```
//!
//! Verification runs on the raw body before any JSON parsing. A verified
//! body that is not valid JSON is a dispatch failure like any other.

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use catalog_sync_core::signature::{self, SIGNATURE_HEADER};
use catalog_sync_core::transform::{document_id, parse_product, parse_product_id};
use catalog_sync_core::TransformError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::DispatchError;
use crate::traits::ProductSync;

const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";
const WEBHOOK_ID_HEADER: &str = "x-shopify-webhook-id";

/// Product notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    ProductCreate,
    ProductUpdate,
    ProductDelete,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::ProductCreate => "product.create",
            Topic::ProductUpdate => "product.update",
            Topic::ProductDelete => "product.delete",
        }
    }

    /// Parse the last route segment (`create`, `update`, `delete`) or a
    /// full topic name (`product.create`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.strip_prefix("product.").unwrap_or(s) {
            "create" => Some(Topic::ProductCreate),
            "update" => Some(Topic::ProductUpdate),
            "delete" => Some(Topic::ProductDelete),
            _ => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The response to a webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgment {
    Ok,
    Unauthorized,
}

impl Acknowledgment {
    pub fn status(&self) -> StatusCode {
        match self {
            Acknowledgment::Ok => StatusCode::OK,
            Acknowledgment::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Acknowledgment::Ok => "OK",
            Acknowledgment::Unauthorized => "Unauthorized",
        }
    }
}

impl IntoResponse for Acknowledgment {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}

/// Verifies deliveries and forwards them to a [`ProductSync`].
pub struct Gateway {
    secret: Vec<u8>,
    sync: Arc<dyn ProductSync>,
}

impl Gateway {
    pub fn new(secret: impl Into<Vec<u8>>, sync: Arc<dyn ProductSync>) -> Self {
        Self {
            secret: secret.into(),
            sync,
        }
    }

    /// Handle one delivery.
    ///
    /// Never fails: every path ends in an [`Acknowledgment`]. The sync runs
    /// in its own task so that even a panic inside it is logged and
    /// acknowledged rather than dropping the connection.
    pub async fn receive(&self, topic: Topic, headers: &HeaderMap, raw_body: Bytes) -> Acknowledgment {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let check = signature::check(&raw_body, provided, &self.secret);
        if !check.valid {
            warn!(
                topic = %topic,
                outcome = "rejected",
                received_hmac = provided,
                expected_hmac = %check.expected,
                "Webhook signature verification failed"
            );
            return Acknowledgment::Unauthorized;
        }

        info!(
            topic = %topic,
            bytes = raw_body.len(),
            shop_domain = header_str(headers, SHOP_DOMAIN_HEADER),
            webhook_id = header_str(headers, WEBHOOK_ID_HEADER),
            "Received webhook"
        );
        debug!(topic = %topic, body = %String::from_utf8_lossy(&raw_body), "Webhook payload");

        let sync = Arc::clone(&self.sync);
        let outcome = tokio::spawn(async move { dispatch(sync.as_ref(), topic, &raw_body).await })
            .await
            .unwrap_or_else(|e| Err(DispatchError::Aborted(e.to_string())));

        match outcome {
            Ok(product_id) => {
                info!(topic = %topic, product_id = %product_id, outcome = "synced", "Webhook processed");
            }
            Err(err) => {
                error!(
                    topic = %topic,
                    product_id = err.product_id(),
                    outcome = "sync_failed",
                    error = %err,
                    "Error processing webhook; acknowledging anyway"
                );
            }
        }

        Acknowledgment::Ok
    }
}

/// Parse the verified body and apply it. Returns the document id.
async fn dispatch(
    sync: &dyn ProductSync,
    topic: Topic,
    raw_body: &[u8],
) -> Result<String, DispatchError> {
    let body: Value = serde_json::from_slice(raw_body).map_err(TransformError::InvalidJson)?;

    match topic {
        Topic::ProductCreate | Topic::ProductUpdate => {
            let product = parse_product(body)?;
            let product_id = document_id(&product.id);
            sync.upsert(&product)
                .await
                .map_err(|source| DispatchError::Sync {
                    product_id: product_id.clone(),
                    source,
                })?;
            Ok(product_id)
        }
        Topic::ProductDelete => {
            let id = parse_product_id(&body)?;
            let product_id = document_id(&id);
            sync.delete(&id)
                .await
                .map_err(|source| DispatchError::Sync {
                    product_id: product_id.clone(),
                    source,
                })?;
            Ok(product_id)
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
