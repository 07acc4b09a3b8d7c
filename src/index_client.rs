//! Index service client.
//!
//! Turns product changes into requests against the index service's document
//! API and hands them to a [`Transport`]:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | upsert | `POST {url}/indexes/{name}/documents` with `{documents, mappings, tensorFields}` |
//! | delete | `POST {url}/indexes/{name}/documents/delete-batch` with `["<id>"]` |
//!
//! Both requests carry the `x-api-key` header.
//!
//! # Transports
//!
//! - [`HttpTransport`] sends the request with a shared `reqwest` client and
//!   a per-request timeout. Non-2xx answers become [`SyncError::Status`].
//! - [`RenderOnlyTransport`] logs the request, including a `curl` command an
//!   operator can paste, and reports success without any network call.
//!
//! No retries happen here. A failed request is returned to the caller, which
//! decides what to do with it.

use anyhow::Result;
use async_trait::async_trait;
use catalog_sync_core::transform::{document_id, to_index_document};
use catalog_sync_core::{IndexSettings, ProductId, ProductRecord};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::IndexConfig;
use crate::error::SyncError;
use crate::traits::{ProductSync, Transport};

/// Header carrying the index service API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A fully built request for the index service, minus the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    /// Path below the base URL, starting with `/`.
    pub path: String,
    /// JSON request body.
    pub body: Value,
}

impl IndexRequest {
    /// Batch upsert of a single document.
    pub fn upsert(index_name: &str, product: &ProductRecord, settings: &IndexSettings) -> Self {
        let document = to_index_document(product);
        Self {
            path: format!("/indexes/{}/documents", index_name),
            body: json!({
                "documents": [document],
                "mappings": settings.mappings,
                "tensorFields": settings.tensor_fields,
            }),
        }
    }

    /// Batch delete of a single document.
    pub fn delete(index_name: &str, id: &ProductId) -> Self {
        Self {
            path: format!("/indexes/{}/documents/delete-batch", index_name),
            body: json!([document_id(id)]),
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.path)
    }

    /// A shell command equivalent to this request.
    pub fn curl_command(&self, base_url: &str, api_key: Option<&str>) -> String {
        let body = serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.body.to_string());
        format!(
            "curl -XPOST {} \\\n-H {} \\\n-H 'Content-type: application/json' \\\n-d {}",
            shell_quote(&self.url(base_url)),
            shell_quote(&format!("{}: {}", API_KEY_HEADER, api_key.unwrap_or_default())),
            shell_quote(&body),
        )
    }
}

/// Single-quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

// ============ Transports ============

/// Sends requests to the index service over HTTP.
///
/// Holds one `reqwest::Client`, which pools connections and is cheap to
/// share between concurrent deliveries.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &IndexRequest) -> Result<(), SyncError> {
        let url = request.url(&self.base_url);
        let mut builder = self.client.post(&url).json(&request.body);
        if let Some(api_key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SyncError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if status.is_success() {
            debug!(%url, status = status.as_u16(), "Index request succeeded");
            return Ok(());
        }

        Err(status_error(status.as_u16(), response.text().await))
    }
}

/// A non-2xx answer. A body that cannot be read is reported in its place.
fn status_error<E: std::fmt::Display>(status: u16, body: Result<String, E>) -> SyncError {
    let body = body.unwrap_or_else(|e| format!("<failed to read response body: {}>", e));
    SyncError::Status { status, body }
}

/// Logs requests instead of sending them.
pub struct RenderOnlyTransport {
    base_url: String,
    api_key: Option<String>,
}

impl RenderOnlyTransport {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn render(&self, request: &IndexRequest) -> String {
        request.curl_command(&self.base_url, self.api_key.as_deref())
    }
}

#[async_trait]
impl Transport for RenderOnlyTransport {
    async fn send(&self, request: &IndexRequest) -> Result<(), SyncError> {
        info!(
            url = %request.url(&self.base_url),
            body = %request.body,
            "Simulation mode: index request not sent"
        );
        info!("Equivalent command:\n{}", self.render(request));
        Ok(())
    }
}

// ============ Client ============

/// Applies product changes to one index.
pub struct IndexClient {
    index_name: String,
    settings: Arc<IndexSettings>,
    transport: Arc<dyn Transport>,
}

impl IndexClient {
    pub fn new(
        index_name: impl Into<String>,
        settings: Arc<IndexSettings>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            settings,
            transport,
        }
    }

    /// Build a client from config, choosing the transport by `simulate`.
    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = if config.simulate {
            Arc::new(RenderOnlyTransport::new(config))
        } else {
            Arc::new(HttpTransport::new(config)?)
        };

        Ok(Self::new(
            config.name.clone(),
            Arc::new(config.settings.clone()),
            transport,
        ))
    }

    pub fn upsert_request(&self, product: &ProductRecord) -> IndexRequest {
        IndexRequest::upsert(&self.index_name, product, &self.settings)
    }

    pub fn delete_request(&self, id: &ProductId) -> IndexRequest {
        IndexRequest::delete(&self.index_name, id)
    }
}

#[async_trait]
impl ProductSync for IndexClient {
    async fn upsert(&self, product: &ProductRecord) -> Result<(), SyncError> {
        debug!(product_id = %product.id, title = %product.title, "Upserting product");
        self.transport.send(&self.upsert_request(product)).await?;
        info!(product_id = %product.id, index = %self.index_name, "Upserted product");
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), SyncError> {
        self.transport.send(&self.delete_request(id)).await?;
        info!(product_id = %id, index = %self.index_name, "Deleted product");
        Ok(())
    }
}
