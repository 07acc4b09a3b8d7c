//! Extension seams for the sync path.
//!
//! Two traits decouple the pieces of the pipeline so each can be swapped or
//! mocked on its own:
//!
//! ```text
//! ┌──────────┐  ProductSync   ┌─────────────┐  Transport   ┌──────────────────┐
//! │ Gateway  │───────────────▶│ IndexClient │─────────────▶│ HttpTransport    │
//! │ (verify) │  upsert/delete │ (transform) │ IndexRequest │ RenderOnly (sim) │
//! └──────────┘                └─────────────┘              └──────────────────┘
//! ```
//!
//! - [`ProductSync`] is what the webhook gateway calls after a delivery has
//!   been verified. [`IndexClient`](crate::index_client::IndexClient) is the
//!   production implementation.
//! - [`Transport`] executes an already-built [`IndexRequest`]. Simulation mode
//!   is simply a different transport, so request building never branches on it.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use catalog_sync::error::SyncError;
//! use catalog_sync::index_client::IndexRequest;
//! use catalog_sync::traits::Transport;
//!
//! /// Drops every request on the floor.
//! pub struct NullTransport;
//!
//! #[async_trait]
//! impl Transport for NullTransport {
//!     async fn send(&self, _request: &IndexRequest) -> Result<(), SyncError> {
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use catalog_sync_core::{ProductId, ProductRecord};

use crate::error::SyncError;
use crate::index_client::IndexRequest;

/// Applies product changes to the search index.
///
/// Implementations must be safe to call repeatedly with the same input:
/// the platform may deliver the same webhook more than once.
#[async_trait]
pub trait ProductSync: Send + Sync {
    /// Insert or replace the document for `product`.
    async fn upsert(&self, product: &ProductRecord) -> Result<(), SyncError>;

    /// Remove the document for `id`.
    async fn delete(&self, id: &ProductId) -> Result<(), SyncError>;
}

/// Executes an index request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &IndexRequest) -> Result<(), SyncError>;
}
