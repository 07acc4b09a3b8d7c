//! Error types for the sync path.
//!
//! None of these ever reach the webhook sender: the gateway logs them and
//! still acknowledges the delivery. See [`crate::webhook`].

use catalog_sync_core::TransformError;
use std::time::Duration;
use thiserror::Error;

/// A failed call to the index service.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Connection refused, DNS failure, TLS error, and the like.
    #[error("index service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// No response within the configured request timeout.
    #[error("index service did not respond within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The index service answered with a non-2xx status.
    #[error("index service returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl SyncError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            SyncError::Timeout(timeout)
        } else {
            SyncError::Transport(err)
        }
    }
}

/// Why a verified delivery could not be synced.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("sync of product {product_id} failed: {source}")]
    Sync {
        product_id: String,
        #[source]
        source: SyncError,
    },

    /// The dispatch task panicked or was cancelled.
    #[error("dispatch task aborted: {0}")]
    Aborted(String),
}

impl DispatchError {
    /// The document id involved, when the payload got far enough to have one.
    pub fn product_id(&self) -> Option<&str> {
        match self {
            DispatchError::Sync { product_id, .. } => Some(product_id),
            _ => None,
        }
    }
}
